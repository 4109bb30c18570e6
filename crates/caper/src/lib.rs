//! Caper: a vectorized 2D platformer simulator for reinforcement-learning
//! trajectory generation.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Caper sub-crates. For most users, adding `caper` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use caper::prelude::*;
//!
//! // A pool of workers stepping four environments in lockstep.
//! let mut engine = VecEngine::new(EngineConfig::default()).unwrap();
//! let handle = engine.create_group(4, InstanceConfig::default()).unwrap();
//!
//! let mut rewards = vec![0.0; 4];
//! let mut dones = vec![false; 4];
//! let mut new_levels = vec![false; 4];
//! for _ in 0..10 {
//!     // One action index per instance: here everyone runs right.
//!     engine.submit(handle, &[1, 1, 1, 1]);
//!     engine.wait(handle, &mut rewards, &mut dones, &mut new_levels);
//! }
//! engine.close(handle);
//! engine.shutdown();
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the
//! prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `caper-core` | Tiles, actions, RNG, tuning, monster roster |
//! | [`level`] | `caper-level` | Level grids and the procedural generator |
//! | [`sim`] | `caper-sim` | Agent/monster physics and episode instances |
//! | [`engine`] | `caper-engine` | The concurrent batch-stepping engine |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types: tile alphabet, action table, deterministic RNG, physics
/// and reward tuning, and the monster archetype roster (`caper-core`).
pub use caper_core as types;

/// Level grids, the seed-driven procedural generator, and the text
/// level format (`caper-level`).
pub use caper_level as level;

/// Agent physics, monster AI, and the per-episode state machine
/// (`caper-sim`).
pub use caper_sim as sim;

/// The concurrent batch-stepping engine (`caper-engine`).
///
/// [`engine::VecEngine`] is the main entry point.
pub use caper_engine as engine;

/// Common imports for typical Caper usage.
///
/// ```rust
/// use caper::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use caper_core::{
        Action, Archetype, ArchetypeId, ArchetypeRegistry, MonsterKind, PhysicsConfig,
        RewardConfig, SimRng, Tile, NUM_ACTIONS,
    };

    // Levels
    pub use caper_level::{generate, Maze, MonsterSpawn};

    // Simulation
    pub use caper_sim::{
        Agent, InstanceConfig, LevelSampling, Monster, SimInstance, StepReport, TickEvents,
    };

    // Engine
    pub use caper_engine::{ConfigError, EngineConfig, GroupHandle, VecEngine};
}
