//! Core types for the Caper platformer simulation.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! tile alphabet, the deterministic RNG wrapper, the discrete action table,
//! the physics/reward tuning values, and the monster archetype registry
//! shared by the level generator, the physics code, and the batch engine.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod action;
mod archetype;
mod config;
mod rng;
mod tile;

pub use action::{Action, NUM_ACTIONS};
pub use archetype::{Archetype, ArchetypeId, ArchetypeRegistry, MonsterKind};
pub use config::{PhysicsConfig, RewardConfig};
pub use rng::SimRng;
pub use tile::Tile;
