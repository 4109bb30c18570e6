//! Episode simulation: agent physics, monster AI, and the per-episode
//! state machine.
//!
//! A [`SimInstance`] owns one level, one agent, and that level's
//! monsters, and advances them one tick per submitted action. Everything
//! here is single-threaded; the batch engine provides the concurrency by
//! giving each instance to at most one worker at a time.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod agent;
mod instance;
mod monster;

pub use agent::{Agent, DEATH_ANIM_LENGTH, FINISHED_LEVEL_ANIM_LENGTH};
pub use instance::{
    InstanceConfig, LevelSampling, SimInstance, StepReport, TickEvents, DEFAULT_LEVEL_TIMEOUT,
};
pub use monster::{Monster, MONSTER_DEATH_ANIM_LENGTH, MONSTER_TRAIL};
