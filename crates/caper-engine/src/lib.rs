//! The batch-stepping engine: many simulation instances, a shared worker
//! pool, and a synchronous vectorized-stepping API.
//!
//! Callers create groups of instances, submit one action per instance,
//! and wait for the batch to complete. Workers pick instances off a
//! shared queue, so a process can run several groups over one pool.
//! API misuse (bad handles, double submits, out-of-range actions) is a
//! caller defect and panics; only construction-time validation returns
//! errors.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod config;
mod engine;
mod group;

pub use config::{ConfigError, EngineConfig};
pub use engine::{GroupHandle, VecEngine};
