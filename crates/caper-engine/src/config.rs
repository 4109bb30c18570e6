//! Engine configuration, validation, and error types.

use std::error::Error;
use std::fmt;

use caper_core::ArchetypeRegistry;

// ── EngineConfig ───────────────────────────────────────────────────

/// Configuration for [`VecEngine`](crate::VecEngine).
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Number of stepping worker threads. `None` = auto-detect
    /// (`available_parallelism / 2`, clamped to `[2, 16]`).
    pub worker_count: Option<usize>,
    /// Master seed. Every instance seed the engine ever hands out is
    /// derived from this, so an engine with the same seed and the same
    /// sequence of calls replays identically.
    pub seed: u64,
    /// Monster roster shared by every instance.
    pub registry: ArchetypeRegistry,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            worker_count: None,
            seed: 0,
            registry: ArchetypeRegistry::standard(),
        }
    }
}

impl EngineConfig {
    /// Resolve the actual worker count, applying auto-detection if `None`.
    ///
    /// Explicit values are clamped to `[1, 64]`. Zero workers would make
    /// every [`wait`](crate::VecEngine::wait) hang forever.
    pub fn resolved_worker_count(&self) -> usize {
        match self.worker_count {
            Some(n) => n.clamp(1, 64),
            None => {
                let cpus = std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(4);
                (cpus / 2).clamp(2, 16)
            }
        }
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while constructing the engine or a group.
#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A group must contain at least one instance.
    EmptyGroup,
    /// The episode timeout must be positive.
    InvalidTimeout {
        /// The invalid value.
        value: i32,
    },
    /// The monster roster has no species.
    EmptyRegistry,
    /// A worker thread could not be spawned.
    ThreadSpawnFailed {
        /// Description of which thread failed.
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyGroup => write!(f, "group must contain at least one instance"),
            Self::InvalidTimeout { value } => {
                write!(f, "timeout must be positive, got {value}")
            }
            Self::EmptyRegistry => write!(f, "monster roster has no species"),
            Self::ThreadSpawnFailed { reason } => {
                write!(f, "thread spawn failed: {reason}")
            }
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_worker_count_is_clamped() {
        let mut c = EngineConfig::default();
        c.worker_count = Some(0);
        assert_eq!(c.resolved_worker_count(), 1);
        c.worker_count = Some(1000);
        assert_eq!(c.resolved_worker_count(), 64);
    }

    #[test]
    fn auto_detect_stays_in_bounds() {
        let c = EngineConfig::default();
        let n = c.resolved_worker_count();
        assert!((2..=16).contains(&n));
    }

    #[test]
    fn errors_render() {
        assert_eq!(
            ConfigError::InvalidTimeout { value: -3 }.to_string(),
            "timeout must be positive, got -3"
        );
    }
}
