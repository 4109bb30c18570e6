//! Instance slots and groups.
//!
//! A slot pairs one [`SimInstance`] with a small admission record that
//! enforces the submit/step/wait protocol. The admission lock is
//! separate from the state lock so `wait` can poll completion without
//! contending with the worker that is stepping the instance.

use std::sync::{Arc, Mutex};

use caper_sim::SimInstance;

/// Submission state of one slot.
#[derive(Debug, Default)]
pub(crate) struct Admission {
    /// An action has been submitted and the tick has not completed.
    pub ready: bool,
    /// A worker is currently stepping the instance.
    pub in_progress: bool,
}

/// One instance plus its admission record.
#[derive(Debug)]
pub(crate) struct InstanceSlot {
    pub admission: Mutex<Admission>,
    pub state: Mutex<SimInstance>,
}

impl InstanceSlot {
    pub fn new(instance: SimInstance) -> Self {
        Self {
            admission: Mutex::new(Admission::default()),
            state: Mutex::new(instance),
        }
    }

    /// Has the submitted tick finished (or was nothing submitted)?
    pub fn step_completed(&self) -> bool {
        !self.admission.lock().unwrap().ready
    }
}

/// A caller-visible batch of instances, stepped and harvested together.
#[derive(Debug)]
pub(crate) struct Group {
    pub slots: Vec<Arc<InstanceSlot>>,
}

impl Group {
    pub fn new(instances: Vec<SimInstance>) -> Self {
        Self {
            slots: instances
                .into_iter()
                .map(|i| Arc::new(InstanceSlot::new(i)))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }
}
