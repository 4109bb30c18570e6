//! The vectorized stepping engine and its worker pool.
//!
//! ```text
//! Caller Thread                    Step Workers (N)
//!     |                                 |
//!     |--create_group(n)                |
//!     |--submit(h, actions)------------>| work_rx.recv_timeout()
//!     |   mark ready, queue slots       | admission: ready -> in_progress
//!     |                                 | state.lock().tick()
//!     |--wait(h, rew, done, new)        | admission: clear both
//!     |   poll step_completed(),        | completion.notify_all()
//!     |   condvar wait w/ timeout       |
//!     |<--index-aligned outputs         |
//! ```
//!
//! The queue is shared across groups: submitting two groups interleaves
//! their instances over the same workers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use caper_core::{Action, SimRng};
use caper_sim::{InstanceConfig, SimInstance};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use indexmap::IndexMap;

use crate::config::{ConfigError, EngineConfig};
use crate::group::{Group, InstanceSlot};

// ── GroupHandle ────────────────────────────────────────────────────

/// Opaque identifier for a group of instances.
///
/// Handles are engine-scoped, never reused, and start at 100 so that
/// accidental zero/small-integer confusion with instance indices shows
/// up immediately.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GroupHandle(pub u64);

const FIRST_HANDLE: u64 = 100;

/// How long `wait` sleeps between completion polls. Bounded so a lost
/// wakeup degrades to a poll instead of a hang.
const WAIT_POLL: Duration = Duration::from_millis(1000);

/// How long workers block on the queue before rechecking the stop flag.
const WORKER_POLL: Duration = Duration::from_millis(50);

// ── Completion signal ──────────────────────────────────────────────

#[derive(Debug, Default)]
struct Completion {
    lock: Mutex<()>,
    cvar: Condvar,
}

impl Completion {
    fn notify(&self) {
        let _guard = self.lock.lock().unwrap();
        self.cvar.notify_all();
    }

    fn wait(&self, timeout: Duration) {
        let guard = self.lock.lock().unwrap();
        let _ = self.cvar.wait_timeout(guard, timeout).unwrap();
    }
}

// ── Registry ───────────────────────────────────────────────────────

#[derive(Debug)]
struct Registry {
    groups: IndexMap<u64, Arc<Group>>,
    next_handle: u64,
}

// ── VecEngine ──────────────────────────────────────────────────────

/// A pool of stepping workers plus the groups they serve.
///
/// The stepping API is synchronous in the aggregate: [`submit`] fans a
/// batch of actions out to the pool, [`wait`] blocks until every
/// instance in the group has ticked and harvests the index-aligned
/// outputs. Submitting a group twice without an intervening wait is a
/// caller defect and panics.
///
/// [`submit`]: VecEngine::submit
/// [`wait`]: VecEngine::wait
#[derive(Debug)]
pub struct VecEngine {
    registry: Mutex<Registry>,
    work_tx: Option<Sender<Arc<InstanceSlot>>>,
    workers: Vec<JoinHandle<()>>,
    stop: Arc<AtomicBool>,
    completion: Arc<Completion>,
    /// Source of instance seeds; every draw is serialized so group
    /// creation order fully determines them.
    master_rng: Mutex<SimRng>,
    config: EngineConfig,
}

impl VecEngine {
    /// Spawn the worker pool.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        if config.registry.is_empty() {
            return Err(ConfigError::EmptyRegistry);
        }
        let worker_count = config.resolved_worker_count();
        let (work_tx, work_rx) = crossbeam_channel::unbounded::<Arc<InstanceSlot>>();
        let stop = Arc::new(AtomicBool::new(false));
        let completion = Arc::new(Completion::default());

        let mut workers = Vec::with_capacity(worker_count);
        for i in 0..worker_count {
            let rx = work_rx.clone();
            let stop = Arc::clone(&stop);
            let completion = Arc::clone(&completion);
            let handle = thread::Builder::new()
                .name(format!("caper-step-{i}"))
                .spawn(move || worker_loop(rx, stop, completion))
                .map_err(|e| ConfigError::ThreadSpawnFailed {
                    reason: e.to_string(),
                })?;
            workers.push(handle);
        }

        Ok(Self {
            registry: Mutex::new(Registry {
                groups: IndexMap::new(),
                next_handle: FIRST_HANDLE,
            }),
            work_tx: Some(work_tx),
            workers,
            stop,
            completion,
            master_rng: Mutex::new(SimRng::seed_from(config.seed)),
            config,
        })
    }

    /// Create `count` instances sharing one configuration and return the
    /// handle for stepping them as a batch. Each instance gets its own
    /// seed from the master RNG and generates its first level here.
    pub fn create_group(
        &self,
        count: usize,
        instance_config: InstanceConfig,
    ) -> Result<GroupHandle, ConfigError> {
        if count == 0 {
            return Err(ConfigError::EmptyGroup);
        }
        if instance_config.timeout <= 0 {
            return Err(ConfigError::InvalidTimeout {
                value: instance_config.timeout,
            });
        }
        let seeds: Vec<u64> = {
            let mut rng = self.master_rng.lock().unwrap();
            (0..count).map(|_| rng.next_seed()).collect()
        };
        let instances: Vec<SimInstance> = seeds
            .into_iter()
            .map(|seed| {
                SimInstance::new(seed, instance_config.clone(), self.config.registry.clone())
            })
            .collect();
        let group = Arc::new(Group::new(instances));

        let mut reg = self.registry.lock().unwrap();
        let handle = reg.next_handle;
        reg.next_handle += 1;
        reg.groups.insert(handle, group);
        Ok(GroupHandle(handle))
    }

    /// Number of instances in a group.
    ///
    /// # Panics
    ///
    /// Panics if `handle` is unknown.
    pub fn group_size(&self, handle: GroupHandle) -> usize {
        self.find(handle).len()
    }

    /// Queue one tick for every instance in the group, one action index
    /// per instance, index-aligned with the outputs of the following
    /// [`wait`](VecEngine::wait).
    ///
    /// # Panics
    ///
    /// Panics if `handle` is unknown, `actions.len()` disagrees with the
    /// group size, any action index is out of range, or the group
    /// already has a step in flight.
    pub fn submit(&self, handle: GroupHandle, actions: &[usize]) {
        let group = self.find(handle);
        assert_eq!(
            actions.len(),
            group.len(),
            "submitted {} actions for a group of {}",
            actions.len(),
            group.len()
        );
        let work_tx = self
            .work_tx
            .as_ref()
            .expect("submit called on a shut-down engine");
        for (slot, &raw) in group.slots.iter().zip(actions) {
            let action = Action::from_index(raw);
            {
                let mut adm = slot.admission.lock().unwrap();
                assert!(
                    !adm.ready && !adm.in_progress,
                    "group {} already has a step in flight",
                    handle.0
                );
                adm.ready = true;
            }
            slot.state.lock().unwrap().set_action(action);
            // Workers only exit after the channel disconnects, so a send
            // can only fail during shutdown.
            if work_tx.send(Arc::clone(slot)).is_err() {
                return;
            }
        }
    }

    /// Block until every instance in the group has completed its
    /// submitted tick, then harvest outputs into the index-aligned
    /// slices. Instances without a submitted tick count as completed.
    ///
    /// Returns immediately with zeroed outputs if the engine is shut
    /// down while waiting.
    ///
    /// # Panics
    ///
    /// Panics if `handle` is unknown or any slice length disagrees with
    /// the group size.
    pub fn wait(
        &self,
        handle: GroupHandle,
        rewards: &mut [f32],
        dones: &mut [bool],
        new_levels: &mut [bool],
    ) {
        let group = self.find(handle);
        let n = group.len();
        assert_eq!(rewards.len(), n, "rewards slice length mismatch");
        assert_eq!(dones.len(), n, "dones slice length mismatch");
        assert_eq!(new_levels.len(), n, "new_levels slice length mismatch");

        loop {
            if self.stop.load(Ordering::Acquire) {
                rewards.fill(0.0);
                dones.fill(false);
                new_levels.fill(false);
                return;
            }
            if group.slots.iter().all(|s| s.step_completed()) {
                break;
            }
            self.completion.wait(WAIT_POLL);
        }

        for (i, slot) in group.slots.iter().enumerate() {
            let report = slot.state.lock().unwrap().harvest();
            rewards[i] = report.reward;
            dones[i] = report.done;
            new_levels[i] = report.new_level;
        }
    }

    /// Inspect one instance read-only, for collaborators that render or
    /// log between steps. Callers must not hold the closure across a
    /// concurrent submit for the same group.
    ///
    /// # Panics
    ///
    /// Panics if `handle` is unknown or `index` is out of range.
    pub fn with_instance<R>(
        &self,
        handle: GroupHandle,
        index: usize,
        f: impl FnOnce(&SimInstance) -> R,
    ) -> R {
        let group = self.find(handle);
        let slot = &group.slots[index];
        let state = slot.state.lock().unwrap();
        f(&state)
    }

    /// Forget a group. Slots still queued keep their in-flight tick
    /// alive; the group's memory is released once the last worker
    /// finishes with it.
    ///
    /// # Panics
    ///
    /// Panics if `handle` is unknown.
    pub fn close(&self, handle: GroupHandle) {
        let removed = self.registry.lock().unwrap().groups.shift_remove(&handle.0);
        assert!(removed.is_some(), "close of unknown group {}", handle.0);
    }

    /// Stop the workers and join them. Idempotent; also run by `Drop`.
    pub fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Release);
        // Disconnecting the channel wakes blocked workers immediately.
        self.work_tx = None;
        self.completion.notify();
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }

    fn find(&self, handle: GroupHandle) -> Arc<Group> {
        let reg = self.registry.lock().unwrap();
        match reg.groups.get(&handle.0) {
            Some(group) => Arc::clone(group),
            None => panic!("unknown group handle {}", handle.0),
        }
    }
}

impl Drop for VecEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

// ── Worker loop ────────────────────────────────────────────────────

fn worker_loop(
    rx: Receiver<Arc<InstanceSlot>>,
    stop: Arc<AtomicBool>,
    completion: Arc<Completion>,
) {
    loop {
        if stop.load(Ordering::Acquire) {
            return;
        }
        let slot = match rx.recv_timeout(WORKER_POLL) {
            Ok(slot) => slot,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => return,
        };
        {
            let mut adm = slot.admission.lock().unwrap();
            assert!(
                adm.ready && !adm.in_progress,
                "queued slot in impossible admission state"
            );
            adm.in_progress = true;
        }
        slot.state.lock().unwrap().tick();
        {
            let mut adm = slot.admission.lock().unwrap();
            adm.ready = false;
            adm.in_progress = false;
        }
        completion.notify();
    }
}
