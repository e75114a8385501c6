//! Single-worker FIFO task queue with pause / resume / cancel / reset.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use super::state::QueueState;
use super::task::{Deferred, TaskHandle};
use crate::domain::{BatchId, ProgressSnapshot};
use crate::error::HeraldError;
use crate::ports::{IdGenerator, SystemClock, UlidGenerator};

struct Shared {
    state: Mutex<QueueState>,

    /// Held for the whole execution of a task. A drain run started after
    /// `reset` waits here until the previous epoch's task has settled.
    run_lock: tokio::sync::Mutex<()>,

    ids: Arc<dyn IdGenerator>,
}

impl Shared {
    fn lock_state(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Serializes submitted work so at most one task is in flight.
///
/// Cheap to clone; every clone drives the same queue. Construct one per
/// process and hand it to every consumer.
///
/// Methods that may start draining (`add`, `submit_batch`, `resume`) spawn onto the current
/// Tokio runtime and must be called from within one.
#[derive(Clone)]
pub struct TaskQueue {
    inner: Arc<Shared>,
}

impl TaskQueue {
    pub fn new(ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            inner: Arc::new(Shared {
                state: Mutex::new(QueueState::new()),
                run_lock: tokio::sync::Mutex::new(()),
                ids,
            }),
        }
    }

    /// Enqueue `work` at the tail. Returns at once; the handle settles when
    /// the work has run (or was discarded by `cancel` / `reset`).
    ///
    /// While the queue is cancelled nothing is enqueued and the handle is
    /// rejected with `Cancelled`; call `start_batch` (or `reset`) first.
    pub fn add<R, F, Fut>(&self, work: F) -> TaskHandle<R>
    where
        R: Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<R, HeraldError>> + Send + 'static,
    {
        let task_id = self.inner.ids.generate_task_id();

        let (epoch, handle) = {
            let mut state = self.inner.lock_state();
            if state.cancelled {
                debug!(%task_id, "queue cancelled, rejecting task");
                return TaskHandle::rejected(task_id, HeraldError::Cancelled);
            }

            let (task, handle) = Deferred::new(task_id, work);
            state.pending.push_back(Box::new(task));
            debug!(%task_id, queued = state.pending.len(), "task enqueued");
            (claim_drain(&mut state), handle)
        };

        if let Some(epoch) = epoch {
            self.spawn_drain(epoch);
        }
        handle
    }

    /// Declare a new batch of `total` tasks.
    ///
    /// Fails with `Busy` while a previous batch is still draining, so counters
    /// of an in-flight batch are never overwritten.
    ///
    /// Between this call and the first `add` another caller can still win
    /// `start_batch`; use `submit_batch` when the work is known up front.
    pub fn start_batch(&self, total: usize) -> Result<BatchId, HeraldError> {
        let mut state = self.inner.lock_state();
        self.begin_batch(&mut state, total)
    }

    /// Declare a batch and enqueue all of its work in one step.
    ///
    /// Admission and enqueue happen under the same lock, so of two concurrent
    /// callers exactly one gets the batch and the other gets `Busy`.
    pub fn submit_batch<R, F, Fut>(&self, works: Vec<F>) -> Result<(BatchId, Vec<TaskHandle<R>>), HeraldError>
    where
        R: Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<R, HeraldError>> + Send + 'static,
    {
        let (batch_id, handles, epoch) = {
            let mut state = self.inner.lock_state();
            let batch_id = self.begin_batch(&mut state, works.len())?;

            let handles: Vec<_> = works
                .into_iter()
                .map(|work| {
                    let (task, handle) = Deferred::new(self.inner.ids.generate_task_id(), work);
                    state.pending.push_back(Box::new(task));
                    handle
                })
                .collect();
            (batch_id, handles, claim_drain(&mut state))
        };

        if let Some(epoch) = epoch {
            self.spawn_drain(epoch);
        }
        Ok((batch_id, handles))
    }

    fn begin_batch(&self, state: &mut QueueState, total: usize) -> Result<BatchId, HeraldError> {
        if state.is_processing() {
            return Err(HeraldError::Busy);
        }

        let batch_id = self.inner.ids.generate_batch_id();
        state.batch.start(batch_id, total);
        state.paused = false;
        state.cancelled = false;
        info!(%batch_id, total, "batch started");
        Ok(batch_id)
    }

    /// Stop dequeuing. A task already running is not interrupted.
    pub fn pause(&self) {
        let mut state = self.inner.lock_state();
        state.paused = true;
        info!(queued = state.pending.len(), "queue paused");
    }

    pub fn resume(&self) {
        let epoch = {
            let mut state = self.inner.lock_state();
            state.paused = false;
            info!(queued = state.pending.len(), "queue resumed");
            claim_drain(&mut state)
        };
        if let Some(epoch) = epoch {
            self.spawn_drain(epoch);
        }
    }

    /// Discard every queued task (their handles reject with `Cancelled`).
    /// The active task, if any, still runs to completion.
    ///
    /// Returns how many queued tasks were discarded.
    pub fn cancel(&self) -> usize {
        let mut state = self.inner.lock_state();
        state.cancelled = true;
        state.paused = false;
        let discarded = state.discard_pending(&HeraldError::Cancelled);
        info!(discarded, "queue cancelled");
        discarded
    }

    /// Back to the initial condition, immediately.
    ///
    /// Queued handles reject with `Reset`. A task still executing keeps
    /// running and settles its own handle, but its outcome is not counted.
    pub fn reset(&self) {
        let mut state = self.inner.lock_state();
        let discarded = state.discard_pending(&HeraldError::Reset);
        let abandoned_active = state.active.take();
        state.processing = false;
        state.paused = false;
        state.cancelled = false;
        state.batch.clear();
        state.epoch += 1;
        info!(discarded, ?abandoned_active, "queue reset");
    }

    pub fn progress(&self) -> ProgressSnapshot {
        self.inner.lock_state().snapshot()
    }

    /// True while tasks are queued or one is executing.
    pub fn is_processing(&self) -> bool {
        self.inner.lock_state().is_processing()
    }

    fn spawn_drain(&self, epoch: u64) {
        let shared = Arc::clone(&self.inner);
        tokio::spawn(drain(shared, epoch));
    }
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new(Arc::new(UlidGenerator::new(SystemClock)))
    }
}

/// Mark the queue as processing if a drain run should start.
fn claim_drain(state: &mut QueueState) -> Option<u64> {
    if state.should_kick() {
        state.processing = true;
        Some(state.epoch)
    } else {
        None
    }
}

/// Drain loop: pop → run → settle → count, one task at a time.
async fn drain(shared: Arc<Shared>, epoch: u64) {
    // reset 後の新しい drain も、古いタスクが終わるまでここで待つ
    let _running = shared.run_lock.lock().await;

    loop {
        let task = {
            let mut state = shared.lock_state();
            if state.epoch != epoch {
                return;
            }
            if state.paused || state.cancelled {
                state.processing = false;
                return;
            }
            let Some(task) = state.pending.pop_front() else {
                state.processing = false;
                return;
            };
            state.active = Some(task.id());
            task
        };

        let task_id = task.id();
        debug!(%task_id, "task started");

        // 別タスクで実行: panic しても drain loop は止まらない
        let outcome = match tokio::spawn(task.run()).await {
            Ok(outcome) => outcome,
            Err(join_err) => Err(format!("task panicked: {join_err}")),
        };

        let mut state = shared.lock_state();
        if state.epoch != epoch {
            debug!(%task_id, "task settled after reset, not counted");
            return;
        }
        state.active = None;

        match outcome {
            Ok(()) => {
                state.batch.record_success();
                debug!(%task_id, "task completed");
            }
            Err(reason) => {
                state.batch.record_failure();
                warn!(%task_id, %reason, "task failed");
            }
        }

        if state.cancelled {
            state.discard_pending(&HeraldError::Cancelled);
            state.processing = false;
            info!("drain stopped: queue cancelled");
            return;
        }

        if state.pending.is_empty() {
            state.processing = false;
            if state.batch.is_declared() {
                let batch = &state.batch;
                info!(
                    batch_id = ?batch.batch_id,
                    total = batch.total,
                    completed = batch.completed,
                    failed = batch.failed,
                    "batch complete"
                );
            }
            return;
        }

        if state.paused {
            state.processing = false;
            info!(queued = state.pending.len(), "drain paused");
            return;
        }
    }
}
