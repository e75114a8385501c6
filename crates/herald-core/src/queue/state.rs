//! Scheduling state guarded by the queue mutex.

use std::collections::VecDeque;

use super::task::QueuedTask;
use crate::domain::{BatchRecord, ProgressSnapshot, TaskId};
use crate::error::HeraldError;

/// All mutable scheduling state.
///
/// Design:
/// - Only the drain loop and the control verbs touch this.
/// - `epoch` is bumped by `reset`; a drain run that started in an older epoch
///   must not write anything back.
pub(crate) struct QueueState {
    pub pending: VecDeque<Box<dyn QueuedTask>>,

    /// Dequeued but not yet settled (at most one).
    pub active: Option<TaskId>,

    pub processing: bool,
    pub paused: bool,
    pub cancelled: bool,

    pub batch: BatchRecord,

    pub epoch: u64,
}

impl QueueState {
    pub fn new() -> Self {
        Self {
            pending: VecDeque::new(),
            active: None,
            processing: false,
            paused: false,
            cancelled: false,
            batch: BatchRecord::default(),
            epoch: 0,
        }
    }

    /// Idle, runnable and has work: a drain run should start.
    pub fn should_kick(&self) -> bool {
        !self.processing && !self.paused && !self.cancelled && !self.pending.is_empty()
    }

    pub fn is_processing(&self) -> bool {
        !self.pending.is_empty() || self.active.is_some()
    }

    /// Empty the pending list, rejecting every discarded handle with `reason`.
    ///
    /// Returns how many tasks were discarded.
    pub fn discard_pending(&mut self, reason: &HeraldError) -> usize {
        let n = self.pending.len();
        for task in self.pending.drain(..) {
            task.abandon(reason.clone());
        }
        n
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        let queued = self.pending.len();
        ProgressSnapshot {
            batch_id: self.batch.batch_id,
            total: self.batch.total,
            completed: self.batch.completed,
            failed: self.batch.failed,
            pending: queued + usize::from(self.active.is_some()),
            percentage: self.batch.percentage(),
            is_active: self.processing || queued > 0,
            is_paused: self.paused,
            is_cancelled: self.cancelled,
        }
    }
}
