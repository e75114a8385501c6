//! Batch record: counters for one bulk operation.

use super::BatchId;

/// Aggregate counters for the current batch.
///
/// `total` is fixed by `start`; `completed` and `failed` only grow until the
/// next `start` or `clear`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchRecord {
    pub batch_id: Option<BatchId>,
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
}

impl BatchRecord {
    /// Begin a new batch, discarding previous counts.
    pub fn start(&mut self, batch_id: BatchId, total: usize) {
        self.batch_id = Some(batch_id);
        self.total = total;
        self.completed = 0;
        self.failed = 0;
    }

    /// Back to the initial (no batch) condition.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn record_success(&mut self) {
        self.completed += 1;
    }

    pub fn record_failure(&mut self) {
        self.failed += 1;
    }

    /// `round(completed / total * 100)`, or 0 without a declared total.
    pub fn percentage(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        let pct = (self.completed as f64 / self.total as f64 * 100.0).round() as u32;
        pct.min(100)
    }

    /// Has a declared batch with work in it.
    pub fn is_declared(&self) -> bool {
        self.total > 0
    }
}
