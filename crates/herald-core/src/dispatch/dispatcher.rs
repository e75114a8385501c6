//! BatchDispatcher: drives a list of items through the TaskQueue.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::Jitter;
use crate::domain::{BatchId, ProgressSnapshot};
use crate::error::HeraldError;
use crate::ports::ItemHandler;
use crate::queue::TaskQueue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchOptions {
    /// Delay before each item's handler runs.
    pub pacing: Jitter,

    /// Count handler errors in `failed` instead of logging and moving on.
    pub count_handler_failures: bool,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            pacing: Jitter::inter_task_default(),
            count_handler_failures: false,
        }
    }
}

/// Turns domain items into paced queue tasks.
#[derive(Clone)]
pub struct BatchDispatcher {
    queue: TaskQueue,
    defaults: DispatchOptions,
}

impl BatchDispatcher {
    pub fn new(queue: TaskQueue) -> Self {
        Self::with_options(queue, DispatchOptions::default())
    }

    pub fn with_options(queue: TaskQueue, defaults: DispatchOptions) -> Self {
        Self { queue, defaults }
    }

    pub fn queue(&self) -> &TaskQueue {
        &self.queue
    }

    /// `process_batch_with` using the dispatcher's default options.
    pub fn process_batch<T, H>(&self, items: Vec<T>, handler: Arc<H>) -> Result<BatchId, HeraldError>
    where
        T: Send + 'static,
        H: ItemHandler<T> + ?Sized + 'static,
    {
        self.process_batch_with(items, handler, self.defaults)
    }

    /// Start a batch and enqueue one paced task per item.
    ///
    /// Returns as soon as everything is enqueued; poll `progress()` to follow
    /// execution. Rejected with `Busy` while a previous batch is draining;
    /// admission and enqueue are a single step on the queue.
    pub fn process_batch_with<T, H>(
        &self,
        items: Vec<T>,
        handler: Arc<H>,
        options: DispatchOptions,
    ) -> Result<BatchId, HeraldError>
    where
        T: Send + 'static,
        H: ItemHandler<T> + ?Sized + 'static,
    {
        let total = items.len();
        let works: Vec<_> = items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                let handler = Arc::clone(&handler);
                move || run_item(index, item, handler, options)
            })
            .collect();

        // fire-and-continue: the handles are dropped, the queue keeps the work
        let (batch_id, _handles) = self.queue.submit_batch(works)?;
        info!(%batch_id, total, "batch enqueued");
        Ok(batch_id)
    }

    pub fn is_processing(&self) -> bool {
        self.queue.is_processing()
    }

    pub fn progress(&self) -> ProgressSnapshot {
        self.queue.progress()
    }
}

async fn run_item<T, H>(
    index: usize,
    item: T,
    handler: Arc<H>,
    options: DispatchOptions,
) -> Result<(), HeraldError>
where
    T: Send + 'static,
    H: ItemHandler<T> + ?Sized,
{
    let delay = options.pacing.sample();
    debug!(index, delay_ms = delay.as_millis() as u64, "pacing");
    tokio::time::sleep(delay).await;

    match handler.handle(item).await {
        Ok(()) => Ok(()),
        Err(err) => {
            warn!(index, %err, "item handler failed");
            if options.count_handler_failures {
                Err(err)
            } else {
                Ok(())
            }
        }
    }
}
