//! Queue module: single-worker task queue, its state, and task handles.

mod state;
mod task;
mod task_queue;

pub use task::TaskHandle;
pub use task_queue::TaskQueue;
