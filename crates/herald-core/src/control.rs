//! Progress / control façade consumed by the HTTP layer.
//!
//! | verb       | route            |
//! |------------|------------------|
//! | `progress` | `GET /progress`  |
//! | `pause`    | `POST /pause`    |
//! | `resume`   | `POST /resume`   |
//! | `cancel`   | `POST /cancel`   |
//! | `reset`    | `POST /reset`    |

use crate::domain::{ControlResponse, ControlStatus, ProgressSnapshot};
use crate::queue::TaskQueue;

#[derive(Clone)]
pub struct QueueControl {
    queue: TaskQueue,
}

impl QueueControl {
    pub fn new(queue: TaskQueue) -> Self {
        Self { queue }
    }

    pub fn progress(&self) -> ProgressSnapshot {
        self.queue.progress()
    }

    pub fn pause(&self) -> ControlResponse {
        self.queue.pause();
        ControlResponse::new(
            ControlStatus::Paused,
            "Queue paused; the message being sent will finish first",
        )
    }

    pub fn resume(&self) -> ControlResponse {
        self.queue.resume();
        ControlResponse::new(ControlStatus::Resumed, "Queue resumed")
    }

    pub fn cancel(&self) -> ControlResponse {
        let discarded = self.queue.cancel();
        ControlResponse::new(
            ControlStatus::Cancelled,
            format!("Queue cancelled; {discarded} pending message(s) will not be sent"),
        )
    }

    pub fn reset(&self) -> ControlResponse {
        self.queue.reset();
        ControlResponse::new(ControlStatus::Reset, "Queue reset to its initial state")
    }
}
