//! Domain model (ids, batch counters, progress views, messages).

pub mod batch;
pub mod ids;
pub mod message;
pub mod progress;

pub use batch::BatchRecord;
pub use ids::{BatchId, TaskId};
pub use message::{OutboundMessage, Recipient, normalize_phone};
pub use progress::{ControlResponse, ControlStatus, ProgressSnapshot};
