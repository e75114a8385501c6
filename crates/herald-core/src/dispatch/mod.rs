//! Dispatch: batch fan-out, pacing, and send timeouts.

mod dispatcher;
mod pacing;
mod timeout;

pub use dispatcher::{BatchDispatcher, DispatchOptions};
pub use pacing::Jitter;
pub use timeout::{SendPolicy, send_with_timeout};
