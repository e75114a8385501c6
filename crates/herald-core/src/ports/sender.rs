//! MessageSender port - outbound transport.
//!
//! How a message physically reaches the employee (WhatsApp Cloud API, a
//! bot framework, ...) lives behind this trait.

use async_trait::async_trait;

use crate::domain::OutboundMessage;
use crate::error::HeraldError;

#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Deliver one message. May hang; callers wrap it in `send_with_timeout`.
    async fn send(&self, message: &OutboundMessage) -> Result<(), HeraldError>;
}
