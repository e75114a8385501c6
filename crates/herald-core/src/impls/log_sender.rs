//! TracingSender - 開発用の MessageSender
//!
//! Nothing leaves the process: each message is written to the log.

use async_trait::async_trait;
use tracing::info;

use crate::domain::OutboundMessage;
use crate::error::HeraldError;
use crate::ports::MessageSender;

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSender;

impl TracingSender {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MessageSender for TracingSender {
    async fn send(&self, message: &OutboundMessage) -> Result<(), HeraldError> {
        info!(to = %message.to, chars = message.body.chars().count(), body = %message.body, "message sent");
        Ok(())
    }
}
