//! Regional broadcast: one message to every employee of a region.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::Prepared;
use crate::domain::{OutboundMessage, Recipient};
use crate::error::HeraldError;

/// Body of `POST /sendRegionalMessages`.
///
/// `message` may contain `{name}`, replaced by each recipient's name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionalBroadcast {
    pub region: String,
    pub message: String,
    pub recipients: Vec<Recipient>,
}

impl RegionalBroadcast {
    pub(crate) fn prepare(self) -> Result<Prepared, HeraldError> {
        let region = self.region.trim();
        if region.is_empty() {
            return Err(HeraldError::invalid("region is required"));
        }
        let template = self.message.trim();
        if template.is_empty() {
            return Err(HeraldError::invalid("message is required"));
        }

        let mut prepared = Prepared::default();
        let in_region = self
            .recipients
            .iter()
            .filter(|r| r.region.trim().eq_ignore_ascii_case(region));

        for recipient in in_region {
            let body = template.replace("{name}", recipient.name.trim());
            match OutboundMessage::to(recipient, body) {
                Ok(msg) => prepared.messages.push(msg),
                Err(err) => {
                    warn!(name = %recipient.name, %err, "skipping recipient");
                    prepared.skipped += 1;
                }
            }
        }

        if prepared.messages.is_empty() {
            return Err(HeraldError::invalid(format!(
                "no reachable recipients in region {region:?}"
            )));
        }
        Ok(prepared)
    }
}
