//! Payslip distribution: a personal download link per employee.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::Prepared;
use crate::domain::{OutboundMessage, Recipient};
use crate::error::HeraldError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayslipLink {
    pub recipient: Recipient,
    pub url: String,
}

/// Body of `POST /sendPayslipLinks`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayslipDistribution {
    /// Pay period label shown to the employee, e.g. "2024-06" or "June 2024".
    pub period: String,
    pub links: Vec<PayslipLink>,
}

fn is_http_url(url: &str) -> bool {
    ["https://", "http://"]
        .iter()
        .any(|scheme| url.len() > scheme.len() && url.starts_with(scheme))
}

impl PayslipDistribution {
    pub(crate) fn prepare(self) -> Result<Prepared, HeraldError> {
        let period = self.period.trim();
        if period.is_empty() {
            return Err(HeraldError::invalid("period is required"));
        }
        if self.links.is_empty() {
            return Err(HeraldError::invalid("links must not be empty"));
        }

        let mut prepared = Prepared::default();
        for PayslipLink { recipient, url } in &self.links {
            let url = url.trim();
            if !is_http_url(url) {
                warn!(name = %recipient.name, url, "skipping payslip with invalid link");
                prepared.skipped += 1;
                continue;
            }

            let body = format!(
                "Hi {}, your payslip for {period} is ready: {url}",
                recipient.name.trim()
            );
            match OutboundMessage::to(recipient, body) {
                Ok(msg) => prepared.messages.push(msg),
                Err(err) => {
                    warn!(name = %recipient.name, %err, "skipping recipient");
                    prepared.skipped += 1;
                }
            }
        }

        if prepared.messages.is_empty() {
            return Err(HeraldError::invalid("no deliverable payslip links"));
        }
        Ok(prepared)
    }
}
