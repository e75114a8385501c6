//! Campaign triggers: validate a request, then fan it out as a batch.
//!
//! Each trigger answers immediately with a `CampaignAccepted`; delivery
//! happens in the background and is followed through `QueueControl`.

mod payslip;
mod regional;

pub use payslip::{PayslipDistribution, PayslipLink};
pub use regional::RegionalBroadcast;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::dispatch::{BatchDispatcher, SendPolicy, send_with_timeout};
use crate::domain::{BatchId, OutboundMessage};
use crate::error::HeraldError;
use crate::ports::{ItemHandler, MessageSender};

/// Messages built from a request, plus how many entries were dropped.
#[derive(Debug, Default)]
pub(crate) struct Prepared {
    pub(crate) messages: Vec<OutboundMessage>,
    pub(crate) skipped: usize,
}

/// Immediate answer to a campaign trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignAccepted {
    pub message: String,
    pub total_users: usize,
    pub skipped: usize,
    pub batch_id: BatchId,
}

/// Delivers one message through the sender, bounded by the send policy.
struct Deliver {
    sender: Arc<dyn MessageSender>,
    policy: SendPolicy,
}

#[async_trait]
impl ItemHandler<OutboundMessage> for Deliver {
    async fn handle(&self, message: OutboundMessage) -> Result<(), HeraldError> {
        let sender = &self.sender;
        let message = &message;
        send_with_timeout(|| sender.send(message), &self.policy).await
    }
}

#[derive(Clone)]
pub struct Campaigns {
    dispatcher: BatchDispatcher,
    deliver: Arc<Deliver>,
}

impl Campaigns {
    pub fn new(dispatcher: BatchDispatcher, sender: Arc<dyn MessageSender>, policy: SendPolicy) -> Self {
        Self {
            dispatcher,
            deliver: Arc::new(Deliver { sender, policy }),
        }
    }

    pub fn regional_broadcast(&self, request: RegionalBroadcast) -> Result<CampaignAccepted, HeraldError> {
        let region = request.region.trim().to_owned();
        let prepared = request.prepare()?;
        self.launch(prepared, format!("Regional message queued for region {region}"))
    }

    pub fn payslip_distribution(&self, request: PayslipDistribution) -> Result<CampaignAccepted, HeraldError> {
        let period = request.period.trim().to_owned();
        let prepared = request.prepare()?;
        self.launch(prepared, format!("Payslip links for {period} queued"))
    }

    fn launch(&self, prepared: Prepared, message: String) -> Result<CampaignAccepted, HeraldError> {
        let Prepared { messages, skipped } = prepared;
        let total_users = messages.len();
        let batch_id = self
            .dispatcher
            .process_batch(messages, Arc::clone(&self.deliver))?;

        info!(%batch_id, total_users, skipped, "campaign accepted");
        Ok(CampaignAccepted {
            message,
            total_users,
            skipped,
            batch_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{DispatchOptions, Jitter};
    use crate::domain::Recipient;
    use crate::queue::TaskQueue;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::Notify;

    #[derive(Default)]
    struct RecordingSender {
        sent: Mutex<Vec<OutboundMessage>>,
        hang_for: Option<String>,
        /// Notified when a send starts hanging.
        hung: Notify,
    }

    #[async_trait]
    impl MessageSender for RecordingSender {
        async fn send(&self, message: &OutboundMessage) -> Result<(), HeraldError> {
            if self.hang_for.as_deref() == Some(message.to.as_str()) {
                self.hung.notify_one();
                std::future::pending::<()>().await;
            }
            self.sent.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

    fn campaigns(sender: Arc<RecordingSender>, count_failures: bool) -> Campaigns {
        let options = DispatchOptions {
            pacing: Jitter::none(),
            count_handler_failures: count_failures,
        };
        let dispatcher = BatchDispatcher::with_options(TaskQueue::default(), options);
        Campaigns::new(dispatcher, sender, SendPolicy::new(Duration::from_millis(50)))
    }

    async fn wait_idle(c: &Campaigns) {
        while c.dispatcher.is_processing() || c.dispatcher.progress().is_active {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    }

    fn broadcast() -> RegionalBroadcast {
        RegionalBroadcast {
            region: "North".into(),
            message: "Hi {name}, payroll closes Friday.".into(),
            recipients: vec![
                Recipient::new("Ana", "50688880001", "north"),
                Recipient::new("Luis", "50688880002", "south"),
                Recipient::new("Marta", "50688880003", "north"),
            ],
        }
    }

    #[tokio::test]
    async fn regional_broadcast_delivers_to_the_region() {
        let sender = Arc::new(RecordingSender::default());
        let c = campaigns(Arc::clone(&sender), false);

        let accepted = c.regional_broadcast(broadcast()).unwrap();
        assert_eq!(accepted.total_users, 2);
        assert_eq!(accepted.skipped, 0);
        assert_eq!(c.dispatcher.progress().batch_id, Some(accepted.batch_id));

        wait_idle(&c).await;
        let sent = sender.sent.lock().unwrap();
        let to: Vec<_> = sent.iter().map(|m| m.to.as_str()).collect();
        assert_eq!(to, vec!["50688880001", "50688880003"]);
        assert_eq!(c.dispatcher.progress().completed, 2);
    }

    #[tokio::test]
    async fn accepted_body_uses_camel_case() {
        let c = campaigns(Arc::new(RecordingSender::default()), false);
        let accepted = c.regional_broadcast(broadcast()).unwrap();

        let json = serde_json::to_value(&accepted).unwrap();
        assert_eq!(json["totalUsers"], 2);
        assert_eq!(json["batchId"], accepted.batch_id.as_ulid().to_string());
        wait_idle(&c).await;
    }

    #[tokio::test]
    async fn invalid_request_leaves_the_queue_untouched() {
        let c = campaigns(Arc::new(RecordingSender::default()), false);
        let mut request = broadcast();
        request.message = String::new();

        let err = c.regional_broadcast(request).unwrap_err();
        assert!(matches!(err, HeraldError::InvalidRequest(_)));
        assert_eq!(c.dispatcher.progress().batch_id, None);
    }

    #[tokio::test]
    async fn trigger_is_rejected_while_a_campaign_is_running() {
        let sender = Arc::new(RecordingSender {
            hang_for: Some("50688880001".into()),
            ..Default::default()
        });
        let dispatcher = BatchDispatcher::with_options(
            TaskQueue::default(),
            DispatchOptions {
                pacing: Jitter::none(),
                count_handler_failures: false,
            },
        );
        let c = Campaigns::new(dispatcher, sender.clone(), SendPolicy::new(Duration::from_secs(60)));
        c.regional_broadcast(broadcast()).unwrap();

        // the first message is mid-send
        sender.hung.notified().await;
        assert_eq!(c.dispatcher.progress().completed, 0);
        assert!(c.dispatcher.is_processing());

        let payslips = PayslipDistribution {
            period: "June 2024".into(),
            links: vec![PayslipLink {
                recipient: Recipient::new("Ana", "50688880001", ""),
                url: "https://hr.example.com/p/ana".into(),
            }],
        };
        let err = c.payslip_distribution(payslips).unwrap_err();
        assert!(matches!(err, HeraldError::Busy));
        assert_eq!(c.dispatcher.progress().total, 2);

        c.dispatcher.queue().reset();
    }

    #[tokio::test]
    async fn hung_send_times_out_without_stalling_the_batch() {
        let sender = Arc::new(RecordingSender {
            hang_for: Some("50688880001".into()),
            ..Default::default()
        });
        let c = campaigns(Arc::clone(&sender), true);

        c.regional_broadcast(broadcast()).unwrap();
        tokio::time::timeout(Duration::from_secs(5), wait_idle(&c))
            .await
            .unwrap();

        let p = c.dispatcher.progress();
        assert_eq!(p.failed, 1);
        assert_eq!(p.completed, 1);
        assert_eq!(sender.sent.lock().unwrap()[0].to, "50688880003");
    }
}
