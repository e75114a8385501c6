//! Serializable views for the progress / control surface.

use serde::{Deserialize, Serialize};

use super::BatchId;

/// Point-in-time view of the queue, shaped for `GET /progress`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    pub batch_id: Option<BatchId>,
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    /// Queued tasks plus the active one.
    pub pending: usize,
    pub percentage: u32,
    pub is_active: bool,
    pub is_paused: bool,
    pub is_cancelled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlStatus {
    Paused,
    Resumed,
    Cancelled,
    Reset,
}

/// Answer to one of the control verbs (`POST /pause` etc.).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlResponse {
    pub status: ControlStatus,
    pub message: String,
}

impl ControlResponse {
    pub fn new(status: ControlStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}
