use std::time::Duration;

use thiserror::Error;

/// Which plane an error belongs to.
///
/// - ControlPlane: surfaced synchronously to whoever asked (batch never started)
/// - ExecutionPlane: contained per task, only affects that task's accounting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ControlPlane,
    ExecutionPlane,
}

#[derive(Debug, Clone, Error)]
pub enum HeraldError {
    #[error("a bulk operation is already in progress")]
    Busy,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("send timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("handler failed: {0}")]
    Handler(String),

    #[error("task failed: {0}")]
    Task(String),

    #[error("task cancelled before it started")]
    Cancelled,

    #[error("task discarded by queue reset")]
    Reset,

    #[error("task dropped without settling")]
    Abandoned,
}

impl HeraldError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            HeraldError::Busy | HeraldError::InvalidRequest(_) | HeraldError::Config(_) => {
                ErrorKind::ControlPlane
            }
            _ => ErrorKind::ExecutionPlane,
        }
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        HeraldError::InvalidRequest(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busy_is_control_plane() {
        assert_eq!(HeraldError::Busy.kind(), ErrorKind::ControlPlane);
        assert_eq!(HeraldError::invalid("x").kind(), ErrorKind::ControlPlane);
    }

    #[test]
    fn send_failures_are_execution_plane() {
        let timeout = HeraldError::Timeout(Duration::from_millis(100));
        assert_eq!(timeout.kind(), ErrorKind::ExecutionPlane);
        assert_eq!(timeout.to_string(), "send timed out after 100ms");
        assert_eq!(HeraldError::Cancelled.kind(), ErrorKind::ExecutionPlane);
    }
}
