//! Configuration: a TOML file whose every key has a default.
//!
//! ```toml
//! [dispatch]
//! delay_base_ms = 10000
//! delay_variance_ms = 3000
//! send_timeout_ms = 30000
//! send_retries = 1
//! retry_backoff_base_ms = 2000
//! retry_backoff_variance_ms = 1000
//! count_handler_failures = false
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::dispatch::{DispatchOptions, Jitter, SendPolicy};
use crate::error::HeraldError;

/// Upper bound for `dispatch.send_retries`.
pub const MAX_SEND_RETRIES: u32 = 10;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeraldConfig {
    #[serde(default)]
    pub dispatch: DispatchConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchConfig {
    #[serde(default = "default_delay_base_ms")]
    pub delay_base_ms: u64,
    #[serde(default = "default_delay_variance_ms")]
    pub delay_variance_ms: u64,
    #[serde(default = "default_send_timeout_ms")]
    pub send_timeout_ms: u64,
    #[serde(default)]
    pub send_retries: u32,
    #[serde(default = "default_retry_backoff_base_ms")]
    pub retry_backoff_base_ms: u64,
    #[serde(default = "default_retry_backoff_variance_ms")]
    pub retry_backoff_variance_ms: u64,
    #[serde(default)]
    pub count_handler_failures: bool,
}

fn default_delay_base_ms() -> u64 { 10_000 }
fn default_delay_variance_ms() -> u64 { 3_000 }
fn default_send_timeout_ms() -> u64 { 30_000 }
fn default_retry_backoff_base_ms() -> u64 { 2_000 }
fn default_retry_backoff_variance_ms() -> u64 { 1_000 }

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            delay_base_ms: default_delay_base_ms(),
            delay_variance_ms: default_delay_variance_ms(),
            send_timeout_ms: default_send_timeout_ms(),
            send_retries: 0,
            retry_backoff_base_ms: default_retry_backoff_base_ms(),
            retry_backoff_variance_ms: default_retry_backoff_variance_ms(),
            count_handler_failures: false,
        }
    }
}

impl HeraldConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, HeraldError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| HeraldError::Config(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, HeraldError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| HeraldError::Config(format!("failed to read {}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    fn validate(&self) -> Result<(), HeraldError> {
        if self.dispatch.send_timeout_ms == 0 {
            return Err(HeraldError::Config(
                "dispatch.send_timeout_ms must be greater than zero".into(),
            ));
        }
        if self.dispatch.send_retries > MAX_SEND_RETRIES {
            return Err(HeraldError::Config(format!(
                "dispatch.send_retries must be at most {MAX_SEND_RETRIES}"
            )));
        }
        Ok(())
    }
}

impl DispatchConfig {
    pub fn pacing(&self) -> Jitter {
        Jitter::new(
            Duration::from_millis(self.delay_base_ms),
            Duration::from_millis(self.delay_variance_ms),
        )
    }

    pub fn options(&self) -> DispatchOptions {
        DispatchOptions {
            pacing: self.pacing(),
            count_handler_failures: self.count_handler_failures,
        }
    }

    pub fn send_policy(&self) -> SendPolicy {
        SendPolicy::new(Duration::from_millis(self.send_timeout_ms))
            .with_retries(self.send_retries)
            .with_backoff(Jitter::new(
                Duration::from_millis(self.retry_backoff_base_ms),
                Duration::from_millis(self.retry_backoff_variance_ms),
            ))
    }
}
