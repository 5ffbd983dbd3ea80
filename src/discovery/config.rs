//! Discovery engine configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ResourceError;

/// Default poll interval in seconds.
pub const DEFAULT_POLL_INTERVAL: u64 = 5;

/// Configuration for the discovery engine's poll loop.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use hateoas_bridge::discovery::DiscoveryConfig;
///
/// let config = DiscoveryConfig::new("acc-123")
///     .with_poll_interval(Duration::from_secs(2));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// The account resource to watch. Must be non-empty.
    pub account_id: String,
    /// Time between poll ticks.
    #[serde(default = "default_poll_interval")]
    pub poll_interval: Duration,
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(DEFAULT_POLL_INTERVAL)
}

impl DiscoveryConfig {
    /// Create a configuration watching `account_id` at the default
    /// interval.
    pub fn new(account_id: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            poll_interval: default_poll_interval(),
        }
    }

    /// Builder: set the poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// [`ResourceError::InvalidResource`] for an empty account id or a
    /// zero poll interval.
    pub fn validate(&self) -> Result<(), ResourceError> {
        if self.account_id.trim().is_empty() {
            return Err(ResourceError::InvalidResource {
                message: "account id must not be empty".to_string(),
            });
        }
        if self.poll_interval.is_zero() {
            return Err(ResourceError::InvalidResource {
                message: "poll interval must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}
