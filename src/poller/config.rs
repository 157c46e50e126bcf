//! Status poller configuration.

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

// ============================================================================
// Constants
// ============================================================================

/// Delay between successful polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Delay before retrying a failed poll.
pub const DEFAULT_ERROR_RETRY_INTERVAL: Duration = Duration::from_secs(10);

/// Consecutive failed polls tolerated before the poller stops.
pub const DEFAULT_MAX_RETRIES: u32 = 5;

// ============================================================================
// PollingConfig
// ============================================================================

/// Configuration for [`super::StatusPoller`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollingConfig {
    /// Delay between successful polls.
    pub interval: Duration,

    /// When `false`, [`super::StatusPoller::start`] does nothing.
    pub enabled: bool,

    /// Retry failed polls instead of stopping.
    pub retry_on_error: bool,

    /// Delay before retrying a failed poll.
    pub error_retry_interval: Duration,

    /// Consecutive failures tolerated before stopping.
    pub max_retries: u32,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            enabled: true,
            retry_on_error: true,
            error_retry_interval: DEFAULT_ERROR_RETRY_INTERVAL,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl PollingConfig {
    /// Creates a configuration with default settings.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the poll interval.
    #[inline]
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Enables or disables polling.
    #[inline]
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Enables or disables retry on error.
    #[inline]
    #[must_use]
    pub fn with_retry_on_error(mut self, retry_on_error: bool) -> Self {
        self.retry_on_error = retry_on_error;
        self
    }

    /// Sets the delay before retrying a failed poll.
    #[inline]
    #[must_use]
    pub fn with_error_retry_interval(mut self, interval: Duration) -> Self {
        self.error_retry_interval = interval;
        self
    }

    /// Sets the retry budget.
    #[inline]
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Returns this configuration with every field set in `update`
    /// replaced.
    #[must_use]
    pub fn merged(&self, update: &PollingConfigUpdate) -> Self {
        Self {
            interval: update.interval.unwrap_or(self.interval),
            enabled: update.enabled.unwrap_or(self.enabled),
            retry_on_error: update.retry_on_error.unwrap_or(self.retry_on_error),
            error_retry_interval: update
                .error_retry_interval
                .unwrap_or(self.error_retry_interval),
            max_retries: update.max_retries.unwrap_or(self.max_retries),
        }
    }
}

// ============================================================================
// PollingConfigUpdate
// ============================================================================

/// Partial configuration accepted by [`super::StatusPoller::set_config`].
///
/// Unset fields keep their current value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollingConfigUpdate {
    /// New poll interval.
    pub interval: Option<Duration>,
    /// New enabled flag.
    pub enabled: Option<bool>,
    /// New retry-on-error flag.
    pub retry_on_error: Option<bool>,
    /// New error retry interval.
    pub error_retry_interval: Option<Duration>,
    /// New retry budget.
    pub max_retries: Option<u32>,
}

impl PollingConfigUpdate {
    /// Creates an empty update.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the poll interval.
    #[inline]
    #[must_use]
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Sets the enabled flag.
    #[inline]
    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    /// Sets the retry-on-error flag.
    #[inline]
    #[must_use]
    pub fn retry_on_error(mut self, retry_on_error: bool) -> Self {
        self.retry_on_error = Some(retry_on_error);
        self
    }

    /// Sets the error retry interval.
    #[inline]
    #[must_use]
    pub fn error_retry_interval(mut self, interval: Duration) -> Self {
        self.error_retry_interval = Some(interval);
        self
    }

    /// Sets the retry budget.
    #[inline]
    #[must_use]
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PollingConfig::default();
        assert_eq!(config.interval, Duration::from_secs(5));
        assert!(config.enabled);
        assert!(config.retry_on_error);
        assert_eq!(config.error_retry_interval, Duration::from_secs(10));
        assert_eq!(config.max_retries, 5);
    }

    #[test]
    fn test_empty_update_is_identity() {
        let config = PollingConfig::new().with_interval(Duration::from_secs(1));
        assert_eq!(config.merged(&PollingConfigUpdate::new()), config);
    }

    #[test]
    fn test_update_replaces_only_set_fields() {
        let config = PollingConfig::new();
        let merged = config.merged(
            &PollingConfigUpdate::new()
                .interval(Duration::from_secs(2))
                .max_retries(1),
        );

        assert_eq!(merged.interval, Duration::from_secs(2));
        assert_eq!(merged.max_retries, 1);
        assert_eq!(merged.error_retry_interval, config.error_retry_interval);
        assert!(merged.enabled);
    }

    #[test]
    fn test_builder_methods() {
        let config = PollingConfig::new()
            .with_enabled(false)
            .with_retry_on_error(false)
            .with_error_retry_interval(Duration::from_millis(250));

        assert!(!config.enabled);
        assert!(!config.retry_on_error);
        assert_eq!(config.error_retry_interval, Duration::from_millis(250));
    }
}
