//! Backoff configuration for transient provider failures.

use backon::ExponentialBuilder;
use std::time::Duration;

/// Configuration for retrying idempotent provider calls.
///
/// Only calls whose error reports [`is_retryable`](crate::RetryableError::is_retryable)
/// are repeated (network failures, 429, 5xx). Polling itself is governed by
/// [`PollPolicy`](crate::PollPolicy), not by this type.
///
/// ```rust
/// use esim_gateway::RetryConfig;
/// use std::time::Duration;
///
/// let config = RetryConfig::default()
///     .with_min_delay(Duration::from_millis(250))
///     .with_max_delay(Duration::from_secs(4))
///     .with_max_retries(2)
///     .with_jitter(false);
///
/// assert_eq!(config.max_retries, 2);
/// ```
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Delay before the first retry (default: 500 ms).
    pub min_delay: Duration,
    /// Upper bound for any single delay (default: 5 seconds).
    pub max_delay: Duration,
    /// Exponential backoff factor (default: 2.0).
    pub factor: f32,
    /// Maximum number of retries after the first attempt (default: 3).
    pub max_retries: usize,
    /// Randomise delays to avoid synchronised retries (default: true).
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(5),
            factor: 2.0,
            max_retries: 3,
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// A configuration that never retries.
    pub fn disabled() -> Self {
        Self::default().with_max_retries(0)
    }

    /// Set the delay before the first retry.
    pub fn with_min_delay(mut self, delay: Duration) -> Self {
        self.min_delay = delay;
        self
    }

    /// Set the upper bound for a single delay.
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Set the exponential backoff factor.
    pub fn with_factor(mut self, factor: f32) -> Self {
        self.factor = factor;
        self
    }

    /// Set the maximum number of retries.
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Enable or disable jitter.
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Build a backoff strategy from this configuration.
    pub fn build_strategy(&self) -> ExponentialBuilder {
        let builder = ExponentialBuilder::default()
            .with_min_delay(self.min_delay)
            .with_max_delay(self.max_delay)
            .with_factor(self.factor)
            .with_max_times(self.max_retries);

        if self.jitter {
            builder.with_jitter()
        } else {
            builder
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backon::BackoffBuilder;

    #[test]
    fn test_default_retry_config() {
        let config = RetryConfig::default();
        assert_eq!(config.min_delay, Duration::from_millis(500));
        assert_eq!(config.max_delay, Duration::from_secs(5));
        assert_eq!(config.max_retries, 3);
        assert!(config.jitter);
    }

    #[test]
    fn test_disabled_strategy_yields_no_delays() {
        let mut backoff = RetryConfig::disabled().build_strategy().build();
        assert_eq!(backoff.next(), None);
    }

    #[test]
    fn test_strategy_without_jitter_is_exponential() {
        // backon scales by an f32 factor, so compare at millisecond precision
        let delays: Vec<u128> = RetryConfig::default()
            .with_min_delay(Duration::from_millis(100))
            .with_max_delay(Duration::from_secs(1))
            .with_jitter(false)
            .build_strategy()
            .build()
            .map(|delay| delay.as_millis())
            .collect();

        assert_eq!(delays, vec![100, 200, 400]);
    }
}
