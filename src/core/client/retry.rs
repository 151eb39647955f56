use std::time::Duration;

/// Specifies the backoff strategy for retrying failed requests.
#[derive(Clone, Debug)]
pub enum Backoff {
    /// Uses a fixed delay between retries.
    Fixed(Duration),
    /// Uses an exponential delay between retries.
    /// The delay is calculated as `base * (factor ^ attempt)`, capped at `max`.
    Exponential {
        /// The initial backoff duration.
        base: Duration,
        /// The multiplicative factor for each subsequent retry.
        factor: f64,
        /// The maximum duration to wait between retries.
        max: Duration,
    },
}

impl Backoff {
    /// Delay before retry number `attempt` (zero-based).
    #[must_use]
    pub fn delay(&self, attempt: u32) -> Duration {
        match self {
            Self::Fixed(d) => *d,
            Self::Exponential { base, factor, max } => {
                let exp = i32::try_from(attempt).unwrap_or(i32::MAX);
                let secs = base.as_secs_f64() * factor.powi(exp);
                if secs.is_finite() && secs < max.as_secs_f64() {
                    Duration::from_secs_f64(secs)
                } else {
                    *max
                }
            }
        }
    }
}

/// Configuration for the automatic retry mechanism of the query layer.
///
/// The raw request wrapper never retries on its own; this policy is applied
/// by [`crate::NewsClient`] when fetching pages, details and stats.
#[derive(Clone, Debug)]
pub struct RetryConfig {
    /// Enables or disables the retry mechanism.
    pub enabled: bool,
    /// The maximum number of retries to attempt. The total number of attempts will be `max_retries + 1`.
    pub max_retries: u32,
    /// The backoff strategy to use between retries.
    pub backoff: Backoff,
    /// A list of HTTP status codes that should trigger a retry.
    pub retry_on_status: Vec<u16>,
    /// Whether to retry on request timeouts.
    pub retry_on_timeout: bool,
    /// Whether to retry on connection errors.
    pub retry_on_connect: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_retries: 1,
            backoff: Backoff::Exponential {
                base: Duration::from_millis(200),
                factor: 2.0,
                max: Duration::from_secs(3),
            },
            retry_on_status: vec![502, 503, 504],
            retry_on_timeout: true,
            retry_on_connect: true,
        }
    }
}

impl RetryConfig {
    /// A policy that never retries.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

/// Defines the behavior of the in-memory cache for an API call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheMode {
    /// Read from the cache if a fresh entry is present; otherwise, fetch from the network
    /// and write the response to the cache. (Default)
    Use,
    /// Always fetch from the network, bypassing any cached entry, and write the new response to the cache.
    Refresh,
    /// Always fetch from the network and do not read from or write to the cache.
    Bypass,
}
