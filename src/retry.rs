use std::time::Duration;

use rand::Rng;

/// Retry bounds for transport failures.
///
/// The first attempt is not counted: `max_retries = 3` allows up to four
/// attempts in total.
#[derive(Clone, Debug, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of retries after the initial attempt.
    pub max_retries: usize,
    /// Lower bound of the delay between attempts, in milliseconds.
    pub min_delay_ms: u64,
    /// Upper bound of the delay between attempts, in milliseconds.
    pub max_delay_ms: u64,
    /// Growth factor applied per attempt (exponential strategy).
    pub factor: f64,
    /// Randomizes each delay by a factor in `[1, 2)` before clamping.
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            min_delay_ms: 500,
            max_delay_ms: 10_000,
            factor: 2.0,
            jitter: false,
        }
    }
}

impl RetryPolicy {
    /// Builds a policy from the three bounds, keeping the default curve.
    pub fn new(max_retries: usize, min_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            max_retries,
            min_delay_ms,
            max_delay_ms,
            ..Self::default()
        }
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        Self::new(0, 0, 0)
    }

    pub fn with_factor(mut self, factor: f64) -> Self {
        self.factor = factor;
        self
    }

    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Whether another attempt may follow the failed attempt `attempt`.
    pub fn allows_retry(&self, attempt: usize) -> bool {
        attempt < self.max_retries
    }

    /// Delay to wait after the failed attempt `attempt` (0-indexed).
    ///
    /// Always within `[min_delay_ms, max_delay_ms]`. If the bounds are
    /// inverted, `max_delay_ms` wins.
    pub fn delay(&self, attempt: usize) -> Duration {
        let min = self.min_delay_ms as f64;
        let max = self.max_delay_ms as f64;
        let exp = attempt.min(32) as i32;
        let mut delay = min * self.factor.max(1.0).powi(exp);
        if self.jitter {
            delay *= rand::rng().random_range(1.0..2.0);
        }
        let clamped = delay.min(max).max(min.min(max));
        Duration::from_millis(clamped.round() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::RetryPolicy;
    use std::time::Duration;

    #[test]
    fn default_policy_matches_service_defaults() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 5);
        assert_eq!(policy.min_delay_ms, 500);
        assert_eq!(policy.max_delay_ms, 10_000);
    }

    #[test]
    fn delay_grows_exponentially_until_capped() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay(0), Duration::from_millis(500));
        assert_eq!(policy.delay(1), Duration::from_millis(1_000));
        assert_eq!(policy.delay(2), Duration::from_millis(2_000));
        assert_eq!(policy.delay(5), Duration::from_millis(10_000));
        assert_eq!(policy.delay(usize::MAX), Duration::from_millis(10_000));
    }

    #[test]
    fn jittered_delay_stays_within_bounds() {
        let policy = RetryPolicy::new(10, 100, 1_000).with_jitter(true);
        for attempt in 0..10 {
            let delay = policy.delay(attempt);
            assert!(delay >= Duration::from_millis(100), "{delay:?} below min");
            assert!(delay <= Duration::from_millis(1_000), "{delay:?} above max");
        }
    }

    #[test]
    fn inverted_bounds_use_max() {
        let policy = RetryPolicy::new(1, 500, 100);
        assert_eq!(policy.delay(0), Duration::from_millis(100));
    }

    #[test]
    fn allows_retry_counts_retries_not_attempts() {
        let policy = RetryPolicy::new(3, 1, 1);
        assert!(policy.allows_retry(0));
        assert!(policy.allows_retry(2));
        assert!(!policy.allows_retry(3));
        assert!(!RetryPolicy::none().allows_retry(0));
    }
}
