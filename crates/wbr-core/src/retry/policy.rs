use std::time::Duration;

/// Outcome of a single attempt of a retried operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt<T, E> {
    /// The operation succeeded; stop and return the value.
    Done(T),
    /// Transient failure. `after` overrides the policy's own delay when set.
    Retry { error: E, after: Option<Duration> },
    /// Terminal failure; no further attempts are useful.
    Fatal(E),
}

impl<T, E> Attempt<T, E> {
    /// Transient failure that uses the policy's delay.
    pub fn retry(error: E) -> Self {
        Attempt::Retry { error, after: None }
    }

    /// Transient failure with an explicit delay before the next attempt.
    pub fn retry_after(error: E, after: Duration) -> Self {
        Attempt::Retry {
            error,
            after: Some(after),
        }
    }
}

/// How the default delay grows between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Always wait `base_delay`.
    Fixed,
    /// Wait `base_delay * 2^(attempt-1)`, capped at `max_delay`.
    Exponential,
}

/// Bounded retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    /// Base delay for backoff.
    pub base_delay: Duration,
    /// Upper bound on backoff delay.
    pub max_delay: Duration,
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            backoff: Backoff::Fixed,
        }
    }
}

impl RetryPolicy {
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay: delay,
            max_delay: delay,
            backoff: Backoff::Fixed,
        }
    }

    pub fn exponential(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            max_delay,
            backoff: Backoff::Exponential,
        }
    }

    /// Same policy with a different attempt bound.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Attempt bound actually enforced; zero still allows one try.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Default delay to wait after the given failed attempt.
    ///
    /// `attempt` is 1-based (1 = first attempt).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed => self.base_delay,
            Backoff::Exponential => {
                let exp = 1u32 << attempt.saturating_sub(1).min(16);
                self.base_delay.saturating_mul(exp).min(self.max_delay)
            }
        }
    }

    /// Whether another attempt is allowed after `attempt` tries.
    pub fn can_retry(&self, attempt: u32) -> bool {
        attempt < self.attempts()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_delay_is_constant() {
        let p = RetryPolicy::fixed(10, Duration::from_secs(1));
        assert_eq!(p.delay_for(1), Duration::from_secs(1));
        assert_eq!(p.delay_for(7), Duration::from_secs(1));
    }

    #[test]
    fn exponential_backoff_doubles_and_is_capped() {
        let p = RetryPolicy::exponential(20, Duration::from_secs(1), Duration::from_secs(10));
        assert_eq!(p.delay_for(1), Duration::from_secs(1));
        assert_eq!(p.delay_for(2), Duration::from_secs(2));
        assert_eq!(p.delay_for(3), Duration::from_secs(4));
        assert_eq!(p.delay_for(4), Duration::from_secs(8));
        assert_eq!(p.delay_for(5), Duration::from_secs(10));
        assert_eq!(p.delay_for(40), Duration::from_secs(10));
    }

    #[test]
    fn respects_max_attempts() {
        let p = RetryPolicy::fixed(3, Duration::ZERO);
        assert!(p.can_retry(1));
        assert!(p.can_retry(2));
        assert!(!p.can_retry(3));
    }

    #[test]
    fn zero_attempts_means_one_try() {
        let p = RetryPolicy::fixed(0, Duration::ZERO);
        assert_eq!(p.attempts(), 1);
        assert!(!p.can_retry(1));
    }
}
