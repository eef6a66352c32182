use rand::Rng;
use std::time::Duration;

/// Source of the uniform random multiplier for backoff jitter.
///
/// Injectable so tests can pin the multiplier and assert exact delay bounds.
pub trait JitterSource {
    /// A uniformly distributed value in [0, 1).
    fn unit(&mut self) -> f64;
}

/// Production jitter source drawing from the thread-local RNG.
#[derive(Debug, Default)]
pub struct ThreadRngJitter;

impl JitterSource for ThreadRngJitter {
    fn unit(&mut self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// The retry budget is exhausted; surface the last error.
    GiveUp,
    /// Retry the same chunk after the given delay.
    RetryAfter(Duration),
}

/// Full-jitter exponential backoff policy.
///
/// The delay for the n-th consecutive failure is `unit * 2^n` seconds, where
/// `unit` is uniform in [0, 1). The exponent grows with every consecutive
/// failure regardless of failure kind and resets only on a successful chunk
/// (tracked by the caller, not here).
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum number of consecutive failed sends before giving up.
    pub max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_retries: 5 }
    }
}

impl RetryPolicy {
    /// Decide whether to retry after the `consecutive_failures`-th failure
    /// in a row (1-based) and, if so, for how long to back off.
    pub fn decide(
        &self,
        consecutive_failures: u32,
        jitter: &mut dyn JitterSource,
    ) -> RetryDecision {
        if consecutive_failures > self.max_retries {
            return RetryDecision::GiveUp;
        }
        // Cap the exponent so a large configured budget cannot overflow.
        let ceiling = 2f64.powi(consecutive_failures.min(32) as i32);
        RetryDecision::RetryAfter(Duration::from_secs_f64(jitter.unit() * ceiling))
    }
}
