//! Retry policy for eventual-consistency waits

use std::time::Duration;

/// Bounded retry with a pluggable backoff. Attached to the health
/// verifier, but carries no health-specific state so any other
/// poll-until-ready loop can reuse it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Always at least 1.
    pub max_attempts: usize,

    /// Delay schedule between attempts.
    pub backoff: Backoff,
}

/// Delay schedule between retry attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// The same delay after every failed attempt.
    Fixed(Duration),

    /// `initial * factor^(attempt-1)` after the given attempt fails.
    Exponential { initial: Duration, factor: u32 },
}

impl RetryPolicy {
    /// Fixed-delay policy, the baseline configuration.
    pub fn fixed(max_attempts: usize, delay: Duration) -> Self {
        Self {
            max_attempts,
            backoff: Backoff::Fixed(delay),
        }
    }

    /// Delay to wait after the given 1-based attempt fails. Callers skip
    /// the wait entirely after the final attempt.
    pub fn delay_for(&self, attempt: usize) -> Duration {
        match self.backoff {
            Backoff::Fixed(delay) => delay,
            Backoff::Exponential { initial, factor } => {
                let exponent = attempt.saturating_sub(1).min(31) as u32;
                initial.saturating_mul(factor.saturating_pow(exponent))
            }
        }
    }
}
