//! Explicit retry policy for calls to flaky external services.

use std::fmt::Display;
use std::time::Duration;

use tracing::warn;

use crate::error::{Error, Result};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Delay schedule between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    Fixed(Duration),
    Exponential {
        initial: Duration,
        factor: u32,
        max: Duration,
    },
}

impl Backoff {
    /// Delay after the given failed attempt (1-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        match *self {
            Backoff::Fixed(delay) => delay,
            Backoff::Exponential {
                initial,
                factor,
                max,
            } => factor
                .checked_pow(attempt.saturating_sub(1))
                .and_then(|scale| initial.checked_mul(scale))
                .map_or(max, |delay| delay.min(max)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Backoff,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Backoff) -> Result<Self> {
        if max_attempts == 0 {
            return Err(Error::config("retry policy needs at least one attempt"));
        }
        Ok(Self {
            max_attempts,
            backoff,
        })
    }

    /// A single attempt with no retries.
    pub fn once() -> Self {
        Self {
            max_attempts: 1,
            backoff: Backoff::Fixed(Duration::ZERO),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Run `op` until it succeeds or the attempts are exhausted, sleeping
    /// between attempts. The last error is returned.
    pub fn run<T, E, F>(&self, label: &str, op: F) -> std::result::Result<T, E>
    where
        E: Display,
        F: FnMut(u32) -> std::result::Result<T, E>,
    {
        self.run_with(label, op, std::thread::sleep)
    }

    /// Same as [`RetryPolicy::run`] with an injectable sleep.
    pub fn run_with<T, E, F, S>(&self, label: &str, mut op: F, mut sleep: S) -> std::result::Result<T, E>
    where
        E: Display,
        F: FnMut(u32) -> std::result::Result<T, E>,
        S: FnMut(Duration),
    {
        let mut attempt = 1;
        loop {
            match op(attempt) {
                Ok(value) => return Ok(value),
                Err(err) if attempt < self.max_attempts => {
                    let delay = self.backoff.delay(attempt);
                    warn!(
                        operation = label,
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "attempt failed; retrying"
                    );
                    sleep(delay);
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: Backoff::Fixed(DEFAULT_RETRY_DELAY),
        }
    }
}
