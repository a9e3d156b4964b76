//! Bounded retry for transient fetch failures.

use std::thread;
use std::time::Duration;

use tracing::warn;

use super::error::FetchError;

/// Default number of attempts, including the first.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default pause between attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// How a fetch handles transient failures.
///
/// Only errors reporting [`FetchError::is_retryable`] are repeated;
/// authentication and not-found errors surface immediately.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RetryPolicy {
    /// No retries - fail immediately on error.
    None,

    /// Fixed number of attempts with constant delay between them.
    Fixed {
        /// Maximum number of attempts (including the initial attempt).
        max_attempts: u32,
        /// Delay between attempts.
        delay: Duration,
    },
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY)
    }
}

impl RetryPolicy {
    /// Creates a fixed retry policy.
    ///
    /// `max_attempts` of 0 or 1 disables retrying.
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        if max_attempts <= 1 {
            Self::None
        } else {
            Self::Fixed {
                max_attempts,
                delay,
            }
        }
    }

    /// Returns the maximum number of attempts for this policy.
    pub fn max_attempts(&self) -> u32 {
        match self {
            Self::None => 1,
            Self::Fixed { max_attempts, .. } => *max_attempts,
        }
    }

    /// The delay before the next attempt after `attempt` (1-based) failed,
    /// or `None` once attempts are exhausted.
    pub fn delay_for_attempt(&self, attempt: u32) -> Option<Duration> {
        match self {
            Self::None => None,
            Self::Fixed {
                max_attempts,
                delay,
            } => (attempt < *max_attempts).then_some(*delay),
        }
    }

    /// Run `op`, repeating it on retryable errors.
    ///
    /// `target` names the resource in log output.
    pub fn run<T>(
        &self,
        target: &str,
        mut op: impl FnMut() -> Result<T, FetchError>,
    ) -> Result<T, FetchError> {
        let mut attempt = 1;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() => match self.delay_for_attempt(attempt) {
                    Some(delay) => {
                        warn!(
                            target_resource = target,
                            attempt,
                            max_attempts = self.max_attempts(),
                            error = %e,
                            "Fetch failed, retrying"
                        );
                        if !delay.is_zero() {
                            thread::sleep(delay);
                        }
                        attempt += 1;
                    }
                    None => return Err(e),
                },
                Err(e) => return Err(e),
            }
        }
    }
}
