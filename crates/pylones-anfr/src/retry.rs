//! Bounded retry for ANFR requests.
//!
//! [`RetryPolicy::run`] drives any fallible async operation for at most
//! `max_attempts` tries. Every [`AnfrError`] counts as a failed attempt:
//! transport errors, non-2xx statuses and malformed bodies alike. The delay
//! between attempts comes from the policy's [`Backoff`]; the default is to
//! retry immediately.

use std::future::Future;
use std::time::Duration;

use pylones_core::Backoff;

use crate::error::AnfrError;

const MAX_DELAY_MS: u64 = 60_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total tries, first one included. Treated as at least 1.
    pub max_attempts: u32,
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Backoff::None,
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn new(max_attempts: u32, backoff: Backoff) -> Self {
        Self {
            max_attempts,
            backoff,
        }
    }

    /// Sleep before retry number `retry` (1-based).
    ///
    /// | backoff                 | delay                                    |
    /// |-------------------------|------------------------------------------|
    /// | `None`                  | 0                                        |
    /// | `Fixed { delay_ms }`    | `delay_ms`                               |
    /// | `Exponential { base }`  | `base × 2^(retry-1)` ± 25 % jitter, ≤ 60 s |
    #[must_use]
    pub fn delay_before(&self, retry: u32) -> Duration {
        match self.backoff {
            Backoff::None => Duration::ZERO,
            Backoff::Fixed { delay_ms } => Duration::from_millis(delay_ms),
            Backoff::Exponential { base_ms } => {
                let exponent = retry.saturating_sub(1).min(10);
                let capped = base_ms.saturating_mul(1u64 << exponent).min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                Duration::from_millis(delay_ms)
            }
        }
    }

    /// Runs `operation` until it succeeds or the attempts are spent, and
    /// returns the last error in the latter case.
    ///
    /// `operation` receives the 1-based attempt number.
    ///
    /// # Errors
    ///
    /// Returns the error of the final attempt when every attempt failed.
    pub async fn run<T, F, Fut>(&self, mut operation: F) -> Result<T, AnfrError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, AnfrError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1u32;
        loop {
            match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if attempt >= max_attempts {
                        return Err(err);
                    }
                    let delay = self.delay_before(attempt);
                    tracing::warn!(
                        attempt,
                        max_attempts,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %err,
                        "ANFR request failed, retrying"
                    );
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    attempt += 1;
                }
            }
        }
    }
}
