//! # Bounded-Backoff Retry for Transient Storage Failures
//!
//! ## Policy
//!
//! Only [`StorageError::Transient`] is retried, up to a bounded attempt
//! count, sleeping an exponentially growing interval (with jitter)
//! between attempts. Every other error — authorization, validation,
//! not-found, corruption, permanent backend failure — surfaces on the
//! first occurrence.

use std::time::Duration;

use rand::Rng;

use crate::blob::StorageError;

/// Retry parameters for one class of storage operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first (so 1 means "no retries").
    pub max_attempts: u32,
    /// Sleep before the first retry.
    pub initial_backoff: Duration,
    /// Ceiling on any single sleep.
    pub max_backoff: Duration,
}

impl RetryPolicy {
    /// The default policy: 4 attempts, 50ms doubling to a 1s cap.
    pub fn standard() -> Self {
        Self {
            max_attempts: 4,
            initial_backoff: Duration::from_millis(50),
            max_backoff: Duration::from_secs(1),
        }
    }

    /// A policy that never retries. Used where the caller owns retry.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    /// The backoff to sleep after attempt `n` (0-based), jittered by up
    /// to +25% so synchronized callers fan out.
    fn backoff_for(&self, attempt: u32) -> Duration {
        let base = self
            .initial_backoff
            .saturating_mul(1u32 << attempt.min(16))
            .min(self.max_backoff);
        let jitter = rand::thread_rng().gen_range(0..=(base.as_millis() as u64 / 4).max(1));
        base + Duration::from_millis(jitter)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::standard()
    }
}

/// Run `op`, retrying transient failures per `policy`.
///
/// Returns the first success, the first non-transient error, or the last
/// transient error once attempts are exhausted.
pub fn with_retries<T>(
    policy: &RetryPolicy,
    mut op: impl FnMut() -> Result<T, StorageError>,
) -> Result<T, StorageError> {
    let mut attempt = 0u32;
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt + 1 < policy.max_attempts => {
                let backoff = policy.backoff_for(attempt);
                tracing::warn!(
                    attempt,
                    backoff_ms = backoff.as_millis() as u64,
                    error = %err,
                    "transient storage failure, backing off"
                );
                std::thread::sleep(backoff);
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
