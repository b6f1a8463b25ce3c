// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! Retrying HTTP calls that time out.

use crate::http::HTTPResult;
use log::warn;
use std::time::Duration;

/// Controls how often, and how patiently, a timed-out request is retried.
///
/// Only [timeouts](crate::http::HTTPError::Timeout) are retried. Any other
/// error is returned to the caller immediately, as is the final timeout
/// once the policy runs out of attempts.
///
/// The delay before each retry grows exponentially: the first retry waits
/// `initial_delay`, the second waits `initial_delay * factor`, the third
/// `initial_delay * factor²`, and so on.
#[derive(Clone, Debug, PartialEq)]
pub struct RetryPolicy {
    max_attempts: u32,
    initial_delay: Duration,
    factor: u32,
}

impl Default for RetryPolicy {
    /// Seven attempts in total, starting with a one-second delay that
    /// doubles after every attempt.
    fn default() -> Self {
        Self {
            max_attempts: 7,
            initial_delay: Duration::from_secs(1),
            factor: 2,
        }
    }
}

impl RetryPolicy {
    /// Sets the total number of attempts, including the first one.
    ///
    /// A policy always makes at least one attempt.
    pub fn max_attempts(self, max_attempts: u32) -> Self {
        let max_attempts = max_attempts.max(1);
        Self {
            max_attempts,
            ..self
        }
    }

    /// Sets the delay before the first retry.
    pub fn initial_delay(self, initial_delay: Duration) -> Self {
        Self {
            initial_delay,
            ..self
        }
    }

    /// Sets the multiplier applied to the delay after each retry.
    pub fn factor(self, factor: u32) -> Self {
        Self { factor, ..self }
    }

    /// A policy that never retries.
    pub fn never() -> Self {
        Self::default().max_attempts(1)
    }

    /// How long to wait after the given failed `attempt` (starting at 1)
    /// before trying again.
    pub fn delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        self.initial_delay
            .saturating_mul(self.factor.saturating_pow(exponent))
    }

    /// Runs `op` until it succeeds, fails with an error that is not a
    /// timeout, or the policy runs out of attempts.
    pub async fn run<F, Fut, T>(&self, mut op: F) -> HTTPResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = HTTPResult<T>>,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Err(err) if err.is_timeout() && attempt < self.max_attempts => {
                    let delay = self.delay(attempt);
                    warn!(
                        "attempt {attempt} of {} timed out, retrying in {delay:?}: {err}",
                        self.max_attempts
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}
