// /////////////////////////////////////////////////////////////////////////////
// VKP Distribution Core
// Copyright (c) 2025 A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Fixed-delay, bounded-attempt retry wrapper for object-store calls.
//!
//! Only transport errors (`Unreachable`, `Timeout`, `ServerError`) are
//! retried. `Unauthorized` and `NotFound` are access errors and surface to
//! the caller on the first attempt (§5, §8.11).

use std::future::Future;
use std::time::Duration;

use tracing::warn;
use vkp_domain::PipelineError;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self { max_attempts: max_attempts.max(1), delay }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(5))
    }
}

/// Runs `op` up to `policy.max_attempts` times, sleeping `policy.delay`
/// between attempts. Stops early on a non-recoverable error.
pub async fn with_retry<T, F, Fut>(policy: RetryPolicy, op: F) -> Result<T, PipelineError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, PipelineError>>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_recoverable() && attempt < policy.max_attempts => {
                warn!(attempt, max_attempts = policy.max_attempts, error = %err, "retrying after transient failure");
                tokio::time::sleep(policy.delay).await;
            }
            Err(err) if err.is_recoverable() => {
                return Err(PipelineError::NetworkGaveUp(format!(
                    "gave up after {attempt} attempts: {err}"
                )));
            }
            Err(err) => return Err(err),
        }
    }
}
