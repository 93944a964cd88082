// crates/fedcheck-core/src/poll.rs
// ============================================================================
// Module: Polling
// Description: Fixed-interval condition polling with a bounded attempt budget.
// Purpose: Wait for remote readiness without unbounded blocking or sleeps.
// Dependencies: tokio
// ============================================================================

//! ## Overview
//! Readiness waits poll a probe at a fixed interval. There is no exponential
//! backoff: the interval between probes is constant and the total wait is
//! bounded by `max_attempts * interval`. Probe errors are treated as a false
//! observation (remote tools routinely fail while infrastructure converges),
//! but the most recent error is carried into the timeout for diagnosis.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;

use crate::error::ScenarioError;

// ============================================================================
// SECTION: Polling
// ============================================================================

/// Polls `probe` until it observes true, up to `max_attempts` probes spaced
/// by `interval`.
///
/// # Errors
/// Returns [`ScenarioError::PollTimeout`] when the attempt budget is
/// exhausted without a true observation.
pub async fn wait_for_condition<F, Fut>(
    label: &str,
    max_attempts: u32,
    interval: Duration,
    mut probe: F,
) -> Result<(), ScenarioError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool, ScenarioError>>,
{
    let mut last_error = None;
    for attempt in 1..=max_attempts {
        match probe().await {
            Ok(true) => return Ok(()),
            Ok(false) => last_error = None,
            Err(err) => last_error = Some(err.to_string()),
        }
        if attempt < max_attempts {
            sleep(interval).await;
        }
    }
    Err(ScenarioError::poll_timeout(label, max_attempts, interval, last_error))
}

/// Retries a fallible operation a fixed number of times with a fixed delay.
///
/// Only errors accepted by `retryable` are retried; the first non-retryable
/// error is returned immediately. Used for transient provisioning failures.
///
/// # Errors
/// Returns the final error once the attempt budget is exhausted.
pub async fn retry_fixed<T, F, Fut, R>(
    max_attempts: u32,
    delay: Duration,
    retryable: R,
    mut op: F,
) -> Result<T, ScenarioError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScenarioError>>,
    R: Fn(&ScenarioError) -> bool,
{
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < max_attempts && retryable(&err) => {
                sleep(delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
