// crates/fedcheck-core/src/error.rs
// ============================================================================
// Module: Scenario Errors
// Description: Error taxonomy for scenario execution.
// Purpose: Distinguish provisioning, polling, exec, and assertion failures.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Every failure a scenario can hit maps to one of the variants below.
//! Provisioning and exec failures abort the scenario body; poll timeouts and
//! assertion failures mark the scenario failed. None of them prevent the
//! teardown stack from running, and none are silently swallowed: the runner
//! surfaces all of them in the final [`ScenarioReport`].
//!
//! [`ScenarioReport`]: crate::runner::ScenarioReport

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::exec::ExecError;

// ============================================================================
// SECTION: Scenario Error
// ============================================================================

/// Failure raised while executing a scenario body or teardown.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// Infrastructure apply failed after exhausting its retry budget.
    #[error("provisioning failed: {0}")]
    Provision(String),

    /// A polled condition never became true within its attempt budget.
    #[error(
        "condition `{label}` not observed after {attempts} attempts \
         ({interval_ms}ms apart){last_error}"
    )]
    PollTimeout {
        /// Human-readable label of the polled condition.
        label: String,
        /// Number of probes issued before giving up.
        attempts: u32,
        /// Fixed delay between probes, in milliseconds.
        interval_ms: u64,
        /// Rendering of the most recent probe error, empty when the probe
        /// simply observed false.
        last_error: String,
    },

    /// A remote command failed (or unexpectedly succeeded).
    #[error(transparent)]
    Exec(#[from] ExecError),

    /// A deprovisioning step failed.
    #[error("teardown `{label}` failed: {detail}")]
    Teardown {
        /// Label of the registered teardown.
        label: String,
        /// Rendering of the underlying failure.
        detail: String,
    },

    /// A spawned task inside the scenario failed or panicked.
    #[error("task failed: {0}")]
    Task(String),

    /// Scenario configuration was invalid or missing a required value.
    #[error("invalid scenario input: {0}")]
    InvalidInput(String),
}

impl ScenarioError {
    /// Builds a poll timeout error from probe bookkeeping.
    #[must_use]
    pub fn poll_timeout(
        label: &str,
        attempts: u32,
        interval: Duration,
        last_error: Option<String>,
    ) -> Self {
        let last_error =
            last_error.map(|err| format!("; last probe error: {err}")).unwrap_or_default();
        Self::PollTimeout {
            label: label.to_string(),
            attempts,
            interval_ms: u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
            last_error,
        }
    }
}

// ============================================================================
// SECTION: Assertion Failure
// ============================================================================

/// Recorded mismatch between expected and observed output.
///
/// Assertion failures are collected by the check recorder rather than raised,
/// so a failing comparison never skips later checks or the teardown stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionFailure {
    /// Label of the failed check.
    pub label: String,
    /// Description of the expected observation.
    pub expected: String,
    /// Description of what was actually observed.
    pub actual: String,
}

impl fmt::Display for AssertionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "check `{}` failed: expected {}, got {}", self.label, self.expected, self.actual)
    }
}
