// crates/fedcheck-core/src/checks.rs
// ============================================================================
// Module: Check Recorder
// Description: Comparison primitives over captured command output.
// Purpose: Record assertion outcomes without aborting the scenario.
// Dependencies: none beyond std
// ============================================================================

//! ## Overview
//! Scenario checks compare captured CLI output against expectations. A failed
//! check marks the scenario failed but never unwinds: the body keeps running
//! so later checks still execute and the teardown stack is reached on every
//! path. Checks match coarse substrings; exact CLI wording is not a contract.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Display;

use crate::error::AssertionFailure;

// ============================================================================
// SECTION: Check Recorder
// ============================================================================

/// Collects assertion outcomes for one scenario.
#[derive(Debug, Default)]
pub struct CheckRecorder {
    /// Number of checks that passed.
    passed: u32,
    /// Failures recorded so far, in execution order.
    failures: Vec<AssertionFailure>,
}

impl CheckRecorder {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `haystack` contains `needle`.
    pub fn contains(&mut self, label: &str, haystack: &str, needle: &str) -> bool {
        self.record(
            label,
            haystack.contains(needle),
            format!("output containing {needle:?}"),
            preview(haystack),
        )
    }

    /// Records that `haystack` does not contain `needle`.
    pub fn not_contains(&mut self, label: &str, haystack: &str, needle: &str) -> bool {
        self.record(
            label,
            !haystack.contains(needle),
            format!("output without {needle:?}"),
            preview(haystack),
        )
    }

    /// Records that two values compare equal.
    pub fn equals<T: PartialEq + Display>(&mut self, label: &str, expected: &T, actual: &T) -> bool {
        self.record(label, expected == actual, expected.to_string(), actual.to_string())
    }

    /// Records that the value is non-empty after trimming.
    pub fn non_empty(&mut self, label: &str, value: &str) -> bool {
        self.record(
            label,
            !value.trim().is_empty(),
            "non-empty output".to_string(),
            "empty output".to_string(),
        )
    }

    /// Records a boolean observation.
    pub fn is_true(&mut self, label: &str, observed: bool) -> bool {
        self.record(label, observed, "true".to_string(), observed.to_string())
    }

    /// Records that `actual` is strictly below `bound`.
    pub fn less_than<T: PartialOrd + Display>(&mut self, label: &str, actual: &T, bound: &T) -> bool {
        self.record(label, actual < bound, format!("value below {bound}"), actual.to_string())
    }

    /// Returns the number of checks that passed.
    #[must_use]
    pub const fn passed(&self) -> u32 {
        self.passed
    }

    /// Returns the recorded failures.
    #[must_use]
    pub fn failures(&self) -> &[AssertionFailure] {
        &self.failures
    }

    /// Returns true when no check has failed.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failures.is_empty()
    }

    /// Drains the recorder into its failure list.
    #[must_use]
    pub fn take_failures(&mut self) -> Vec<AssertionFailure> {
        std::mem::take(&mut self.failures)
    }

    /// Records one outcome and returns whether it passed.
    fn record(&mut self, label: &str, ok: bool, expected: String, actual: String) -> bool {
        if ok {
            self.passed += 1;
        } else {
            self.failures.push(AssertionFailure {
                label: label.to_string(),
                expected,
                actual,
            });
        }
        ok
    }
}

/// Truncates captured output for failure messages.
fn preview(text: &str) -> String {
    const MAX: usize = 200;
    let trimmed = text.trim();
    if trimmed.len() <= MAX {
        return format!("{trimmed:?}");
    }
    let cut: String = trimmed.chars().take(MAX).collect();
    format!("{cut:?}… ({} bytes total)", trimmed.len())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
