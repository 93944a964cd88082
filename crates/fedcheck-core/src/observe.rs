// crates/fedcheck-core/src/observe.rs
// ============================================================================
// Module: Scenario Observability
// Description: Event hooks for scenario steps, checks, and teardowns.
// Purpose: Provide structured progress events without hard dependencies.
// Dependencies: none beyond std
// ============================================================================

//! ## Overview
//! This module exposes a thin observer interface for scenario lifecycle
//! events. It is intentionally dependency-light so suites can plug in an
//! artifact reporter, a log forwarder, or nothing at all without redesign.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

// ============================================================================
// SECTION: Event Types
// ============================================================================

/// Scenario lifecycle event classification.
///
/// # Invariants
/// - Variants are stable for reporting labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioEventKind {
    /// A named step of the scenario body started.
    StepStarted,
    /// A recorded check passed.
    CheckPassed,
    /// A recorded check failed.
    CheckFailed,
    /// A registered teardown started executing.
    TeardownStarted,
    /// A registered teardown completed successfully.
    TeardownCompleted,
    /// A registered teardown failed.
    TeardownFailed,
}

impl ScenarioEventKind {
    /// Returns a stable label for the event kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StepStarted => "step_started",
            Self::CheckPassed => "check_passed",
            Self::CheckFailed => "check_failed",
            Self::TeardownStarted => "teardown_started",
            Self::TeardownCompleted => "teardown_completed",
            Self::TeardownFailed => "teardown_failed",
        }
    }
}

/// One scenario lifecycle event.
#[derive(Debug, Clone)]
pub struct ScenarioEvent {
    /// Name of the scenario emitting the event.
    pub scenario: String,
    /// Event classification.
    pub kind: ScenarioEventKind,
    /// Step, check, or teardown label.
    pub label: String,
    /// Optional failure or progress detail.
    pub detail: Option<String>,
}

impl fmt::Display for ScenarioEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} {}", self.scenario, self.kind.as_str(), self.label)?;
        if let Some(detail) = &self.detail {
            write!(f, ": {detail}")?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Observer Trait
// ============================================================================

/// Sink for scenario lifecycle events.
pub trait ScenarioObserver: Send + Sync {
    /// Records one lifecycle event.
    fn record(&self, event: ScenarioEvent);
}

/// No-op observer.
///
/// # Invariants
/// - Events are intentionally discarded.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ScenarioObserver for NoopObserver {
    fn record(&self, _event: ScenarioEvent) {}
}
