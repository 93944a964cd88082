// crates/fedcheck-core/src/runner.rs
// ============================================================================
// Module: Scenario Runner
// Description: Sequences provisioning, validation, and cleanup for one test.
// Purpose: Guarantee teardown on every exit path, including panics.
// Dependencies: tokio, crate::checks, crate::observe
// ============================================================================

//! ## Overview
//! A scenario is one end-to-end test: provision, act, assert, teardown. The
//! runner executes the scenario body as a spawned task so that `Err` returns
//! and panics are both caught, then drains the teardown stack in reverse
//! registration order. Teardown runs exactly once per scenario regardless of
//! how the body finished; a teardown failure is reported but never masks the
//! body's own failure.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::time::Duration;
use std::time::Instant;

use crate::checks::CheckRecorder;
use crate::error::AssertionFailure;
use crate::error::ScenarioError;
use crate::naming;
use crate::observe::NoopObserver;
use crate::observe::ScenarioEvent;
use crate::observe::ScenarioEventKind;
use crate::observe::ScenarioObserver;

// ============================================================================
// SECTION: Teardown Stack
// ============================================================================

/// Boxed deprovisioning future.
type TeardownFuture = Pin<Box<dyn Future<Output = Result<(), ScenarioError>> + Send + 'static>>;

/// One registered teardown with its reporting label.
struct NamedTeardown {
    /// Label used in reports and observer events.
    label: String,
    /// The deprovisioning work itself.
    work: TeardownFuture,
}

/// Outcome of one executed teardown.
#[derive(Debug, Clone)]
pub struct TeardownReport {
    /// Label of the registered teardown.
    pub label: String,
    /// Failure rendering when the teardown failed.
    pub error: Option<String>,
}

// ============================================================================
// SECTION: Scenario Handle
// ============================================================================

/// Shared state behind a [`Scenario`] handle.
struct ScenarioInner {
    /// Scenario name, used in reports and events.
    name: String,
    /// Unique identifier suffix for resources provisioned by this scenario.
    id: String,
    /// Observer for lifecycle events.
    observer: Arc<dyn ScenarioObserver>,
    /// Recorded check outcomes.
    checks: Mutex<CheckRecorder>,
    /// Pending teardowns, drained exactly once by the runner.
    teardowns: Mutex<Vec<NamedTeardown>>,
}

/// Handle passed to a scenario body.
///
/// Cloning is cheap; all clones share the same check recorder and teardown
/// stack. There is no process-global scenario state.
#[derive(Clone)]
pub struct Scenario {
    /// Shared scenario state.
    inner: Arc<ScenarioInner>,
}

impl Scenario {
    /// Creates a scenario handle with a fresh unique identifier.
    fn new(name: &str, observer: Arc<dyn ScenarioObserver>) -> Self {
        Self {
            inner: Arc::new(ScenarioInner {
                name: name.to_string(),
                id: naming::unique_id(),
                observer,
                checks: Mutex::new(CheckRecorder::new()),
                teardowns: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Returns the scenario name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Returns the scenario's unique identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// Returns `prefix-<scenario id>`, for resources scoped to this scenario.
    #[must_use]
    pub fn scoped_name(&self, prefix: &str) -> String {
        format!("{prefix}-{}", self.inner.id)
    }

    /// Emits a step-started event for progress reporting.
    pub fn step(&self, label: &str) {
        self.emit(ScenarioEventKind::StepStarted, label, None);
    }

    /// Registers a teardown to run after the body finishes.
    ///
    /// Teardowns run in reverse registration order, mirroring the `defer`
    /// discipline of the provisioning calls that created the resources.
    pub fn defer_teardown<Fut>(&self, label: &str, work: Fut)
    where
        Fut: Future<Output = Result<(), ScenarioError>> + Send + 'static,
    {
        self.lock_teardowns().push(NamedTeardown {
            label: label.to_string(),
            work: Box::pin(work),
        });
    }

    /// Records that `haystack` contains `needle`.
    pub fn check_contains(&self, label: &str, haystack: &str, needle: &str) -> bool {
        let ok = self.lock_checks().contains(label, haystack, needle);
        self.emit_check(label, ok);
        ok
    }

    /// Records that `haystack` does not contain `needle`.
    pub fn check_not_contains(&self, label: &str, haystack: &str, needle: &str) -> bool {
        let ok = self.lock_checks().not_contains(label, haystack, needle);
        self.emit_check(label, ok);
        ok
    }

    /// Records that two values compare equal.
    pub fn check_equals<T>(&self, label: &str, expected: &T, actual: &T) -> bool
    where
        T: PartialEq + std::fmt::Display,
    {
        let ok = self.lock_checks().equals(label, expected, actual);
        self.emit_check(label, ok);
        ok
    }

    /// Records that the value is non-empty after trimming.
    pub fn check_non_empty(&self, label: &str, value: &str) -> bool {
        let ok = self.lock_checks().non_empty(label, value);
        self.emit_check(label, ok);
        ok
    }

    /// Records a boolean observation.
    pub fn check_true(&self, label: &str, observed: bool) -> bool {
        let ok = self.lock_checks().is_true(label, observed);
        self.emit_check(label, ok);
        ok
    }

    /// Records that `actual` is strictly below `bound`.
    pub fn check_less_than<T>(&self, label: &str, actual: &T, bound: &T) -> bool
    where
        T: PartialOrd + std::fmt::Display,
    {
        let ok = self.lock_checks().less_than(label, actual, bound);
        self.emit_check(label, ok);
        ok
    }

    /// Drains the teardown stack, newest first.
    async fn run_teardowns(&self) -> Vec<TeardownReport> {
        let mut reports = Vec::new();
        loop {
            // Lock only to pop; teardown work must not hold the lock across
            // await points.
            let Some(teardown) = self.lock_teardowns().pop() else {
                break;
            };
            self.emit(ScenarioEventKind::TeardownStarted, &teardown.label, None);
            match teardown.work.await {
                Ok(()) => {
                    self.emit(ScenarioEventKind::TeardownCompleted, &teardown.label, None);
                    reports.push(TeardownReport {
                        label: teardown.label,
                        error: None,
                    });
                }
                Err(err) => {
                    let detail = err.to_string();
                    self.emit(ScenarioEventKind::TeardownFailed, &teardown.label, Some(&detail));
                    reports.push(TeardownReport {
                        label: teardown.label,
                        error: Some(detail),
                    });
                }
            }
        }
        reports
    }

    /// Takes the recorded assertion failures and pass count.
    fn take_check_results(&self) -> (u32, Vec<AssertionFailure>) {
        let mut checks = self.lock_checks();
        (checks.passed(), checks.take_failures())
    }

    /// Locks the check recorder, recovering from poisoning.
    fn lock_checks(&self) -> MutexGuard<'_, CheckRecorder> {
        self.inner.checks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Locks the teardown stack, recovering from poisoning.
    fn lock_teardowns(&self) -> MutexGuard<'_, Vec<NamedTeardown>> {
        self.inner.teardowns.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Emits a check event.
    fn emit_check(&self, label: &str, ok: bool) {
        let kind =
            if ok { ScenarioEventKind::CheckPassed } else { ScenarioEventKind::CheckFailed };
        self.emit(kind, label, None);
    }

    /// Emits one observer event.
    fn emit(&self, kind: ScenarioEventKind, label: &str, detail: Option<&str>) {
        self.inner.observer.record(ScenarioEvent {
            scenario: self.inner.name.clone(),
            kind,
            label: label.to_string(),
            detail: detail.map(ToString::to_string),
        });
    }
}

// ============================================================================
// SECTION: Scenario Report
// ============================================================================

/// Final scenario classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioOutcome {
    /// Body completed, every check passed, every teardown succeeded.
    Passed,
    /// The body failed, a check failed, or a teardown failed.
    Failed,
}

/// Result of one executed scenario.
#[derive(Debug)]
pub struct ScenarioReport {
    /// Scenario name.
    pub name: String,
    /// Unique scenario identifier.
    pub id: String,
    /// Final classification.
    pub outcome: ScenarioOutcome,
    /// Rendering of the body failure, when the body returned an error or
    /// panicked.
    pub error: Option<String>,
    /// Assertion failures recorded by the check recorder.
    pub assertion_failures: Vec<AssertionFailure>,
    /// Number of checks that passed.
    pub checks_passed: u32,
    /// Teardown results in execution (reverse registration) order.
    pub teardowns: Vec<TeardownReport>,
    /// Wall-clock duration including teardown.
    pub duration: Duration,
}

impl ScenarioReport {
    /// Returns true when the scenario passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.outcome == ScenarioOutcome::Passed
    }

    /// Renders a failure summary naming the failed step or assertion.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = format!("scenario `{}` ({})", self.name, self.id);
        match self.outcome {
            ScenarioOutcome::Passed => {
                out.push_str(&format!(": passed ({} checks)", self.checks_passed));
            }
            ScenarioOutcome::Failed => {
                out.push_str(": failed");
                if let Some(error) = &self.error {
                    out.push_str(&format!("\n  step failure: {error}"));
                }
                for failure in &self.assertion_failures {
                    out.push_str(&format!("\n  {failure}"));
                }
                for teardown in &self.teardowns {
                    if let Some(error) = &teardown.error {
                        out.push_str(&format!("\n  teardown `{}` failed: {error}", teardown.label));
                    }
                }
            }
        }
        out
    }
}

// ============================================================================
// SECTION: Runner Entry Points
// ============================================================================

/// Runs one scenario with the given observer.
///
/// The body is spawned so that panics are contained; both error returns and
/// panics still reach the teardown stack.
pub async fn run_scenario_observed<F, Fut>(
    name: &str,
    observer: Arc<dyn ScenarioObserver>,
    body: F,
) -> ScenarioReport
where
    F: FnOnce(Scenario) -> Fut,
    Fut: Future<Output = Result<(), ScenarioError>> + Send + 'static,
{
    let started = Instant::now();
    let scenario = Scenario::new(name, observer);
    let handle = tokio::spawn(body(scenario.clone()));
    let error = match handle.await {
        Ok(Ok(())) => None,
        Ok(Err(err)) => Some(err.to_string()),
        Err(join_err) => Some(render_join_error(join_err)),
    };
    let teardowns = scenario.run_teardowns().await;
    let (checks_passed, assertion_failures) = scenario.take_check_results();
    let clean_teardown = teardowns.iter().all(|teardown| teardown.error.is_none());
    let outcome = if error.is_none() && assertion_failures.is_empty() && clean_teardown {
        ScenarioOutcome::Passed
    } else {
        ScenarioOutcome::Failed
    };
    ScenarioReport {
        name: scenario.name().to_string(),
        id: scenario.id().to_string(),
        outcome,
        error,
        assertion_failures,
        checks_passed,
        teardowns,
        duration: started.elapsed(),
    }
}

/// Runs one scenario without an observer.
pub async fn run_scenario<F, Fut>(name: &str, body: F) -> ScenarioReport
where
    F: FnOnce(Scenario) -> Fut,
    Fut: Future<Output = Result<(), ScenarioError>> + Send + 'static,
{
    run_scenario_observed(name, Arc::new(NoopObserver), body).await
}

/// Renders a spawned-body join failure.
fn render_join_error(err: tokio::task::JoinError) -> String {
    if err.is_panic() {
        let payload = err.into_panic();
        let message = payload
            .downcast_ref::<&str>()
            .map(|msg| (*msg).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "opaque panic payload".to_string());
        format!("scenario body panicked: {message}")
    } else {
        "scenario body was cancelled".to_string()
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
