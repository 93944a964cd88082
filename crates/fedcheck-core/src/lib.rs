// crates/fedcheck-core/src/lib.rs
// ============================================================================
// Module: Fedcheck Core
// Description: Scenario runner engine for infrastructure integration tests.
// Purpose: Provide provision/wait/exec/assert/teardown primitives.
// Dependencies: async-trait, rand, thiserror, tokio
// ============================================================================

//! ## Overview
//! This crate hosts the scenario runner used by the fedcheck suites. A
//! scenario provisions infrastructure through external tools, polls for
//! readiness, issues remote commands, records assertions on their output, and
//! tears everything down on every exit path. All interesting behavior lives
//! in the external systems; this crate only sequences and observes them.
//!
//! Invariants:
//! - Teardown runs exactly once per scenario, on success, failure, or panic.
//! - Resource names are unique so concurrent scenarios never collide.
//! - Polling is bounded; no call blocks indefinitely.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod checks;
pub mod error;
pub mod exec;
pub mod naming;
pub mod observe;
pub mod poll;
pub mod runner;
pub mod taskgroup;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use checks::CheckRecorder;
pub use error::AssertionFailure;
pub use error::ScenarioError;
pub use exec::CommandOutput;
pub use exec::CommandRunner;
pub use exec::CommandSpec;
pub use exec::ExecError;
pub use exec::ProcessRunner;
pub use naming::unique_id;
pub use naming::unique_name;
pub use observe::NoopObserver;
pub use observe::ScenarioEvent;
pub use observe::ScenarioEventKind;
pub use observe::ScenarioObserver;
pub use poll::wait_for_condition;
pub use runner::Scenario;
pub use runner::ScenarioOutcome;
pub use runner::ScenarioReport;
pub use runner::TeardownReport;
pub use runner::run_scenario;
pub use runner::run_scenario_observed;
pub use taskgroup::TaskGroup;
pub use taskgroup::TaskGroupOutcome;
