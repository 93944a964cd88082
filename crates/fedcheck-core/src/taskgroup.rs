// crates/fedcheck-core/src/taskgroup.rs
// ============================================================================
// Module: Task Group
// Description: Joined concurrent task execution with a completion barrier.
// Purpose: Replace fire-and-forget load generation with explicit joins.
// Dependencies: tokio
// ============================================================================

//! ## Overview
//! Load-generation scenarios launch many remote invocations concurrently. A
//! task group joins every spawned task before the scenario asserts anything,
//! so there is no sleep-based synchronization and no racy read of a cluster
//! that is still being mutated. Task panics are captured as failures rather
//! than aborting the scenario.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::future::Future;

use tokio::task::JoinSet;

use crate::error::ScenarioError;

// ============================================================================
// SECTION: Task Group
// ============================================================================

/// Group of concurrently running scenario tasks.
#[derive(Default)]
pub struct TaskGroup {
    /// The spawned tasks; each resolves to a labeled result.
    set: JoinSet<(String, Result<(), ScenarioError>)>,
}

impl TaskGroup {
    /// Creates an empty task group.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns a labeled task into the group.
    pub fn spawn<Fut>(&mut self, label: &str, work: Fut)
    where
        Fut: Future<Output = Result<(), ScenarioError>> + Send + 'static,
    {
        let label = label.to_string();
        self.set.spawn(async move {
            let result = work.await;
            (label, result)
        });
    }

    /// Returns the number of tasks still tracked by the group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.set.len()
    }

    /// Returns true when no tasks are tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// Waits for every spawned task to finish.
    ///
    /// This is the completion barrier: it returns only after all tasks have
    /// resolved, collecting failures instead of short-circuiting so the
    /// caller sees the complete picture.
    pub async fn join_all(mut self) -> TaskGroupOutcome {
        let mut completed = 0usize;
        let mut failures = Vec::new();
        while let Some(joined) = self.set.join_next().await {
            match joined {
                Ok((_, Ok(()))) => completed += 1,
                Ok((label, Err(err))) => failures.push(format!("{label}: {err}")),
                Err(join_err) => failures.push(format!("task panicked: {join_err}")),
            }
        }
        TaskGroupOutcome {
            completed,
            failures,
        }
    }
}

/// Aggregate result of a joined task group.
#[derive(Debug, Clone)]
pub struct TaskGroupOutcome {
    /// Number of tasks that completed successfully.
    pub completed: usize,
    /// Rendered failures, one per failed or panicked task.
    pub failures: Vec<String>,
}

impl TaskGroupOutcome {
    /// Returns true when every task completed successfully.
    #[must_use]
    pub fn all_completed(&self) -> bool {
        self.failures.is_empty()
    }

    /// Converts the outcome into a scenario error when any task failed.
    ///
    /// # Errors
    /// Returns [`ScenarioError::Task`] listing the failed tasks.
    pub fn into_result(self) -> Result<usize, ScenarioError> {
        if self.failures.is_empty() {
            Ok(self.completed)
        } else {
            Err(ScenarioError::Task(self.failures.join("; ")))
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
