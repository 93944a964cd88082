// system-tests/tests/helpers/artifacts.rs
// ============================================================================
// Module: Test Artifacts
// Description: Artifact helpers for the scenario suites.
// Purpose: Create per-test run roots and write deterministic summaries.
// Dependencies: system-tests, serde, serde_json
// ============================================================================

use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use fedcheck_core::ScenarioEvent;
use fedcheck_core::ScenarioObserver;
use fedcheck_core::ScenarioReport;
use serde::Serialize;
use system_tests::config::SystemTestConfig;

/// Final summary written for one suite test.
#[derive(Debug, Serialize)]
struct TestSummary {
    /// Test name the summary belongs to.
    test_name: String,
    /// Final status: `passed`, `failed`, or `panicked`.
    status: String,
    /// Start of the test, milliseconds since the epoch.
    started_at_ms: u128,
    /// End of the test, milliseconds since the epoch.
    ended_at_ms: u128,
    /// Wall-clock duration in milliseconds.
    duration_ms: u128,
    /// Free-form notes recorded during the test.
    notes: Vec<String>,
}

/// Returns milliseconds since the epoch.
fn now_millis() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

/// Default run root when no override is configured.
fn default_run_root(test_name: &str) -> PathBuf {
    let stamp = now_millis();
    PathBuf::from("target/system-tests").join(format!("run_{stamp}")).join(test_name)
}

/// Artifact manager for a single suite test.
#[derive(Debug, Clone)]
pub struct TestArtifacts {
    /// Root directory holding this test's artifacts.
    root: PathBuf,
}

impl TestArtifacts {
    /// Creates the artifact root for a test.
    ///
    /// # Errors
    /// Returns an error when the root cannot be created.
    pub fn new(test_name: &str) -> io::Result<Self> {
        let config = SystemTestConfig::load().map_err(io::Error::other)?;
        let root = config
            .run_root
            .map_or_else(|| default_run_root(test_name), |base| base.join(test_name));
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
        })
    }

    /// Returns the root directory for the test artifacts.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes a JSON artifact.
    ///
    /// # Errors
    /// Returns an error when serialization or the write fails.
    pub fn write_json<T: Serialize>(&self, name: &str, value: &T) -> io::Result<PathBuf> {
        let path = self.root.join(name);
        let bytes = serde_json::to_vec_pretty(value).map_err(io::Error::other)?;
        fs::write(&path, bytes)?;
        Ok(path)
    }

    /// Writes a text artifact with UTF-8 encoding.
    ///
    /// # Errors
    /// Returns an error when the write fails.
    pub fn write_text(&self, name: &str, value: &str) -> io::Result<PathBuf> {
        let path = self.root.join(name);
        fs::write(&path, value.as_bytes())?;
        Ok(path)
    }
}

/// Observer that buffers rendered scenario events for the summary.
#[derive(Debug, Default)]
pub struct EventLog {
    /// Rendered events in arrival order.
    events: Mutex<Vec<String>>,
}

impl EventLog {
    /// Creates an empty event log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drains the rendered events collected so far.
    #[must_use]
    pub fn drain(&self) -> Vec<String> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl ScenarioObserver for EventLog {
    fn record(&self, event: ScenarioEvent) {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).push(event.to_string());
    }
}

/// Reporter that writes a summary even when a test panics.
pub struct TestReporter {
    /// Artifact manager for this test.
    artifacts: TestArtifacts,
    /// Test name.
    test_name: String,
    /// Start of the test, milliseconds since the epoch.
    started_at_ms: u128,
    /// Notes recorded so far.
    notes: Vec<String>,
    /// True once a summary has been written.
    finalized: bool,
}

impl TestReporter {
    /// Creates a reporter for the named test.
    ///
    /// # Errors
    /// Returns an error when the artifact root cannot be created.
    pub fn new(test_name: &str) -> io::Result<Self> {
        Ok(Self {
            artifacts: TestArtifacts::new(test_name)?,
            test_name: test_name.to_string(),
            started_at_ms: now_millis(),
            notes: Vec::new(),
            finalized: false,
        })
    }

    /// Returns the artifact manager.
    #[must_use]
    pub const fn artifacts(&self) -> &TestArtifacts {
        &self.artifacts
    }

    /// Records a free-form note for the summary.
    pub fn note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }

    /// Records a scenario's rendered outcome as a note.
    pub fn record_scenario(&mut self, report: &ScenarioReport) {
        self.notes.push(report.render());
    }

    /// Writes the final summary for the test.
    ///
    /// # Errors
    /// Returns an error when the summary cannot be written.
    pub fn finish(&mut self, status: &str) -> io::Result<()> {
        self.finalized = true;
        self.write_summary(status)
    }

    /// Writes `summary.json` and `summary.md` into the artifact root.
    fn write_summary(&self, status: &str) -> io::Result<()> {
        let ended_at_ms = now_millis();
        let summary = TestSummary {
            test_name: self.test_name.clone(),
            status: status.to_string(),
            started_at_ms: self.started_at_ms,
            ended_at_ms,
            duration_ms: ended_at_ms.saturating_sub(self.started_at_ms),
            notes: self.notes.clone(),
        };
        self.artifacts.write_json("summary.json", &summary)?;
        let mut rendered = format!("# {}\n\nstatus: {status}\n", self.test_name);
        for note in &self.notes {
            rendered.push_str(&format!("\n- {note}\n"));
        }
        self.artifacts.write_text("summary.md", &rendered)?;
        Ok(())
    }
}

impl Drop for TestReporter {
    fn drop(&mut self) {
        if !self.finalized {
            // A missing finish() means the test unwound; best-effort record.
            let _ = self.write_summary("panicked");
        }
    }
}
