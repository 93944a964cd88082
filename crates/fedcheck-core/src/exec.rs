// crates/fedcheck-core/src/exec.rs
// ============================================================================
// Module: Command Execution
// Description: Remote command invocation and captured output.
// Purpose: Run external CLI tools and capture their text output for checks.
// Dependencies: async-trait, thiserror, tokio
// ============================================================================

//! ## Overview
//! All external tools (terraform, helm, kubectl, consul, aws) are driven
//! through the [`CommandRunner`] trait so suites can substitute an in-process
//! stub for the real CLIs. Output is captured as text; callers compare it
//! with the check recorder rather than parsing exact wording.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use thiserror::Error;

// ============================================================================
// SECTION: Command Spec
// ============================================================================

/// One command invocation: program, arguments, and optional environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Program to invoke.
    pub program: String,
    /// Positional arguments.
    pub args: Vec<String>,
    /// Extra environment variables for the child process.
    pub env: Vec<(String, String)>,
    /// Working directory override.
    pub current_dir: Option<PathBuf>,
}

impl CommandSpec {
    /// Creates a command spec from a program and argument list.
    pub fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
            env: Vec::new(),
            current_dir: None,
        }
    }

    /// Adds an environment variable to the invocation.
    #[must_use]
    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.env.push((key.to_string(), value.to_string()));
        self
    }

    /// Sets the working directory for the invocation.
    #[must_use]
    pub fn with_current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Command Output
// ============================================================================

/// Captured output of a finished command.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    /// Captured standard output, lossily decoded as UTF-8.
    pub stdout: String,
    /// Captured standard error, lossily decoded as UTF-8.
    pub stderr: String,
    /// Process exit code when the process exited normally.
    pub code: Option<i32>,
}

impl CommandOutput {
    /// Returns true when the process exited with status zero.
    #[must_use]
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Returns stdout with surrounding whitespace removed.
    #[must_use]
    pub fn stdout_trimmed(&self) -> &str {
        self.stdout.trim()
    }

    /// Returns stdout and stderr joined, for coarse substring checks.
    #[must_use]
    pub fn combined(&self) -> String {
        format!("{}{}", self.stdout, self.stderr)
    }
}

// ============================================================================
// SECTION: Exec Error
// ============================================================================

/// Failure while spawning or completing a command.
#[derive(Debug, Error)]
pub enum ExecError {
    /// The program could not be spawned at all.
    #[error("failed to spawn `{command}`: {detail}")]
    Spawn {
        /// Rendered command line.
        command: String,
        /// Rendering of the spawn failure.
        detail: String,
    },

    /// The process exited non-zero where success was required.
    #[error("command `{command}` exited with {code}: {stderr}")]
    CommandFailed {
        /// Rendered command line.
        command: String,
        /// Exit code rendering (`signal` when terminated abnormally).
        code: String,
        /// Captured standard output.
        stdout: String,
        /// Captured standard error.
        stderr: String,
    },

    /// The process succeeded where the scenario required a failure, e.g. when
    /// verifying that unauthorized access is rejected.
    #[error("command `{command}` succeeded but failure was expected")]
    UnexpectedSuccess {
        /// Rendered command line.
        command: String,
    },
}

// ============================================================================
// SECTION: Command Runner
// ============================================================================

/// Executes commands against a remote target and captures their output.
///
/// Implementations must be safe to share across concurrently running
/// scenarios; isolation between scenarios comes from unique resource names,
/// not from the runner.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs the command and returns its output regardless of exit status.
    ///
    /// # Errors
    /// Returns [`ExecError::Spawn`] when the process cannot be started.
    async fn run_raw(&self, spec: &CommandSpec) -> Result<CommandOutput, ExecError>;

    /// Runs the command and requires a zero exit status.
    ///
    /// # Errors
    /// Returns [`ExecError::CommandFailed`] on a non-zero exit.
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, ExecError> {
        let output = self.run_raw(spec).await?;
        if output.success() {
            Ok(output)
        } else {
            Err(ExecError::CommandFailed {
                command: spec.to_string(),
                code: output.code.map_or_else(|| "signal".to_string(), |code| code.to_string()),
                stdout: output.stdout,
                stderr: output.stderr,
            })
        }
    }

    /// Runs the command and requires a non-zero exit status.
    ///
    /// Access-control scenarios use this to prove that a forbidden operation
    /// is actually rejected.
    ///
    /// # Errors
    /// Returns [`ExecError::UnexpectedSuccess`] when the command succeeds.
    async fn run_expect_failure(&self, spec: &CommandSpec) -> Result<CommandOutput, ExecError> {
        let output = self.run_raw(spec).await?;
        if output.success() {
            Err(ExecError::UnexpectedSuccess {
                command: spec.to_string(),
            })
        } else {
            Ok(output)
        }
    }
}

// ============================================================================
// SECTION: Process Runner
// ============================================================================

/// [`CommandRunner`] backed by real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    /// Creates a process runner.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run_raw(&self, spec: &CommandSpec) -> Result<CommandOutput, ExecError> {
        let mut command = tokio::process::Command::new(&spec.program);
        command.args(&spec.args).stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::piped());
        for (key, value) in &spec.env {
            command.env(key, value);
        }
        if let Some(dir) = &spec.current_dir {
            command.current_dir(dir);
        }
        let output = command.output().await.map_err(|err| ExecError::Spawn {
            command: spec.to_string(),
            detail: err.to_string(),
        })?;
        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            code: output.status.code(),
        })
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
