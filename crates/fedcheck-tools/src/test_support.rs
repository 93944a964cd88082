// crates/fedcheck-tools/src/test_support.rs
// ============================================================================
// Module: Tool Test Support
// Description: Scripted command runner for adapter unit tests.
// Purpose: Assert argument rendering and output parsing without real CLIs.
// Dependencies: fedcheck-core
// ============================================================================

//! ## Overview
//! The scripted runner matches each invocation's rendered command line
//! against registered rules and replays canned stdout/exit codes, recording
//! every call so tests can assert on the exact argument shapes the adapters
//! produce.

use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use async_trait::async_trait;
use fedcheck_core::CommandOutput;
use fedcheck_core::CommandRunner;
use fedcheck_core::CommandSpec;
use fedcheck_core::ExecError;

/// One scripted response rule.
struct Rule {
    /// Substring the rendered command line must contain.
    needle: String,
    /// Canned stdout.
    stdout: String,
    /// Canned exit code.
    code: i32,
    /// Number of times the rule still applies (None = unlimited).
    remaining: Option<u32>,
}

/// Command runner that replays canned responses.
#[derive(Default)]
pub struct ScriptedRunner {
    /// Registered rules, matched in order.
    rules: Mutex<Vec<Rule>>,
    /// Rendered command lines, in invocation order.
    calls: Mutex<Vec<String>>,
}

impl ScriptedRunner {
    /// Creates an empty scripted runner; unmatched commands succeed silently.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a response for commands containing `needle`.
    pub fn respond(&self, needle: &str, stdout: &str) {
        self.push_rule(needle, stdout, 0, None);
    }

    /// Registers a failing response for commands containing `needle`.
    pub fn fail_with(&self, needle: &str, stderr_like: &str, code: i32) {
        self.push_rule(needle, stderr_like, code, None);
    }

    /// Registers a failing response that applies only `times` times.
    pub fn fail_times(&self, needle: &str, stderr_like: &str, code: i32, times: u32) {
        self.push_rule(needle, stderr_like, code, Some(times));
    }

    /// Returns rendered command lines in invocation order.
    pub fn calls(&self) -> Vec<String> {
        self.lock(&self.calls).clone()
    }

    /// Returns how many invocations matched `needle`.
    pub fn call_count(&self, needle: &str) -> usize {
        self.lock(&self.calls).iter().filter(|call| call.contains(needle)).count()
    }

    /// Adds a rule to the script.
    fn push_rule(&self, needle: &str, body: &str, code: i32, remaining: Option<u32>) {
        self.lock(&self.rules).push(Rule {
            needle: needle.to_string(),
            stdout: body.to_string(),
            code,
            remaining,
        });
    }

    /// Locks a mutex, recovering from poisoning.
    fn lock<'a, T>(&self, mutex: &'a Mutex<T>) -> MutexGuard<'a, T> {
        mutex.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run_raw(&self, spec: &CommandSpec) -> Result<CommandOutput, ExecError> {
        let rendered = spec.to_string();
        self.lock(&self.calls).push(rendered.clone());
        let mut rules = self.lock(&self.rules);
        for rule in rules.iter_mut() {
            if !rendered.contains(&rule.needle) {
                continue;
            }
            if let Some(remaining) = &mut rule.remaining {
                if *remaining == 0 {
                    continue;
                }
                *remaining -= 1;
            }
            let failed = rule.code != 0;
            return Ok(CommandOutput {
                stdout: if failed { String::new() } else { rule.stdout.clone() },
                stderr: if failed { rule.stdout.clone() } else { String::new() },
                code: Some(rule.code),
            });
        }
        Ok(CommandOutput {
            stdout: String::new(),
            stderr: String::new(),
            code: Some(0),
        })
    }
}
