// crates/fedcheck-tools/src/terraform.rs
// ============================================================================
// Module: Terraform Adapter
// Description: Declarative provisioning through the terraform CLI.
// Purpose: Apply scenario templates, read outputs, destroy unconditionally.
// Dependencies: fedcheck-core, fedcheck-config, serde_json
// ============================================================================

//! ## Overview
//! Provisioning applies an externally defined root module with scenario
//! variables. Transient apply failures (throttling, timeouts, connection
//! resets) are retried a fixed number of times with a fixed delay; anything
//! else aborts the scenario immediately. The resulting [`DeploymentHandle`]
//! carries the parsed `terraform output -json` values and everything needed
//! to destroy the deployment later, on every exit path.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use fedcheck_core::CommandRunner;
use fedcheck_core::CommandSpec;
use fedcheck_core::ScenarioError;
use fedcheck_core::poll::retry_fixed;

use fedcheck_config::TerraformConfig;
use fedcheck_config::TerraformVar;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Substrings of apply errors that are safe to retry. Mirrors the default
/// retryable-error set of the original tooling.
const RETRYABLE_ERRORS: &[&str] = &[
    "RequestError",
    "Throttling",
    "timeout while waiting",
    "connection reset by peer",
    "TLS handshake timeout",
    "temporary failure",
];

// ============================================================================
// SECTION: Deployment Handle
// ============================================================================

/// Reference to one provisioned infrastructure instance.
///
/// Owned by a single scenario and destroyed at scenario end regardless of
/// outcome. Connection targets (kubeconfigs, endpoints) are derived from the
/// parsed outputs.
#[derive(Debug, Clone)]
pub struct DeploymentHandle {
    /// Root module directory that was applied.
    dir: PathBuf,
    /// Rendered `-var` arguments, reused verbatim by destroy.
    var_args: Vec<String>,
    /// Parsed `terraform output -json` values.
    outputs: BTreeMap<String, serde_json::Value>,
}

impl DeploymentHandle {
    /// Returns the output value for `key` as a string.
    ///
    /// # Errors
    /// Returns [`ScenarioError::InvalidInput`] when the output is missing or
    /// not a string.
    pub fn output(&self, key: &str) -> Result<String, ScenarioError> {
        match self.outputs.get(key) {
            Some(serde_json::Value::String(value)) => Ok(value.clone()),
            Some(other) => Ok(other.to_string()),
            None => Err(ScenarioError::InvalidInput(format!("missing terraform output `{key}`"))),
        }
    }

    /// Returns the raw output value for `key`, when present.
    #[must_use]
    pub fn output_value(&self, key: &str) -> Option<&serde_json::Value> {
        self.outputs.get(key)
    }
}

// ============================================================================
// SECTION: Terraform Client
// ============================================================================

/// Terraform CLI client bound to one configuration.
#[derive(Clone)]
pub struct TerraformClient {
    /// Command runner used for every invocation.
    runner: Arc<dyn CommandRunner>,
    /// Invocation parameters (dir, vars, retry budget).
    config: TerraformConfig,
}

impl TerraformClient {
    /// Creates a client from a runner and terraform configuration.
    #[must_use]
    pub fn new(runner: Arc<dyn CommandRunner>, config: TerraformConfig) -> Self {
        Self {
            runner,
            config,
        }
    }

    /// Runs `terraform init` followed by `terraform apply`, retrying
    /// transient apply failures per the configured fixed budget, then reads
    /// all outputs into a [`DeploymentHandle`].
    ///
    /// # Errors
    /// Returns [`ScenarioError::Provision`] when init or apply fail after
    /// exhausting retries, or when outputs cannot be parsed.
    pub async fn init_and_apply(
        &self,
        extra_vars: &BTreeMap<String, TerraformVar>,
    ) -> Result<DeploymentHandle, ScenarioError> {
        let var_args = self.render_var_args(extra_vars);
        self.run_provision(&self.init_spec()).await?;
        let apply_spec = self.apply_spec(&var_args);
        let spec = &apply_spec;
        retry_fixed(
            self.config.max_retries,
            self.config.retry_interval(),
            is_retryable,
            move || async move { self.run_provision(spec).await },
        )
        .await?;
        let outputs = self.read_outputs().await?;
        Ok(DeploymentHandle {
            dir: self.config.dir.clone(),
            var_args,
            outputs,
        })
    }

    /// Runs `terraform destroy` for a previously applied deployment.
    ///
    /// # Errors
    /// Returns [`ScenarioError::Provision`] when destroy fails.
    pub async fn destroy(&self, handle: &DeploymentHandle) -> Result<(), ScenarioError> {
        let mut args = vec!["destroy".to_string(), "-auto-approve".to_string(), "-input=false".to_string()];
        if self.config.no_color {
            args.push("-no-color".to_string());
        }
        args.extend(handle.var_args.iter().cloned());
        let spec = CommandSpec::new("terraform", args).with_current_dir(handle.dir.clone());
        self.run_provision(&spec).await
    }

    /// Re-reads one output from `terraform output -json`. Failover scenarios
    /// use this for outputs whose value tracks the deployment's state, such
    /// as the DNS endpoint.
    ///
    /// # Errors
    /// Returns [`ScenarioError::Provision`] when outputs cannot be read, or
    /// [`ScenarioError::InvalidInput`] when the key is absent.
    pub async fn refresh_output(&self, key: &str) -> Result<String, ScenarioError> {
        let outputs = self.read_outputs().await?;
        match outputs.get(key) {
            Some(serde_json::Value::String(value)) => Ok(value.clone()),
            Some(other) => Ok(other.to_string()),
            None => Err(ScenarioError::InvalidInput(format!("missing terraform output `{key}`"))),
        }
    }

    /// Reads `terraform output -json` into a key/value map.
    async fn read_outputs(&self) -> Result<BTreeMap<String, serde_json::Value>, ScenarioError> {
        let spec = CommandSpec::new("terraform", ["output", "-json"])
            .with_current_dir(self.config.dir.clone());
        let output = self
            .runner
            .run(&spec)
            .await
            .map_err(|err| ScenarioError::Provision(err.to_string()))?;
        let raw: BTreeMap<String, OutputEntry> = serde_json::from_str(output.stdout_trimmed())
            .map_err(|err| ScenarioError::Provision(format!("unparsable terraform outputs: {err}")))?;
        Ok(raw.into_iter().map(|(key, entry)| (key, entry.value)).collect())
    }

    /// Builds the `terraform init` spec.
    fn init_spec(&self) -> CommandSpec {
        let mut args = vec!["init".to_string(), "-input=false".to_string()];
        if self.config.no_color {
            args.push("-no-color".to_string());
        }
        CommandSpec::new("terraform", args).with_current_dir(self.config.dir.clone())
    }

    /// Builds the `terraform apply` spec with rendered variables.
    fn apply_spec(&self, var_args: &[String]) -> CommandSpec {
        let mut args =
            vec!["apply".to_string(), "-auto-approve".to_string(), "-input=false".to_string()];
        if self.config.no_color {
            args.push("-no-color".to_string());
        }
        args.extend(var_args.iter().cloned());
        CommandSpec::new("terraform", args).with_current_dir(self.config.dir.clone())
    }

    /// Renders configured plus scenario variables as `-var` arguments.
    fn render_var_args(&self, extra_vars: &BTreeMap<String, TerraformVar>) -> Vec<String> {
        let mut merged = self.config.variables.clone();
        for (key, value) in extra_vars {
            merged.insert(key.clone(), value.clone());
        }
        let mut args = Vec::with_capacity(merged.len() * 2);
        for (key, value) in &merged {
            args.push("-var".to_string());
            args.push(format!("{key}={}", render_var(value)));
        }
        args
    }

    /// Runs a provisioning command, mapping failures to `Provision`.
    async fn run_provision(&self, spec: &CommandSpec) -> Result<(), ScenarioError> {
        self.runner
            .run(spec)
            .await
            .map(|_| ())
            .map_err(|err| ScenarioError::Provision(err.to_string()))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// One entry of `terraform output -json`.
#[derive(Debug, serde::Deserialize)]
struct OutputEntry {
    /// The output value; type and sensitivity metadata are ignored.
    value: serde_json::Value,
}

/// Renders a variable value in CLI form.
fn render_var(value: &TerraformVar) -> String {
    match value {
        TerraformVar::String(text) => text.clone(),
        TerraformVar::Bool(flag) => flag.to_string(),
        TerraformVar::Map(map) => {
            serde_json::to_string(map).unwrap_or_else(|_| String::from("{}"))
        }
    }
}

/// Returns true when a provisioning error is transient.
fn is_retryable(err: &ScenarioError) -> bool {
    let rendered = err.to_string();
    RETRYABLE_ERRORS.iter().any(|needle| rendered.contains(needle))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
