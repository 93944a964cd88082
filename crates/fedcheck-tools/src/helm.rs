// crates/fedcheck-tools/src/helm.rs
// ============================================================================
// Module: Helm Adapter
// Description: Chart release management through the helm CLI.
// Purpose: Install, upgrade, and purge per-scenario Consul releases.
// Dependencies: fedcheck-core, fedcheck-config
// ============================================================================

//! ## Overview
//! Each scenario installs its own release under a unique name, so concurrent
//! scenarios never contend for Helm state. Install waits for readiness via
//! `--wait`; delete always passes `--ignore-not-found` so teardown stays
//! idempotent.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;

use fedcheck_core::CommandRunner;
use fedcheck_core::CommandSpec;
use fedcheck_core::ScenarioError;

use fedcheck_config::HelmConfig;

use crate::kubectl::KubectlOptions;

// ============================================================================
// SECTION: Helm Client
// ============================================================================

/// Helm CLI client bound to one chart configuration.
#[derive(Clone)]
pub struct HelmClient {
    /// Command runner used for every invocation.
    runner: Arc<dyn CommandRunner>,
    /// Chart and default value overrides.
    config: HelmConfig,
}

impl HelmClient {
    /// Creates a client from a runner and helm configuration.
    #[must_use]
    pub fn new(runner: Arc<dyn CommandRunner>, config: HelmConfig) -> Self {
        Self {
            runner,
            config,
        }
    }

    /// Installs the configured chart as `release`, waiting for readiness.
    ///
    /// Scenario overrides in `set_values` take precedence over configured
    /// defaults with the same key.
    ///
    /// # Errors
    /// Returns [`ScenarioError::Provision`] when the install fails.
    pub async fn install(
        &self,
        options: &KubectlOptions,
        release: &str,
        set_values: &BTreeMap<String, String>,
    ) -> Result<(), ScenarioError> {
        let mut args = vec![
            "install".to_string(),
            release.to_string(),
            self.config.chart.clone(),
            "--wait".to_string(),
        ];
        self.push_target_flags(&mut args, options);
        self.push_set_flags(&mut args, set_values);
        self.run_release(args).await
    }

    /// Upgrades an existing release in place, waiting for the rollout.
    ///
    /// # Errors
    /// Returns [`ScenarioError::Provision`] when the upgrade fails.
    pub async fn upgrade(
        &self,
        options: &KubectlOptions,
        release: &str,
        set_values: &BTreeMap<String, String>,
    ) -> Result<(), ScenarioError> {
        let mut args = vec![
            "upgrade".to_string(),
            release.to_string(),
            self.config.chart.clone(),
            "--wait".to_string(),
            "--reuse-values".to_string(),
        ];
        self.push_target_flags(&mut args, options);
        self.push_set_flags(&mut args, set_values);
        self.run_release(args).await
    }

    /// Uninstalls a release. Safe to call for releases that no longer exist,
    /// so teardown can run on every exit path.
    ///
    /// # Errors
    /// Returns [`ScenarioError::Teardown`] when the uninstall itself fails.
    pub async fn delete(
        &self,
        options: &KubectlOptions,
        release: &str,
    ) -> Result<(), ScenarioError> {
        let mut args = vec![
            "uninstall".to_string(),
            release.to_string(),
            "--ignore-not-found".to_string(),
        ];
        self.push_target_flags(&mut args, options);
        self.runner
            .run(&CommandSpec::new("helm", args))
            .await
            .map(|_| ())
            .map_err(|err| ScenarioError::Teardown {
                label: format!("helm uninstall {release}"),
                detail: err.to_string(),
            })
    }

    /// Appends kubeconfig/context/namespace flags for the target cluster.
    fn push_target_flags(&self, args: &mut Vec<String>, options: &KubectlOptions) {
        if let Some(context) = &options.context {
            args.push("--kube-context".to_string());
            args.push(context.clone());
        }
        if let Some(kubeconfig) = &options.kubeconfig {
            args.push("--kubeconfig".to_string());
            args.push(kubeconfig.display().to_string());
        }
        if let Some(namespace) = &options.namespace {
            args.push("--namespace".to_string());
            args.push(namespace.clone());
        }
    }

    /// Appends configured defaults then scenario overrides as `--set` flags.
    fn push_set_flags(&self, args: &mut Vec<String>, set_values: &BTreeMap<String, String>) {
        let mut merged = self.config.set_values.clone();
        for (key, value) in set_values {
            merged.insert(key.clone(), value.clone());
        }
        for (key, value) in &merged {
            args.push("--set".to_string());
            args.push(format!("{key}={value}"));
        }
    }

    /// Runs an install/upgrade invocation, mapping failures to `Provision`.
    async fn run_release(&self, args: Vec<String>) -> Result<(), ScenarioError> {
        self.runner
            .run(&CommandSpec::new("helm", args))
            .await
            .map(|_| ())
            .map_err(|err| ScenarioError::Provision(err.to_string()))
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
