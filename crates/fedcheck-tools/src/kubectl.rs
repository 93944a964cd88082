// crates/fedcheck-tools/src/kubectl.rs
// ============================================================================
// Module: Kubectl Adapter
// Description: Cluster command interface over the kubectl CLI.
// Purpose: Address remote workloads and capture their text output.
// Dependencies: fedcheck-core, base64, serde_json, tempfile
// ============================================================================

//! ## Overview
//! A [`KubectlOptions`] value is the connection target: context, kubeconfig,
//! and namespace, derived from deployment outputs. Every operation renders an
//! argument list and captures text output; readiness helpers poll with the
//! fixed-interval budget from the core crate.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use fedcheck_core::CommandOutput;
use fedcheck_core::CommandRunner;
use fedcheck_core::CommandSpec;
use fedcheck_core::ScenarioError;
use fedcheck_core::wait_for_condition;
use serde::Deserialize;

// ============================================================================
// SECTION: Connection Target
// ============================================================================

/// Connection target for one cluster: context, kubeconfig, namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KubectlOptions {
    /// Optional kubectl context name.
    pub context: Option<String>,
    /// Optional kubeconfig path, usually a terraform output.
    pub kubeconfig: Option<PathBuf>,
    /// Namespace for namespaced operations.
    pub namespace: Option<String>,
}

impl KubectlOptions {
    /// Creates options addressing a namespace in the default cluster.
    #[must_use]
    pub fn for_namespace(namespace: &str) -> Self {
        Self {
            context: None,
            kubeconfig: None,
            namespace: Some(namespace.to_string()),
        }
    }

    /// Creates options addressing a namespace through a kubeconfig.
    #[must_use]
    pub fn with_kubeconfig(kubeconfig: impl Into<PathBuf>, namespace: &str) -> Self {
        Self {
            context: None,
            kubeconfig: Some(kubeconfig.into()),
            namespace: Some(namespace.to_string()),
        }
    }

    /// Returns a copy of these options addressing another namespace.
    #[must_use]
    pub fn in_namespace(&self, namespace: &str) -> Self {
        Self {
            context: self.context.clone(),
            kubeconfig: self.kubeconfig.clone(),
            namespace: Some(namespace.to_string()),
        }
    }

    /// Renders the connection flags shared by every invocation.
    fn connection_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(context) = &self.context {
            args.push("--context".to_string());
            args.push(context.clone());
        }
        if let Some(kubeconfig) = &self.kubeconfig {
            args.push("--kubeconfig".to_string());
            args.push(kubeconfig.display().to_string());
        }
        if let Some(namespace) = &self.namespace {
            args.push("--namespace".to_string());
            args.push(namespace.clone());
        }
        args
    }
}

// ============================================================================
// SECTION: Pod Model
// ============================================================================

/// Minimal pod view parsed from `kubectl get pods -o json`.
#[derive(Debug, Clone)]
pub struct PodInfo {
    /// Pod name.
    pub name: String,
    /// Pod phase, e.g. `Running`.
    pub phase: String,
    /// True when every container reports ready.
    pub ready: bool,
}

/// JSON shape of a pod list.
#[derive(Debug, Deserialize)]
struct PodList {
    /// Pods in the list.
    #[serde(default)]
    items: Vec<Pod>,
}

/// JSON shape of one pod.
#[derive(Debug, Deserialize)]
struct Pod {
    /// Pod metadata.
    metadata: PodMetadata,
    /// Pod status block.
    #[serde(default)]
    status: PodStatus,
}

/// JSON shape of pod metadata.
#[derive(Debug, Deserialize)]
struct PodMetadata {
    /// Pod name.
    name: String,
}

/// JSON shape of pod status.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PodStatus {
    /// Pod phase.
    #[serde(default)]
    phase: Option<String>,
    /// Container readiness entries.
    #[serde(default)]
    container_statuses: Vec<ContainerStatus>,
}

/// JSON shape of one container status.
#[derive(Debug, Deserialize)]
struct ContainerStatus {
    /// Container readiness flag.
    #[serde(default)]
    ready: bool,
}

impl From<Pod> for PodInfo {
    fn from(pod: Pod) -> Self {
        let ready = !pod.status.container_statuses.is_empty()
            && pod.status.container_statuses.iter().all(|container| container.ready);
        Self {
            name: pod.metadata.name,
            phase: pod.status.phase.unwrap_or_default(),
            ready,
        }
    }
}

// ============================================================================
// SECTION: Kubectl Client
// ============================================================================

/// Kubectl CLI client.
#[derive(Clone)]
pub struct KubectlClient {
    /// Command runner used for every invocation.
    runner: Arc<dyn CommandRunner>,
}

impl KubectlClient {
    /// Creates a client from a runner.
    #[must_use]
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            runner,
        }
    }

    /// Runs an arbitrary kubectl invocation and requires success.
    ///
    /// # Errors
    /// Returns [`ScenarioError::Exec`] on a non-zero exit.
    pub async fn run(
        &self,
        options: &KubectlOptions,
        args: &[&str],
    ) -> Result<CommandOutput, ScenarioError> {
        Ok(self.runner.run(&self.spec(options, args)).await?)
    }

    /// Runs a kubectl invocation that the scenario expects to fail.
    ///
    /// # Errors
    /// Returns [`ScenarioError::Exec`] when the invocation unexpectedly
    /// succeeds.
    pub async fn run_expect_failure(
        &self,
        options: &KubectlOptions,
        args: &[&str],
    ) -> Result<CommandOutput, ScenarioError> {
        Ok(self.runner.run_expect_failure(&self.spec(options, args)).await?)
    }

    /// Runs a command inside a pod and captures its output.
    ///
    /// # Errors
    /// Returns [`ScenarioError::Exec`] when the remote process exits
    /// non-zero.
    pub async fn exec_pod(
        &self,
        options: &KubectlOptions,
        pod: &str,
        command: &[&str],
    ) -> Result<CommandOutput, ScenarioError> {
        let mut args = vec!["exec", pod, "--"];
        args.extend_from_slice(command);
        self.run(options, &args).await
    }

    /// Runs a command inside a pod, requiring it to fail (access-control
    /// checks).
    ///
    /// # Errors
    /// Returns [`ScenarioError::Exec`] when the remote process unexpectedly
    /// succeeds.
    pub async fn exec_pod_expect_failure(
        &self,
        options: &KubectlOptions,
        pod: &str,
        command: &[&str],
    ) -> Result<CommandOutput, ScenarioError> {
        let mut args = vec!["exec", pod, "--"];
        args.extend_from_slice(command);
        self.run_expect_failure(options, &args).await
    }

    /// Applies a manifest file.
    ///
    /// # Errors
    /// Returns [`ScenarioError::Exec`] when apply fails.
    pub async fn apply_file(
        &self,
        options: &KubectlOptions,
        path: &str,
    ) -> Result<(), ScenarioError> {
        self.run(options, &["apply", "-f", path]).await.map(|_| ())
    }

    /// Applies an inline manifest by staging it in a temp file.
    ///
    /// # Errors
    /// Returns [`ScenarioError::Exec`] when staging or apply fails.
    pub async fn apply_manifest(
        &self,
        options: &KubectlOptions,
        manifest: &str,
    ) -> Result<(), ScenarioError> {
        let staged = stage_manifest(manifest)?;
        let path = staged.path().display().to_string();
        self.apply_file(options, &path).await
    }

    /// Deletes resources described by an inline manifest by staging it in a
    /// temp file.
    ///
    /// # Errors
    /// Returns [`ScenarioError::Exec`] when staging or delete fails.
    pub async fn delete_manifest(
        &self,
        options: &KubectlOptions,
        manifest: &str,
    ) -> Result<(), ScenarioError> {
        let staged = stage_manifest(manifest)?;
        let path = staged.path().display().to_string();
        self.delete_file(options, &path).await
    }

    /// Deletes resources described by a manifest file.
    ///
    /// # Errors
    /// Returns [`ScenarioError::Exec`] when delete fails.
    pub async fn delete_file(
        &self,
        options: &KubectlOptions,
        path: &str,
    ) -> Result<(), ScenarioError> {
        self.run(options, &["delete", "-f", path, "--ignore-not-found"]).await.map(|_| ())
    }

    /// Creates a namespace.
    ///
    /// # Errors
    /// Returns [`ScenarioError::Exec`] when creation fails.
    pub async fn create_namespace(
        &self,
        options: &KubectlOptions,
        namespace: &str,
    ) -> Result<(), ScenarioError> {
        self.run(options, &["create", "namespace", namespace]).await.map(|_| ())
    }

    /// Deletes a namespace and everything in it.
    ///
    /// # Errors
    /// Returns [`ScenarioError::Exec`] when deletion fails.
    pub async fn delete_namespace(
        &self,
        options: &KubectlOptions,
        namespace: &str,
    ) -> Result<(), ScenarioError> {
        self.run(options, &["delete", "namespace", namespace, "--ignore-not-found"])
            .await
            .map(|_| ())
    }

    /// Scales a workload, e.g. `statefulset/consul-server`, to `replicas`.
    ///
    /// # Errors
    /// Returns [`ScenarioError::Exec`] when scaling fails.
    pub async fn scale(
        &self,
        options: &KubectlOptions,
        workload: &str,
        replicas: u32,
    ) -> Result<(), ScenarioError> {
        let flag = format!("--replicas={replicas}");
        self.run(options, &["scale", workload, &flag]).await.map(|_| ())
    }

    /// Reads one key of a secret, decoding its base64 payload.
    ///
    /// # Errors
    /// Returns [`ScenarioError::Exec`] when the secret is missing or the
    /// payload is not valid base64/UTF-8.
    pub async fn get_secret(
        &self,
        options: &KubectlOptions,
        name: &str,
        key: &str,
    ) -> Result<String, ScenarioError> {
        let jsonpath = format!("jsonpath={{.data.{key}}}");
        let output = self.run(options, &["get", "secret", name, "-o", &jsonpath]).await?;
        let decoded = BASE64.decode(output.stdout_trimmed()).map_err(|err| {
            ScenarioError::InvalidInput(format!("secret `{name}` is not valid base64: {err}"))
        })?;
        String::from_utf8(decoded).map_err(|err| {
            ScenarioError::InvalidInput(format!("secret `{name}` is not valid UTF-8: {err}"))
        })
    }

    /// Lists pods matching a label selector.
    ///
    /// # Errors
    /// Returns [`ScenarioError::Exec`] when listing fails or the JSON is
    /// unparsable.
    pub async fn list_pods(
        &self,
        options: &KubectlOptions,
        selector: &str,
    ) -> Result<Vec<PodInfo>, ScenarioError> {
        let output = self.run(options, &["get", "pods", "-l", selector, "-o", "json"]).await?;
        let list: PodList = serde_json::from_str(output.stdout_trimmed()).map_err(|err| {
            ScenarioError::InvalidInput(format!("unparsable pod list for `{selector}`: {err}"))
        })?;
        Ok(list.items.into_iter().map(PodInfo::from).collect())
    }

    /// Polls until at least `want` pods match the selector.
    ///
    /// # Errors
    /// Returns [`ScenarioError::PollTimeout`] when the attempt budget is
    /// exhausted.
    pub async fn wait_until_pods_created(
        &self,
        options: &KubectlOptions,
        selector: &str,
        want: usize,
        attempts: u32,
        interval: Duration,
    ) -> Result<(), ScenarioError> {
        let label = format!("{want} pods matching `{selector}`");
        wait_for_condition(&label, attempts, interval, move || async move {
            Ok(self.list_pods(options, selector).await?.len() >= want)
        })
        .await
    }

    /// Polls until the named pod is running and all containers are ready.
    ///
    /// # Errors
    /// Returns [`ScenarioError::PollTimeout`] when the attempt budget is
    /// exhausted.
    pub async fn wait_until_pod_available(
        &self,
        options: &KubectlOptions,
        pod: &str,
        attempts: u32,
        interval: Duration,
    ) -> Result<(), ScenarioError> {
        let label = format!("pod `{pod}` available");
        wait_for_condition(&label, attempts, interval, move || async move {
            let output = self.run(options, &["get", "pod", pod, "-o", "json"]).await?;
            let parsed: Pod = serde_json::from_str(output.stdout_trimmed()).map_err(|err| {
                ScenarioError::InvalidInput(format!("unparsable pod `{pod}`: {err}"))
            })?;
            let info = PodInfo::from(parsed);
            Ok(info.phase == "Running" && info.ready)
        })
        .await
    }

    /// Builds the full invocation spec with connection flags.
    fn spec(&self, options: &KubectlOptions, args: &[&str]) -> CommandSpec {
        let mut full = options.connection_args();
        full.extend(args.iter().map(ToString::to_string));
        CommandSpec::new("kubectl", full)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Writes an inline manifest to a temp file kept alive by the returned
/// handle.
fn stage_manifest(manifest: &str) -> Result<tempfile::NamedTempFile, ScenarioError> {
    tempfile::NamedTempFile::new()
        .and_then(|file| {
            std::fs::write(file.path(), manifest.as_bytes())?;
            Ok(file)
        })
        .map_err(|err| ScenarioError::InvalidInput(format!("failed to stage manifest: {err}")))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
