// crates/fedcheck-config/src/model.rs
// ============================================================================
// Module: Suite Configuration Model
// Description: Configuration structures for regions, tools, and timeouts.
// Purpose: Provide validated scenario parameters loaded from TOML.
// Dependencies: serde, thiserror, toml
// ============================================================================

//! ## Overview
//! The configuration model mirrors what the suites actually parameterize: a
//! primary/secondary region pair, the Terraform root and its variables, the
//! Helm chart used to install Consul, kubeconfig targets, the backup bucket,
//! and the fixed polling budgets. `SuiteConfig::validate` rejects anything a
//! scenario could not run with instead of failing mid-provision.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation failure.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config {path}: {detail}")]
    Read {
        /// Path of the configuration file.
        path: PathBuf,
        /// Rendering of the underlying I/O failure.
        detail: String,
    },

    /// The configuration file was not valid TOML for the model.
    #[error("failed to parse config {path}: {detail}")]
    Parse {
        /// Path of the configuration file.
        path: PathBuf,
        /// Rendering of the parse failure.
        detail: String,
    },

    /// A field failed validation.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Regions
// ============================================================================

/// One deployment region and its Consul datacenter name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionConfig {
    /// Cloud region, e.g. `us-west-2`.
    pub region: String,
    /// Consul datacenter name served from this region, e.g. `dc1`.
    pub datacenter: String,
}

// ============================================================================
// SECTION: Terraform
// ============================================================================

/// A Terraform input variable value.
///
/// Only the shapes the suite actually passes are representable; anything
/// else is a configuration error by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TerraformVar {
    /// String value.
    String(String),
    /// Boolean value.
    Bool(bool),
    /// Nested string map, used for per-region variable blocks.
    Map(BTreeMap<String, String>),
}

/// Terraform invocation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerraformConfig {
    /// Directory holding the root module to apply.
    pub dir: PathBuf,
    /// Input variables passed as `-var` flags.
    #[serde(default)]
    pub variables: BTreeMap<String, TerraformVar>,
    /// Disables ANSI color in tool output for stable assertions.
    #[serde(default = "default_true")]
    pub no_color: bool,
    /// Fixed number of retries for retryable apply errors.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Fixed delay between apply retries, in seconds.
    #[serde(default = "default_retry_interval_secs")]
    pub retry_interval_secs: u64,
}

impl TerraformConfig {
    /// Returns the fixed retry delay as a duration.
    #[must_use]
    pub const fn retry_interval(&self) -> Duration {
        Duration::from_secs(self.retry_interval_secs)
    }
}

// ============================================================================
// SECTION: Helm
// ============================================================================

/// Helm chart installation parameters for the Consul release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelmConfig {
    /// Path or reference of the Consul chart.
    pub chart: String,
    /// Prefix for generated release names; each scenario appends its id.
    #[serde(default = "default_release_prefix")]
    pub release_prefix: String,
    /// Chart values passed as `--set key=value`.
    #[serde(default)]
    pub set_values: BTreeMap<String, String>,
}

// ============================================================================
// SECTION: Kubernetes
// ============================================================================

/// Kubernetes connection parameters for both regions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KubernetesConfig {
    /// Prefix for generated test namespaces.
    #[serde(default = "default_namespace_prefix")]
    pub namespace_prefix: String,
    /// Namespace the Consul release is installed into.
    #[serde(default = "default_consul_namespace")]
    pub consul_namespace: String,
    /// Optional kubeconfig path for the primary cluster.
    #[serde(default)]
    pub primary_kubeconfig: Option<PathBuf>,
    /// Optional kubeconfig path for the secondary cluster.
    #[serde(default)]
    pub secondary_kubeconfig: Option<PathBuf>,
}

// ============================================================================
// SECTION: Backups
// ============================================================================

/// Snapshot backup verification parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupConfig {
    /// Whether backup verification is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Object-store bucket that receives snapshots.
    #[serde(default)]
    pub bucket: String,
    /// Region of the bucket.
    #[serde(default)]
    pub region: String,
    /// Optional endpoint override, e.g. a local MinIO for offline runs.
    #[serde(default)]
    pub endpoint: Option<String>,
}

// ============================================================================
// SECTION: Timeouts
// ============================================================================

/// Fixed polling budgets used across scenarios. No exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutsConfig {
    /// Attempts while waiting for pods to appear or become ready.
    #[serde(default = "default_pod_attempts")]
    pub pod_wait_attempts: u32,
    /// Fixed interval between pod readiness probes, in seconds.
    #[serde(default = "default_pod_interval_secs")]
    pub pod_wait_interval_secs: u64,
    /// Attempts while waiting for federation state to converge.
    #[serde(default = "default_federation_attempts")]
    pub federation_attempts: u32,
    /// Fixed interval between federation probes, in seconds.
    #[serde(default = "default_federation_interval_secs")]
    pub federation_interval_secs: u64,
}

impl TimeoutsConfig {
    /// Returns the pod readiness probe interval.
    #[must_use]
    pub const fn pod_wait_interval(&self) -> Duration {
        Duration::from_secs(self.pod_wait_interval_secs)
    }

    /// Returns the federation probe interval.
    #[must_use]
    pub const fn federation_interval(&self) -> Duration {
        Duration::from_secs(self.federation_interval_secs)
    }
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self {
            pod_wait_attempts: default_pod_attempts(),
            pod_wait_interval_secs: default_pod_interval_secs(),
            federation_attempts: default_federation_attempts(),
            federation_interval_secs: default_federation_interval_secs(),
        }
    }
}

// ============================================================================
// SECTION: Suite Config
// ============================================================================

/// Root configuration passed explicitly to every scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteConfig {
    /// Environment name prefix; scenarios append their unique id.
    pub environment: String,
    /// DNS domain used by the deployment.
    #[serde(default = "default_domain")]
    pub domain: String,
    /// Primary region.
    pub primary: RegionConfig,
    /// Secondary region.
    pub secondary: RegionConfig,
    /// Terraform parameters.
    pub terraform: TerraformConfig,
    /// Helm parameters.
    pub helm: HelmConfig,
    /// Kubernetes parameters.
    #[serde(default = "default_kubernetes")]
    pub kubernetes: KubernetesConfig,
    /// Backup verification parameters.
    #[serde(default = "default_backup")]
    pub backup: BackupConfig,
    /// Polling budgets.
    #[serde(default)]
    pub timeouts: TimeoutsConfig,
}

impl SuiteConfig {
    /// Loads and validates a suite configuration from a TOML file.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when the file cannot be read, parsed, or
    /// validated.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|err| ConfigError::Read {
            path: path.to_path_buf(),
            detail: err.to_string(),
        })?;
        let config: Self = toml::from_str(&raw).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            detail: err.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration, failing closed on unusable values.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] naming the first rejected field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.environment.trim().is_empty() {
            return Err(ConfigError::Invalid("environment must not be empty".to_string()));
        }
        for (label, region) in [("primary", &self.primary), ("secondary", &self.secondary)] {
            if region.region.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{label} region must not be empty")));
            }
            if region.datacenter.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{label} datacenter must not be empty")));
            }
        }
        if self.primary.region == self.secondary.region {
            return Err(ConfigError::Invalid(
                "primary and secondary regions must differ".to_string(),
            ));
        }
        if self.primary.datacenter == self.secondary.datacenter {
            return Err(ConfigError::Invalid(
                "primary and secondary datacenters must differ".to_string(),
            ));
        }
        if self.terraform.dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("terraform dir must not be empty".to_string()));
        }
        if self.terraform.max_retries == 0 {
            return Err(ConfigError::Invalid("terraform max_retries must be >= 1".to_string()));
        }
        if self.helm.chart.trim().is_empty() {
            return Err(ConfigError::Invalid("helm chart must not be empty".to_string()));
        }
        if self.backup.enabled && self.backup.bucket.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "backup bucket must be set when backups are enabled".to_string(),
            ));
        }
        if self.timeouts.pod_wait_attempts == 0 || self.timeouts.federation_attempts == 0 {
            return Err(ConfigError::Invalid("poll attempts must be >= 1".to_string()));
        }
        // Zero intervals are legal: polling then probes back to back, which
        // stub-backed runs rely on.
        Ok(())
    }

    /// Returns the per-region kubeconfig, primary first.
    #[must_use]
    pub const fn kubeconfig_for(&self, primary: bool) -> &Option<PathBuf> {
        if primary {
            &self.kubernetes.primary_kubeconfig
        } else {
            &self.kubernetes.secondary_kubeconfig
        }
    }
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default for boolean fields that ship enabled.
const fn default_true() -> bool {
    true
}

/// Default apply retry budget.
const fn default_max_retries() -> u32 {
    3
}

/// Default delay between apply retries.
const fn default_retry_interval_secs() -> u64 {
    10
}

/// Default Helm release prefix.
fn default_release_prefix() -> String {
    "consul-test".to_string()
}

/// Default generated namespace prefix.
fn default_namespace_prefix() -> String {
    "consul-test".to_string()
}

/// Default namespace for the Consul release itself.
fn default_consul_namespace() -> String {
    "consul".to_string()
}

/// Default DNS domain.
fn default_domain() -> String {
    "example.com".to_string()
}

/// Default Kubernetes block.
fn default_kubernetes() -> KubernetesConfig {
    KubernetesConfig {
        namespace_prefix: default_namespace_prefix(),
        consul_namespace: default_consul_namespace(),
        primary_kubeconfig: None,
        secondary_kubeconfig: None,
    }
}

/// Default backup block (disabled until a bucket is configured).
fn default_backup() -> BackupConfig {
    BackupConfig {
        enabled: false,
        bucket: String::new(),
        region: String::new(),
        endpoint: None,
    }
}

/// Default pod readiness attempts.
const fn default_pod_attempts() -> u32 {
    10
}

/// Default pod readiness interval.
const fn default_pod_interval_secs() -> u64 {
    10
}

/// Default federation convergence attempts.
const fn default_federation_attempts() -> u32 {
    12
}

/// Default federation convergence interval.
const fn default_federation_interval_secs() -> u64 {
    5
}
