// system-tests/src/config/env.rs
// ============================================================================
// Module: System Test Environment
// Description: Environment-backed configuration for system tests.
// Purpose: Centralize env parsing with strict UTF-8 validation.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Environment values are parsed with strict UTF-8 enforcement to avoid
//! silent misconfiguration. Invalid UTF-8, empty values, and malformed
//! timeouts all fail closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Environment keys for system test configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemTestEnv {
    /// Optional artifact run root override.
    RunRoot,
    /// Optional kubeconfig for a live primary cluster.
    PrimaryKubeconfig,
    /// Optional kubeconfig for a live secondary cluster.
    SecondaryKubeconfig,
    /// Optional backup bucket for a live object store.
    BackupBucket,
    /// Optional S3-compatible endpoint for backup verification.
    BackupEndpoint,
    /// Optional timeout floor override in seconds (positive integer).
    TimeoutSeconds,
}

impl SystemTestEnv {
    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RunRoot => "FEDCHECK_SYSTEM_TEST_RUN_ROOT",
            Self::PrimaryKubeconfig => "FEDCHECK_PRIMARY_KUBECONFIG",
            Self::SecondaryKubeconfig => "FEDCHECK_SECONDARY_KUBECONFIG",
            Self::BackupBucket => "FEDCHECK_BACKUP_BUCKET",
            Self::BackupEndpoint => "FEDCHECK_BACKUP_ENDPOINT",
            Self::TimeoutSeconds => "FEDCHECK_SYSTEM_TEST_TIMEOUT_SEC",
        }
    }
}

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Typed system test configuration derived from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SystemTestConfig {
    /// Optional artifact run root override.
    pub run_root: Option<PathBuf>,
    /// Optional kubeconfig for a live primary cluster.
    pub primary_kubeconfig: Option<PathBuf>,
    /// Optional kubeconfig for a live secondary cluster.
    pub secondary_kubeconfig: Option<PathBuf>,
    /// Optional backup bucket for a live object store.
    pub backup_bucket: Option<String>,
    /// Optional S3-compatible endpoint for backup verification.
    pub backup_endpoint: Option<String>,
    /// Optional timeout floor override.
    pub timeout: Option<Duration>,
}

impl SystemTestConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error when an environment value is not valid UTF-8, is
    /// empty, or fails validation (for example, an invalid timeout).
    pub fn load() -> Result<Self, String> {
        let run_root = read_env_nonempty(SystemTestEnv::RunRoot.as_str())?.map(PathBuf::from);
        let primary_kubeconfig =
            read_env_nonempty(SystemTestEnv::PrimaryKubeconfig.as_str())?.map(PathBuf::from);
        let secondary_kubeconfig =
            read_env_nonempty(SystemTestEnv::SecondaryKubeconfig.as_str())?.map(PathBuf::from);
        let backup_bucket = read_env_nonempty(SystemTestEnv::BackupBucket.as_str())?;
        let backup_endpoint = read_env_nonempty(SystemTestEnv::BackupEndpoint.as_str())?;
        let timeout = read_env_nonempty(SystemTestEnv::TimeoutSeconds.as_str())?
            .map(|value| parse_timeout_seconds(SystemTestEnv::TimeoutSeconds.as_str(), &value))
            .transpose()?;
        Ok(Self {
            run_root,
            primary_kubeconfig,
            secondary_kubeconfig,
            backup_bucket,
            backup_endpoint,
            timeout,
        })
    }

    /// Returns true when both live kubeconfigs are configured.
    #[must_use]
    pub const fn live_clusters(&self) -> bool {
        self.primary_kubeconfig.is_some() && self.secondary_kubeconfig.is_some()
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads an environment variable and enforces UTF-8 validity.
///
/// # Errors
///
/// Returns an error when the environment variable contains invalid UTF-8.
pub fn read_env_strict(name: &str) -> Result<Option<String>, String> {
    std::env::var_os(name).map_or(Ok(None), |raw| {
        raw.into_string().map(Some).map_err(|_| format!("{name} must be valid UTF-8"))
    })
}

/// Reads an environment variable and rejects empty values.
///
/// # Errors
///
/// Returns an error when the variable is set but empty or whitespace.
fn read_env_nonempty(name: &str) -> Result<Option<String>, String> {
    match read_env_strict(name)? {
        Some(value) if value.trim().is_empty() => Err(format!("{name} must not be empty")),
        Some(value) => Ok(Some(value)),
        None => Ok(None),
    }
}

/// Parses a positive timeout value from an environment variable string.
///
/// # Errors
///
/// Returns an error when the value is missing, non-numeric, or zero.
pub(crate) fn parse_timeout_seconds(name: &str, raw: &str) -> Result<Duration, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(format!("{name} must be a positive integer number of seconds"));
    }
    let secs: u64 = trimmed
        .parse()
        .map_err(|_| format!("{name} must be a positive integer number of seconds"))?;
    if secs == 0 {
        return Err(format!("{name} must be greater than zero"));
    }
    Ok(Duration::from_secs(secs))
}
