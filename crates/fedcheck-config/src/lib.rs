// crates/fedcheck-config/src/lib.rs
// ============================================================================
// Module: Fedcheck Config
// Description: Typed configuration for the fedcheck integration suites.
// Purpose: Replace ad-hoc option bags with validated, explicit structures.
// Dependencies: serde, thiserror, toml
// ============================================================================

//! ## Overview
//! Suite configuration is an explicit value passed to each scenario; there is
//! no process-global state. Each external tool gets a structure with
//! enumerated recognized fields rather than an open key/value bag, and
//! validation fails closed before any infrastructure is touched.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod model;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use model::BackupConfig;
pub use model::ConfigError;
pub use model::HelmConfig;
pub use model::KubernetesConfig;
pub use model::RegionConfig;
pub use model::SuiteConfig;
pub use model::TerraformConfig;
pub use model::TerraformVar;
pub use model::TimeoutsConfig;
