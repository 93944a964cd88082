// crates/fedcheck-tools/src/lib.rs
// ============================================================================
// Module: Fedcheck Tools
// Description: Adapters for the external tools the suites shell out to.
// Purpose: Wrap terraform/helm/kubectl/consul/aws behind typed operations.
// Dependencies: fedcheck-core, fedcheck-config, aws-sdk-s3, serde_json
// ============================================================================

//! ## Overview
//! Every adapter runs through [`fedcheck_core::CommandRunner`], so the suites
//! can substitute an in-process stub for the real CLIs. Adapters translate
//! typed operations into argument lists and parse the JSON the tools emit;
//! they implement nothing of the tools themselves.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod aws;
pub mod consul;
pub mod helm;
pub mod kubectl;
pub mod s3;
pub mod terraform;

#[cfg(test)]
pub(crate) mod test_support;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use aws::AwsCli;
pub use aws::HealthCheck;
pub use aws::LoadBalancer;
pub use aws::PeeringConnection;
pub use consul::AgentCheck;
pub use consul::ConsulCluster;
pub use consul::MemberEntry;
pub use consul::ServiceEntry;
pub use helm::HelmClient;
pub use kubectl::KubectlClient;
pub use kubectl::KubectlOptions;
pub use kubectl::PodInfo;
pub use s3::SnapshotStore;
pub use terraform::DeploymentHandle;
pub use terraform::TerraformClient;
