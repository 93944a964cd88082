// crates/fedcheck-tools/src/aws.rs
// ============================================================================
// Module: AWS CLI Adapter
// Description: Read-only AWS control-plane queries through the aws CLI.
// Purpose: Verify EKS, Route 53, load balancer, and peering health.
// Dependencies: fedcheck-core, serde_json
// ============================================================================

//! ## Overview
//! The suites only read AWS state; all mutation goes through terraform. Every
//! query pins `--region` and `--output json` so responses parse the same way
//! regardless of the operator's local CLI configuration.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use fedcheck_core::CommandRunner;
use fedcheck_core::CommandSpec;
use fedcheck_core::ScenarioError;
use serde::Deserialize;

// ============================================================================
// SECTION: Response Models
// ============================================================================

/// `aws eks describe-cluster` response envelope.
#[derive(Debug, Deserialize)]
struct DescribeCluster {
    /// Cluster detail block.
    cluster: ClusterDetail,
}

/// Cluster detail block.
#[derive(Debug, Deserialize)]
struct ClusterDetail {
    /// Lifecycle status, e.g. `ACTIVE`.
    status: String,
}

/// `aws route53 list-health-checks` response envelope.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListHealthChecks {
    /// Registered health checks.
    #[serde(default)]
    health_checks: Vec<HealthCheck>,
}

/// One Route 53 health check.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HealthCheck {
    /// Health check identifier.
    pub id: String,
    /// Probe configuration.
    pub health_check_config: HealthCheckConfig,
}

/// Probe configuration of a Route 53 health check.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HealthCheckConfig {
    /// Probed domain name, when configured.
    #[serde(default)]
    pub fully_qualified_domain_name: Option<String>,
    /// Probe type, e.g. `HTTPS`.
    #[serde(rename = "Type", default)]
    pub probe_type: String,
}

/// `aws elbv2 describe-load-balancers` response envelope.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeLoadBalancers {
    /// Load balancers in the region.
    #[serde(default)]
    load_balancers: Vec<LoadBalancer>,
}

/// One load balancer summary.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LoadBalancer {
    /// Load balancer name.
    pub load_balancer_name: String,
    /// Current state block.
    pub state: LoadBalancerState,
}

/// Load balancer state block.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LoadBalancerState {
    /// State code, e.g. `active`.
    pub code: String,
}

/// `aws ec2 describe-vpc-peering-connections` response envelope.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribePeering {
    /// Peering connections in the region.
    #[serde(default)]
    vpc_peering_connections: Vec<PeeringConnection>,
}

/// One VPC peering connection.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PeeringConnection {
    /// Peering connection identifier.
    pub vpc_peering_connection_id: String,
    /// Lifecycle status block.
    pub status: PeeringStatus,
}

/// VPC peering status block.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PeeringStatus {
    /// Status code, e.g. `active`.
    pub code: String,
}

// ============================================================================
// SECTION: AWS Client
// ============================================================================

/// AWS CLI client bound to one region.
pub struct AwsCli {
    /// Command runner used for every invocation.
    runner: Arc<dyn CommandRunner>,
    /// Region every query targets.
    region: String,
}

impl AwsCli {
    /// Creates a client for one region.
    #[must_use]
    pub fn new(runner: Arc<dyn CommandRunner>, region: &str) -> Self {
        Self {
            runner,
            region: region.to_string(),
        }
    }

    /// Returns the lifecycle status of an EKS cluster, e.g. `ACTIVE`.
    ///
    /// # Errors
    /// Returns [`ScenarioError::Exec`] when the query fails or
    /// [`ScenarioError::InvalidInput`] when the response is unparsable.
    pub async fn eks_cluster_status(&self, cluster: &str) -> Result<String, ScenarioError> {
        let parsed: DescribeCluster =
            self.query(&["eks", "describe-cluster", "--name", cluster]).await?;
        Ok(parsed.cluster.status)
    }

    /// Lists every Route 53 health check in the account.
    ///
    /// # Errors
    /// Returns [`ScenarioError::Exec`] when the query fails or
    /// [`ScenarioError::InvalidInput`] when the response is unparsable.
    pub async fn route53_health_checks(&self) -> Result<Vec<HealthCheck>, ScenarioError> {
        let parsed: ListHealthChecks = self.query(&["route53", "list-health-checks"]).await?;
        Ok(parsed.health_checks)
    }

    /// Lists load balancers and their states in the region.
    ///
    /// # Errors
    /// Returns [`ScenarioError::Exec`] when the query fails or
    /// [`ScenarioError::InvalidInput`] when the response is unparsable.
    pub async fn load_balancers(&self) -> Result<Vec<LoadBalancer>, ScenarioError> {
        let parsed: DescribeLoadBalancers =
            self.query(&["elbv2", "describe-load-balancers"]).await?;
        Ok(parsed.load_balancers)
    }

    /// Lists VPC peering connections and their lifecycle states.
    ///
    /// # Errors
    /// Returns [`ScenarioError::Exec`] when the query fails or
    /// [`ScenarioError::InvalidInput`] when the response is unparsable.
    pub async fn vpc_peering_connections(&self) -> Result<Vec<PeeringConnection>, ScenarioError> {
        let parsed: DescribePeering =
            self.query(&["ec2", "describe-vpc-peering-connections"]).await?;
        Ok(parsed.vpc_peering_connections)
    }

    /// Runs one query with region and JSON output pinned, parsing stdout.
    async fn query<T>(&self, args: &[&str]) -> Result<T, ScenarioError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let mut full: Vec<String> = args.iter().map(ToString::to_string).collect();
        full.push("--region".to_string());
        full.push(self.region.clone());
        full.push("--output".to_string());
        full.push("json".to_string());
        let spec = CommandSpec::new("aws", full);
        let output = self.runner.run(&spec).await?;
        serde_json::from_str(output.stdout_trimmed()).map_err(|err| {
            ScenarioError::InvalidInput(format!("unparsable response from `{spec}`: {err}"))
        })
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
