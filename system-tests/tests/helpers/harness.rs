// system-tests/tests/helpers/harness.rs
// ============================================================================
// Module: Federation Fixture
// Description: Wires the adapters to the cluster stub or live clusters.
// Purpose: Give every suite one entry point for provisioned scenarios.
// Dependencies: fedcheck-core, fedcheck-tools, cluster_stub
// ============================================================================

//! ## Overview
//! A [`FederationFixture`] owns the command runner and the adapter set for
//! one scenario. Suites get a fresh fixture per scenario, so stub state never
//! leaks between tests. Provisioning registers its own destroy teardown, so
//! every exit path deprovisions exactly once.

use std::collections::BTreeMap;
use std::sync::Arc;

use fedcheck_core::CommandRunner;
use fedcheck_core::Scenario;
use fedcheck_core::ScenarioError;
use fedcheck_tools::ConsulCluster;
use fedcheck_tools::DeploymentHandle;
use fedcheck_tools::HelmClient;
use fedcheck_tools::KubectlClient;
use fedcheck_tools::KubectlOptions;
use fedcheck_tools::TerraformClient;

use fedcheck_config::SuiteConfig;
use fedcheck_config::TerraformVar;
use system_tests::config::SystemTestConfig;

use super::cluster_stub::ClusterSim;
use super::cluster_stub::PRIMARY_KUBECONFIG;
use super::cluster_stub::SECONDARY_KUBECONFIG;
use super::scenarios;

/// Adapter bundle for one scenario.
pub struct FederationFixture {
    /// The stub behind the runner, for failure injection and counters.
    pub sim: Arc<ClusterSim>,
    /// Runner shared by every adapter.
    pub runner: Arc<dyn CommandRunner>,
    /// Suite configuration the adapters are bound to.
    pub config: SuiteConfig,
    /// Terraform adapter.
    pub terraform: TerraformClient,
    /// Kubectl adapter.
    pub kubectl: KubectlClient,
    /// Helm adapter.
    pub helm: HelmClient,
    /// Kubeconfig path for the primary cluster.
    primary_kubeconfig: String,
    /// Kubeconfig path for the secondary cluster.
    secondary_kubeconfig: String,
}

impl Default for FederationFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl FederationFixture {
    /// Creates a fixture over a fresh cluster stub.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(scenarios::suite_config())
    }

    /// Creates a fixture over a fresh cluster stub with explicit config.
    /// When both `FEDCHECK_*_KUBECONFIG` variables are set, connection
    /// options target those live clusters instead of the stub paths.
    #[must_use]
    pub fn with_config(config: SuiteConfig) -> Self {
        let env = SystemTestConfig::load().unwrap_or_default();
        let (primary_kubeconfig, secondary_kubeconfig) = if env.live_clusters() {
            (
                env.primary_kubeconfig
                    .map_or_else(|| PRIMARY_KUBECONFIG.to_string(), |path| {
                        path.to_string_lossy().into_owned()
                    }),
                env.secondary_kubeconfig
                    .map_or_else(|| SECONDARY_KUBECONFIG.to_string(), |path| {
                        path.to_string_lossy().into_owned()
                    }),
            )
        } else {
            (PRIMARY_KUBECONFIG.to_string(), SECONDARY_KUBECONFIG.to_string())
        };
        let sim = Arc::new(ClusterSim::new());
        let runner: Arc<dyn CommandRunner> = sim.clone();
        let terraform = TerraformClient::new(Arc::clone(&runner), config.terraform.clone());
        let kubectl = KubectlClient::new(Arc::clone(&runner));
        let helm = HelmClient::new(Arc::clone(&runner), config.helm.clone());
        Self {
            sim,
            runner,
            config,
            terraform,
            kubectl,
            helm,
            primary_kubeconfig,
            secondary_kubeconfig,
        }
    }

    /// Applies the federation root module and registers its destroy
    /// teardown on the scenario.
    ///
    /// # Errors
    /// Returns [`ScenarioError::Provision`] when apply fails after retries.
    pub async fn provision(
        &self,
        scenario: &Scenario,
    ) -> Result<DeploymentHandle, ScenarioError> {
        scenario.step("terraform init and apply");
        let vars = BTreeMap::from([(
            "environment".to_string(),
            TerraformVar::String(scenario.scoped_name("fedcheck")),
        )]);
        let handle = self.terraform.init_and_apply(&vars).await?;
        let terraform = self.terraform.clone();
        let deployment = handle.clone();
        scenario.defer_teardown("terraform destroy", async move {
            terraform.destroy(&deployment).await
        });
        Ok(handle)
    }

    /// Returns connection options for the primary cluster's namespace.
    #[must_use]
    pub fn primary_options(&self, namespace: &str) -> KubectlOptions {
        KubectlOptions::with_kubeconfig(&self.primary_kubeconfig, namespace)
    }

    /// Returns connection options for the secondary cluster's namespace.
    #[must_use]
    pub fn secondary_options(&self, namespace: &str) -> KubectlOptions {
        KubectlOptions::with_kubeconfig(&self.secondary_kubeconfig, namespace)
    }

    /// Returns a Consul handle on the primary datacenter's first server pod.
    #[must_use]
    pub fn primary_cluster(&self) -> ConsulCluster {
        self.cluster(self.primary_options(&self.config.kubernetes.consul_namespace))
    }

    /// Returns a Consul handle on the secondary datacenter's first server
    /// pod.
    #[must_use]
    pub fn secondary_cluster(&self) -> ConsulCluster {
        self.cluster(self.secondary_options(&self.config.kubernetes.consul_namespace))
    }

    /// Builds a Consul handle for arbitrary connection options.
    #[must_use]
    pub fn cluster(&self, options: KubectlOptions) -> ConsulCluster {
        ConsulCluster::new(self.kubectl.clone(), options, "consul-server-0")
    }
}
