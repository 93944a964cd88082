// crates/fedcheck-tools/src/consul.rs
// ============================================================================
// Module: Consul Adapter
// Description: Consul operations executed inside a server pod.
// Purpose: KV, snapshots, federation membership, raft, and ACL operations.
// Dependencies: fedcheck-core, serde_json
// ============================================================================

//! ## Overview
//! A [`ConsulCluster`] addresses the `consul` binary inside one server pod
//! through kubectl exec, so the suites need no network path to the cluster.
//! Output is compared with coarse substring checks because CLI wording is
//! not a stable contract; only the agent HTTP API returns structured JSON.
//!
//! ## Invariants
//! - Every operation targets the pod the cluster was constructed with.
//! - Token-bearing variants never log or echo the token value.

// ============================================================================
// SECTION: Imports
// ============================================================================

use fedcheck_core::CommandOutput;
use fedcheck_core::ScenarioError;
use serde::Deserialize;

use crate::kubectl::KubectlClient;
use crate::kubectl::KubectlOptions;

// ============================================================================
// SECTION: Member Model
// ============================================================================

/// One row of `consul members` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberEntry {
    /// Node name, e.g. `consul-server-0.dc1`.
    pub name: String,
    /// Gossip status column, e.g. `alive`.
    pub status: String,
}

/// One health check row from the agent health-state API.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentCheck {
    /// Node the check runs on.
    #[serde(rename = "Node", default)]
    pub node: String,
    /// Check name, e.g. `Serf Health Status`.
    #[serde(rename = "Name", default)]
    pub name: String,
    /// Current status, e.g. `passing`.
    #[serde(rename = "Status", default)]
    pub status: String,
}

/// One registered service instance from the agent HTTP API.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceEntry {
    /// Service identifier.
    #[serde(rename = "ID", default)]
    pub id: String,
    /// Service name.
    #[serde(rename = "Service", default)]
    pub service: String,
    /// Advertised port.
    #[serde(rename = "Port", default)]
    pub port: u16,
}

// ============================================================================
// SECTION: Consul Cluster
// ============================================================================

/// Handle to one Consul datacenter, addressed through a server pod.
#[derive(Clone)]
pub struct ConsulCluster {
    /// Kubectl client carrying the cluster connection.
    kubectl: KubectlClient,
    /// Connection target for the server pod's namespace.
    options: KubectlOptions,
    /// Server pod the operations run inside.
    server_pod: String,
}

impl ConsulCluster {
    /// Creates a handle addressing `server_pod` through `options`.
    #[must_use]
    pub fn new(kubectl: KubectlClient, options: KubectlOptions, server_pod: &str) -> Self {
        Self {
            kubectl,
            options,
            server_pod: server_pod.to_string(),
        }
    }

    /// Returns the pod this handle addresses.
    #[must_use]
    pub fn server_pod(&self) -> &str {
        &self.server_pod
    }

    // ------------------------------------------------------------------
    // KV store
    // ------------------------------------------------------------------

    /// Writes a key/value pair.
    ///
    /// # Errors
    /// Returns [`ScenarioError::Exec`] when the write is rejected.
    pub async fn kv_put(&self, key: &str, value: &str) -> Result<(), ScenarioError> {
        self.exec(&["consul", "kv", "put", key, value]).await.map(|_| ())
    }

    /// Reads a key, returning its value with surrounding whitespace removed.
    ///
    /// # Errors
    /// Returns [`ScenarioError::Exec`] when the key is absent.
    pub async fn kv_get(&self, key: &str) -> Result<String, ScenarioError> {
        let output = self.exec(&["consul", "kv", "get", key]).await?;
        Ok(output.stdout_trimmed().to_string())
    }

    /// Deletes a key. Deleting an absent key succeeds.
    ///
    /// # Errors
    /// Returns [`ScenarioError::Exec`] when the delete is rejected.
    pub async fn kv_delete(&self, key: &str) -> Result<(), ScenarioError> {
        self.exec(&["consul", "kv", "delete", key]).await.map(|_| ())
    }

    /// Writes a key with an ACL token attached.
    ///
    /// # Errors
    /// Returns [`ScenarioError::Exec`] when the token lacks write access.
    pub async fn kv_put_with_token(
        &self,
        token: &str,
        key: &str,
        value: &str,
    ) -> Result<(), ScenarioError> {
        let flag = format!("-token={token}");
        self.exec(&["consul", "kv", "put", &flag, key, value]).await.map(|_| ())
    }

    /// Writes a key without a token, requiring the cluster to reject it.
    /// Proves that default-deny ACLs are actually enforced.
    ///
    /// # Errors
    /// Returns [`ScenarioError::Exec`] when the anonymous write succeeds.
    pub async fn kv_put_expect_denied(&self, key: &str, value: &str) -> Result<CommandOutput, ScenarioError> {
        Ok(self
            .kubectl
            .exec_pod_expect_failure(
                &self.options,
                &self.server_pod,
                &["consul", "kv", "put", key, value],
            )
            .await?)
    }

    // ------------------------------------------------------------------
    // Snapshots
    // ------------------------------------------------------------------

    /// Saves a raft snapshot to `path` inside the server pod.
    ///
    /// # Errors
    /// Returns [`ScenarioError::Exec`] when the snapshot cannot be taken.
    pub async fn snapshot_save(&self, path: &str) -> Result<(), ScenarioError> {
        self.exec(&["consul", "snapshot", "save", path]).await.map(|_| ())
    }

    /// Restores a raft snapshot from `path` inside the server pod.
    ///
    /// # Errors
    /// Returns [`ScenarioError::Exec`] when the restore is rejected.
    pub async fn snapshot_restore(&self, path: &str) -> Result<(), ScenarioError> {
        self.exec(&["consul", "snapshot", "restore", path]).await.map(|_| ())
    }

    // ------------------------------------------------------------------
    // Federation and raft
    // ------------------------------------------------------------------

    /// Lists WAN-federated members across every datacenter.
    ///
    /// # Errors
    /// Returns [`ScenarioError::Exec`] when the agent is unreachable.
    pub async fn wan_members(&self) -> Result<Vec<MemberEntry>, ScenarioError> {
        let output = self.exec(&["consul", "members", "-wan"]).await?;
        Ok(parse_members(&output.stdout))
    }

    /// Lists LAN members of this datacenter.
    ///
    /// # Errors
    /// Returns [`ScenarioError::Exec`] when the agent is unreachable.
    pub async fn members(&self) -> Result<Vec<MemberEntry>, ScenarioError> {
        let output = self.exec(&["consul", "members"]).await?;
        Ok(parse_members(&output.stdout))
    }

    /// Returns true when every WAN member from `datacenter` reports alive.
    ///
    /// # Errors
    /// Returns [`ScenarioError::Exec`] when membership cannot be read.
    pub async fn datacenter_federated(&self, datacenter: &str) -> Result<bool, ScenarioError> {
        let needle = format!(".{datacenter}");
        let members = self.wan_members().await?;
        let from_dc: Vec<_> =
            members.iter().filter(|member| member.name.ends_with(&needle)).collect();
        Ok(!from_dc.is_empty() && from_dc.iter().all(|member| member.status == "alive"))
    }

    /// Returns the raw `raft list-peers` output. A healthy cluster shows
    /// exactly one `leader` row.
    ///
    /// # Errors
    /// Returns [`ScenarioError::Exec`] when the operator command fails.
    pub async fn raft_peers(&self) -> Result<String, ScenarioError> {
        let output = self.exec(&["consul", "operator", "raft", "list-peers"]).await?;
        Ok(output.stdout)
    }

    /// Returns true once a raft leader is present.
    ///
    /// # Errors
    /// Returns [`ScenarioError::Exec`] when the operator command fails.
    pub async fn has_leader(&self) -> Result<bool, ScenarioError> {
        Ok(self.raft_peers().await?.contains("leader"))
    }

    // ------------------------------------------------------------------
    // Catalog and health
    // ------------------------------------------------------------------

    /// Lists catalog services in a datacenter, one name per line.
    ///
    /// # Errors
    /// Returns [`ScenarioError::Exec`] when the catalog is unreachable.
    pub async fn catalog_services(&self, datacenter: &str) -> Result<Vec<String>, ScenarioError> {
        let flag = format!("-datacenter={datacenter}");
        let output = self.exec(&["consul", "catalog", "services", &flag]).await?;
        Ok(output
            .stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(ToString::to_string)
            .collect())
    }

    /// Queries the local agent HTTP API for instances of a service.
    ///
    /// # Errors
    /// Returns [`ScenarioError::Exec`] on transport failure or
    /// [`ScenarioError::InvalidInput`] when the response is unparsable.
    pub async fn service_instances(
        &self,
        service: &str,
    ) -> Result<Vec<ServiceEntry>, ScenarioError> {
        let url = format!("http://127.0.0.1:8500/v1/health/service/{service}");
        let output = self.exec(&["curl", "-sf", &url]).await?;
        let entries: Vec<HealthEntry> =
            serde_json::from_str(output.stdout_trimmed()).map_err(|err| {
                ScenarioError::InvalidInput(format!(
                    "unparsable health response for `{service}`: {err}"
                ))
            })?;
        Ok(entries.into_iter().map(|entry| entry.service).collect())
    }

    /// Lists agent health checks currently in `state` (`passing`, `warning`,
    /// or `critical`).
    ///
    /// # Errors
    /// Returns [`ScenarioError::Exec`] on transport failure or
    /// [`ScenarioError::InvalidInput`] when the response is unparsable.
    pub async fn health_state(&self, state: &str) -> Result<Vec<AgentCheck>, ScenarioError> {
        let url = format!("http://127.0.0.1:8500/v1/health/state/{state}");
        let output = self.exec(&["curl", "-sf", &url]).await?;
        serde_json::from_str(output.stdout_trimmed()).map_err(|err| {
            ScenarioError::InvalidInput(format!("unparsable health-state response: {err}"))
        })
    }

    /// Queries the agent members API, attaching `token` when given. Under
    /// default-deny ACLs the anonymous variant is rejected by the agent.
    ///
    /// # Errors
    /// Returns [`ScenarioError::Exec`] when the agent rejects the request or
    /// [`ScenarioError::InvalidInput`] when the response is unparsable.
    pub async fn agent_members_http(
        &self,
        token: Option<&str>,
    ) -> Result<Vec<String>, ScenarioError> {
        let header = token.map(|token| format!("X-Consul-Token: {token}"));
        let mut command = vec!["curl", "-sf"];
        if let Some(header) = header.as_deref() {
            command.push("-H");
            command.push(header);
        }
        command.push("http://127.0.0.1:8500/v1/agent/members");
        let output = self.exec(&command).await?;
        let members: Vec<AgentMember> =
            serde_json::from_str(output.stdout_trimmed()).map_err(|err| {
                ScenarioError::InvalidInput(format!("unparsable members response: {err}"))
            })?;
        Ok(members.into_iter().map(|member| member.name).collect())
    }

    /// Registers a service with the local agent through the HTTP API.
    ///
    /// # Errors
    /// Returns [`ScenarioError::Exec`] when registration is rejected.
    pub async fn register_service(&self, name: &str, port: u16) -> Result<(), ScenarioError> {
        let body = format!(r#"{{"Name":"{name}","Port":{port}}}"#);
        self.exec(&[
            "curl",
            "-sf",
            "-X",
            "PUT",
            "-d",
            &body,
            "http://127.0.0.1:8500/v1/agent/service/register",
        ])
        .await
        .map(|_| ())
    }

    /// Deregisters a service instance from the local agent.
    ///
    /// # Errors
    /// Returns [`ScenarioError::Exec`] when deregistration fails.
    pub async fn deregister_service(&self, id: &str) -> Result<(), ScenarioError> {
        let url = format!("http://127.0.0.1:8500/v1/agent/service/deregister/{id}");
        self.exec(&["curl", "-sf", "-X", "PUT", &url]).await.map(|_| ())
    }

    // ------------------------------------------------------------------
    // ACLs
    // ------------------------------------------------------------------

    /// Creates an ACL token from an HCL policy, returning the new secret.
    ///
    /// # Errors
    /// Returns [`ScenarioError::Exec`] when token creation fails, or
    /// [`ScenarioError::InvalidInput`] when no secret appears in the output.
    pub async fn acl_token_create(
        &self,
        bootstrap_token: &str,
        policy_name: &str,
        rules: &str,
    ) -> Result<String, ScenarioError> {
        let token_flag = format!("-token={bootstrap_token}");
        let name_flag = format!("-name={policy_name}");
        let rules_flag = format!("-rules={rules}");
        self.exec(&["consul", "acl", "policy", "create", &token_flag, &name_flag, &rules_flag])
            .await?;
        let policy_flag = format!("-policy-name={policy_name}");
        let output = self
            .exec(&["consul", "acl", "token", "create", &token_flag, &policy_flag])
            .await?;
        extract_secret_id(&output.stdout).ok_or_else(|| {
            ScenarioError::InvalidInput(format!(
                "no SecretID in token output for policy `{policy_name}`"
            ))
        })
    }

    /// Runs a command inside the server pod.
    async fn exec(&self, command: &[&str]) -> Result<CommandOutput, ScenarioError> {
        self.kubectl.exec_pod(&self.options, &self.server_pod, command).await
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// One entry of the agent members API response; only the name matters.
#[derive(Debug, Deserialize)]
struct AgentMember {
    /// Node name, e.g. `consul-server-0.dc1`.
    #[serde(rename = "Name")]
    name: String,
}

/// One entry of the health API response; only the service block matters.
#[derive(Debug, Deserialize)]
struct HealthEntry {
    /// Registered service instance.
    #[serde(rename = "Service")]
    service: ServiceEntry,
}

/// Parses `consul members` table output, skipping the header row.
fn parse_members(stdout: &str) -> Vec<MemberEntry> {
    stdout
        .lines()
        .skip(1)
        .filter_map(|line| {
            let mut columns = line.split_whitespace();
            let name = columns.next()?;
            let _address = columns.next()?;
            let status = columns.next()?;
            Some(MemberEntry {
                name: name.to_string(),
                status: status.to_string(),
            })
        })
        .collect()
}

/// Extracts the `SecretID` field from `consul acl token create` output.
fn extract_secret_id(stdout: &str) -> Option<String> {
    stdout.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        (key.trim() == "SecretID").then(|| value.trim().to_string())
    })
}

// ============================================================================
// SECTION: Tests
// ============================================================================
