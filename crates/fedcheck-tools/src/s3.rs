// crates/fedcheck-tools/src/s3.rs
// ============================================================================
// Module: Snapshot Store
// Description: S3-compatible object storage for raft snapshot backups.
// Purpose: Verify and manage uploaded snapshot objects.
// Dependencies: aws-config, aws-sdk-s3
// ============================================================================

//! ## Overview
//! Backup verification talks to the bucket directly with the AWS SDK instead
//! of shelling out, so existence checks distinguish "absent" from transport
//! failures. The endpoint override targets S3-compatible stores (MinIO) in
//! local runs; real runs load credentials from the ambient environment.

// ============================================================================
// SECTION: Imports
// ============================================================================

use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::primitives::ByteStream;
use fedcheck_core::ScenarioError;

// ============================================================================
// SECTION: Snapshot Store
// ============================================================================

/// Object-storage handle for one backup bucket.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    /// S3 client.
    client: Client,
    /// Bucket holding snapshot objects.
    bucket: String,
}

impl SnapshotStore {
    /// Creates a store using ambient AWS credentials and configuration.
    pub async fn from_env(bucket: &str, region: &str) -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;
        Self {
            client: Client::new(&config),
            bucket: bucket.to_string(),
        }
    }

    /// Creates a store against an S3-compatible endpoint with static
    /// credentials. Path-style addressing is forced because local stores do
    /// not resolve virtual-hosted bucket names.
    #[must_use]
    pub fn with_endpoint(
        bucket: &str,
        region: &str,
        endpoint: &str,
        access_key: &str,
        secret_key: &str,
    ) -> Self {
        let credentials = Credentials::new(access_key, secret_key, None, None, "static");
        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .endpoint_url(endpoint)
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();
        Self {
            client: Client::from_conf(config),
            bucket: bucket.to_string(),
        }
    }

    /// Returns the bucket this store addresses.
    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Returns true when an object exists under `key`.
    ///
    /// # Errors
    /// Returns [`ScenarioError::Provision`] on transport or access failures;
    /// a missing object is `Ok(false)`, not an error.
    pub async fn object_exists(&self, key: &str) -> Result<bool, ScenarioError> {
        match self.client.head_object().bucket(&self.bucket).key(key).send().await {
            Ok(_) => Ok(true),
            Err(err) => {
                let service = err.into_service_error();
                if service.is_not_found() {
                    Ok(false)
                } else {
                    Err(store_error("head", key, &service.to_string()))
                }
            }
        }
    }

    /// Lists object keys under `prefix`.
    ///
    /// # Errors
    /// Returns [`ScenarioError::Provision`] when the listing fails.
    pub async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, ScenarioError> {
        let response = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(prefix)
            .send()
            .await
            .map_err(|err| store_error("list", prefix, &err.to_string()))?;
        Ok(response
            .contents()
            .iter()
            .filter_map(|object| object.key().map(ToString::to_string))
            .collect())
    }

    /// Uploads an object under `key`.
    ///
    /// # Errors
    /// Returns [`ScenarioError::Provision`] when the upload fails.
    pub async fn put_object(&self, key: &str, body: Vec<u8>) -> Result<(), ScenarioError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .send()
            .await
            .map(|_| ())
            .map_err(|err| store_error("put", key, &err.to_string()))
    }

    /// Downloads the object under `key`.
    ///
    /// # Errors
    /// Returns [`ScenarioError::Provision`] when the object is absent or the
    /// download fails.
    pub async fn fetch_object(&self, key: &str) -> Result<Vec<u8>, ScenarioError> {
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| store_error("get", key, &err.to_string()))?;
        let data = response
            .body
            .collect()
            .await
            .map_err(|err| store_error("read", key, &err.to_string()))?;
        Ok(data.into_bytes().to_vec())
    }

    /// Deletes the object under `key`. Deleting an absent object succeeds.
    ///
    /// # Errors
    /// Returns [`ScenarioError::Teardown`] when the delete fails.
    pub async fn delete_object(&self, key: &str) -> Result<(), ScenarioError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map(|_| ())
            .map_err(|err| ScenarioError::Teardown {
                label: format!("delete snapshot `{key}`"),
                detail: err.to_string(),
            })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Maps one store operation failure to a scenario error.
fn store_error(operation: &str, key: &str, detail: &str) -> ScenarioError {
    ScenarioError::Provision(format!("snapshot store {operation} `{key}` failed: {detail}"))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
