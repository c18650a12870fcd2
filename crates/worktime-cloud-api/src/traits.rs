//! Cloud provider traits

use async_trait::async_trait;
use thiserror::Error;
use worktime_util::{InstanceId, ResourceArn, WorktimeError};

use crate::{ComputeInstanceRecord, ControlResponse, DatabaseInstanceRecord, InstanceFilter, TagRecord};

/// Errors from cloud provider operations
#[derive(Debug, Clone, Error)]
pub enum CloudError {
    #[error("Listing failed: {0}")]
    ListFailed(String),

    #[error("Tag lookup failed for {arn}: {message}")]
    TagLookupFailed { arn: String, message: String },

    #[error("Start failed: {0}")]
    StartFailed(String),

    #[error("Stop failed: {0}")]
    StopFailed(String),

    #[error("Instance not found: {0}")]
    InstanceNotFound(InstanceId),

    #[error("Credentials error: {0}")]
    Credentials(String),
}

impl From<CloudError> for WorktimeError {
    fn from(e: CloudError) -> Self {
        WorktimeError::cloud(e.to_string())
    }
}

pub type CloudResult<T> = Result<T, CloudError>;

/// Resource listing and control: implemented by provider-specific adapters
///
/// Each call is a single attempt. Implementations must not retry.
#[async_trait]
pub trait CloudProvider: Send + Sync {
    /// Short provider name for logs
    fn name(&self) -> &str;

    /// List compute instances matching the filter, in provider order
    async fn list_compute_instances(
        &self,
        filter: &InstanceFilter,
    ) -> CloudResult<Vec<ComputeInstanceRecord>>;

    /// List every database instance, in provider order
    async fn list_database_instances(&self) -> CloudResult<Vec<DatabaseInstanceRecord>>;

    /// Fetch the tags attached to a resource
    async fn tags_for_resource(&self, arn: &ResourceArn) -> CloudResult<Vec<TagRecord>>;

    async fn start_compute(&self, id: &InstanceId) -> CloudResult<ControlResponse>;

    async fn stop_compute(&self, id: &InstanceId) -> CloudResult<ControlResponse>;

    async fn start_database(&self, id: &InstanceId) -> CloudResult<ControlResponse>;

    async fn stop_database(&self, id: &InstanceId) -> CloudResult<ControlResponse>;
}
