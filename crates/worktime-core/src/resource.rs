//! Resource capability model
//!
//! The reconciler only sees [`ManagedResource`]. Each resource kind brings
//! its own status vocabulary and its own way of reaching tags and the
//! start/stop calls.

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use worktime_cloud_api::{
    CloudProvider, CloudResult, ComputeInstanceRecord, ComputeState, ControlResponse,
    DatabaseInstanceRecord, TagRecord,
};
use worktime_util::InstanceId;

/// Kind of resource being reconciled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Compute,
    Database,
}

impl ResourceKind {
    /// Banner label used in the report
    pub fn banner(&self) -> &'static str {
        match self {
            Self::Compute => "COMPUTE",
            Self::Database => "DATABASE",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compute => write!(f, "compute"),
            Self::Database => write!(f, "database"),
        }
    }
}

/// Capabilities the reconciler needs from a resource
#[async_trait]
pub trait ManagedResource: Send + Sync {
    fn kind(&self) -> ResourceKind;

    fn id(&self) -> &InstanceId;

    /// Provider status text, for reporting
    fn status(&self) -> &str;

    /// Currently serving; a stop candidate outside working hours
    fn is_running(&self) -> bool;

    /// A start candidate inside working hours
    fn is_stopped(&self) -> bool;

    /// Raw tag records for this resource
    async fn tags(&self, cloud: &dyn CloudProvider) -> CloudResult<Vec<TagRecord>>;

    async fn start(&self, cloud: &dyn CloudProvider) -> CloudResult<ControlResponse>;

    async fn stop(&self, cloud: &dyn CloudProvider) -> CloudResult<ControlResponse>;
}

/// Compute instance; tags come embedded in the listing
#[derive(Debug, Clone)]
pub struct ComputeResource {
    record: ComputeInstanceRecord,
}

impl ComputeResource {
    pub fn new(record: ComputeInstanceRecord) -> Self {
        Self { record }
    }
}

#[async_trait]
impl ManagedResource for ComputeResource {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Compute
    }

    fn id(&self) -> &InstanceId {
        &self.record.id
    }

    fn status(&self) -> &str {
        self.record.state.name()
    }

    fn is_running(&self) -> bool {
        self.record.state == ComputeState::Running
    }

    /// Every state other than running is a start candidate, including
    /// transitional ones; the provider rejects starts it can't honour.
    fn is_stopped(&self) -> bool {
        !self.is_running()
    }

    async fn tags(&self, _cloud: &dyn CloudProvider) -> CloudResult<Vec<TagRecord>> {
        Ok(self.record.tags.clone())
    }

    async fn start(&self, cloud: &dyn CloudProvider) -> CloudResult<ControlResponse> {
        cloud.start_compute(&self.record.id).await
    }

    async fn stop(&self, cloud: &dyn CloudProvider) -> CloudResult<ControlResponse> {
        cloud.stop_compute(&self.record.id).await
    }
}

/// Database instance; tags are looked up by ARN
#[derive(Debug, Clone)]
pub struct DatabaseResource {
    record: DatabaseInstanceRecord,
}

impl DatabaseResource {
    pub const AVAILABLE: &'static str = "available";
    pub const STOPPED: &'static str = "stopped";

    pub fn new(record: DatabaseInstanceRecord) -> Self {
        Self { record }
    }
}

#[async_trait]
impl ManagedResource for DatabaseResource {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Database
    }

    fn id(&self) -> &InstanceId {
        &self.record.id
    }

    fn status(&self) -> &str {
        &self.record.status
    }

    fn is_running(&self) -> bool {
        self.record.status.eq_ignore_ascii_case(Self::AVAILABLE)
    }

    fn is_stopped(&self) -> bool {
        self.record.status.eq_ignore_ascii_case(Self::STOPPED)
    }

    async fn tags(&self, cloud: &dyn CloudProvider) -> CloudResult<Vec<TagRecord>> {
        cloud.tags_for_resource(&self.record.arn).await
    }

    async fn start(&self, cloud: &dyn CloudProvider) -> CloudResult<ControlResponse> {
        cloud.start_database(&self.record.id).await
    }

    async fn stop(&self, cloud: &dyn CloudProvider) -> CloudResult<ControlResponse> {
        cloud.stop_database(&self.record.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use worktime_util::ResourceArn;

    fn database(status: &str) -> DatabaseResource {
        DatabaseResource::new(DatabaseInstanceRecord {
            id: InstanceId::new("reports"),
            arn: ResourceArn::new("arn:aws:rds:eu-central-1:000000000000:db:reports"),
            status: status.to_string(),
        })
    }

    fn compute(state: ComputeState) -> ComputeResource {
        ComputeResource::new(ComputeInstanceRecord {
            id: InstanceId::new("i-1"),
            state,
            tags: vec![],
        })
    }

    #[test]
    fn compute_status_vocabulary() {
        let running = compute(ComputeState::Running);
        assert!(running.is_running());
        assert!(!running.is_stopped());
        assert_eq!(running.status(), "running");

        for state in [
            ComputeState::Stopped,
            ComputeState::Stopping,
            ComputeState::Pending,
            ComputeState::Unknown(7),
        ] {
            let r = compute(state);
            assert!(!r.is_running());
            assert!(r.is_stopped());
        }
    }

    #[test]
    fn database_status_is_case_insensitive() {
        assert!(database("Available").is_running());
        assert!(database("STOPPED").is_stopped());
        assert!(!database("available").is_stopped());
    }

    #[test]
    fn database_transitional_status_is_neither() {
        for status in ["starting", "stopping", "backing-up", "modifying", ""] {
            let r = database(status);
            assert!(!r.is_running(), "{} should not be running", status);
            assert!(!r.is_stopped(), "{} should not be stopped", status);
        }
    }

    #[test]
    fn kind_labels() {
        assert_eq!(ResourceKind::Compute.banner(), "COMPUTE");
        assert_eq!(ResourceKind::Database.to_string(), "database");
    }
}
