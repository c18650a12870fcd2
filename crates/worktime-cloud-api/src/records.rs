//! Provider record types

use serde::{Deserialize, Serialize};
use worktime_util::{InstanceId, ResourceArn};

/// HTTP status code reported by a successful control call
pub const HTTP_OK: u16 = 200;

/// A single key/value tag as the provider returns it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRecord {
    pub key: String,
    pub value: String,
}

impl TagRecord {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Compute instance lifecycle state
///
/// Codes follow the EC2 vocabulary. Only the low byte of a raw code is
/// significant; the high byte is provider-internal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComputeState {
    Pending,
    Running,
    ShuttingDown,
    Terminated,
    Stopping,
    Stopped,
    Unknown(i32),
}

impl ComputeState {
    pub const PENDING_CODE: i32 = 0;
    pub const RUNNING_CODE: i32 = 16;
    pub const SHUTTING_DOWN_CODE: i32 = 32;
    pub const TERMINATED_CODE: i32 = 48;
    pub const STOPPING_CODE: i32 = 64;
    pub const STOPPED_CODE: i32 = 80;

    pub fn from_code(code: i32) -> Self {
        match code & 0xff {
            Self::PENDING_CODE => Self::Pending,
            Self::RUNNING_CODE => Self::Running,
            Self::SHUTTING_DOWN_CODE => Self::ShuttingDown,
            Self::TERMINATED_CODE => Self::Terminated,
            Self::STOPPING_CODE => Self::Stopping,
            Self::STOPPED_CODE => Self::Stopped,
            other => Self::Unknown(other),
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            Self::Pending => Self::PENDING_CODE,
            Self::Running => Self::RUNNING_CODE,
            Self::ShuttingDown => Self::SHUTTING_DOWN_CODE,
            Self::Terminated => Self::TERMINATED_CODE,
            Self::Stopping => Self::STOPPING_CODE,
            Self::Stopped => Self::STOPPED_CODE,
            Self::Unknown(code) => *code,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::ShuttingDown => "shutting-down",
            Self::Terminated => "terminated",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
            Self::Unknown(_) => "unknown",
        }
    }
}

/// A compute instance as listed by the provider, tags included
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputeInstanceRecord {
    pub id: InstanceId,
    pub state: ComputeState,
    pub tags: Vec<TagRecord>,
}

/// A database instance as listed by the provider.
/// Tags are not embedded and must be fetched by ARN.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseInstanceRecord {
    pub id: InstanceId,
    pub arn: ResourceArn,
    /// Free-form lifecycle status (e.g. "available", "stopped", "backing-up")
    pub status: String,
}

/// Listing filter for compute instances
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstanceFilter {
    /// Every instance
    All,
    /// Instances possessing this tag key, with any value
    HasTag(String),
}

impl InstanceFilter {
    pub fn matches(&self, tags: &[TagRecord]) -> bool {
        match self {
            Self::All => true,
            Self::HasTag(key) => tags.iter().any(|t| &t.key == key),
        }
    }
}

/// Result of a start/stop call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlResponse {
    pub status_code: u16,
}

impl ControlResponse {
    pub fn ok() -> Self {
        Self {
            status_code: HTTP_OK,
        }
    }

    pub fn with_status(status_code: u16) -> Self {
        Self { status_code }
    }

    pub fn is_success(&self) -> bool {
        self.status_code == HTTP_OK
    }
}
