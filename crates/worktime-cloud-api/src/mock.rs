//! Mock cloud provider for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use worktime_util::{InstanceId, ResourceArn};

use crate::{
    CloudError, CloudProvider, CloudResult, ComputeInstanceRecord, ComputeState, ControlResponse,
    DatabaseInstanceRecord, InstanceFilter, TagRecord,
};

/// A control call observed by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlCall {
    StartCompute(InstanceId),
    StopCompute(InstanceId),
    StartDatabase(InstanceId),
    StopDatabase(InstanceId),
}

/// In-memory cloud provider for unit/integration testing
///
/// Start/stop calls update the stored instance state so that a second run
/// against the same mock sees the effect of the first. Clones share state.
#[derive(Clone)]
pub struct MockCloud {
    compute: Arc<Mutex<Vec<ComputeInstanceRecord>>>,
    databases: Arc<Mutex<Vec<DatabaseInstanceRecord>>>,
    database_tags: Arc<Mutex<HashMap<ResourceArn, Vec<TagRecord>>>>,
    calls: Arc<Mutex<Vec<ControlCall>>>,

    /// Status code returned by control calls
    pub response_status: Arc<Mutex<u16>>,

    /// Configure control calls to fail with a provider error
    pub fail_control: Arc<Mutex<bool>>,

    /// Configure every listing to fail
    pub fail_listing: Arc<Mutex<bool>>,

    /// Configure only the database listing to fail
    pub fail_database_listing: Arc<Mutex<bool>>,

    /// Configure tag lookups to fail
    pub fail_tag_lookup: Arc<Mutex<bool>>,
}

impl MockCloud {
    pub fn new() -> Self {
        Self {
            compute: Arc::new(Mutex::new(Vec::new())),
            databases: Arc::new(Mutex::new(Vec::new())),
            database_tags: Arc::new(Mutex::new(HashMap::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            response_status: Arc::new(Mutex::new(crate::HTTP_OK)),
            fail_control: Arc::new(Mutex::new(false)),
            fail_listing: Arc::new(Mutex::new(false)),
            fail_database_listing: Arc::new(Mutex::new(false)),
            fail_tag_lookup: Arc::new(Mutex::new(false)),
        }
    }

    /// Add a compute instance with the given state and tags
    pub fn with_compute(self, id: &str, state: ComputeState, tags: &[(&str, &str)]) -> Self {
        self.compute.lock().unwrap().push(ComputeInstanceRecord {
            id: InstanceId::new(id),
            state,
            tags: to_records(tags),
        });
        self
    }

    /// Add a database instance with the given status and tags.
    /// The ARN is derived from the identifier.
    pub fn with_database(self, id: &str, status: &str, tags: &[(&str, &str)]) -> Self {
        let arn = ResourceArn::new(format!("arn:aws:rds:mock:000000000000:db:{}", id));
        self.database_tags
            .lock()
            .unwrap()
            .insert(arn.clone(), to_records(tags));
        self.databases.lock().unwrap().push(DatabaseInstanceRecord {
            id: InstanceId::new(id),
            arn,
            status: status.to_string(),
        });
        self
    }

    /// Every control call made so far, in order
    pub fn calls(&self) -> Vec<ControlCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn compute_state(&self, id: &str) -> Option<ComputeState> {
        self.compute
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.id.as_str() == id)
            .map(|i| i.state)
    }

    pub fn database_status(&self, id: &str) -> Option<String> {
        self.databases
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.id.as_str() == id)
            .map(|i| i.status.clone())
    }

    pub fn set_response_status(&self, status: u16) {
        *self.response_status.lock().unwrap() = status;
    }

    /// Record the call and decide its result. State is only changed when
    /// the provider would have accepted the request.
    fn control(&self, call: ControlCall) -> CloudResult<ControlResponse> {
        self.calls.lock().unwrap().push(call.clone());

        if *self.fail_control.lock().unwrap() {
            return Err(match call {
                ControlCall::StartCompute(_) | ControlCall::StartDatabase(_) => {
                    CloudError::StartFailed("Mock start failure".into())
                }
                ControlCall::StopCompute(_) | ControlCall::StopDatabase(_) => {
                    CloudError::StopFailed("Mock stop failure".into())
                }
            });
        }

        let response = ControlResponse::with_status(*self.response_status.lock().unwrap());
        if !response.is_success() {
            return Ok(response);
        }

        match &call {
            ControlCall::StartCompute(id) => self.set_compute_state(id, ComputeState::Pending)?,
            ControlCall::StopCompute(id) => self.set_compute_state(id, ComputeState::Stopping)?,
            ControlCall::StartDatabase(id) => self.set_database_status(id, "starting")?,
            ControlCall::StopDatabase(id) => self.set_database_status(id, "stopping")?,
        }

        Ok(response)
    }

    fn set_compute_state(&self, id: &InstanceId, state: ComputeState) -> CloudResult<()> {
        let mut compute = self.compute.lock().unwrap();
        let instance = compute
            .iter_mut()
            .find(|i| &i.id == id)
            .ok_or_else(|| CloudError::InstanceNotFound(id.clone()))?;
        instance.state = state;
        Ok(())
    }

    fn set_database_status(&self, id: &InstanceId, status: &str) -> CloudResult<()> {
        let mut databases = self.databases.lock().unwrap();
        let instance = databases
            .iter_mut()
            .find(|i| &i.id == id)
            .ok_or_else(|| CloudError::InstanceNotFound(id.clone()))?;
        instance.status = status.to_string();
        Ok(())
    }
}

impl Default for MockCloud {
    fn default() -> Self {
        Self::new()
    }
}

fn to_records(tags: &[(&str, &str)]) -> Vec<TagRecord> {
    tags.iter().map(|(k, v)| TagRecord::new(*k, *v)).collect()
}

#[async_trait]
impl CloudProvider for MockCloud {
    fn name(&self) -> &str {
        "mock"
    }

    async fn list_compute_instances(
        &self,
        filter: &InstanceFilter,
    ) -> CloudResult<Vec<ComputeInstanceRecord>> {
        if *self.fail_listing.lock().unwrap() {
            return Err(CloudError::ListFailed("Mock listing failure".into()));
        }

        Ok(self
            .compute
            .lock()
            .unwrap()
            .iter()
            .filter(|i| filter.matches(&i.tags))
            .cloned()
            .collect())
    }

    async fn list_database_instances(&self) -> CloudResult<Vec<DatabaseInstanceRecord>> {
        if *self.fail_listing.lock().unwrap() || *self.fail_database_listing.lock().unwrap() {
            return Err(CloudError::ListFailed("Mock listing failure".into()));
        }

        Ok(self.databases.lock().unwrap().clone())
    }

    async fn tags_for_resource(&self, arn: &ResourceArn) -> CloudResult<Vec<TagRecord>> {
        if *self.fail_tag_lookup.lock().unwrap() {
            return Err(CloudError::TagLookupFailed {
                arn: arn.to_string(),
                message: "Mock tag lookup failure".into(),
            });
        }

        Ok(self
            .database_tags
            .lock()
            .unwrap()
            .get(arn)
            .cloned()
            .unwrap_or_default())
    }

    async fn start_compute(&self, id: &InstanceId) -> CloudResult<ControlResponse> {
        self.control(ControlCall::StartCompute(id.clone()))
    }

    async fn stop_compute(&self, id: &InstanceId) -> CloudResult<ControlResponse> {
        self.control(ControlCall::StopCompute(id.clone()))
    }

    async fn start_database(&self, id: &InstanceId) -> CloudResult<ControlResponse> {
        self.control(ControlCall::StartDatabase(id.clone()))
    }

    async fn stop_database(&self, id: &InstanceId) -> CloudResult<ControlResponse> {
        self.control(ControlCall::StopDatabase(id.clone()))
    }
}
