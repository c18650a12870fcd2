//! AWS provider implementation

use async_trait::async_trait;
use aws_config::retry::RetryConfig;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_ec2::error::DisplayErrorContext;
use tracing::{debug, info};
use worktime_cloud_api::{
    CloudError, CloudProvider, CloudResult, ComputeInstanceRecord, ControlResponse,
    DatabaseInstanceRecord, InstanceFilter, TagRecord,
};
use worktime_config::AwsSettings;
use worktime_util::{InstanceId, ResourceArn};

use crate::convert::{compute_record, database_record, ec2_filters, rds_tags};

/// EC2 + RDS provider
pub struct AwsCloud {
    ec2: aws_sdk_ec2::Client,
    rds: aws_sdk_rds::Client,
}

impl AwsCloud {
    /// Load credentials and region through the standard chain
    /// (environment, profile files, instance/container metadata), with the
    /// settings' region and profile taking precedence when present.
    pub async fn from_settings(settings: &AwsSettings) -> CloudResult<Self> {
        let config = load_sdk_config(settings).await;

        if config.credentials_provider().is_none() {
            return Err(CloudError::Credentials(
                "no AWS credentials provider available".into(),
            ));
        }
        let Some(region) = config.region() else {
            return Err(CloudError::Credentials(
                "no AWS region configured; set aws.region or AWS_REGION".into(),
            ));
        };

        info!(region = %region, profile = ?settings.profile, "AWS provider initialized");

        Ok(Self::from_clients(
            aws_sdk_ec2::Client::new(&config),
            aws_sdk_rds::Client::new(&config),
        ))
    }

    pub fn from_clients(ec2: aws_sdk_ec2::Client, rds: aws_sdk_rds::Client) -> Self {
        Self { ec2, rds }
    }
}

/// Shared SDK configuration. Each call is a single attempt: SDK retries
/// are disabled and a failed call is reported for that instance only.
pub async fn load_sdk_config(settings: &AwsSettings) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest())
        .retry_config(RetryConfig::disabled());
    if let Some(region) = &settings.region {
        loader = loader.region(Region::new(region.clone()));
    }
    if let Some(profile) = &settings.profile {
        loader = loader.profile_name(profile);
    }
    loader.load().await
}

/// Render an SDK error with its full source chain
fn describe<E: std::error::Error>(e: E) -> String {
    DisplayErrorContext(e).to_string()
}

#[async_trait]
impl CloudProvider for AwsCloud {
    fn name(&self) -> &str {
        "aws"
    }

    async fn list_compute_instances(
        &self,
        filter: &InstanceFilter,
    ) -> CloudResult<Vec<ComputeInstanceRecord>> {
        let mut records = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let output = self
                .ec2
                .describe_instances()
                .set_filters(Some(ec2_filters(filter)))
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|e| CloudError::ListFailed(describe(e)))?;

            records.extend(
                output
                    .reservations()
                    .iter()
                    .flat_map(|r| r.instances())
                    .filter_map(compute_record),
            );

            match output.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
                _ => break,
            }
        }

        debug!(count = records.len(), "DescribeInstances complete");
        Ok(records)
    }

    async fn list_database_instances(&self) -> CloudResult<Vec<DatabaseInstanceRecord>> {
        let mut records = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let output = self
                .rds
                .describe_db_instances()
                .set_marker(marker.take())
                .send()
                .await
                .map_err(|e| CloudError::ListFailed(describe(e)))?;

            records.extend(output.db_instances().iter().filter_map(database_record));

            match output.marker() {
                Some(m) if !m.is_empty() => marker = Some(m.to_string()),
                _ => break,
            }
        }

        debug!(count = records.len(), "DescribeDBInstances complete");
        Ok(records)
    }

    async fn tags_for_resource(&self, arn: &ResourceArn) -> CloudResult<Vec<TagRecord>> {
        let output = self
            .rds
            .list_tags_for_resource()
            .resource_name(arn.as_str())
            .send()
            .await
            .map_err(|e| CloudError::TagLookupFailed {
                arn: arn.to_string(),
                message: describe(e),
            })?;

        Ok(rds_tags(output.tag_list()))
    }

    async fn start_compute(&self, id: &InstanceId) -> CloudResult<ControlResponse> {
        self.ec2
            .start_instances()
            .instance_ids(id.as_str())
            .send()
            .await
            .map_err(|e| CloudError::StartFailed(describe(e)))?;
        Ok(ControlResponse::ok())
    }

    async fn stop_compute(&self, id: &InstanceId) -> CloudResult<ControlResponse> {
        self.ec2
            .stop_instances()
            .instance_ids(id.as_str())
            .send()
            .await
            .map_err(|e| CloudError::StopFailed(describe(e)))?;
        Ok(ControlResponse::ok())
    }

    async fn start_database(&self, id: &InstanceId) -> CloudResult<ControlResponse> {
        self.rds
            .start_db_instance()
            .db_instance_identifier(id.as_str())
            .send()
            .await
            .map_err(|e| CloudError::StartFailed(describe(e)))?;
        Ok(ControlResponse::ok())
    }

    async fn stop_database(&self, id: &InstanceId) -> CloudResult<ControlResponse> {
        self.rds
            .stop_db_instance()
            .db_instance_identifier(id.as_str())
            .send()
            .await
            .map_err(|e| CloudError::StopFailed(describe(e)))?;
        Ok(ControlResponse::ok())
    }
}
