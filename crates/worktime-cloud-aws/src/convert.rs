//! SDK type to record conversions

use aws_sdk_ec2::types::{Filter, Instance, Tag as Ec2Tag};
use aws_sdk_rds::types::{DbInstance, Tag as RdsTag};
use tracing::warn;
use worktime_cloud_api::{
    ComputeInstanceRecord, ComputeState, DatabaseInstanceRecord, InstanceFilter, TagRecord,
};
use worktime_util::{InstanceId, ResourceArn};

/// Translate a listing filter into EC2 `DescribeInstances` filters
pub fn ec2_filters(filter: &InstanceFilter) -> Vec<Filter> {
    match filter {
        InstanceFilter::All => Vec::new(),
        InstanceFilter::HasTag(key) => vec![
            Filter::builder()
                .name(format!("tag:{}", key))
                .values("*")
                .build(),
        ],
    }
}

fn tag_record(key: Option<&str>, value: Option<&str>) -> Option<TagRecord> {
    // A tag without a key is meaningless; a missing value is an empty one
    key.map(|k| TagRecord::new(k, value.unwrap_or_default()))
}

pub fn ec2_tags(tags: &[Ec2Tag]) -> Vec<TagRecord> {
    tags.iter().filter_map(|t| tag_record(t.key(), t.value())).collect()
}

pub fn rds_tags(tags: &[RdsTag]) -> Vec<TagRecord> {
    tags.iter().filter_map(|t| tag_record(t.key(), t.value())).collect()
}

/// Map an EC2 instance; instances without an id are dropped
pub fn compute_record(instance: &Instance) -> Option<ComputeInstanceRecord> {
    let Some(id) = instance.instance_id() else {
        warn!("EC2 instance without an id in listing, ignoring");
        return None;
    };

    let state = match instance.state().and_then(|s| s.code()) {
        Some(code) => ComputeState::from_code(code),
        None => ComputeState::Unknown(-1),
    };

    Some(ComputeInstanceRecord {
        id: InstanceId::new(id),
        state,
        tags: ec2_tags(instance.tags()),
    })
}

/// Map an RDS instance; identifier and ARN are both required
pub fn database_record(db: &DbInstance) -> Option<DatabaseInstanceRecord> {
    match (db.db_instance_identifier(), db.db_instance_arn()) {
        (Some(id), Some(arn)) => Some(DatabaseInstanceRecord {
            id: InstanceId::new(id),
            arn: ResourceArn::new(arn),
            status: db.db_instance_status().unwrap_or_default().to_string(),
        }),
        _ => {
            warn!("RDS instance without identifier or ARN in listing, ignoring");
            None
        }
    }
}
