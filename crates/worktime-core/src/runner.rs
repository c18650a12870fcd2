//! One invocation: walk every instance of each enabled kind exactly once

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info};
use worktime_cloud_api::{CloudError, CloudProvider, InstanceFilter};
use worktime_config::Policy;
use worktime_util::{Clock, Result, RunId, WorktimeError, format_report_time, to_reference};

use crate::{
    ComputeResource, DatabaseResource, KindSection, Reconciler, ResourceKind, RunReport,
};

/// Who triggered an invocation
#[derive(Debug, Clone, Serialize)]
pub struct InvocationContext {
    pub invocation_id: RunId,
    /// Trigger source, e.g. `cli` or `schedule`
    pub source: String,
}

impl InvocationContext {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            invocation_id: RunId::new(),
            source: source.into(),
        }
    }
}

/// Drives the reconciler over every listed instance
pub struct Runner {
    cloud: Arc<dyn CloudProvider>,
    policy: Policy,
    clock: Arc<dyn Clock>,
    dry_run: bool,
}

impl Runner {
    pub fn new(cloud: Arc<dyn CloudProvider>, policy: Policy, clock: Arc<dyn Clock>) -> Self {
        Self {
            cloud,
            policy,
            clock,
            dry_run: false,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Run once with a fresh run id.
    ///
    /// A listing failure is returned as an error; use [`Runner::evaluate`]
    /// to keep the sections reconciled before it.
    pub async fn run(&self) -> Result<RunReport> {
        into_result(self.evaluate(RunId::new()).await)
    }

    /// Reconcile every enabled kind in order.
    ///
    /// Never fails outright: a listing error stops the walk and is recorded
    /// in `aborted`, while sections already reconciled stay in the report.
    pub async fn evaluate(&self, run_id: RunId) -> RunReport {
        let now_utc = self.clock.now_utc();
        let now = to_reference(now_utc, self.policy.schedule.timezone);

        info!(
            run_id = %run_id,
            provider = self.cloud.name(),
            now_utc = %format_report_time(&now_utc),
            now_reference = %format_report_time(&now),
            timezone = %self.policy.schedule.timezone,
            dry_run = self.dry_run,
            "Starting run"
        );

        let reconciler = Reconciler::new(self.cloud.as_ref(), &self.policy).dry_run(self.dry_run);
        let mut report = RunReport {
            run_id,
            now_utc,
            now_reference: now,
            dry_run: self.dry_run,
            sections: Vec::new(),
            aborted: None,
        };

        if self.policy.resources.compute {
            let filter = InstanceFilter::HasTag(self.policy.tags.time.clone());
            let records = match self.cloud.list_compute_instances(&filter).await {
                Ok(records) => records,
                Err(e) => return abort(report, ResourceKind::Compute, e),
            };
            debug!(count = records.len(), "Listed compute instances");

            let mut section = KindSection::new(ResourceKind::Compute);
            for record in records {
                let resource = ComputeResource::new(record);
                section.instances.push(reconciler.reconcile(&resource, &now).await);
            }
            report.sections.push(section);
        }

        if self.policy.resources.database {
            let records = match self.cloud.list_database_instances().await {
                Ok(records) => records,
                Err(e) => return abort(report, ResourceKind::Database, e),
            };
            debug!(count = records.len(), "Listed database instances");

            let mut section = KindSection::new(ResourceKind::Database);
            for record in records {
                let resource = DatabaseResource::new(record);
                section.instances.push(reconciler.reconcile(&resource, &now).await);
            }
            report.sections.push(section);
        }

        report
    }

    /// Entry point for one triggered invocation.
    ///
    /// The event payload is opaque; it is logged and otherwise ignored.
    /// The report is printed even when the run is aborted.
    pub async fn handle_invocation(
        &self,
        event: &serde_json::Value,
        ctx: &InvocationContext,
    ) -> Result<RunReport> {
        info!(
            invocation_id = %ctx.invocation_id,
            source = %ctx.source,
            event = %event,
            "Handling invocation"
        );

        let report = self.evaluate(ctx.invocation_id.clone()).await;
        println!("{}", report);

        let summary = report.summary();
        info!(
            invocation_id = %ctx.invocation_id,
            started = summary.started,
            stopped = summary.stopped,
            planned = summary.planned,
            unchanged = summary.unchanged,
            skipped = summary.skipped,
            failed = summary.failed,
            aborted = report.aborted.is_some(),
            "Invocation complete"
        );

        into_result(report)
    }
}

fn abort(mut report: RunReport, kind: ResourceKind, e: CloudError) -> RunReport {
    error!(kind = %kind, error = %e, "Listing failed, aborting run");
    report.aborted = Some(e.to_string());
    report
}

fn into_result(report: RunReport) -> Result<RunReport> {
    match &report.aborted {
        Some(reason) => Err(WorktimeError::cloud(reason.clone())),
        None => Ok(report),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Action, Disposition, Outcome, SkipReason};
    use worktime_cloud_api::{ComputeState, ControlCall, MockCloud};
    use worktime_util::{DEFAULT_TIMEZONE, FixedClock, InstanceId};

    fn clock_at(hour: u32) -> Arc<dyn Clock> {
        Arc::new(FixedClock::at_local(DEFAULT_TIMEZONE, 2024, 3, 1, hour, 0).unwrap())
    }

    fn runner(cloud: &MockCloud, hour: u32) -> Runner {
        Runner::new(Arc::new(cloud.clone()), Policy::default(), clock_at(hour))
    }

    #[tokio::test]
    async fn test_run_covers_both_kinds_in_order() {
        let cloud = MockCloud::new()
            .with_compute("i-1", ComputeState::Stopped, &[("env", "staging"), ("time", "08-20")])
            .with_compute("i-2", ComputeState::Running, &[("env", "dev"), ("time", "08-20")])
            .with_database("reports", "available", &[("env", "qa"), ("time", "08-20")]);

        let report = runner(&cloud, 10).run().await.unwrap();

        let ids: Vec<_> = report.instances().map(|r| r.instance_id.as_str()).collect();
        assert_eq!(ids, vec!["i-1", "i-2", "reports"]);
        assert_eq!(cloud.calls(), vec![ControlCall::StartCompute(InstanceId::new("i-1"))]);

        let summary = report.summary();
        assert_eq!(summary.started, 1);
        assert_eq!(summary.unchanged, 2);
    }

    #[tokio::test]
    async fn test_compute_listing_only_returns_time_tagged() {
        let cloud = MockCloud::new()
            .with_compute("i-1", ComputeState::Running, &[("env", "dev")])
            .with_compute("i-2", ComputeState::Running, &[("env", "dev"), ("time", "08-20")]);

        let report = runner(&cloud, 22).run().await.unwrap();

        let compute = report.section(ResourceKind::Compute).unwrap();
        assert_eq!(compute.instances.len(), 1);
        assert_eq!(compute.instances[0].instance_id.as_str(), "i-2");
    }

    #[tokio::test]
    async fn test_database_without_tags_is_skipped() {
        let cloud = MockCloud::new().with_database("reports", "available", &[]);

        let report = runner(&cloud, 22).run().await.unwrap();

        let db = report.section(ResourceKind::Database).unwrap();
        assert!(matches!(
            &db.instances[0].disposition,
            Disposition::Skipped(SkipReason::InvalidTags { missing }) if missing.len() == 2
        ));
        assert!(cloud.calls().is_empty());
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_the_run() {
        let cloud = MockCloud::new()
            .with_compute("i-1", ComputeState::Running, &[("env", "dev"), ("time", "08-20")])
            .with_compute("i-2", ComputeState::Running, &[("env", "dev"), ("time", "08-20")]);
        cloud.set_response_status(503);

        let report = runner(&cloud, 22).run().await.unwrap();

        assert_eq!(cloud.calls().len(), 2);
        assert_eq!(report.summary().failed, 2);
    }

    #[tokio::test]
    async fn test_listing_failure_aborts() {
        let cloud = MockCloud::new();
        *cloud.fail_listing.lock().unwrap() = true;

        assert!(runner(&cloud, 10).run().await.is_err());
    }

    #[tokio::test]
    async fn test_disabled_kinds_are_not_listed() {
        let cloud = MockCloud::new()
            .with_database("reports", "available", &[("env", "qa"), ("time", "08-20")]);
        let mut policy = Policy::default();
        policy.resources.database = false;

        let report = Runner::new(Arc::new(cloud.clone()), policy, clock_at(22))
            .run()
            .await
            .unwrap();

        assert!(report.section(ResourceKind::Database).is_none());
        assert!(cloud.calls().is_empty());
    }

    #[tokio::test]
    async fn test_dry_run_plans_without_calls() {
        let cloud = MockCloud::new()
            .with_compute("i-1", ComputeState::Running, &[("env", "dev"), ("time", "08-20")]);

        let report = runner(&cloud, 22).with_dry_run(true).run().await.unwrap();

        assert!(report.dry_run);
        assert_eq!(
            report.instances().next().unwrap().disposition,
            Disposition::Planned { action: Action::Stop }
        );
        assert!(cloud.calls().is_empty());
    }

    #[tokio::test]
    async fn test_handle_invocation_reuses_invocation_id() {
        let cloud = MockCloud::new()
            .with_database("reports", "stopped", &[("env", "qa"), ("time", "08-20")]);
        let ctx = InvocationContext::new("test");

        let report = runner(&cloud, 9)
            .handle_invocation(&serde_json::json!({"source": "aws.events"}), &ctx)
            .await
            .unwrap();

        assert_eq!(report.run_id, ctx.invocation_id);
        assert_eq!(
            report.instances().next().unwrap().disposition,
            Disposition::Dispatched {
                action: Action::Start,
                outcome: Outcome::Success
            }
        );
    }

    #[tokio::test]
    async fn test_database_listing_failure_keeps_compute_outcomes() {
        let cloud = MockCloud::new()
            .with_compute("i-1", ComputeState::Stopped, &[("env", "dev"), ("time", "08-20")])
            .with_database("reports", "available", &[("env", "qa"), ("time", "08-20")]);
        *cloud.fail_database_listing.lock().unwrap() = true;
        let runner = runner(&cloud, 10);

        let report = runner.evaluate(RunId::new()).await;

        assert_eq!(cloud.calls(), vec![ControlCall::StartCompute(InstanceId::new("i-1"))]);
        assert!(report.aborted.as_deref().unwrap().contains("Mock listing failure"));
        assert!(report.section(ResourceKind::Database).is_none());
        assert_eq!(report.summary().started, 1);
        assert!(report.to_string().contains("Instance i-1 started successfully!"));

        // The invocation still reports the error after printing
        let ctx = InvocationContext::new("test");
        let result = runner.handle_invocation(&serde_json::Value::Null, &ctx).await;
        assert!(matches!(result, Err(WorktimeError::CloudError(msg)) if msg.contains("Mock listing failure")));
    }
}
