//! Per-instance reconciliation

use chrono::DateTime;
use chrono_tz::Tz;
use tracing::{debug, error, info, warn};
use worktime_cloud_api::CloudProvider;
use worktime_config::Policy;
use worktime_util::format_report_time;

use crate::{
    Action, DispatchError, Disposition, InstanceReport, ManagedResource, Outcome, SkipReason,
    TimeWindow, compute_window, decide, resolve_tags,
};

/// Brings one resource at a time into agreement with its working hours
pub struct Reconciler<'a> {
    cloud: &'a dyn CloudProvider,
    policy: &'a Policy,
    dry_run: bool,
}

impl<'a> Reconciler<'a> {
    pub fn new(cloud: &'a dyn CloudProvider, policy: &'a Policy) -> Self {
        Self {
            cloud,
            policy,
            dry_run: false,
        }
    }

    /// Evaluate without dispatching anything
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Reconcile a single resource against the run's reference time.
    ///
    /// Never fails: every problem is folded into the returned report so the
    /// caller can move on to the next instance.
    pub async fn reconcile(&self, resource: &dyn ManagedResource, now: &DateTime<Tz>) -> InstanceReport {
        let mut report = InstanceReport {
            kind: resource.kind(),
            instance_id: resource.id().clone(),
            status: resource.status().to_string(),
            window: None,
            disposition: Disposition::Unchanged,
        };

        let records = match resource.tags(self.cloud).await {
            Ok(records) => records,
            Err(e) => {
                error!(
                    kind = %report.kind,
                    instance_id = %report.instance_id,
                    error = %e,
                    "Tag lookup failed"
                );
                report.disposition = Disposition::Failed {
                    reason: e.to_string(),
                };
                return report;
            }
        };

        let tags = resolve_tags(&records);
        let eligible = match tags.eligibility(self.policy) {
            Ok(eligible) => eligible,
            Err(reason) => {
                info!(
                    kind = %report.kind,
                    instance_id = %report.instance_id,
                    reason = %reason,
                    "Skipping instance"
                );
                report.disposition = Disposition::Skipped(reason);
                return report;
            }
        };

        let window = match compute_window(&eligible.time, now) {
            Ok(window) => window,
            Err(e) => {
                warn!(
                    kind = %report.kind,
                    instance_id = %report.instance_id,
                    time = %eligible.time,
                    error = %e,
                    "Unusable time tag, skipping instance"
                );
                report.disposition = Disposition::Skipped(SkipReason::MalformedTimeTag {
                    value: eligible.time,
                    error: e.to_string(),
                });
                return report;
            }
        };

        if window.is_empty() {
            // Closing at or before opening; windows across midnight aren't supported
            warn!(
                instance_id = %report.instance_id,
                time = %eligible.time,
                "Window closes before it opens; instance will be kept stopped"
            );
        }

        debug!(
            kind = %report.kind,
            instance_id = %report.instance_id,
            env = %eligible.env,
            status = %report.status,
            now = %format_report_time(now),
            open = %format_report_time(&window.open),
            close = %format_report_time(&window.close),
            "Checking instance"
        );

        report.window = Some(window);
        let action = plan(resource, &window, now);

        report.disposition = match action {
            Action::NoOp => Disposition::Unchanged,
            action if self.dry_run => {
                info!(
                    kind = %report.kind,
                    instance_id = %report.instance_id,
                    action = %action,
                    "Dry run, not dispatching"
                );
                Disposition::Planned { action }
            }
            action => Disposition::Dispatched {
                action,
                outcome: self.dispatch(resource, action).await,
            },
        };

        report
    }

    async fn dispatch(&self, resource: &dyn ManagedResource, action: Action) -> Outcome {
        info!(
            kind = %resource.kind(),
            instance_id = %resource.id(),
            action = %action,
            "Dispatching"
        );

        let result = match action {
            Action::Start => resource.start(self.cloud).await,
            Action::Stop => resource.stop(self.cloud).await,
            Action::NoOp => return Outcome::Success,
        };

        let outcome = match result {
            Ok(response) if response.is_success() => Outcome::Success,
            Ok(response) => Outcome::Failure(DispatchError::UnexpectedStatus {
                status_code: response.status_code,
            }),
            Err(e) => Outcome::Failure(DispatchError::Provider {
                message: e.to_string(),
            }),
        };

        match &outcome {
            Outcome::Success => info!(
                instance_id = %resource.id(),
                action = %action,
                "Dispatch succeeded"
            ),
            Outcome::Failure(e) => error!(
                instance_id = %resource.id(),
                action = %action,
                error = %e,
                "Dispatch failed"
            ),
        }

        outcome
    }
}

/// Decide, then gate the action on what the resource can actually do.
///
/// A Start is only issued from a stopped state and a Stop only from a
/// running one; anything else (a database that is `backing-up`, say)
/// becomes a no-op.
pub fn plan(resource: &dyn ManagedResource, window: &TimeWindow, now: &DateTime<Tz>) -> Action {
    match decide(window, now, resource.is_running()) {
        Action::Start if resource.is_stopped() => Action::Start,
        Action::Stop if resource.is_running() => Action::Stop,
        _ => Action::NoOp,
    }
}
