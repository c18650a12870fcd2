//! Per-instance and per-run outcome reporting

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use worktime_util::{InstanceId, RunId, format_report_time};

use crate::{Action, ResourceKind, SkipReason, TimeWindow};

const KIND_BANNER_PAD: &str = "****************";
const INSTANCE_SEPARATOR: &str =
    "================================================================";

/// Why a dispatched start/stop did not succeed
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "error", rename_all = "snake_case")]
pub enum DispatchError {
    #[error("Response code: {status_code}")]
    UnexpectedStatus { status_code: u16 },

    #[error("{message}")]
    Provider { message: String },
}

/// Result of a dispatched action
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Failure(DispatchError),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// What happened to one instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "disposition", rename_all = "snake_case")]
pub enum Disposition {
    /// Not eligible, or its `time` tag is unusable
    Skipped(SkipReason),
    /// Already where policy wants it, or in a state that can't be acted on
    Unchanged,
    /// Dry run: the action that would have been dispatched
    Planned { action: Action },
    /// Action sent to the provider
    Dispatched { action: Action, outcome: Outcome },
    /// Could not read the instance's tags
    Failed { reason: String },
}

/// Outcome line for one instance
#[derive(Debug, Clone, Serialize)]
pub struct InstanceReport {
    pub kind: ResourceKind,
    pub instance_id: InstanceId,
    pub status: String,
    #[serde(skip)]
    pub window: Option<TimeWindow>,
    pub disposition: Disposition,
}

impl InstanceReport {
    pub fn is_failure(&self) -> bool {
        match &self.disposition {
            Disposition::Failed { .. } => true,
            Disposition::Dispatched { outcome, .. } => !outcome.is_success(),
            _ => false,
        }
    }
}

impl fmt::Display for InstanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = &self.instance_id;
        match &self.disposition {
            Disposition::Skipped(reason) => {
                return write!(f, "Checked instance: {}. {}. Skipping.", id, reason);
            }
            Disposition::Failed { reason } => {
                return write!(f, "Checked instance: {}. {}. Please check!", id, reason);
            }
            _ => {}
        }

        writeln!(f, "Checking instance {}, with state \"{}\"", id, self.status)?;
        if let Some(window) = &self.window {
            writeln!(f, "Instance {}", window)?;
        }

        match &self.disposition {
            Disposition::Unchanged => write!(f, "Nothing to do here."),
            Disposition::Planned { action } => write!(f, "Would {} instance {} (dry run)", action, id),
            Disposition::Dispatched { action, outcome } => {
                let verb = match action {
                    Action::Start => "started",
                    Action::Stop => "stopped",
                    Action::NoOp => "left unchanged",
                };
                match outcome {
                    Outcome::Success => write!(f, "Instance {} {} successfully!", id, verb),
                    Outcome::Failure(e) => {
                        write!(f, "Something went wrong! {}. Please check!", e)
                    }
                }
            }
            Disposition::Skipped(_) | Disposition::Failed { .. } => Ok(()),
        }
    }
}

/// All instances of one kind, in listing order
#[derive(Debug, Clone, Serialize)]
pub struct KindSection {
    pub kind: ResourceKind,
    pub instances: Vec<InstanceReport>,
}

impl KindSection {
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            instances: Vec::new(),
        }
    }
}

/// Counters over a whole run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub started: usize,
    pub stopped: usize,
    pub planned: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunSummary {
    fn record(&mut self, report: &InstanceReport) {
        match &report.disposition {
            Disposition::Skipped(_) => self.skipped += 1,
            Disposition::Unchanged => self.unchanged += 1,
            Disposition::Planned { .. } => self.planned += 1,
            Disposition::Failed { .. } => self.failed += 1,
            Disposition::Dispatched { outcome: Outcome::Failure(_), .. } => self.failed += 1,
            Disposition::Dispatched { action: Action::Start, .. } => self.started += 1,
            Disposition::Dispatched { action: Action::Stop, .. } => self.stopped += 1,
            Disposition::Dispatched { action: Action::NoOp, .. } => self.unchanged += 1,
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "started={} stopped={} planned={} unchanged={} skipped={} failed={}",
            self.started, self.stopped, self.planned, self.unchanged, self.skipped, self.failed
        )
    }
}

/// Everything one invocation did
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: RunId,
    pub now_utc: DateTime<Utc>,
    #[serde(skip)]
    pub now_reference: DateTime<Tz>,
    pub dry_run: bool,
    pub sections: Vec<KindSection>,
    /// Listing error that ended the run early; sections before it are kept
    pub aborted: Option<String>,
}

impl RunReport {
    pub fn summary(&self) -> RunSummary {
        let mut summary = RunSummary::default();
        for report in self.instances() {
            summary.record(report);
        }
        summary
    }

    pub fn instances(&self) -> impl Iterator<Item = &InstanceReport> {
        self.sections.iter().flat_map(|s| s.instances.iter())
    }

    pub fn section(&self, kind: ResourceKind) -> Option<&KindSection> {
        self.sections.iter().find(|s| s.kind == kind)
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "NOW_UTC: {}", format_report_time(&self.now_utc))?;
        writeln!(
            f,
            "NOW_{}: {}",
            self.now_reference.timezone().name(),
            format_report_time(&self.now_reference)
        )?;

        for section in &self.sections {
            writeln!(
                f,
                "{} CHECKING {} INSTANCES {}",
                KIND_BANNER_PAD,
                section.kind.banner(),
                KIND_BANNER_PAD
            )?;
            for instance in &section.instances {
                writeln!(f, "{}", INSTANCE_SEPARATOR)?;
                writeln!(f, "{}", instance)?;
                writeln!(f, "{}", INSTANCE_SEPARATOR)?;
            }
        }

        if let Some(reason) = &self.aborted {
            writeln!(f, "Run aborted: {}", reason)?;
        }

        write!(f, "\nDone! {}", self.summary())
    }
}
