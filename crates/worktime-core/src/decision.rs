//! Start/stop decision table

use chrono::DateTime;
use chrono_tz::Tz;
use serde::Serialize;
use std::fmt;

use crate::TimeWindow;

/// What to do with an instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Start,
    Stop,
    NoOp,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::Stop => write!(f, "stop"),
            Self::NoOp => write!(f, "no-op"),
        }
    }
}

/// Decide the action for an instance.
///
/// | now inside window | running | action |
/// |---|---|---|
/// | yes | no  | Start |
/// | yes | yes | NoOp  |
/// | no  | yes | Stop  |
/// | no  | no  | NoOp  |
///
/// "Inside" is strict: `now` equal to either boundary is outside.
pub fn decide(window: &TimeWindow, now: &DateTime<Tz>, currently_running: bool) -> Action {
    match (window.contains(now), currently_running) {
        (true, false) => Action::Start,
        (false, true) => Action::Stop,
        _ => Action::NoOp,
    }
}
