//! Working-hours windows
//!
//! The `time` tag declares opening and closing hours as `HH-HH`, with the
//! grammar `^\d{1,2}-\d{1,2}$` (e.g. `09-18`, `8-20`). A window is anchored
//! to the calendar date of the reference "now" in the reference timezone and
//! recomputed for every instance check.

use chrono::{DateTime, NaiveDate, TimeZone};
use chrono_tz::Tz;
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use worktime_util::format_report_time;

/// Errors from parsing a `time` tag or anchoring it to a date
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WindowError {
    #[error("expected HH-HH, got '{0}'")]
    Malformed(String),

    #[error("hour {hour} out of range 0-23 in '{value}'")]
    HourOutOfRange { value: String, hour: u32 },

    #[error("{hour}:00 does not exist on {date} in {timezone}")]
    NonexistentLocalTime {
        date: NaiveDate,
        hour: u32,
        timezone: String,
    },
}

/// Opening and closing hour parsed from a `time` tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WorkingHours {
    pub open_hour: u32,
    pub close_hour: u32,
}

impl WorkingHours {
    pub fn parse(value: &str) -> Result<Self, WindowError> {
        let trimmed = value.trim();
        let (open, close) = trimmed
            .split_once('-')
            .ok_or_else(|| WindowError::Malformed(value.to_string()))?;

        let open_hour = parse_hour(open, value)?;
        let close_hour = parse_hour(close, value)?;

        Ok(Self {
            open_hour,
            close_hour,
        })
    }
}

impl fmt::Display for WorkingHours {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}", self.open_hour, self.close_hour)
    }
}

fn parse_hour(digits: &str, value: &str) -> Result<u32, WindowError> {
    if digits.is_empty() || digits.len() > 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(WindowError::Malformed(value.to_string()));
    }

    let hour: u32 = digits
        .parse()
        .map_err(|_| WindowError::Malformed(value.to_string()))?;

    if hour > 23 {
        return Err(WindowError::HourOutOfRange {
            value: value.to_string(),
            hour,
        });
    }

    Ok(hour)
}

/// Concrete open/close instants for one day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub open: DateTime<Tz>,
    pub close: DateTime<Tz>,
}

impl TimeWindow {
    /// Anchor working hours to `date` in `tz`.
    ///
    /// An hour skipped by a DST transition is an error; an hour repeated by
    /// one resolves to its earlier occurrence.
    pub fn on_date(hours: WorkingHours, date: NaiveDate, tz: Tz) -> Result<Self, WindowError> {
        Ok(Self {
            open: local_hour(date, hours.open_hour, tz)?,
            close: local_hour(date, hours.close_hour, tz)?,
        })
    }

    /// Strictly inside: both boundaries count as outside
    pub fn contains(&self, now: &DateTime<Tz>) -> bool {
        self.open < *now && *now < self.close
    }

    /// No instant can satisfy `contains`
    pub fn is_empty(&self) -> bool {
        self.close <= self.open
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "opening time: {}; closing time: {}",
            format_report_time(&self.open),
            format_report_time(&self.close)
        )
    }
}

fn local_hour(date: NaiveDate, hour: u32, tz: Tz) -> Result<DateTime<Tz>, WindowError> {
    let naive = date
        .and_hms_opt(hour, 0, 0)
        .ok_or_else(|| WindowError::Malformed(format!("{:02}", hour)))?;

    tz.from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| WindowError::NonexistentLocalTime {
            date,
            hour,
            timezone: tz.name().to_string(),
        })
}

/// Compute the window declared by a `time` tag value for the day of
/// `reference_now`, in `reference_now`'s timezone.
pub fn compute_window(value: &str, reference_now: &DateTime<Tz>) -> Result<TimeWindow, WindowError> {
    let hours = WorkingHours::parse(value)?;
    TimeWindow::on_date(hours, reference_now.date_naive(), reference_now.timezone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use worktime_util::DEFAULT_TIMEZONE;

    fn belgrade(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Tz> {
        DEFAULT_TIMEZONE.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_parse_working_hours() {
        assert_eq!(
            WorkingHours::parse("09-18").unwrap(),
            WorkingHours { open_hour: 9, close_hour: 18 }
        );
        assert_eq!(
            WorkingHours::parse("9-18").unwrap(),
            WorkingHours { open_hour: 9, close_hour: 18 }
        );
        assert_eq!(
            WorkingHours::parse("09-9").unwrap(),
            WorkingHours { open_hour: 9, close_hour: 9 }
        );
        assert_eq!(
            WorkingHours::parse(" 00-23 ").unwrap(),
            WorkingHours { open_hour: 0, close_hour: 23 }
        );
    }

    #[test]
    fn test_parse_rejects_malformed() {
        let malformed = [
            "", "09", "09:18", "09-", "-18", "9am-5pm", "009-18", "09-180", "09-18-20", "+9-18",
            "09 - 18", "٠٩-18",
        ];
        for value in &malformed {
            assert!(
                matches!(WorkingHours::parse(value), Err(WindowError::Malformed(_))),
                "Expected '{}' to be rejected as malformed",
                value
            );
        }
    }

    #[test]
    fn test_parse_rejects_out_of_range() {
        assert_eq!(
            WorkingHours::parse("09-24"),
            Err(WindowError::HourOutOfRange {
                value: "09-24".into(),
                hour: 24
            })
        );
        assert!(matches!(
            WorkingHours::parse("99-18"),
            Err(WindowError::HourOutOfRange { hour: 99, .. })
        ));
    }

    #[test]
    fn test_display_round_trips_padding() {
        assert_eq!(WorkingHours::parse("8-20").unwrap().to_string(), "08-20");
    }

    #[test]
    fn test_compute_window_on_reference_date() {
        let now = belgrade(2024, 3, 1, 12, 34);
        let window = compute_window("09-18", &now).unwrap();

        assert_eq!(window.open, belgrade(2024, 3, 1, 9, 0));
        assert_eq!(window.close, belgrade(2024, 3, 1, 18, 0));
        assert_eq!(window.open.timezone(), DEFAULT_TIMEZONE);
    }

    #[test]
    fn test_window_uses_reference_date_not_utc_date() {
        // 00:30 in Belgrade on March 1 is still Feb 29 in UTC
        let now = belgrade(2024, 3, 1, 0, 30);
        let window = compute_window("09-18", &now).unwrap();
        assert_eq!(window.open, belgrade(2024, 3, 1, 9, 0));
    }

    #[test]
    fn test_contains_is_strict() {
        let window = compute_window("08-20", &belgrade(2024, 3, 1, 10, 0)).unwrap();

        assert!(window.contains(&belgrade(2024, 3, 1, 10, 0)));
        assert!(window.contains(&belgrade(2024, 3, 1, 19, 59)));
        assert!(!window.contains(&belgrade(2024, 3, 1, 8, 0)));
        assert!(!window.contains(&belgrade(2024, 3, 1, 20, 0)));
        assert!(!window.contains(&belgrade(2024, 3, 1, 7, 0)));
        assert!(!window.contains(&belgrade(2024, 3, 1, 22, 0)));
    }

    #[test]
    fn test_midnight_spanning_window_is_empty() {
        let window = compute_window("22-06", &belgrade(2024, 3, 1, 23, 0)).unwrap();
        assert!(window.is_empty());
        assert!(!window.contains(&belgrade(2024, 3, 1, 23, 0)));
        assert!(!window.contains(&belgrade(2024, 3, 1, 3, 0)));
    }

    #[test]
    fn test_dst_gap_is_an_error() {
        // Clocks jump from 02:00 to 03:00 on 2024-03-31 in Belgrade
        let now = belgrade(2024, 3, 31, 12, 0);
        let result = compute_window("02-18", &now);
        assert!(matches!(result, Err(WindowError::NonexistentLocalTime { hour: 2, .. })));
    }

    #[test]
    fn test_dst_fold_uses_earlier_instant() {
        // 02:00 occurs twice on 2024-10-27 in Belgrade; take the CEST one
        let now = belgrade(2024, 10, 27, 12, 0);
        let window = compute_window("02-18", &now).unwrap();
        let open_utc = window.open.with_timezone(&chrono::Utc);
        assert_eq!(open_utc.hour(), 0);
    }

    #[test]
    fn test_window_display() {
        let window = compute_window("09-18", &belgrade(2024, 3, 1, 12, 0)).unwrap();
        assert_eq!(
            window.to_string(),
            "opening time: 01-03-2024T09:00:00; closing time: 01-03-2024T18:00:00"
        );
    }
}
