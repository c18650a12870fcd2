//! Time utilities for worktime
//!
//! All working-hours windows are evaluated in a single reference timezone,
//! regardless of the host's or the instance's own zone. The current instant
//! is obtained through a [`Clock`] so that it can be read once per run and
//! injected in tests.
//!
//! # Mock Time for Development
//!
//! In debug builds, the `WORKTIME_MOCK_TIME` environment variable can be set
//! to override the system time used by [`SystemClock`]. The value is read as
//! UTC.
//!
//! Format: `YYYY-MM-DD HH:MM:SS` (e.g., `2024-03-01 09:30:00`)
//!
//! Example:
//! ```bash
//! WORKTIME_MOCK_TIME="2024-03-01 21:00:00" worktimed --dry-run
//! ```

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use std::sync::OnceLock;

/// Environment variable name for mock time (debug builds only)
pub const MOCK_TIME_ENV_VAR: &str = "WORKTIME_MOCK_TIME";

/// Expected format of [`MOCK_TIME_ENV_VAR`]
pub const MOCK_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// IANA name of the default reference timezone
pub const DEFAULT_TIMEZONE_NAME: &str = "Europe/Belgrade";

/// Default reference timezone for working-hours windows
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Europe::Belgrade;

/// Cached mock time offset from the real time when the process started.
static MOCK_TIME_OFFSET: OnceLock<Option<chrono::Duration>> = OnceLock::new();

fn get_mock_time_offset() -> Option<chrono::Duration> {
    *MOCK_TIME_OFFSET.get_or_init(|| {
        #[cfg(debug_assertions)]
        {
            if let Ok(mock_time_str) = std::env::var(MOCK_TIME_ENV_VAR) {
                match parse_mock_time(&mock_time_str) {
                    Some(mock_dt) => {
                        let offset = mock_dt.signed_duration_since(Utc::now());
                        tracing::info!(
                            mock_time = %mock_time_str,
                            offset_secs = offset.num_seconds(),
                            "Mock time enabled"
                        );
                        return Some(offset);
                    }
                    None => {
                        tracing::warn!(
                            mock_time = %mock_time_str,
                            expected_format = MOCK_TIME_FORMAT,
                            "Invalid mock time format"
                        );
                    }
                }
            }
            None
        }
        #[cfg(not(debug_assertions))]
        {
            None
        }
    })
}

fn parse_mock_time(s: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, MOCK_TIME_FORMAT)
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Returns whether mock time is currently active.
pub fn is_mock_time_active() -> bool {
    get_mock_time_offset().is_some()
}

/// Source of the current instant.
///
/// A run reads the clock exactly once, so every instance evaluated in that
/// run sees the same reference time.
pub trait Clock: Send + Sync {
    fn now_utc(&self) -> DateTime<Utc>;
}

/// Wall clock, respecting mock time settings in debug builds
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        let real_now = Utc::now();

        if let Some(offset) = get_mock_time_offset() {
            real_now + offset
        } else {
            real_now
        }
    }
}

/// Clock frozen at a single instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self(at)
    }

    /// Build a fixed clock from a wall-clock time in the given zone.
    /// Returns `None` when that local time doesn't exist or is ambiguous.
    pub fn at_local(tz: Tz, year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Option<Self> {
        tz.with_ymd_and_hms(year, month, day, hour, minute, 0)
            .single()
            .map(|dt| Self(dt.with_timezone(&Utc)))
    }
}

impl Clock for FixedClock {
    fn now_utc(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Parse an IANA timezone name (e.g. `Europe/Belgrade`)
pub fn parse_timezone(name: &str) -> Result<Tz, String> {
    name.trim()
        .parse::<Tz>()
        .map_err(|e| format!("Unknown timezone '{}': {}", name, e))
}

/// Convert a UTC instant into the reference timezone
pub fn to_reference(now: DateTime<Utc>, tz: Tz) -> DateTime<Tz> {
    now.with_timezone(&tz)
}

/// Format a datetime the way the report prints it (`01-03-2024T09:00:00`)
pub fn format_report_time<T: TimeZone>(dt: &DateTime<T>) -> String
where
    T::Offset: std::fmt::Display,
{
    dt.format("%d-%m-%YT%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_fixed_clock_is_frozen() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let clock = FixedClock::new(at);
        assert_eq!(clock.now_utc(), at);
        assert_eq!(clock.now_utc(), clock.now_utc());
    }

    #[test]
    fn test_fixed_clock_at_local() {
        // Belgrade is UTC+1 in March (before DST)
        let clock = FixedClock::at_local(DEFAULT_TIMEZONE, 2024, 3, 1, 10, 0).unwrap();
        let utc = clock.now_utc();
        assert_eq!(utc.hour(), 9);

        let local = to_reference(utc, DEFAULT_TIMEZONE);
        assert_eq!(local.hour(), 10);
        assert_eq!(local.day(), 1);
    }

    #[test]
    fn test_fixed_clock_at_local_rejects_dst_gap() {
        // 2024-03-31 02:30 does not exist in Europe/Belgrade
        assert!(FixedClock::at_local(DEFAULT_TIMEZONE, 2024, 3, 31, 2, 30).is_none());
    }

    #[test]
    fn test_reference_conversion_crosses_date() {
        // 23:30 UTC on Feb 29 is already March 1 in Belgrade
        let utc = Utc.with_ymd_and_hms(2024, 2, 29, 23, 30, 0).unwrap();
        let local = to_reference(utc, DEFAULT_TIMEZONE);
        assert_eq!((local.month(), local.day(), local.hour()), (3, 1, 0));
    }

    #[test]
    fn test_parse_timezone() {
        assert_eq!(parse_timezone("Europe/Belgrade").unwrap(), DEFAULT_TIMEZONE);
        assert_eq!(parse_timezone(" UTC ").unwrap(), chrono_tz::UTC);
        assert!(parse_timezone("Mars/Olympus_Mons").is_err());
        assert!(parse_timezone("").is_err());
    }

    #[test]
    fn test_default_timezone_name_matches() {
        assert_eq!(DEFAULT_TIMEZONE.name(), DEFAULT_TIMEZONE_NAME);
    }

    #[test]
    fn test_format_report_time() {
        let dt = DEFAULT_TIMEZONE.with_ymd_and_hms(2024, 3, 1, 9, 5, 7).unwrap();
        assert_eq!(format_report_time(&dt), "01-03-2024T09:05:07");
    }

    #[test]
    fn test_parse_mock_time_format() {
        let parsed = parse_mock_time("2024-03-01 21:00:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 1, 21, 0, 0).unwrap());

        let invalid = [
            "2024-03-01",
            "21:00:00",
            "2024/03/01 21:00:00",
            "2024-03-01T21:00:00",
            "",
            "not a date",
        ];
        for s in &invalid {
            assert!(parse_mock_time(s).is_none(), "Expected '{}' to be rejected", s);
        }
    }

    #[test]
    fn test_system_clock_returns_time() {
        let t = SystemClock.now_utc();
        assert!(t.year() >= 2020);
    }
}
