//! Validated policy structures

use crate::schema::{RawAwsConfig, RawConfig, RawTagKeys};
use chrono_tz::Tz;
use std::collections::BTreeSet;
use std::fmt;
use worktime_util::{DEFAULT_TIMEZONE, parse_timezone};

/// Validated policy ready for use by the core engine
#[derive(Debug, Clone, Default)]
pub struct Policy {
    /// Timezone and exclusions
    pub schedule: SchedulePolicy,

    /// Tag key names
    pub tags: TagKeys,

    /// Resource kinds to reconcile
    pub resources: ResourceSelection,

    /// AWS provider settings
    pub aws: AwsSettings,
}

impl Policy {
    /// Convert from raw config (after validation)
    pub fn from_raw(raw: RawConfig) -> Self {
        let timezone = raw
            .schedule
            .timezone
            .as_deref()
            .and_then(|tz| parse_timezone(tz).ok())
            .unwrap_or(DEFAULT_TIMEZONE);

        let excluded_envs = raw
            .schedule
            .excluded_envs
            .map(|envs| envs.into_iter().collect())
            .unwrap_or_else(default_excluded_envs);

        Self {
            schedule: SchedulePolicy {
                timezone,
                excluded_envs,
            },
            tags: TagKeys::from_raw(raw.tags),
            resources: ResourceSelection {
                compute: raw.resources.compute,
                database: raw.resources.database,
            },
            aws: AwsSettings::from_raw(raw.aws),
        }
    }
}

/// Where and to whom working hours apply
#[derive(Debug, Clone)]
pub struct SchedulePolicy {
    /// Reference timezone every window is evaluated in
    pub timezone: Tz,
    /// `env` values that are never started or stopped
    pub excluded_envs: BTreeSet<String>,
}

impl SchedulePolicy {
    pub fn is_excluded(&self, env: &str) -> bool {
        self.excluded_envs.contains(env)
    }
}

impl Default for SchedulePolicy {
    fn default() -> Self {
        Self {
            timezone: DEFAULT_TIMEZONE,
            excluded_envs: default_excluded_envs(),
        }
    }
}

/// Names of the policy tags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagKeys {
    pub env: String,
    pub time: String,
}

impl TagKeys {
    fn from_raw(raw: RawTagKeys) -> Self {
        Self {
            env: raw.env_key.unwrap_or_else(|| crate::DEFAULT_ENV_TAG.to_string()),
            time: raw.time_key.unwrap_or_else(|| crate::DEFAULT_TIME_TAG.to_string()),
        }
    }
}

impl Default for TagKeys {
    fn default() -> Self {
        Self::from_raw(RawTagKeys::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceSelection {
    pub compute: bool,
    pub database: bool,
}

impl Default for ResourceSelection {
    fn default() -> Self {
        Self {
            compute: true,
            database: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AwsSettings {
    pub region: Option<String>,
    pub profile: Option<String>,
}

impl AwsSettings {
    fn from_raw(raw: RawAwsConfig) -> Self {
        Self {
            region: raw.region,
            profile: raw.profile,
        }
    }
}

/// One setting per line, as shown by `validate-config`
impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let excluded: Vec<&str> = self
            .schedule
            .excluded_envs
            .iter()
            .map(String::as_str)
            .collect();
        let on_off = |enabled: bool| if enabled { "on" } else { "off" };

        writeln!(f, "timezone       {}", self.schedule.timezone.name())?;
        writeln!(f, "excluded envs  {}", excluded.join(", "))?;
        writeln!(f, "tag keys       env={} time={}", self.tags.env, self.tags.time)?;
        writeln!(
            f,
            "resources      compute={} database={}",
            on_off(self.resources.compute),
            on_off(self.resources.database)
        )?;
        write!(
            f,
            "aws            region={} profile={}",
            self.aws.region.as_deref().unwrap_or("(sdk default)"),
            self.aws.profile.as_deref().unwrap_or("(sdk default)")
        )
    }
}

fn default_excluded_envs() -> BTreeSet<String> {
    BTreeSet::from(["production".to_string()])
}
