//! Raw configuration schema (as parsed from TOML)

use serde::{Deserialize, Serialize};

/// Raw configuration as parsed from TOML
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    /// Reference timezone and exclusions
    #[serde(default)]
    pub schedule: RawSchedule,

    /// Tag key names
    #[serde(default)]
    pub tags: RawTagKeys,

    /// Which resource kinds to reconcile
    #[serde(default)]
    pub resources: RawResources,

    /// AWS provider settings
    #[serde(default)]
    pub aws: RawAwsConfig,
}

/// Schedule settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawSchedule {
    /// IANA timezone name windows are evaluated in (default: Europe/Belgrade)
    pub timezone: Option<String>,

    /// `env` tag values that are never started or stopped (default: ["production"])
    pub excluded_envs: Option<Vec<String>>,
}

/// Names of the tags carrying the policy
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawTagKeys {
    /// Environment tag key (default: "env")
    pub env_key: Option<String>,

    /// Working-hours tag key (default: "time")
    pub time_key: Option<String>,
}

/// Resource kind toggles
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawResources {
    #[serde(default = "default_true")]
    pub compute: bool,

    #[serde(default = "default_true")]
    pub database: bool,
}

impl Default for RawResources {
    fn default() -> Self {
        Self {
            compute: true,
            database: true,
        }
    }
}

/// AWS provider settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawAwsConfig {
    /// Region override; the SDK default chain is used when absent
    pub region: Option<String>,

    /// Named profile from the shared credentials file
    pub profile: Option<String>,
}

fn default_true() -> bool {
    true
}
