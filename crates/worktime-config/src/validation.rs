//! Configuration validation

use crate::schema::{RawConfig, RawTagKeys};
use std::collections::HashSet;
use thiserror::Error;
use worktime_util::parse_timezone;

/// Validation error
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("Invalid timezone '{value}': {message}")]
    InvalidTimezone { value: String, message: String },

    #[error("Tag key '{field}' cannot be empty")]
    EmptyTagKey { field: &'static str },

    #[error("env_key and time_key must differ (both are '{0}')")]
    DuplicateTagKey(String),

    #[error("Excluded environment names cannot be empty")]
    EmptyExcludedEnv,

    #[error("Duplicate excluded environment: {0}")]
    DuplicateExcludedEnv(String),

    #[error("Global config error: {0}")]
    GlobalError(String),
}

/// Validate a raw configuration
pub fn validate_config(config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if let Some(tz) = &config.schedule.timezone
        && let Err(message) = parse_timezone(tz)
    {
        errors.push(ValidationError::InvalidTimezone {
            value: tz.clone(),
            message,
        });
    }

    if let Some(envs) = &config.schedule.excluded_envs {
        let mut seen = HashSet::new();
        for env in envs {
            if env.trim().is_empty() {
                errors.push(ValidationError::EmptyExcludedEnv);
            } else if !seen.insert(env.as_str()) {
                errors.push(ValidationError::DuplicateExcludedEnv(env.clone()));
            }
        }
    }

    errors.extend(validate_tag_keys(&config.tags));

    if let Some(region) = &config.aws.region
        && region.trim().is_empty()
    {
        errors.push(ValidationError::GlobalError(
            "aws.region cannot be empty (omit it to use the SDK default)".into(),
        ));
    }

    errors
}

fn validate_tag_keys(tags: &RawTagKeys) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let env_key = tags.env_key.as_deref().unwrap_or(crate::DEFAULT_ENV_TAG);
    let time_key = tags.time_key.as_deref().unwrap_or(crate::DEFAULT_TIME_TAG);

    if env_key.trim().is_empty() {
        errors.push(ValidationError::EmptyTagKey { field: "env_key" });
    }
    if time_key.trim().is_empty() {
        errors.push(ValidationError::EmptyTagKey { field: "time_key" });
    }
    if !env_key.is_empty() && env_key == time_key {
        errors.push(ValidationError::DuplicateTagKey(env_key.to_string()));
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{RawAwsConfig, RawResources, RawSchedule};

    fn config_with(schedule: RawSchedule, tags: RawTagKeys) -> RawConfig {
        RawConfig {
            config_version: 1,
            schedule,
            tags,
            resources: RawResources::default(),
            aws: RawAwsConfig::default(),
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = config_with(RawSchedule::default(), RawTagKeys::default());
        assert!(validate_config(&config).is_empty());
    }

    #[test]
    fn test_unknown_timezone() {
        let config = config_with(
            RawSchedule {
                timezone: Some("Europe/Atlantis".into()),
                excluded_envs: None,
            },
            RawTagKeys::default(),
        );

        let errors = validate_config(&config);
        assert_eq!(errors.len(), 1);
        assert!(matches!(&errors[0], ValidationError::InvalidTimezone { value, .. } if value == "Europe/Atlantis"));
    }

    #[test]
    fn test_excluded_envs() {
        let config = config_with(
            RawSchedule {
                timezone: None,
                excluded_envs: Some(vec!["production".into(), "".into(), "production".into()]),
            },
            RawTagKeys::default(),
        );

        let errors = validate_config(&config);
        assert!(errors.iter().any(|e| matches!(e, ValidationError::EmptyExcludedEnv)));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::DuplicateExcludedEnv(env) if env == "production")));
    }

    #[test]
    fn test_tag_keys() {
        let config = config_with(
            RawSchedule::default(),
            RawTagKeys {
                env_key: Some("time".into()),
                time_key: None,
            },
        );
        let errors = validate_config(&config);
        assert!(errors.iter().any(|e| matches!(e, ValidationError::DuplicateTagKey(k) if k == "time")));

        let config = config_with(
            RawSchedule::default(),
            RawTagKeys {
                env_key: None,
                time_key: Some(" ".into()),
            },
        );
        let errors = validate_config(&config);
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::EmptyTagKey { field: "time_key" })));
    }
}
