//! Tag resolution and eligibility

use serde::Serialize;
use std::collections::HashMap;
use worktime_cloud_api::TagRecord;
use worktime_config::{Policy, TagKeys};

/// Tag mapping of a single instance
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InstanceTags(HashMap<String, String>);

impl InstanceTags {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check the tags against the policy.
    ///
    /// Returns the policy values when the instance is eligible, otherwise
    /// the reason it should be skipped.
    pub fn eligibility(&self, policy: &Policy) -> Result<EligibleTags, SkipReason> {
        let TagKeys { env: env_key, time: time_key } = &policy.tags;

        let env = self.get(env_key);
        let time = self.get(time_key);

        let (env, time) = match (env, time) {
            (Some(env), Some(time)) => (env, time),
            _ => {
                let missing = [(env_key, env), (time_key, time)]
                    .into_iter()
                    .filter(|(_, v)| v.is_none())
                    .map(|(k, _)| k.clone())
                    .collect();
                return Err(SkipReason::InvalidTags { missing });
            }
        };

        if policy.schedule.is_excluded(env) {
            return Err(SkipReason::ExcludedEnvironment {
                env: env.to_string(),
            });
        }

        Ok(EligibleTags {
            env: env.to_string(),
            time: time.to_string(),
        })
    }
}

impl FromIterator<(String, String)> for InstanceTags {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Policy values of an eligible instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligibleTags {
    pub env: String,
    pub time: String,
}

/// Why an instance was left alone without evaluating its window
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// Empty tag set, or a required tag is absent
    InvalidTags { missing: Vec<String> },
    /// `env` is in the exclusion set
    ExcludedEnvironment { env: String },
    /// `time` does not describe a usable window
    MalformedTimeTag { value: String, error: String },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTags { missing } => {
                write!(f, "Invalid tags (missing: {})", missing.join(", "))
            }
            Self::ExcludedEnvironment { env } => write!(f, "env={}", env),
            Self::MalformedTimeTag { value, error } => {
                write!(f, "Malformed time tag '{}': {}", value, error)
            }
        }
    }
}

/// Build a tag mapping from provider tag records.
///
/// Later records with the same key overwrite earlier ones. Never fails.
pub fn resolve_tags<'a>(records: impl IntoIterator<Item = &'a TagRecord>) -> InstanceTags {
    records
        .into_iter()
        .map(|r| (r.key.clone(), r.value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(pairs: &[(&str, &str)]) -> InstanceTags {
        let records: Vec<TagRecord> = pairs.iter().map(|(k, v)| TagRecord::new(*k, *v)).collect();
        resolve_tags(&records)
    }

    #[test]
    fn test_resolve_tags() {
        let resolved = tags(&[("env", "dev"), ("time", "09-18")]);

        let expected: InstanceTags = [
            ("env".to_string(), "dev".to_string()),
            ("time".to_string(), "09-18".to_string()),
        ]
        .into_iter()
        .collect();
        assert_eq!(resolved, expected);
    }

    #[test]
    fn test_resolve_empty() {
        let resolved = resolve_tags(&[]);
        assert!(resolved.is_empty());
    }

    #[test]
    fn test_resolve_duplicate_key_last_wins() {
        let resolved = tags(&[("env", "dev"), ("env", "qa")]);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved.get("env"), Some("qa"));
    }

    #[test]
    fn test_eligible() {
        let policy = Policy::default();
        let eligible = tags(&[("env", "dev"), ("time", "09-18"), ("Name", "api")])
            .eligibility(&policy)
            .unwrap();
        assert_eq!(eligible.env, "dev");
        assert_eq!(eligible.time, "09-18");
    }

    #[test]
    fn test_missing_time_tag() {
        let policy = Policy::default();
        let result = tags(&[("env", "dev")]).eligibility(&policy);
        assert_eq!(
            result,
            Err(SkipReason::InvalidTags {
                missing: vec!["time".into()]
            })
        );
    }

    #[test]
    fn test_empty_tags() {
        let policy = Policy::default();
        let result = InstanceTags::default().eligibility(&policy);
        assert_eq!(
            result,
            Err(SkipReason::InvalidTags {
                missing: vec!["env".into(), "time".into()]
            })
        );
    }

    #[test]
    fn test_excluded_environment() {
        let policy = Policy::default();
        let result = tags(&[("env", "production"), ("time", "09-18")]).eligibility(&policy);
        assert_eq!(
            result,
            Err(SkipReason::ExcludedEnvironment {
                env: "production".into()
            })
        );
    }

    #[test]
    fn test_excluded_environment_wins_over_bad_time() {
        let policy = Policy::default();
        let result = tags(&[("env", "production"), ("time", "whenever")]).eligibility(&policy);
        assert!(matches!(result, Err(SkipReason::ExcludedEnvironment { .. })));
    }

    #[test]
    fn test_custom_tag_keys() {
        let mut policy = Policy::default();
        policy.tags.time = "office-hours".into();

        let result = tags(&[("env", "dev"), ("time", "09-18")]).eligibility(&policy);
        assert!(matches!(result, Err(SkipReason::InvalidTags { missing }) if missing == vec!["office-hours".to_string()]));

        let eligible = tags(&[("env", "dev"), ("office-hours", "07-15")])
            .eligibility(&policy)
            .unwrap();
        assert_eq!(eligible.time, "07-15");
    }

    #[test]
    fn test_skip_reason_display() {
        let reason = SkipReason::ExcludedEnvironment {
            env: "production".into(),
        };
        assert_eq!(reason.to_string(), "env=production");
    }
}
