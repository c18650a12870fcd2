//! Error types for worktime

use thiserror::Error;

/// Core error type for worktime operations
#[derive(Debug, Error)]
pub enum WorktimeError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Cloud provider error: {0}")]
    CloudError(String),
}

impl WorktimeError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn cloud(msg: impl Into<String>) -> Self {
        Self::CloudError(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, WorktimeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_carry_context() {
        let err = WorktimeError::cloud("throttled");
        assert_eq!(err.to_string(), "Cloud provider error: throttled");

        let err = WorktimeError::config("unknown timezone");
        assert_eq!(err.to_string(), "Configuration error: unknown timezone");
    }
}
