//! Default paths for worktime components
//!
//! Paths are user-writable by default (no root required):
//! - Config: `$XDG_CONFIG_HOME/worktime/config.toml` or `~/.config/worktime/config.toml`

use std::path::PathBuf;

/// Environment variable for overriding the config file path
pub const WORKTIME_CONFIG_ENV: &str = "WORKTIME_CONFIG";

/// Config filename within the config directory
const CONFIG_FILENAME: &str = "config.toml";

/// Application subdirectory name
const APP_DIR: &str = "worktime";

/// Get the default configuration file path.
///
/// Order of precedence:
/// 1. `$XDG_CONFIG_HOME/worktime/config.toml` (if XDG_CONFIG_HOME is set)
/// 2. `~/.config/worktime/config.toml` (fallback)
/// 3. `/etc/worktime/config.toml` (no home directory, e.g. serverless runtimes)
///
/// `WORKTIME_CONFIG` is handled by the CLI layer, not here.
pub fn default_config_path() -> PathBuf {
    if let Ok(config_home) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(config_home).join(APP_DIR).join(CONFIG_FILENAME);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".config")
            .join(APP_DIR)
            .join(CONFIG_FILENAME);
    }

    PathBuf::from("/etc").join(APP_DIR).join(CONFIG_FILENAME)
}
