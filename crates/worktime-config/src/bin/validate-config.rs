//! Checks a worktime configuration file and prints the resolved policy
//!
//! The path comes from the first argument, then `WORKTIME_CONFIG`, then the
//! default location. A missing default file is not an error: worktimed runs
//! with built-in defaults in that case, and those are shown instead.

use std::path::PathBuf;
use std::process::ExitCode;
use worktime_config::{ConfigError, Policy, load_config};
use worktime_util::{WORKTIME_CONFIG_ENV, default_config_path};

fn main() -> ExitCode {
    let requested = std::env::args()
        .nth(1)
        .or_else(|| std::env::var(WORKTIME_CONFIG_ENV).ok());

    let (config_path, explicit) = match requested {
        Some(flag) if flag == "-h" || flag == "--help" => {
            println!("validate-config [config-file]");
            println!("  default: ${} or {}", WORKTIME_CONFIG_ENV, default_config_path().display());
            return ExitCode::SUCCESS;
        }
        Some(path) => (PathBuf::from(path), true),
        None => (default_config_path(), false),
    };

    if !config_path.exists() {
        if explicit {
            eprintln!("{}: no such file", config_path.display());
            return ExitCode::from(1);
        }
        println!("{}: not present, built-in defaults apply", config_path.display());
        println!("{}", Policy::default());
        return ExitCode::SUCCESS;
    }

    match load_config(&config_path) {
        Ok(policy) => {
            println!("{}: ok", config_path.display());
            println!("{}", policy);
            ExitCode::SUCCESS
        }
        Err(ConfigError::ValidationFailed { errors }) => {
            eprintln!("{}: {} problem(s)", config_path.display(), errors.len());
            for err in &errors {
                eprintln!("  - {}", err);
            }
            ExitCode::from(1)
        }
        Err(e) => {
            eprintln!("{}: {}", config_path.display(), e);
            ExitCode::from(1)
        }
    }
}
