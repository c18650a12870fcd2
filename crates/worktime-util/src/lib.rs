//! Shared utilities for worktime
//!
//! This crate provides:
//! - ID types (InstanceId, ResourceArn, RunId)
//! - Clock abstraction and reference-timezone helpers
//! - Error types
//! - Default paths for the configuration file

mod error;
mod ids;
mod paths;
mod time;

pub use error::*;
pub use ids::*;
pub use paths::*;
pub use time::*;
