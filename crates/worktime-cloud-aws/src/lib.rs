//! AWS provider for worktime
//!
//! Provides:
//! - Credential and region loading through the standard AWS chain
//! - EC2 instance listing with tag filters and pagination
//! - RDS instance listing and per-ARN tag lookup
//! - Start/stop for both

mod adapter;
mod convert;

pub use adapter::*;
pub use convert::*;
