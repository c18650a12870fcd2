//! Working-hours decision engine for worktime
//!
//! This crate is the heart of worktime, containing:
//! - Tag resolution and eligibility (env/time tags, exclusion set)
//! - Working-hours window computation in the reference timezone
//! - The start/stop/no-op decision table
//! - A reconciler generic over compute and database resources
//! - The runner that walks every instance once per invocation

mod decision;
mod reconciler;
mod report;
mod resource;
mod runner;
mod tags;
mod window;

pub use decision::*;
pub use reconciler::*;
pub use report::*;
pub use resource::*;
pub use runner::*;
pub use tags::*;
pub use window::*;
