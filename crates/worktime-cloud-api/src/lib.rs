//! Cloud provider trait interfaces for worktime
//!
//! This crate defines the interface between the scheduling core and the
//! provider that lists instances and starts/stops them. It contains no
//! provider SDK code itself; see `worktime-cloud-aws` for that.

mod mock;
mod records;
mod traits;

pub use mock::*;
pub use records::*;
pub use traits::*;
