//! Input/output helpers.
//!
//! - result JSON read/write (`report`)

pub mod report;

pub use report::*;
