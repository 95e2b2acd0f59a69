//! Mathematical utilities: bounded simplex search and statistics primitives.

pub mod simplex;
pub mod stats;

pub use simplex::*;
pub use stats::*;
