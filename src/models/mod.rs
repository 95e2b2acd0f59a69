//! Weibull cross-section model implementation.
//!
//! The model is implemented as small, pure functions so that fitting and
//! bootstrap code can stay generic.

pub mod weibull;

pub use weibull::*;
