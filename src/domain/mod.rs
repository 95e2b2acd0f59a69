//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - input observations (`Observation`) and derived statistics
//!   (`CharacterizationReport`)
//! - method-selection enums (`MleVariant`, `BootstrapVariant`, `CiMethod`)
//! - fit outputs (`WeibullParameters`, `FitResult`, `PipelineResult`, etc.)

pub mod types;

pub use types::*;
