//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - generates the synthetic test campaign
//! - runs the validation pipeline
//! - prints the run summary and verdicts
//! - writes the optional JSON export

use clap::Parser;

use crate::cli::{Command, FitArgs};
use crate::data::{SynthConfig, generate_dataset};
use crate::domain::{Observation, PipelineConfig, WeibullParameters};
use crate::error::PipelineError;

/// Entry point for the `seu` binary.
pub fn run() -> Result<(), PipelineError> {
    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Fit(args) => handle_fit(args, OutputMode::Full),
        Command::Check(args) => handle_fit(args, OutputMode::VerdictsOnly),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Full,
    VerdictsOnly,
}

fn handle_fit(args: FitArgs, mode: OutputMode) -> Result<(), PipelineError> {
    let observations = dataset_from_args(&args)?;
    let config = pipeline_config_from_args(&args);
    let result = crate::pipeline::run_validation_pipeline_with(&observations, &config)?;

    match mode {
        OutputMode::Full => {
            println!("{}", crate::report::format_run_summary(&result));
        }
        OutputMode::VerdictsOnly => {
            println!("{}", crate::report::format_verdicts(&result));
        }
    }

    if let Some(path) = &args.export {
        crate::io::write_result_json(path, &observations, &result, args.seed)?;
    }

    Ok(())
}

fn dataset_from_args(args: &FitArgs) -> Result<Vec<Observation>, PipelineError> {
    generate_dataset(&SynthConfig {
        truth: WeibullParameters {
            sigma_sat: args.sigma_sat,
            let_th: args.let_th,
            shape: args.shape,
            width: args.width,
        },
        let_min: args.let_min,
        let_max: args.let_max,
        n_points: args.points,
        fluence: args.fluence,
        seed: args.seed,
    })
}

pub fn pipeline_config_from_args(args: &FitArgs) -> PipelineConfig {
    PipelineConfig {
        seed: args.seed,
        confidence_level: args.confidence,
        replicate_override: args.replicates,
    }
}
