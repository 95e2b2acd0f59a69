//! Command-line parsing for the SEU cross-section fitter.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the modeling/math code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "seu", version, about = "Weibull SEU cross-section fitter and validator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit a synthetic test campaign and print the full run summary.
    Fit(FitArgs),
    /// Print validation verdicts only (useful for scripting).
    Check(FitArgs),
}

/// Common options for fitting and checking.
#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// True saturation cross-section for the synthetic campaign (cm²/device).
    #[arg(long, default_value_t = 4.0e-6)]
    pub sigma_sat: f64,

    /// True LET threshold (MeV·cm²/mg).
    #[arg(long, default_value_t = 2.0)]
    pub let_th: f64,

    /// True Weibull shape exponent.
    #[arg(long, default_value_t = 1.8)]
    pub shape: f64,

    /// True Weibull width (MeV·cm²/mg).
    #[arg(long, default_value_t = 15.0)]
    pub width: f64,

    /// Lowest LET in the test grid (MeV·cm²/mg).
    #[arg(long, default_value_t = 3.0)]
    pub let_min: f64,

    /// Highest LET in the test grid (MeV·cm²/mg).
    #[arg(long, default_value_t = 60.0)]
    pub let_max: f64,

    /// Number of evenly spaced LET grid points.
    #[arg(short = 'n', long, default_value_t = 30)]
    pub points: usize,

    /// Fluence delivered at every grid point (particles/cm²).
    #[arg(long, default_value_t = 1.0e8)]
    pub fluence: f64,

    /// Random seed for dataset generation and the bootstrap.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Override the selected bootstrap replicate count.
    #[arg(long)]
    pub replicates: Option<usize>,

    /// Two-sided confidence level for all parameter intervals.
    #[arg(long, default_value_t = 0.95)]
    pub confidence: f64,

    /// Export the full result (inputs, fit, verdicts, curve) to JSON.
    #[arg(long)]
    pub export: Option<PathBuf>,
}
