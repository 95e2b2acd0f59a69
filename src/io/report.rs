//! Read/write result JSON files.
//!
//! The result file is the "portable" representation of one run:
//! - the full pipeline record (estimates, intervals, verdicts, selection)
//! - the seed, for bit-exact reproduction
//! - a precomputed fitted grid for quick plotting
//!
//! Serialization keeps full float precision, so a written file is also a
//! faithful witness for determinism checks.

use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{Observation, PipelineResult};
use crate::error::PipelineError;
use crate::models::cross_section;

/// Fitted curve sampled on an even LET grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveGrid {
    pub let_mev: Vec<f64>,
    pub cross_section: Vec<f64>,
}

/// Schema of the exported result file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultFile {
    pub tool: String,
    pub seed: u64,
    pub result: PipelineResult,
    pub curve: CurveGrid,
}

/// Write one run to a JSON file.
pub fn write_result_json(
    path: &Path,
    observations: &[Observation],
    result: &PipelineResult,
    seed: u64,
) -> Result<(), PipelineError> {
    let file = File::create(path)?;
    let out = ResultFile {
        tool: "seu".to_string(),
        seed,
        result: result.clone(),
        curve: build_grid(result, observations, 101),
    };
    serde_json::to_writer_pretty(file, &out)?;
    Ok(())
}

/// Read a previously exported result file.
pub fn read_result_json(path: &Path) -> Result<ResultFile, PipelineError> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(file)?)
}

/// Serialize the pipeline record alone. Used by determinism checks:
/// equal inputs and seed must produce byte-equal strings.
pub fn result_json_string(result: &PipelineResult) -> Result<String, PipelineError> {
    Ok(serde_json::to_string_pretty(result)?)
}

fn build_grid(result: &PipelineResult, observations: &[Observation], n: usize) -> CurveGrid {
    let n = n.max(2);
    let mut max_let = observations
        .iter()
        .map(|o| o.let_mev)
        .fold(f64::NEG_INFINITY, f64::max);
    if !max_let.is_finite() || max_let <= 0.0 {
        max_let = result.fit.params.let_th + 5.0 * result.fit.params.width;
    }
    let top = 1.1 * max_let;

    let mut let_mev = Vec::with_capacity(n);
    let mut xs = Vec::with_capacity(n);
    for i in 0..n {
        let u = i as f64 / (n as f64 - 1.0);
        let l = u * top;
        let_mev.push(l);
        xs.push(cross_section(&result.fit.params, l));
    }
    CurveGrid {
        let_mev,
        cross_section: xs,
    }
}
