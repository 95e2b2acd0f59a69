//! Synthetic SEU dataset generation from a known true curve.
//!
//! Test campaigns are expensive; the CLI and the statistical acceptance
//! tests instead draw event counts from a Weibull curve with known
//! parameters. Counts at each LET grid point are Poisson with mean
//! `sigma(L) * fluence`, so a generated dataset has exactly the noise
//! structure the fitter assumes, which is what makes it usable as
//! ground truth for coverage checks.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Poisson;

use crate::domain::{Observation, WeibullParameters};
use crate::error::PipelineError;
use crate::models::cross_section;

/// Controls for one synthetic campaign.
#[derive(Debug, Clone)]
pub struct SynthConfig {
    pub truth: WeibullParameters,
    /// Inclusive LET grid endpoints (MeV·cm²/mg).
    pub let_min: f64,
    pub let_max: f64,
    /// Evenly spaced grid points, at least 2.
    pub n_points: usize,
    /// Fluence delivered at every grid point (particles/cm²).
    pub fluence: f64,
    pub seed: u64,
}

/// Generate one dataset from the configured truth.
///
/// Deterministic for a fixed config: the grid is exact arithmetic and
/// the counts come from a single seeded stream.
pub fn generate_dataset(config: &SynthConfig) -> Result<Vec<Observation>, PipelineError> {
    if config.n_points < 2 {
        return Err(PipelineError::InvalidDataset {
            reason: format!("synthetic grid needs at least 2 points, got {}", config.n_points),
        });
    }
    if !(config.let_min.is_finite() && config.let_max.is_finite() && config.let_min > 0.0) {
        return Err(PipelineError::InvalidDataset {
            reason: "synthetic LET endpoints must be finite and positive".into(),
        });
    }
    if config.let_max <= config.let_min {
        return Err(PipelineError::InvalidDataset {
            reason: format!(
                "synthetic LET range is empty: [{}, {}]",
                config.let_min, config.let_max
            ),
        });
    }
    if !(config.fluence.is_finite() && config.fluence > 0.0) {
        return Err(PipelineError::InvalidDataset {
            reason: "synthetic fluence must be finite and positive".into(),
        });
    }
    let t = &config.truth;
    if !(t.sigma_sat > 0.0 && t.let_th >= 0.0 && t.shape > 0.0 && t.width > 0.0)
        || !(t.sigma_sat.is_finite() && t.let_th.is_finite() && t.shape.is_finite() && t.width.is_finite())
    {
        return Err(PipelineError::InvalidDataset {
            reason: "synthetic truth parameters must be finite and positive".into(),
        });
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let step = (config.let_max - config.let_min) / (config.n_points - 1) as f64;

    let mut observations = Vec::with_capacity(config.n_points);
    for i in 0..config.n_points {
        let let_mev = config.let_min + i as f64 * step;
        let lambda = cross_section(&config.truth, let_mev) * config.fluence;
        // Zero rate below threshold; Poisson::new rejects lambda == 0.
        let count = if lambda > 0.0 {
            let poisson = Poisson::new(lambda).map_err(|e| PipelineError::InvalidDataset {
                reason: format!("count distribution error at L = {let_mev}: {e}"),
            })?;
            poisson.sample(&mut rng) as u64
        } else {
            0
        };
        observations.push(Observation::new(let_mev, config.fluence, count));
    }

    Ok(observations)
}
