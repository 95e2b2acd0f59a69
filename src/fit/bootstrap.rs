//! Parametric bootstrap of the fitted Weibull parameters.
//!
//! Each replicate simulates a fresh campaign from the fitted curve:
//! Poisson counts at the observed LET/fluence points, then a refit with
//! the original bounds and starting point. Replicates are mutually
//! independent and run across the rayon pool.
//!
//! Reproducibility: replicate `i` owns `StdRng::seed_from_u64(seed + i)`
//! for both its count draws and any refit restarts, and results are
//! collected in replicate order, so the ensemble is bit-identical for a
//! given seed no matter how the work was scheduled.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Poisson;
use rayon::prelude::*;

use crate::domain::{BootstrapEnsemble, BootstrapVariant, Observation, WeibullParameters};
use crate::error::PipelineError;
use crate::fit::mle::{FIT_TOLERANCE, FitContext, fit_weibull, standard_options};
use crate::math::SimplexOptions;
use crate::models::expected_count;

/// Abort threshold: more than this fraction of replicates failing to
/// refit invalidates the whole ensemble.
pub const MAX_FAILURE_RATE: f64 = 0.10;

/// Simplex controls for replicate refits. The conservative variant
/// tightens the tolerance by 10x for sparse data.
pub fn bootstrap_options(variant: BootstrapVariant) -> SimplexOptions {
    match variant {
        BootstrapVariant::Full => standard_options(),
        BootstrapVariant::Conservative => SimplexOptions {
            tolerance: FIT_TOLERANCE / 10.0,
            ..standard_options()
        },
    }
}

/// Run the bootstrap and collect the refit ensemble.
///
/// `observations` are the rows the original fit used; `ctx` is the
/// original fit context, reused verbatim for every refit. Failed
/// replicates are discarded; once all replicates have run, a failure
/// rate above [`MAX_FAILURE_RATE`] aborts with `BootstrapFailureRate`.
pub fn run_bootstrap(
    fitted: &WeibullParameters,
    observations: &[Observation],
    ctx: &FitContext,
    variant: BootstrapVariant,
    n_replicates: usize,
    base_seed: u64,
) -> Result<BootstrapEnsemble, PipelineError> {
    if n_replicates == 0 {
        return Err(PipelineError::InvalidDataset {
            reason: "bootstrap requires at least one replicate".into(),
        });
    }

    let rates: Vec<f64> = observations
        .iter()
        .map(|o| expected_count(fitted, o))
        .collect();
    let options = bootstrap_options(variant);

    let outcomes: Vec<Option<WeibullParameters>> = (0..n_replicates)
        .into_par_iter()
        .map(|i| {
            let mut rng = StdRng::seed_from_u64(base_seed.wrapping_add(i as u64));
            let synthetic = draw_counts(observations, &rates, &mut rng)?;
            fit_weibull(&synthetic, ctx, &options, &mut rng)
                .ok()
                .map(|fit| fit.params)
        })
        .collect();

    let n_failed = outcomes.iter().filter(|o| o.is_none()).count();
    if let Some(err) = failure_rate_abort(n_failed, n_replicates) {
        return Err(err);
    }

    Ok(BootstrapEnsemble {
        replicates: outcomes.into_iter().flatten().collect(),
        n_failed,
        n_requested: n_replicates,
    })
}

/// Abort decision once every replicate has run. The carried `rate` is
/// the failed fraction of `n_requested`.
fn failure_rate_abort(n_failed: usize, n_requested: usize) -> Option<PipelineError> {
    let rate = n_failed as f64 / n_requested as f64;
    (rate > MAX_FAILURE_RATE).then(|| PipelineError::BootstrapFailureRate {
        n_failed,
        n_requested,
        rate,
    })
}

/// Synthetic counts at the original LET/fluence points. `None` only if a
/// count distribution cannot be built, which discards the replicate.
fn draw_counts(
    observations: &[Observation],
    rates: &[f64],
    rng: &mut StdRng,
) -> Option<Vec<Observation>> {
    let mut synthetic = Vec::with_capacity(observations.len());
    for (obs, &lambda) in observations.iter().zip(rates) {
        // A zero rate draws zero events; Poisson::new rejects it.
        let count = if lambda > 0.0 {
            Poisson::new(lambda).ok()?.sample(rng) as u64
        } else {
            0
        };
        synthetic.push(Observation::new(obs.let_mev, obs.fluence, count));
    }
    Some(synthetic)
}
