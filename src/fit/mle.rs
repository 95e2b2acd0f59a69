//! Maximum-likelihood fitting of the Weibull cross-section model.
//!
//! Fitting is a bounded 4-dimensional search over
//! `(sigma_sat, let_th, shape, width)`:
//!
//! - bounds and the starting point are derived once per dataset
//!   (`FitContext`) and reused unchanged by every bootstrap refit
//! - the objective is the negative Poisson log-likelihood
//! - non-convergence retries from randomized in-bounds starting points,
//!   with a hard attempt cap and accumulated failure reasons
//!
//! The `Standard` likelihood variant additionally computes a covariance
//! from the observed information (finite-difference Hessian of the
//! negative log-likelihood, inverted); the small-sample and with-zeros
//! variants leave covariance entirely to the bootstrap.

use nalgebra::DMatrix;
use rand::prelude::*;
use rand::rngs::StdRng;

use crate::domain::{Observation, WeibullParameters};
use crate::error::PipelineError;
use crate::math::{SimplexOptions, minimize_bounded};
use crate::models::neg_log_likelihood;

/// Starting points tried before giving up: the heuristic start plus two
/// randomized restarts.
pub const MAX_FIT_ATTEMPTS: usize = 3;

/// Iteration cap per simplex run.
pub const FIT_MAX_ITERATIONS: usize = 2_000;

/// Convergence tolerance for the standard fit; the conservative
/// bootstrap tightens this by 10x.
pub const FIT_TOLERANCE: f64 = 1e-8;

/// Hard box for the shape exponent.
pub const SHAPE_BOUNDS: (f64, f64) = (0.1, 10.0);

/// Per-observation counting allowance behind the saturation coverage
/// floor, in Poisson standard deviations of the observed count.
pub const SATURATION_NOISE_SIGMAS: f64 = 4.0;

/// Simplex controls for a standard fit.
pub fn standard_options() -> SimplexOptions {
    SimplexOptions {
        max_iterations: FIT_MAX_ITERATIONS,
        tolerance: FIT_TOLERANCE,
    }
}

/// Box constraints and start heuristics, derived once per dataset.
///
/// Bootstrap refits reuse this context verbatim so that every replicate
/// searches the same region from the same start.
#[derive(Debug, Clone)]
pub struct FitContext {
    pub lower: [f64; 4],
    pub upper: [f64; 4],
    pub initial: [f64; 4],
    /// Largest observed cross-section among counted rows.
    pub max_observed_xs: f64,
    /// Largest observed cross-section after discounting each counted row
    /// by [`SATURATION_NOISE_SIGMAS`] of its own counting noise. The raw
    /// maximum routinely sits above the MLE saturation on clean data;
    /// this floor is what a fitted `sigma_sat` must still cover.
    pub max_xs_noise_floor: f64,
    /// Smallest LET among counted rows.
    pub min_counted_let: f64,
    /// LET span of the counted rows.
    pub let_range: f64,
}

impl FitContext {
    /// Derive bounds and the heuristic start.
    ///
    /// `all` is the full dataset (used for the threshold-guess step, which
    /// looks at the LET probed just below the first counted row);
    /// `fit_observations` is the counted partition the likelihood runs on.
    pub fn for_dataset(
        all: &[Observation],
        fit_observations: &[Observation],
    ) -> Result<Self, PipelineError> {
        if fit_observations.len() < 4 {
            return Err(PipelineError::InsufficientNonZeroData {
                n_total: all.len(),
                n_zero: all.len().saturating_sub(fit_observations.len()),
            });
        }

        let mut min_let = f64::INFINITY;
        let mut max_let = f64::NEG_INFINITY;
        let mut max_xs = 0.0f64;
        let mut xs_floor = 0.0f64;
        for obs in fit_observations {
            min_let = min_let.min(obs.let_mev);
            max_let = max_let.max(obs.let_mev);
            max_xs = max_xs.max(obs.cross_section());
            let n = obs.count as f64;
            let discounted = (n - SATURATION_NOISE_SIGMAS * n.sqrt()).max(0.0);
            xs_floor = xs_floor.max(discounted / obs.fluence);
        }
        let let_range = max_let - min_let;

        // The threshold bound stops just short of the first counted LET;
        // a threshold at or above it would zero out a counted row.
        let epsilon = 1e-3 * let_range;
        let let_th_upper = (min_let - epsilon).max(0.0);

        let lower = [1e-6 * max_xs, 0.0, SHAPE_BOUNDS.0, 1e-6 * let_range];
        let upper = [10.0 * max_xs, let_th_upper, SHAPE_BOUNDS.1, 10.0 * let_range];

        // Threshold guess: one grid step below the first counted LET,
        // where "step" is the gap to the LET probed just below it (half
        // the first LET when nothing was probed lower).
        let below = all
            .iter()
            .map(|o| o.let_mev)
            .filter(|&l| l < min_let)
            .fold(f64::NEG_INFINITY, f64::max);
        let step = if below.is_finite() {
            min_let - below
        } else {
            min_let / 2.0
        };
        let initial = [
            (1.2 * max_xs).clamp(lower[0], upper[0]),
            (min_let - step).clamp(lower[1], upper[1]),
            2.0,
            (let_range / 2.0).clamp(lower[3], upper[3]),
        ];

        Ok(Self {
            lower,
            upper,
            initial,
            max_observed_xs: max_xs,
            max_xs_noise_floor: xs_floor,
            min_counted_let: min_let,
            let_range,
        })
    }

    /// A uniformly random in-bounds starting point, for restart attempts.
    fn random_start(&self, rng: &mut StdRng) -> [f64; 4] {
        let mut x = [0.0; 4];
        for i in 0..4 {
            x[i] = rng.gen_range(self.lower[i]..=self.upper[i]);
        }
        x
    }
}

/// One converged maximum-likelihood fit.
#[derive(Debug, Clone)]
pub struct MleFit {
    pub params: WeibullParameters,
    pub log_likelihood: f64,
    /// Attempts used (1 means the heuristic start converged).
    pub attempts: usize,
}

/// Fit the Weibull parameters to the counted observations.
///
/// Attempt 1 starts from the heuristic guess; attempts 2 and 3 start
/// from randomized in-bounds points drawn from `rng`. Exhausting the
/// attempt cap yields `FitConvergence` carrying every failure reason.
pub fn fit_weibull(
    observations: &[Observation],
    ctx: &FitContext,
    options: &SimplexOptions,
    rng: &mut StdRng,
) -> Result<MleFit, PipelineError> {
    let objective = |x: &[f64; 4]| {
        let params = WeibullParameters::from_array(*x);
        neg_log_likelihood(&params, observations)
    };

    let mut details: Vec<String> = Vec::new();
    for attempt in 1..=MAX_FIT_ATTEMPTS {
        let start = if attempt == 1 {
            ctx.initial
        } else {
            ctx.random_start(rng)
        };
        let outcome = minimize_bounded(objective, start, ctx.lower, ctx.upper, options);
        if outcome.converged && outcome.value.is_finite() {
            return Ok(MleFit {
                params: WeibullParameters::from_array(outcome.x),
                log_likelihood: -outcome.value,
                attempts: attempt,
            });
        }
        details.push(format!(
            "attempt {attempt}: no convergence after {} iterations (objective {:.6e})",
            outcome.iterations, outcome.value
        ));
    }

    Err(PipelineError::FitConvergence {
        attempts: MAX_FIT_ATTEMPTS,
        details: details.join("; "),
    })
}

/// Covariance from the observed information at the optimum.
///
/// Central finite differences build the Hessian of the negative
/// log-likelihood; its inverse is the asymptotic covariance. `None` when
/// the Hessian is singular or any entry fails to evaluate finitely;
/// callers treat that as "no covariance available", not as an error.
pub fn observed_information_covariance(
    params: &WeibullParameters,
    observations: &[Observation],
) -> Option<[[f64; 4]; 4]> {
    let x0 = params.to_array();
    let f = |x: [f64; 4]| neg_log_likelihood(&WeibullParameters::from_array(x), observations);

    // Relative steps keep the stencil sane across parameter scales
    // (sigma_sat ~ 1e-7, width ~ 1e1).
    let mut h = [0.0; 4];
    for i in 0..4 {
        h[i] = 1e-4 * x0[i].abs().max(1e-8);
    }

    let mut hess = DMatrix::<f64>::zeros(4, 4);
    for i in 0..4 {
        for j in i..4 {
            let mut xpp = x0;
            let mut xpm = x0;
            let mut xmp = x0;
            let mut xmm = x0;
            xpp[i] += h[i];
            xpp[j] += h[j];
            xpm[i] += h[i];
            xpm[j] -= h[j];
            xmp[i] -= h[i];
            xmp[j] += h[j];
            xmm[i] -= h[i];
            xmm[j] -= h[j];
            let v = (f(xpp) - f(xpm) - f(xmp) + f(xmm)) / (4.0 * h[i] * h[j]);
            if !v.is_finite() {
                return None;
            }
            hess[(i, j)] = v;
            hess[(j, i)] = v;
        }
    }

    let cov = hess.try_inverse()?;
    let mut out = [[0.0; 4]; 4];
    for i in 0..4 {
        for j in 0..4 {
            let v = cov[(i, j)];
            if !v.is_finite() {
                return None;
            }
            out[i][j] = v;
        }
    }
    Some(out)
}
