//! Poisson deviance goodness-of-fit test.
//!
//! The deviance compares the fitted model against the saturated one:
//!
//! ```text
//! D = 2 * sum_i [ N_i * ln(N_i / lambda_i) - (N_i - lambda_i) ]
//! ```
//!
//! A zero-count term takes the `N ln N -> 0` limit and contributes
//! `2 * lambda_i`. Under an adequate model `D` is approximately
//! chi-squared with the dataset's residual degrees of freedom, giving a
//! p-value to classify.

use crate::domain::{Observation, VerdictStatus, WeibullParameters};
use crate::math::chi_squared_sf;
use crate::models::expected_count;

/// Classification thresholds on the p-value.
pub const GOF_WARNING_P: f64 = 0.05;
pub const GOF_FAIL_P: f64 = 0.01;

/// Outcome of one deviance test.
#[derive(Debug, Clone, Copy)]
pub struct GofOutcome {
    pub deviance: f64,
    pub p_value: f64,
    pub status: VerdictStatus,
}

/// Deviance of the fit over the given observations.
pub fn deviance(params: &WeibullParameters, observations: &[Observation]) -> f64 {
    let mut d = 0.0;
    for obs in observations {
        let lambda = expected_count(params, obs);
        let n = obs.count as f64;
        if obs.count == 0 {
            d += lambda;
        } else if lambda > 0.0 {
            d += n * (n / lambda).ln() - (n - lambda);
        } else {
            // Counted events where the model allows none: the fit is
            // infinitely far from the saturated model.
            return f64::INFINITY;
        }
    }
    2.0 * d
}

/// Run the deviance test. `None` when `degrees_of_freedom` is zero (no
/// reference distribution exists); the caller reports the test as not
/// applicable.
pub fn test_goodness_of_fit(
    params: &WeibullParameters,
    observations: &[Observation],
    degrees_of_freedom: usize,
) -> Option<GofOutcome> {
    let d = deviance(params, observations);
    let p_value = if d.is_finite() {
        chi_squared_sf(d, degrees_of_freedom)?
    } else {
        0.0
    };

    let status = if p_value >= GOF_WARNING_P {
        VerdictStatus::Pass
    } else if p_value >= GOF_FAIL_P {
        VerdictStatus::Warning
    } else {
        VerdictStatus::Fail
    };

    Some(GofOutcome {
        deviance: d,
        p_value,
        status,
    })
}
