//! Dataset characterization: the statistics that drive method selection.
//!
//! Everything the decision engine consults is computed here, once, from
//! the raw counts. Later stages read the resulting snapshot; nothing
//! re-derives these numbers.

use crate::domain::{CharacterizationReport, Observation};
use crate::error::PipelineError;
use crate::math::{mean, sample_variance};

/// Free parameters of the Weibull model.
pub const N_PARAMETERS: usize = 4;

/// Compute the characterization snapshot for a dataset.
///
/// Fails with `InsufficientData` when fewer observations exist than
/// model parameters; no statistic here is meaningful below that point.
pub fn characterize(observations: &[Observation]) -> Result<CharacterizationReport, PipelineError> {
    let n = observations.len();
    if n < N_PARAMETERS {
        return Err(PipelineError::InsufficientData { n_observations: n });
    }

    let counts: Vec<f64> = observations.iter().map(|o| o.count as f64).collect();
    let mean_count = mean(&counts);
    let n_zero = observations.iter().filter(|o| o.count == 0).count();

    // Variance-to-mean ratio; undefined when every count is zero.
    let dispersion_ratio = if mean_count > 0.0 {
        sample_variance(&counts).map(|v| v / mean_count)
    } else {
        None
    };

    // Zeros beyond what a Poisson with this mean would produce.
    let expected_zeros = n as f64 * (-mean_count).exp();
    let excess_zero_fraction = ((n_zero as f64 - expected_zeros) / n as f64).max(0.0);

    Ok(CharacterizationReport {
        n_observations: n,
        dispersion_ratio,
        excess_zero_fraction,
        sample_to_parameter_ratio: n as f64 / N_PARAMETERS as f64,
        mean_count,
        degrees_of_freedom: n.saturating_sub(N_PARAMETERS),
        has_zero_observations: n_zero > 0,
    })
}
