//! Zero-count handling: partition the dataset and derive upper limits.
//!
//! A zero-count observation still carries information — the cross-section
//! at that LET is bounded above — but a Poisson likelihood cannot use it
//! directly without biasing the threshold estimate. The split here sends
//! counted rows to the fitter and converts each zero row into a one-sided
//! 95% upper limit that the validator checks the fitted curve against.

use crate::data::characterize::N_PARAMETERS;
use crate::domain::{Observation, ZeroUpperLimit};
use crate::error::PipelineError;

/// 95% Poisson upper bound on the mean given zero observed events,
/// divided by fluence to yield a cross-section limit.
pub const ZERO_EVENT_UPPER_FACTOR: f64 = 3.7;

/// Outcome of the zero-count split. Row order is preserved in both
/// partitions.
#[derive(Debug, Clone)]
pub struct ZeroPartition {
    pub fit_observations: Vec<Observation>,
    pub upper_limits: Vec<ZeroUpperLimit>,
}

impl ZeroPartition {
    pub fn n_zero(&self) -> usize {
        self.upper_limits.len()
    }
}

/// Split a dataset into fit rows and zero-count upper limits.
///
/// Fails with `InsufficientNonZeroData` when fewer counted rows remain
/// than the model has parameters; such a device is reportable only as a
/// set of upper limits, not as a fitted curve.
pub fn partition_zeros(observations: &[Observation]) -> Result<ZeroPartition, PipelineError> {
    let mut fit_observations = Vec::with_capacity(observations.len());
    let mut upper_limits = Vec::new();

    for obs in observations {
        if obs.count == 0 {
            upper_limits.push(ZeroUpperLimit {
                let_mev: obs.let_mev,
                fluence: obs.fluence,
                upper_limit: ZERO_EVENT_UPPER_FACTOR / obs.fluence,
            });
        } else {
            fit_observations.push(*obs);
        }
    }

    if fit_observations.len() < N_PARAMETERS {
        return Err(PipelineError::InsufficientNonZeroData {
            n_total: observations.len(),
            n_zero: upper_limits.len(),
        });
    }

    Ok(ZeroPartition {
        fit_observations,
        upper_limits,
    })
}
