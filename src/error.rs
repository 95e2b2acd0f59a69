//! Pipeline error taxonomy.
//!
//! Errors on the mandatory path (characterization, zero handling, the
//! single MLE fit) are fatal and abort the run; bootstrap replicate
//! failures are recovered locally and only surface here once the
//! aggregate failure rate crosses its threshold. Validation findings are
//! never errors: a FAIL verdict is a meaningful outcome, not a crash.
//!
//! Every variant carries the numbers that triggered it so the caller can
//! report the abort without re-deriving anything.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// The dataset violates the documented input contract.
    #[error("invalid dataset: {reason}")]
    InvalidDataset { reason: String },

    /// Fewer observations than free parameters; fitting is not attempted.
    #[error("insufficient data: {n_observations} observations < 4 parameters")]
    InsufficientData { n_observations: usize },

    /// Excluding zero-count rows left fewer observations than parameters.
    #[error(
        "insufficient non-zero data: {n_total} observations minus {n_zero} zero rows \
         leaves fewer than 4"
    )]
    InsufficientNonZeroData { n_total: usize, n_zero: usize },

    /// The optimizer failed to converge from the heuristic start and both
    /// randomized restarts.
    #[error("fit did not converge after {attempts} attempts: {details}")]
    FitConvergence { attempts: usize, details: String },

    /// Too many bootstrap replicates failed to refit.
    #[error(
        "bootstrap failure rate {:.1}% exceeds 10% ({n_failed} of {n_requested} \
         replicates failed)",
        .rate * 100.0
    )]
    BootstrapFailureRate {
        n_failed: usize,
        n_requested: usize,
        /// Failed fraction of the requested replicates, in [0, 1].
        rate: f64,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PipelineError {
    /// Name of the pipeline stage that raised the error.
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::InvalidDataset { .. } => "validate-input",
            PipelineError::InsufficientData { .. } => "characterize",
            PipelineError::InsufficientNonZeroData { .. } => "handle-zeros",
            PipelineError::FitConvergence { .. } => "fit",
            PipelineError::BootstrapFailureRate { .. } => "bootstrap",
            PipelineError::Io(_) | PipelineError::Json(_) => "export",
        }
    }

    /// Recommended remediation for aborts that have one.
    pub fn remediation(&self) -> Option<&'static str> {
        match self {
            PipelineError::InsufficientData { .. } => {
                Some("collect more LET points or reduce to a 3-parameter model")
            }
            PipelineError::InsufficientNonZeroData { .. } => {
                Some("report the device as upper limit only, or test at higher LET")
            }
            PipelineError::FitConvergence { .. } => {
                Some("check for non-monotone cross sections or widen the tested LET range")
            }
            PipelineError::BootstrapFailureRate { .. } => Some(
                "counts are too sparse to resample reliably; report percentile \
                 intervals from a reduced model or as upper limits",
            ),
            _ => None,
        }
    }

    /// Process exit code for the CLI wrapper.
    pub fn exit_code(&self) -> u8 {
        match self {
            PipelineError::InvalidDataset { .. } => 2,
            PipelineError::Io(_) | PipelineError::Json(_) => 2,
            PipelineError::InsufficientData { .. }
            | PipelineError::InsufficientNonZeroData { .. } => 3,
            PipelineError::FitConvergence { .. }
            | PipelineError::BootstrapFailureRate { .. } => 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_and_exit_code_cover_taxonomy() {
        let e = PipelineError::InsufficientData { n_observations: 3 };
        assert_eq!(e.stage(), "characterize");
        assert_eq!(e.exit_code(), 3);
        assert!(e.remediation().is_some());

        let e = PipelineError::BootstrapFailureRate {
            n_failed: 1500,
            n_requested: 10_000,
            rate: 0.15,
        };
        assert_eq!(e.stage(), "bootstrap");
        assert_eq!(e.exit_code(), 4);
        let msg = e.to_string();
        assert!(msg.contains("15.0%"), "msg = {msg}");
        assert!(msg.contains("1500 of 10000"));
    }

    #[test]
    fn display_carries_triggering_values() {
        let e = PipelineError::InsufficientNonZeroData {
            n_total: 6,
            n_zero: 3,
        };
        let msg = e.to_string();
        assert!(msg.contains('6') && msg.contains('3'));
    }
}
