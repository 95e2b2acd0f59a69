//! End-to-end run: raw observations in, fitted curve and verdicts out.
//!
//! The CLI and the integration tests drive the same linear sequence:
//! characterize, split off zero-count rows, select methods, fit,
//! bootstrap, construct intervals, test goodness of fit, validate.
//! Keeping the sequence in one place avoids duplicating the workflow and
//! guarantees that equal inputs and equal seed produce identical output.

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::data::{characterize, partition_zeros};
use crate::domain::{
    FitResult, MleVariant, Observation, PipelineConfig, PipelineResult, RunDiagnostics,
};
use crate::error::PipelineError;
use crate::fit::{
    FitContext, construct_intervals, fit_weibull, observed_information_covariance, run_bootstrap,
    select_methods, standard_options, test_goodness_of_fit,
};
use crate::report::{ValidationInput, validate};

/// Run the pipeline with default settings and the given seed.
pub fn run_validation_pipeline(
    observations: &[Observation],
    seed: u64,
) -> Result<PipelineResult, PipelineError> {
    run_validation_pipeline_with(observations, &PipelineConfig::new(seed))
}

/// Run the pipeline with explicit settings.
pub fn run_validation_pipeline_with(
    observations: &[Observation],
    config: &PipelineConfig,
) -> Result<PipelineResult, PipelineError> {
    // 1) Enforce the input contract before any statistics run.
    validate_dataset(observations)?;
    validate_config(config)?;

    // 2) Characterize the dataset.
    let characterization = characterize(observations)?;

    // 3) Split zero-count rows into reporting-only upper limits.
    let partition = partition_zeros(observations)?;

    // 4) Select every method up front from the characterization.
    let min_count = observations.iter().map(|o| o.count).min().unwrap_or(0);
    let selection = select_methods(&characterization, min_count);

    // 5) Maximum-likelihood fit. Only the zero-aware variant actually
    //    drops rows; the other variants are selected for zero-free data
    //    where the partition is the identity, so the fit always runs on
    //    the counted rows.
    let ctx = FitContext::for_dataset(observations, &partition.fit_observations)?;
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mle = fit_weibull(&partition.fit_observations, &ctx, &standard_options(), &mut rng)?;
    let covariance = match selection.mle_variant {
        MleVariant::Standard => {
            observed_information_covariance(&mle.params, &partition.fit_observations)
        }
        MleVariant::SmallSample | MleVariant::WithZeros => None,
    };

    // 6) Parametric bootstrap at the selected effort level.
    let n_replicates = config
        .replicate_override
        .unwrap_or_else(|| selection.bootstrap_variant.default_replicates());
    let ensemble = run_bootstrap(
        &mle.params,
        &partition.fit_observations,
        &ctx,
        selection.bootstrap_variant,
        n_replicates,
        config.seed,
    )?;

    // 7) Confidence intervals from the ensemble.
    let ci = construct_intervals(&ensemble, &mle.params, selection.ci_method, config.confidence_level);

    // 8) Goodness of fit, only when the decision engine asked for it.
    let gof = if selection.run_goodness_of_fit {
        test_goodness_of_fit(
            &mle.params,
            &partition.fit_observations,
            characterization.degrees_of_freedom,
        )
    } else {
        None
    };

    // 9) Validation verdicts over everything the run produced.
    let validation = validate(&ValidationInput {
        params: &mle.params,
        intervals: &ci.intervals,
        ctx: &ctx,
        ensemble: &ensemble,
        upper_limits: &partition.upper_limits,
        gof: gof.as_ref(),
        ci_fallbacks: &ci.fallbacks,
    });

    // 10) Assemble the run record.
    let diagnostics = RunDiagnostics {
        fit_attempts: mle.attempts,
        bootstrap_replicates: ensemble.n_requested,
        bootstrap_failures: ensemble.n_failed,
        deviance: gof.as_ref().map(|g| g.deviance),
        gof_p_value: gof.as_ref().map(|g| g.p_value),
    };
    Ok(PipelineResult {
        characterization,
        selection,
        fit: FitResult {
            params: mle.params,
            intervals: ci.intervals,
            log_likelihood: mle.log_likelihood,
            covariance,
        },
        upper_limits: partition.upper_limits,
        validation,
        diagnostics,
    })
}

/// Documented data contract: finite positive LET and fluence, no
/// duplicate LET values. Counts carry no constraint beyond their type.
fn validate_dataset(observations: &[Observation]) -> Result<(), PipelineError> {
    for (i, obs) in observations.iter().enumerate() {
        if !obs.let_mev.is_finite() || obs.let_mev <= 0.0 {
            return Err(PipelineError::InvalidDataset {
                reason: format!(
                    "observation {i}: LET must be finite and positive, got {}",
                    obs.let_mev
                ),
            });
        }
        if !obs.fluence.is_finite() || obs.fluence <= 0.0 {
            return Err(PipelineError::InvalidDataset {
                reason: format!(
                    "observation {i}: fluence must be finite and positive, got {}",
                    obs.fluence
                ),
            });
        }
    }

    let mut lets: Vec<f64> = observations.iter().map(|o| o.let_mev).collect();
    lets.sort_by(|a, b| a.total_cmp(b));
    if let Some(pair) = lets.windows(2).find(|w| w[0] == w[1]) {
        return Err(PipelineError::InvalidDataset {
            reason: format!("duplicate LET value {} MeV·cm²/mg", pair[0]),
        });
    }
    Ok(())
}

fn validate_config(config: &PipelineConfig) -> Result<(), PipelineError> {
    if !config.confidence_level.is_finite()
        || config.confidence_level <= 0.0
        || config.confidence_level >= 1.0
    {
        return Err(PipelineError::InvalidDataset {
            reason: format!(
                "confidence level must lie strictly between 0 and 1, got {}",
                config.confidence_level
            ),
        });
    }
    if config.replicate_override == Some(0) {
        return Err(PipelineError::InvalidDataset {
            reason: "replicate override must be positive".to_string(),
        });
    }
    Ok(())
}
