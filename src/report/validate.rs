//! Physical-plausibility validation of a fitted curve.
//!
//! Every rule emits a verdict; findings are data, not errors. A FAIL
//! here is a meaningful engineering outcome (the fit is untrustworthy),
//! not a software failure. The verdict list is ordered and the aggregate
//! is the worst individual status.

use crate::domain::{
    BootstrapEnsemble, ParameterIntervals, ValidationReport, ValidationVerdict, VerdictStatus,
    WeibullParameters, ZeroUpperLimit,
};
use crate::fit::gof::GofOutcome;
use crate::fit::mle::FitContext;
use crate::math::correlation;
use crate::models::cross_section;

/// A parameter closer to an optimizer bound than this fraction of the
/// bound range is treated as pinned.
pub const BOUND_PROXIMITY_FRACTION: f64 = 0.01;

/// Shape exponents seen in practice; WARNING outside the first window,
/// FAIL outside the second.
pub const SHAPE_TYPICAL: (f64, f64) = (0.5, 4.0);
pub const SHAPE_EXTREME: (f64, f64) = (0.2, 8.0);

/// Width windows, as fractions of the observed LET range.
pub const WIDTH_TYPICAL_FRACTION: (f64, f64) = (0.05, 2.0);
pub const WIDTH_EXTREME_FRACTION: (f64, f64) = (0.01, 5.0);

/// Shape/width sampling correlation at which the two parameters are
/// considered non-identifiable.
pub const CORRELATION_FAIL: f64 = 0.9;

/// Relative CI half-width classification thresholds.
pub const CI_WIDTH_WARNING: f64 = 0.5;
pub const CI_WIDTH_FAIL: f64 = 1.0;

/// Everything the validator consults. All references are read-only
/// snapshots produced by earlier stages.
pub struct ValidationInput<'a> {
    pub params: &'a WeibullParameters,
    pub intervals: &'a ParameterIntervals,
    pub ctx: &'a FitContext,
    pub ensemble: &'a BootstrapEnsemble,
    pub upper_limits: &'a [ZeroUpperLimit],
    pub gof: Option<&'a GofOutcome>,
    /// Parameters whose BCA interval fell back to percentile.
    pub ci_fallbacks: &'a [&'static str],
}

/// Run every rule and aggregate.
pub fn validate(input: &ValidationInput) -> ValidationReport {
    let mut verdicts = Vec::new();
    let arr = input.params.to_array();

    // Bound-interior: a parameter pinned against its box is the
    // optimizer telling us the data wanted to leave the feasible region.
    for i in 0..4 {
        let name = WeibullParameters::NAMES[i];
        let (lo, hi) = (input.ctx.lower[i], input.ctx.upper[i]);
        let range = hi - lo;
        let (status, detail) = if range <= 0.0 {
            (
                VerdictStatus::Fail,
                format!("{name} = {:.4e}: bound interval [{lo:.4e}, {hi:.4e}] is empty", arr[i]),
            )
        } else {
            let margin = (arr[i] - lo).min(hi - arr[i]) / range;
            if margin < BOUND_PROXIMITY_FRACTION {
                (
                    VerdictStatus::Fail,
                    format!(
                        "{name} = {:.4e} sits within {:.2}% of bound [{lo:.4e}, {hi:.4e}]",
                        arr[i],
                        margin * 100.0
                    ),
                )
            } else {
                (
                    VerdictStatus::Pass,
                    format!("{name} = {:.4e} interior to [{lo:.4e}, {hi:.4e}]", arr[i]),
                )
            }
        };
        verdicts.push(ValidationVerdict::new(format!("bound-interior({name})"), status, detail));
    }

    // Saturation must cover every observed cross-section to within its
    // Poisson counting noise (the raw maximum routinely lands above the
    // MLE near saturation, even on clean data).
    let max_xs = input.ctx.max_observed_xs;
    let floor = input.ctx.max_xs_noise_floor;
    let sat_ok = input.params.sigma_sat >= floor;
    verdicts.push(ValidationVerdict::new(
        "saturation-covers-data",
        if sat_ok { VerdictStatus::Pass } else { VerdictStatus::Fail },
        format!(
            "sigma_sat = {:.4e}, max observed cross-section = {max_xs:.4e} \
             (noise floor {floor:.4e})",
            input.params.sigma_sat
        ),
    ));

    // The threshold must sit below every LET that produced counts.
    let min_let = input.ctx.min_counted_let;
    let th_ok = input.params.let_th < min_let;
    verdicts.push(ValidationVerdict::new(
        "threshold-below-counted-let",
        if th_ok { VerdictStatus::Pass } else { VerdictStatus::Fail },
        format!(
            "let_th = {:.4}, smallest counted LET = {min_let:.4}",
            input.params.let_th
        ),
    ));

    // Plausibility windows.
    verdicts.push(window_verdict(
        "shape-plausibility",
        "shape",
        input.params.shape,
        SHAPE_TYPICAL,
        SHAPE_EXTREME,
    ));
    let wr = input.ctx.let_range;
    verdicts.push(window_verdict(
        "width-plausibility",
        "width/LET-range",
        input.params.width / wr,
        WIDTH_TYPICAL_FRACTION,
        WIDTH_EXTREME_FRACTION,
    ));

    // Shape/width identifiability from the bootstrap ensemble.
    let shapes = input.ensemble.parameter_values(2);
    let widths = input.ensemble.parameter_values(3);
    let corr_verdict = match correlation(&shapes, &widths) {
        Some(rho) => ValidationVerdict::new(
            "shape-width-correlation",
            if rho.abs() >= CORRELATION_FAIL {
                VerdictStatus::Fail
            } else {
                VerdictStatus::Pass
            },
            format!("rho(shape, width) = {rho:.3} over {} replicates", shapes.len()),
        ),
        None => ValidationVerdict::new(
            "shape-width-correlation",
            VerdictStatus::Na,
            "ensemble too degenerate for a correlation estimate".to_string(),
        ),
    };
    verdicts.push(corr_verdict);

    // Interval informativeness.
    for (name, ci) in input.intervals.iter_named() {
        let rel = ci.relative_half_width();
        let status = if rel > CI_WIDTH_FAIL {
            VerdictStatus::Fail
        } else if rel > CI_WIDTH_WARNING {
            VerdictStatus::Warning
        } else {
            VerdictStatus::Pass
        };
        verdicts.push(ValidationVerdict::new(
            format!("ci-width({name})"),
            status,
            format!(
                "[{:.4e}, {:.4e}] around {:.4e}: relative half-width {:.1}%",
                ci.lower,
                ci.upper,
                ci.point_estimate,
                rel * 100.0
            ),
        ));
    }

    // The fitted curve must respect every zero-count upper limit.
    if input.upper_limits.is_empty() {
        verdicts.push(ValidationVerdict::new(
            "upper-limit-consistency",
            VerdictStatus::Na,
            "no zero-count observations".to_string(),
        ));
    } else {
        for ul in input.upper_limits {
            let fitted = cross_section(input.params, ul.let_mev);
            let ok = fitted <= ul.upper_limit;
            verdicts.push(ValidationVerdict::new(
                format!("upper-limit(L={:.4})", ul.let_mev),
                if ok { VerdictStatus::Pass } else { VerdictStatus::Fail },
                format!("fitted sigma = {fitted:.4e}, limit = {:.4e}", ul.upper_limit),
            ));
        }
    }

    // Goodness of fit, when it ran.
    match input.gof {
        Some(out) => verdicts.push(ValidationVerdict::new(
            "goodness-of-fit",
            out.status,
            format!("deviance = {:.4}, p = {:.4}", out.deviance, out.p_value),
        )),
        None => verdicts.push(ValidationVerdict::new(
            "goodness-of-fit",
            VerdictStatus::Na,
            "not run: too few residual degrees of freedom".to_string(),
        )),
    }

    // Degenerate BCA adjustments surfaced as warnings.
    for name in input.ci_fallbacks {
        verdicts.push(ValidationVerdict::new(
            format!("ci-fallback({name})"),
            VerdictStatus::Warning,
            "BCA adjustment degenerate; percentile interval used".to_string(),
        ));
    }

    ValidationReport::from_verdicts(verdicts)
}

fn window_verdict(
    check: &str,
    label: &str,
    value: f64,
    typical: (f64, f64),
    extreme: (f64, f64),
) -> ValidationVerdict {
    let status = if value < extreme.0 || value > extreme.1 {
        VerdictStatus::Fail
    } else if value < typical.0 || value > typical.1 {
        VerdictStatus::Warning
    } else {
        VerdictStatus::Pass
    };
    ValidationVerdict::new(
        check,
        status,
        format!(
            "{label} = {value:.3}; typical [{}, {}], extreme [{}, {}]",
            typical.0, typical.1, extreme.0, extreme.1
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CiMethod, ConfidenceInterval, Observation};
    use crate::fit::gof::GofOutcome;

    fn params() -> WeibullParameters {
        WeibullParameters {
            sigma_sat: 1.1e-7,
            let_th: 2.0,
            shape: 1.8,
            width: 20.0,
        }
    }

    fn ctx() -> FitContext {
        let data: Vec<Observation> = (0..10)
            .map(|i| {
                let l = 4.0 + 6.0 * i as f64;
                Observation::new(l, 1.0e9, 40 + 5 * i as u64)
            })
            .collect();
        FitContext::for_dataset(&data, &data).unwrap()
    }

    fn tight_interval(point: f64) -> ConfidenceInterval {
        ConfidenceInterval {
            lower: point * 0.9,
            upper: point * 1.1,
            point_estimate: point,
            method_used: CiMethod::Percentile,
        }
    }

    fn intervals() -> ParameterIntervals {
        let p = params();
        ParameterIntervals {
            sigma_sat: tight_interval(p.sigma_sat),
            let_th: tight_interval(p.let_th),
            shape: tight_interval(p.shape),
            width: tight_interval(p.width),
        }
    }

    /// Mildly scattered, weakly correlated replicates around the point.
    fn ensemble() -> BootstrapEnsemble {
        let p = params();
        let replicates: Vec<WeibullParameters> = (0..40)
            .map(|i| {
                let u = (i as f64 / 39.0) - 0.5;
                let v = if i % 2 == 0 { u } else { -u };
                WeibullParameters {
                    sigma_sat: p.sigma_sat * (1.0 + 0.05 * u),
                    let_th: p.let_th + 0.2 * v,
                    shape: p.shape + 0.3 * u,
                    width: p.width * (1.0 + 0.2 * v),
                }
            })
            .collect();
        BootstrapEnsemble {
            n_failed: 0,
            n_requested: replicates.len(),
            replicates,
        }
    }

    fn gof_pass() -> GofOutcome {
        GofOutcome {
            deviance: 4.0,
            p_value: 0.6,
            status: VerdictStatus::Pass,
        }
    }

    #[test]
    fn healthy_fit_passes_every_rule() {
        let p = params();
        let iv = intervals();
        let c = ctx();
        let e = ensemble();
        let g = gof_pass();
        let report = validate(&ValidationInput {
            params: &p,
            intervals: &iv,
            ctx: &c,
            ensemble: &e,
            upper_limits: &[],
            gof: Some(&g),
            ci_fallbacks: &[],
        });
        assert_eq!(report.aggregate, VerdictStatus::Pass);
        // 4 bound + saturation + threshold + 2 windows + correlation
        // + 4 widths + 1 upper-limit NA + 1 gof.
        assert_eq!(report.verdicts.len(), 15);
        assert!(
            report
                .verdicts
                .iter()
                .all(|v| v.status == VerdictStatus::Pass || v.status == VerdictStatus::Na)
        );
    }

    #[test]
    fn parameter_pinned_at_bound_fails() {
        let c = ctx();
        let mut p = params();
        p.shape = c.upper[2]; // pinned at the shape cap
        let iv = intervals();
        let e = ensemble();
        let report = validate(&ValidationInput {
            params: &p,
            intervals: &iv,
            ctx: &c,
            ensemble: &e,
            upper_limits: &[],
            gof: None,
            ci_fallbacks: &[],
        });
        assert_eq!(report.aggregate, VerdictStatus::Fail);
        let v = report
            .verdicts
            .iter()
            .find(|v| v.check_name == "bound-interior(shape)")
            .unwrap();
        assert_eq!(v.status, VerdictStatus::Fail);
    }

    #[test]
    fn saturation_below_observed_data_fails() {
        let c = ctx();
        let mut p = params();
        p.sigma_sat = c.max_observed_xs * 0.5;
        let iv = intervals();
        let e = ensemble();
        let report = validate(&ValidationInput {
            params: &p,
            intervals: &iv,
            ctx: &c,
            ensemble: &e,
            upper_limits: &[],
            gof: None,
            ci_fallbacks: &[],
        });
        let v = report
            .verdicts
            .iter()
            .find(|v| v.check_name == "saturation-covers-data")
            .unwrap();
        assert_eq!(v.status, VerdictStatus::Fail);
    }

    #[test]
    fn saturation_within_counting_noise_of_the_maximum_passes() {
        let c = ctx();
        let mut p = params();
        // Below the raw maximum, inside the counting allowance.
        p.sigma_sat = c.max_observed_xs * 0.97;
        let iv = intervals();
        let e = ensemble();
        let report = validate(&ValidationInput {
            params: &p,
            intervals: &iv,
            ctx: &c,
            ensemble: &e,
            upper_limits: &[],
            gof: None,
            ci_fallbacks: &[],
        });
        let v = report
            .verdicts
            .iter()
            .find(|v| v.check_name == "saturation-covers-data")
            .unwrap();
        assert_eq!(v.status, VerdictStatus::Pass, "{}", v.detail);
        assert!(v.detail.contains("noise floor"));
    }

    #[test]
    fn interval_width_escalates_from_warning_to_fail() {
        let p = params();
        let c = ctx();
        let e = ensemble();
        let mut iv = intervals();
        // Half-width 60% of the point estimate: warning band.
        iv.width = ConfidenceInterval {
            lower: p.width * 0.4,
            upper: p.width * 1.6,
            point_estimate: p.width,
            method_used: CiMethod::Percentile,
        };
        let report = validate(&ValidationInput {
            params: &p,
            intervals: &iv,
            ctx: &c,
            ensemble: &e,
            upper_limits: &[],
            gof: None,
            ci_fallbacks: &[],
        });
        let v = report
            .verdicts
            .iter()
            .find(|v| v.check_name == "ci-width(width)")
            .unwrap();
        assert_eq!(v.status, VerdictStatus::Warning);

        // Half-width 150%: fail band.
        iv.width.lower = -p.width * 0.5;
        iv.width.upper = p.width * 2.5;
        let report = validate(&ValidationInput {
            params: &p,
            intervals: &iv,
            ctx: &c,
            ensemble: &e,
            upper_limits: &[],
            gof: None,
            ci_fallbacks: &[],
        });
        let v = report
            .verdicts
            .iter()
            .find(|v| v.check_name == "ci-width(width)")
            .unwrap();
        assert_eq!(v.status, VerdictStatus::Fail);
    }

    #[test]
    fn perfectly_coupled_shape_and_width_fail() {
        let p = params();
        let c = ctx();
        let iv = intervals();
        // width moves in lockstep with shape across replicates.
        let replicates: Vec<WeibullParameters> = (0..30)
            .map(|i| {
                let u = i as f64 / 29.0;
                WeibullParameters {
                    sigma_sat: p.sigma_sat,
                    let_th: p.let_th,
                    shape: 1.0 + u,
                    width: 10.0 + 5.0 * u,
                }
            })
            .collect();
        let e = BootstrapEnsemble {
            n_failed: 0,
            n_requested: replicates.len(),
            replicates,
        };
        let report = validate(&ValidationInput {
            params: &p,
            intervals: &iv,
            ctx: &c,
            ensemble: &e,
            upper_limits: &[],
            gof: None,
            ci_fallbacks: &[],
        });
        let v = report
            .verdicts
            .iter()
            .find(|v| v.check_name == "shape-width-correlation")
            .unwrap();
        assert_eq!(v.status, VerdictStatus::Fail);
    }

    #[test]
    fn violated_upper_limit_fails_and_absence_is_na() {
        let p = params();
        let c = ctx();
        let iv = intervals();
        let e = ensemble();
        // Fitted curve at L=30 is near saturation (~1e-7); a limit far
        // below that is violated.
        let limits = [ZeroUpperLimit {
            let_mev: 30.0,
            fluence: 1.0e12,
            upper_limit: 3.7 / 1.0e12,
        }];
        let report = validate(&ValidationInput {
            params: &p,
            intervals: &iv,
            ctx: &c,
            ensemble: &e,
            upper_limits: &limits,
            gof: None,
            ci_fallbacks: &[],
        });
        let v = report
            .verdicts
            .iter()
            .find(|v| v.check_name.starts_with("upper-limit(L="))
            .unwrap();
        assert_eq!(v.status, VerdictStatus::Fail);

        let report = validate(&ValidationInput {
            params: &p,
            intervals: &iv,
            ctx: &c,
            ensemble: &e,
            upper_limits: &[],
            gof: None,
            ci_fallbacks: &[],
        });
        let v = report
            .verdicts
            .iter()
            .find(|v| v.check_name == "upper-limit-consistency")
            .unwrap();
        assert_eq!(v.status, VerdictStatus::Na);
    }

    #[test]
    fn ci_fallbacks_surface_as_warnings() {
        let p = params();
        let c = ctx();
        let iv = intervals();
        let e = ensemble();
        let report = validate(&ValidationInput {
            params: &p,
            intervals: &iv,
            ctx: &c,
            ensemble: &e,
            upper_limits: &[],
            gof: Some(&gof_pass()),
            ci_fallbacks: &["shape"],
        });
        let v = report
            .verdicts
            .iter()
            .find(|v| v.check_name == "ci-fallback(shape)")
            .unwrap();
        assert_eq!(v.status, VerdictStatus::Warning);
        assert_eq!(report.aggregate, VerdictStatus::Warning);
    }

    #[test]
    fn extreme_shape_fails_and_unusual_shape_warns() {
        let c = ctx();
        let iv = intervals();
        let e = ensemble();
        let mut p = params();
        p.shape = 4.5; // outside typical, inside extreme
        let report = validate(&ValidationInput {
            params: &p,
            intervals: &iv,
            ctx: &c,
            ensemble: &e,
            upper_limits: &[],
            gof: None,
            ci_fallbacks: &[],
        });
        let v = report
            .verdicts
            .iter()
            .find(|v| v.check_name == "shape-plausibility")
            .unwrap();
        assert_eq!(v.status, VerdictStatus::Warning);

        p.shape = 9.0; // outside extreme but interior to the box
        let report = validate(&ValidationInput {
            params: &p,
            intervals: &iv,
            ctx: &c,
            ensemble: &e,
            upper_limits: &[],
            gof: None,
            ci_fallbacks: &[],
        });
        let v = report
            .verdicts
            .iter()
            .find(|v| v.check_name == "shape-plausibility")
            .unwrap();
        assert_eq!(v.status, VerdictStatus::Fail);
    }
}
