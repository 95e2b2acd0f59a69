//! Bootstrap confidence intervals: percentile and BCA.
//!
//! Both methods read the same sorted ensemble per parameter. Percentile
//! takes the `alpha/2` and `1 - alpha/2` quantiles directly; BCA first
//! adjusts those levels for median bias (`z0`, from the share of
//! replicates below the point estimate) and skewness (`a`, from the
//! third moment of the ensemble), then takes the adjusted quantiles.
//!
//! A numerically degenerate adjustment (non-finite, or adjusted levels
//! collapsing out of (0, 1)) drops that parameter back to the plain
//! percentile interval. The fallback is reported to the validator as a
//! warning; it never aborts the run.

use crate::domain::{
    BootstrapEnsemble, CiMethod, ConfidenceInterval, ParameterIntervals, WeibullParameters,
};
use crate::math::{mean, normal_cdf, normal_quantile, percentile_of_sorted};

/// Intervals for all four parameters plus any BCA fallbacks that
/// occurred, named for the verdict list.
#[derive(Debug, Clone)]
pub struct IntervalOutcome {
    pub intervals: ParameterIntervals,
    pub fallbacks: Vec<&'static str>,
}

/// Construct the four intervals with the selected method.
pub fn construct_intervals(
    ensemble: &BootstrapEnsemble,
    point: &WeibullParameters,
    method: CiMethod,
    confidence_level: f64,
) -> IntervalOutcome {
    let point_arr = point.to_array();
    let mut fallbacks = Vec::new();
    let mut built = [ConfidenceInterval {
        lower: f64::NAN,
        upper: f64::NAN,
        point_estimate: f64::NAN,
        method_used: method,
    }; 4];

    for i in 0..4 {
        let mut values = ensemble.parameter_values(i);
        values.sort_by(|a, b| a.total_cmp(b));
        built[i] = match method {
            CiMethod::Percentile => {
                percentile_interval(&values, point_arr[i], confidence_level)
            }
            CiMethod::Bca => match bca_interval(&values, point_arr[i], confidence_level) {
                Some(ci) => ci,
                None => {
                    fallbacks.push(WeibullParameters::NAMES[i]);
                    percentile_interval(&values, point_arr[i], confidence_level)
                }
            },
        };
    }

    IntervalOutcome {
        intervals: ParameterIntervals {
            sigma_sat: built[0],
            let_th: built[1],
            shape: built[2],
            width: built[3],
        },
        fallbacks,
    }
}

fn percentile_interval(sorted: &[f64], point: f64, level: f64) -> ConfidenceInterval {
    let alpha = 1.0 - level;
    ConfidenceInterval {
        lower: percentile_of_sorted(sorted, alpha / 2.0),
        upper: percentile_of_sorted(sorted, 1.0 - alpha / 2.0),
        point_estimate: point,
        method_used: CiMethod::Percentile,
    }
}

/// `None` signals a degenerate adjustment; the caller falls back.
fn bca_interval(sorted: &[f64], point: f64, level: f64) -> Option<ConfidenceInterval> {
    let r = sorted.len();
    if r < 2 {
        return None;
    }

    // Median-bias correction from the share of replicates below the
    // point estimate. A share of 0 or 1 has no finite quantile.
    let below = sorted.iter().filter(|&&v| v < point).count();
    let z0 = normal_quantile(below as f64 / r as f64);

    // Acceleration from the skewness of the ensemble deviations.
    let m = mean(sorted);
    let mut sum_sq = 0.0;
    let mut sum_cu = 0.0;
    for &v in sorted {
        let d = m - v;
        sum_sq += d * d;
        sum_cu += d * d * d;
    }
    let accel = sum_cu / (6.0 * sum_sq.powf(1.5));

    let alpha = 1.0 - level;
    let adjusted = |z_alpha: f64| -> f64 {
        let num = z0 + z_alpha;
        normal_cdf(z0 + num / (1.0 - accel * num))
    };
    let a1 = adjusted(normal_quantile(alpha / 2.0));
    let a2 = adjusted(normal_quantile(1.0 - alpha / 2.0));

    if !(a1.is_finite() && a2.is_finite()) || a1 <= 0.0 || a2 >= 1.0 || a1 >= a2 {
        return None;
    }

    Some(ConfidenceInterval {
        lower: percentile_of_sorted(sorted, a1),
        upper: percentile_of_sorted(sorted, a2),
        point_estimate: point,
        method_used: CiMethod::Bca,
    })
}
