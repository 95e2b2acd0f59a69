//! Four-parameter Weibull cross-section model and its Poisson likelihood.
//!
//! The model describes single-event-upset cross-section as a function of
//! linear energy transfer:
//!
//! ```text
//! sigma(L) = 0                                           L <= let_th
//! sigma(L) = sigma_sat * (1 - exp(-((L - let_th)/W)^S))  L >  let_th
//! ```
//!
//! The curve is exactly zero at and below threshold, rises over a region of
//! width `W` shaped by the exponent `S`, and saturates at `sigma_sat`.
//!
//! `1 - exp(-u)` loses precision for small `u`, so evaluation goes through
//! `exp_m1` (`1 - e^-u == -expm1(-u)`), which is accurate down to
//! `u ~ f64::EPSILON`.
//!
//! The likelihood treats each observed event count as Poisson with mean
//! `lambda_i = sigma(L_i) * fluence_i`. The factorial constant is dropped:
//! it shifts the log-likelihood but never moves the maximizer.

use crate::domain::{Observation, WeibullParameters};

/// Predicted cross-section at the given LET.
///
/// Returns exactly `0.0` for `let_mev <= params.let_th`; the onset is a
/// hard threshold, not an asymptote.
pub fn cross_section(params: &WeibullParameters, let_mev: f64) -> f64 {
    if let_mev <= params.let_th {
        return 0.0;
    }
    let z = (let_mev - params.let_th) / params.width;
    // 1 - exp(-z^s), evaluated without cancellation near z = 0.
    params.sigma_sat * (-(-z.powf(params.shape)).exp_m1())
}

/// Expected Poisson event count for one observation.
pub fn expected_count(params: &WeibullParameters, obs: &Observation) -> f64 {
    cross_section(params, obs.let_mev) * obs.fluence
}

/// Poisson log-likelihood over a dataset, factorial constant dropped.
///
/// `sum_i [ N_i * ln(lambda_i) - lambda_i ]`, with the convention that a
/// zero-count observation contributes `-lambda_i` regardless of
/// `lambda_i` (the `0 * ln 0` limit is zero). A positive count at zero
/// predicted rate yields `-inf`.
pub fn log_likelihood(params: &WeibullParameters, observations: &[Observation]) -> f64 {
    let mut ll = 0.0;
    for obs in observations {
        let lambda = expected_count(params, obs);
        if obs.count == 0 {
            ll -= lambda;
        } else if lambda > 0.0 {
            ll += obs.count as f64 * lambda.ln() - lambda;
        } else {
            return f64::NEG_INFINITY;
        }
    }
    ll
}

/// Optimizer objective: negative log-likelihood, with every non-finite
/// evaluation mapped to `+inf` so the search treats it as infeasible.
pub fn neg_log_likelihood(params: &WeibullParameters, observations: &[Observation]) -> f64 {
    let ll = log_likelihood(params, observations);
    if ll.is_finite() { -ll } else { f64::INFINITY }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> WeibullParameters {
        WeibullParameters {
            sigma_sat: 1.0e-7,
            let_th: 2.0,
            shape: 1.8,
            width: 20.0,
        }
    }

    #[test]
    fn zero_at_and_below_threshold() {
        let p = params();
        assert_eq!(cross_section(&p, 0.5), 0.0);
        assert_eq!(cross_section(&p, 2.0), 0.0);
    }

    #[test]
    fn saturates_at_large_let() {
        let p = params();
        let far = cross_section(&p, 1.0e4);
        assert!((far - p.sigma_sat).abs() < 1e-12 * p.sigma_sat);
    }

    #[test]
    fn monotone_nondecreasing_in_let() {
        let p = params();
        let mut prev = 0.0;
        for i in 0..200 {
            let l = 0.5 + 0.5 * i as f64;
            let s = cross_section(&p, l);
            assert!(s >= prev, "decreased at L={l}");
            prev = s;
        }
    }

    #[test]
    fn small_rise_matches_power_law_limit() {
        // For (L - let_th)/W << 1, sigma ~= sigma_sat * z^S.
        let p = params();
        let l = p.let_th + 1e-4;
        let z = (l - p.let_th) / p.width;
        let expected = p.sigma_sat * z.powf(p.shape);
        let got = cross_section(&p, l);
        assert!((got - expected).abs() <= 1e-9 * expected);
    }

    #[test]
    fn likelihood_is_finite_for_typical_data() {
        let p = params();
        let obs = vec![
            Observation::new(5.0, 1.0e9, 12),
            Observation::new(10.0, 1.0e9, 40),
            Observation::new(40.0, 1.0e9, 88),
        ];
        assert!(log_likelihood(&p, &obs).is_finite());
    }

    #[test]
    fn positive_count_below_threshold_is_infeasible() {
        let p = params();
        // Below threshold the model predicts rate zero; a nonzero count
        // there has zero likelihood.
        let obs = vec![Observation::new(1.0, 1.0e9, 3)];
        assert_eq!(log_likelihood(&p, &obs), f64::NEG_INFINITY);
        assert_eq!(neg_log_likelihood(&p, &obs), f64::INFINITY);
    }

    #[test]
    fn zero_count_contributes_negative_lambda() {
        let p = params();
        let obs = vec![Observation::new(10.0, 1.0e9, 0)];
        let lambda = expected_count(&p, &obs[0]);
        assert!((log_likelihood(&p, &obs) + lambda).abs() < 1e-12 * lambda.max(1.0));
    }
}
