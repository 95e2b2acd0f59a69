//! Method selection from the characterization snapshot.
//!
//! One pure function maps dataset statistics to an enumerated choice per
//! axis (likelihood variant, bootstrap effort, interval method, whether
//! the goodness-of-fit test runs). The selection is made exactly once per
//! run and recorded in the output for audit; later stages only read it.

use crate::domain::{
    BootstrapVariant, CharacterizationReport, CiMethod, MethodSelection, MleVariant,
};

/// Sample size at which large-sample machinery switches on.
pub const LARGE_SAMPLE_N: usize = 50;

/// Minimum per-point count for the full-effort bootstrap.
pub const WELL_POPULATED_MIN_COUNT: u64 = 5;

/// Residual degrees of freedom required for a meaningful deviance test.
pub const GOF_MIN_DOF: usize = 3;

/// Choose the method set for one run.
///
/// `min_count` is the smallest event count in the full dataset (zero rows
/// included). Every branch below is total: any valid report maps to
/// exactly one selection.
pub fn select_methods(report: &CharacterizationReport, min_count: u64) -> MethodSelection {
    let n = report.n_observations;
    let has_zeros = report.has_zero_observations;

    let mle_variant = if has_zeros {
        MleVariant::WithZeros
    } else if n >= LARGE_SAMPLE_N {
        MleVariant::Standard
    } else {
        MleVariant::SmallSample
    };

    let bootstrap_variant = if n >= LARGE_SAMPLE_N && min_count >= WELL_POPULATED_MIN_COUNT {
        BootstrapVariant::Full
    } else {
        BootstrapVariant::Conservative
    };

    let ci_method = if n >= LARGE_SAMPLE_N && !has_zeros {
        CiMethod::Bca
    } else {
        CiMethod::Percentile
    };

    MethodSelection {
        mle_variant,
        bootstrap_variant,
        ci_method,
        run_goodness_of_fit: report.degrees_of_freedom >= GOF_MIN_DOF,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(n: usize, has_zeros: bool) -> CharacterizationReport {
        CharacterizationReport {
            n_observations: n,
            dispersion_ratio: Some(1.0),
            excess_zero_fraction: 0.0,
            sample_to_parameter_ratio: n as f64 / 4.0,
            mean_count: 10.0,
            degrees_of_freedom: n.saturating_sub(4),
            has_zero_observations: has_zeros,
        }
    }

    #[test]
    fn large_clean_sample_gets_standard_and_bca() {
        let sel = select_methods(&report(60, false), 7);
        assert_eq!(sel.mle_variant, MleVariant::Standard);
        assert_eq!(sel.bootstrap_variant, BootstrapVariant::Full);
        assert_eq!(sel.ci_method, CiMethod::Bca);
        assert!(sel.run_goodness_of_fit);
    }

    #[test]
    fn zeros_force_with_zeros_and_percentile_at_any_size() {
        let sel = select_methods(&report(200, true), 0);
        assert_eq!(sel.mle_variant, MleVariant::WithZeros);
        assert_eq!(sel.bootstrap_variant, BootstrapVariant::Conservative);
        assert_eq!(sel.ci_method, CiMethod::Percentile);
    }

    #[test]
    fn small_clean_sample_gets_small_sample_variant() {
        let sel = select_methods(&report(12, false), 5);
        assert_eq!(sel.mle_variant, MleVariant::SmallSample);
        assert_eq!(sel.bootstrap_variant, BootstrapVariant::Conservative);
        assert_eq!(sel.ci_method, CiMethod::Percentile);
        assert!(sel.run_goodness_of_fit);
    }

    #[test]
    fn sample_size_boundary_flips_at_fifty() {
        let at_49 = select_methods(&report(49, false), 9);
        let at_50 = select_methods(&report(50, false), 9);
        assert_eq!(at_49.mle_variant, MleVariant::SmallSample);
        assert_eq!(at_50.mle_variant, MleVariant::Standard);
        assert_eq!(at_49.bootstrap_variant, BootstrapVariant::Conservative);
        assert_eq!(at_50.bootstrap_variant, BootstrapVariant::Full);
        assert_eq!(at_49.ci_method, CiMethod::Percentile);
        assert_eq!(at_50.ci_method, CiMethod::Bca);
    }

    #[test]
    fn min_count_boundary_flips_at_five() {
        let at_4 = select_methods(&report(80, false), 4);
        let at_5 = select_methods(&report(80, false), 5);
        assert_eq!(at_4.bootstrap_variant, BootstrapVariant::Conservative);
        assert_eq!(at_5.bootstrap_variant, BootstrapVariant::Full);
        // The likelihood and interval axes ignore min count.
        assert_eq!(at_4.mle_variant, at_5.mle_variant);
        assert_eq!(at_4.ci_method, at_5.ci_method);
    }

    #[test]
    fn gof_requires_three_residual_degrees_of_freedom() {
        // n = 6 -> dof 2, n = 7 -> dof 3.
        assert!(!select_methods(&report(6, false), 5).run_goodness_of_fit);
        assert!(select_methods(&report(7, false), 5).run_goodness_of_fit);
    }

    #[test]
    fn mean_count_and_dispersion_do_not_steer_selection() {
        // Selection keys only off size, zeros, min count, and dof; the
        // remaining statistics are diagnostic context.
        let mut a = report(60, false);
        let mut b = report(60, false);
        a.mean_count = 0.09;
        b.mean_count = 0.1;
        a.dispersion_ratio = Some(0.2);
        b.dispersion_ratio = Some(8.0);
        assert_eq!(select_methods(&a, 6), select_methods(&b, 6));
    }
}
