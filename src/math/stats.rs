//! Statistics primitives: moments, percentiles, and distribution lookups.
//!
//! Distribution functions delegate to `statrs`. Construction failures and
//! out-of-range probabilities surface as non-finite values (or `None`),
//! never panics; interval construction treats non-finite as "degenerate,
//! fall back", so a bad input degrades the method instead of aborting.

use statrs::distribution::{ChiSquared, ContinuousCDF, Normal};

/// Arithmetic mean. `NaN` on an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Unbiased sample variance (n - 1 denominator). `None` below two values.
pub fn sample_variance(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    Some(ss / (values.len() - 1) as f64)
}

/// Pearson correlation of two equal-length series.
///
/// `None` when the lengths differ, fewer than two pairs exist, or either
/// series has zero variance.
pub fn correlation(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    let mx = mean(xs);
    let my = mean(ys);
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mx;
        let dy = y - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    Some(sxy / (sxx * syy).sqrt())
}

/// Interpolated percentile of an ascending-sorted slice.
///
/// Linear interpolation between order statistics (the R "type 7" rule):
/// `h = (n - 1) q`, value = `v[floor h] + frac(h) * (v[ceil h] - v[floor h])`.
/// `q` is clamped to `[0, 1]`; an empty slice yields `NaN`.
pub fn percentile_of_sorted(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let q = q.clamp(0.0, 1.0);
    let h = (sorted.len() - 1) as f64 * q;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
}

/// Standard normal CDF.
pub fn normal_cdf(x: f64) -> f64 {
    match Normal::new(0.0, 1.0) {
        Ok(n) => n.cdf(x),
        Err(_) => f64::NAN,
    }
}

/// Standard normal quantile. `NaN` outside the open interval (0, 1).
pub fn normal_quantile(p: f64) -> f64 {
    if !(p > 0.0 && p < 1.0) {
        return f64::NAN;
    }
    match Normal::new(0.0, 1.0) {
        Ok(n) => n.inverse_cdf(p),
        Err(_) => f64::NAN,
    }
}

/// Chi-squared survival function `P(X >= x)` with `dof` degrees of
/// freedom. `None` when `dof` is zero.
pub fn chi_squared_sf(x: f64, dof: usize) -> Option<f64> {
    let chi = ChiSquared::new(dof as f64).ok()?;
    Some((1.0 - chi.cdf(x)).clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_and_variance_of_known_values() {
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((mean(&v) - 5.0).abs() < 1e-12);
        // Sum of squared deviations is 32; 32 / 7 with the n-1 denominator.
        assert!((sample_variance(&v).unwrap() - 32.0 / 7.0).abs() < 1e-12);
        assert!(sample_variance(&[1.0]).is_none());
    }

    #[test]
    fn correlation_of_linear_series() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        let ys = [2.0, 4.0, 6.0, 8.0];
        assert!((correlation(&xs, &ys).unwrap() - 1.0).abs() < 1e-12);
        let neg = [8.0, 6.0, 4.0, 2.0];
        assert!((correlation(&xs, &neg).unwrap() + 1.0).abs() < 1e-12);
        let flat = [3.0, 3.0, 3.0, 3.0];
        assert!(correlation(&xs, &flat).is_none());
    }

    #[test]
    fn percentile_interpolates_between_order_statistics() {
        let v = [10.0, 20.0, 30.0, 40.0];
        assert_eq!(percentile_of_sorted(&v, 0.0), 10.0);
        assert_eq!(percentile_of_sorted(&v, 1.0), 40.0);
        // h = 3 * 0.5 = 1.5 -> midway between 20 and 30.
        assert!((percentile_of_sorted(&v, 0.5) - 25.0).abs() < 1e-12);
    }

    #[test]
    fn normal_cdf_and_quantile_agree() {
        assert!((normal_cdf(0.0) - 0.5).abs() < 1e-12);
        assert!((normal_quantile(0.975) - 1.959_964).abs() < 1e-5);
        let p = 0.3;
        assert!((normal_cdf(normal_quantile(p)) - p).abs() < 1e-9);
        assert!(normal_quantile(0.0).is_nan());
        assert!(normal_quantile(1.0).is_nan());
    }

    #[test]
    fn chi_squared_survival_closed_form_dof_two() {
        // With two degrees of freedom the survival function is exp(-x/2).
        let p = chi_squared_sf(2.0, 2).unwrap();
        assert!((p - (-1.0f64).exp()).abs() < 1e-10);
        assert!(chi_squared_sf(1.0, 0).is_none());
    }
}
