//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting and validation
//! - exported to JSON for audit/reproducibility
//! - reloaded later by downstream report renderers

use serde::{Deserialize, Serialize};

/// One measurement at a fixed LET value.
///
/// Immutable once recorded. A dataset is an ordered sequence of
/// observations; order carries no meaning, but LET values must not repeat
/// within one dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Linear energy transfer (MeV·cm²/mg), > 0.
    pub let_mev: f64,
    /// Delivered fluence (particles/cm²), > 0.
    pub fluence: f64,
    /// Events observed at this LET.
    pub count: u64,
}

impl Observation {
    pub fn new(let_mev: f64, fluence: f64, count: u64) -> Self {
        Self {
            let_mev,
            fluence,
            count,
        }
    }

    /// Observed cross-section (events per unit fluence, cm²/device).
    pub fn cross_section(&self) -> f64 {
        self.count as f64 / self.fluence
    }
}

/// Diagnostic statistics derived from the raw dataset.
///
/// Computed once per fit attempt and never mutated; the decision engine
/// reads it, nothing else re-derives these numbers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterizationReport {
    pub n_observations: usize,
    /// `sample_variance(counts) / mean(counts)`; `None` when the mean
    /// count is zero (the ratio is undefined).
    pub dispersion_ratio: Option<f64>,
    /// Fraction of zero counts in excess of the Poisson expectation,
    /// clamped to >= 0.
    pub excess_zero_fraction: f64,
    /// `n / 4`, observations per free parameter.
    pub sample_to_parameter_ratio: f64,
    pub mean_count: f64,
    /// `max(n - 4, 0)`.
    pub degrees_of_freedom: usize,
    pub has_zero_observations: bool,
}

/// Which log-likelihood treatment the fitter applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MleVariant {
    /// Large-sample fit; also computes the observed-information covariance.
    Standard,
    /// Same objective, covariance deferred entirely to the bootstrap.
    SmallSample,
    /// Fits only the non-zero partition; zero rows become upper limits.
    WithZeros,
}

/// Bootstrap effort level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BootstrapVariant {
    /// 10 000 replicates at the standard optimizer tolerance.
    Full,
    /// 20 000 replicates with a 10x tighter tolerance for sparse data.
    Conservative,
}

impl BootstrapVariant {
    /// Default replicate count for this variant.
    pub fn default_replicates(self) -> usize {
        match self {
            BootstrapVariant::Full => 10_000,
            BootstrapVariant::Conservative => 20_000,
        }
    }
}

/// Confidence interval construction method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CiMethod {
    /// Bias-corrected and accelerated percentile interval.
    Bca,
    /// Plain percentile interval.
    Percentile,
}

impl CiMethod {
    pub fn display_name(self) -> &'static str {
        match self {
            CiMethod::Bca => "BCA",
            CiMethod::Percentile => "percentile",
        }
    }
}

/// Output of the decision engine: one enumerated choice per axis.
///
/// Produced exactly once per run and consumed by every later stage; no
/// other component re-derives method choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSelection {
    pub mle_variant: MleVariant,
    pub bootstrap_variant: BootstrapVariant,
    pub ci_method: CiMethod,
    pub run_goodness_of_fit: bool,
}

/// The four fitted Weibull parameters.
///
/// Refits produce new instances; bootstrap replicates each own their own.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeibullParameters {
    /// Saturation cross-section (cm²/device), > 0.
    pub sigma_sat: f64,
    /// Onset threshold LET (MeV·cm²/mg), >= 0.
    pub let_th: f64,
    /// Dimensionless shape exponent, > 0.
    pub shape: f64,
    /// Width of the rise (MeV·cm²/mg), > 0.
    pub width: f64,
}

impl WeibullParameters {
    pub const DIM: usize = 4;

    /// Parameter names in optimizer order.
    pub const NAMES: [&'static str; 4] = ["sigma_sat", "let_th", "shape", "width"];

    pub fn from_array(x: [f64; 4]) -> Self {
        Self {
            sigma_sat: x[0],
            let_th: x[1],
            shape: x[2],
            width: x[3],
        }
    }

    pub fn to_array(self) -> [f64; 4] {
        [self.sigma_sat, self.let_th, self.shape, self.width]
    }
}

/// Parameter sets from successfully refit bootstrap replicates.
///
/// Owned by the run that created it; discarded after interval
/// construction unless retained for diagnostics.
#[derive(Debug, Clone)]
pub struct BootstrapEnsemble {
    pub replicates: Vec<WeibullParameters>,
    pub n_failed: usize,
    pub n_requested: usize,
}

impl BootstrapEnsemble {
    /// Values of one parameter (by optimizer index) across all replicates.
    pub fn parameter_values(&self, index: usize) -> Vec<f64> {
        self.replicates
            .iter()
            .map(|p| p.to_array()[index])
            .collect()
    }
}

/// A two-sided confidence interval for one parameter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
    pub point_estimate: f64,
    pub method_used: CiMethod,
}

impl ConfidenceInterval {
    /// `(upper - lower) / (2 * point_estimate)`, the relative half-width
    /// used by the validator's interval-width rule.
    pub fn relative_half_width(&self) -> f64 {
        if self.point_estimate == 0.0 {
            return f64::INFINITY;
        }
        (self.upper - self.lower) / (2.0 * self.point_estimate.abs())
    }
}

/// The four per-parameter intervals bundled together.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ParameterIntervals {
    pub sigma_sat: ConfidenceInterval,
    pub let_th: ConfidenceInterval,
    pub shape: ConfidenceInterval,
    pub width: ConfidenceInterval,
}

impl ParameterIntervals {
    /// Intervals in optimizer order, paired with parameter names.
    pub fn iter_named(&self) -> [(&'static str, ConfidenceInterval); 4] {
        [
            ("sigma_sat", self.sigma_sat),
            ("let_th", self.let_th),
            ("shape", self.shape),
            ("width", self.width),
        ]
    }
}

/// Point estimates plus intervals and fit diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitResult {
    pub params: WeibullParameters,
    pub intervals: ParameterIntervals,
    /// Maximized Poisson log-likelihood (constant term dropped).
    pub log_likelihood: f64,
    /// Observed-information covariance (row-major 4x4); `Standard`
    /// variant only, all other variants defer to the bootstrap.
    pub covariance: Option<[[f64; 4]; 4]>,
}

/// Upper-limit constraint derived from one excluded zero-count row.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ZeroUpperLimit {
    pub let_mev: f64,
    pub fluence: f64,
    /// 95% Poisson upper limit on the cross-section: `3.7 / fluence`.
    pub upper_limit: f64,
}

/// Severity of one validation finding.
///
/// Ordering for the aggregate rollup: `Fail > Warning > Pass > Na`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VerdictStatus {
    Pass,
    Warning,
    Fail,
    Na,
}

impl VerdictStatus {
    /// Severity rank used for the worst-of aggregate.
    fn severity(self) -> u8 {
        match self {
            VerdictStatus::Na => 0,
            VerdictStatus::Pass => 1,
            VerdictStatus::Warning => 2,
            VerdictStatus::Fail => 3,
        }
    }

    /// The worse of two statuses.
    pub fn worst(self, other: Self) -> Self {
        if other.severity() > self.severity() {
            other
        } else {
            self
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            VerdictStatus::Pass => "PASS",
            VerdictStatus::Warning => "WARNING",
            VerdictStatus::Fail => "FAIL",
            VerdictStatus::Na => "NA",
        }
    }
}

/// One validation finding: a named check, its status, and the diagnostic
/// values that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationVerdict {
    pub check_name: String,
    pub status: VerdictStatus,
    pub detail: String,
}

impl ValidationVerdict {
    pub fn new(check_name: impl Into<String>, status: VerdictStatus, detail: impl Into<String>) -> Self {
        Self {
            check_name: check_name.into(),
            status,
            detail: detail.into(),
        }
    }
}

/// Ordered verdicts plus the worst-status rollup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub verdicts: Vec<ValidationVerdict>,
    pub aggregate: VerdictStatus,
}

impl ValidationReport {
    pub fn from_verdicts(verdicts: Vec<ValidationVerdict>) -> Self {
        let aggregate = verdicts
            .iter()
            .fold(VerdictStatus::Na, |acc, v| acc.worst(v.status));
        Self { verdicts, aggregate }
    }
}

/// Per-run counters kept for audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunDiagnostics {
    /// Attempts the main fit needed (1 = heuristic start converged).
    pub fit_attempts: usize,
    pub bootstrap_replicates: usize,
    pub bootstrap_failures: usize,
    /// Deviance statistic and p-value when goodness of fit ran.
    pub deviance: Option<f64>,
    pub gof_p_value: Option<f64>,
}

/// Everything a single pipeline run produces: four point estimates,
/// four tagged intervals, the verdict list with its aggregate, and the
/// method-selection record used, plus the characterization snapshot and
/// run counters for audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    pub characterization: CharacterizationReport,
    pub selection: MethodSelection,
    pub fit: FitResult,
    pub upper_limits: Vec<ZeroUpperLimit>,
    pub validation: ValidationReport,
    pub diagnostics: RunDiagnostics,
}

/// Run configuration beyond the dataset itself.
///
/// The seed is the only statistically meaningful knob; the rest exists
/// so tests and the CLI can bound runtime without touching semantics.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Base seed; replicate `i` derives its stream from `seed + i`.
    pub seed: u64,
    /// Two-sided confidence level for all four intervals.
    pub confidence_level: f64,
    /// Override the variant's default replicate count (tests/CLI).
    pub replicate_override: Option<usize>,
}

impl PipelineConfig {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            confidence_level: 0.95,
            replicate_override: None,
        }
    }
}
