//! Formatted terminal output for a pipeline run.
//!
//! Formatting lives in one place so:
//! - the fitting/validation code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

use crate::domain::{PipelineResult, VerdictStatus};

/// Format the full run summary (dataset stats + selection + parameter
/// table + verdicts).
pub fn format_run_summary(result: &PipelineResult) -> String {
    let mut out = String::new();

    out.push_str("=== seu - Weibull SEU Cross-Section Fit ===\n");
    let ch = &result.characterization;
    out.push_str(&format!(
        "Dataset: n={} | mean count={:.2} | dispersion={} | excess zeros={:.3} | dof={}\n",
        ch.n_observations,
        ch.mean_count,
        ch.dispersion_ratio
            .map(|d| format!("{d:.3}"))
            .unwrap_or_else(|| "n/a".to_string()),
        ch.excess_zero_fraction,
        ch.degrees_of_freedom,
    ));

    let sel = &result.selection;
    out.push_str(&format!(
        "Methods: mle={:?} | bootstrap={:?} | ci={} | gof={}\n",
        sel.mle_variant,
        sel.bootstrap_variant,
        sel.ci_method.display_name(),
        if sel.run_goodness_of_fit { "yes" } else { "no" },
    ));

    let d = &result.diagnostics;
    out.push_str(&format!(
        "Run: fit attempts={} | replicates={} ({} failed)\n",
        d.fit_attempts, d.bootstrap_replicates, d.bootstrap_failures,
    ));
    if let (Some(dev), Some(p)) = (d.deviance, d.gof_p_value) {
        out.push_str(&format!("GoF: deviance={dev:.4} p={p:.4}\n"));
    }

    out.push_str("\nParameters:\n");
    out.push_str(&format!(
        "{:<12} {:>14} {:>14} {:>14} {:<10}\n",
        "name", "estimate", "ci_low", "ci_high", "method"
    ));
    for (name, ci) in result.fit.intervals.iter_named() {
        out.push_str(&format!(
            "{name:<12} {:>14} {:>14} {:>14} {:<10}\n",
            fmt_value(ci.point_estimate),
            fmt_value(ci.lower),
            fmt_value(ci.upper),
            ci.method_used.display_name(),
        ));
    }
    out.push_str(&format!(
        "log-likelihood: {:.4}\n",
        result.fit.log_likelihood
    ));

    if !result.upper_limits.is_empty() {
        out.push_str("\nZero-count upper limits:\n");
        for ul in &result.upper_limits {
            out.push_str(&format!(
                "- L={:.3}: sigma <= {}\n",
                ul.let_mev,
                fmt_value(ul.upper_limit)
            ));
        }
    }

    out.push('\n');
    out.push_str(&format_verdicts(result));
    out
}

/// Format the verdict table only (the `check` subcommand's output).
pub fn format_verdicts(result: &PipelineResult) -> String {
    let mut out = String::new();
    out.push_str("Validation:\n");
    for v in &result.validation.verdicts {
        out.push_str(&format!(
            "{:<8} {:<34} {}\n",
            v.status.display_name(),
            truncate(&v.check_name, 34),
            v.detail,
        ));
    }
    out.push_str(&format!("\nAggregate: {}\n", format_aggregate_line(result)));
    out
}

/// One-line outcome with status counts. Closes the verdict table and
/// stands alone for logs and scripting.
pub fn format_aggregate_line(result: &PipelineResult) -> String {
    let n_fail = count_status(result, VerdictStatus::Fail);
    let n_warn = count_status(result, VerdictStatus::Warning);
    format!(
        "{} ({} fail, {} warning, {} checks)",
        result.validation.aggregate.display_name(),
        n_fail,
        n_warn,
        result.validation.verdicts.len(),
    )
}

fn count_status(result: &PipelineResult, status: VerdictStatus) -> usize {
    result
        .validation
        .verdicts
        .iter()
        .filter(|v| v.status == status)
        .count()
}

fn fmt_value(v: f64) -> String {
    if v != 0.0 && v.abs() < 1e-3 {
        format!("{v:.4e}")
    } else {
        format!("{v:.4}")
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
