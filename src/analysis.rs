//! Frozen-set analysis over a batch of runs
//!
//! Pipeline (one pass, no shared mutable state):
//! 1. Exclude runs whose block length differs from N
//! 2. Freezer: per-run frozen set
//! 3. Agreement Engine: agreement matrix, COMMON set, verdict
//! 4. Rank engine: Spearman matrix, rank variance, controversial channels
//! 5. Per-run BER summaries and the density spectrum

use crate::agreement::{AgreementMatrix, AgreementVerdict};
use crate::config::AnalysisConfig;
use crate::density::{self, DensitySpectrum};
use crate::freezer::{select_frozen, FrozenSet};
use crate::loader::SkippedRun;
use crate::rank::{self, ControversialChannel, CorrelationMatrix};
use crate::run::Run;
use crate::run_stats::{summarize, RunSummary};
use anyhow::{bail, Context, Result};
use serde::Serialize;

/// Frozen selection of one run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunAnalysis {
    pub name: String,
    pub frozen: FrozenSet,
    pub summary: RunSummary,
}

/// Everything derived from one batch of runs
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub config: AnalysisConfig,
    /// Included runs, sorted by name
    pub runs: Vec<RunAnalysis>,
    /// Runs excluded before or during analysis
    pub skipped: Vec<SkippedRun>,
    pub agreement: AgreementMatrix,
    pub verdict: AgreementVerdict,
    pub correlation: CorrelationMatrix,
    /// Rank variance per channel index
    pub rank_variance: Vec<f64>,
    pub controversial: Vec<ControversialChannel>,
    pub density: DensitySpectrum,
}

/// Analyze a batch of runs
///
/// Runs whose length differs from `config.block_length` are excluded and
/// listed in [`AnalysisReport::skipped`]. Fails when the configuration is
/// invalid or no run remains.
///
/// # Example
/// ```
/// use frozen_audit::analysis::analyze;
/// use frozen_audit::config::AnalysisConfig;
/// use frozen_audit::run::Run;
///
/// let runs = vec![
///     Run::new("a", vec![0.1, 0.2, 0.3, 0.4]),
///     Run::new("b", vec![0.1, 0.2, 0.3, 0.4]),
/// ];
/// let report = analyze(&runs, &AnalysisConfig::with_info_bits(4, 2)).unwrap();
/// assert_eq!(report.agreement.common_indices(), vec![2, 3]);
/// assert!(report.verdict.passed);
/// ```
pub fn analyze(runs: &[Run], config: &AnalysisConfig) -> Result<AnalysisReport> {
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    let n = config.block_length;
    let n_frozen = config.n_frozen();

    let mut included: Vec<Run> = Vec::with_capacity(runs.len());
    let mut skipped = Vec::new();
    for run in runs {
        if run.block_length() == n {
            included.push(run.clone());
        } else {
            tracing::warn!(
                "Excluding run {}: {} rows, expected N={}",
                run.name,
                run.block_length(),
                n
            );
            skipped.push(SkippedRun {
                file: run.name.clone(),
                reason: format!("has {} rows, expected N={}", run.block_length(), n),
            });
        }
    }

    if included.is_empty() {
        bail!("No valid runs to analyze");
    }
    included.sort_by(|a, b| a.name.cmp(&b.name));
    tracing::debug!(
        "Analyzing {} runs (N={}, n_frozen={})",
        included.len(),
        n,
        n_frozen
    );

    let mut run_analyses = Vec::with_capacity(included.len());
    for run in &included {
        let frozen = select_frozen(&run.ber, n_frozen)
            .with_context(|| format!("Failed to freeze channels of {}", run.name))?;
        let summary = summarize(run, &frozen)?;
        run_analyses.push(RunAnalysis {
            name: run.name.clone(),
            frozen,
            summary,
        });
    }

    let sets: Vec<(String, FrozenSet)> = run_analyses
        .iter()
        .map(|r| (r.name.clone(), r.frozen.clone()))
        .collect();
    let agreement = AgreementMatrix::from_frozen_sets(&sets)?;
    let verdict = agreement.verdict(n_frozen);
    tracing::debug!(
        "Common frozen set: {} of {} target",
        verdict.common,
        verdict.target
    );

    let correlation = rank::spearman_matrix(&included, config.rank_method);
    let ranks = rank::rank_runs(&included, config.rank_method);
    let rank_variance = rank::rank_variance(&ranks)?;
    let controversial = rank::most_controversial(&rank_variance, config.top_controversial);

    let density = density::spectrum(
        included.iter().map(|r| (r.name.as_str(), r.ber.as_slice())),
        &config.density,
    )?;

    Ok(AnalysisReport {
        config: config.clone(),
        runs: run_analyses,
        skipped,
        agreement,
        verdict,
        correlation,
        rank_variance,
        controversial,
        density,
    })
}

/// Format a coefficient, showing NaN as n/a
fn fmt_coefficient(value: f64) -> String {
    if value.is_nan() {
        "n/a".to_string()
    } else {
        format!("{:.4}", value)
    }
}

impl AnalysisReport {
    /// Generate human-readable report
    pub fn to_report_string(&self) -> String {
        let mut report = String::new();

        report.push_str(&format!(
            "\n[Result] Common frozen indices: {} (target was {})\n",
            self.verdict.common, self.verdict.target
        ));
        report.push_str(&self.verdict.message());
        report.push('\n');

        let common = self.agreement.common_indices();
        report.push_str(&format!(
            "Common frozen indices ({}): {:?}\n",
            common.len(),
            common
        ));

        // Spearman matrix
        let width = self
            .correlation
            .names
            .iter()
            .map(|n| n.len())
            .max()
            .unwrap_or(0)
            .max(6);
        report.push_str("\n[Analysis] Spearman rank correlation (channel ordering agreement):\n");
        report.push_str(&format!("{:width$}", "", width = width));
        for i in 0..self.correlation.len() {
            report.push_str(&format!("  {:>8}", format!("#{}", i + 1)));
        }
        report.push('\n');
        for (i, name) in self.correlation.names.iter().enumerate() {
            report.push_str(&format!("{:width$}", name, width = width));
            for j in 0..self.correlation.len() {
                report.push_str(&format!(
                    "  {:>8}",
                    fmt_coefficient(self.correlation.get(i, j))
                ));
            }
            report.push('\n');
        }

        // Controversial channels
        report.push_str("\n[Analysis] Most controversial indices (highest rank variance):\n");
        report.push_str("(channels whose reliability ordering disagrees most across runs)\n");
        for channel in &self.controversial {
            report.push_str(&format!(
                "Index {}: variance {:.2}\n",
                channel.index, channel.variance
            ));
        }

        // Per-run summary
        report.push_str("\n[Summary] BER per run:\n");
        report.push_str(&format!(
            "{:width$}  {:>10}  {:>10}  {:>10}  {:>10}  {:>10}  {:>10}\n",
            "run",
            "mean",
            "median",
            "stddev",
            "min",
            "max",
            "boundary",
            width = width
        ));
        for run in &self.runs {
            let s = &run.summary;
            let boundary = s
                .boundary_ber
                .map(|b| format!("{:.6}", b))
                .unwrap_or_else(|| "-".to_string());
            report.push_str(&format!(
                "{:width$}  {:>10.6}  {:>10.6}  {:>10.6}  {:>10.6}  {:>10.6}  {:>10}\n",
                s.name,
                s.mean,
                s.median,
                s.stddev,
                s.min,
                s.max,
                boundary,
                width = width
            ));
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_runs() -> Vec<Run> {
        vec![
            Run::new("run1", vec![0.1, 0.2, 0.3, 0.4]),
            Run::new("run2", vec![0.4, 0.3, 0.2, 0.1]),
            Run::new("run3", vec![0.1, 0.2, 0.3, 0.4]),
        ]
    }

    #[test]
    fn test_three_run_scenario() {
        let report = analyze(&scenario_runs(), &AnalysisConfig::with_info_bits(4, 2)).unwrap();

        assert_eq!(report.runs[0].frozen.frozen_indices(), vec![2, 3]);
        assert_eq!(report.runs[1].frozen.frozen_indices(), vec![0, 1]);
        assert_eq!(report.runs[2].frozen.frozen_indices(), vec![2, 3]);
        assert!(report.agreement.common_indices().is_empty());
        assert!(!report.verdict.passed);
        assert_eq!(report.verdict.target, 2);
    }

    #[test]
    fn test_mismatched_run_excluded() {
        let mut runs = scenario_runs();
        runs.push(Run::new("truncated", vec![0.1, 0.2, 0.3]));

        let report = analyze(&runs, &AnalysisConfig::with_info_bits(4, 2)).unwrap();
        assert_eq!(report.runs.len(), 3);
        assert!(!report.agreement.runs.contains(&"truncated".to_string()));
        assert_eq!(report.correlation.len(), 3);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].file, "truncated");
    }

    #[test]
    fn test_no_valid_runs() {
        let runs = vec![Run::new("short", vec![0.1])];
        let err = analyze(&runs, &AnalysisConfig::with_info_bits(4, 2)).unwrap_err();
        assert!(err.to_string().contains("No valid runs"));
        assert!(analyze(&[], &AnalysisConfig::default()).is_err());
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(analyze(&scenario_runs(), &AnalysisConfig::with_info_bits(4, 5)).is_err());
    }

    #[test]
    fn test_half_mode() {
        let report = analyze(&scenario_runs(), &AnalysisConfig::half(4)).unwrap();
        assert_eq!(report.verdict.target, 2);
        assert!(report.runs.iter().all(|r| r.frozen.frozen_count() == 2));
    }

    #[test]
    fn test_report_string_sections() {
        let report = analyze(&scenario_runs(), &AnalysisConfig::with_info_bits(4, 2)).unwrap();
        let text = report.to_report_string();
        assert!(text.contains("[Result] Common frozen indices: 0 (target was 2)"));
        assert!(text.contains("WARNING: disagreement found"));
        assert!(text.contains("Common frozen indices (0): []"));
        assert!(text.contains("Spearman"));
        assert!(text.contains("Index 0: variance"));
        assert!(text.contains("run2"));
    }

    #[test]
    fn test_fmt_coefficient() {
        assert_eq!(fmt_coefficient(f64::NAN), "n/a");
        assert_eq!(fmt_coefficient(0.98765), "0.9877");
    }
}
