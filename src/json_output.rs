//! JSON output format for analysis reports
//!
//! `--format json` emits one document with the configuration echo, the
//! per-run selections, the agreement result and the rank analysis.

use crate::analysis::AnalysisReport;
use crate::loader::{Discovery, SkippedRun};
use crate::rank::ControversialChannel;
use crate::run_stats::RunSummary;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Configuration echo
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonConfig {
    pub block_length: usize,
    pub info_bits: usize,
    pub n_frozen: usize,
    /// "info-bits" or "half"
    pub mode: String,
    pub rank_method: String,
}

/// Where the runs came from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonDiscovery {
    pub search_dir: String,
    pub fell_back: bool,
    pub pattern: String,
    pub files_found: usize,
}

/// One included run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRun {
    pub name: String,
    /// Frozen channel indices, ascending
    pub frozen: Vec<usize>,
    pub mean_ber: f64,
    pub median_ber: f64,
    pub stddev_ber: f64,
    pub min_ber: f64,
    pub max_ber: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boundary_ber: Option<f64>,
}

/// Agreement result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonAgreement {
    pub common_count: usize,
    pub target: usize,
    pub passed: bool,
    pub common_indices: Vec<usize>,
    /// Channels frozen by some but not all runs
    pub disputed_indices: Vec<usize>,
}

/// Spearman matrix (null for undefined coefficients)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonCorrelation {
    pub runs: Vec<String>,
    pub matrix: Vec<Vec<Option<f64>>>,
}

/// A controversial channel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonControversial {
    pub index: usize,
    pub rank_variance: f64,
}

/// A skipped input file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonSkipped {
    pub file: String,
    pub reason: String,
}

/// Complete analysis report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonReport {
    pub version: String,
    pub config: JsonConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discovery: Option<JsonDiscovery>,
    pub runs: Vec<JsonRun>,
    pub skipped: Vec<JsonSkipped>,
    pub agreement: JsonAgreement,
    pub correlation: JsonCorrelation,
    pub controversial: Vec<JsonControversial>,
    pub rank_variance: Vec<f64>,
}

impl From<&RunSummary> for JsonRun {
    fn from(s: &RunSummary) -> Self {
        Self {
            name: s.name.clone(),
            frozen: Vec::new(),
            mean_ber: s.mean,
            median_ber: s.median,
            stddev_ber: s.stddev,
            min_ber: s.min,
            max_ber: s.max,
            boundary_ber: s.boundary_ber,
        }
    }
}

impl From<&ControversialChannel> for JsonControversial {
    fn from(c: &ControversialChannel) -> Self {
        Self {
            index: c.index,
            rank_variance: c.variance,
        }
    }
}

impl From<&SkippedRun> for JsonSkipped {
    fn from(s: &SkippedRun) -> Self {
        Self {
            file: s.file.clone(),
            reason: s.reason.clone(),
        }
    }
}

impl JsonReport {
    /// Build the JSON document from an analysis report
    pub fn new(report: &AnalysisReport, discovery: Option<&Discovery>) -> Self {
        let config = &report.config;
        let mode = match config.mode {
            crate::config::FreezeMode::InfoBits { .. } => "info-bits",
            crate::config::FreezeMode::Half => "half",
        };
        let rank_method = match config.rank_method {
            crate::rank::RankMethod::Ordinal => "ordinal",
            crate::rank::RankMethod::Average => "average",
        };

        let runs = report
            .runs
            .iter()
            .map(|r| JsonRun {
                frozen: r.frozen.frozen_indices(),
                ..JsonRun::from(&r.summary)
            })
            .collect();

        let matrix = report
            .correlation
            .values
            .iter()
            .map(|row| {
                row.iter()
                    .map(|&v| if v.is_nan() { None } else { Some(v) })
                    .collect()
            })
            .collect();

        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            config: JsonConfig {
                block_length: config.block_length,
                info_bits: config.info_bits(),
                n_frozen: config.n_frozen(),
                mode: mode.to_string(),
                rank_method: rank_method.to_string(),
            },
            discovery: discovery.map(|d| JsonDiscovery {
                search_dir: d.search_dir.display().to_string(),
                fell_back: d.fell_back,
                pattern: d.pattern.clone(),
                files_found: d.files.len(),
            }),
            runs,
            skipped: report.skipped.iter().map(JsonSkipped::from).collect(),
            agreement: JsonAgreement {
                common_count: report.verdict.common,
                target: report.verdict.target,
                passed: report.verdict.passed,
                common_indices: report.agreement.common_indices(),
                disputed_indices: report.agreement.disputed_indices(),
            },
            correlation: JsonCorrelation {
                runs: report.correlation.names.clone(),
                matrix,
            },
            controversial: report
                .controversial
                .iter()
                .map(JsonControversial::from)
                .collect(),
            rank_variance: report.rank_variance.clone(),
        }
    }

    /// Serialize as pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize JSON report")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze;
    use crate::config::AnalysisConfig;
    use crate::run::Run;

    fn report() -> AnalysisReport {
        let runs = vec![
            Run::new("a", vec![0.1, 0.2, 0.3, 0.4]),
            Run::new("b", vec![0.1, 0.2, 0.4, 0.3]),
        ];
        analyze(&runs, &AnalysisConfig::with_info_bits(4, 2)).unwrap()
    }

    #[test]
    fn test_json_report_fields() {
        let json = JsonReport::new(&report(), None);
        assert_eq!(json.config.block_length, 4);
        assert_eq!(json.config.n_frozen, 2);
        assert_eq!(json.config.mode, "info-bits");
        assert_eq!(json.runs.len(), 2);
        assert_eq!(json.runs[0].frozen, vec![2, 3]);
        assert_eq!(json.agreement.common_indices, vec![2, 3]);
        assert!(json.agreement.passed);
        assert_eq!(json.correlation.matrix[0][0], Some(1.0));
        assert!(json.discovery.is_none());
    }

    #[test]
    fn test_json_roundtrip() {
        let text = JsonReport::new(&report(), None).to_json().unwrap();
        let parsed: JsonReport = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.runs[1].name, "b");
        assert_eq!(parsed.controversial.len(), 4);
        assert!(!text.contains("\"discovery\""));
    }

    #[test]
    fn test_nan_coefficient_is_null() {
        let mut r = report();
        r.correlation.values[0][1] = f64::NAN;
        let json = JsonReport::new(&r, None);
        assert_eq!(json.correlation.matrix[0][1], None);
        assert!(json.to_json().unwrap().contains("null"));
    }
}
