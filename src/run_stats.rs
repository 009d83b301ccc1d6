//! Per-run BER summary statistics
//!
//! Mean, min and max come from trueno's SIMD vector statistics; the median
//! uses aprender's `DescriptiveStats` quantiles. Spread is computed in f64
//! around the mean, never as f32 `E[x²] - mean²`.

use crate::freezer::FrozenSet;
use crate::run::Run;
use anyhow::{bail, Context, Result};
use aprender::stats::DescriptiveStats;
use serde::Serialize;
use trueno::Vector;

/// Summary of one run's BER distribution
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub name: String,
    pub mean: f64,
    /// Population standard deviation
    pub stddev: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    /// Lowest BER among frozen channels (None when nothing is frozen)
    pub boundary_ber: Option<f64>,
    /// Number of frozen channels
    pub frozen: usize,
}

/// Population variance (divide by n), two-pass in f64
///
/// Identical values give exactly 0 and the result is never negative.
///
/// # Example
/// ```
/// use frozen_audit::run_stats::population_variance;
///
/// assert_eq!(population_variance(&[4000.0, 4001.0]), 0.25);
/// assert_eq!(population_variance(&[0.1, 0.1, 0.1]), 0.0);
/// ```
pub fn population_variance(values: &[f64]) -> f64 {
    let Some(&first) = values.first() else {
        return 0.0;
    };
    if values.iter().all(|&v| v == first) {
        return 0.0;
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let sum_sq: f64 = values
        .iter()
        .map(|&v| {
            let d = v - mean;
            d * d
        })
        .sum();
    (sum_sq / n).max(0.0)
}

/// Summarize a run together with its frozen set
pub fn summarize(run: &Run, frozen: &FrozenSet) -> Result<RunSummary> {
    if run.ber.is_empty() {
        bail!("Cannot summarize empty run {}", run.name);
    }

    let values: Vec<f32> = run.ber.iter().map(|&v| v as f32).collect();
    let v = Vector::from_slice(&values);

    let mean = v
        .mean()
        .with_context(|| format!("Failed to compute mean BER for {}", run.name))?;
    let stddev = population_variance(&run.ber).sqrt();
    let min = v.min().unwrap_or(0.0);
    let max = v.max().unwrap_or(0.0);

    let median = DescriptiveStats::new(&v)
        .quantile(0.5)
        .map_err(|e| anyhow::anyhow!("Failed to compute median BER for {}: {}", run.name, e))?;

    let boundary_ber = frozen
        .selection_order()
        .last()
        .map(|&index| run.ber[index]);

    Ok(RunSummary {
        name: run.name.clone(),
        mean: f64::from(mean),
        stddev,
        min: f64::from(min),
        max: f64::from(max),
        median: f64::from(median),
        boundary_ber,
        frozen: frozen.frozen_count(),
    })
}
