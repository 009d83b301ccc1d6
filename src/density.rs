//! BER density spectrum (kernel density estimate per run)
//!
//! A well-polarized channel set shows two sharp peaks: near 0 (reliable)
//! and near 0.5 (useless). The spectrum is a Gaussian KDE evaluated on a
//! fixed grid over the valid BER range so that curves of different runs
//! share the same axes.

use crate::run_stats::population_variance;
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Density estimation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DensityConfig {
    /// Multiplier applied to Scott's-rule bandwidth (smaller = sharper peaks)
    pub bandwidth_adjust: f64,
    /// Number of evaluation points on the grid
    pub grid_points: usize,
    /// Lower bound of the displayed BER range
    pub range_min: f64,
    /// Upper bound of the displayed BER range
    pub range_max: f64,
}

impl Default for DensityConfig {
    fn default() -> Self {
        Self {
            bandwidth_adjust: 0.3,
            grid_points: 200,
            range_min: 0.0,
            range_max: 0.5,
        }
    }
}

impl DensityConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(self.bandwidth_adjust > 0.0 && self.bandwidth_adjust.is_finite()) {
            return Err(format!(
                "bandwidth_adjust must be positive, got {}",
                self.bandwidth_adjust
            ));
        }
        if self.grid_points < 2 {
            return Err(format!(
                "grid_points must be >= 2, got {}",
                self.grid_points
            ));
        }
        if !(self.range_min < self.range_max) {
            return Err(format!(
                "range_min ({}) must be below range_max ({})",
                self.range_min, self.range_max
            ));
        }
        Ok(())
    }

    /// Evenly spaced evaluation grid, endpoints included
    pub fn grid(&self) -> Vec<f64> {
        let step = (self.range_max - self.range_min) / (self.grid_points - 1) as f64;
        (0..self.grid_points)
            .map(|i| self.range_min + step * i as f64)
            .collect()
    }
}

/// Density curve of one run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DensityCurve {
    pub name: String,
    /// Kernel standard deviation actually used (0 for degenerate runs)
    pub bandwidth: f64,
    /// Density at each grid point
    pub density: Vec<f64>,
}

impl DensityCurve {
    /// Highest density value on the grid
    pub fn peak(&self) -> f64 {
        self.density.iter().copied().fold(0.0, f64::max)
    }
}

/// Density curves of all runs on a shared grid
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DensitySpectrum {
    pub grid: Vec<f64>,
    pub curves: Vec<DensityCurve>,
}

impl DensitySpectrum {
    /// Highest density over all curves
    pub fn peak(&self) -> f64 {
        self.curves.iter().map(DensityCurve::peak).fold(0.0, f64::max)
    }
}

/// Scott's-rule kernel bandwidth scaled by `adjust`
///
/// `h = adjust * n^(-1/5) * s`, with `s` the sample standard deviation.
/// Returns 0 for fewer than two samples or constant samples.
pub fn scott_bandwidth(samples: &[f64], adjust: f64) -> f64 {
    let n = samples.len();
    if n < 2 {
        return 0.0;
    }

    let n = n as f64;
    let sample_std = (population_variance(samples) * n / (n - 1.0)).sqrt();
    if !sample_std.is_finite() {
        return 0.0;
    }

    adjust * n.powf(-0.2) * sample_std
}

/// Gaussian KDE of `samples` evaluated at each grid point
pub fn estimate(samples: &[f64], grid: &[f64], bandwidth: f64) -> Vec<f64> {
    if samples.is_empty() || bandwidth <= 0.0 {
        return vec![0.0; grid.len()];
    }

    let norm = 1.0 / (samples.len() as f64 * bandwidth * (2.0 * std::f64::consts::PI).sqrt());
    grid.iter()
        .map(|&x| {
            let sum: f64 = samples
                .iter()
                .map(|&xi| {
                    let z = (x - xi) / bandwidth;
                    (-0.5 * z * z).exp()
                })
                .sum();
            sum * norm
        })
        .collect()
}

/// Compute the density spectrum for named BER series
pub fn spectrum<'a, I>(series: I, config: &DensityConfig) -> Result<DensitySpectrum>
where
    I: IntoIterator<Item = (&'a str, &'a [f64])>,
{
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    let grid = config.grid();
    let mut curves = Vec::new();
    for (name, samples) in series {
        let bandwidth = scott_bandwidth(samples, config.bandwidth_adjust);
        let density = estimate(samples, &grid, bandwidth);
        curves.push(DensityCurve {
            name: name.to_string(),
            bandwidth,
            density,
        });
    }

    Ok(DensitySpectrum { grid, curves })
}
