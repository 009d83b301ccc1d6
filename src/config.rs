//! Analysis configuration
//!
//! Every parameter of an analysis session lives in [`AnalysisConfig`] and is
//! passed explicitly into the loader and analyzer, so several analyses with
//! different block lengths can run in one process.
//!
//! # Example analysis.toml
//!
//! ```toml
//! block_length = 256
//! info_bits = 128
//! input_dir = "results_256"
//! file_pattern = "*.csv"
//! top_controversial = 8
//! rank_method = "average"
//!
//! [density]
//! bandwidth_adjust = 0.3
//! ```
//!
//! Setting `mode = "half"` instead of `info_bits` freezes N/2 channels.

use crate::density::DensityConfig;
use crate::rank::RankMethod;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// How many channels each run freezes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum FreezeMode {
    /// Fixed information-bit count: freeze N - K channels
    InfoBits { k: usize },
    /// Freeze half of the block
    Half,
}

/// Parameters of one frozen-set analysis
///
/// # Example
/// ```
/// use frozen_audit::config::AnalysisConfig;
///
/// let config = AnalysisConfig::default();
/// assert_eq!(config.block_length, 128);
/// assert_eq!(config.n_frozen(), 64);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisConfig {
    /// Block length N (expected rows per run)
    pub block_length: usize,
    /// Frozen-count rule
    pub mode: FreezeMode,
    /// Directory holding one table per run (None = `results_<N>`)
    pub input_dir: Option<PathBuf>,
    /// File-name pattern selecting run tables
    pub file_pattern: String,
    /// Number of controversial channels to report
    pub top_controversial: usize,
    /// Tie handling for the rank transform
    pub rank_method: RankMethod,
    /// Density spectrum settings
    pub density: DensityConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            block_length: 128,
            mode: FreezeMode::InfoBits { k: 64 },
            input_dir: None,
            file_pattern: "*.csv".to_string(),
            top_controversial: 5,
            rank_method: RankMethod::Ordinal,
            density: DensityConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Fixed-K analysis of length-`n` blocks
    pub fn with_info_bits(n: usize, k: usize) -> Self {
        Self {
            block_length: n,
            mode: FreezeMode::InfoBits { k },
            ..Self::default()
        }
    }

    /// Half-frozen analysis of length-`n` blocks
    pub fn half(n: usize) -> Self {
        Self {
            block_length: n,
            mode: FreezeMode::Half,
            ..Self::default()
        }
    }

    /// Number of channels each run freezes
    pub fn n_frozen(&self) -> usize {
        match self.mode {
            FreezeMode::InfoBits { k } => self.block_length.saturating_sub(k),
            FreezeMode::Half => self.block_length / 2,
        }
    }

    /// Number of information channels (N - n_frozen)
    pub fn info_bits(&self) -> usize {
        self.block_length - self.n_frozen()
    }

    /// Directory to search for run tables
    pub fn resolved_input_dir(&self) -> PathBuf {
        self.input_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("results_{}", self.block_length)))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.block_length == 0 {
            return Err("block_length must be positive".to_string());
        }

        if let FreezeMode::InfoBits { k } = self.mode {
            if k > self.block_length {
                return Err(format!(
                    "info_bits ({}) must not exceed block_length ({})",
                    k, self.block_length
                ));
            }
        }

        if self.top_controversial == 0 {
            return Err("top_controversial must be at least 1".to_string());
        }

        if self.file_pattern.trim().is_empty() {
            return Err("file_pattern must not be empty".to_string());
        }

        self.density.validate()
    }

    /// Load a configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid configuration in {}", path.display()))
    }

    /// Load a configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content).context("Failed to parse TOML")?;
        let mut config = Self::default();
        file.apply_to(&mut config);
        Ok(config)
    }
}

/// Mode name as written in configuration files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModeName {
    InfoBits,
    Half,
}

/// On-disk configuration; every field optional, unset fields keep defaults
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub block_length: Option<usize>,
    pub info_bits: Option<usize>,
    pub mode: Option<ModeName>,
    pub input_dir: Option<PathBuf>,
    pub file_pattern: Option<String>,
    pub top_controversial: Option<usize>,
    pub rank_method: Option<RankMethod>,
    pub density: Option<DensityFile>,
}

/// On-disk density settings
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DensityFile {
    pub bandwidth_adjust: Option<f64>,
    pub grid_points: Option<usize>,
    pub range_min: Option<f64>,
    pub range_max: Option<f64>,
}

impl ConfigFile {
    /// Overlay the fields that are set onto `config`
    ///
    /// An explicit `info_bits` selects fixed-K mode; `mode = "half"` wins
    /// over it. Changing `block_length` without `info_bits` resets K to N/2.
    pub fn apply_to(&self, config: &mut AnalysisConfig) {
        if let Some(n) = self.block_length {
            config.block_length = n;
        }

        config.mode = match (self.mode, self.info_bits) {
            (Some(ModeName::Half), _) => FreezeMode::Half,
            (_, Some(k)) => FreezeMode::InfoBits { k },
            (Some(ModeName::InfoBits), None) => FreezeMode::InfoBits {
                k: config.block_length / 2,
            },
            (None, None) => match config.mode {
                FreezeMode::InfoBits { .. } if self.block_length.is_some() => {
                    FreezeMode::InfoBits {
                        k: config.block_length / 2,
                    }
                }
                unchanged => unchanged,
            },
        };

        if let Some(dir) = &self.input_dir {
            config.input_dir = Some(dir.clone());
        }
        if let Some(pattern) = &self.file_pattern {
            config.file_pattern = pattern.clone();
        }
        if let Some(top) = self.top_controversial {
            config.top_controversial = top;
        }
        if let Some(method) = self.rank_method {
            config.rank_method = method;
        }
        if let Some(density) = &self.density {
            if let Some(adjust) = density.bandwidth_adjust {
                config.density.bandwidth_adjust = adjust;
            }
            if let Some(points) = density.grid_points {
                config.density.grid_points = points;
            }
            if let Some(min) = density.range_min {
                config.density.range_min = min;
            }
            if let Some(max) = density.range_max {
                config.density.range_max = max;
            }
        }
    }
}
