//! CLI argument parsing for frozen-audit

use crate::config::{AnalysisConfig, ConfigFile, ModeName};
use crate::rank::RankMethod;
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for the analysis report
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    Text,
    /// JSON format for machine parsing
    Json,
    /// CSV agreement matrix for spreadsheet analysis
    Csv,
}

#[derive(Parser, Debug)]
#[command(name = "frozen-audit")]
#[command(version)]
#[command(about = "Polar-code frozen-bit selection and cross-run agreement analysis", long_about = None)]
pub struct Cli {
    /// Directory with one BER table per simulation run (default: results_<N>)
    #[arg(short = 'd', long = "dir", value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Block length N (expected rows per run)
    #[arg(short = 'N', long = "block-length", value_name = "N")]
    pub block_length: Option<usize>,

    /// Information bits K; N-K channels are frozen (default: N/2)
    #[arg(short = 'K', long = "info-bits", value_name = "K", conflicts_with = "half")]
    pub info_bits: Option<usize>,

    /// Freeze half of the block instead of N-K channels
    #[arg(long = "half")]
    pub half: bool,

    /// File pattern selecting run tables
    #[arg(long = "pattern", value_name = "GLOB")]
    pub pattern: Option<String>,

    /// Number of controversial channels to report
    #[arg(long = "top", value_name = "COUNT")]
    pub top: Option<usize>,

    /// How tied BER values are ranked
    #[arg(long = "rank-method", value_enum)]
    pub rank_method: Option<RankMethod>,

    /// TOML configuration file (command-line flags override it)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Also write an HTML report (heatmaps and density spectrum) to FILE
    #[arg(long = "html", value_name = "FILE")]
    pub html: Option<PathBuf>,

    /// Enable debug tracing on stderr
    #[arg(long = "debug")]
    pub debug: bool,
}

impl Cli {
    /// Flags that override the configuration file
    pub fn overrides(&self) -> ConfigFile {
        ConfigFile {
            block_length: self.block_length,
            info_bits: self.info_bits,
            mode: self.half.then_some(ModeName::Half),
            input_dir: self.dir.clone(),
            file_pattern: self.pattern.clone(),
            top_controversial: self.top,
            rank_method: self.rank_method,
            density: None,
        }
    }

    /// Resolve the analysis configuration: defaults, then file, then flags
    pub fn to_config(&self) -> Result<AnalysisConfig> {
        let mut config = match &self.config {
            Some(path) => AnalysisConfig::from_file(path)?,
            None => AnalysisConfig::default(),
        };
        self.overrides().apply_to(&mut config);
        config.validate().map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;
        Ok(config)
    }
}
