//! Simulation run: one BER measurement per channel index

use serde::Serialize;
use std::path::PathBuf;

/// A named BER table produced by one simulator run
///
/// `ber[i]` is the measured bit error rate of channel index `i`. A run that
/// reached the analyzer through the loader is dense over `[0, N)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Run {
    /// Display name (file stem of the source table)
    pub name: String,
    /// Source file, if the run was loaded from disk
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
    /// BER per channel index
    pub ber: Vec<f64>,
}

impl Run {
    /// Create an in-memory run
    pub fn new(name: impl Into<String>, ber: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            source: None,
            ber,
        }
    }

    /// Attach the file this run was read from
    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Number of channels (rows) in this run
    pub fn block_length(&self) -> usize {
        self.ber.len()
    }
}
