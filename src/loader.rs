//! Run Loader: discover and parse per-run BER tables
//!
//! # Table contract
//!
//! Each file holds one simulation run. The first line is a header and is
//! ignored. Columns are positional, not named: column 1 is the channel
//! index, column 2 is the BER, any further columns are ignored. A run is
//! accepted only if it has exactly N data rows and its indices cover
//! `[0, N)` once each. Rows may appear in any order; the loaded run is
//! sorted by index.
//!
//! Per-file failures never abort loading: the file is recorded as skipped
//! with the reason, and the remaining files are still processed.

use crate::config::AnalysisConfig;
use crate::pattern::FilePattern;
use crate::run::Run;
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Why a run table was rejected
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("file is empty")]
    Empty,

    #[error("line {line}: expected at least 2 columns, found {found}")]
    NotEnoughColumns { line: usize, found: usize },

    #[error("has {found} rows, expected N={expected}")]
    RowCount { found: usize, expected: usize },

    #[error("line {line}: invalid channel index {value:?}")]
    InvalidIndex { line: usize, value: String },

    #[error("line {line}: invalid BER {value:?}")]
    InvalidBer { line: usize, value: String },

    #[error("line {line}: channel index {index} outside [0, {block_length})")]
    IndexOutOfRange {
        line: usize,
        index: usize,
        block_length: usize,
    },

    #[error("line {line}: duplicate channel index {index}")]
    DuplicateIndex { line: usize, index: usize },
}

/// A file that was excluded from the analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRun {
    /// File name (without directory)
    pub file: String,
    /// Human-readable reason
    pub reason: String,
}

/// Result of searching for run tables
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Discovery {
    /// Directory that was actually searched
    pub search_dir: PathBuf,
    /// True when the configured directory was missing and `.` was used
    pub fell_back: bool,
    /// Pattern used to select files
    pub pattern: String,
    /// Matching files, sorted by name
    pub files: Vec<PathBuf>,
}

/// Runs that loaded cleanly plus the files that were skipped
#[derive(Debug)]
pub struct LoadOutcome {
    pub discovery: Discovery,
    pub runs: Vec<Run>,
    pub skipped: Vec<SkippedRun>,
}

/// Split one CSV line into fields, honouring double-quoted fields
fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

/// Parse a channel index; integral floats such as `3.0` are accepted
fn parse_index(field: &str) -> Option<usize> {
    let field = field.trim();
    if let Ok(index) = field.parse::<usize>() {
        return Some(index);
    }
    let value = field.parse::<f64>().ok()?;
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= usize::MAX as f64 {
        Some(value as usize)
    } else {
        None
    }
}

/// Parse a BER value; must be a finite number
fn parse_ber(field: &str) -> Option<f64> {
    field
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Parse the text of one run table
///
/// # Example
/// ```
/// use frozen_audit::loader::parse_run;
///
/// let text = "idx,ber\n1,0.25\n0,0.5\n";
/// let run = parse_run("snr_0db", text, 2).unwrap();
/// assert_eq!(run.ber, vec![0.5, 0.25]);
/// ```
pub fn parse_run(name: &str, text: &str, block_length: usize) -> Result<Run, LoadError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    // (line number, fields) for every non-blank line
    let mut lines = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| (i + 1, split_fields(line)));

    let (header_line, header) = lines.next().ok_or(LoadError::Empty)?;
    if header.len() < 2 {
        return Err(LoadError::NotEnoughColumns {
            line: header_line,
            found: header.len(),
        });
    }

    let rows: Vec<(usize, Vec<String>)> = lines.collect();
    if rows.len() != block_length {
        return Err(LoadError::RowCount {
            found: rows.len(),
            expected: block_length,
        });
    }

    let mut ber = vec![0.0; block_length];
    let mut seen = HashSet::with_capacity(block_length);
    for (line, fields) in rows {
        if fields.len() < 2 {
            return Err(LoadError::NotEnoughColumns {
                line,
                found: fields.len(),
            });
        }

        let index = parse_index(&fields[0]).ok_or_else(|| LoadError::InvalidIndex {
            line,
            value: fields[0].clone(),
        })?;
        let value = parse_ber(&fields[1]).ok_or_else(|| LoadError::InvalidBer {
            line,
            value: fields[1].clone(),
        })?;

        if index >= block_length {
            return Err(LoadError::IndexOutOfRange {
                line,
                index,
                block_length,
            });
        }
        if !seen.insert(index) {
            return Err(LoadError::DuplicateIndex { line, index });
        }
        ber[index] = value;
    }

    Ok(Run::new(name, ber))
}

/// Read and parse one run table from disk
pub fn load_file(path: &Path, name: &str, block_length: usize) -> Result<Run, LoadError> {
    let text = fs::read_to_string(path)?;
    Ok(parse_run(name, &text, block_length)?.with_source(path))
}

/// Find run tables for `config`
///
/// Searches the configured directory; if it does not exist, falls back to
/// the current directory with the same pattern.
pub fn discover(config: &AnalysisConfig) -> Result<Discovery> {
    let pattern = FilePattern::new(&config.file_pattern)?;
    let configured = config.resolved_input_dir();

    let (search_dir, fell_back) = if configured.is_dir() {
        (configured, false)
    } else {
        tracing::debug!(
            "Input directory {} not found, searching current directory",
            configured.display()
        );
        (PathBuf::from("."), true)
    };

    let mut files = Vec::new();
    let entries = fs::read_dir(&search_dir)
        .with_context(|| format!("Failed to list {}", search_dir.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("Failed to list {}", search_dir.display()))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let matched = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| pattern.matches(n));
        if matched {
            files.push(path);
        }
    }
    files.sort();

    Ok(Discovery {
        search_dir,
        fell_back,
        pattern: pattern.as_str().to_string(),
        files,
    })
}

/// Run name for a file: its stem, or the full file name if the stem is taken
fn run_name(path: &Path, taken: &HashSet<String>) -> String {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = path
        .file_stem()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.clone());

    if taken.contains(&stem) {
        file_name
    } else {
        stem
    }
}

/// Load every run table selected by `config`
///
/// Only listing the search directory can fail; per-file problems end up in
/// [`LoadOutcome::skipped`].
pub fn load_runs(config: &AnalysisConfig) -> Result<LoadOutcome> {
    let discovery = discover(config)?;
    let (runs, skipped) = load_files(&discovery.files, config.block_length);

    Ok(LoadOutcome {
        discovery,
        runs,
        skipped,
    })
}

/// Load a list of files, isolating per-file failures
pub fn load_files(files: &[PathBuf], block_length: usize) -> (Vec<Run>, Vec<SkippedRun>) {
    let mut runs = Vec::new();
    let mut skipped = Vec::new();
    let mut taken = HashSet::new();

    for path in files {
        let file = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let name = run_name(path, &taken);

        match load_file(path, &name, block_length) {
            Ok(run) => {
                tracing::debug!("Loaded run {} ({} channels)", name, run.block_length());
                taken.insert(name);
                runs.push(run);
            }
            Err(e) => {
                tracing::warn!("Skipping {}: {}", file, e);
                skipped.push(SkippedRun {
                    file,
                    reason: e.to_string(),
                });
            }
        }
    }

    (runs, skipped)
}
