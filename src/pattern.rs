//! File-name patterns for run discovery
//!
//! Supports shell-style wildcards:
//! - `*` matches any run of characters (not crossing `/`)
//! - `?` matches exactly one character
//! - everything else matches literally
//!
//! As in shell globbing, names starting with `.` are hidden from wildcards:
//! `*.csv` skips `.partial.csv`, while `.*.csv` matches it.

use anyhow::{bail, Context, Result};
use regex::Regex;

/// Compiled file-name pattern (e.g. `*.csv`, `run_??.txt`)
#[derive(Debug, Clone)]
pub struct FilePattern {
    glob: String,
    regex: Regex,
    /// Whether the pattern itself starts with a literal `.`
    matches_hidden: bool,
}

impl FilePattern {
    /// Compile a wildcard pattern into an anchored regex
    pub fn new(glob: &str) -> Result<Self> {
        let glob = glob.trim();
        if glob.is_empty() {
            bail!("Invalid file pattern: pattern must not be empty");
        }

        let mut expr = String::with_capacity(glob.len() * 2 + 2);
        expr.push('^');
        for c in glob.chars() {
            match c {
                '*' => expr.push_str("[^/]*"),
                '?' => expr.push_str("[^/]"),
                other => expr.push_str(&regex::escape(&other.to_string())),
            }
        }
        expr.push('$');

        let regex = Regex::new(&expr)
            .with_context(|| format!("Invalid file pattern: {}", glob))?;

        Ok(Self {
            glob: glob.to_string(),
            regex,
            matches_hidden: glob.starts_with('.'),
        })
    }

    /// Check whether a bare file name matches the pattern
    pub fn matches(&self, file_name: &str) -> bool {
        if file_name.starts_with('.') && !self.matches_hidden {
            return false;
        }
        self.regex.is_match(file_name)
    }

    /// The original wildcard text
    pub fn as_str(&self) -> &str {
        &self.glob
    }
}
