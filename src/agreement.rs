//! Cross-run agreement on the frozen set
//!
//! Builds the run × channel agreement matrix and the COMMON row: a channel
//! is commonly frozen only when every contributing run froze it.

use crate::freezer::FrozenSet;
use anyhow::{bail, Result};
use serde::Serialize;

/// Label of the synthetic row holding the intersection
pub const COMMON_ROW: &str = "COMMON";

/// Run × channel frozen labels plus the COMMON intersection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgreementMatrix {
    /// Run names (row order, sorted)
    pub runs: Vec<String>,
    /// `rows[r][i]` is true when run `r` froze channel `i`
    pub rows: Vec<Vec<bool>>,
    /// Number of runs that froze each channel
    pub counts: Vec<usize>,
    /// Channels frozen by every run
    pub common: Vec<bool>,
}

impl AgreementMatrix {
    /// Build the matrix from per-run frozen sets
    ///
    /// Rows are sorted by run name, so the result does not depend on the
    /// order in which runs are supplied.
    pub fn from_frozen_sets(sets: &[(String, FrozenSet)]) -> Result<Self> {
        let Some((_, first)) = sets.first() else {
            bail!("Cannot build an agreement matrix without runs");
        };
        let block_length = first.block_length();
        if let Some((name, _)) = sets.iter().find(|(_, s)| s.block_length() != block_length) {
            bail!(
                "Run {} does not cover the same {} channels as the others",
                name,
                block_length
            );
        }

        let mut ordered: Vec<&(String, FrozenSet)> = sets.iter().collect();
        ordered.sort_by(|a, b| a.0.cmp(&b.0));

        let mut counts = vec![0usize; block_length];
        for (_, set) in &ordered {
            for (count, &frozen) in counts.iter_mut().zip(set.labels()) {
                if frozen {
                    *count += 1;
                }
            }
        }
        let common = counts.iter().map(|&c| c == ordered.len()).collect();

        Ok(Self {
            runs: ordered.iter().map(|(name, _)| name.clone()).collect(),
            rows: ordered.iter().map(|(_, s)| s.labels().to_vec()).collect(),
            counts,
            common,
        })
    }

    /// Channels frozen by every run, ascending
    pub fn common_indices(&self) -> Vec<usize> {
        (0..self.common.len()).filter(|&i| self.common[i]).collect()
    }

    /// Size of the COMMON set
    pub fn common_count(&self) -> usize {
        self.common.iter().filter(|&&c| c).count()
    }

    /// Channels frozen by some runs but not all, ascending
    pub fn disputed_indices(&self) -> Vec<usize> {
        (0..self.counts.len())
            .filter(|&i| self.counts[i] > 0 && self.counts[i] < self.runs.len())
            .collect()
    }

    /// Number of channel columns
    pub fn block_length(&self) -> usize {
        self.counts.len()
    }

    /// Compare the COMMON set against the expected frozen count
    pub fn verdict(&self, target: usize) -> AgreementVerdict {
        let common = self.common_count();
        AgreementVerdict {
            common,
            target,
            passed: common == target,
        }
    }
}

/// Pass/fail judgement on the COMMON set size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AgreementVerdict {
    /// Channels frozen by every run
    pub common: usize,
    /// Expected frozen count (`n_frozen`)
    pub target: usize,
    /// True when every run froze exactly the same set
    pub passed: bool,
}

impl AgreementVerdict {
    /// One-line console message
    pub fn message(&self) -> String {
        if self.passed {
            "SUCCESS: all runs agree exactly on the frozen set.".to_string()
        } else {
            format!(
                "WARNING: disagreement found. Only {} indices are universally frozen.",
                self.common
            )
        }
    }
}
