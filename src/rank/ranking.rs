// Rank transform for BER vectors

use crate::run::Run;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// How equal BER values are ranked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum RankMethod {
    /// Distinct ranks 1..N; equal values ordered by ascending channel index
    #[default]
    Ordinal,
    /// Equal values share the mean of the positions they occupy
    Average,
}

/// Rank values in ascending order, starting at 1
///
/// Sorting is stable over `f64::total_cmp`, so with [`RankMethod::Ordinal`]
/// ties resolve to the lower index first and the result is deterministic
/// regardless of how the values were produced.
///
/// # Example
/// ```
/// use frozen_audit::rank::{rank, RankMethod};
///
/// let ranks = rank(&[0.3, 0.1, 0.2], RankMethod::Ordinal);
/// assert_eq!(ranks, vec![3.0, 1.0, 2.0]);
/// ```
pub fn rank(values: &[f64], method: RankMethod) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    match method {
        RankMethod::Ordinal => {
            for (position, &index) in order.iter().enumerate() {
                ranks[index] = (position + 1) as f64;
            }
        }
        RankMethod::Average => {
            let mut start = 0;
            while start < order.len() {
                let mut end = start + 1;
                while end < order.len() && values[order[end]] == values[order[start]] {
                    end += 1;
                }
                // Positions start+1 ..= end share their mean
                let shared = (start + 1 + end) as f64 / 2.0;
                for &index in &order[start..end] {
                    ranks[index] = shared;
                }
                start = end;
            }
        }
    }
    ranks
}

/// Rank every run's BER vector
pub fn rank_runs(runs: &[Run], method: RankMethod) -> Vec<Vec<f64>> {
    runs.iter().map(|run| rank(&run.ber, method)).collect()
}
