// Per-channel rank variance and "controversial" channel selection

use crate::run_stats::population_variance;
use anyhow::{bail, Result};
use serde::Serialize;

/// A channel whose rank disagrees across runs
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ControversialChannel {
    /// Channel index
    pub index: usize,
    /// Population variance of the channel's rank over all runs
    pub variance: f64,
}

/// Variance of each channel's rank across runs
///
/// `ranks[r][i]` is the rank of channel `i` in run `r`. Population variance
/// in f64, so a channel scores 0 exactly when every run gives it the same
/// rank, even at ranks in the thousands. With a single run every variance
/// is 0.
pub fn rank_variance(ranks: &[Vec<f64>]) -> Result<Vec<f64>> {
    let Some(first) = ranks.first() else {
        bail!("Cannot compute rank variance without runs");
    };
    let channels = first.len();
    if ranks.iter().any(|r| r.len() != channels) {
        bail!("All runs must rank the same number of channels");
    }

    if ranks.len() < 2 {
        return Ok(vec![0.0; channels]);
    }

    let mut variances = Vec::with_capacity(channels);
    let mut column = Vec::with_capacity(ranks.len());
    for index in 0..channels {
        column.clear();
        column.extend(ranks.iter().map(|r| r[index]));
        variances.push(population_variance(&column));
    }

    Ok(variances)
}

/// The `k` channels with the highest rank variance
///
/// Sorted by variance descending, ties by ascending channel index.
pub fn most_controversial(variances: &[f64], k: usize) -> Vec<ControversialChannel> {
    let mut channels: Vec<ControversialChannel> = variances
        .iter()
        .enumerate()
        .map(|(index, &variance)| ControversialChannel { index, variance })
        .collect();

    channels.sort_by(|a, b| {
        b.variance
            .total_cmp(&a.variance)
            .then_with(|| a.index.cmp(&b.index))
    });
    channels.truncate(k);
    channels
}
