//! Frozen-bit selection for a single run
//!
//! A polar code of length N carrying K information bits freezes the N-K
//! least reliable channels. Reliability is measured here by simulated BER:
//! the channels with the highest BER are frozen.

use anyhow::{bail, Result};
use serde::Serialize;

/// Frozen/reliable labelling of every channel in one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrozenSet {
    /// `labels[i]` is true when channel `i` is frozen
    labels: Vec<bool>,
    /// Frozen indices in selection order (highest BER first)
    selection: Vec<usize>,
}

impl FrozenSet {
    /// Label per channel index (true = frozen)
    pub fn labels(&self) -> &[bool] {
        &self.labels
    }

    /// Whether channel `index` is frozen
    pub fn is_frozen(&self, index: usize) -> bool {
        self.labels.get(index).copied().unwrap_or(false)
    }

    /// Frozen channel indices, ascending
    pub fn frozen_indices(&self) -> Vec<usize> {
        (0..self.labels.len()).filter(|&i| self.labels[i]).collect()
    }

    /// Reliable (information) channel indices, ascending
    pub fn reliable_indices(&self) -> Vec<usize> {
        (0..self.labels.len()).filter(|&i| !self.labels[i]).collect()
    }

    /// Frozen indices ordered from highest to lowest BER
    pub fn selection_order(&self) -> &[usize] {
        &self.selection
    }

    /// Number of frozen channels
    pub fn frozen_count(&self) -> usize {
        self.selection.len()
    }

    /// Block length the labelling covers
    pub fn block_length(&self) -> usize {
        self.labels.len()
    }
}

/// Freeze the `n_frozen` channels with the highest BER
///
/// Channels are ordered by BER descending; equal BER values keep ascending
/// index order, so at the selection boundary the lower index is frozen first.
///
/// # Example
/// ```
/// use frozen_audit::freezer::select_frozen;
///
/// let frozen = select_frozen(&[0.1, 0.4, 0.3, 0.2], 2).unwrap();
/// assert_eq!(frozen.frozen_indices(), vec![1, 2]);
/// assert_eq!(frozen.reliable_indices(), vec![0, 3]);
/// ```
pub fn select_frozen(ber: &[f64], n_frozen: usize) -> Result<FrozenSet> {
    if n_frozen > ber.len() {
        bail!(
            "Cannot freeze {} channels in a block of length {}",
            n_frozen,
            ber.len()
        );
    }

    let mut order: Vec<usize> = (0..ber.len()).collect();
    order.sort_by(|&a, &b| ber[b].total_cmp(&ber[a]));
    order.truncate(n_frozen);

    let mut labels = vec![false; ber.len()];
    for &index in &order {
        labels[index] = true;
    }

    Ok(FrozenSet {
        labels,
        selection: order,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_freeze_highest_ber() {
        let frozen = select_frozen(&[0.1, 0.2, 0.3, 0.4], 2).unwrap();
        assert_eq!(frozen.frozen_indices(), vec![2, 3]);
        assert_eq!(frozen.selection_order(), &[3, 2]);
    }

    #[test]
    fn test_freeze_none() {
        let frozen = select_frozen(&[0.1, 0.2, 0.3], 0).unwrap();
        assert!(frozen.frozen_indices().is_empty());
        assert_eq!(frozen.reliable_indices(), vec![0, 1, 2]);
    }

    #[test]
    fn test_freeze_all() {
        let frozen = select_frozen(&[0.1, 0.2, 0.3], 3).unwrap();
        assert_eq!(frozen.frozen_indices(), vec![0, 1, 2]);
        assert!(frozen.reliable_indices().is_empty());
    }

    #[test]
    fn test_freeze_too_many() {
        assert!(select_frozen(&[0.1, 0.2], 3).is_err());
    }

    #[test]
    fn test_boundary_tie_prefers_lower_index() {
        // Channels 1, 2 and 3 tie; only two slots remain after channel 0
        let frozen = select_frozen(&[0.5, 0.3, 0.3, 0.3, 0.1], 3).unwrap();
        assert_eq!(frozen.frozen_indices(), vec![0, 1, 2]);
    }

    #[test]
    fn test_labels_partition_domain() {
        let frozen = select_frozen(&[0.05, 0.5, 0.25, 0.45, 0.0, 0.3], 3).unwrap();
        let mut all = frozen.frozen_indices();
        all.extend(frozen.reliable_indices());
        all.sort_unstable();
        assert_eq!(all, (0..6).collect::<Vec<_>>());
        assert_eq!(frozen.frozen_count(), 3);
        assert_eq!(frozen.block_length(), 6);
    }

    #[test]
    fn test_is_frozen_out_of_range() {
        let frozen = select_frozen(&[0.1, 0.2], 1).unwrap();
        assert!(frozen.is_frozen(1));
        assert!(!frozen.is_frozen(0));
        assert!(!frozen.is_frozen(7));
    }
}
