// Rank correlation and controversy analysis across simulation runs
//
// Two runs agree on a polar-code construction when they order channels the
// same way, even if the absolute BER values differ (different SNR, different
// number of simulated frames). This module therefore works on ranks:
//
// - Spearman correlation: Pearson correlation of the per-run rank vectors,
//   one coefficient per pair of runs
// - Rank variance: for each channel, the variance of its rank over all runs;
//   the highest-variance channels are the "controversial" ones that sit in
//   the transition region between reliable and frozen
//
// Variance uses the population convention (divide by the number of runs)
// and is computed in f64: ranks reach N, and f32 `E[x²] - mean²` cancels
// to noise well before N = 4096.

mod controversy;
mod correlation;
mod ranking;

pub use controversy::{most_controversial, rank_variance, ControversialChannel};
pub use correlation::{pearson, spearman, spearman_matrix, CorrelationMatrix};
pub use ranking::{rank, rank_runs, RankMethod};
