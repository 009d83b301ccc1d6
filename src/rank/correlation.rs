// Spearman rank correlation between runs

use crate::rank::ranking::{rank, RankMethod};
use crate::run::Run;
use serde::Serialize;

/// Pearson correlation coefficient of two equal-length series
///
/// Returns NaN when either series has zero variance or the lengths differ,
/// and clamps the result to `[-1, 1]` against rounding.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.is_empty() {
        return f64::NAN;
    }

    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    let denom = (sxx * syy).sqrt();
    if denom > 0.0 {
        (sxy / denom).clamp(-1.0, 1.0)
    } else {
        f64::NAN
    }
}

/// Spearman rank correlation of two BER series
///
/// # Example
/// ```
/// use frozen_audit::rank::{spearman, RankMethod};
///
/// let a = [0.1, 0.2, 0.3, 0.4];
/// let b = [0.01, 0.02, 0.03, 0.04]; // same ordering, different scale
/// assert_eq!(spearman(&a, &b, RankMethod::Ordinal), 1.0);
/// ```
pub fn spearman(x: &[f64], y: &[f64], method: RankMethod) -> f64 {
    pearson(&rank(x, method), &rank(y, method))
}

/// Symmetric run × run Spearman correlation matrix with unit diagonal
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    /// Run names, in row/column order
    pub names: Vec<String>,
    /// Row-major coefficients
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    /// Coefficient between run `i` and run `j`
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i][j]
    }

    /// Number of runs
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Smallest off-diagonal coefficient (None with fewer than two runs)
    pub fn min_off_diagonal(&self) -> Option<f64> {
        let mut min: Option<f64> = None;
        for i in 0..self.len() {
            for j in (i + 1)..self.len() {
                let v = self.values[i][j];
                if v.is_nan() {
                    continue;
                }
                min = Some(min.map_or(v, |m| m.min(v)));
            }
        }
        min
    }
}

/// Compute the Spearman matrix for a set of runs
///
/// Each run is ranked once; only the upper triangle is computed and mirrored,
/// so `get(i, j) == get(j, i)` holds bit-for-bit. The diagonal is exactly 1.
pub fn spearman_matrix(runs: &[Run], method: RankMethod) -> CorrelationMatrix {
    let ranks: Vec<Vec<f64>> = runs.iter().map(|r| rank(&r.ber, method)).collect();
    let n = runs.len();
    let mut values = vec![vec![1.0; n]; n];

    for i in 0..n {
        for j in (i + 1)..n {
            let r = pearson(&ranks[i], &ranks[j]);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    CorrelationMatrix {
        names: runs.iter().map(|r| r.name.clone()).collect(),
        values,
    }
}
