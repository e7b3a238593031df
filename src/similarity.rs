//! Trajectory similarity: discrete Fréchet distance and dynamic time
//! warping over the instant arrays of two temporal values.
//!
//! Both metrics run the same dynamic program over the pairwise distance
//! matrix of the operands' instants; Fréchet combines cells with `max`
//! and time warping with a running sum. The distance-only entry points
//! keep two matrix rows; the warp-path entry points materialize the full
//! matrix and backtrack, preferring the diagonal on ties so the path
//! advances both operands whenever it can.

use crate::error::{Result, TemporalError};
use crate::model::{Instant, Temporal};
use crate::value::BaseValue;

/// Which dynamic program combines the distance matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimilarityMetric {
    /// Discrete Fréchet: the bottleneck distance of the best coupling.
    Frechet,
    /// Dynamic time warping: the summed distance of the best coupling.
    DynTimeWarp,
}

/// One cell of a warp path: the `i`-th instant of the first operand
/// matched with the `j`-th of the second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathCell {
    pub i: usize,
    pub j: usize,
}

/// Discrete Fréchet distance between two temporal values.
pub fn frechet_distance<V: BaseValue>(a: &Temporal<V>, b: &Temporal<V>) -> Result<f64> {
    similarity_distance(SimilarityMetric::Frechet, a, b)
}

/// Dynamic-time-warp distance between two temporal values.
pub fn dyntimewarp_distance<V: BaseValue>(a: &Temporal<V>, b: &Temporal<V>) -> Result<f64> {
    similarity_distance(SimilarityMetric::DynTimeWarp, a, b)
}

/// Distance under `metric`, keeping only two rows of the matrix.
pub fn similarity_distance<V: BaseValue>(
    metric: SimilarityMetric,
    a: &Temporal<V>,
    b: &Temporal<V>,
) -> Result<f64> {
    let mut ia = a.instants();
    let mut ib = b.instants();
    // The rows span the second operand; both metrics are symmetric, so
    // walking the longer operand outermost keeps memory at O(min(m, n)).
    if ib.len() > ia.len() {
        std::mem::swap(&mut ia, &mut ib);
    }
    let m = ia.len();
    let n = ib.len();
    let mut rows = vec![0.0f64; 2 * n];
    for i in 0..m {
        for j in 0..n {
            let d = cell_distance(&ia[i], &ib[j])?;
            let best = prev_min(
                |pi, pj| rows[(pi % 2) * n + pj],
                i,
                j,
            );
            rows[(i % 2) * n + j] = combine(metric, d, best);
        }
    }
    Ok(rows[((m - 1) % 2) * n + n - 1])
}

/// Warp path under `metric`: the matched index pairs of the optimal
/// coupling, ordered from the first instants to the last.
pub fn similarity_path<V: BaseValue>(
    metric: SimilarityMetric,
    a: &Temporal<V>,
    b: &Temporal<V>,
) -> Result<Vec<PathCell>> {
    let ia = a.instants();
    let ib = b.instants();
    let m = ia.len();
    let n = ib.len();
    let mut matrix = vec![0.0f64; m * n];
    for i in 0..m {
        for j in 0..n {
            let d = cell_distance(&ia[i], &ib[j])?;
            let best = prev_min(|pi, pj| matrix[pi * n + pj], i, j);
            matrix[i * n + j] = combine(metric, d, best);
        }
    }

    let mut path = Vec::with_capacity(m + n);
    let (mut i, mut j) = (m - 1, n - 1);
    path.push(PathCell { i, j });
    while i > 0 || j > 0 {
        // Candidates in tie-break order: diagonal, then the first
        // operand's previous instant, then the second's.
        let mut next = None;
        let mut best = f64::INFINITY;
        if i > 0 && j > 0 && matrix[(i - 1) * n + j - 1] < best {
            best = matrix[(i - 1) * n + j - 1];
            next = Some((i - 1, j - 1));
        }
        if i > 0 && matrix[(i - 1) * n + j] < best {
            best = matrix[(i - 1) * n + j];
            next = Some((i - 1, j));
        }
        if j > 0 && matrix[i * n + j - 1] < best {
            next = Some((i, j - 1));
        }
        let Some((ni, nj)) = next else {
            // Unreachable: at least one neighbor exists while not at the
            // origin, and matrix values are finite.
            break;
        };
        i = ni;
        j = nj;
        path.push(PathCell { i, j });
    }
    path.reverse();
    Ok(path)
}

/// Frechet warp path.
pub fn frechet_path<V: BaseValue>(a: &Temporal<V>, b: &Temporal<V>) -> Result<Vec<PathCell>> {
    similarity_path(SimilarityMetric::Frechet, a, b)
}

/// Dynamic-time-warp path.
pub fn dyntimewarp_path<V: BaseValue>(a: &Temporal<V>, b: &Temporal<V>) -> Result<Vec<PathCell>> {
    similarity_path(SimilarityMetric::DynTimeWarp, a, b)
}

fn cell_distance<V: BaseValue>(a: &Instant<V>, b: &Instant<V>) -> Result<f64> {
    a.value().distance(b.value()).ok_or_else(|| {
        TemporalError::TypeMismatch(format!(
            "base type {} has no distance metric for similarity",
            V::NAME
        ))
    })
}

/// Minimum of the three predecessor cells, or 0 at the origin. Cells
/// outside the matrix do not participate.
fn prev_min(cell: impl Fn(usize, usize) -> f64, i: usize, j: usize) -> f64 {
    match (i, j) {
        (0, 0) => 0.0,
        (0, _) => cell(0, j - 1),
        (_, 0) => cell(i - 1, 0),
        _ => cell(i - 1, j - 1)
            .min(cell(i - 1, j))
            .min(cell(i, j - 1)),
    }
}

fn combine(metric: SimilarityMetric, d: f64, best: f64) -> f64 {
    match metric {
        SimilarityMetric::Frechet => d.max(best),
        SimilarityMetric::DynTimeWarp => d + best,
    }
}
