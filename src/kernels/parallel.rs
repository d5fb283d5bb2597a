//! Row scoring for the nearest-neighbour decode scan.
//!
//! With the `parallel` feature the rows are scored across the rayon pool.
//! Scores are always collected into an index-ordered buffer, so the caller's
//! max reduction sees exactly the same sequence as the serial path and the
//! lowest-index tie-break does not depend on thread scheduling.

use crate::tensor::{TensorView1, TensorView2};

use super::cosine_to_unit;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Minimum number of rows before the scan is split across threads
pub const PARALLEL_ROW_THRESHOLD: usize = 1024;

/// Get the number of CPUs available for parallel work
#[cfg(feature = "parallel")]
pub fn num_cpus() -> usize {
    rayon::current_num_threads()
}

#[cfg(not(feature = "parallel"))]
pub fn num_cpus() -> usize {
    1
}

/// Cosine similarity of every row of `weights` against the unit vector `unit`.
///
/// Entry `i` is `None` when row `i` has an undefined direction.
#[cfg(feature = "parallel")]
pub fn score_rows(weights: TensorView2<'_>, unit: TensorView1<'_>) -> Vec<Option<f32>> {
    let n_rows = weights.nrows();
    if n_rows < PARALLEL_ROW_THRESHOLD || num_cpus() == 1 {
        return score_rows_serial(weights, unit);
    }

    (0..n_rows)
        .into_par_iter()
        .map(|i| cosine_to_unit(unit, weights.row(i)))
        .collect()
}

#[cfg(not(feature = "parallel"))]
pub fn score_rows(weights: TensorView2<'_>, unit: TensorView1<'_>) -> Vec<Option<f32>> {
    score_rows_serial(weights, unit)
}

/// Single-threaded scan, ascending row order
pub fn score_rows_serial(weights: TensorView2<'_>, unit: TensorView1<'_>) -> Vec<Option<f32>> {
    weights
        .outer_iter()
        .map(|row| cosine_to_unit(unit, row))
        .collect()
}
