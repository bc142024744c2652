//! Benchmark fixtures for the Planar dense-storage engine.
//!
//! The matrices built here are sized so that fill, copy, and transpose
//! costs dominate over allocator overhead, with [`square_matrix`] as the
//! shared starting point for the criterion benches.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use planar::{FillPolicy, Matrix};

/// Side length of the reference benchmark matrix (1M elements).
pub const REFERENCE_SIDE: usize = 1_000;

/// Build an `n x n` matrix of sequential values.
pub fn square_matrix(n: usize) -> Matrix<u64> {
    Matrix::from_values(n, n, 0..(n * n) as u64, FillPolicy::STRICT)
        .expect("benchmark matrix allocation failed")
}

/// Build a deliberately non-square matrix so transpose benches exercise
/// the uneven-stride path.
pub fn wide_matrix(rows: usize, cols: usize) -> Matrix<u64> {
    Matrix::from_values(rows, cols, 0..(rows * cols) as u64, FillPolicy::STRICT)
        .expect("benchmark matrix allocation failed")
}
