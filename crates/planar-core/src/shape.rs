//! Row-major shape arithmetic.

use crate::error::AllocError;

/// Compute `rows * cols` with overflow checking.
///
/// The product is a block capacity in elements. Overflow is reported as
/// [`AllocError::ShapeOverflow`] so it surfaces through the same channel
/// as any other failed allocation, before anything is allocated.
pub fn checked_len(rows: usize, cols: usize) -> Result<usize, AllocError> {
    rows.checked_mul(cols)
        .ok_or(AllocError::ShapeOverflow { rows, cols })
}

/// Linear offset of logical position `(row, col)` in a row-major block.
pub fn row_major(row: usize, col: usize, cols: usize) -> usize {
    row * cols + col
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn overflow_is_reported() {
        assert_eq!(
            checked_len(usize::MAX, 2),
            Err(AllocError::ShapeOverflow {
                rows: usize::MAX,
                cols: 2
            })
        );
    }

    #[test]
    fn zero_extents_are_valid() {
        assert_eq!(checked_len(0, 5), Ok(0));
        assert_eq!(checked_len(5, 0), Ok(0));
        assert_eq!(checked_len(0, 0), Ok(0));
    }

    proptest! {
        #[test]
        fn row_major_is_injective_in_bounds(
            rows in 1usize..64,
            cols in 1usize..64,
        ) {
            let mut seen = vec![false; rows * cols];
            for r in 0..rows {
                for c in 0..cols {
                    let idx = row_major(r, c, cols);
                    prop_assert!(idx < rows * cols);
                    prop_assert!(!seen[idx], "index {idx} hit twice");
                    seen[idx] = true;
                }
            }
        }
    }
}
