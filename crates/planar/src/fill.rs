//! Fill engines: the construction loops behind every matrix constructor.
//!
//! Each engine takes a freshly allocated [`Storage`] whose block is
//! entirely uninitialized, constructs elements under a guard, and either
//! completes (all `rows * cols` slots live) or unwinds with zero slots
//! live. The engines never allocate or free — that is storage's job.

use planar_alloc::BlockAlloc;
use planar_core::{FillError, FillPolicy};

use crate::guard::{LinearGuard, TransposeGuard};
use crate::storage::Storage;

/// Default-construct every slot, row-major.
pub(crate) fn default_fill<T, A>(storage: &mut Storage<T, A>)
where
    T: Default,
    A: BlockAlloc<T>,
{
    let (alloc, base, len) = storage.fill_parts();
    let mut guard = LinearGuard::new(alloc, base, len);
    while guard.constructed() < len {
        guard.push(T::default());
    }
    guard.complete();
}

/// Clone `value` into every slot.
pub(crate) fn value_fill<T, A>(storage: &mut Storage<T, A>, value: &T)
where
    T: Clone,
    A: BlockAlloc<T>,
{
    let (alloc, base, len) = storage.fill_parts();
    let mut guard = LinearGuard::new(alloc, base, len);
    while guard.constructed() < len {
        guard.push(value.clone());
    }
    guard.complete();
}

/// Fill slot `i` from `convert(&src[i])`, row-major.
///
/// Backs same-shape copies and converting copies; `src` must hold exactly
/// `rows * cols` elements.
pub(crate) fn copy_fill_with<T, U, A>(
    storage: &mut Storage<T, A>,
    src: &[U],
    convert: impl Fn(&U) -> T,
) where
    A: BlockAlloc<T>,
{
    let (alloc, base, len) = storage.fill_parts();
    debug_assert_eq!(src.len(), len, "copy fill shape mismatch");
    let mut guard = LinearGuard::new(alloc, base, len);
    for item in src {
        guard.push(convert(item));
    }
    guard.complete();
}

/// Fill the destination as the transpose of `src`.
///
/// The destination storage must be shaped `(src_cols, src_rows)`. Walking
/// the destination column-major makes the source read out linearly, so a
/// single pass over `src` suffices; the transpose guard owns the
/// placement arithmetic and the partial-destroy footprint.
pub(crate) fn transpose_fill_with<T, U, A>(
    storage: &mut Storage<T, A>,
    src: &[U],
    convert: impl Fn(&U) -> T,
) where
    A: BlockAlloc<T>,
{
    let (rows, cols) = (storage.rows(), storage.cols());
    let (alloc, base, len) = storage.fill_parts();
    debug_assert_eq!(src.len(), len, "transpose fill shape mismatch");
    let mut guard = TransposeGuard::new(alloc, base, rows, cols);
    for item in src {
        guard.push(convert(item));
    }
    guard.complete();
}

/// Check a sized input against the slot count before constructing anything.
///
/// An iterator whose `size_hint` is exact advertises a constant-time
/// length; a strict policy can then fail eagerly, before the input is
/// touched. Inexact hints fall through to the incremental checks.
fn eager_count_check<I: Iterator>(
    iter: &I,
    expected: usize,
    policy: FillPolicy,
) -> Result<(), FillError> {
    let (lower, upper) = iter.size_hint();
    if upper == Some(lower) {
        if lower < expected && !policy.allows_fewer() {
            return Err(FillError::TooFew {
                expected,
                got: lower,
            });
        }
        if lower > expected && !policy.allows_more() {
            return Err(FillError::TooMany { expected });
        }
    }
    Ok(())
}

/// Fill row-major from an input range under an element-count policy.
///
/// Short input: error, or default-fill the remainder when the policy pads.
/// Long input: error, or leave the surplus unread when the policy ignores
/// it — the extra elements are never pulled in that case.
pub(crate) fn linear_from_iter<T, A, I>(
    storage: &mut Storage<T, A>,
    values: I,
    policy: FillPolicy,
) -> Result<(), FillError>
where
    T: Default,
    A: BlockAlloc<T>,
    I: Iterator<Item = T>,
{
    let mut values = values.fuse();
    let expected = storage.len();
    eager_count_check(&values, expected, policy)?;

    let (alloc, base, len) = storage.fill_parts();
    let mut guard = LinearGuard::new(alloc, base, len);
    while guard.constructed() < len {
        match values.next() {
            Some(value) => guard.push(value),
            None => {
                if !policy.allows_fewer() {
                    return Err(FillError::TooFew {
                        expected,
                        got: guard.constructed(),
                    });
                }
                while guard.constructed() < len {
                    guard.push(T::default());
                }
                break;
            }
        }
    }
    if !policy.allows_more() && values.next().is_some() {
        return Err(FillError::TooMany { expected });
    }
    guard.complete();
    Ok(())
}

/// Transpose-order variant of [`linear_from_iter`].
///
/// Identical count policy; the destination is written column by column,
/// so a padded shortfall default-fills the rest of the current column and
/// every later column.
pub(crate) fn transpose_from_iter<T, A, I>(
    storage: &mut Storage<T, A>,
    values: I,
    policy: FillPolicy,
) -> Result<(), FillError>
where
    T: Default,
    A: BlockAlloc<T>,
    I: Iterator<Item = T>,
{
    let mut values = values.fuse();
    let expected = storage.len();
    eager_count_check(&values, expected, policy)?;

    let (rows, cols) = (storage.rows(), storage.cols());
    let (alloc, base, len) = storage.fill_parts();
    let mut guard = TransposeGuard::new(alloc, base, rows, cols);
    while guard.constructed() < len {
        match values.next() {
            Some(value) => guard.push(value),
            None => {
                if !policy.allows_fewer() {
                    return Err(FillError::TooFew {
                        expected,
                        got: guard.constructed(),
                    });
                }
                while guard.constructed() < len {
                    guard.push(T::default());
                }
                break;
            }
        }
    }
    if !policy.allows_more() && values.next().is_some() {
        return Err(FillError::TooMany { expected });
    }
    guard.complete();
    Ok(())
}
