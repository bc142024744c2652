//! Error types for the Planar storage engine.
//!
//! Two layers, two enums: [`AllocError`] for block allocation failures
//! (surfaced unchanged from whichever allocator produced them) and
//! [`FillError`] for element-count mismatches during range-based fills.

use std::error::Error;
use std::fmt;

/// Errors raised while allocating or sizing a storage block.
///
/// Allocation failure is the only fallible storage operation. It is never
/// swallowed: the storage it would have backed is left empty and
/// destructible, with nothing allocated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AllocError {
    /// `rows * cols` does not fit in `usize`.
    ShapeOverflow {
        /// Requested row count.
        rows: usize,
        /// Requested column count.
        cols: usize,
    },
    /// The byte size of an element array is unrepresentable as a layout.
    LayoutOverflow {
        /// Number of elements requested.
        elements: usize,
    },
    /// A budgeted allocator ran out of quota.
    CapacityExceeded {
        /// Number of bytes requested.
        requested: usize,
        /// Total capacity of the allocator's budget.
        capacity: usize,
    },
    /// The backing allocator returned no memory.
    Exhausted {
        /// Number of bytes requested.
        bytes: usize,
    },
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShapeOverflow { rows, cols } => {
                write!(f, "shape {rows}x{cols} overflows the element count")
            }
            Self::LayoutOverflow { elements } => {
                write!(f, "layout for {elements} elements exceeds the address space")
            }
            Self::CapacityExceeded {
                requested,
                capacity,
            } => {
                write!(
                    f,
                    "allocation quota exceeded: requested {requested} bytes, capacity {capacity} bytes"
                )
            }
            Self::Exhausted { bytes } => {
                write!(f, "allocator exhausted: {bytes} bytes unavailable")
            }
        }
    }
}

impl Error for AllocError {}

/// Errors raised while filling a matrix from an input range.
///
/// Count mismatches are only raised when the relevant [`FillPolicy`]
/// flag is unset; see the policy type for the lenient alternatives.
///
/// [`FillPolicy`]: crate::policy::FillPolicy
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FillError {
    /// The input ran out before every slot was filled.
    TooFew {
        /// Number of slots to fill (`rows * cols`).
        expected: usize,
        /// Number of elements the input actually provided.
        got: usize,
    },
    /// The input holds more elements than there are slots.
    TooMany {
        /// Number of slots to fill (`rows * cols`).
        expected: usize,
    },
    /// Allocating the backing block failed before any element was built.
    Alloc(AllocError),
}

impl fmt::Display for FillError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFew { expected, got } => {
                write!(f, "too few input elements: expected {expected}, got {got}")
            }
            Self::TooMany { expected } => {
                write!(f, "too many input elements: expected {expected}")
            }
            Self::Alloc(inner) => write!(f, "allocation failed: {inner}"),
        }
    }
}

impl Error for FillError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Alloc(inner) => Some(inner),
            _ => None,
        }
    }
}

impl From<AllocError> for FillError {
    fn from(err: AllocError) -> Self {
        Self::Alloc(err)
    }
}
