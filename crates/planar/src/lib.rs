//! Planar: an allocator-parameterized dense 2-D storage engine.
//!
//! A [`Matrix`] is fixed-shape, row-major storage for `rows x cols`
//! elements on top of a [`BlockAlloc`] allocator. There is no arithmetic
//! here: the crate's subject is the allocation lifecycle — blocks are
//! allocated, filled, copied, moved, swapped, and freed in exact adherence
//! to the allocator's declared propagation policy, and a fill interrupted
//! by a panic destroys precisely the elements it had constructed.
//!
//! # Quick start
//!
//! ```rust
//! use planar::{FillPolicy, Matrix};
//!
//! // 2x3, filled row-major from an input range.
//! let m: Matrix<i32> = Matrix::from_values(2, 3, [1, 2, 3, 4, 5, 6], FillPolicy::STRICT)?;
//! assert_eq!(m.shape(), (2, 3));
//! assert_eq!(m.get(1, 0), Some(&4));
//!
//! // Physical transpose into new storage.
//! let t = m.transposed()?;
//! assert_eq!(t.shape(), (3, 2));
//! assert_eq!(t.get(0, 1), Some(&4));
//!
//! // Short input is an error unless the policy pads.
//! let padded: Matrix<i32> = Matrix::from_values(2, 2, [7], FillPolicy::PAD_MISSING)?;
//! assert_eq!(padded.as_slice(), &[7, 0, 0, 0]);
//! # Ok::<(), planar::FillError>(())
//! ```
//!
//! This crate is one of two that may contain `unsafe` code (along with
//! `planar-alloc`). Every `unsafe` block carries a `// SAFETY:` comment.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_op_in_unsafe_fn)]

pub(crate) mod fill;
pub(crate) mod guard;
pub mod matrix;
pub mod storage;

pub use matrix::Matrix;
pub use storage::Storage;

pub use planar_alloc::{array_layout, BlockAlloc, Heap, QuotaAlloc};
pub use planar_core::{AllocError, FillError, FillPolicy};
