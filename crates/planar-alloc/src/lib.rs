//! Block allocation for the Planar storage engine.
//!
//! Defines [`BlockAlloc`], the allocator abstraction the container layer
//! is parameterized over, plus two reference implementations:
//!
//! - [`Heap`]: the process-global allocator, stateless.
//! - [`QuotaAlloc`]: heap-backed with a shared byte budget, for
//!   deterministic allocation-failure paths and allocator-identity tests.
//!
//! This crate is one of two that may contain `unsafe` code (along with
//! `planar`). Every `unsafe` block carries a `// SAFETY:` comment.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod block;
pub mod compliance;
pub mod heap;
pub mod quota;

pub use block::{array_layout, BlockAlloc};
pub use heap::Heap;
pub use quota::QuotaAlloc;
