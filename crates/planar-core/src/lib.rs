//! Core types for the Planar dense-storage engine.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the error taxonomy shared by the allocator and container layers,
//! the [`FillPolicy`] element-count policy, and row-major shape helpers.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod policy;
pub mod shape;

pub use error::{AllocError, FillError};
pub use policy::FillPolicy;
pub use shape::{checked_len, row_major};
