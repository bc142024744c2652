//! Compressed storage: one allocator, one raw block, one shape.
//!
//! [`Storage`] owns exactly one allocator instance and one contiguous
//! uninitialized block sized `rows * cols`. It knows nothing about element
//! lifetimes — constructing and destroying elements is the [`Matrix`]
//! layer's job. What it does own is the allocator-propagation protocol:
//! copying, moving, and swapping a storage follows the policy its
//! allocator declares, and deallocation always goes back through the same
//! `(allocator, rows, cols)` that performed the allocation.
//!
//! [`Matrix`]: crate::matrix::Matrix

use std::marker::PhantomData;
use std::mem;
use std::ptr::NonNull;

use planar_alloc::BlockAlloc;
use planar_core::{checked_len, AllocError};

/// An allocator plus a raw block of `rows * cols` uninitialized slots.
///
/// Invariants:
/// - `block.is_some()` implies the block was allocated for exactly
///   `rows * cols` elements through `alloc`.
/// - An empty or taken storage is `{ block: None, rows: 0, cols: 0 }` and
///   deallocates nothing on drop.
/// - No element is ever constructed or destroyed here.
pub struct Storage<T, A: BlockAlloc<T>> {
    alloc: A,
    block: Option<NonNull<T>>,
    rows: usize,
    cols: usize,
    _marker: PhantomData<T>,
}

// SAFETY: Storage owns its block exclusively; sending it is sending the
// (uninitialized or caller-managed) elements and the allocator.
unsafe impl<T: Send, A: BlockAlloc<T> + Send> Send for Storage<T, A> {}
// SAFETY: shared access exposes only &T-reachable data.
unsafe impl<T: Sync, A: BlockAlloc<T> + Sync> Sync for Storage<T, A> {}

impl<T, A: BlockAlloc<T>> Storage<T, A> {
    /// Empty storage: no allocation, shape `(0, 0)`.
    pub fn empty(alloc: A) -> Self {
        Self {
            alloc,
            block: None,
            rows: 0,
            cols: 0,
            _marker: PhantomData,
        }
    }

    /// Allocate a block for `rows * cols` elements.
    ///
    /// Allocator failure propagates unchanged; on failure nothing was
    /// allocated. A zero-area shape allocates nothing.
    pub fn with_shape(alloc: A, rows: usize, cols: usize) -> Result<Self, AllocError> {
        let mut alloc = alloc;
        let len = checked_len(rows, cols)?;
        let block = if len == 0 {
            None
        } else {
            Some(alloc.allocate(len)?)
        };
        Ok(Self {
            alloc,
            block,
            rows,
            cols,
            _marker: PhantomData,
        })
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Block capacity in elements (`rows * cols`).
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    /// Returns `true` if the block capacity is zero.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The owned allocator instance.
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Raw pointer to the block start, or null when no block is held.
    pub fn as_ptr(&self) -> *const T {
        self.block
            .map_or(std::ptr::null(), |block| block.as_ptr().cast_const())
    }

    /// The block handle, if one is held.
    pub(crate) fn block_ptr(&self) -> Option<NonNull<T>> {
        self.block
    }

    /// Split into the pieces a construction guard needs: the allocator,
    /// a base pointer (dangling when capacity is zero), and the capacity.
    pub(crate) fn fill_parts(&mut self) -> (&mut A, NonNull<T>, usize) {
        let len = self.rows * self.cols;
        let base = self.block.unwrap_or(NonNull::dangling());
        (&mut self.alloc, base, len)
    }

    /// Copy-construction analog: a same-shaped, *uninitialized* block,
    /// allocated through the allocator chosen by
    /// [`BlockAlloc::select_on_clone`].
    ///
    /// Copying elements into the new block is the caller's job.
    pub fn clone_shape(&self) -> Result<Self, AllocError> {
        Self::with_shape(self.alloc.select_on_clone(), self.rows, self.cols)
    }

    /// Move-construction analog: takes the block and shape, leaving `self`
    /// empty with a clone of its own allocator.
    pub fn take(&mut self) -> Self {
        let alloc = self.alloc.clone();
        mem::replace(self, Self::empty(alloc))
    }

    /// Copy-assignment analog.
    ///
    /// Deallocates the current block through the *current* allocator and
    /// resets to the empty state, adopts `other`'s allocator iff
    /// [`BlockAlloc::PROPAGATE_ON_CLONE_FROM`], then allocates an
    /// uninitialized block for `other`'s shape. If that allocation fails,
    /// `self` is left empty and destructible.
    ///
    /// The caller must have destroyed any live elements beforehand.
    pub fn clone_storage_from(&mut self, other: &Self) -> Result<(), AllocError> {
        self.release();
        if A::PROPAGATE_ON_CLONE_FROM {
            self.alloc = other.alloc.clone();
        }
        let len = other.len();
        self.block = if len == 0 {
            None
        } else {
            Some(self.alloc.allocate(len)?)
        };
        // Shape is set only after a successful allocation, keeping the
        // failed state at (0, 0) with nothing to deallocate.
        self.rows = other.rows;
        self.cols = other.cols;
        Ok(())
    }

    /// Move-assignment analog.
    ///
    /// Deallocates the current block, adopts `other`'s allocator iff
    /// [`BlockAlloc::PROPAGATE_ON_TAKE_FROM`], then steals `other`'s block
    /// and shape, leaving `other` empty.
    ///
    /// When the policy does not propagate, the two allocators must satisfy
    /// [`BlockAlloc::same_source`]; otherwise the stolen block would later
    /// be freed through an allocator that did not produce it.
    pub fn take_storage_from(&mut self, other: &mut Self) {
        self.release();
        if A::PROPAGATE_ON_TAKE_FROM {
            self.alloc = other.alloc.clone();
        } else {
            debug_assert!(
                self.alloc.same_source(&other.alloc),
                "take_storage_from without propagation requires interchangeable allocators"
            );
        }
        self.block = other.block.take();
        self.rows = mem::take(&mut other.rows);
        self.cols = mem::take(&mut other.cols);
    }

    /// Swap blocks and shapes unconditionally; swap allocators iff
    /// [`BlockAlloc::PROPAGATE_ON_SWAP`].
    ///
    /// When the policy does not propagate, the allocators must satisfy
    /// [`BlockAlloc::same_source`] — each storage ends up holding a block
    /// the other's allocator produced.
    pub fn swap_with(&mut self, other: &mut Self) {
        mem::swap(&mut self.block, &mut other.block);
        mem::swap(&mut self.rows, &mut other.rows);
        mem::swap(&mut self.cols, &mut other.cols);
        if A::PROPAGATE_ON_SWAP {
            mem::swap(&mut self.alloc, &mut other.alloc);
        } else {
            debug_assert!(
                self.alloc.same_source(&other.alloc),
                "swap_with without propagation requires interchangeable allocators"
            );
        }
    }

    /// Deallocate the block (if any) and reset to the empty state.
    fn release(&mut self) {
        if let Some(block) = self.block.take() {
            let len = self.rows * self.cols;
            // SAFETY: the struct invariant says this block was allocated by
            // self.alloc for exactly len elements, and element lifetimes are
            // the caller's responsibility — none are live at this layer.
            unsafe { self.alloc.deallocate(block, len) };
        }
        self.rows = 0;
        self.cols = 0;
    }
}

impl<T, A: BlockAlloc<T>> Drop for Storage<T, A> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<T, A: BlockAlloc<T>> std::fmt::Debug for Storage<T, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage")
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .field("allocated", &self.block.is_some())
            .finish()
    }
}
