//! Test utilities and instrumented fixtures for Planar development.
//!
//! Provides [`Probe`]/[`ProbeStats`] for counting element constructions
//! and drops across panics, and two allocator fixtures whose tags make
//! propagation decisions observable: [`TaggedAlloc`] propagates on every
//! container operation, [`PinnedAlloc`] on none. The only `unsafe` here
//! is the fixtures forwarding deallocation to [`Heap`].

#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_op_in_unsafe_fn)]

use std::ptr::NonNull;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use planar_alloc::{BlockAlloc, Heap};
use planar_core::AllocError;

mod probe;

pub use probe::{Probe, ProbeStats};

static NEXT_TAG: AtomicU64 = AtomicU64::new(1);

/// Hand out a tag no other fixture in the process has used.
pub fn fresh_tag() -> u64 {
    NEXT_TAG.fetch_add(1, Ordering::Relaxed)
}

/// Heap passthrough that propagates on clone-from, take-from, and swap.
///
/// The tag travels with the allocator, so a test can check which side's
/// allocator a container ended up holding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaggedAlloc {
    pub tag: u64,
}

impl TaggedAlloc {
    pub fn new() -> Self {
        Self { tag: fresh_tag() }
    }

    pub fn with_tag(tag: u64) -> Self {
        Self { tag }
    }
}

impl Default for TaggedAlloc {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> BlockAlloc<T> for TaggedAlloc {
    fn allocate(&mut self, len: usize) -> Result<NonNull<T>, AllocError> {
        BlockAlloc::<T>::allocate(&mut Heap, len)
    }

    unsafe fn deallocate(&mut self, block: NonNull<T>, len: usize) {
        // SAFETY: forwarded unchanged; the caller's contract is Heap's.
        unsafe { BlockAlloc::<T>::deallocate(&mut Heap, block, len) }
    }

    fn same_source(&self, other: &Self) -> bool {
        self.tag == other.tag
    }
}

/// Heap passthrough that never propagates.
///
/// Containers built with it must keep their own allocator through
/// clone-from, take-from, and swap, and `select_on_clone` hands a clone a
/// fresh tag rather than the source's. An allocation counter shared
/// between clones lets tests assert that an operation allocated nothing.
#[derive(Debug, Clone)]
pub struct PinnedAlloc {
    pub tag: u64,
    allocations: Arc<AtomicUsize>,
}

impl PinnedAlloc {
    pub fn new() -> Self {
        Self::with_tag(fresh_tag())
    }

    pub fn with_tag(tag: u64) -> Self {
        Self {
            tag,
            allocations: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of blocks allocated through this instance and its clones.
    pub fn allocations(&self) -> usize {
        self.allocations.load(Ordering::SeqCst)
    }
}

impl Default for PinnedAlloc {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> BlockAlloc<T> for PinnedAlloc {
    const PROPAGATE_ON_CLONE_FROM: bool = false;
    const PROPAGATE_ON_TAKE_FROM: bool = false;
    const PROPAGATE_ON_SWAP: bool = false;

    fn allocate(&mut self, len: usize) -> Result<NonNull<T>, AllocError> {
        let block = BlockAlloc::<T>::allocate(&mut Heap, len)?;
        self.allocations.fetch_add(1, Ordering::SeqCst);
        Ok(block)
    }

    unsafe fn deallocate(&mut self, block: NonNull<T>, len: usize) {
        // SAFETY: forwarded unchanged; the caller's contract is Heap's.
        unsafe { BlockAlloc::<T>::deallocate(&mut Heap, block, len) }
    }

    fn select_on_clone(&self) -> Self {
        Self::new()
    }

    fn same_source(&self, _other: &Self) -> bool {
        // Non-propagating fixtures still share the process heap, so any
        // instance may free any other instance's blocks.
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planar_alloc::compliance;

    #[test]
    fn tagged_alloc_compliance() {
        compliance::run_full_compliance(&mut TaggedAlloc::new());
    }

    #[test]
    fn pinned_alloc_compliance() {
        compliance::run_full_compliance(&mut PinnedAlloc::new());
    }

    #[test]
    fn pinned_alloc_counts_its_allocations() {
        let mut alloc = PinnedAlloc::new();
        assert_eq!(alloc.allocations(), 0);
        let block = BlockAlloc::<u32>::allocate(&mut alloc, 8).unwrap();
        assert_eq!(alloc.allocations(), 1);
        // SAFETY: block came from the allocation above; nothing constructed.
        unsafe { BlockAlloc::<u32>::deallocate(&mut alloc, block, 8) };
        assert_eq!(alloc.allocations(), 1);
    }
}
