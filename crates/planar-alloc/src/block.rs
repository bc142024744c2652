//! The [`BlockAlloc`] trait: typed block allocation with container
//! propagation policy.

use std::alloc::Layout;
use std::ptr::{self, NonNull};

use planar_core::AllocError;

/// Compute the layout for an array of `len` elements of `T`.
///
/// Returns [`AllocError::LayoutOverflow`] when the byte size is
/// unrepresentable. A zero-size layout (zero `len`, or a zero-sized `T`)
/// is valid and means "allocate nothing".
pub fn array_layout<T>(len: usize) -> Result<Layout, AllocError> {
    Layout::array::<T>(len).map_err(|_| AllocError::LayoutOverflow { elements: len })
}

/// A typed allocator for contiguous element blocks.
///
/// This is the interface the container layer consumes: raw allocation and
/// deallocation, per-slot construction and destruction, and the policy
/// knobs a container consults when it is copied, moved, or swapped.
///
/// # Propagation policy
///
/// The three `PROPAGATE_ON_*` consts declare whether the allocator
/// instance travels with the container's data during copy-assignment,
/// move-assignment, and swap. [`select_on_clone`] chooses the allocator a
/// copy-constructed container starts from. All four default to the
/// behavior of a stateless allocator, for which propagation is free.
///
/// When a policy flag is `false`, the container keeps its own allocator;
/// operations that would hand a block from one allocator to another then
/// require [`same_source`] to hold between the two instances. That
/// precondition is the caller's to uphold (the container debug-asserts it).
///
/// # Symmetry contract
///
/// Every block passed to [`deallocate`] must have come from [`allocate`]
/// on this allocator (or one for which `same_source` holds), with the
/// same `len`.
///
/// [`select_on_clone`]: BlockAlloc::select_on_clone
/// [`same_source`]: BlockAlloc::same_source
/// [`allocate`]: BlockAlloc::allocate
/// [`deallocate`]: BlockAlloc::deallocate
pub trait BlockAlloc<T>: Clone {
    /// Whether copy-assignment of a container also copies the allocator.
    const PROPAGATE_ON_CLONE_FROM: bool = true;
    /// Whether move-assignment of a container also moves the allocator.
    const PROPAGATE_ON_TAKE_FROM: bool = true;
    /// Whether swapping two containers also swaps their allocators.
    const PROPAGATE_ON_SWAP: bool = true;

    /// Allocate an uninitialized block for `len` elements.
    ///
    /// A request whose layout has zero size must succeed without
    /// allocating, returning a dangling pointer.
    fn allocate(&mut self, len: usize) -> Result<NonNull<T>, AllocError>;

    /// Release a block previously returned by [`allocate`] with this `len`.
    ///
    /// # Safety
    ///
    /// `block` must satisfy the symmetry contract above, and no element in
    /// it may still be live.
    ///
    /// [`allocate`]: BlockAlloc::allocate
    unsafe fn deallocate(&mut self, block: NonNull<T>, len: usize);

    /// Construct an element in `slot` from `value`.
    ///
    /// # Safety
    ///
    /// `slot` must point into an allocated block and hold no live element.
    unsafe fn construct(&mut self, slot: *mut T, value: T) {
        // SAFETY: caller guarantees slot is valid for writes and vacant.
        unsafe { ptr::write(slot, value) }
    }

    /// Destroy the element in `slot`, leaving the slot uninitialized.
    ///
    /// # Safety
    ///
    /// `slot` must point at a live element in an allocated block.
    unsafe fn destroy(&mut self, slot: *mut T) {
        // SAFETY: caller guarantees slot holds a live element.
        unsafe { ptr::drop_in_place(slot) }
    }

    /// Choose the allocator a copy-constructed container starts from.
    fn select_on_clone(&self) -> Self {
        self.clone()
    }

    /// Whether blocks from `self` may be released through `other`.
    ///
    /// Stateless allocators are all interchangeable; stateful ones should
    /// compare identity.
    fn same_source(&self, _other: &Self) -> bool {
        true
    }
}
