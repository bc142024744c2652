//! The process-global heap as a [`BlockAlloc`].

use std::alloc;
use std::ptr::NonNull;

use planar_core::AllocError;

use crate::block::{array_layout, BlockAlloc};

/// The global allocator, as a stateless [`BlockAlloc`].
///
/// Every instance is interchangeable with every other, so all propagation
/// policies are left at their defaults (propagate everywhere). A failed
/// request is reported as [`AllocError::Exhausted`] rather than aborting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Heap;

impl<T> BlockAlloc<T> for Heap {
    fn allocate(&mut self, len: usize) -> Result<NonNull<T>, AllocError> {
        let layout = array_layout::<T>(len)?;
        if layout.size() == 0 {
            return Ok(NonNull::dangling());
        }
        // SAFETY: layout has non-zero size.
        let raw = unsafe { alloc::alloc(layout) };
        NonNull::new(raw.cast::<T>()).ok_or(AllocError::Exhausted {
            bytes: layout.size(),
        })
    }

    unsafe fn deallocate(&mut self, block: NonNull<T>, len: usize) {
        let layout = array_layout::<T>(len).expect("layout was validated at allocation");
        if layout.size() == 0 {
            return;
        }
        // SAFETY: per the symmetry contract, block came from `alloc::alloc`
        // with this exact layout.
        unsafe { alloc::dealloc(block.as_ptr().cast::<u8>(), layout) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compliance;

    #[test]
    fn heap_compliance() {
        compliance::run_full_compliance(&mut Heap);
    }

    #[test]
    fn zero_sized_type_allocates_nothing() {
        let mut heap = Heap;
        let block = BlockAlloc::<()>::allocate(&mut heap, 1024).unwrap();
        // SAFETY: zero-size deallocation is a no-op.
        unsafe { BlockAlloc::<()>::deallocate(&mut heap, block, 1024) };
    }

    #[test]
    fn layout_overflow_is_an_error() {
        let mut heap = Heap;
        let result = BlockAlloc::<u64>::allocate(&mut heap, usize::MAX / 2);
        assert!(matches!(result, Err(AllocError::LayoutOverflow { .. })));
    }
}
