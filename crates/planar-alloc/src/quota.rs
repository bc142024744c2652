//! A heap-backed allocator with a shared byte budget.

use std::alloc;
use std::cell::Cell;
use std::ptr::NonNull;
use std::rc::Rc;

use planar_core::AllocError;

use crate::block::{array_layout, BlockAlloc};

/// Heap allocator that enforces a byte quota shared between clones.
///
/// Clones of a `QuotaAlloc` draw from the same budget, so a container and
/// the copies it spawns are accounted together. Requests beyond the
/// remaining budget fail with [`AllocError::CapacityExceeded`] before any
/// memory is touched, which makes this the allocator of choice for
/// exercising allocation-failure paths deterministically.
///
/// Identity follows the budget: [`same_source`] holds exactly for clones
/// of the same original. The budget cell is an `Rc`, so this allocator is
/// single-threaded, like the containers built on it.
///
/// [`same_source`]: BlockAlloc::same_source
#[derive(Clone, Debug)]
pub struct QuotaAlloc {
    remaining: Rc<Cell<usize>>,
    capacity: usize,
}

impl QuotaAlloc {
    /// Create an allocator with `capacity` bytes of budget.
    pub fn new(capacity: usize) -> Self {
        Self {
            remaining: Rc::new(Cell::new(capacity)),
            capacity,
        }
    }

    /// Bytes still available in the shared budget.
    pub fn remaining(&self) -> usize {
        self.remaining.get()
    }

    /// Total budget this allocator was created with.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes currently drawn from the budget.
    pub fn used(&self) -> usize {
        self.capacity - self.remaining.get()
    }
}

impl<T> BlockAlloc<T> for QuotaAlloc {
    fn allocate(&mut self, len: usize) -> Result<NonNull<T>, AllocError> {
        let layout = array_layout::<T>(len)?;
        if layout.size() == 0 {
            return Ok(NonNull::dangling());
        }
        let remaining = self.remaining.get();
        if layout.size() > remaining {
            return Err(AllocError::CapacityExceeded {
                requested: layout.size(),
                capacity: self.capacity,
            });
        }
        // SAFETY: layout has non-zero size.
        let raw = unsafe { alloc::alloc(layout) };
        let block = NonNull::new(raw.cast::<T>()).ok_or(AllocError::Exhausted {
            bytes: layout.size(),
        })?;
        self.remaining.set(remaining - layout.size());
        Ok(block)
    }

    unsafe fn deallocate(&mut self, block: NonNull<T>, len: usize) {
        let layout = array_layout::<T>(len).expect("layout was validated at allocation");
        if layout.size() == 0 {
            return;
        }
        // SAFETY: per the symmetry contract, block came from `alloc::alloc`
        // with this exact layout.
        unsafe { alloc::dealloc(block.as_ptr().cast::<u8>(), layout) }
        self.remaining.set(self.remaining.get() + layout.size());
    }

    fn same_source(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.remaining, &other.remaining)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compliance;
    use proptest::prelude::*;

    #[test]
    fn quota_compliance() {
        compliance::run_full_compliance(&mut QuotaAlloc::new(1 << 16));
    }

    #[test]
    fn over_budget_request_fails_without_spending() {
        let mut quota = QuotaAlloc::new(16);
        let result = BlockAlloc::<u64>::allocate(&mut quota, 3);
        assert_eq!(
            result.unwrap_err(),
            AllocError::CapacityExceeded {
                requested: 24,
                capacity: 16,
            }
        );
        assert_eq!(quota.remaining(), 16);
    }

    #[test]
    fn deallocate_refunds_the_budget() {
        let mut quota = QuotaAlloc::new(64);
        let block = BlockAlloc::<u32>::allocate(&mut quota, 8).unwrap();
        assert_eq!(quota.remaining(), 32);
        assert_eq!(quota.used(), 32);
        // SAFETY: block came from the allocation above; no elements live.
        unsafe { BlockAlloc::<u32>::deallocate(&mut quota, block, 8) };
        assert_eq!(quota.remaining(), 64);
    }

    #[test]
    fn clones_share_one_budget() {
        let mut original = QuotaAlloc::new(64);
        let mut clone = original.clone();
        let block = BlockAlloc::<u32>::allocate(&mut clone, 8).unwrap();
        assert_eq!(original.remaining(), 32);
        assert!(BlockAlloc::<u32>::same_source(&original, &clone));
        // SAFETY: same_source holds, so releasing through the original
        // satisfies the symmetry contract.
        unsafe { BlockAlloc::<u32>::deallocate(&mut original, block, 8) };
        assert_eq!(clone.remaining(), 64);
    }

    #[test]
    fn separate_budgets_are_distinct_sources() {
        let a = QuotaAlloc::new(64);
        let b = QuotaAlloc::new(64);
        assert!(!BlockAlloc::<u32>::same_source(&a, &b));
    }

    proptest! {
        #[test]
        fn budget_accounting_is_exact(
            capacity in 0usize..1024,
            lens in proptest::collection::vec(0usize..96, 1..8),
        ) {
            let mut quota = QuotaAlloc::new(capacity);
            let mut live = Vec::new();
            let mut expected = capacity;
            for len in lens {
                let bytes = len * std::mem::size_of::<u32>();
                match BlockAlloc::<u32>::allocate(&mut quota, len) {
                    Ok(block) => {
                        prop_assert!(bytes <= expected);
                        expected -= bytes;
                        live.push((block, len));
                    }
                    Err(err) => {
                        prop_assert!(bytes > expected);
                        prop_assert_eq!(
                            err,
                            AllocError::CapacityExceeded {
                                requested: bytes,
                                capacity,
                            }
                        );
                    }
                }
                prop_assert_eq!(quota.remaining(), expected);
            }
            for (block, len) in live {
                // SAFETY: each block came from allocate(len) above and
                // holds no live elements.
                unsafe { BlockAlloc::<u32>::deallocate(&mut quota, block, len) };
            }
            prop_assert_eq!(quota.remaining(), capacity);
        }
    }
}
