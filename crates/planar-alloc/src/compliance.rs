//! BlockAlloc contract compliance test helpers.
//!
//! These functions verify that an allocator satisfies the invariants the
//! container layer relies on. Reused by the test module of every
//! [`BlockAlloc`] implementation, in this crate and downstream.

use std::ptr::NonNull;

use crate::block::BlockAlloc;

/// Assert that a written block reads back intact through the same pointer.
pub fn assert_roundtrip<A: BlockAlloc<u32>>(alloc: &mut A) {
    let len = 32usize;
    let block = alloc.allocate(len).expect("allocation should succeed");
    for i in 0..len {
        // SAFETY: i < len, so the slot is inside the allocated block.
        unsafe { alloc.construct(block.as_ptr().add(i), i as u32 * 3) };
    }
    for i in 0..len {
        // SAFETY: the slot was constructed above.
        let v = unsafe { *block.as_ptr().add(i) };
        assert_eq!(v, i as u32 * 3, "slot {i} corrupted");
    }
    for i in 0..len {
        // SAFETY: the slot holds a live element.
        unsafe { alloc.destroy(block.as_ptr().add(i)) };
    }
    // SAFETY: block came from `allocate(len)` and all elements are dead.
    unsafe { alloc.deallocate(block, len) };
}

/// Assert that a zero-length request succeeds without allocating.
pub fn assert_zero_len<A: BlockAlloc<u32>>(alloc: &mut A) {
    let block = alloc.allocate(0).expect("zero-length request must succeed");
    assert_eq!(block, NonNull::dangling());
    // SAFETY: zero-size deallocation must be a no-op.
    unsafe { alloc.deallocate(block, 0) };
}

/// Assert that distinct blocks do not alias.
pub fn assert_blocks_disjoint<A: BlockAlloc<u32>>(alloc: &mut A) {
    let a = alloc.allocate(16).expect("allocation should succeed");
    let b = alloc.allocate(16).expect("allocation should succeed");
    let a_start = a.as_ptr() as usize;
    let b_start = b.as_ptr() as usize;
    let span = 16 * std::mem::size_of::<u32>();
    assert!(
        a_start + span <= b_start || b_start + span <= a_start,
        "blocks overlap: {a_start:#x} and {b_start:#x}"
    );
    // SAFETY: both blocks came from `allocate(16)`; nothing was constructed.
    unsafe {
        alloc.deallocate(a, 16);
        alloc.deallocate(b, 16);
    }
}

/// Assert that an allocator is interchangeable with itself.
pub fn assert_same_source_reflexive<A: BlockAlloc<u32>>(alloc: &A) {
    assert!(alloc.same_source(alloc), "same_source not reflexive");
}

/// Run all four compliance checks on an allocator.
pub fn run_full_compliance<A: BlockAlloc<u32>>(alloc: &mut A) {
    assert_roundtrip(alloc);
    assert_zero_len(alloc);
    assert_blocks_disjoint(alloc);
    assert_same_source_reflexive(alloc);
}
