//! Element and allocator accounting across the full container lifecycle.
//!
//! These tests pair the instrumented [`Probe`] element with the fixture
//! allocators to check the two books the engine must keep balanced: every
//! constructed element is destroyed exactly once (including across
//! unwinds), and every block travels with an allocator allowed to free it.

use std::panic::{self, AssertUnwindSafe};

use planar::{AllocError, FillPolicy, Matrix, QuotaAlloc};
use planar_test_utils::{PinnedAlloc, Probe, ProbeStats, TaggedAlloc};

#[test]
fn filled_balances_constructions_and_drops() {
    let stats = ProbeStats::new();
    {
        let template = Probe::new(1, &stats);
        let m = Matrix::<Probe>::filled(3, 4, &template).unwrap();
        assert_eq!(m.len(), 12);
        // Template plus twelve clones.
        assert_eq!(stats.constructed(), 13);
    }
    assert_eq!(stats.dropped(), 13);
    assert_eq!(stats.live(), 0);
}

#[test]
fn clone_panic_mid_fill_destroys_the_partial_prefix() {
    let stats = ProbeStats::new();
    let template = Probe::new(1, &stats);
    // The fifth clone (construction 6 overall) panics.
    stats.fail_at(6);
    let result = panic::catch_unwind(AssertUnwindSafe(|| Matrix::<Probe>::filled(3, 3, &template)));
    assert!(result.is_err());
    // Four clones were built and all four were torn down by the guard.
    assert_eq!(stats.constructed(), 5);
    assert_eq!(stats.dropped(), 4);
    assert_eq!(stats.live(), 1);
    drop(template);
    assert_eq!(stats.live(), 0);
}

#[test]
fn clone_panic_mid_transpose_destroys_the_column_footprint() {
    let stats = ProbeStats::new();
    let template = Probe::new(1, &stats);
    let source = Matrix::<Probe>::filled(2, 3, &template).unwrap();
    drop(template);
    assert_eq!(stats.live(), 6);

    // Four transpose clones land (column 0 of the 3x2 destination plus
    // one slot of column 1), then the fifth panics.
    stats.fail_at(stats.constructed() + 5);
    let result = panic::catch_unwind(AssertUnwindSafe(|| source.transposed()));
    assert!(result.is_err());
    assert_eq!(stats.live(), 6);
}

#[test]
fn fill_error_destroys_partial_elements() {
    let stats = ProbeStats::new();
    let probes: Vec<Probe> = (0..3).map(|i| Probe::new(i, &stats)).collect();
    // filter() hides the length, forcing the incremental shortfall check.
    let short = probes.into_iter().filter(|_| true);
    let result = Matrix::<Probe>::from_values(2, 2, short, FillPolicy::STRICT);
    assert!(result.is_err());
    assert_eq!(stats.live(), 0);
}

#[test]
fn allocation_failure_surfaces_before_any_element_exists() {
    let quota = QuotaAlloc::new(16);
    let result = Matrix::<u64, _>::new_in(2, 2, quota.clone());
    assert!(matches!(result, Err(AllocError::CapacityExceeded { .. })));
    assert_eq!(quota.remaining(), 16);
}

#[test]
fn drop_refunds_the_quota() {
    let quota = QuotaAlloc::new(256);
    let m = Matrix::<u32, _>::new_in(4, 4, quota.clone()).unwrap();
    assert_eq!(quota.used(), 64);
    drop(m);
    assert_eq!(quota.used(), 0);
}

#[test]
fn swap_moves_no_memory() {
    let quota = QuotaAlloc::new(128);
    let mut a = Matrix::<u32, _>::new_in(2, 2, quota.clone()).unwrap();
    let mut b = Matrix::<u32, _>::new_in(4, 4, quota.clone()).unwrap();
    let used = quota.used();
    a.swap_with(&mut b);
    assert_eq!(quota.used(), used);
    assert_eq!(a.shape(), (4, 4));
    assert_eq!(b.shape(), (2, 2));
}

#[test]
fn take_from_destroys_the_old_contents() {
    let stats = ProbeStats::new();
    let template = Probe::new(1, &stats);
    let mut target = Matrix::<Probe>::filled(2, 2, &template).unwrap();
    let mut source = Matrix::<Probe>::filled(1, 1, &template).unwrap();
    drop(template);
    assert_eq!(stats.live(), 5);

    target.take_from(&mut source);
    assert_eq!(stats.live(), 1);
    assert_eq!(target.len(), 1);
    assert!(source.is_empty());
}

#[test]
fn propagating_clone_from_adopts_the_source_allocator() {
    let source = Matrix::<u32, _>::new_in(1, 2, TaggedAlloc::with_tag(1_001)).unwrap();
    let mut target = Matrix::<u32, _>::new_in(1, 2, TaggedAlloc::with_tag(1_002)).unwrap();
    target.try_clone_from(&source).unwrap();
    assert_eq!(target.allocator().tag, 1_001);
}

#[test]
fn pinned_clone_from_keeps_its_own_allocator() {
    let source = Matrix::<u32, _>::new_in(1, 2, PinnedAlloc::with_tag(1_011)).unwrap();
    let mut target = Matrix::<u32, _>::new_in(1, 2, PinnedAlloc::with_tag(1_012)).unwrap();
    target.try_clone_from(&source).unwrap();
    assert_eq!(target.allocator().tag, 1_012);
    assert_eq!(target.as_slice(), source.as_slice());
}

#[test]
fn pinned_clone_starts_from_a_fresh_allocator() {
    let source = Matrix::<u32, _>::new_in(1, 2, PinnedAlloc::with_tag(1_021)).unwrap();
    let copy = source.try_clone().unwrap();
    assert_ne!(copy.allocator().tag, 1_021);
}

#[test]
fn propagating_take_from_moves_the_allocator_with_the_block() {
    let mut source = Matrix::<u32, _>::new_in(1, 2, TaggedAlloc::with_tag(1_031)).unwrap();
    let mut target = Matrix::<u32, _>::new_in(1, 2, TaggedAlloc::with_tag(1_032)).unwrap();
    target.take_from(&mut source);
    assert_eq!(target.allocator().tag, 1_031);
    assert!(source.is_empty());
}

#[test]
fn propagating_swap_exchanges_allocators() {
    let mut a = Matrix::<u32, _>::new_in(1, 1, TaggedAlloc::with_tag(1_041)).unwrap();
    let mut b = Matrix::<u32, _>::new_in(1, 1, TaggedAlloc::with_tag(1_042)).unwrap();
    a.swap_with(&mut b);
    assert_eq!(a.allocator().tag, 1_042);
    assert_eq!(b.allocator().tag, 1_041);
}

#[test]
fn pinned_swap_leaves_allocators_in_place_and_allocates_nothing() {
    let mut a = Matrix::<u32, _>::new_in(1, 1, PinnedAlloc::with_tag(1_051)).unwrap();
    let mut b = Matrix::<u32, _>::new_in(1, 1, PinnedAlloc::with_tag(1_052)).unwrap();
    assert_eq!(a.allocator().allocations(), 1);
    assert_eq!(b.allocator().allocations(), 1);
    a.swap_with(&mut b);
    assert_eq!(a.allocator().tag, 1_051);
    assert_eq!(b.allocator().tag, 1_052);
    assert_eq!(a.allocator().allocations(), 1);
    assert_eq!(b.allocator().allocations(), 1);
}
