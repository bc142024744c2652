//! Scoped construction guards for partially-filled blocks.
//!
//! A fill routine constructs elements one slot at a time into an
//! uninitialized block. If it unwinds partway — an element's clone
//! panicked, or a count check failed — exactly the already-constructed
//! slots must be destroyed before `Storage` frees the block. Each guard
//! here records construction progress and runs the matching
//! partial-destroy routine on drop; completing the fill disarms it.

use std::mem;
use std::ptr::NonNull;

use planar_alloc::BlockAlloc;

/// Guard for linear (row-major prefix) fills.
///
/// Tracks a single cursor: slots `[0, constructed)` are live. On drop,
/// destroys that prefix in reverse order.
pub(crate) struct LinearGuard<'a, T, A: BlockAlloc<T>> {
    alloc: &'a mut A,
    base: NonNull<T>,
    len: usize,
    constructed: usize,
}

impl<'a, T, A: BlockAlloc<T>> LinearGuard<'a, T, A> {
    pub(crate) fn new(alloc: &'a mut A, base: NonNull<T>, len: usize) -> Self {
        Self {
            alloc,
            base,
            len,
            constructed: 0,
        }
    }

    /// Number of slots constructed so far.
    pub(crate) fn constructed(&self) -> usize {
        self.constructed
    }

    /// Construct the next slot from `value`.
    pub(crate) fn push(&mut self, value: T) {
        debug_assert!(self.constructed < self.len, "fill past capacity");
        // SAFETY: constructed < len, so the slot is inside the block and
        // has not been constructed yet.
        unsafe {
            self.alloc
                .construct(self.base.as_ptr().add(self.constructed), value);
        }
        self.constructed += 1;
    }

    /// Disarm: every slot is constructed, nothing to undo.
    pub(crate) fn complete(self) {
        debug_assert_eq!(self.constructed, self.len, "completed an unfinished fill");
        mem::forget(self);
    }
}

impl<T, A: BlockAlloc<T>> Drop for LinearGuard<'_, T, A> {
    fn drop(&mut self) {
        let mut s = self.constructed;
        while s > 0 {
            s -= 1;
            // SAFETY: slots [0, constructed) are live; each is destroyed
            // exactly once.
            unsafe { self.alloc.destroy(self.base.as_ptr().add(s)) };
        }
    }
}

/// Guard for transpose (destination-column-major) fills.
///
/// The fill walks the destination column by column, so the live footprint
/// after k pushes is not a linear prefix: it is every row of the
/// `filled_cols` completed columns, plus rows `[0, filled_rows)` of the
/// current column. Drop destroys exactly that footprint.
pub(crate) struct TransposeGuard<'a, T, A: BlockAlloc<T>> {
    alloc: &'a mut A,
    base: NonNull<T>,
    rows: usize,
    cols: usize,
    filled_cols: usize,
    filled_rows: usize,
}

impl<'a, T, A: BlockAlloc<T>> TransposeGuard<'a, T, A> {
    pub(crate) fn new(alloc: &'a mut A, base: NonNull<T>, rows: usize, cols: usize) -> Self {
        Self {
            alloc,
            base,
            rows,
            cols,
            filled_cols: 0,
            filled_rows: 0,
        }
    }

    /// Number of slots constructed so far.
    pub(crate) fn constructed(&self) -> usize {
        self.filled_cols * self.rows + self.filled_rows
    }

    /// Construct the next slot in column-major order from `value`.
    pub(crate) fn push(&mut self, value: T) {
        debug_assert!(self.filled_cols < self.cols, "fill past capacity");
        let slot = self.filled_rows * self.cols + self.filled_cols;
        // SAFETY: filled_rows < rows and filled_cols < cols, so the
        // row-major offset is inside the block, and column-major traversal
        // visits each slot exactly once.
        unsafe { self.alloc.construct(self.base.as_ptr().add(slot), value) };
        self.filled_rows += 1;
        if self.filled_rows == self.rows {
            self.filled_rows = 0;
            self.filled_cols += 1;
        }
    }

    /// Disarm: every slot is constructed, nothing to undo.
    pub(crate) fn complete(self) {
        debug_assert_eq!(
            self.constructed(),
            self.rows * self.cols,
            "completed an unfinished fill"
        );
        mem::forget(self);
    }
}

impl<T, A: BlockAlloc<T>> Drop for TransposeGuard<'_, T, A> {
    fn drop(&mut self) {
        for col in 0..self.filled_cols {
            for row in 0..self.rows {
                // SAFETY: completed columns are fully live.
                unsafe {
                    self.alloc
                        .destroy(self.base.as_ptr().add(row * self.cols + col));
                }
            }
        }
        for row in 0..self.filled_rows {
            // SAFETY: the current column is live up to filled_rows.
            unsafe {
                self.alloc
                    .destroy(self.base.as_ptr().add(row * self.cols + self.filled_cols));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planar_alloc::{BlockAlloc, Heap};
    use planar_test_utils::{Probe, ProbeStats};

    fn alloc_block(len: usize) -> NonNull<Probe> {
        BlockAlloc::<Probe>::allocate(&mut Heap, len).unwrap()
    }

    fn free_block(base: NonNull<Probe>, len: usize) {
        // SAFETY: base came from alloc_block(len); the guard under test
        // destroyed every element it constructed.
        unsafe { BlockAlloc::<Probe>::deallocate(&mut Heap, base, len) };
    }

    #[test]
    fn linear_guard_drop_destroys_the_prefix() {
        let stats = ProbeStats::new();
        let base = alloc_block(6);
        {
            let mut heap = Heap;
            let mut guard = LinearGuard::new(&mut heap, base, 6);
            for i in 0..4 {
                guard.push(Probe::new(i, &stats));
            }
            assert_eq!(guard.constructed(), 4);
        }
        assert_eq!(stats.constructed(), 4);
        assert_eq!(stats.dropped(), 4);
        assert_eq!(stats.live(), 0);
        free_block(base, 6);
    }

    #[test]
    fn completed_linear_guard_destroys_nothing() {
        let stats = ProbeStats::new();
        let base = alloc_block(3);
        {
            let mut heap = Heap;
            let mut guard = LinearGuard::new(&mut heap, base, 3);
            for i in 0..3 {
                guard.push(Probe::new(i, &stats));
            }
            guard.complete();
        }
        assert_eq!(stats.constructed(), 3);
        assert_eq!(stats.dropped(), 0);
        // Clean up the block the disarmed guard left alone.
        let mut heap = Heap;
        for i in 0..3 {
            // SAFETY: all three slots are live.
            unsafe { heap.destroy(base.as_ptr().add(i)) };
        }
        free_block(base, 3);
    }

    #[test]
    fn transpose_guard_drop_matches_the_footprint() {
        // Destination 3x2, column-major fill: 4 pushes cover column 0
        // fully (3 slots) plus row 0 of column 1.
        let stats = ProbeStats::new();
        let base = alloc_block(6);
        {
            let mut heap = Heap;
            let mut guard = TransposeGuard::new(&mut heap, base, 3, 2);
            for i in 0..4 {
                guard.push(Probe::new(i, &stats));
            }
            assert_eq!(guard.constructed(), 4);
        }
        assert_eq!(stats.constructed(), 4);
        assert_eq!(stats.dropped(), 4);
        assert_eq!(stats.live(), 0);
        free_block(base, 6);
    }

    #[test]
    fn transpose_guard_visits_slots_column_major() {
        let base = BlockAlloc::<u32>::allocate(&mut Heap, 6).unwrap();
        {
            let mut heap = Heap;
            let mut guard = TransposeGuard::new(&mut heap, base, 3, 2);
            for v in 0..6u32 {
                guard.push(v);
            }
            guard.complete();
        }
        // Row-major readback of a column-major fill of a 3x2 block.
        let written: Vec<u32> = (0..6)
            // SAFETY: all six slots were constructed above.
            .map(|i| unsafe { *base.as_ptr().add(i) })
            .collect();
        assert_eq!(written, vec![0, 3, 1, 4, 2, 5]);
        // SAFETY: u32 needs no destruction; block came from allocate(6).
        unsafe { BlockAlloc::<u32>::deallocate(&mut Heap, base, 6) };
    }
}
