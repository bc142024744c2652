//! The matrix container: live elements on top of [`Storage`].
//!
//! [`Matrix`] pairs a storage block with the invariant that all of its
//! `rows * cols` slots hold live elements. Every constructor establishes
//! that invariant through a fill engine or fails with nothing live and
//! nothing allocated; every consumer (drop, clone-from, take-from) tears
//! it down before handing the block back to storage.

use std::fmt;
use std::mem;
use std::ptr::NonNull;
use std::slice;

use planar_alloc::{BlockAlloc, Heap};
use planar_core::{row_major, AllocError, FillError, FillPolicy};

use crate::fill;
use crate::storage::Storage;

/// A fixed-shape, row-major, allocator-parameterized dense matrix.
///
/// The shape is set at construction and never changes; there is no
/// push, resize, or reshape. The allocator parameter defaults to the
/// global heap. Fallible construction is the primary interface; the
/// `Clone` impl exists for callers that treat allocation failure as
/// fatal and panics if it occurs.
pub struct Matrix<T, A: BlockAlloc<T> = Heap> {
    data: Storage<T, A>,
}

impl<T, A: BlockAlloc<T>> Matrix<T, A> {
    /// An empty matrix, shape `(0, 0)`, no allocation.
    pub fn empty_in(alloc: A) -> Self {
        Self {
            data: Storage::empty(alloc),
        }
    }

    /// A `rows x cols` matrix with every element default-constructed,
    /// using the given allocator.
    pub fn new_in(rows: usize, cols: usize, alloc: A) -> Result<Self, AllocError>
    where
        T: Default,
    {
        let mut data = Storage::with_shape(alloc, rows, cols)?;
        fill::default_fill(&mut data);
        Ok(Self { data })
    }

    /// A `rows x cols` matrix with every element cloned from `value`,
    /// using the given allocator.
    pub fn filled_in(rows: usize, cols: usize, value: &T, alloc: A) -> Result<Self, AllocError>
    where
        T: Clone,
    {
        let mut data = Storage::with_shape(alloc, rows, cols)?;
        fill::value_fill(&mut data, value);
        Ok(Self { data })
    }

    /// A `rows x cols` matrix filled row-major from `values`, using the
    /// given allocator.
    ///
    /// The policy decides what a short or long input means; see
    /// [`FillPolicy`]. With a strict policy, inputs that advertise an
    /// exact length are rejected before any element is constructed.
    pub fn from_values_in<I>(
        rows: usize,
        cols: usize,
        values: I,
        policy: FillPolicy,
        alloc: A,
    ) -> Result<Self, FillError>
    where
        T: Default,
        I: IntoIterator<Item = T>,
    {
        let mut data = Storage::with_shape(alloc, rows, cols)?;
        fill::linear_from_iter(&mut data, values.into_iter(), policy)?;
        Ok(Self { data })
    }

    /// A `rows x cols` matrix filled *column-major* from `values`, using
    /// the given allocator.
    ///
    /// The first `rows` input elements become column 0, the next `rows`
    /// column 1, and so on. Under a padding policy a short input
    /// default-fills the rest of the current column and every later one.
    pub fn from_values_transposed_in<I>(
        rows: usize,
        cols: usize,
        values: I,
        policy: FillPolicy,
        alloc: A,
    ) -> Result<Self, FillError>
    where
        T: Default,
        I: IntoIterator<Item = T>,
    {
        let mut data = Storage::with_shape(alloc, rows, cols)?;
        fill::transpose_from_iter(&mut data, values.into_iter(), policy)?;
        Ok(Self { data })
    }

    /// An element-by-element copy into the given allocator.
    pub fn try_clone_in(&self, alloc: A) -> Result<Self, AllocError>
    where
        T: Clone,
    {
        let mut data = Storage::with_shape(alloc, self.rows(), self.cols())?;
        fill::copy_fill_with(&mut data, self.as_slice(), T::clone);
        Ok(Self { data })
    }

    /// An element-by-element copy; the allocator comes from
    /// [`BlockAlloc::select_on_clone`].
    pub fn try_clone(&self) -> Result<Self, AllocError>
    where
        T: Clone,
    {
        self.try_clone_in(self.data.allocator().select_on_clone())
    }

    /// A converting copy of `source`: same shape, each element mapped
    /// through `T::from`.
    pub fn from_matrix_in<U, B>(source: &Matrix<U, B>, alloc: A) -> Result<Self, AllocError>
    where
        T: From<U>,
        U: Clone,
        B: BlockAlloc<U>,
    {
        let mut data = Storage::with_shape(alloc, source.rows(), source.cols())?;
        fill::copy_fill_with(&mut data, source.as_slice(), |value| T::from(value.clone()));
        Ok(Self { data })
    }

    /// A converting *transposed* copy of `source`: shape
    /// `(source.cols, source.rows)`, with `out[c][r] = source[r][c]`
    /// mapped through `T::from`.
    pub fn from_matrix_transposed_in<U, B>(
        source: &Matrix<U, B>,
        alloc: A,
    ) -> Result<Self, AllocError>
    where
        T: From<U>,
        U: Clone,
        B: BlockAlloc<U>,
    {
        let mut data = Storage::with_shape(alloc, source.cols(), source.rows())?;
        fill::transpose_fill_with(&mut data, source.as_slice(), |value| T::from(value.clone()));
        Ok(Self { data })
    }

    /// The physical transpose, in fresh storage from the given allocator.
    pub fn transposed_in(&self, alloc: A) -> Result<Self, AllocError>
    where
        T: Clone,
    {
        let mut data = Storage::with_shape(alloc, self.cols(), self.rows())?;
        fill::transpose_fill_with(&mut data, self.as_slice(), T::clone);
        Ok(Self { data })
    }

    /// The physical transpose; the allocator comes from
    /// [`BlockAlloc::select_on_clone`].
    pub fn transposed(&self) -> Result<Self, AllocError>
    where
        T: Clone,
    {
        self.transposed_in(self.data.allocator().select_on_clone())
    }

    /// Move the contents out, leaving `self` empty with a clone of its
    /// own allocator. No elements are copied or destroyed.
    pub fn take(&mut self) -> Self {
        let alloc = self.data.allocator().clone();
        mem::replace(self, Self::empty_in(alloc))
    }

    /// Move-assignment: destroy own contents, then steal `other`'s block
    /// and shape, leaving `other` empty.
    ///
    /// The allocator is adopted iff [`BlockAlloc::PROPAGATE_ON_TAKE_FROM`].
    /// A non-propagating allocator must satisfy
    /// [`BlockAlloc::same_source`] with `other`'s, since the stolen block
    /// will eventually be freed through the kept allocator.
    pub fn take_from(&mut self, other: &mut Self) {
        // SAFETY: the matrix invariant says all slots are live; storage
        // immediately releases the emptied block afterwards.
        unsafe { self.destroy_elements() };
        self.data.take_storage_from(&mut other.data);
    }

    /// Copy-assignment: replace own contents with a copy of `source`'s.
    ///
    /// The current block is deallocated *before* the new one is
    /// allocated, so an allocator whose budget fits only one copy can
    /// still satisfy the request. On failure `self` is left valid and
    /// empty. The allocator used for the new block is `source`'s iff
    /// [`BlockAlloc::PROPAGATE_ON_CLONE_FROM`], otherwise `self`'s own.
    pub fn try_clone_from(&mut self, source: &Self) -> Result<(), AllocError>
    where
        T: Clone,
    {
        let alloc = if A::PROPAGATE_ON_CLONE_FROM {
            source.data.allocator().clone()
        } else {
            self.data.allocator().clone()
        };
        // Tear down first. Should the copy below fail or unwind, self
        // stays in this valid empty state.
        *self = Self::empty_in(alloc.clone());
        *self = source.try_clone_in(alloc)?;
        Ok(())
    }

    /// Swap contents with `other`. Blocks and shapes are exchanged as
    /// pointers; no element moves.
    ///
    /// Allocators are swapped iff [`BlockAlloc::PROPAGATE_ON_SWAP`]; a
    /// non-propagating allocator must satisfy [`BlockAlloc::same_source`]
    /// with `other`'s.
    pub fn swap_with(&mut self, other: &mut Self) {
        self.data.swap_with(&mut other.data);
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.data.rows()
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.data.cols()
    }

    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.data.rows(), self.data.cols())
    }

    /// Total element count, `rows * cols`.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the matrix holds no elements.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The allocator instance this matrix frees through.
    pub fn allocator(&self) -> &A {
        self.data.allocator()
    }

    /// Raw pointer to the first element, or null when empty.
    pub fn as_ptr(&self) -> *const T {
        self.data.as_ptr()
    }

    /// Mutable raw pointer to the first element, or null when empty.
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.data
            .block_ptr()
            .map_or(std::ptr::null_mut(), NonNull::as_ptr)
    }

    /// All elements in row-major order.
    pub fn as_slice(&self) -> &[T] {
        let base = self.data.block_ptr().unwrap_or(NonNull::dangling());
        // SAFETY: the matrix invariant says all len() slots are live; the
        // dangling base is only ever paired with len() == 0.
        unsafe { slice::from_raw_parts(base.as_ptr(), self.len()) }
    }

    /// All elements in row-major order, mutably.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        let base = self.data.block_ptr().unwrap_or(NonNull::dangling());
        let len = self.len();
        // SAFETY: as for as_slice, plus exclusive access through &mut self.
        unsafe { slice::from_raw_parts_mut(base.as_ptr(), len) }
    }

    /// The element at `(row, col)`, or `None` out of bounds.
    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        if row < self.rows() && col < self.cols() {
            self.as_slice().get(row_major(row, col, self.cols()))
        } else {
            None
        }
    }

    /// The element at `(row, col)` mutably, or `None` out of bounds.
    pub fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut T> {
        if row < self.rows() && col < self.cols() {
            let idx = row_major(row, col, self.cols());
            self.as_mut_slice().get_mut(idx)
        } else {
            None
        }
    }

    /// Row `row` as a slice, or `None` out of bounds.
    pub fn row(&self, row: usize) -> Option<&[T]> {
        if row < self.rows() {
            let start = row_major(row, 0, self.cols());
            Some(&self.as_slice()[start..start + self.cols()])
        } else {
            None
        }
    }

    /// Row `row` as a mutable slice, or `None` out of bounds.
    pub fn row_mut(&mut self, row: usize) -> Option<&mut [T]> {
        if row < self.rows() {
            let cols = self.cols();
            let start = row_major(row, 0, cols);
            Some(&mut self.as_mut_slice()[start..start + cols])
        } else {
            None
        }
    }

    /// Destroy all elements in reverse order, leaving the block
    /// uninitialized but still allocated.
    ///
    /// # Safety
    /// All `len()` slots must currently be live, and the caller must not
    /// touch them again before refilling or releasing the block.
    unsafe fn destroy_elements(&mut self) {
        let (alloc, base, len) = self.data.fill_parts();
        let mut i = len;
        while i > 0 {
            i -= 1;
            // SAFETY: slot i is live per the caller's contract and is
            // destroyed exactly once.
            unsafe { alloc.destroy(base.as_ptr().add(i)) };
        }
    }
}

impl<T: Default, A: BlockAlloc<T> + Default> Matrix<T, A> {
    /// A `rows x cols` matrix with every element default-constructed.
    pub fn new(rows: usize, cols: usize) -> Result<Self, AllocError> {
        Self::new_in(rows, cols, A::default())
    }
}

impl<T: Clone, A: BlockAlloc<T> + Default> Matrix<T, A> {
    /// A `rows x cols` matrix with every element cloned from `value`.
    pub fn filled(rows: usize, cols: usize, value: &T) -> Result<Self, AllocError> {
        Self::filled_in(rows, cols, value, A::default())
    }
}

impl<T: Default, A: BlockAlloc<T> + Default> Matrix<T, A> {
    /// A `rows x cols` matrix filled row-major from `values`.
    pub fn from_values<I>(
        rows: usize,
        cols: usize,
        values: I,
        policy: FillPolicy,
    ) -> Result<Self, FillError>
    where
        I: IntoIterator<Item = T>,
    {
        Self::from_values_in(rows, cols, values, policy, A::default())
    }

    /// A `rows x cols` matrix filled column-major from `values`.
    pub fn from_values_transposed<I>(
        rows: usize,
        cols: usize,
        values: I,
        policy: FillPolicy,
    ) -> Result<Self, FillError>
    where
        I: IntoIterator<Item = T>,
    {
        Self::from_values_transposed_in(rows, cols, values, policy, A::default())
    }
}

impl<T, A: BlockAlloc<T> + Default> Matrix<T, A> {
    /// A converting copy of `source` in a default allocator.
    pub fn from_matrix<U, B>(source: &Matrix<U, B>) -> Result<Self, AllocError>
    where
        T: From<U>,
        U: Clone,
        B: BlockAlloc<U>,
    {
        Self::from_matrix_in(source, A::default())
    }

    /// A converting transposed copy of `source` in a default allocator.
    pub fn from_matrix_transposed<U, B>(source: &Matrix<U, B>) -> Result<Self, AllocError>
    where
        T: From<U>,
        U: Clone,
        B: BlockAlloc<U>,
    {
        Self::from_matrix_transposed_in(source, A::default())
    }
}

impl<T, A: BlockAlloc<T>> Drop for Matrix<T, A> {
    fn drop(&mut self) {
        // SAFETY: the matrix invariant says all slots are live; storage
        // frees the block right after.
        unsafe { self.destroy_elements() };
    }
}

impl<T, A: BlockAlloc<T> + Default> Default for Matrix<T, A> {
    fn default() -> Self {
        Self::empty_in(A::default())
    }
}

impl<T: Clone, A: BlockAlloc<T>> Clone for Matrix<T, A> {
    /// Panics on allocation failure; use [`Matrix::try_clone`] to
    /// observe the error instead.
    fn clone(&self) -> Self {
        match self.try_clone() {
            Ok(copy) => copy,
            Err(err) => panic!("matrix clone failed: {err}"),
        }
    }

    /// Panics on allocation failure; use [`Matrix::try_clone_from`] to
    /// observe the error instead.
    fn clone_from(&mut self, source: &Self) {
        if let Err(err) = self.try_clone_from(source) {
            panic!("matrix clone failed: {err}");
        }
    }
}

impl<T: PartialEq, A: BlockAlloc<T>, B: BlockAlloc<T>> PartialEq<Matrix<T, B>> for Matrix<T, A> {
    fn eq(&self, other: &Matrix<T, B>) -> bool {
        self.shape() == other.shape() && self.as_slice() == other.as_slice()
    }
}

impl<T: Eq, A: BlockAlloc<T>> Eq for Matrix<T, A> {}

impl<T: fmt::Debug, A: BlockAlloc<T>> fmt::Debug for Matrix<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rows = f.debug_list();
        for row in 0..self.rows() {
            rows.entry(&self.row(row).unwrap_or(&[]));
        }
        rows.finish()
    }
}
