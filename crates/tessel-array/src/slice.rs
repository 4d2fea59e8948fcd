//! Strided, optionally transposed views of an [`Array`].
//!
//! A view selects the rows in one [`LinearSequence`] and the columns in
//! another. Transposing swaps the logical axes without touching storage:
//! logical `(y, x)` of a transposed view is `(x, y)` of the untransposed
//! one. Views are `Copy` handles like arrays, and any number of them may
//! refer to the same array.

use tessel_arena::MemoryStack;
use tessel_core::{Element, KernelError};

use crate::array::Array;
use crate::display::ArrayDisplay;
use crate::sequence::LinearSequence;

/// A read-only view of an [`Array`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConstArraySlice<T: Element> {
    array: Array<T>,
    ys: LinearSequence<i32>,
    xs: LinearSequence<i32>,
    transposed: bool,
}

impl<T: Element> ConstArraySlice<T> {
    /// Callers guarantee every index in `ys` and `xs` is in bounds.
    pub(crate) fn new(array: Array<T>, ys: LinearSequence<i32>, xs: LinearSequence<i32>) -> Self {
        Self {
            array,
            ys,
            xs,
            transposed: false,
        }
    }

    /// The underlying array.
    pub fn array(&self) -> &Array<T> {
        &self.array
    }

    /// The selected rows of the underlying array.
    pub fn ys(&self) -> &LinearSequence<i32> {
        &self.ys
    }

    /// The selected columns of the underlying array.
    pub fn xs(&self) -> &LinearSequence<i32> {
        &self.xs
    }

    /// Whether the logical axes are swapped.
    pub fn is_transposed(&self) -> bool {
        self.transposed
    }

    /// Swap the logical axes.
    pub fn transpose(self) -> Self {
        Self {
            transposed: !self.transposed,
            ..self
        }
    }

    /// Logical `(height, width)`.
    pub fn shape(&self) -> (usize, usize) {
        if self.transposed {
            (self.xs.size(), self.ys.size())
        } else {
            (self.ys.size(), self.xs.size())
        }
    }

    /// Logical number of rows.
    pub fn height(&self) -> usize {
        self.shape().0
    }

    /// Logical number of columns.
    pub fn width(&self) -> usize {
        self.shape().1
    }

    /// Number of elements in the view.
    pub fn len(&self) -> usize {
        self.ys.size() * self.xs.size()
    }

    /// Whether the view selects no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the underlying array handle is usable.
    pub fn is_valid(&self) -> bool {
        self.array.is_valid()
    }

    /// Validate the underlying array against `ms`.
    pub fn check(&self, ms: &MemoryStack<'_>) -> Result<(), KernelError> {
        self.array.check(ms)
    }

    /// Map logical `(y, x)` to a `(row, column)` of the underlying array.
    ///
    /// # Panics
    ///
    /// Panics if the position is outside the view.
    pub fn position(&self, y: usize, x: usize) -> (usize, usize) {
        let (h, w) = self.shape();
        assert!(
            y < h && x < w,
            "position ({y}, {x}) out of bounds for {h}x{w} view"
        );
        let (r, c) = if self.transposed { (x, y) } else { (y, x) };
        // Construction checked every selected index is non-negative.
        (self.ys.value(r) as usize, self.xs.value(c) as usize)
    }

    /// The element at logical `(y, x)`.
    pub fn get(&self, ms: &MemoryStack<'_>, y: usize, x: usize) -> T {
        let (r, c) = self.position(y, x);
        self.array.get(ms, r, c)
    }

    /// The elements in logical row-major order.
    pub fn iter<'m>(&self, ms: &'m MemoryStack<'m>) -> impl Iterator<Item = T> + 'm {
        let view = *self;
        let (h, w) = view.shape();
        (0..h).flat_map(move |y| (0..w).map(move |x| view.get(ms, y, x)))
    }

    /// A [`std::fmt::Display`] adapter that prints the elements.
    pub fn display<'m>(&self, ms: &'m MemoryStack<'_>) -> ArrayDisplay<'m, T> {
        ArrayDisplay::new(*self, ms)
    }
}

/// A writable view of an [`Array`].
///
/// Writes go through the [`MemoryStack`] the array lives in, so they take
/// `&mut MemoryStack`. Reading methods match [`ConstArraySlice`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArraySlice<T: Element> {
    inner: ConstArraySlice<T>,
}

impl<T: Element> ArraySlice<T> {
    pub(crate) fn new(array: Array<T>, ys: LinearSequence<i32>, xs: LinearSequence<i32>) -> Self {
        Self {
            inner: ConstArraySlice::new(array, ys, xs),
        }
    }

    /// This view, read-only.
    pub fn as_const(&self) -> ConstArraySlice<T> {
        self.inner
    }

    /// The underlying array.
    pub fn array(&self) -> &Array<T> {
        self.inner.array()
    }

    /// Whether the logical axes are swapped.
    pub fn is_transposed(&self) -> bool {
        self.inner.is_transposed()
    }

    /// Swap the logical axes.
    pub fn transpose(self) -> Self {
        Self {
            inner: self.inner.transpose(),
        }
    }

    /// Logical `(height, width)`.
    pub fn shape(&self) -> (usize, usize) {
        self.inner.shape()
    }

    /// Logical number of rows.
    pub fn height(&self) -> usize {
        self.inner.height()
    }

    /// Logical number of columns.
    pub fn width(&self) -> usize {
        self.inner.width()
    }

    /// Number of elements in the view.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether the view selects no elements.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Whether the underlying array handle is usable.
    pub fn is_valid(&self) -> bool {
        self.inner.is_valid()
    }

    /// Validate the underlying array against `ms`.
    pub fn check(&self, ms: &MemoryStack<'_>) -> Result<(), KernelError> {
        self.inner.check(ms)
    }

    /// See [`ConstArraySlice::position`].
    pub fn position(&self, y: usize, x: usize) -> (usize, usize) {
        self.inner.position(y, x)
    }

    /// The element at logical `(y, x)`.
    pub fn get(&self, ms: &MemoryStack<'_>, y: usize, x: usize) -> T {
        self.inner.get(ms, y, x)
    }

    /// Store `value` at logical `(y, x)`.
    ///
    /// # Panics
    ///
    /// Panics if the position is outside the view.
    pub fn set(&self, ms: &mut MemoryStack<'_>, y: usize, x: usize, value: T) {
        let (r, c) = self.inner.position(y, x);
        self.inner.array.set(ms, r, c, value);
    }

    /// Set every element of the view. Returns the number written.
    pub fn fill(&self, ms: &mut MemoryStack<'_>, value: T) -> usize {
        if !self.is_valid() {
            return 0;
        }
        let (h, w) = self.shape();
        for y in 0..h {
            for x in 0..w {
                self.set(ms, y, x, value);
            }
        }
        self.len()
    }

    /// Zero every element of the view. Returns the number written.
    pub fn set_zero(&self, ms: &mut MemoryStack<'_>) -> usize {
        self.fill(ms, T::ZERO)
    }

    /// Copy `source` into this view.
    ///
    /// Shapes must match. With `auto_transpose`, a source whose shape is
    /// this view's shape swapped is copied as its transpose. Returns the
    /// number of elements copied, or 0 when the shapes are incompatible.
    ///
    /// Copying between overlapping views of one array proceeds element by
    /// element in logical row-major order.
    pub fn copy_from(
        &self,
        ms: &mut MemoryStack<'_>,
        source: impl Into<ConstArraySlice<T>>,
        auto_transpose: bool,
    ) -> usize {
        let mut source = source.into();
        if !self.is_valid() || !source.is_valid() {
            return 0;
        }
        let (h, w) = self.shape();
        if source.shape() != (h, w) {
            if auto_transpose && source.shape() == (w, h) {
                source = source.transpose();
            } else {
                return 0;
            }
        }
        for y in 0..h {
            for x in 0..w {
                let v = source.get(ms, y, x);
                self.set(ms, y, x, v);
            }
        }
        h * w
    }

    /// Copy `data` in logical row-major order, stopping at whichever runs
    /// out first. Returns the number of elements copied.
    pub fn copy_from_slice(&self, ms: &mut MemoryStack<'_>, data: &[T]) -> usize {
        self.set_cast(ms, data)
    }

    /// Like [`copy_from_slice`](Self::copy_from_slice), converting each
    /// element with `as` semantics.
    pub fn set_cast<U: Element>(&self, ms: &mut MemoryStack<'_>, data: &[U]) -> usize {
        let (_, w) = self.shape();
        if !self.is_valid() || w == 0 {
            return 0;
        }
        let n = data.len().min(self.len());
        for (i, &v) in data[..n].iter().enumerate() {
            self.set(ms, i / w, i % w, v.cast());
        }
        n
    }

    /// Write a sequence into a one-row or one-column view.
    pub fn set_sequence(
        &self,
        ms: &mut MemoryStack<'_>,
        sequence: &LinearSequence<T>,
    ) -> Result<(), KernelError> {
        sequence.evaluate_into(ms, *self)
    }

    /// A [`std::fmt::Display`] adapter that prints the elements.
    pub fn display<'m>(&self, ms: &'m MemoryStack<'_>) -> ArrayDisplay<'m, T> {
        self.inner.display(ms)
    }
}

impl<T: Element> From<Array<T>> for ConstArraySlice<T> {
    fn from(array: Array<T>) -> Self {
        let ys = LinearSequence::with_size(0, 1, array.height());
        let xs = LinearSequence::with_size(0, 1, array.width());
        Self::new(array, ys, xs)
    }
}

impl<T: Element> From<Array<T>> for ArraySlice<T> {
    fn from(array: Array<T>) -> Self {
        Self {
            inner: ConstArraySlice::from(array),
        }
    }
}

impl<T: Element> From<ArraySlice<T>> for ConstArraySlice<T> {
    fn from(slice: ArraySlice<T>) -> Self {
        slice.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessel_arena::AlignedBuffer;

    fn numbered(ms: &mut MemoryStack<'_>) -> (Array<u8>, Array<u8>) {
        let a1 = Array::<u8>::new(5, 6, ms).unwrap();
        let a2 = Array::<u8>::new(5, 6, ms).unwrap();
        let values: Vec<u8> = (0..30).collect();
        a2.copy_from_slice(ms, &values);
        (a1, a2)
    }

    #[test]
    fn plain_copy() {
        let mut buf = AlignedBuffer::new(1024);
        let mut ms = MemoryStack::new(buf.as_bytes_mut());
        let (a1, a2) = numbered(&mut ms);
        let dst = a1.range(0, 2, 0, 3).unwrap();
        assert_eq!(dst.copy_from(&mut ms, a2.range(1, 3, 1, 4).unwrap(), true), 12);
        for y in 0..5 {
            for x in 0..6 {
                let expected = if y <= 2 && x <= 3 { a2.get(&ms, y + 1, x + 1) } else { 0 };
                assert_eq!(a1.get(&ms, y, x), expected);
            }
        }
    }

    #[test]
    fn automatic_transpose() {
        let mut buf = AlignedBuffer::new(1024);
        let mut ms = MemoryStack::new(buf.as_bytes_mut());
        let (a1, a2) = numbered(&mut ms);
        let dst = a1.range(0, -1, 0, 2).unwrap();
        let src = a2.range(1, 3, 0, 4).unwrap();
        assert_eq!(dst.copy_from(&mut ms, src, true), 15);
        for y in 0..5 {
            for x in 0..6 {
                let expected = if x <= 2 { a2.get(&ms, x + 1, y) } else { 0 };
                assert_eq!(a1.get(&ms, y, x), expected);
            }
        }
    }

    #[test]
    fn swapped_shape_without_auto_transpose_copies_nothing() {
        let mut buf = AlignedBuffer::new(1024);
        let mut ms = MemoryStack::new(buf.as_bytes_mut());
        let (a1, a2) = numbered(&mut ms);
        let dst = a1.range(0, -1, 0, 2).unwrap();
        let src = a2.range(1, 3, 0, 4).unwrap();
        assert_eq!(dst.copy_from(&mut ms, src, false), 0);
        assert!(a1.as_const_slice().iter(&ms).all(|v| v == 0));
        assert_eq!(dst.copy_from(&mut ms, src.transpose(), false), 15);
        assert_eq!(a1.get(&ms, 4, 2), a2.get(&ms, 3, 4));
    }

    #[test]
    fn strided_view_reads_selected_elements() {
        let mut buf = AlignedBuffer::new(1024);
        let mut ms = MemoryStack::new(buf.as_bytes_mut());
        let (_, a2) = numbered(&mut ms);
        let view = a2.range_step(0, 2, 4, 1, 2, 5).unwrap().as_const();
        assert_eq!(view.shape(), (3, 3));
        let values: Vec<u8> = view.iter(&ms).collect();
        assert_eq!(values, vec![1, 3, 5, 13, 15, 17, 25, 27, 29]);
        let t: Vec<u8> = view.transpose().iter(&ms).collect();
        assert_eq!(t, vec![1, 13, 25, 3, 15, 27, 5, 17, 29]);
    }

    #[test]
    fn transpose_flips_shape_and_positions() {
        let mut buf = AlignedBuffer::new(1024);
        let mut ms = MemoryStack::new(buf.as_bytes_mut());
        let a = Array::<i32>::new(3, 1, &mut ms).unwrap();
        let col = a.range_step(0, 1, 2, 0, 1, 0).unwrap();
        assert_eq!(col.shape(), (3, 1));
        let row = col.transpose();
        assert_eq!(row.shape(), (1, 3));
        row.set(&mut ms, 0, 2, 7);
        assert_eq!(a.get(&ms, 2, 0), 7);
        assert_eq!(row.position(0, 1), (1, 0));
    }

    #[test]
    fn fill_only_touches_the_view() {
        let mut buf = AlignedBuffer::new(1024);
        let mut ms = MemoryStack::new(buf.as_bytes_mut());
        let a = Array::<u16>::new(4, 4, &mut ms).unwrap();
        assert_eq!(a.range(1, 2, 1, 2).unwrap().fill(&mut ms, 9), 4);
        let total: u32 = a.as_const_slice().iter(&ms).map(u32::from).sum();
        assert_eq!(total, 36);
        assert_eq!(a.get(&ms, 2, 2), 9);
        assert_eq!(a.get(&ms, 3, 3), 0);
    }

    #[test]
    fn set_sequence_on_a_row() {
        let mut buf = AlignedBuffer::new(1024);
        let mut ms = MemoryStack::new(buf.as_bytes_mut());
        let a = Array::<u8>::new(3, 5, &mut ms).unwrap();
        for (y, start) in [(0, 1u8), (1, 11), (2, 21)] {
            let row = a.range(y, y, 0, -1).unwrap();
            row.set_sequence(&mut ms, &LinearSequence::new(start, start + 4))
                .unwrap();
        }
        assert_eq!(a.row(&ms, 1), &[11, 12, 13, 14, 15]);
        assert_eq!(a.row(&ms, 2), &[21, 22, 23, 24, 25]);
    }

    #[test]
    fn set_cast_through_a_transposed_view() {
        let mut buf = AlignedBuffer::new(1024);
        let mut ms = MemoryStack::new(buf.as_bytes_mut());
        let a = Array::<i16>::new(2, 3, &mut ms).unwrap();
        let t = a.as_slice().transpose();
        assert_eq!(t.set_cast(&mut ms, &[1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]), 6);
        assert_eq!(a.row(&ms, 0), &[1, 3, 5]);
        assert_eq!(a.row(&ms, 1), &[2, 4, 6]);
    }
}
