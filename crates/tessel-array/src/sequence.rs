//! Lazy arithmetic sequences and coordinate grids.
//!
//! A [`LinearSequence`] is `start, start + increment, ...` for `size`
//! elements. Nothing is materialized until [`LinearSequence::evaluate`] or
//! [`LinearSequence::evaluate_into`] writes it into an array. A
//! [`Meshgrid`] pairs two sequences into the x and y coordinates of a grid.

use tessel_arena::MemoryStack;
use tessel_core::{Element, KernelError, Order};

use crate::array::Array;
use crate::slice::ArraySlice;

/// Number of elements in `start:increment:end`.
///
/// The quotient gets a small relative tolerance so that float sequences
/// like `0.1:0.1:0.3` are not cut short by rounding.
fn colon_size(start: f64, increment: f64, end: f64) -> usize {
    if increment == 0.0 || !increment.is_finite() {
        return 0;
    }
    let q = (end - start) / increment;
    let tol = 1e-6 * q.abs().max(1.0);
    if !q.is_finite() || q < -tol {
        return 0;
    }
    // `as` saturates, and a sequence that long cannot be evaluated anyway.
    ((q + tol).floor() as usize).saturating_add(1)
}

/// An arithmetic sequence of `size` values.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearSequence<T: Element> {
    start: T,
    increment: T,
    size: usize,
}

impl<T: Element> LinearSequence<T> {
    /// `start, start + 1, ..., end`, inclusive.
    pub fn new(start: T, end: T) -> Self {
        Self::with_increment(start, T::ONE, end)
    }

    /// `start, start + increment, ...` up to and including `end` when it
    /// lands on the grid.
    ///
    /// The sequence is empty when `increment` is zero or points away from
    /// `end`.
    pub fn with_increment(start: T, increment: T, end: T) -> Self {
        let size = colon_size(start.to_f64(), increment.to_f64(), end.to_f64());
        Self {
            start,
            increment,
            size,
        }
    }

    /// A sequence with an explicit element count.
    pub fn with_size(start: T, increment: T, size: usize) -> Self {
        Self {
            start,
            increment,
            size,
        }
    }

    /// `n` evenly spaced values from `start` to `end`.
    ///
    /// The increment is computed in `T`. For integer types that rounds the
    /// step toward zero, and the size is then recomputed from the rounded
    /// step, so `linspace(0, 9, 9)` has 10 elements. Float sequences keep
    /// exactly `n` elements.
    pub fn linspace(start: T, end: T, n: usize) -> Self {
        match n {
            0 => Self::with_size(start, T::ONE, 0),
            1 => Self::with_size(end, T::ZERO, 1),
            _ => {
                let increment = end.sub_wrapping(start).div_or_zero(T::from_i128(n as i128 - 1));
                if T::IS_INTEGER {
                    Self::with_increment(start, increment, end)
                } else {
                    Self::with_size(start, increment, n)
                }
            }
        }
    }

    /// First value, whether or not the sequence is empty.
    pub fn start(&self) -> T {
        self.start
    }

    /// Step between values.
    pub fn increment(&self) -> T {
        self.increment
    }

    /// Number of values.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Whether the sequence has no values.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// The `i`th value, computed as `start + i * increment` in `f64` and
    /// converted to `T` with `as` semantics.
    pub fn value(&self, i: usize) -> T {
        T::from_f64(self.start.to_f64() + i as f64 * self.increment.to_f64())
    }

    /// The first value, or `None` when empty.
    pub fn first(&self) -> Option<T> {
        (self.size > 0).then(|| self.value(0))
    }

    /// The last value, or `None` when empty.
    pub fn last(&self) -> Option<T> {
        self.size.checked_sub(1).map(|i| self.value(i))
    }

    /// The values in order.
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        (0..self.size).map(move |i| self.value(i))
    }

    /// Materialize as a new `1 x size` array.
    pub fn evaluate(&self, ms: &mut MemoryStack<'_>) -> Result<Array<T>, KernelError> {
        let out = Array::new(1, self.size, ms)?;
        if self.size > 0 {
            let row = out.row_mut(ms, 0);
            for (i, v) in row.iter_mut().enumerate() {
                *v = self.value(i);
            }
        }
        Ok(out)
    }

    /// Write the values into a one-row or one-column view of matching
    /// length.
    pub fn evaluate_into(
        &self,
        ms: &mut MemoryStack<'_>,
        out: ArraySlice<T>,
    ) -> Result<(), KernelError> {
        let (h, w) = out.shape();
        let horizontal = h == 1;
        if !(horizontal || w == 1) || h * w != self.size {
            return Err(KernelError::InvalidSize {
                expected: (1, self.size),
                found: (h, w),
            });
        }
        for i in 0..self.size {
            let (y, x) = if horizontal { (0, i) } else { (i, 0) };
            out.set(ms, y, x, self.value(i));
        }
        Ok(())
    }
}

/// The coordinates of a 2D grid: x varies along each row, y down each
/// column.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Meshgrid<T: Element> {
    x: LinearSequence<T>,
    y: LinearSequence<T>,
}

impl<T: Element> Meshgrid<T> {
    /// Combine an x sequence (columns) and a y sequence (rows).
    pub fn new(x: LinearSequence<T>, y: LinearSequence<T>) -> Self {
        Self { x, y }
    }

    /// The x (column) sequence.
    pub fn x(&self) -> &LinearSequence<T> {
        &self.x
    }

    /// The y (row) sequence.
    pub fn y(&self) -> &LinearSequence<T> {
        &self.y
    }

    /// `(ny, nx)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.y.size(), self.x.size())
    }

    /// Total number of grid points.
    pub fn len(&self) -> usize {
        self.x.size() * self.y.size()
    }

    /// Whether the grid has no points.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write the `ny x nx` grid of x coordinates.
    pub fn evaluate_x2(&self, ms: &mut MemoryStack<'_>, out: ArraySlice<T>) -> Result<(), KernelError> {
        self.fill_2d(ms, out, |_, x| self.x.value(x))
    }

    /// Write the `ny x nx` grid of y coordinates.
    pub fn evaluate_y2(&self, ms: &mut MemoryStack<'_>, out: ArraySlice<T>) -> Result<(), KernelError> {
        self.fill_2d(ms, out, |y, _| self.y.value(y))
    }

    /// Write the x coordinates of every grid point as a `1 x (nx * ny)`
    /// vector, visiting points in `order`.
    pub fn evaluate_x1(
        &self,
        ms: &mut MemoryStack<'_>,
        order: Order,
        out: ArraySlice<T>,
    ) -> Result<(), KernelError> {
        self.fill_1d(ms, order, out, |_, x| self.x.value(x))
    }

    /// Write the y coordinates of every grid point as a `1 x (nx * ny)`
    /// vector, visiting points in `order`.
    pub fn evaluate_y1(
        &self,
        ms: &mut MemoryStack<'_>,
        order: Order,
        out: ArraySlice<T>,
    ) -> Result<(), KernelError> {
        self.fill_1d(ms, order, out, |y, _| self.y.value(y))
    }

    /// The grid point at `(y, x)`, as `(x value, y value)`.
    pub fn point(&self, y: usize, x: usize) -> (T, T) {
        (self.x.value(x), self.y.value(y))
    }

    fn fill_2d(
        &self,
        ms: &mut MemoryStack<'_>,
        out: ArraySlice<T>,
        value: impl Fn(usize, usize) -> T,
    ) -> Result<(), KernelError> {
        if out.shape() != self.shape() {
            return Err(KernelError::InvalidSize {
                expected: self.shape(),
                found: out.shape(),
            });
        }
        let (ny, nx) = self.shape();
        for y in 0..ny {
            for x in 0..nx {
                out.set(ms, y, x, value(y, x));
            }
        }
        Ok(())
    }

    fn fill_1d(
        &self,
        ms: &mut MemoryStack<'_>,
        order: Order,
        out: ArraySlice<T>,
        value: impl Fn(usize, usize) -> T,
    ) -> Result<(), KernelError> {
        if out.shape() != (1, self.len()) {
            return Err(KernelError::InvalidSize {
                expected: (1, self.len()),
                found: out.shape(),
            });
        }
        let (ny, nx) = self.shape();
        for i in 0..self.len() {
            let (y, x) = match order {
                Order::RowMajor => (i / nx, i % nx),
                Order::ColumnMajor => (i % ny, i / ny),
            };
            out.set(ms, 0, i, value(y, x));
        }
        Ok(())
    }
}
