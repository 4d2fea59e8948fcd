//! The [`Array`] handle.

use std::fmt;
use std::marker::PhantomData;
use std::mem::size_of;

use tessel_arena::{Allocation, ArenaError, MemoryStack, ALIGNMENT};
use tessel_core::{Element, KernelError};

use crate::sequence::LinearSequence;
use crate::slice::{ArraySlice, ConstArraySlice};

/// Where an array's elements live.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Backing {
    /// A zero-element array. Valid, with nothing to store.
    Empty,
    /// One allocation on a memory stack.
    Allocated(Allocation),
    /// Never allocated, or released by a failed resize.
    Released,
}

/// A `height x width` array of `T` stored in one [`MemoryStack`]
/// allocation.
///
/// The array is a small `Copy` handle. Element storage belongs to the stack,
/// so reads take `&MemoryStack` and writes take `&mut MemoryStack`. Rows are
/// padded to a 16-byte stride, which keeps every row aligned.
///
/// Accessors panic on out-of-range indices, like slice indexing. Use
/// [`check`](Self::check) to validate a handle against its stack.
#[derive(Clone, Copy, PartialEq)]
pub struct Array<T: Element> {
    backing: Backing,
    height: usize,
    width: usize,
    /// Bytes between the starts of consecutive rows.
    stride: usize,
    _marker: PhantomData<T>,
}

/// Row stride in bytes for `width` elements of `T`.
fn stride_for<T: Element>(width: usize) -> Option<usize> {
    let bytes = size_of::<T>().checked_mul(width.max(1))?;
    bytes
        .checked_add(ALIGNMENT - 1)
        .map(|v| v / ALIGNMENT * ALIGNMENT)
}

impl<T: Element> Array<T> {
    /// Allocate a zeroed `height x width` array.
    ///
    /// Zero dimensions give a valid, empty array that owns no allocation.
    pub fn new(height: usize, width: usize, ms: &mut MemoryStack<'_>) -> Result<Self, KernelError> {
        let (stride, bytes) = Self::layout(height, width)?;
        if bytes == 0 {
            return Ok(Self::from_parts(Backing::Empty, height, width, stride));
        }
        let alloc = ms.allocate(bytes)?;
        // The stack may be configured not to zero fill; arrays always start zeroed.
        if !ms.config().zero_allocations {
            ms.data_mut(&alloc).fill(0);
        }
        Ok(Self::from_parts(Backing::Allocated(alloc), height, width, stride))
    }

    /// An array handle with no storage. [`is_valid`](Self::is_valid) is
    /// false and every fallible operation on it reports
    /// [`KernelError::InvalidObject`].
    pub fn invalid() -> Self {
        Self::from_parts(Backing::Released, 0, 0, ALIGNMENT)
    }

    fn from_parts(backing: Backing, height: usize, width: usize, stride: usize) -> Self {
        Self {
            backing,
            height,
            width,
            stride,
            _marker: PhantomData,
        }
    }

    fn layout(height: usize, width: usize) -> Result<(usize, usize), KernelError> {
        let too_large = KernelError::InvalidParameter {
            reason: "array dimensions overflow",
        };
        let stride = stride_for::<T>(width).ok_or(too_large.clone())?;
        let bytes = if width == 0 {
            0
        } else {
            height.checked_mul(stride).ok_or(too_large)?
        };
        Ok((stride, bytes))
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// `(height, width)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    /// Size of dimension `dim` (0 for rows, 1 for columns).
    pub fn size(&self, dim: usize) -> usize {
        match dim {
            0 => self.height,
            1 => self.width,
            _ => 1,
        }
    }

    /// Bytes between consecutive rows.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        self.height * self.width
    }

    /// Whether the array holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The backing allocation, if any.
    pub fn allocation(&self) -> Option<Allocation> {
        match self.backing {
            Backing::Allocated(a) => Some(a),
            Backing::Empty | Backing::Released => None,
        }
    }

    /// Whether two arrays share the same backing allocation.
    pub fn shares_storage_with<U: Element>(&self, other: &Array<U>) -> bool {
        match (self.allocation(), other.allocation()) {
            (Some(a), Some(b)) => a.overlaps(&b),
            _ => false,
        }
    }

    /// Whether the handle refers to element storage.
    ///
    /// Zero-sized arrays own no allocation and report `false`, as do
    /// released handles; only the latter fail [`check`](Self::check). This
    /// only inspects the handle, while `check` also validates the
    /// allocation against its stack.
    pub fn is_valid(&self) -> bool {
        matches!(self.backing, Backing::Allocated(_))
    }

    /// Validate the handle and its allocation's guards against `ms`.
    pub fn check(&self, ms: &MemoryStack<'_>) -> Result<(), KernelError> {
        match self.backing {
            Backing::Released => Err(KernelError::InvalidObject {
                what: "array has no storage",
            }),
            Backing::Empty => Ok(()),
            Backing::Allocated(a) => Ok(ms.check(&a)?),
        }
    }

    /// Resize in place.
    ///
    /// Only the stack's topmost allocation can be resized, and only to a
    /// size no larger than it already has. Element contents after a resize
    /// are the old bytes reinterpreted with the new stride.
    ///
    /// Resizing an array that is not on top of the stack releases the
    /// handle: the array becomes invalid with a `0 x 0` shape and the call
    /// fails with [`KernelError::UninitializedMemory`].
    pub fn resize(
        &mut self,
        height: usize,
        width: usize,
        ms: &mut MemoryStack<'_>,
    ) -> Result<(), KernelError> {
        let (stride, bytes) = Self::layout(height, width)?;
        let alloc = match self.backing {
            Backing::Released => {
                return Err(KernelError::InvalidObject {
                    what: "array has no storage",
                })
            }
            Backing::Empty => {
                *self = Self::new(height, width, ms)?;
                return Ok(());
            }
            Backing::Allocated(alloc) => alloc,
        };
        if bytes == 0 {
            return Err(KernelError::InvalidParameter {
                reason: "cannot resize an allocated array to zero elements",
            });
        }
        match ms.reallocate(&alloc, bytes) {
            Ok(resized) => {
                *self = Self::from_parts(Backing::Allocated(resized), height, width, stride);
                Ok(())
            }
            Err(ArenaError::NotTopmost { .. }) => {
                log::debug!("resize of non-topmost array at offset {}", alloc.offset());
                *self = Self::invalid();
                Err(KernelError::UninitializedMemory)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn bytes<'m>(&self, ms: &'m MemoryStack<'_>) -> &'m [u8] {
        match self.backing {
            Backing::Allocated(a) => ms.data(&a),
            Backing::Empty | Backing::Released => &[],
        }
    }

    fn bytes_mut<'m>(&self, ms: &'m mut MemoryStack<'_>) -> &'m mut [u8] {
        match self.backing {
            Backing::Allocated(a) => ms.data_mut(&a),
            Backing::Empty | Backing::Released => &mut [],
        }
    }

    fn row_range(&self, y: usize) -> std::ops::Range<usize> {
        assert!(
            y < self.height,
            "row {y} out of bounds for array of height {}",
            self.height
        );
        let start = y * self.stride;
        start..start + self.width * size_of::<T>()
    }

    /// Row `y` as a slice.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    pub fn row<'m>(&self, ms: &'m MemoryStack<'_>, y: usize) -> &'m [T] {
        let range = self.row_range(y);
        bytemuck::cast_slice(&self.bytes(ms)[range])
    }

    /// Row `y` as a mutable slice.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    pub fn row_mut<'m>(&self, ms: &'m mut MemoryStack<'_>, y: usize) -> &'m mut [T] {
        let range = self.row_range(y);
        bytemuck::cast_slice_mut(&mut self.bytes_mut(ms)[range])
    }

    /// The element at `(y, x)`.
    ///
    /// # Panics
    ///
    /// Panics if the position is out of bounds.
    pub fn get(&self, ms: &MemoryStack<'_>, y: usize, x: usize) -> T {
        assert!(
            x < self.width,
            "column {x} out of bounds for array of width {}",
            self.width
        );
        self.row(ms, y)[x]
    }

    /// Store `value` at `(y, x)`.
    ///
    /// # Panics
    ///
    /// Panics if the position is out of bounds.
    pub fn set(&self, ms: &mut MemoryStack<'_>, y: usize, x: usize, value: T) {
        assert!(
            x < self.width,
            "column {x} out of bounds for array of width {}",
            self.width
        );
        self.row_mut(ms, y)[x] = value;
    }

    /// Set every element to `value`. Returns the number of elements written.
    pub fn fill(&self, ms: &mut MemoryStack<'_>, value: T) -> usize {
        if !self.is_valid() {
            return 0;
        }
        for y in 0..self.height {
            self.row_mut(ms, y).fill(value);
        }
        self.len()
    }

    /// Set every element to zero. Returns the number of elements written.
    pub fn set_zero(&self, ms: &mut MemoryStack<'_>) -> usize {
        self.fill(ms, T::ZERO)
    }

    /// Copy `data` in row-major order, stopping at whichever runs out
    /// first. Returns the number of elements copied.
    pub fn copy_from_slice(&self, ms: &mut MemoryStack<'_>, data: &[T]) -> usize {
        self.set_cast(ms, data)
    }

    /// Like [`copy_from_slice`](Self::copy_from_slice), converting each
    /// element with `as` semantics.
    pub fn set_cast<U: Element>(&self, ms: &mut MemoryStack<'_>, data: &[U]) -> usize {
        if !self.is_valid() || self.width == 0 {
            return 0;
        }
        let mut copied = 0;
        for (y, chunk) in data.chunks(self.width).take(self.height).enumerate() {
            let row = self.row_mut(ms, y);
            for (dst, &src) in row.iter_mut().zip(chunk) {
                *dst = src.cast();
            }
            copied += chunk.len();
        }
        copied
    }

    /// A mutable view of the whole array.
    pub fn as_slice(&self) -> ArraySlice<T> {
        ArraySlice::from(*self)
    }

    /// A read-only view of the whole array.
    pub fn as_const_slice(&self) -> ConstArraySlice<T> {
        ConstArraySlice::from(*self)
    }

    /// A view of rows `y0..=y1` and columns `x0..=x1`.
    ///
    /// Negative bounds count from the end: `-1` is the last index.
    pub fn range(&self, y0: i32, y1: i32, x0: i32, x1: i32) -> Result<ArraySlice<T>, KernelError> {
        self.range_step(y0, 1, y1, x0, 1, x1)
    }

    /// A strided view, with bounds as in [`range`](Self::range).
    pub fn range_step(
        &self,
        y0: i32,
        y_increment: i32,
        y1: i32,
        x0: i32,
        x_increment: i32,
        x1: i32,
    ) -> Result<ArraySlice<T>, KernelError> {
        let ys = LinearSequence::with_increment(
            resolve_index(y0, self.height),
            y_increment,
            resolve_index(y1, self.height),
        );
        let xs = LinearSequence::with_increment(
            resolve_index(x0, self.width),
            x_increment,
            resolve_index(x1, self.width),
        );
        self.slice(ys, xs)
    }

    /// A view of the rows in `ys` and the columns in `xs`.
    ///
    /// Every index the sequences produce must be in bounds.
    pub fn slice(
        &self,
        ys: LinearSequence<i32>,
        xs: LinearSequence<i32>,
    ) -> Result<ArraySlice<T>, KernelError> {
        if !self.is_valid() {
            return Err(KernelError::InvalidObject {
                what: "array has no storage",
            });
        }
        if !sequence_in_bounds(&ys, self.height) || !sequence_in_bounds(&xs, self.width) {
            return Err(KernelError::InvalidParameter {
                reason: "slice index out of bounds",
            });
        }
        Ok(ArraySlice::new(*self, ys, xs))
    }

    /// A [`fmt::Display`] adapter that prints the elements.
    pub fn display<'m>(&self, ms: &'m MemoryStack<'_>) -> crate::display::ArrayDisplay<'m, T> {
        crate::display::ArrayDisplay::new(self.as_const_slice(), ms)
    }
}

impl<T: Element> Default for Array<T> {
    fn default() -> Self {
        Self::invalid()
    }
}

impl<T: Element> fmt::Debug for Array<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Array")
            .field("kind", &T::KIND)
            .field("height", &self.height)
            .field("width", &self.width)
            .field("stride", &self.stride)
            .field("allocation", &self.allocation())
            .field("valid", &self.is_valid())
            .finish()
    }
}

fn resolve_index(index: i32, len: usize) -> i32 {
    if index < 0 {
        // Lengths beyond i32 cannot be addressed by slice indices anyway.
        index.saturating_add(i32::try_from(len).unwrap_or(i32::MAX))
    } else {
        index
    }
}

fn sequence_in_bounds(seq: &LinearSequence<i32>, len: usize) -> bool {
    let (Some(first), Some(last)) = (seq.first(), seq.last()) else {
        return true;
    };
    let in_bounds = |v: i32| usize::try_from(v).is_ok_and(|v| v < len);
    in_bounds(first) && in_bounds(last)
}
