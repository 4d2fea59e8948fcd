//! Operands for elementwise operations: a view or a broadcast scalar.

use tessel_arena::MemoryStack;
use tessel_array::{Array, ArraySlice, ConstArraySlice};
use tessel_core::{Element, KernelError};

/// One input to an elementwise operation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Operand<T: Element> {
    /// A view whose shape must match the output.
    Slice(ConstArraySlice<T>),
    /// A value repeated at every position.
    Scalar(T),
}

impl<T: Element> Operand<T> {
    /// A scalar operand.
    pub fn scalar(value: T) -> Self {
        Self::Scalar(value)
    }

    /// The view's shape, or `None` for a scalar.
    pub fn shape(&self) -> Option<(usize, usize)> {
        match self {
            Self::Slice(s) => Some(s.shape()),
            Self::Scalar(_) => None,
        }
    }

    /// Validate a view operand against `ms` and against the shape `(h, w)`.
    pub(crate) fn check_against(
        &self,
        ms: &MemoryStack<'_>,
        shape: (usize, usize),
    ) -> Result<(), KernelError> {
        match self {
            Self::Scalar(_) => Ok(()),
            Self::Slice(s) => {
                s.check(ms)?;
                if s.shape() != shape {
                    return Err(KernelError::InvalidSize {
                        expected: shape,
                        found: s.shape(),
                    });
                }
                Ok(())
            }
        }
    }

    /// The value at logical `(y, x)`.
    #[inline]
    pub fn get(&self, ms: &MemoryStack<'_>, y: usize, x: usize) -> T {
        match self {
            Self::Slice(s) => s.get(ms, y, x),
            Self::Scalar(v) => *v,
        }
    }
}

impl<T: Element> From<ConstArraySlice<T>> for Operand<T> {
    fn from(s: ConstArraySlice<T>) -> Self {
        Self::Slice(s)
    }
}

impl<T: Element> From<ArraySlice<T>> for Operand<T> {
    fn from(s: ArraySlice<T>) -> Self {
        Self::Slice(s.as_const())
    }
}

impl<T: Element> From<Array<T>> for Operand<T> {
    fn from(a: Array<T>) -> Self {
        Self::Slice(a.as_const_slice())
    }
}

macro_rules! impl_scalar_operand {
    ($($t:ty),*) => {$(
        impl From<$t> for Operand<$t> {
            fn from(v: $t) -> Self {
                Self::Scalar(v)
            }
        }
    )*};
}

impl_scalar_operand!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);
