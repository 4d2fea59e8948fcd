//! Arrays allocated with a fixed fill pattern.

use tessel_arena::MemoryStack;
use tessel_core::{Element, KernelError};

use crate::array::Array;

/// A `height x width` array of zeros.
pub fn zeros<T: Element>(
    height: usize,
    width: usize,
    ms: &mut MemoryStack<'_>,
) -> Result<Array<T>, KernelError> {
    Array::new(height, width, ms)
}

/// A `height x width` array of ones.
pub fn ones<T: Element>(
    height: usize,
    width: usize,
    ms: &mut MemoryStack<'_>,
) -> Result<Array<T>, KernelError> {
    let out = Array::new(height, width, ms)?;
    out.fill(ms, T::ONE);
    Ok(out)
}

/// A `height x width` array with ones on the main diagonal.
pub fn eye<T: Element>(
    height: usize,
    width: usize,
    ms: &mut MemoryStack<'_>,
) -> Result<Array<T>, KernelError> {
    let out = Array::new(height, width, ms)?;
    for i in 0..height.min(width) {
        out.set(ms, i, i, T::ONE);
    }
    Ok(out)
}
