//! Matrix products and layout changes: multiply, transpose, reshape, rotate.
//!
//! Products accumulate in the output element type. None of these
//! operations can run in place, so an output that shares storage with an
//! input is rejected with [`KernelError::AliasedMemory`].

use tessel_arena::MemoryStack;
use tessel_array::{Array, ArraySlice, ConstArraySlice};
use tessel_core::{Element, KernelError, Order};

fn expect_shape(found: (usize, usize), expected: (usize, usize)) -> Result<(), KernelError> {
    if found == expected {
        Ok(())
    } else {
        Err(KernelError::InvalidSize { expected, found })
    }
}

fn ensure_distinct<T: Element, U: Element>(
    input: &ConstArraySlice<T>,
    out: &ArraySlice<U>,
) -> Result<(), KernelError> {
    if input.array().shares_storage_with(out.array()) {
        log::debug!("output aliases an input of an out-of-place operation");
        return Err(KernelError::AliasedMemory);
    }
    Ok(())
}

/// `out = a * b`.
///
/// `a` is `m x k`, `b` is `k x n`, and `out` is `m x n`.
pub fn multiply<T: Element, U: Element>(
    a: impl Into<ConstArraySlice<T>>,
    b: impl Into<ConstArraySlice<T>>,
    out: impl Into<ArraySlice<U>>,
    ms: &mut MemoryStack<'_>,
) -> Result<(), KernelError> {
    let (a, b, out) = (a.into(), b.into(), out.into());
    a.check(ms)?;
    b.check(ms)?;
    out.check(ms)?;
    let (m, k) = a.shape();
    let n = b.width();
    expect_shape(b.shape(), (k, n))?;
    expect_shape(out.shape(), (m, n))?;
    ensure_distinct(&a, &out)?;
    ensure_distinct(&b, &out)?;

    for y in 0..m {
        for x in 0..n {
            let mut acc = U::ZERO;
            for i in 0..k {
                let lhs: U = a.get(ms, y, i).cast();
                let rhs: U = b.get(ms, i, x).cast();
                acc = acc.add_wrapping(lhs.mul_wrapping(rhs));
            }
            out.set(ms, y, x, acc);
        }
    }
    Ok(())
}

/// `out = a * bt^T`, without forming the transpose.
///
/// `a` is `m x k`, `bt` is `n x k`, and `out` is `m x n`.
pub fn multiply_transpose<T: Element, U: Element>(
    a: impl Into<ConstArraySlice<T>>,
    bt: impl Into<ConstArraySlice<T>>,
    out: impl Into<ArraySlice<U>>,
    ms: &mut MemoryStack<'_>,
) -> Result<(), KernelError> {
    let (a, bt, out) = (a.into(), bt.into(), out.into());
    a.check(ms)?;
    bt.check(ms)?;
    out.check(ms)?;
    let (m, k) = a.shape();
    let n = bt.height();
    expect_shape(bt.shape(), (n, k))?;
    expect_shape(out.shape(), (m, n))?;
    ensure_distinct(&a, &out)?;
    ensure_distinct(&bt, &out)?;

    for y in 0..m {
        for x in 0..n {
            let mut acc = U::ZERO;
            for i in 0..k {
                let lhs: U = a.get(ms, y, i).cast();
                let rhs: U = bt.get(ms, x, i).cast();
                acc = acc.add_wrapping(lhs.mul_wrapping(rhs));
            }
            out.set(ms, y, x, acc);
        }
    }
    Ok(())
}

/// Copy the transpose of `input` into `out`, converting elements with
/// `as` semantics.
pub fn transpose<T: Element, U: Element>(
    input: impl Into<ConstArraySlice<T>>,
    out: impl Into<ArraySlice<U>>,
    ms: &mut MemoryStack<'_>,
) -> Result<(), KernelError> {
    let (input, out) = (input.into(), out.into());
    input.check(ms)?;
    out.check(ms)?;
    let (h, w) = input.shape();
    expect_shape(out.shape(), (w, h))?;
    ensure_distinct(&input, &out)?;
    for y in 0..h {
        for x in 0..w {
            let v = input.get(ms, y, x);
            out.set(ms, x, y, v.cast());
        }
    }
    Ok(())
}

/// Position of the `i`th element of a `(h, w)` grid walked in `order`.
fn nth_position(order: Order, (h, w): (usize, usize), i: usize) -> (usize, usize) {
    match order {
        Order::RowMajor => (i / w, i % w),
        Order::ColumnMajor => (i % h, i / h),
    }
}

/// Reflow the elements of `input` into `out`.
///
/// Elements are read from `input` in `order` and written to `out` in the
/// same order, so `ColumnMajor` behaves like MATLAB's `reshape`. Element
/// counts must match.
pub fn reshape_into<T: Element, U: Element>(
    order: Order,
    input: impl Into<ConstArraySlice<T>>,
    out: impl Into<ArraySlice<U>>,
    ms: &mut MemoryStack<'_>,
) -> Result<(), KernelError> {
    let (input, out) = (input.into(), out.into());
    input.check(ms)?;
    out.check(ms)?;
    if input.len() != out.len() {
        return Err(KernelError::InvalidSize {
            expected: input.shape(),
            found: out.shape(),
        });
    }
    ensure_distinct(&input, &out)?;
    for i in 0..input.len() {
        let (iy, ix) = nth_position(order, input.shape(), i);
        let (oy, ox) = nth_position(order, out.shape(), i);
        let v = input.get(ms, iy, ix);
        out.set(ms, oy, ox, v.cast());
    }
    Ok(())
}

/// Allocate a `height x width` array and [`reshape_into`] it.
pub fn reshape<T: Element, U: Element>(
    order: Order,
    input: impl Into<ConstArraySlice<T>>,
    height: usize,
    width: usize,
    ms: &mut MemoryStack<'_>,
) -> Result<Array<U>, KernelError> {
    let input = input.into();
    input.check(ms)?;
    if input.len() != height * width {
        return Err(KernelError::InvalidSize {
            expected: input.shape(),
            found: (height, width),
        });
    }
    let out = Array::new(height, width, ms)?;
    reshape_into(order, input, out, ms)?;
    Ok(out)
}

/// Flatten `input` into the single-row `out`, reading in `order`.
///
/// `ColumnMajor` matches MATLAB's `a(:)'`.
pub fn vectorize_into<T: Element, U: Element>(
    order: Order,
    input: impl Into<ConstArraySlice<T>>,
    out: impl Into<ArraySlice<U>>,
    ms: &mut MemoryStack<'_>,
) -> Result<(), KernelError> {
    let out = out.into();
    if out.height() != 1 {
        return Err(KernelError::InvalidSize {
            expected: (1, out.len()),
            found: out.shape(),
        });
    }
    reshape_into(order, input, out, ms)
}

/// Allocate a `1 x n` array and [`vectorize_into`] it.
pub fn vectorize<T: Element, U: Element>(
    order: Order,
    input: impl Into<ConstArraySlice<T>>,
    ms: &mut MemoryStack<'_>,
) -> Result<Array<U>, KernelError> {
    let input = input.into();
    reshape(order, input, 1, input.len(), ms)
}

fn rotate_with<T: Element>(
    input: ConstArraySlice<T>,
    out: ArraySlice<T>,
    ms: &mut MemoryStack<'_>,
    source: impl Fn(usize, usize, usize) -> (usize, usize),
) -> Result<(), KernelError> {
    input.check(ms)?;
    out.check(ms)?;
    let (h, w) = input.shape();
    if h != w {
        return Err(KernelError::InvalidSize {
            expected: (h, h),
            found: (h, w),
        });
    }
    expect_shape(out.shape(), (h, w))?;
    ensure_distinct(&input, &out)?;
    for y in 0..h {
        for x in 0..w {
            let (sy, sx) = source(h, y, x);
            let v = input.get(ms, sy, sx);
            out.set(ms, y, x, v);
        }
    }
    Ok(())
}

/// Rotate a square view a quarter turn clockwise.
pub fn rotate90<T: Element>(
    input: impl Into<ConstArraySlice<T>>,
    out: impl Into<ArraySlice<T>>,
    ms: &mut MemoryStack<'_>,
) -> Result<(), KernelError> {
    rotate_with(input.into(), out.into(), ms, |n, y, x| (n - 1 - x, y))
}

/// Rotate a square view a half turn.
pub fn rotate180<T: Element>(
    input: impl Into<ConstArraySlice<T>>,
    out: impl Into<ArraySlice<T>>,
    ms: &mut MemoryStack<'_>,
) -> Result<(), KernelError> {
    rotate_with(input.into(), out.into(), ms, |n, y, x| (n - 1 - y, n - 1 - x))
}

/// Rotate a square view a quarter turn counterclockwise.
pub fn rotate270<T: Element>(
    input: impl Into<ConstArraySlice<T>>,
    out: impl Into<ArraySlice<T>>,
    ms: &mut MemoryStack<'_>,
) -> Result<(), KernelError> {
    rotate_with(input.into(), out.into(), ms, |n, y, x| (x, n - 1 - y))
}
