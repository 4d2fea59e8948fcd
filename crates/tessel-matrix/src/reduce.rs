//! Whole-view reductions.

use tessel_arena::MemoryStack;
use tessel_array::ConstArraySlice;
use tessel_core::{Element, KernelError};

use crate::operand::Operand;

fn non_empty<T: Element>(
    view: &ConstArraySlice<T>,
    ms: &MemoryStack<'_>,
) -> Result<(), KernelError> {
    view.check(ms)?;
    if view.is_empty() {
        return Err(KernelError::InvalidSize {
            expected: (1, 1),
            found: view.shape(),
        });
    }
    Ok(())
}

fn is_nan<T: PartialOrd>(v: T) -> bool {
    v.partial_cmp(&v).is_none()
}

fn fold<T: Element>(
    view: ConstArraySlice<T>,
    ms: &MemoryStack<'_>,
    pick: impl Fn(T, T) -> T,
) -> Result<T, KernelError> {
    non_empty(&view, ms)?;
    let (h, w) = view.shape();
    let mut acc = view.get(ms, 0, 0);
    for y in 0..h {
        for x in 0..w {
            acc = pick(acc, view.get(ms, y, x));
        }
    }
    Ok(acc)
}

/// The smallest element. NaNs are skipped unless every element is NaN.
pub fn min<T: Element>(
    view: impl Into<ConstArraySlice<T>>,
    ms: &MemoryStack<'_>,
) -> Result<T, KernelError> {
    fold(view.into(), ms, |acc, v| if v < acc || is_nan(acc) { v } else { acc })
}

/// The largest element. NaNs are skipped unless every element is NaN.
pub fn max<T: Element>(
    view: impl Into<ConstArraySlice<T>>,
    ms: &MemoryStack<'_>,
) -> Result<T, KernelError> {
    fold(view.into(), ms, |acc, v| if v > acc || is_nan(acc) { v } else { acc })
}

/// The sum of all elements, accumulated in `Acc`.
///
/// Each element is converted to `Acc` with `as` semantics first, and
/// integer accumulators wrap.
pub fn sum<T: Element, Acc: Element>(
    view: impl Into<ConstArraySlice<T>>,
    ms: &MemoryStack<'_>,
) -> Result<Acc, KernelError> {
    let view = view.into();
    non_empty(&view, ms)?;
    Ok(view
        .iter(ms)
        .fold(Acc::ZERO, |acc, v| acc.add_wrapping(v.cast())))
}

/// The arithmetic mean, computed in `f64`.
pub fn mean<T: Element>(
    view: impl Into<ConstArraySlice<T>>,
    ms: &MemoryStack<'_>,
) -> Result<f64, KernelError> {
    let view = view.into();
    let total = sum::<T, f64>(view, ms)?;
    Ok(total / view.len() as f64)
}

/// The mean and population variance, computed in `f64`.
///
/// The variance divides by the element count, not by one less.
pub fn mean_and_var<T: Element>(
    view: impl Into<ConstArraySlice<T>>,
    ms: &MemoryStack<'_>,
) -> Result<(f64, f64), KernelError> {
    let view = view.into();
    let mu = mean(view, ms)?;
    let squares: f64 = view
        .iter(ms)
        .map(|v| {
            let d = v.to_f64() - mu;
            d * d
        })
        .sum();
    Ok((mu, squares / view.len() as f64))
}

/// `sum(|a - b|)`, accumulated in `Acc`.
///
/// Both sides are converted to `Acc` before differencing, with the larger
/// value first. `b` is a view of `a`'s shape or a scalar.
pub fn sum_of_abs_diff<T: Element, Acc: Element>(
    a: impl Into<ConstArraySlice<T>>,
    b: impl Into<Operand<T>>,
    ms: &MemoryStack<'_>,
) -> Result<Acc, KernelError> {
    let (a, b) = (a.into(), b.into());
    non_empty(&a, ms)?;
    b.check_against(ms, a.shape())?;
    let (h, w) = a.shape();
    let mut acc = Acc::ZERO;
    for y in 0..h {
        for x in 0..w {
            let (p, q): (Acc, Acc) = (a.get(ms, y, x).cast(), b.get(ms, y, x).cast());
            let d = if p >= q { p.sub_wrapping(q) } else { q.sub_wrapping(p) };
            acc = acc.add_wrapping(d);
        }
    }
    Ok(acc)
}
