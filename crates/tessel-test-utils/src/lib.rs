//! Test support for Tessel development.
//!
//! Seeded data generators live in [`fixtures`]. The crate root has the
//! approximate-comparison helpers used across the workspace's tests and a
//! [`with_stack`] shorthand for running a closure against a fresh arena.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use tessel_arena::{AlignedBuffer, MemoryStack};
use tessel_array::{Array, ConstArraySlice};
use tessel_core::{Element, KernelError};

pub use fixtures::{random_array, random_floats, random_integers, seeded_rng};

/// Run `f` against a fresh stack over `capacity` aligned bytes.
pub fn with_stack<R>(capacity: usize, f: impl FnOnce(&mut MemoryStack<'_>) -> R) -> R {
    let mut buf = AlignedBuffer::new(capacity);
    let mut ms = MemoryStack::new(buf.as_bytes_mut());
    f(&mut ms)
}

/// Allocate a `height x width` array and fill it row-major from `values`.
pub fn array_from<T: Element>(
    ms: &mut MemoryStack<'_>,
    height: usize,
    width: usize,
    values: &[T],
) -> Result<Array<T>, KernelError> {
    let a = Array::new(height, width, ms)?;
    a.copy_from_slice(ms, values);
    Ok(a)
}

/// Collect a view row-major into a `Vec`.
pub fn to_vec<T: Element>(ms: &MemoryStack<'_>, view: impl Into<ConstArraySlice<T>>) -> Vec<T> {
    let view = view.into();
    let (h, w) = view.shape();
    let mut out = Vec::with_capacity(h * w);
    for y in 0..h {
        for x in 0..w {
            out.push(view.get(ms, y, x));
        }
    }
    out
}

/// Whether `a` and `b` agree within `abs_tol` or within `rel_tol` of the
/// larger magnitude.
pub fn approx_eq(a: f64, b: f64, rel_tol: f64, abs_tol: f64) -> bool {
    let diff = (a - b).abs();
    diff <= abs_tol || diff <= rel_tol * a.abs().max(b.abs())
}

#[track_caller]
pub fn assert_close(actual: f64, expected: f64, tol: f64) {
    assert!(
        approx_eq(actual, expected, 0.0, tol),
        "{actual} differs from {expected} by more than {tol}"
    );
}

#[track_caller]
pub fn assert_all_close<T: Element>(actual: &[T], expected: &[f64], tol: f64) {
    assert_eq!(actual.len(), expected.len(), "length mismatch");
    for (i, (a, &e)) in actual.iter().zip(expected).enumerate() {
        let a = a.to_f64();
        assert!(
            approx_eq(a, e, 0.0, tol),
            "element {i}: {a} differs from {e} by more than {tol}"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approx_eq_tolerances() {
        assert!(approx_eq(1.0, 1.0005, 0.0, 1e-3));
        assert!(!approx_eq(1.0, 1.01, 0.0, 1e-3));
        assert!(approx_eq(1000.0, 1001.0, 1e-2, 0.0));
    }

    #[test]
    fn array_round_trip_through_helpers() {
        with_stack(1024, |ms| {
            let a = array_from(ms, 2, 3, &[1i16, 2, 3, 4, 5, 6]).unwrap();
            assert_eq!(to_vec(ms, a), vec![1, 2, 3, 4, 5, 6]);
            assert_eq!(to_vec(ms, a.as_const_slice().transpose()), vec![1, 4, 2, 5, 3, 6]);
        });
    }
}
