//! Least-squares solve by Cholesky factorization.

use tessel_arena::MemoryStack;
use tessel_array::ArraySlice;
use tessel_core::{Conditioning, Element, KernelError};

/// Pivots below this value mark the system as degenerate. The bound is
/// absolute, not relative to the magnitude of the matrix.
pub const MIN_PIVOT: f64 = f64::EPSILON;

fn at<T: Element>(view: &ArraySlice<T>, ms: &MemoryStack<'_>, y: usize, x: usize) -> f64 {
    view.get(ms, y, x).to_f64()
}

/// Solve `A X = B` for symmetric positive-definite `A`, in place.
///
/// `a_l` is `n x n`. `bt_xt` holds `B` transposed, one right-hand side
/// per row (`k x n`), and is overwritten with `X` transposed. Arithmetic
/// runs in `f64`; results are stored back in `T`.
///
/// With `real_cholesky`, `a_l` ends up holding the lower factor `L` with the
/// strict upper triangle zeroed. Without it the diagonal holds the
/// reciprocals of `L`'s diagonal, which is all the solve needs. Only the
/// lower triangle of `A` is read.
///
/// A pivot below [`MIN_PIVOT`] stops the factorization and returns
/// [`Conditioning::Degenerate`]; both arrays are then partially
/// overwritten.
///
/// [`MIN_PIVOT`] is compared against the squared diagonal of `L` as is, so
/// a well-conditioned system whose entries are all near `1e-16` or smaller
/// is reported degenerate. Scale such inputs towards unit magnitude first.
pub fn solve_least_squares_with_cholesky<T: Element>(
    a_l: impl Into<ArraySlice<T>>,
    bt_xt: impl Into<ArraySlice<T>>,
    real_cholesky: bool,
    ms: &mut MemoryStack<'_>,
) -> Result<Conditioning, KernelError> {
    let (a, b) = (a_l.into(), bt_xt.into());
    if T::IS_INTEGER {
        return Err(KernelError::InvalidParameter {
            reason: "cholesky requires a float element type",
        });
    }
    a.check(ms)?;
    b.check(ms)?;
    let n = a.height();
    if a.width() != n {
        return Err(KernelError::InvalidSize {
            expected: (n, n),
            found: a.shape(),
        });
    }
    let samples = b.height();
    if b.width() != n {
        return Err(KernelError::InvalidSize {
            expected: (samples, n),
            found: b.shape(),
        });
    }
    if a.array().shares_storage_with(b.array()) {
        return Err(KernelError::AliasedMemory);
    }

    // Factor. The diagonal temporarily holds 1 / L[i][i].
    for i in 0..n {
        for j in 0..i {
            let mut sum = at(&a, ms, i, j);
            for k in 0..j {
                sum -= at(&a, ms, i, k) * at(&a, ms, j, k);
            }
            let v = sum * at(&a, ms, j, j);
            a.set(ms, i, j, T::from_f64(v));
        }
        let mut sum = at(&a, ms, i, i);
        for k in 0..i {
            let v = at(&a, ms, i, k);
            sum -= v * v;
        }
        if sum < MIN_PIVOT || sum.is_nan() {
            log::warn!("cholesky pivot {sum} at row {i} is below {MIN_PIVOT}");
            return Ok(Conditioning::Degenerate);
        }
        a.set(ms, i, i, T::from_f64(1.0 / sum.sqrt()));
    }

    // Forward substitution: L y = b.
    for i in 0..n {
        let inv = at(&a, ms, i, i);
        for s in 0..samples {
            let mut sum = at(&b, ms, s, i);
            for k in 0..i {
                sum -= at(&a, ms, i, k) * at(&b, ms, s, k);
            }
            b.set(ms, s, i, T::from_f64(sum * inv));
        }
    }

    // Back substitution: L^T x = y.
    for i in (0..n).rev() {
        let inv = at(&a, ms, i, i);
        for s in 0..samples {
            let mut sum = at(&b, ms, s, i);
            for k in i + 1..n {
                sum -= at(&a, ms, k, i) * at(&b, ms, s, k);
            }
            b.set(ms, s, i, T::from_f64(sum * inv));
        }
    }

    if real_cholesky {
        for i in 0..n {
            let inv = at(&a, ms, i, i);
            a.set(ms, i, i, T::from_f64(1.0 / inv));
            for j in i + 1..n {
                a.set(ms, i, j, T::ZERO);
            }
        }
    }
    Ok(Conditioning::Stable)
}
