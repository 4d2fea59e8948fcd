//! Homography estimation from point correspondences.

use tessel_arena::MemoryStack;
use tessel_array::{Array, ArraySlice};
use tessel_core::{Conditioning, Element, KernelError, Point};

use crate::cholesky::solve_least_squares_with_cholesky;
use crate::multiply::multiply;

/// With exactly four correspondences the fit is exact, so any point that
/// reprojects further than this is a sign of a degenerate configuration.
pub const MAX_REPROJECTION_ERROR: f64 = 0.1;

/// Estimate the 3x3 homography mapping `original` onto `transformed`.
///
/// Uses the direct linear transform with `h22` fixed to 1. The 8x8 normal
/// equations are built and solved in a scratch scope on `ms`, so `ms.used()`
/// is unchanged on return.
///
/// `homography` is set to identity first and keeps that value whenever the
/// result is [`Conditioning::Degenerate`].
pub fn estimate_homography<T: Element>(
    original: &[Point<f64>],
    transformed: &[Point<f64>],
    homography: impl Into<ArraySlice<T>>,
    ms: &mut MemoryStack<'_>,
) -> Result<Conditioning, KernelError> {
    let h = homography.into();
    if T::IS_INTEGER {
        return Err(KernelError::InvalidParameter {
            reason: "homography requires a float element type",
        });
    }
    h.check(ms)?;
    if h.shape() != (3, 3) {
        return Err(KernelError::InvalidSize {
            expected: (3, 3),
            found: h.shape(),
        });
    }
    let n = original.len();
    if transformed.len() != n {
        return Err(KernelError::InvalidSize {
            expected: (1, n),
            found: (1, transformed.len()),
        });
    }
    if n < 4 {
        return Err(KernelError::InvalidSize {
            expected: (1, 4),
            found: (1, n),
        });
    }

    set_identity(&h, ms);
    let solution = {
        let mut scratch = ms.scope();
        solve_dlt(original, transformed, &mut scratch)?
    };
    let Some(coefficients) = solution else {
        log::warn!("homography normal equations are singular for {n} points");
        return Ok(Conditioning::Degenerate);
    };

    let mut m = [[0.0f64; 3]; 3];
    for (i, &c) in coefficients.iter().enumerate() {
        m[i / 3][i % 3] = c;
    }
    m[2][2] = 1.0;

    if n == 4 {
        let worst = original
            .iter()
            .zip(transformed)
            .map(|(&p, &q)| reprojection_error(&m, p, q))
            .fold(0.0f64, |acc, e| if e.is_nan() { f64::INFINITY } else { acc.max(e) });
        if worst > MAX_REPROJECTION_ERROR {
            log::warn!("homography reprojection error {worst} exceeds {MAX_REPROJECTION_ERROR}");
            return Ok(Conditioning::Degenerate);
        }
    }

    for (y, row) in m.iter().enumerate() {
        for (x, &v) in row.iter().enumerate() {
            h.set(ms, y, x, T::from_f64(v));
        }
    }
    Ok(Conditioning::Stable)
}

fn set_identity<T: Element>(h: &ArraySlice<T>, ms: &mut MemoryStack<'_>) {
    for y in 0..3 {
        for x in 0..3 {
            h.set(ms, y, x, if x == y { T::ONE } else { T::ZERO });
        }
    }
}

/// Build `A` (2n x 8) and `b`, then solve `A^T A h = A^T b`.
fn solve_dlt(
    original: &[Point<f64>],
    transformed: &[Point<f64>],
    ms: &mut MemoryStack<'_>,
) -> Result<Option<[f64; 8]>, KernelError> {
    let rows = 2 * original.len();
    let a = Array::<f64>::new(rows, 8, ms)?;
    let b = Array::<f64>::new(1, rows, ms)?;
    for (i, (p, q)) in original.iter().zip(transformed).enumerate() {
        let (x, y) = (p.x, p.y);
        let upper = [0.0, 0.0, 0.0, -x, -y, -1.0, x * q.y, y * q.y];
        let lower = [x, y, 1.0, 0.0, 0.0, 0.0, -x * q.x, -y * q.x];
        a.row_mut(ms, 2 * i).copy_from_slice(&upper);
        a.row_mut(ms, 2 * i + 1).copy_from_slice(&lower);
        b.set(ms, 0, 2 * i, -q.y);
        b.set(ms, 0, 2 * i + 1, q.x);
    }

    let ata = Array::<f64>::new(8, 8, ms)?;
    let atb = Array::<f64>::new(1, 8, ms)?;
    multiply(a.as_const_slice().transpose(), a, ata, ms)?;
    // (A^T b)^T = b^T A, already laid out as one right-hand side per row.
    multiply(b, a, atb, ms)?;

    if solve_least_squares_with_cholesky(ata, atb, false, ms)?.is_degenerate() {
        return Ok(None);
    }
    let mut out = [0.0; 8];
    out.copy_from_slice(atb.row(ms, 0));
    Ok(Some(out))
}

fn reprojection_error(m: &[[f64; 3]; 3], p: Point<f64>, q: Point<f64>) -> f64 {
    let w = m[2][0] * p.x + m[2][1] * p.y + m[2][2];
    let x = (m[0][0] * p.x + m[0][1] * p.y + m[0][2]) / w;
    let y = (m[1][0] * p.x + m[1][1] * p.y + m[1][2]) / w;
    (x - q.x).hypot(y - q.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessel_arena::AlignedBuffer;

    const GROUND_TRUTH: [[f64; 3]; 3] = [[5.5, -0.3, 5.5], [0.5, 0.5, 3.3], [0.001, 0.0, 1.0]];

    fn project(p: Point<f64>) -> Point<f64> {
        let m = GROUND_TRUTH;
        let w = m[2][0] * p.x + m[2][1] * p.y + m[2][2];
        Point::new(
            (m[0][0] * p.x + m[0][1] * p.y + m[0][2]) / w,
            (m[1][0] * p.x + m[1][1] * p.y + m[1][2]) / w,
        )
    }

    fn assert_recovered(ms: &MemoryStack<'_>, h: Array<f64>) {
        for (y, row) in GROUND_TRUTH.iter().enumerate() {
            for (x, &expected) in row.iter().enumerate() {
                let got = h.get(ms, y, x);
                assert!((got - expected).abs() < 0.01, "h[{y}][{x}] = {got}");
            }
        }
    }

    #[test]
    fn four_point_fixture() {
        let mut buf = AlignedBuffer::new(4096);
        let mut ms = MemoryStack::new(buf.as_bytes_mut());
        let h = Array::<f64>::new(3, 3, &mut ms).unwrap();
        let original = [
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ];
        let transformed = [
            Point::new(5.5, 3.3),
            Point::new(10.98901, 3.79620),
            Point::new(10.68931, 4.29570),
            Point::new(5.2, 3.8),
        ];
        let used = ms.used();
        let c = estimate_homography(&original, &transformed, h, &mut ms).unwrap();
        assert_eq!(c, Conditioning::Stable);
        assert_eq!(ms.used(), used);
        assert_recovered(&ms, h);
    }

    #[test]
    fn overdetermined_fit() {
        let mut buf = AlignedBuffer::new(8192);
        let mut ms = MemoryStack::new(buf.as_bytes_mut());
        let h = Array::<f32>::new(3, 3, &mut ms).unwrap();
        let original: Vec<Point<f64>> = (0..9)
            .map(|i| Point::new(f64::from(i % 3) * 2.0, f64::from(i / 3) * 3.0))
            .collect();
        let transformed: Vec<Point<f64>> = original.iter().map(|&p| project(p)).collect();
        let c = estimate_homography(&original, &transformed, h, &mut ms).unwrap();
        assert_eq!(c, Conditioning::Stable);
        for (y, row) in GROUND_TRUTH.iter().enumerate() {
            for (x, &expected) in row.iter().enumerate() {
                let got = f64::from(h.get(&ms, y, x));
                assert!((got - expected).abs() < 0.01, "h[{y}][{x}] = {got}");
            }
        }
    }

    #[test]
    fn coincident_points_are_degenerate() {
        let mut buf = AlignedBuffer::new(4096);
        let mut ms = MemoryStack::new(buf.as_bytes_mut());
        let h = Array::<f64>::new(3, 3, &mut ms).unwrap();
        h.fill(&mut ms, 7.0);
        let original = [Point::new(0.0, 0.0); 4];
        let transformed = [Point::new(1.0, 1.0); 4];
        let c = estimate_homography(&original, &transformed, h, &mut ms).unwrap();
        assert!(c.is_degenerate());
        assert_eq!(h.row(&ms, 0), &[1.0, 0.0, 0.0]);
        assert_eq!(h.row(&ms, 1), &[0.0, 1.0, 0.0]);
        assert_eq!(h.row(&ms, 2), &[0.0, 0.0, 1.0]);
    }

    #[test]
    fn argument_checks() {
        let mut buf = AlignedBuffer::new(4096);
        let mut ms = MemoryStack::new(buf.as_bytes_mut());
        let h = Array::<f64>::new(3, 3, &mut ms).unwrap();
        let three = [Point::new(0.0, 0.0); 3];
        assert_eq!(
            estimate_homography(&three, &three, h, &mut ms),
            Err(KernelError::InvalidSize {
                expected: (1, 4),
                found: (1, 3)
            })
        );
        let four = [Point::new(0.0, 0.0); 4];
        assert!(estimate_homography(&four, &three, h, &mut ms).is_err());
        let wrong = Array::<f64>::new(2, 3, &mut ms).unwrap();
        assert!(estimate_homography(&four, &four, wrong, &mut ms).is_err());
    }
}
