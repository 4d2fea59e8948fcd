//! Bilinear resampling, optionally through an affine or projective warp.
//!
//! Coordinates are 0-based: `(0, 0)` is the center of the top-left element
//! and `(w - 1, h - 1)` the center of the bottom-right one. Samples outside
//! that rectangle produce the caller's `invalid` value. Results are rounded
//! half away from zero and saturated into the output type.

use tessel_arena::MemoryStack;
use tessel_array::{ArraySlice, ConstArraySlice, Meshgrid};
use tessel_core::{round, Element, KernelError, Point};

fn sample<T: Element>(reference: &ConstArraySlice<T>, ms: &MemoryStack<'_>, x: f64, y: f64) -> Option<f64> {
    let (h, w) = reference.shape();
    if h == 0 || w == 0 {
        return None;
    }
    // NaN fails both range checks.
    if !(0.0..=(w - 1) as f64).contains(&x) || !(0.0..=(h - 1) as f64).contains(&y) {
        return None;
    }
    let (x0, y0) = (x.floor() as usize, y.floor() as usize);
    let (x1, y1) = ((x0 + 1).min(w - 1), (y0 + 1).min(h - 1));
    let (ax, ay) = (x - x0 as f64, y - y0 as f64);

    let at = |y, x| reference.get(ms, y, x).to_f64();
    let top = at(y0, x0) * (1.0 - ax) + at(y0, x1) * ax;
    let bottom = at(y1, x0) * (1.0 - ax) + at(y1, x1) * ax;
    Some(top * (1.0 - ay) + bottom * ay)
}

#[inline]
fn resolve<U: Element>(value: Option<f64>, invalid: U) -> U {
    value.map_or(invalid, round::<U>)
}

/// Sample `reference` at `(x_coords[i], y_coords[i])` into `out[i]`.
///
/// The coordinate arrays and `out` must all have the same shape, which
/// may be a row, a column, or a full grid.
pub fn interp2<T: Element, C: Element, U: Element>(
    reference: impl Into<ConstArraySlice<T>>,
    x_coords: impl Into<ConstArraySlice<C>>,
    y_coords: impl Into<ConstArraySlice<C>>,
    out: impl Into<ArraySlice<U>>,
    invalid: U,
    ms: &mut MemoryStack<'_>,
) -> Result<(), KernelError> {
    let (reference, xs, ys, out) = (reference.into(), x_coords.into(), y_coords.into(), out.into());
    reference.check(ms)?;
    out.check(ms)?;
    for coords in [&xs, &ys] {
        coords.check(ms)?;
        if coords.shape() != out.shape() {
            return Err(KernelError::InvalidSize {
                expected: out.shape(),
                found: coords.shape(),
            });
        }
    }

    let (h, w) = out.shape();
    for y in 0..h {
        for x in 0..w {
            let sx = xs.get(ms, y, x).to_f64();
            let sy = ys.get(ms, y, x).to_f64();
            let v = resolve(sample(&reference, ms, sx, sy), invalid);
            out.set(ms, y, x, v);
        }
    }
    Ok(())
}

#[derive(Clone, Copy)]
enum Warp {
    Affine,
    Projective,
}

impl Warp {
    fn apply(self, m: &[[f64; 3]; 3], center: Point<f64>, p: Point<f64>) -> Point<f64> {
        let (dx, dy) = (p.x - center.x, p.y - center.y);
        let x = m[0][0] * dx + m[0][1] * dy + m[0][2];
        let y = m[1][0] * dx + m[1][1] * dy + m[1][2];
        match self {
            Self::Affine => Point::new(x + center.x, y + center.y),
            Self::Projective => {
                let w = m[2][0] * dx + m[2][1] * dy + m[2][2];
                Point::new(x / w + center.x, y / w + center.y)
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn interp2_warped<T: Element, C: Element, M: Element, U: Element>(
    warp: Warp,
    reference: ConstArraySlice<T>,
    grid: &Meshgrid<C>,
    transform: ConstArraySlice<M>,
    center: Point<f64>,
    out: ArraySlice<U>,
    invalid: U,
    ms: &mut MemoryStack<'_>,
) -> Result<(), KernelError> {
    reference.check(ms)?;
    transform.check(ms)?;
    out.check(ms)?;
    if transform.shape() != (3, 3) {
        return Err(KernelError::InvalidSize {
            expected: (3, 3),
            found: transform.shape(),
        });
    }
    let (ny, nx) = grid.shape();
    let flat = match out.shape() {
        s if s == (ny, nx) => false,
        s if s == (1, nx * ny) => true,
        found => {
            return Err(KernelError::InvalidSize {
                expected: (ny, nx),
                found,
            })
        }
    };

    let mut m = [[0.0f64; 3]; 3];
    for (y, row) in m.iter_mut().enumerate() {
        for (x, v) in row.iter_mut().enumerate() {
            *v = transform.get(ms, y, x).to_f64();
        }
    }

    for gy in 0..ny {
        for gx in 0..nx {
            let (px, py) = grid.point(gy, gx);
            let p = warp.apply(&m, center, Point::new(px.to_f64(), py.to_f64()));
            let v = resolve(sample(&reference, ms, p.x, p.y), invalid);
            if flat {
                out.set(ms, 0, gy * nx + gx, v);
            } else {
                out.set(ms, gy, gx, v);
            }
        }
    }
    Ok(())
}

/// Resample `reference` over `grid` warped by the affine `transform`.
///
/// Each grid point `p` samples at `H (p - center) + center`; the bottom
/// row of `H` is ignored. `out` is either `ny x nx` or a `1 x (nx * ny)`
/// row in row-major grid order.
pub fn interp2_affine<T: Element, C: Element, M: Element, U: Element>(
    reference: impl Into<ConstArraySlice<T>>,
    grid: &Meshgrid<C>,
    transform: impl Into<ConstArraySlice<M>>,
    center: Point<f64>,
    out: impl Into<ArraySlice<U>>,
    invalid: U,
    ms: &mut MemoryStack<'_>,
) -> Result<(), KernelError> {
    interp2_warped(
        Warp::Affine,
        reference.into(),
        grid,
        transform.into(),
        center,
        out.into(),
        invalid,
        ms,
    )
}

/// Resample `reference` over `grid` warped by the projective `transform`.
///
/// Like [`interp2_affine`], with the homogeneous coordinate divided out.
/// Points mapped to infinity are out of bounds.
pub fn interp2_projective<T: Element, C: Element, M: Element, U: Element>(
    reference: impl Into<ConstArraySlice<T>>,
    grid: &Meshgrid<C>,
    transform: impl Into<ConstArraySlice<M>>,
    center: Point<f64>,
    out: impl Into<ArraySlice<U>>,
    invalid: U,
    ms: &mut MemoryStack<'_>,
) -> Result<(), KernelError> {
    interp2_warped(
        Warp::Projective,
        reference.into(),
        grid,
        transform.into(),
        center,
        out.into(),
        invalid,
        ms,
    )
}
