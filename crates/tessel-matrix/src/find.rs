//! Predicate search: the positions where `a <op> b` holds.
//!
//! A [`Find`] is built once over a view and a second operand of the same
//! shape (or a scalar). Construction scans the view and caches the match
//! count and bounding rectangle; the `evaluate*` and `set_*` methods
//! rescan and write into arena memory.

use tessel_arena::MemoryStack;
use tessel_array::{Array, ArraySlice, ConstArraySlice};
use tessel_core::{Axis, Element, KernelError, Rectangle};

use crate::operand::Operand;

/// A comparison between two elements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Comparison {
    /// `a < b`
    Less,
    /// `a <= b`
    LessEqual,
    /// `a == b`
    Equal,
    /// `a != b`
    NotEqual,
    /// `a >= b`
    GreaterEqual,
    /// `a > b`
    Greater,
}

impl Comparison {
    /// Whether `a <op> b` holds. Any comparison involving NaN except
    /// `NotEqual` is false.
    #[inline]
    pub fn holds<T: PartialOrd>(self, a: T, b: T) -> bool {
        match self {
            Self::Less => a < b,
            Self::LessEqual => a <= b,
            Self::Equal => a == b,
            Self::NotEqual => a != b,
            Self::GreaterEqual => a >= b,
            Self::Greater => a > b,
        }
    }
}

/// The result of searching a view with a [`Comparison`].
#[derive(Clone, Copy, Debug)]
pub struct Find<T: Element> {
    view: ConstArraySlice<T>,
    comparison: Comparison,
    operand: Operand<T>,
    num_matches: usize,
    limits: Option<Rectangle<i32>>,
}

impl<T: Element> Find<T> {
    /// Search `a` for the positions where `a <comparison> b`.
    ///
    /// `b` is either a view with the same shape as `a` or a scalar.
    pub fn new(
        ms: &MemoryStack<'_>,
        a: impl Into<ConstArraySlice<T>>,
        comparison: Comparison,
        b: impl Into<Operand<T>>,
    ) -> Result<Self, KernelError> {
        let view = a.into();
        let operand = b.into();
        view.check(ms)?;
        operand.check_against(ms, view.shape())?;

        let mut find = Self {
            view,
            comparison,
            operand,
            num_matches: 0,
            limits: None,
        };
        let (h, w) = view.shape();
        for y in 0..h {
            for x in 0..w {
                if !find.matches_at(ms, y, x) {
                    continue;
                }
                find.num_matches += 1;
                let (yi, xi) = (y as i32, x as i32);
                find.limits = Some(match find.limits {
                    None => Rectangle::new(xi, xi, yi, yi),
                    Some(r) => Rectangle::new(
                        r.left.min(xi),
                        r.right.max(xi),
                        r.top.min(yi),
                        r.bottom.max(yi),
                    ),
                });
            }
        }
        Ok(find)
    }

    /// How many positions matched.
    pub fn num_matches(&self) -> usize {
        self.num_matches
    }

    /// The tight bounding box of all matches, or `None` with no matches.
    pub fn limits(&self) -> Option<Rectangle<i32>> {
        self.limits
    }

    /// The comparison this search was built with.
    pub fn comparison(&self) -> Comparison {
        self.comparison
    }

    /// Shape of the searched view.
    pub fn shape(&self) -> (usize, usize) {
        self.view.shape()
    }

    #[inline]
    fn matches_at(&self, ms: &MemoryStack<'_>, y: usize, x: usize) -> bool {
        self.comparison
            .holds(self.view.get(ms, y, x), self.operand.get(ms, y, x))
    }

    fn require_row(&self) -> Result<(), KernelError> {
        if self.view.height() != 1 {
            return Err(KernelError::InvalidParameter {
                reason: "1-D find results need a single-row view",
            });
        }
        Ok(())
    }

    fn check_unchanged(&self, ms: &MemoryStack<'_>) -> Result<(), KernelError> {
        self.view.check(ms)?;
        if let Operand::Slice(s) = &self.operand {
            s.check(ms)?;
        }
        Ok(())
    }

    /// Rescan and fail if the match count moved since construction, which
    /// means the searched data was written in between.
    fn check_match_count(&self, ms: &MemoryStack<'_>) -> Result<(), KernelError> {
        self.check_unchanged(ms)?;
        let (h, w) = self.view.shape();
        let count = (0..h)
            .flat_map(|y| (0..w).map(move |x| (y, x)))
            .filter(|&(y, x)| self.matches_at(ms, y, x))
            .count();
        if count != self.num_matches {
            return Err(KernelError::InvalidSize {
                expected: (1, self.num_matches),
                found: (1, count),
            });
        }
        Ok(())
    }

    /// The x indices of the matches, as a `1 x num_matches` array.
    ///
    /// Only defined for a single-row view. Fails with
    /// [`KernelError::InvalidSize`] if the searched data no longer has
    /// `num_matches` matches.
    pub fn evaluate(&self, ms: &mut MemoryStack<'_>) -> Result<Array<i32>, KernelError> {
        self.require_row()?;
        self.check_match_count(ms)?;
        let xs = Array::<i32>::new(1, self.num_matches, ms)?;
        let mut k = 0;
        for x in 0..self.view.width() {
            if self.matches_at(ms, 0, x) {
                xs.set(ms, 0, k, x as i32);
                k += 1;
            }
        }
        Ok(xs)
    }

    /// The `(y, x)` indices of the matches in row-major scan order, as two
    /// `1 x num_matches` arrays.
    pub fn evaluate_2d(
        &self,
        ms: &mut MemoryStack<'_>,
    ) -> Result<(Array<i32>, Array<i32>), KernelError> {
        self.check_match_count(ms)?;
        let ys = Array::<i32>::new(1, self.num_matches, ms)?;
        let xs = Array::<i32>::new(1, self.num_matches, ms)?;
        let (h, w) = self.view.shape();
        let mut k = 0;
        for y in 0..h {
            for x in 0..w {
                if self.matches_at(ms, y, x) {
                    ys.set(ms, 0, k, y as i32);
                    xs.set(ms, 0, k, x as i32);
                    k += 1;
                }
            }
        }
        Ok((ys, xs))
    }

    /// Gather the rows (`Axis::Y`) or columns (`Axis::X`) of `other` whose
    /// index matched.
    ///
    /// The searched view must be a single row with one entry per row or
    /// column of `other`. The result keeps `other`'s orientation: with
    /// `Axis::Y` it is `num_matches x width`, with `Axis::X` it is
    /// `height x num_matches`.
    pub fn set_array<U: Element>(
        &self,
        other: impl Into<ConstArraySlice<U>>,
        axis: Axis,
        ms: &mut MemoryStack<'_>,
    ) -> Result<Array<U>, KernelError> {
        let other = other.into();
        self.require_row()?;
        self.check_match_count(ms)?;
        other.check(ms)?;
        let (h, w) = other.shape();
        let along = match axis {
            Axis::Y => h,
            Axis::X => w,
        };
        if self.view.width() != along {
            return Err(KernelError::InvalidSize {
                expected: (1, along),
                found: self.view.shape(),
            });
        }

        let out = match axis {
            Axis::Y => Array::<U>::new(self.num_matches, w, ms)?,
            Axis::X => Array::<U>::new(h, self.num_matches, ms)?,
        };
        let mut k = 0;
        for i in 0..along {
            if !self.matches_at(ms, 0, i) {
                continue;
            }
            match axis {
                Axis::Y => {
                    for x in 0..w {
                        let v = other.get(ms, i, x);
                        out.set(ms, k, x, v);
                    }
                }
                Axis::X => {
                    for y in 0..h {
                        let v = other.get(ms, y, i);
                        out.set(ms, y, k, v);
                    }
                }
            }
            k += 1;
        }
        Ok(out)
    }

    /// Write `value` into every matching position of `target`, which must
    /// have the searched view's shape.
    ///
    /// The predicate is re-evaluated per position before that position is
    /// written, so `target` may be the searched view itself.
    pub fn set_value<U: Element>(
        &self,
        target: impl Into<ArraySlice<U>>,
        value: U,
        ms: &mut MemoryStack<'_>,
    ) -> Result<(), KernelError> {
        let target = target.into();
        self.check_unchanged(ms)?;
        target.check(ms)?;
        if target.shape() != self.view.shape() {
            return Err(KernelError::InvalidSize {
                expected: self.view.shape(),
                found: target.shape(),
            });
        }
        let (h, w) = target.shape();
        for y in 0..h {
            for x in 0..w {
                if self.matches_at(ms, y, x) {
                    target.set(ms, y, x, value);
                }
            }
        }
        Ok(())
    }
}
