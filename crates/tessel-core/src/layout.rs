//! Small enums describing memory order, sort direction, and solver outcome.

/// Element traversal order for flattening or reshaping 2D data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Order {
    /// Walk each row left to right, rows top to bottom.
    RowMajor,
    /// Walk each column top to bottom, columns left to right.
    ColumnMajor,
}

/// One of the two array axes.
///
/// `Axis::Y` is dimension 0 (rows), `Axis::X` is dimension 1 (columns).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Dimension 0: operate down each column, across rows.
    Y,
    /// Dimension 1: operate along each row, across columns.
    X,
}

impl Axis {
    /// The numeric dimension index (0 for `Y`, 1 for `X`).
    pub fn index(self) -> usize {
        match self {
            Self::Y => 0,
            Self::X => 1,
        }
    }
}

/// Sort direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SortOrder {
    /// Smallest first.
    Ascending,
    /// Largest first.
    Descending,
}

/// Outcome of a numerical solve that completed without a usage error.
///
/// A degenerate system is syntactically valid input that could not be
/// solved reliably (a non-positive pivot, a reprojection that disagrees
/// with the data). Outputs are unspecified unless documented otherwise.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use]
pub enum Conditioning {
    /// The solve succeeded and the outputs are meaningful.
    Stable,
    /// The system was numerically degenerate.
    Degenerate,
}

impl Conditioning {
    /// Whether the solve hit a numerical failure.
    pub fn is_degenerate(self) -> bool {
        self == Self::Degenerate
    }
}
