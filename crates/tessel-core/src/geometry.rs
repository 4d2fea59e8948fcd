//! Plain geometric value types.

use std::fmt;

/// A 2D point.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point<T> {
    /// Horizontal coordinate.
    pub x: T,
    /// Vertical coordinate.
    pub y: T,
}

impl<T> Point<T> {
    /// Create a point.
    pub const fn new(x: T, y: T) -> Self {
        Self { x, y }
    }
}

impl<T: fmt::Display> fmt::Display for Point<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// An axis-aligned rectangle with inclusive edges.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rectangle<T> {
    /// Smallest x coordinate.
    pub left: T,
    /// Largest x coordinate.
    pub right: T,
    /// Smallest y coordinate.
    pub top: T,
    /// Largest y coordinate.
    pub bottom: T,
}

impl<T> Rectangle<T> {
    /// Create a rectangle from its four edges.
    pub const fn new(left: T, right: T, top: T, bottom: T) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
        }
    }
}

impl<T: fmt::Display> fmt::Display for Rectangle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[x {}..={}, y {}..={}]",
            self.left, self.right, self.top, self.bottom
        )
    }
}
