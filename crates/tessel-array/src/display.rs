//! Text rendering of arrays and views.

use std::fmt;

use tessel_arena::MemoryStack;
use tessel_core::Element;

use crate::slice::ConstArraySlice;

/// Prints a view one row per line, elements separated by spaces.
///
/// Built by [`Array::display`](crate::Array::display) and the slice
/// `display` methods.
pub struct ArrayDisplay<'m, T: Element> {
    view: ConstArraySlice<T>,
    ms: &'m MemoryStack<'m>,
}

impl<'m, T: Element> ArrayDisplay<'m, T> {
    pub(crate) fn new(view: ConstArraySlice<T>, ms: &'m MemoryStack<'m>) -> Self {
        Self { view, ms }
    }
}

impl<T: Element> fmt::Display for ArrayDisplay<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (h, w) = self.view.shape();
        if self.view.check(self.ms).is_err() {
            return write!(f, "Array<{}> (invalid)", T::KIND);
        }
        writeln!(f, "Array<{}> {h}x{w}", T::KIND)?;
        for y in 0..h {
            for x in 0..w {
                if x > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{}", self.view.get(self.ms, y, x))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::Array;
    use tessel_arena::{AlignedBuffer, MemoryStack};

    #[test]
    fn prints_rows() {
        let mut buf = AlignedBuffer::new(512);
        let mut ms = MemoryStack::new(buf.as_bytes_mut());
        let a = Array::<i32>::new(2, 3, &mut ms).unwrap();
        a.copy_from_slice(&mut ms, &[1, -2, 3, 4, 5, 6]);
        assert_eq!(a.display(&ms).to_string(), "Array<i32> 2x3\n1 -2 3\n4 5 6\n");
        let t = a.as_const_slice().transpose();
        assert_eq!(t.display(&ms).to_string(), "Array<i32> 3x2\n1 4\n-2 5\n3 6\n");
    }

    #[test]
    fn invalid_array_prints_marker() {
        let mut buf = AlignedBuffer::new(64);
        let ms = MemoryStack::new(buf.as_bytes_mut());
        let a = Array::<u8>::invalid();
        assert_eq!(a.display(&ms).to_string(), "Array<u8> (invalid)");
    }
}
