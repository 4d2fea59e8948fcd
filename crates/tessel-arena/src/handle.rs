//! Allocation handles.

use std::fmt;

use tessel_core::StackId;

/// A block of bytes allocated from a [`MemoryStack`](crate::MemoryStack).
///
/// Handles are plain data: they carry the issuing stack's id, the data
/// offset, the requested length, and the allocation serial. The serial
/// lets the stack tell a live handle from one whose bytes were released
/// and reused, without any bookkeeping table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Allocation {
    pub(crate) stack: StackId,
    pub(crate) offset: u32,
    pub(crate) len: u32,
    pub(crate) serial: u32,
}

impl Allocation {
    /// The issuing stack.
    pub fn stack(&self) -> StackId {
        self.stack
    }

    /// Byte offset of the data from the stack's origin.
    pub fn offset(&self) -> usize {
        self.offset as usize
    }

    /// Requested length in bytes.
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// Whether the allocation is empty. Never true for a live handle.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// One past the last requested byte.
    pub fn end(&self) -> usize {
        self.offset() + self.len()
    }

    /// Whether the byte ranges of two handles overlap.
    pub fn overlaps(&self, other: &Allocation) -> bool {
        self.stack == other.stack && self.offset() < other.end() && other.offset() < self.end()
    }
}

impl fmt::Display for Allocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Allocation({}, off={}, len={}, serial={})",
            self.stack, self.offset, self.len, self.serial
        )
    }
}
