//! Owned, 16-byte-aligned backing storage.

use bytemuck::{Pod, Zeroable};

use crate::record::ALIGNMENT;

#[derive(Clone, Copy, Pod, Zeroable)]
#[repr(C, align(16))]
struct Block([u8; ALIGNMENT]);

/// A heap-allocated byte buffer whose first byte is 16-aligned.
///
/// Hosts and tests use it as the backing store for a
/// [`MemoryStack`](crate::MemoryStack) so that allocation offsets are
/// reproducible: the stack's origin is always byte 0.
pub struct AlignedBuffer {
    blocks: Box<[Block]>,
    len: usize,
}

impl AlignedBuffer {
    /// Allocate `len` zeroed bytes.
    pub fn new(len: usize) -> Self {
        let blocks = vec![Block::zeroed(); len.div_ceil(ALIGNMENT)].into_boxed_slice();
        Self { blocks, len }
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &bytemuck::cast_slice(&self.blocks)[..self.len]
    }

    /// The bytes, mutably.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut bytemuck::cast_slice_mut(&mut self.blocks)[..self.len]
    }
}
