//! Benchmark profiles for the Tessel kernels.
//!
//! - [`BenchArena`]: an owned buffer sized for one benchmark
//! - [`binary_image`]: a seeded image with run structure, for the codecs
//! - [`random_matrix`]: seeded dense data for the matrix kernels

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use tessel_arena::{AlignedBuffer, MemoryStack};
use tessel_array::Array;
use tessel_core::{Element, KernelError};
use tessel_test_utils::{random_array, seeded_rng};

/// Image side used by the 2D benchmarks: 120x160 (QQVGA).
pub const IMAGE_SHAPE: (usize, usize) = (120, 160);

/// An aligned buffer that hands out fresh stacks.
pub struct BenchArena {
    buf: AlignedBuffer,
}

impl BenchArena {
    /// Reserve `bytes` of backing storage.
    pub fn new(bytes: usize) -> Self {
        Self {
            buf: AlignedBuffer::new(bytes),
        }
    }

    /// A stack over the whole buffer, starting empty.
    pub fn stack(&mut self) -> MemoryStack<'_> {
        MemoryStack::new(self.buf.as_bytes_mut())
    }
}

/// A `height x width` binary image made of horizontal blobs.
///
/// Each row alternates between runs of zeros and ones whose lengths are
/// drawn from `1..=24`, which keeps the run-length stream realistic for
/// thresholded camera frames.
pub fn binary_image(
    ms: &mut MemoryStack<'_>,
    height: usize,
    width: usize,
    seed: u64,
) -> Result<Array<u8>, KernelError> {
    let mut rng = seeded_rng(seed);
    let lengths: Array<u8> = random_array(&mut rng, ms, 1, height * width, 1..=24)?;
    let out = Array::<u8>::new(height, width, ms)?;
    let mut bit = 0u8;
    let mut remaining = 0usize;
    let mut next = 0;
    for y in 0..height {
        for x in 0..width {
            if remaining == 0 {
                remaining = usize::from(lengths.get(ms, 0, next));
                next += 1;
                bit ^= 1;
            }
            out.set(ms, y, x, bit);
            remaining -= 1;
        }
    }
    Ok(out)
}

/// A `height x width` matrix of values in `[-100, 100]` from `seed`.
pub fn random_matrix<T: Element>(
    ms: &mut MemoryStack<'_>,
    height: usize,
    width: usize,
    seed: u64,
) -> Result<Array<T>, KernelError> {
    random_array(&mut seeded_rng(seed), ms, height, width, -100..=100)
}
