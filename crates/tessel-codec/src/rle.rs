//! Run-length coding of binary images.
//!
//! The array is read row-major with every nonzero element counted as one.
//! The stream is a sequence of byte-sized run lengths that alternate
//! between zeros and ones, starting with zeros, so an image that starts
//! with a one begins with a zero-length run. A run longer than 255 is
//! written as `255, 0, rest`, the zero-length run of the other value
//! keeping the alternation intact.

use tessel_arena::MemoryStack;
use tessel_array::{Array, ConstArraySlice};
use tessel_core::{Element, KernelError};

use crate::error::CodecError;

struct RunWriter<'o> {
    out: &'o mut [u8],
    written: usize,
}

impl RunWriter<'_> {
    fn push(&mut self, byte: u8) -> Result<(), CodecError> {
        let available = self.out.len();
        let slot = self
            .out
            .get_mut(self.written)
            .ok_or(CodecError::BufferFull {
                requested: self.written + 1,
                available,
            })?;
        *slot = byte;
        self.written += 1;
        Ok(())
    }

    fn run(&mut self, mut len: usize) -> Result<(), CodecError> {
        while len > 255 {
            self.push(255)?;
            self.push(0)?;
            len -= 255;
        }
        self.push(len as u8)
    }
}

/// Encode `array` into `out`, returning the number of bytes written.
///
/// An empty array encodes to nothing.
pub fn encode_run_length_binary<T: Element>(
    ms: &MemoryStack<'_>,
    array: impl Into<ConstArraySlice<T>>,
    out: &mut [u8],
) -> Result<usize, CodecError> {
    let view = array.into();
    view.check(ms)?;
    let mut writer = RunWriter { out, written: 0 };
    let mut current = false;
    let mut len = 0usize;
    for value in view.iter(ms) {
        let bit = value != T::ZERO;
        if bit != current {
            writer.run(len)?;
            current = bit;
            len = 0;
        }
        len += 1;
    }
    if len > 0 {
        writer.run(len)?;
    }
    Ok(writer.written)
}

/// Decode a run-length stream into a new `height x width` array on `ms`.
///
/// Elements in one-runs are [`Element::ONE`], the rest zero. The runs must
/// cover the array exactly; otherwise nothing is allocated and the call
/// fails with [`KernelError::InvalidSize`].
pub fn decode_run_length_binary<T: Element>(
    bytes: &[u8],
    height: usize,
    width: usize,
    ms: &mut MemoryStack<'_>,
) -> Result<Array<T>, CodecError> {
    let total: usize = bytes.iter().map(|&b| usize::from(b)).sum();
    let expected = height.checked_mul(width).ok_or(KernelError::InvalidParameter {
        reason: "array dimensions overflow",
    })?;
    if total != expected {
        return Err(KernelError::InvalidSize {
            expected: (height, width),
            found: (1, total),
        }
        .into());
    }
    let out = Array::<T>::new(height, width, ms)?;
    let mut pos = 0usize;
    for (i, &run) in bytes.iter().enumerate() {
        let run = usize::from(run);
        if i % 2 == 1 {
            for p in pos..pos + run {
                out.set(ms, p / width, p % width, T::ONE);
            }
        }
        pos += run;
    }
    Ok(out)
}
