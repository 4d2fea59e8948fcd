//! Byte-level formats for Tessel data.
//!
//! - [`SerializedBuffer`]: an append-only container of named, typed
//!   segments built on a guarded [`MemoryStack`](tessel_arena::MemoryStack),
//!   so a damaged segment can be detected and skipped on read.
//! - [`encode_run_length_binary`] and [`decode_run_length_binary`]: byte
//!   run lengths for binary images.
//! - [`compute_crc32`]: a seedable CRC-32.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod crc;
pub mod error;
pub mod rle;
pub mod serialized;

pub use crc::{compute_crc32, compute_crc32_words};
pub use error::CodecError;
pub use rle::{decode_run_length_binary, encode_run_length_binary};
pub use serialized::{SegmentRef, Segments, SerializedBuffer, Strings};
