//! Fixed-capacity guarded bump allocator.
//!
//! A [`MemoryStack`] carves 16-byte-aligned allocations out of a byte
//! buffer supplied by the caller. It never grows and never frees
//! individual blocks; memory comes back only by rewinding the cursor, either
//! through a [`StackScope`] guard or by shrinking the topmost block.
//!
//! # Record layout
//!
//! ```text
//! cursor ─┐
//!         ▼
//!         [pad][size:u32][serial:u32][data … rounded to 16][footer:u32]
//!                                    ▲
//!                                    16-aligned
//! ```
//!
//! The header and footer bracket every allocation. A validity scan walks
//! the records from the start of the buffer and reports any header or
//! footer that no longer matches what was written, which is how overruns
//! are caught. Each allocation also gets a serial number, so an
//! [`Allocation`] handle that outlived its scope is detected as stale
//! instead of silently aliasing newer data.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod buffer;
pub mod config;
pub mod error;
pub mod handle;
mod record;
pub mod scope;
pub mod stack;

pub use buffer::AlignedBuffer;
pub use config::StackConfig;
pub use error::ArenaError;
pub use handle::Allocation;
pub use record::{ALIGNMENT, FOOTER_BYTES, HEADER_BYTES};
pub use scope::{Checkpoint, StackScope};
pub use stack::{Allocations, MemoryStack};
