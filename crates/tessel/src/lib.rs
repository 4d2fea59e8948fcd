//! Tessel: arena-backed 2D arrays and matrix kernels for memory-constrained
//! targets.
//!
//! This facade re-exports the public API of the Tessel sub-crates. Nothing
//! here touches the heap: every array lives in a [`MemoryStack`] over a
//! byte buffer the caller owns, and kernels borrow scratch space from the
//! same stack, giving it back before they return.
//!
//! # Quick start
//!
//! ```rust
//! use tessel::prelude::*;
//!
//! let mut buf = AlignedBuffer::new(4096);
//! let mut ms = MemoryStack::new(buf.as_bytes_mut());
//!
//! let a = Array::<i16>::new(2, 3, &mut ms).unwrap();
//! a.copy_from_slice(&mut ms, &[5, -1, 3, 0, 8, 2]);
//! let doubled = Array::<i32>::new(2, 3, &mut ms).unwrap();
//! tessel::matrix::add(a, a, doubled, &mut ms).unwrap();
//! assert_eq!(tessel::matrix::sum::<i32, i64>(doubled, &ms).unwrap(), 34);
//!
//! tessel::matrix::sort(a, None, Axis::X, SortOrder::Ascending, &mut ms).unwrap();
//! assert_eq!(a.row(&ms, 0), &[-1, 3, 5]);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `tessel-core` | errors, element types, geometry, layout enums |
//! | [`arena`] | `tessel-arena` | `MemoryStack`, allocations, scopes |
//! | [`array`] | `tessel-array` | `Array`, views, sequences, meshgrids |
//! | [`matrix`] | `tessel-matrix` | arithmetic, reductions, sort, solvers, search, resampling |
//! | [`codec`] | `tessel-codec` | segment container, run-length coding, CRC-32 |
//! | [`simd`] | `tessel-simd` | packed-lane instruction emulation |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Errors, element types, and small value types (`tessel-core`).
pub use tessel_core as types;

/// The guarded bump allocator (`tessel-arena`).
pub use tessel_arena as arena;

/// Arrays, strided views, and generated sequences (`tessel-array`).
pub use tessel_array as array;

/// Kernels over arrays (`tessel-matrix`).
pub use tessel_matrix as matrix;

/// Byte formats: [`codec::SerializedBuffer`], run-length coding and CRC-32
/// (`tessel-codec`).
pub use tessel_codec as codec;

/// Packed-lane SIMD emulation (`tessel-simd`).
pub use tessel_simd as simd;

#[doc(no_inline)]
pub use tessel_arena::MemoryStack;

/// Common imports.
///
/// ```rust
/// use tessel::prelude::*;
/// ```
pub mod prelude {
    // Core
    pub use tessel_core::{
        Axis, Conditioning, Element, ElementKind, KernelError, Order, Point, Rectangle, SortOrder,
    };

    // Memory
    pub use tessel_arena::{AlignedBuffer, Allocation, MemoryStack, StackConfig};

    // Arrays
    pub use tessel_array::{Array, ArraySlice, ConstArraySlice, LinearSequence, Meshgrid};

    // Kernels
    pub use tessel_matrix::{Comparison, Find, Operand};

    // Codecs
    pub use tessel_codec::{CodecError, SerializedBuffer};
}
