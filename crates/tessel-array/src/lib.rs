//! Arena-backed 2D arrays and views.
//!
//! [`Array`] is a `height x width` grid of [`Element`](tessel_core::Element)
//! values stored in a single [`MemoryStack`](tessel_arena::MemoryStack)
//! allocation. [`ArraySlice`] and [`ConstArraySlice`] select strided,
//! optionally transposed sub-rectangles of an array without copying.
//! [`LinearSequence`] and [`Meshgrid`] describe index and coordinate ranges
//! lazily and write them out on request.
//!
//! ```
//! use tessel_arena::{AlignedBuffer, MemoryStack};
//! use tessel_array::Array;
//!
//! let mut buf = AlignedBuffer::new(1024);
//! let mut ms = MemoryStack::new(buf.as_bytes_mut());
//! let a = Array::<i32>::new(3, 4, &mut ms).unwrap();
//! a.copy_from_slice(&mut ms, &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]);
//!
//! // Every other column of the last two rows.
//! let view = a.range_step(1, 1, -1, 0, 2, -1).unwrap();
//! assert_eq!(view.shape(), (2, 2));
//! assert_eq!(view.get(&ms, 1, 1), 11);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod array;
pub mod display;
pub mod patterns;
pub mod sequence;
pub mod slice;

pub use array::Array;
pub use display::ArrayDisplay;
pub use sequence::{LinearSequence, Meshgrid};
pub use slice::{ArraySlice, ConstArraySlice};
