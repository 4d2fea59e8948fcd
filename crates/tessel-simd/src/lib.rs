//! Portable emulation of packed-lane SIMD and bit-manipulation instructions.
//!
//! Kernel code written for a DSP-extension core calls a small catalogue of
//! packed instructions: lane-wise add and subtract at 8- and 16-bit widths
//! (wrapping, saturating, halving), byte and bit reversal, saturation to N
//! bits, leading-zero count, dual multiply-accumulate, and a byte select.
//! This crate provides bit-exact host implementations of each.
//!
//! # Flags
//!
//! The hardware records per-lane "greater or equal" flags as a side effect
//! of the wrapping add/subtract instructions and reads them back in `SEL`.
//! Here that state is explicit: those operations return a [`Flagged`]
//! value carrying both the packed result and its [`GeFlags`], and
//! [`intrinsics::sel`] takes the mask as an argument.
//!
//! ```
//! use tessel_simd::intrinsics::{sel, usub8};
//!
//! // Per-byte maximum of two registers.
//! let a = 0x10_80_05_FF;
//! let b = 0x20_70_05_00;
//! let diff = usub8(a, b);
//! assert_eq!(sel(a, b, diff.ge), 0x20_80_05_FF);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod intrinsics;
pub mod packed;

pub use intrinsics::{Flagged, GeFlags};
pub use packed::{Packed128, Packed32, Packed64};
