//! Core types for the Tessel array kernel.
//!
//! This crate is the leaf of the workspace. It holds the shared vocabulary
//! every other crate speaks:
//!
//! - [`KernelError`], the status codes returned by fallible kernel operations.
//! - [`Element`], the trait implemented by every storable scalar type, plus
//!   the [`round`] and [`saturate_cast`] conversions built on it.
//! - Small value types: [`Point`], [`Rectangle`], [`StackId`], and the
//!   layout enums [`Order`], [`Axis`], [`SortOrder`].
//! - [`Conditioning`], the outcome flag reported by numerical solvers.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod element;
pub mod error;
pub mod geometry;
pub mod id;
pub mod layout;

pub use element::{round, saturate_cast, Element, ElementKind};
pub use error::KernelError;
pub use geometry::{Point, Rectangle};
pub use id::StackId;
pub use layout::{Axis, Conditioning, Order, SortOrder};
