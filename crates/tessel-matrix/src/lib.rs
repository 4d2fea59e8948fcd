//! Algorithms over Tessel arrays.
//!
//! Every operation takes its inputs as views (`impl Into<ConstArraySlice>`
//! or [`Operand`]), writes into caller-allocated outputs, and threads the
//! owning [`MemoryStack`](tessel_arena::MemoryStack) through explicitly.
//! Operations that need temporaries allocate them in a scratch scope and
//! leave the stack's cursor where they found it.
//!
//! - [`elementwise`]: `add`, `subtract`, `dot_multiply`, `dot_divide`,
//!   `abs_diff`, `exp`, `sqrt`
//! - [`reduce`]: `min`, `max`, `sum`, `mean`, `mean_and_var`, `sum_of_abs_diff`
//! - [`multiply`](mod@multiply): matrix products, transpose, reshape,
//!   vectorize, rotations
//! - [`sort`](mod@sort): insertion sort and quicksort along an axis
//! - [`cholesky`] and [`homography`]: least-squares solvers
//! - [`find`]: predicate search
//! - [`interp`]: bilinear resampling

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cholesky;
pub mod elementwise;
pub mod find;
pub mod homography;
pub mod interp;
pub mod multiply;
pub mod operand;
pub mod reduce;
pub mod sort;

pub use cholesky::solve_least_squares_with_cholesky;
pub use elementwise::{abs_diff, add, dot_divide, dot_multiply, exp, sqrt, subtract};
pub use find::{Comparison, Find};
pub use homography::estimate_homography;
pub use interp::{interp2, interp2_affine, interp2_projective};
pub use multiply::{
    multiply, multiply_transpose, reshape, reshape_into, rotate180, rotate270, rotate90, transpose,
    vectorize, vectorize_into,
};
pub use operand::Operand;
pub use reduce::{max, mean, mean_and_var, min, sum, sum_of_abs_diff};
pub use sort::{insertion_sort, quick_sort, sort};
