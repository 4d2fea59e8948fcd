//! Seeded random data.
//!
//! Every generator takes an explicit `ChaCha8Rng`, so a failing test
//! reproduces from its seed alone.

use std::ops::RangeInclusive;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tessel_arena::MemoryStack;
use tessel_array::Array;
use tessel_core::{Element, KernelError};

/// A generator seeded from `seed`.
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// `n` integers drawn uniformly from `range`, converted to `T` with `as`
/// semantics.
pub fn random_integers<T: Element>(
    rng: &mut ChaCha8Rng,
    n: usize,
    range: RangeInclusive<i64>,
) -> Vec<T> {
    (0..n)
        .map(|_| T::from_i128(i128::from(rng.random_range(range.clone()))))
        .collect()
}

/// `n` floats drawn uniformly from `[lo, hi)`.
pub fn random_floats<T: Element>(rng: &mut ChaCha8Rng, n: usize, lo: f64, hi: f64) -> Vec<T> {
    (0..n)
        .map(|_| T::from_f64(lo + (hi - lo) * rng.random::<f64>()))
        .collect()
}

/// A `height x width` array of values in `range`. Float element types get
/// fractional values, integer types whole ones.
pub fn random_array<T: Element>(
    rng: &mut ChaCha8Rng,
    ms: &mut MemoryStack<'_>,
    height: usize,
    width: usize,
    range: RangeInclusive<i64>,
) -> Result<Array<T>, KernelError> {
    let n = height * width;
    let values: Vec<T> = if T::IS_INTEGER {
        random_integers(rng, n, range)
    } else {
        random_floats(rng, n, *range.start() as f64, *range.end() as f64)
    };
    let a = Array::new(height, width, ms)?;
    a.copy_from_slice(ms, &values);
    Ok(a)
}
