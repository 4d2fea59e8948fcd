//! Provenance identifiers for memory stacks.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

/// Counter for unique [`StackId`] allocation.
static STACK_ID_COUNTER: AtomicU32 = AtomicU32::new(1);

/// Identifies the memory stack an allocation was carved from.
///
/// Every stack built over a buffer takes a fresh id from a monotonic
/// counter. Scopes opened on a stack share its id, so a handle from an
/// enclosing scope is still recognised inside a nested one, while a handle
/// from an unrelated stack is rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StackId(u32);

impl StackId {
    /// Allocate a fresh, unique stack id.
    pub fn next() -> Self {
        Self(STACK_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw id value.
    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for StackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stack#{}", self.0)
    }
}
