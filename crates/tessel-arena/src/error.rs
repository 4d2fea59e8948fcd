//! Arena-specific error types.

use std::error::Error;
use std::fmt;

use tessel_core::{KernelError, StackId};

/// Errors that can occur during memory stack operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// The request does not fit in the remaining space.
    CapacityExceeded {
        /// Number of bytes requested.
        requested: usize,
        /// Largest request that would still succeed.
        available: usize,
    },
    /// Zero-byte allocations are not supported.
    ZeroSize,
    /// Only the most recent allocation can be reallocated.
    NotTopmost {
        /// Data offset of the allocation that was not on top.
        offset: usize,
    },
    /// Reallocation can only shrink a block.
    GrowNotSupported {
        /// Current size in bytes.
        current: usize,
        /// Requested size in bytes.
        requested: usize,
    },
    /// The handle refers to memory released by a scope exit or a resize.
    StaleAllocation {
        /// Data offset of the stale handle.
        offset: usize,
    },
    /// The handle was issued by a different stack.
    ForeignStack {
        /// The stack that was asked.
        expected: StackId,
        /// The stack that issued the handle.
        found: StackId,
    },
    /// An allocation record's header or footer guard was overwritten.
    Corrupted {
        /// Data offset of the damaged record.
        offset: usize,
    },
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExceeded {
                requested,
                available,
            } => write!(
                f,
                "stack capacity exceeded: requested {requested} bytes, largest available {available} bytes"
            ),
            Self::ZeroSize => write!(f, "zero-byte allocation"),
            Self::NotTopmost { offset } => {
                write!(f, "allocation at offset {offset} is not the topmost block")
            }
            Self::GrowNotSupported { current, requested } => write!(
                f,
                "cannot grow allocation from {current} to {requested} bytes"
            ),
            Self::StaleAllocation { offset } => {
                write!(f, "stale allocation handle at offset {offset}")
            }
            Self::ForeignStack { expected, found } => {
                write!(f, "handle from {found} used with {expected}")
            }
            Self::Corrupted { offset } => {
                write!(f, "allocation guard corrupted at offset {offset}")
            }
        }
    }
}

impl Error for ArenaError {}

impl From<ArenaError> for KernelError {
    fn from(e: ArenaError) -> Self {
        match e {
            ArenaError::CapacityExceeded {
                requested,
                available,
            } => KernelError::OutOfMemory {
                requested,
                available,
            },
            ArenaError::ZeroSize => KernelError::InvalidParameter {
                reason: "zero-byte allocation",
            },
            ArenaError::NotTopmost { .. } => KernelError::UninitializedMemory,
            ArenaError::GrowNotSupported { current, requested } => KernelError::OutOfMemory {
                requested,
                available: current,
            },
            ArenaError::StaleAllocation { offset } => KernelError::StaleHandle { offset },
            ArenaError::ForeignStack { .. } => KernelError::InvalidObject {
                what: "handle belongs to a different memory stack",
            },
            ArenaError::Corrupted { offset } => KernelError::Corrupted { offset },
        }
    }
}
