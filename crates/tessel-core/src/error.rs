//! Kernel status codes.
//!
//! Every fallible kernel operation returns `Result<_, KernelError>`. The
//! variants mirror the status codes of an exception-free embedded target:
//! the caller always gets a value back, never an abort.

use std::error::Error;
use std::fmt;

/// Errors returned by kernel operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KernelError {
    /// An input array or slice has no backing allocation.
    InvalidObject {
        /// Which operand was invalid.
        what: &'static str,
    },
    /// A parameter is outside its accepted domain.
    InvalidParameter {
        /// Why the parameter was rejected.
        reason: &'static str,
    },
    /// Operand shapes do not agree.
    InvalidSize {
        /// Shape the operation required, as `(height, width)`.
        expected: (usize, usize),
        /// Shape it was given.
        found: (usize, usize),
    },
    /// The memory stack cannot satisfy a request.
    OutOfMemory {
        /// Bytes requested.
        requested: usize,
        /// Bytes that could still be allocated.
        available: usize,
    },
    /// An array was resized while it was not the most recent allocation,
    /// and no longer refers to usable memory.
    UninitializedMemory,
    /// Input and output refer to the same storage where that is not allowed.
    AliasedMemory,
    /// A handle outlived the stack region it was allocated in.
    StaleHandle {
        /// Byte offset of the handle within its stack.
        offset: usize,
    },
    /// Guard bytes around an allocation were overwritten.
    Corrupted {
        /// Byte offset of the damaged allocation record.
        offset: usize,
    },
}

impl fmt::Display for KernelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidObject { what } => write!(f, "invalid object: {what}"),
            Self::InvalidParameter { reason } => write!(f, "invalid parameter: {reason}"),
            Self::InvalidSize { expected, found } => write!(
                f,
                "invalid size: expected {}x{}, found {}x{}",
                expected.0, expected.1, found.0, found.1
            ),
            Self::OutOfMemory {
                requested,
                available,
            } => write!(
                f,
                "out of memory: requested {requested} bytes, {available} available"
            ),
            Self::UninitializedMemory => {
                write!(f, "array memory is no longer initialized after a failed resize")
            }
            Self::AliasedMemory => write!(f, "input and output share storage"),
            Self::StaleHandle { offset } => {
                write!(f, "stale handle at offset {offset}: its scope has ended")
            }
            Self::Corrupted { offset } => {
                write!(f, "allocation guard corrupted at offset {offset}")
            }
        }
    }
}

impl Error for KernelError {}
