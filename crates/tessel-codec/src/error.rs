//! Error types for the container and codecs.

use std::fmt;

use tessel_arena::ArenaError;
use tessel_core::{ElementKind, KernelError};

/// Errors from building, reading, or decoding serialized data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CodecError {
    /// The output has no room for the next segment or byte.
    BufferFull {
        /// Bytes the write needed.
        requested: usize,
        /// Bytes that were left.
        available: usize,
    },
    /// A segment's bytes do not follow the layout its type name promises.
    MalformedSegment {
        /// Data offset of the segment in its buffer.
        offset: usize,
        /// What was wrong.
        reason: &'static str,
    },
    /// The stored element kind differs from the one requested.
    TypeMismatch {
        /// Kind the caller asked for.
        expected: ElementKind,
        /// Kind recorded in the segment.
        found: ElementKind,
    },
    /// The element count in a descriptor disagrees with the payload size.
    LengthMismatch {
        /// Elements the descriptor declares.
        declared: usize,
        /// Elements the payload actually holds.
        actual: usize,
    },
    /// A kernel-level failure, such as a bad name or an arena error.
    Kernel(KernelError),
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BufferFull {
                requested,
                available,
            } => write!(
                f,
                "serialized buffer full: needed {requested} bytes, {available} available"
            ),
            Self::MalformedSegment { offset, reason } => {
                write!(f, "malformed segment at offset {offset}: {reason}")
            }
            Self::TypeMismatch { expected, found } => {
                write!(f, "element type mismatch: expected {expected}, found {found}")
            }
            Self::LengthMismatch { declared, actual } => write!(
                f,
                "length mismatch: descriptor declares {declared} elements, payload holds {actual}"
            ),
            Self::Kernel(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Kernel(e) => Some(e),
            _ => None,
        }
    }
}

impl From<KernelError> for CodecError {
    fn from(e: KernelError) -> Self {
        Self::Kernel(e)
    }
}

impl From<ArenaError> for CodecError {
    fn from(e: ArenaError) -> Self {
        match e {
            ArenaError::CapacityExceeded {
                requested,
                available,
            } => Self::BufferFull {
                requested,
                available,
            },
            other => Self::Kernel(other.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn capacity_becomes_buffer_full() {
        let e: CodecError = ArenaError::CapacityExceeded {
            requested: 96,
            available: 32,
        }
        .into();
        assert_eq!(
            e,
            CodecError::BufferFull {
                requested: 96,
                available: 32
            }
        );
        assert!(e.source().is_none());
    }

    #[test]
    fn kernel_errors_are_the_source() {
        let e: CodecError = ArenaError::Corrupted { offset: 16 }.into();
        assert_eq!(e, CodecError::Kernel(KernelError::Corrupted { offset: 16 }));
        assert!(e.source().is_some());
    }
}
