//! Scratch regions that rewind on exit.

use std::ops::{Deref, DerefMut};

use tessel_core::StackId;

use crate::stack::MemoryStack;

/// A saved stack cursor. See [`MemoryStack::checkpoint`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use]
pub struct Checkpoint {
    pub(crate) used: usize,
    pub(crate) stack: StackId,
}

impl Checkpoint {
    /// The cursor position that was saved.
    pub fn used(&self) -> usize {
        self.used
    }
}

/// A scratch region on a [`MemoryStack`].
///
/// The guard derefs to the stack it was opened on, so it allocates from the
/// same buffer under the same [`StackId`]. When it drops, on every exit
/// path, the cursor goes back to where it was when the scope opened and
/// every handle allocated inside becomes stale.
///
/// ```
/// use tessel_arena::{AlignedBuffer, MemoryStack};
///
/// let mut buf = AlignedBuffer::new(256);
/// let mut ms = MemoryStack::new(buf.as_bytes_mut());
/// let before = ms.used();
/// {
///     let mut scratch = ms.scope();
///     scratch.allocate(64).unwrap();
/// }
/// assert_eq!(ms.used(), before);
/// ```
pub struct StackScope<'s, 'a> {
    stack: &'s mut MemoryStack<'a>,
    checkpoint: Checkpoint,
}

impl<'s, 'a> StackScope<'s, 'a> {
    pub(crate) fn new(stack: &'s mut MemoryStack<'a>) -> Self {
        let checkpoint = stack.checkpoint();
        Self { stack, checkpoint }
    }

    /// The cursor this scope rewinds to.
    pub fn checkpoint(&self) -> Checkpoint {
        self.checkpoint
    }
}

impl<'a> Deref for StackScope<'_, 'a> {
    type Target = MemoryStack<'a>;

    fn deref(&self) -> &Self::Target {
        &*self.stack
    }
}

impl DerefMut for StackScope<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.stack
    }
}

impl Drop for StackScope<'_, '_> {
    fn drop(&mut self) {
        self.stack.rewind(self.checkpoint.used);
    }
}

#[cfg(test)]
mod tests {
    use crate::{AlignedBuffer, MemoryStack};

    #[test]
    fn nested_scopes_unwind_in_order() {
        let mut buf = AlignedBuffer::new(512);
        let mut ms = MemoryStack::new(buf.as_bytes_mut());
        ms.allocate(8).unwrap();
        let base = ms.used();
        {
            let mut outer = ms.scope();
            outer.allocate(32).unwrap();
            let mid = outer.used();
            {
                let mut inner = outer.scope();
                inner.allocate(64).unwrap();
                assert!(inner.used() > mid);
            }
            assert_eq!(outer.used(), mid);
        }
        assert_eq!(ms.used(), base);
    }

    #[test]
    fn early_return_still_rewinds() {
        fn fails(ms: &mut MemoryStack<'_>) -> Result<(), crate::ArenaError> {
            let mut scratch = ms.scope();
            scratch.allocate(16)?;
            scratch.allocate(10_000)?;
            Ok(())
        }
        let mut buf = AlignedBuffer::new(256);
        let mut ms = MemoryStack::new(buf.as_bytes_mut());
        assert!(fails(&mut ms).is_err());
        assert_eq!(ms.used(), 0);
    }

    #[test]
    fn shrink_inside_scope_is_kept() {
        let mut buf = AlignedBuffer::new(256);
        let mut ms = MemoryStack::new(buf.as_bytes_mut());
        let a = ms.allocate(64).unwrap();
        let a2 = {
            let mut scratch = ms.scope();
            scratch.reallocate(&a, 16).unwrap()
        };
        assert_eq!(ms.used(), 36);
        assert!(ms.check(&a2).is_ok());
        assert!(ms.verify().is_ok());
    }
}
