//! Memory stack configuration.

/// Configuration for a [`MemoryStack`](crate::MemoryStack).
///
/// Immutable once the stack is built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StackConfig {
    /// Whether [`is_valid`](crate::MemoryStack::is_valid) walks every
    /// allocation record and checks its guards.
    ///
    /// Default: on in debug builds, off in release builds, where
    /// `is_valid` only checks the cursor invariant.
    pub verify_guards: bool,

    /// Whether newly allocated bytes are zero-filled.
    ///
    /// Default: `true`.
    pub zero_allocations: bool,
}

impl StackConfig {
    /// Default for [`StackConfig::verify_guards`].
    pub const DEFAULT_VERIFY_GUARDS: bool = cfg!(debug_assertions);

    /// Default for [`StackConfig::zero_allocations`].
    pub const DEFAULT_ZERO_ALLOCATIONS: bool = true;

    /// Create a config with default values.
    pub fn new() -> Self {
        Self {
            verify_guards: Self::DEFAULT_VERIFY_GUARDS,
            zero_allocations: Self::DEFAULT_ZERO_ALLOCATIONS,
        }
    }

    /// Enable or disable the guard scan in `is_valid`.
    pub fn with_verify_guards(mut self, verify: bool) -> Self {
        self.verify_guards = verify;
        self
    }

    /// Enable or disable zero-filling of new allocations.
    pub fn with_zero_allocations(mut self, zero: bool) -> Self {
        self.zero_allocations = zero;
        self
    }
}

impl Default for StackConfig {
    fn default() -> Self {
        Self::new()
    }
}
