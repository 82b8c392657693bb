// config.rs
//
// Per-compilation settings: target machine shape and error policy.

/// Machine parameters that determine type layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    /// Width of pointers and every word-sized descriptor.
    pub ptr_width: u64,
    /// Width of `int` and `uint`.
    pub int_width: u64,
    /// Alignment ceiling; no type is aligned beyond this.
    pub max_align: u64,
}

impl Default for Target {
    fn default() -> Self {
        Self {
            ptr_width: 8,
            int_width: 4,
            max_align: 8,
        }
    }
}

impl Target {
    /// Alignment for a value of `width` bytes: the width itself, capped at
    /// `max_align`, and at least 1. A zero ceiling aligns everything to 1.
    pub fn align_for(&self, width: u64) -> u64 {
        width.min(self.max_align).max(1)
    }
}

#[derive(Debug, Clone)]
pub struct SemaConfig {
    pub target: Target,
    /// Number of errors after which compilation is abandoned. 0 disables
    /// the ceiling.
    pub error_limit: usize,
    /// Name of the package being compiled.
    pub package: String,
}

impl Default for SemaConfig {
    fn default() -> Self {
        Self {
            target: Target::default(),
            error_limit: 10,
            package: "main".to_string(),
        }
    }
}
