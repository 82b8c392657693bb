// error.rs
//
// Failures of constant arithmetic and literal parsing.

use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MpError {
    #[error("malformed constant: {reason}")]
    Malformed { reason: &'static str },

    #[error("constant overflow")]
    Overflow,

    #[error("division by zero")]
    DivisionByZero,

    #[error("integer constant is not exactly representable as a float")]
    Inexact,

    #[error("constant truncated to integer")]
    Truncated,

    #[error("floating-point value is not finite")]
    NotFinite,
}

impl MpError {
    pub(crate) const fn malformed(reason: &'static str) -> Self {
        MpError::Malformed { reason }
    }
}
