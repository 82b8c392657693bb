// errors.rs
//! Semantic errors (E3xxx), fatal errors and layout failures.

#![allow(unused_assignments)] // False positives from thiserror derive

use miette::Diagnostic;
use thiserror::Error;

use crate::types::TypeId;

/// Recoverable, user-facing errors. Each is reported once and compilation
/// continues with a placeholder.
#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum SemanticError {
    #[error("malformed constant: {reason}")]
    #[diagnostic(code(E3001))]
    MalformedConstant { reason: String },

    #[error("'{name}' redeclared in this block")]
    #[diagnostic(code(E3002), help("previous declaration at {previous}"))]
    Redeclared { name: String, previous: String },

    #[error("undefined: {name}")]
    #[diagnostic(code(E3003))]
    UndefinedName { name: String },

    #[error("undefined type: {name}")]
    #[diagnostic(code(E3004))]
    UndefinedType { name: String },

    #[error("mismatched types {left} and {right} in constant {op}")]
    #[diagnostic(code(E3005))]
    MismatchedTypes {
        op: String,
        left: String,
        right: String,
    },

    #[error("illegal constant expression: {op} on {ty}")]
    #[diagnostic(code(E3006))]
    InvalidOperation { op: String, ty: String },

    #[error("constant overflow")]
    #[diagnostic(
        code(E3007),
        help("constants are limited to 464 bits of magnitude")
    )]
    ConstantOverflow,

    #[error("division by zero")]
    #[diagnostic(code(E3008))]
    DivisionByZero,

    #[error("constant {value} overflows {ty}")]
    #[diagnostic(code(E3009))]
    ConstantOverflowsType { value: String, ty: String },

    #[error("constant {value} truncated to integer")]
    #[diagnostic(code(E3010))]
    ConstantTruncated { value: String, ty: String },

    #[error("integer constant {value} is not exactly representable as a float")]
    #[diagnostic(code(E3011))]
    InexactConstant { value: String },

    #[error("cannot convert {from} constant to {to}")]
    #[diagnostic(code(E3012))]
    InvalidConversion { from: String, to: String },

    #[error("use of untyped nil")]
    #[diagnostic(code(E3013))]
    UntypedNil,

    #[error("invalid shift count {count}")]
    #[diagnostic(code(E3014), help("shift counts must be between 0 and 464"))]
    InvalidShift { count: String },

    #[error("invalid recursive type {name}")]
    #[diagnostic(
        code(E3015),
        help("break the cycle with a pointer, slice or map")
    )]
    InvalidRecursiveType { name: String },

    #[error("const initializer for '{name}' is not a constant")]
    #[diagnostic(code(E3016))]
    NotConstant { name: String },

    #[error("method redeclared: {receiver}.{name}")]
    #[diagnostic(code(E3017))]
    DuplicateMethod { receiver: String, name: String },

    #[error("invalid receiver type {ty}: {reason}")]
    #[diagnostic(code(E3018))]
    InvalidReceiver { ty: String, reason: &'static str },

    #[error("inconsistent definition for '{name}' during import")]
    #[diagnostic(code(E3019))]
    IncompatibleImport { name: String },

    #[error("type {name} is too large")]
    #[diagnostic(code(E3020))]
    TypeTooLarge { name: String },
}

/// Errors that abandon the compilation.
#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum FatalError {
    #[error("corrupt import record: {reason}")]
    #[diagnostic(code(E3900))]
    CorruptImport { reason: String },

    #[error("too many errors ({count})")]
    #[diagnostic(code(E3901))]
    TooManyErrors { count: usize },
}

/// Failures of width and alignment computation.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutError {
    #[error("type {0:?} has infinite size")]
    InfiniteSize(TypeId),

    #[error("type {0:?} is declared but not defined")]
    UnresolvedForward(TypeId),

    #[error("type {0:?} has no width")]
    NoWidth(TypeId),

    #[error("type {0:?} is too large")]
    TooLarge(TypeId),
}
