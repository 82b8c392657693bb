// constant/mod.rs
//
// Compile-time constants: values, literal conversion and folding.

mod fold;
mod literal;
mod val;

pub use val::{LiteralText, StrId, StringPool, Val};
