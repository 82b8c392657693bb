// constant/val.rs
//
// Constant values attached to literal nodes, and the string literal pool.

use std::fmt;

use keel_mparith::{MpFlt, MpInt};
use rustc_hash::FxHashMap;

use crate::arena::{Arena, arena_id};

keel_identity::define_entity_id! {
    /// Handle to an interned string literal.
    pub struct StrId;
}
arena_id!(StrId);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Val {
    /// Register class placeholder used by code generation.
    Reg(u16),
    Bool(bool),
    Int(MpInt),
    Float(MpFlt),
    Str(StrId),
    Nil,
}

impl Val {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Val::Reg(_) => "register",
            Val::Bool(_) => "bool",
            Val::Int(_) => "integer",
            Val::Float(_) => "float",
            Val::Str(_) => "string",
            Val::Nil => "nil",
        }
    }

    pub fn overflowed(&self) -> bool {
        match self {
            Val::Int(v) => v.overflowed(),
            Val::Float(v) => v.overflowed(),
            _ => false,
        }
    }
}

/// Interned, immutable byte strings. Each distinct literal is stored once.
#[derive(Debug, Default)]
pub struct StringPool {
    strings: Arena<StrId, Box<[u8]>>,
    index: FxHashMap<Box<[u8]>, StrId>,
}

impl StringPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, bytes: &[u8]) -> StrId {
        if let Some(&id) = self.index.get(bytes) {
            return id;
        }
        let id = self.strings.alloc(bytes.into());
        self.index.insert(bytes.into(), id);
        id
    }

    pub fn get(&self, id: StrId) -> &[u8] {
        self.strings.get(id)
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    pub fn concat(&mut self, a: StrId, b: StrId) -> StrId {
        let mut joined = Vec::with_capacity(self.get(a).len() + self.get(b).len());
        joined.extend_from_slice(self.get(a));
        joined.extend_from_slice(self.get(b));
        self.intern(&joined)
    }

    /// Quoted form for diagnostics.
    pub fn display(&self, id: StrId) -> impl fmt::Display + '_ {
        Quoted(self.get(id))
    }
}

struct Quoted<'a>(&'a [u8]);

impl fmt::Display for Quoted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.0.escape_ascii())
    }
}

/// Literal text handed over by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralText<'a> {
    Bool(bool),
    Int(&'a str),
    Float(&'a str),
    Str(&'a [u8]),
    Nil,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strings_are_interned_once() {
        let mut pool = StringPool::new();
        let a = pool.intern(b"hello");
        let b = pool.intern(b"hello");
        assert_eq!(a, b);
        assert_eq!(pool.len(), 1);

        let c = pool.intern(b", world");
        let joined = pool.concat(a, c);
        assert_eq!(pool.get(joined), b"hello, world");
        assert_eq!(pool.display(joined).to_string(), "\"hello, world\"");
    }

    #[test]
    fn overflow_is_visible_on_values() {
        assert!(Val::Int(MpInt::overflow(false)).overflowed());
        assert!(!Val::Int(MpInt::from_i64(3)).overflowed());
        assert!(!Val::Bool(true).overflowed());
        assert_eq!(Val::Nil.kind_name(), "nil");
    }
}
