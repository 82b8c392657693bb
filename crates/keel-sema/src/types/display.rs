// types/display.rs
//
// Source-syntax rendering of types for diagnostics.

use std::fmt;

use crate::symbols::SymbolTable;
use crate::types::{ArrayBound, ChanDir, Field, TypeArena, TypeId, TypeKind};

/// Displays a type the way it is written in source, named types as
/// `pkg.Name`.
pub struct TypeDisplay<'a> {
    pub types: &'a TypeArena,
    pub symbols: &'a SymbolTable,
    pub id: TypeId,
}

impl<'a> TypeDisplay<'a> {
    pub fn new(types: &'a TypeArena, symbols: &'a SymbolTable, id: TypeId) -> Self {
        Self { types, symbols, id }
    }

    fn with(&self, id: TypeId) -> TypeDisplay<'a> {
        TypeDisplay { id, ..*self }
    }

    fn write_tuple(&self, f: &mut fmt::Formatter<'_>, fields: &[Field]) -> fmt::Result {
        f.write_str("(")?;
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", self.with(field.ty))?;
        }
        f.write_str(")")
    }

    fn write_member(&self, f: &mut fmt::Formatter<'_>, field: &Field) -> fmt::Result {
        match field.name {
            Some(name) if !field.embedded => {
                write!(f, "{} {}", self.symbols.name(name), self.with(field.ty))
            }
            _ => write!(f, "{}", self.with(field.ty)),
        }
    }

    fn write_signature(&self, f: &mut fmt::Formatter<'_>, ty: TypeId) -> fmt::Result {
        let Some(sig) = self.types.func_sig(ty) else {
            return write!(f, " {}", self.with(ty));
        };
        self.write_tuple(f, &sig.params)?;
        match sig.results.as_slice() {
            [] => Ok(()),
            [single] if single.name.is_none() => write!(f, " {}", self.with(single.ty)),
            results => {
                f.write_str(" ")?;
                self.write_tuple(f, results)
            }
        }
    }
}

impl fmt::Display for TypeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ty = self.types.get(self.id);
        if let Some(sym) = ty.sym {
            return write!(
                f,
                "{}.{}",
                self.symbols.package(sym),
                self.symbols.name(sym)
            );
        }
        match &ty.kind {
            TypeKind::Basic(kind) => f.write_str(kind.name()),
            TypeKind::Ptr(elem) => write!(f, "*{}", self.with(*elem)),
            TypeKind::Array {
                elem,
                bound: ArrayBound::Dynamic,
            } => write!(f, "[]{}", self.with(*elem)),
            TypeKind::Array {
                elem,
                bound: ArrayBound::Fixed(n),
            } => write!(f, "[{}]{}", n, self.with(*elem)),
            TypeKind::Map { key, value } => {
                write!(f, "map[{}]{}", self.with(*key), self.with(*value))
            }
            TypeKind::Chan { elem, dir } => match dir {
                ChanDir::Both => write!(f, "chan {}", self.with(*elem)),
                ChanDir::Recv => write!(f, "<-chan {}", self.with(*elem)),
                ChanDir::Send => write!(f, "chan<- {}", self.with(*elem)),
            },
            TypeKind::Func(sig) => {
                if let Some(recv) = sig.receiver.first() {
                    write!(f, "({}) ", self.with(recv.ty))?;
                }
                f.write_str("func")?;
                self.write_signature(f, self.id)
            }
            TypeKind::Struct(fields) if fields.is_empty() => f.write_str("struct {}"),
            TypeKind::Struct(fields) => {
                f.write_str("struct { ")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str("; ")?;
                    }
                    self.write_member(f, field)?;
                }
                f.write_str(" }")
            }
            TypeKind::Interface(methods) if methods.is_empty() => f.write_str("interface {}"),
            TypeKind::Interface(methods) => {
                f.write_str("interface { ")?;
                for (i, method) in methods.iter().enumerate() {
                    if i > 0 {
                        f.write_str("; ")?;
                    }
                    match method.name {
                        Some(name) => {
                            f.write_str(self.symbols.name(name))?;
                            self.write_signature(f, method.ty)?;
                        }
                        None => write!(f, "{}", self.with(method.ty))?,
                    }
                }
                f.write_str(" }")
            }
            TypeKind::Forward => f.write_str("<forward>"),
            TypeKind::Ideal => f.write_str("ideal"),
            TypeKind::Nil => f.write_str("nil"),
            TypeKind::Error => f.write_str("<error>"),
        }
    }
}
