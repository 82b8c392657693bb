// types/mod.rs
//
// Type representation for semantic analysis:
// - TypeId: u32 handle to a type (Copy, trivial Eq/Hash)
// - TypeArena: per-compilation storage; anonymous composites are interned,
//   named types are always fresh
// - TypeKind: the constructor shape, with TypeId links to child types

mod arena;
mod display;
mod equality;
mod kind;
mod layout;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::arena::arena_id;
use crate::symbols::SymId;

pub use arena::TypeArena;
pub use display::TypeDisplay;
pub use kind::Kind;
pub use layout::Layout;

keel_identity::define_entity_id! {
    /// Handle to a type in the [`TypeArena`].
    pub struct TypeId;
}
arena_id!(TypeId);

impl TypeId {
    // Reserved ids, interned at these indices by TypeArena::new().

    /// Placeholder type of erroneous expressions. Must be 0.
    pub const ERROR: TypeId = TypeId::new(0);

    pub const INT8: TypeId = TypeId::new(1);
    pub const UINT8: TypeId = TypeId::new(2);
    pub const INT16: TypeId = TypeId::new(3);
    pub const UINT16: TypeId = TypeId::new(4);
    pub const INT32: TypeId = TypeId::new(5);
    pub const UINT32: TypeId = TypeId::new(6);
    pub const INT64: TypeId = TypeId::new(7);
    pub const UINT64: TypeId = TypeId::new(8);
    pub const INT: TypeId = TypeId::new(9);
    pub const UINT: TypeId = TypeId::new(10);
    pub const UINTPTR: TypeId = TypeId::new(11);

    pub const FLOAT32: TypeId = TypeId::new(12);
    pub const FLOAT64: TypeId = TypeId::new(13);
    pub const FLOAT80: TypeId = TypeId::new(14);
    pub const FLOAT: TypeId = TypeId::new(15);

    pub const BOOL: TypeId = TypeId::new(16);
    pub const STRING: TypeId = TypeId::new(17);

    /// Type of untyped constants.
    pub const IDEAL: TypeId = TypeId::new(18);
    pub const NIL: TypeId = TypeId::new(19);

    pub const BYTE: TypeId = TypeId::UINT8;

    /// First non-reserved index.
    pub const FIRST_DYNAMIC: u32 = 20;

    /// Reserved id of a basic kind.
    pub fn basic(kind: Kind) -> Option<TypeId> {
        Kind::BASIC
            .iter()
            .position(|&k| k == kind)
            .map(|i| TypeId::new(i as u32 + 1))
    }

    #[inline]
    pub fn is_reserved(self) -> bool {
        self.index() < Self::FIRST_DYNAMIC
    }

    #[inline]
    pub fn is_error(self) -> bool {
        self == Self::ERROR
    }
}

/// Inline up to 4 fields (covers most structs and signatures).
pub type FieldVec = SmallVec<[Field; 4]>;

/// A struct field, interface method, or function parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Field {
    pub name: Option<SymId>,
    pub ty: TypeId,
    pub embedded: bool,
}

impl Field {
    pub fn named(name: SymId, ty: TypeId) -> Self {
        Self {
            name: Some(name),
            ty,
            embedded: false,
        }
    }

    pub fn anon(ty: TypeId) -> Self {
        Self {
            name: None,
            ty,
            embedded: false,
        }
    }

    /// An embedded struct field, named after its type.
    pub fn embedded(name: SymId, ty: TypeId) -> Self {
        Self {
            name: Some(name),
            ty,
            embedded: true,
        }
    }
}

/// Function signature: receiver, parameter and result tuples.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FuncSig {
    pub receiver: FieldVec,
    pub params: FieldVec,
    pub results: FieldVec,
    pub results_named: bool,
}

impl FuncSig {
    pub fn new(params: FieldVec, results: FieldVec) -> Self {
        let results_named = results.iter().any(|f| f.name.is_some());
        Self {
            receiver: FieldVec::new(),
            params,
            results,
            results_named,
        }
    }

    pub fn with_receiver(mut self, receiver: Field) -> Self {
        self.receiver = smallvec::smallvec![receiver];
        self
    }

    pub fn this_tuple(&self) -> usize {
        self.receiver.len()
    }

    pub fn in_tuple(&self) -> usize {
        self.params.len()
    }

    pub fn out_tuple(&self) -> usize {
        self.results.len()
    }

    /// Receiver followed by parameters: the values a call passes in.
    pub fn args(&self) -> impl Iterator<Item = &Field> {
        self.receiver.iter().chain(&self.params)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArrayBound {
    Fixed(u64),
    /// Slice: a pointer, length and capacity descriptor.
    Dynamic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChanDir {
    Recv,
    Send,
    Both,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Basic(Kind),
    Ptr(TypeId),
    Func(FuncSig),
    Array { elem: TypeId, bound: ArrayBound },
    Struct(FieldVec),
    Chan { elem: TypeId, dir: ChanDir },
    Map { key: TypeId, value: TypeId },
    /// Methods sorted by name.
    Interface(FieldVec),
    /// Named type declared but not yet defined.
    Forward,
    Ideal,
    Nil,
    Error,
}

impl TypeKind {
    pub fn kind(&self) -> Kind {
        match self {
            TypeKind::Basic(kind) => *kind,
            TypeKind::Ptr(_) => Kind::Ptr,
            TypeKind::Func(_) => Kind::Func,
            TypeKind::Array { .. } => Kind::Array,
            TypeKind::Struct(_) => Kind::Struct,
            TypeKind::Chan { .. } => Kind::Chan,
            TypeKind::Map { .. } => Kind::Map,
            TypeKind::Interface(_) => Kind::Interface,
            TypeKind::Forward => Kind::Forward,
            TypeKind::Ideal => Kind::Ideal,
            TypeKind::Nil => Kind::Nil,
            TypeKind::Error => Kind::Error,
        }
    }
}

/// One type record. Named types carry their symbol and method set.
#[derive(Debug, Clone)]
pub struct Type {
    pub kind: TypeKind,
    pub sym: Option<SymId>,
    pub methods: FieldVec,
}

impl Type {
    fn anonymous(kind: TypeKind) -> Self {
        Self {
            kind,
            sym: None,
            methods: FieldVec::new(),
        }
    }
}
