// types/arena.rs
//
// Per-compilation type storage with interning of anonymous composites.

use rustc_hash::FxHashMap;

use crate::arena::Arena;
use crate::config::Target;
use crate::symbols::SymId;
use crate::types::layout::Layout;
use crate::types::{
    ArrayBound, ChanDir, Field, FieldVec, FuncSig, Kind, Type, TypeId, TypeKind,
};

pub struct TypeArena {
    types: Arena<TypeId, Type>,
    /// Deduplication map for anonymous types.
    intern_map: FxHashMap<TypeKind, TypeId>,
    /// Memoized widths.
    pub(super) layouts: FxHashMap<TypeId, Layout>,
    pub(super) target: Target,
}

impl std::fmt::Debug for TypeArena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeArena")
            .field("types_count", &self.types.len())
            .finish_non_exhaustive()
    }
}

impl Default for TypeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeArena {
    pub fn new() -> Self {
        Self::with_target(Target::default())
    }

    /// Create an arena with the reserved types pre-interned.
    pub fn with_target(target: Target) -> Self {
        let mut arena = Self {
            types: Arena::with_capacity(64),
            intern_map: FxHashMap::default(),
            layouts: FxHashMap::default(),
            target,
        };
        arena.types.alloc(Type::anonymous(TypeKind::Error));
        for kind in Kind::BASIC {
            arena.intern(TypeKind::Basic(kind));
        }
        arena.intern(TypeKind::Ideal);
        arena.intern(TypeKind::Nil);
        debug_assert_eq!(arena.types.len() as u32, TypeId::FIRST_DYNAMIC);
        arena
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    fn intern(&mut self, kind: TypeKind) -> TypeId {
        if let Some(&id) = self.intern_map.get(&kind) {
            return id;
        }
        let id = self.types.alloc(Type::anonymous(kind.clone()));
        tracing::trace!(?id, kind = %kind.kind(), "interned type");
        self.intern_map.insert(kind, id);
        id
    }

    pub fn get(&self, id: TypeId) -> &Type {
        &self.types[id]
    }

    pub fn kind(&self, id: TypeId) -> &TypeKind {
        &self.types[id].kind
    }

    /// Constructor kind of a type.
    pub fn etype(&self, id: TypeId) -> Kind {
        self.types[id].kind.kind()
    }

    pub fn sym(&self, id: TypeId) -> Option<SymId> {
        self.types[id].sym
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    // ========================================================================
    // Composite constructors
    // ========================================================================

    pub fn make_pointer_to(&mut self, elem: TypeId) -> TypeId {
        self.intern(TypeKind::Ptr(elem))
    }

    pub fn make_map(&mut self, key: TypeId, value: TypeId) -> TypeId {
        self.intern(TypeKind::Map { key, value })
    }

    pub fn make_array(&mut self, bound: ArrayBound, elem: TypeId) -> TypeId {
        self.intern(TypeKind::Array { elem, bound })
    }

    pub fn make_slice(&mut self, elem: TypeId) -> TypeId {
        self.make_array(ArrayBound::Dynamic, elem)
    }

    pub fn make_chan(&mut self, elem: TypeId, dir: ChanDir) -> TypeId {
        self.intern(TypeKind::Chan { elem, dir })
    }

    pub fn make_func(&mut self, sig: FuncSig) -> TypeId {
        self.intern(TypeKind::Func(sig))
    }

    pub fn make_struct(&mut self, fields: FieldVec) -> TypeId {
        self.intern(TypeKind::Struct(fields))
    }

    /// Interface type. Callers pass methods already sorted by name.
    pub fn make_interface(&mut self, methods: FieldVec) -> TypeId {
        self.intern(TypeKind::Interface(methods))
    }

    // ========================================================================
    // Named types
    // ========================================================================

    /// A fresh named type. Never deduplicated: two declarations with the
    /// same shape are distinct types.
    pub fn new_named(&mut self, sym: SymId, kind: TypeKind) -> TypeId {
        let id = self.types.alloc(Type {
            kind,
            sym: Some(sym),
            methods: FieldVec::new(),
        });
        tracing::trace!(?id, ?sym, "new named type");
        id
    }

    /// A named type whose definition comes later.
    pub fn new_forward(&mut self, sym: SymId) -> TypeId {
        self.new_named(sym, TypeKind::Forward)
    }

    pub fn is_forward(&self, id: TypeId) -> bool {
        matches!(self.types[id].kind, TypeKind::Forward)
    }

    /// Complete a forward type in place so earlier references see the
    /// definition.
    ///
    /// # Panics
    /// If `fwd` is already defined.
    pub fn update_forward(&mut self, fwd: TypeId, kind: TypeKind) {
        assert!(self.is_forward(fwd), "update_forward on defined type {fwd:?}");
        tracing::trace!(?fwd, kind = %kind.kind(), "completed forward type");
        self.types[fwd].kind = kind;
    }

    pub fn add_method(&mut self, named: TypeId, method: Field) {
        self.types[named].methods.push(method);
    }

    pub fn methods(&self, id: TypeId) -> &[Field] {
        &self.types[id].methods
    }

    pub fn find_method(&self, id: TypeId, name: SymId) -> Option<&Field> {
        self.types[id].methods.iter().find(|m| m.name == Some(name))
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Struct fields or interface methods, in declaration order.
    pub fn fields(&self, id: TypeId) -> &[Field] {
        match &self.types[id].kind {
            TypeKind::Struct(fields) | TypeKind::Interface(fields) => fields,
            _ => &[],
        }
    }

    pub fn func_sig(&self, id: TypeId) -> Option<&FuncSig> {
        match &self.types[id].kind {
            TypeKind::Func(sig) => Some(sig),
            _ => None,
        }
    }

    /// Element type of pointers, arrays and channels; value type of maps.
    pub fn elem(&self, id: TypeId) -> Option<TypeId> {
        match self.types[id].kind {
            TypeKind::Ptr(elem)
            | TypeKind::Array { elem, .. }
            | TypeKind::Chan { elem, .. }
            | TypeKind::Map { value: elem, .. } => Some(elem),
            _ => None,
        }
    }

    pub fn is_ptr(&self, id: TypeId) -> bool {
        matches!(self.types[id].kind, TypeKind::Ptr(_))
    }

    pub fn is_slice(&self, id: TypeId) -> bool {
        matches!(
            self.types[id].kind,
            TypeKind::Array {
                bound: ArrayBound::Dynamic,
                ..
            }
        )
    }

    pub fn is_fixed_array(&self, id: TypeId) -> bool {
        matches!(
            self.types[id].kind,
            TypeKind::Array {
                bound: ArrayBound::Fixed(_),
                ..
            }
        )
    }

    pub fn is_interface(&self, id: TypeId) -> bool {
        matches!(self.types[id].kind, TypeKind::Interface(_))
    }

    /// The empty interface.
    pub fn is_nil_interface(&self, id: TypeId) -> bool {
        matches!(&self.types[id].kind, TypeKind::Interface(m) if m.is_empty())
    }

    /// Types whose values `nil` can stand for.
    pub fn accepts_nil(&self, id: TypeId) -> bool {
        match self.types[id].kind {
            TypeKind::Ptr(_)
            | TypeKind::Func(_)
            | TypeKind::Chan { .. }
            | TypeKind::Map { .. }
            | TypeKind::Interface(_) => true,
            TypeKind::Array { bound, .. } => bound == ArrayBound::Dynamic,
            _ => false,
        }
    }

    /// Composite literal types: arrays, structs and maps.
    pub fn is_composite(&self, id: TypeId) -> bool {
        matches!(
            self.types[id].kind,
            TypeKind::Array { .. } | TypeKind::Struct(_) | TypeKind::Map { .. }
        )
    }
}
