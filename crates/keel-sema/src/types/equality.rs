// types/equality.rs
//
// Structural and named type equality over possibly cyclic type graphs.
//
// Both relations are co-inductive: a pair of types already under comparison
// is assumed equal, so self-referential and mutually recursive types
// terminate.

use rustc_hash::FxHashSet;

use crate::types::{Field, FuncSig, TypeArena, TypeId, TypeKind};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    Structural,
    Named,
}

struct Comparer<'a> {
    types: &'a TypeArena,
    mode: Mode,
    /// Pairs currently being compared, ordered by id.
    assumed: FxHashSet<(TypeId, TypeId)>,
}

impl TypeArena {
    /// Equality by constructor shape, ignoring declared names.
    pub fn structural_equal(&self, a: TypeId, b: TypeId) -> bool {
        Comparer::new(self, Mode::Structural).equal(a, b)
    }

    /// Structural equality that additionally requires the same declared
    /// name for every named, non-basic type encountered.
    pub fn named_equal(&self, a: TypeId, b: TypeId) -> bool {
        Comparer::new(self, Mode::Named).equal(a, b)
    }
}

impl<'a> Comparer<'a> {
    fn new(types: &'a TypeArena, mode: Mode) -> Self {
        Self {
            types,
            mode,
            assumed: FxHashSet::default(),
        }
    }

    fn equal(&mut self, a: TypeId, b: TypeId) -> bool {
        if a == b {
            return true;
        }
        let (ta, tb) = (self.types.get(a), self.types.get(b));
        if self.mode == Mode::Named && (ta.sym.is_some() || tb.sym.is_some()) && ta.sym != tb.sym
        {
            return false;
        }
        let key = if a < b { (a, b) } else { (b, a) };
        if !self.assumed.insert(key) {
            tracing::trace!(?a, ?b, "type comparison cycle, assuming equal");
            return true;
        }

        match (&ta.kind, &tb.kind) {
            (TypeKind::Basic(x), TypeKind::Basic(y)) => x == y,
            (TypeKind::Ptr(x), TypeKind::Ptr(y)) => self.equal(*x, *y),
            (
                TypeKind::Array {
                    elem: ea,
                    bound: ba,
                },
                TypeKind::Array {
                    elem: eb,
                    bound: bb,
                },
            ) => ba == bb && self.equal(*ea, *eb),
            (TypeKind::Chan { elem: ea, dir: da }, TypeKind::Chan { elem: eb, dir: db }) => {
                da == db && self.equal(*ea, *eb)
            }
            (
                TypeKind::Map {
                    key: ka,
                    value: va,
                },
                TypeKind::Map {
                    key: kb,
                    value: vb,
                },
            ) => self.equal(*ka, *kb) && self.equal(*va, *vb),
            (TypeKind::Struct(fa), TypeKind::Struct(fb)) => self.fields_equal(fa, fb, true),
            (TypeKind::Interface(ma), TypeKind::Interface(mb)) => {
                self.fields_equal(ma, mb, true)
            }
            (TypeKind::Func(sa), TypeKind::Func(sb)) => self.sigs_equal(sa, sb),
            (TypeKind::Ideal, TypeKind::Ideal) | (TypeKind::Nil, TypeKind::Nil) => true,
            // Distinct unresolved forwards and error types are never equal.
            _ => false,
        }
    }

    fn fields_equal(&mut self, a: &[Field], b: &[Field], names: bool) -> bool {
        a.len() == b.len()
            && a.iter().zip(b).all(|(fa, fb)| {
                (!names || fa.name == fb.name)
                    && fa.embedded == fb.embedded
                    && self.equal(fa.ty, fb.ty)
            })
    }

    fn sigs_equal(&mut self, a: &FuncSig, b: &FuncSig) -> bool {
        self.fields_equal(&a.receiver, &b.receiver, false)
            && self.fields_equal(&a.params, &b.params, false)
            && self.fields_equal(&a.results, &b.results, false)
    }
}
