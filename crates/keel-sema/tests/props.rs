//! Property tests: scope reversibility, type equality as an equivalence
//! relation, layout determinism and bit-set algebra.

use keel_identity::Pos;
use keel_sema::bits::{Bits, NVAR};
use keel_sema::symbols::{Binding, DeclContext, SymId};
use keel_sema::types::{ArrayBound, Field, FieldVec, Kind};
use keel_sema::{Compilation, CompilationBuilder, TypeId, TypeKind};
use proptest::prelude::*;
use smallvec::smallvec;

const NAMES: [&str; 4] = ["a", "b", "c", "d"];

fn bindings(c: &Compilation, syms: &[SymId]) -> Vec<Binding> {
    syms.iter().map(|&s| c.symbols.get(s).binding()).collect()
}

/// Shape of a type expression; `SelfPtr` points at the enclosing named type.
#[derive(Debug, Clone)]
enum Shape {
    Basic(usize),
    SelfPtr,
    Ptr(Box<Shape>),
    Slice(Box<Shape>),
    Array(u8, Box<Shape>),
    Map(Box<Shape>, Box<Shape>),
    Struct(Vec<(u8, Shape)>),
}

fn shape() -> impl Strategy<Value = Shape> {
    let leaf = prop_oneof![
        (0..Kind::BASIC.len()).prop_map(Shape::Basic),
        Just(Shape::SelfPtr),
    ];
    leaf.prop_recursive(3, 16, 3, |inner| {
        prop_oneof![
            inner.clone().prop_map(|s| Shape::Ptr(Box::new(s))),
            inner.clone().prop_map(|s| Shape::Slice(Box::new(s))),
            (0u8..4, inner.clone()).prop_map(|(n, s)| Shape::Array(n, Box::new(s))),
            (inner.clone(), inner.clone()).prop_map(|(k, v)| Shape::Map(Box::new(k), Box::new(v))),
            prop::collection::vec((0u8..3, inner), 0..3).prop_map(Shape::Struct),
        ]
    })
}

fn build(c: &mut Compilation, shape: &Shape, this: TypeId) -> TypeId {
    match shape {
        Shape::Basic(i) => TypeId::basic(Kind::BASIC[*i]).unwrap(),
        Shape::SelfPtr => c.types.make_pointer_to(this),
        Shape::Ptr(s) => {
            let elem = build(c, s, this);
            c.types.make_pointer_to(elem)
        }
        Shape::Slice(s) => {
            let elem = build(c, s, this);
            c.types.make_array(ArrayBound::Dynamic, elem)
        }
        Shape::Array(n, s) => {
            let elem = build(c, s, this);
            c.types.make_array(ArrayBound::Fixed(u64::from(*n)), elem)
        }
        Shape::Map(k, v) => {
            let key = build(c, k, this);
            let value = build(c, v, this);
            c.types.make_map(key, value)
        }
        Shape::Struct(fields) => {
            let fields: FieldVec = fields
                .iter()
                .map(|(n, s)| {
                    let name = c.symbols.lookup(&format!("f{n}"));
                    Field::named(name, build(c, s, this))
                })
                .collect();
            c.types.make_struct(fields)
        }
    }
}

/// `type <name> struct { f <shape> }`
fn declare(c: &mut Compilation, name: &str, shape: &Shape) -> TypeId {
    let sym = c.symbols.lookup(name);
    let t = c.declare_type(sym, None, Pos::new(1));
    let def = build(c, shape, t);
    let f = c.symbols.lookup("f");
    c.update_forward(t, TypeKind::Struct(smallvec![Field::named(f, def)]), Pos::new(1));
    t
}

/// Three named types drawn from two shapes, so equal pairs are common.
fn three_types(c: &mut Compilation, shapes: &[Shape; 2], picks: [usize; 3]) -> [TypeId; 3] {
    [
        declare(c, "T0", &shapes[picks[0]]),
        declare(c, "T1", &shapes[picks[1]]),
        declare(c, "T2", &shapes[picks[2]]),
    ]
}

fn bits() -> impl Strategy<Value = Bits> {
    prop::collection::vec(0..NVAR, 0..24).prop_map(|v| v.into_iter().collect())
}

proptest! {
    #[test]
    fn scopes_restore_bindings(
        outer in prop::collection::vec(0usize..NAMES.len(), 0..3),
        frames in prop::collection::vec(prop::collection::vec(0usize..NAMES.len(), 0..5), 0..5),
    ) {
        let mut c = CompilationBuilder::new().error_limit(0).build();
        let syms: Vec<SymId> = NAMES.iter().map(|n| c.symbols.lookup(n)).collect();
        for &i in &outer {
            c.declare_var(syms[i], TypeId::INT, DeclContext::Extern, Pos::new(1));
        }

        let mut open = Vec::new();
        for frame in &frames {
            let before = bindings(&c, &syms);
            open.push((c.open_scope(), before));
            for &i in frame {
                c.declare_var(syms[i], TypeId::BOOL, DeclContext::Auto, Pos::new(2));
            }
        }
        while let Some((scope, before)) = open.pop() {
            c.close_scope(scope);
            prop_assert_eq!(bindings(&c, &syms), before);
        }
    }

    #[test]
    fn structural_equality_is_an_equivalence(
        shapes in [shape(), shape()],
        picks in [0usize..2, 0usize..2, 0usize..2],
    ) {
        let mut c = CompilationBuilder::new().build();
        let [a, b, t] = three_types(&mut c, &shapes, picks);
        let types = &c.types;
        for x in [a, b, t] {
            prop_assert!(types.structural_equal(x, x));
            prop_assert!(types.named_equal(x, x));
        }
        for (x, y) in [(a, b), (b, t), (a, t)] {
            prop_assert_eq!(types.structural_equal(x, y), types.structural_equal(y, x));
            prop_assert!(!types.named_equal(x, y) || types.structural_equal(x, y));
        }
        if types.structural_equal(a, b) && types.structural_equal(b, t) {
            prop_assert!(types.structural_equal(a, t));
        }
        if picks[0] == picks[1] {
            prop_assert!(types.structural_equal(a, b));
        }
    }

    #[test]
    fn layout_is_memoized_and_aligned(shape in shape()) {
        let mut c = CompilationBuilder::new().build();
        let t = declare(&mut c, "T", &shape);
        prop_assert!(c.succeeded());

        let first = c.types.width_and_alignment(t).unwrap();
        let second = c.types.width_and_alignment(t).unwrap();
        prop_assert_eq!(first, second);
        prop_assert_eq!(c.types.cached_layout(t), Some(first));
        prop_assert_eq!(first.width % first.align, 0);

        let fields: Vec<TypeId> = c.types.fields(t).iter().map(|f| f.ty).collect();
        let mut sum = 0;
        for ty in fields {
            sum += c.types.width_and_alignment(ty).unwrap().width;
        }
        prop_assert!(first.width >= sum);
    }

    #[test]
    fn complement_is_an_involution(s in bits()) {
        prop_assert_eq!(s.complement().complement(), s);
        prop_assert_eq!(s.complement().count_set(), NVAR as u32 - s.count_set());
    }

    #[test]
    fn union_count_is_subadditive(a in bits(), b in bits()) {
        prop_assert!(a.union(b).count_set() <= a.count_set() + b.count_set());
        prop_assert_eq!(a.intersect(b), b.intersect(a));
        prop_assert_eq!(a.union(b).any_set(), a.any_set() || b.any_set());
    }

    #[test]
    fn single_bit_mask_has_one_member(i in 0..NVAR) {
        let mask = Bits::single_bit_mask(i);
        for j in 0..NVAR {
            prop_assert_eq!(mask.is_member(j), i == j);
        }
        prop_assert_eq!(mask.first_set(), Some(i));
    }
}
