//! Constant folding.
//!
//! Folds an operator node whose operands are literals into a single literal
//! node, in place, so parents keep their links. Arithmetic is exact; a result
//! beyond the arithmetic capacity or the range of its type is an error, never
//! a wrapped value.

use std::cmp::Ordering;

use keel_mparith::{MP_BITS, MpError, MpFlt, MpInt};

use crate::Compilation;
use crate::ast::{Addable, NodeId, Op};
use crate::constant::Val;
use crate::errors::{FatalError, SemanticError};
use crate::types::{Kind, TypeId};

enum FoldError {
    Report(SemanticError),
    /// An operand was already diagnosed; fail without a new report.
    Silent,
}

impl From<SemanticError> for FoldError {
    fn from(err: SemanticError) -> Self {
        FoldError::Report(err)
    }
}

type FoldResult = Result<(Val, TypeId), FoldError>;

fn compare(op: Op, ord: Ordering) -> bool {
    match op {
        Op::Eq => ord.is_eq(),
        Op::Ne => ord.is_ne(),
        Op::Lt => ord.is_lt(),
        Op::Le => ord.is_le(),
        Op::Gt => ord.is_gt(),
        Op::Ge => ord.is_ge(),
        _ => unreachable!("{op:?} is not a comparison"),
    }
}

fn div_error(err: MpError) -> SemanticError {
    match err {
        MpError::DivisionByZero => SemanticError::DivisionByZero,
        _ => SemanticError::ConstantOverflow,
    }
}

/// Kind governing which operators apply: the operand type's kind, or for
/// untyped constants the kind their value has.
fn value_kind(val: &Val) -> Kind {
    match val {
        Val::Int(_) => Kind::Int,
        Val::Float(_) => Kind::Float,
        Val::Str(_) => Kind::String,
        Val::Bool(_) => Kind::Bool,
        Val::Nil | Val::Reg(_) => Kind::Nil,
    }
}

fn op_allowed(op: Op, kind: Kind) -> bool {
    match op {
        Op::Eq | Op::Ne => kind.ok_for_eq(),
        Op::Lt | Op::Le | Op::Gt | Op::Ge => kind.ok_for_order(),
        Op::Add | Op::Plus => kind.ok_for_add(),
        Op::Sub | Op::Mul | Op::Div | Op::Minus => kind.ok_for_arith(),
        Op::Mod | Op::And | Op::Or | Op::Xor | Op::AndNot | Op::Com | Op::Lsh | Op::Rsh => {
            kind.ok_for_and()
        }
        Op::OrOr | Op::AndAnd | Op::Not => kind == Kind::Bool,
        _ => false,
    }
}

impl Compilation {
    fn literal_val(&self, n: NodeId) -> (Val, TypeId) {
        let node = self.nodes.get(n);
        (
            node.val.unwrap_or(Val::Nil),
            node.ty.unwrap_or(TypeId::IDEAL),
        )
    }

    fn operator_kind(&self, val: &Val, ty: TypeId) -> Kind {
        if ty == TypeId::IDEAL {
            value_kind(val)
        } else {
            self.types.etype(ty)
        }
    }

    fn invalid_op(&self, op: Op, val: &Val, ty: TypeId) -> SemanticError {
        let ty = if ty == TypeId::IDEAL {
            format!("untyped {}", val.kind_name())
        } else {
            self.display_type(ty)
        };
        SemanticError::InvalidOperation {
            op: op.symbol().to_string(),
            ty,
        }
    }

    /// Fold `n` into a literal if it is a foldable operator over literal
    /// operands. Returns whether the node was rewritten.
    ///
    /// Errors are reported once against the offending node. An operator
    /// over an already-diagnosed operand is marked diagnosed without a new
    /// report.
    pub fn fold(&mut self, n: NodeId) -> bool {
        let node = self.nodes.get(n);
        if node.diag {
            return false;
        }
        if node.is_literal() {
            if node.val.is_some_and(|v| v.overflowed()) {
                self.diagnose(n, SemanticError::ConstantOverflow);
            }
            return false;
        }
        let op = node.op;
        if !op.is_foldable() {
            return false;
        }
        let Some(left) = node.left else {
            return false;
        };
        let right = if op.is_unary_arith() {
            None
        } else {
            match node.right {
                Some(r) => Some(r),
                None => return false,
            }
        };

        for operand in std::iter::once(left).chain(right) {
            let o = self.nodes.get(operand);
            if o.diag {
                let node = self.nodes.get_mut(n);
                node.diag = true;
                node.ty = Some(TypeId::ERROR);
                return false;
            }
            if !o.is_literal() {
                return false;
            }
        }
        for operand in std::iter::once(left).chain(right) {
            if self.nodes.get(operand).val.is_some_and(|v| v.overflowed()) {
                self.diagnose(operand, SemanticError::ConstantOverflow);
                self.nodes.get_mut(n).diag = true;
                return false;
            }
        }

        let result = match right {
            Some(right) if op.is_shift() => self.fold_shift(op, left, right),
            Some(right) => self.fold_binary(op, left, right),
            None => self.fold_unary(op, left),
        };
        let (val, ty) = match result.and_then(|(val, ty)| self.check_result(val, ty)) {
            Ok(folded) => folded,
            Err(FoldError::Report(error)) => {
                self.diagnose(n, error);
                return false;
            }
            Err(FoldError::Silent) => {
                let node = self.nodes.get_mut(n);
                node.diag = true;
                node.ty = Some(TypeId::ERROR);
                return false;
            }
        };

        tracing::trace!(%op, value = %self.value_string(&val), "folded constant");
        let node = self.nodes.get_mut(n);
        node.op = Op::Literal;
        node.left = None;
        node.right = None;
        node.val = Some(val);
        node.ty = Some(ty);
        node.ullman = 1;
        node.addable = Addable::Direct;
        true
    }

    /// Fold every foldable node under `root`, children first.
    pub fn fold_tree(&mut self, root: NodeId) -> Result<(), FatalError> {
        let children: Vec<NodeId> = self.nodes.children(root).collect();
        for child in children {
            self.fold_tree(child)?;
        }
        self.fold(root);
        self.check_limit()
    }

    /// Reject overflowed results and results outside their type's range.
    fn check_result(&self, val: Val, ty: TypeId) -> FoldResult {
        if val.overflowed() {
            return Err(SemanticError::ConstantOverflow.into());
        }
        let kind = self.types.etype(ty);
        let fits = match &val {
            Val::Int(v) if kind.is_int() => self.int_fits(v, kind),
            Val::Float(v) if kind.is_float() => self.float_fits(v, kind),
            _ => true,
        };
        if !fits {
            return Err(SemanticError::ConstantOverflowsType {
                value: self.value_string(&val),
                ty: self.display_type(ty),
            }
            .into());
        }
        Ok((val, ty))
    }

    /// Give both operands one type. An untyped operand takes the type of a
    /// typed one; two typed operands must agree.
    fn unify_operands(&mut self, op: Op, left: NodeId, right: NodeId) -> Result<TypeId, FoldError> {
        let lt = self.nodes.get(left).ty.unwrap_or(TypeId::IDEAL);
        let rt = self.nodes.get(right).ty.unwrap_or(TypeId::IDEAL);
        let (target, convert) = match (lt == TypeId::IDEAL, rt == TypeId::IDEAL) {
            (true, true) => return Ok(TypeId::IDEAL),
            (true, false) => (rt, Some(left)),
            (false, true) => (lt, Some(right)),
            (false, false) => (lt, None),
        };
        match convert {
            Some(operand) => {
                self.convert_literal(operand, target);
                if self.nodes.get(operand).diag {
                    return Err(FoldError::Silent);
                }
            }
            None if lt != rt && !self.types.named_equal(lt, rt) => {
                return Err(SemanticError::MismatchedTypes {
                    op: op.symbol().to_string(),
                    left: self.display_type(lt),
                    right: self.display_type(rt),
                }
                .into());
            }
            None => {}
        }
        Ok(target)
    }

    fn fold_binary(&mut self, op: Op, left: NodeId, right: NodeId) -> FoldResult {
        let ty = self.unify_operands(op, left, right)?;
        let (mut a, _) = self.literal_val(left);
        let (mut b, _) = self.literal_val(right);

        // Untyped int against untyped float: compute in float.
        match (a, b) {
            (Val::Int(i), Val::Float(_)) => a = Val::Float(self.promote(&i)?),
            (Val::Float(_), Val::Int(i)) => b = Val::Float(self.promote(&i)?),
            _ => {}
        }
        if std::mem::discriminant(&a) != std::mem::discriminant(&b) {
            return Err(SemanticError::MismatchedTypes {
                op: op.symbol().to_string(),
                left: a.kind_name().to_string(),
                right: b.kind_name().to_string(),
            }
            .into());
        }
        if !op_allowed(op, self.operator_kind(&a, ty)) {
            return Err(self.invalid_op(op, &a, ty).into());
        }

        let result_ty = if op.is_comparison() { TypeId::BOOL } else { ty };
        let val = match (a, b) {
            (Val::Int(x), Val::Int(y)) => match op {
                Op::Add => Val::Int(x + y),
                Op::Sub => Val::Int(x - y),
                Op::Mul => Val::Int(x * y),
                Op::Div => Val::Int(x.checked_div(y).map_err(div_error)?),
                Op::Mod => Val::Int(x.checked_rem(y).map_err(div_error)?),
                Op::And => Val::Int(x & y),
                Op::Or => Val::Int(x | y),
                Op::Xor => Val::Int(x ^ y),
                Op::AndNot => Val::Int(x.and_not(y)),
                _ if op.is_comparison() => Val::Bool(compare(op, x.compare(&y))),
                _ => return Err(self.invalid_op(op, &a, ty).into()),
            },
            (Val::Float(x), Val::Float(y)) => match op {
                Op::Add => Val::Float(x + y),
                Op::Sub => Val::Float(x - y),
                Op::Mul => Val::Float(x * y),
                Op::Div => Val::Float(x.checked_div(y).map_err(div_error)?),
                _ if op.is_comparison() => Val::Bool(compare(op, x.compare(&y))),
                _ => return Err(self.invalid_op(op, &a, ty).into()),
            },
            (Val::Str(x), Val::Str(y)) => match op {
                Op::Add => Val::Str(self.strings.concat(x, y)),
                _ if op.is_comparison() => {
                    Val::Bool(compare(op, self.strings.get(x).cmp(self.strings.get(y))))
                }
                _ => return Err(self.invalid_op(op, &a, ty).into()),
            },
            (Val::Bool(x), Val::Bool(y)) => match op {
                Op::OrOr => Val::Bool(x || y),
                Op::AndAnd => Val::Bool(x && y),
                Op::Eq => Val::Bool(x == y),
                Op::Ne => Val::Bool(x != y),
                _ => return Err(self.invalid_op(op, &a, ty).into()),
            },
            _ => return Err(self.invalid_op(op, &a, ty).into()),
        };
        Ok((val, result_ty))
    }

    fn promote(&self, i: &MpInt) -> Result<MpFlt, FoldError> {
        MpFlt::from_int(i).map_err(|_| {
            SemanticError::InexactConstant {
                value: i.to_string(),
            }
            .into()
        })
    }

    fn fold_shift(&mut self, op: Op, left: NodeId, right: NodeId) -> FoldResult {
        let (a, lt) = self.literal_val(left);
        let (b, rt) = self.literal_val(right);

        let count = match b {
            Val::Int(c) if rt == TypeId::IDEAL || self.types.etype(rt).is_int() => c,
            Val::Float(f) if rt == TypeId::IDEAL => f.to_int().map_err(|_| {
                SemanticError::InvalidShift {
                    count: f.to_string(),
                }
            })?,
            _ => return Err(self.invalid_op(op, &b, rt).into()),
        };
        let bits = count
            .to_u64()
            .filter(|&c| c <= MP_BITS as u64)
            .ok_or_else(|| SemanticError::InvalidShift {
                count: count.to_string(),
            })? as u32;

        let value = match a {
            Val::Int(v) if lt == TypeId::IDEAL || self.types.etype(lt).is_int() => v,
            Val::Float(f) if lt == TypeId::IDEAL => match f.to_int() {
                Ok(v) => v,
                Err(_) => return Err(self.invalid_op(op, &a, lt).into()),
            },
            _ => return Err(self.invalid_op(op, &a, lt).into()),
        };
        let shifted = match op {
            Op::Lsh => value << bits,
            _ => value >> bits,
        };
        Ok((Val::Int(shifted), lt))
    }

    fn fold_unary(&mut self, op: Op, operand: NodeId) -> FoldResult {
        let (a, ty) = self.literal_val(operand);
        let kind = self.operator_kind(&a, ty);
        if !op_allowed(op, kind) {
            return Err(self.invalid_op(op, &a, ty).into());
        }
        let val = match (op, a) {
            (Op::Plus, Val::Int(_) | Val::Float(_)) => a,
            (Op::Minus, Val::Int(v)) => Val::Int(-v),
            (Op::Minus, Val::Float(v)) => Val::Float(-v),
            (Op::Com, Val::Int(v)) => match kind.int_limits(self.target()) {
                // Complement within the width of an unsigned type.
                Some((_, max)) if kind.is_unsigned() => Val::Int(v ^ max),
                _ => Val::Int(!v),
            },
            (Op::Not, Val::Bool(b)) => Val::Bool(!b),
            _ => return Err(self.invalid_op(op, &a, ty).into()),
        };
        Ok((val, ty))
    }
}

#[cfg(test)]
mod tests {
    use keel_identity::Pos;
    use keel_mparith::MpInt;
    use pretty_assertions::assert_eq;

    use crate::ast::{NodeId, Op};
    use crate::constant::{LiteralText, Val};
    use crate::errors::SemanticError;
    use crate::types::TypeId;
    use crate::{Compilation, CompilationBuilder};

    fn int(c: &mut Compilation, v: i64) -> NodeId {
        c.nodes.int_const(v, Pos::new(1))
    }

    fn binary(c: &mut Compilation, op: Op, l: NodeId, r: NodeId) -> NodeId {
        c.nodes.make_node(op, Some(l), Some(r), Pos::new(1))
    }

    fn typed(c: &mut Compilation, v: i64, ty: TypeId) -> NodeId {
        let n = int(c, v);
        c.convert_literal(n, ty);
        n
    }

    fn int_result(c: &Compilation, n: NodeId) -> Option<i64> {
        c.nodes.get(n).int_val().and_then(MpInt::to_i64)
    }

    #[test]
    fn integer_arithmetic() {
        let mut c = CompilationBuilder::new().build();
        let cases = [
            (Op::Add, 7, 3, 10),
            (Op::Sub, 7, 10, -3),
            (Op::Mul, -7, 3, -21),
            (Op::Div, -7, 2, -3),
            (Op::Mod, -7, 2, -1),
            (Op::And, 12, 10, 8),
            (Op::Or, 12, 10, 14),
            (Op::Xor, 12, 10, 6),
            (Op::AndNot, 12, 10, 4),
        ];
        for (op, a, b, expected) in cases {
            let (l, r) = (int(&mut c, a), int(&mut c, b));
            let n = binary(&mut c, op, l, r);
            assert!(c.fold(n), "{op:?}");
            assert_eq!(int_result(&c, n), Some(expected), "{op:?}");
            assert_eq!(c.nodes.get(n).ty, Some(TypeId::IDEAL));
        }
        assert!(c.succeeded());
    }

    #[test]
    fn comparisons_produce_bool() {
        let mut c = CompilationBuilder::new().build();
        let (l, r) = (int(&mut c, 2), int(&mut c, 3));
        let n = binary(&mut c, Op::Lt, l, r);
        assert!(c.fold(n));
        assert_eq!(c.nodes.get(n).val, Some(Val::Bool(true)));
        assert_eq!(c.nodes.get(n).ty, Some(TypeId::BOOL));

        let a = c.literal(LiteralText::Str(b"abc"), Pos::new(1));
        let b = c.literal(LiteralText::Str(b"abd"), Pos::new(1));
        let n = binary(&mut c, Op::Ge, a, b);
        assert!(c.fold(n));
        assert_eq!(c.nodes.get(n).val, Some(Val::Bool(false)));
    }

    #[test]
    fn division_by_zero() {
        let mut c = CompilationBuilder::new().build();
        let (l, r) = (int(&mut c, 1), int(&mut c, 0));
        let n = binary(&mut c, Op::Div, l, r);
        assert!(!c.fold(n));
        assert_eq!(c.errors()[0].error, SemanticError::DivisionByZero);
        assert!(c.nodes.get(n).diag);
        assert!(!c.fold(n));
        assert_eq!(c.error_count(), 1);
    }

    #[test]
    fn mixed_int_and_float() {
        let mut c = CompilationBuilder::new().build();
        let i = int(&mut c, 1);
        let f = c.literal(LiteralText::Float("0.5"), Pos::new(1));
        let n = binary(&mut c, Op::Add, i, f);
        assert!(c.fold(n));
        let Some(Val::Float(v)) = c.nodes.get(n).val else {
            panic!("expected a float");
        };
        assert_eq!(v.to_f64(), 1.5);

        let f = c.literal(LiteralText::Float("1.0"), Pos::new(1));
        let i = int(&mut c, 1);
        let n = binary(&mut c, Op::Eq, f, i);
        assert!(c.fold(n));
        assert_eq!(c.nodes.get(n).val, Some(Val::Bool(true)));
    }

    #[test]
    fn untyped_adopts_typed_operand() {
        let mut c = CompilationBuilder::new().build();
        let t = typed(&mut c, 200, TypeId::UINT8);
        let u = int(&mut c, 55);
        let n = binary(&mut c, Op::Add, t, u);
        assert!(c.fold(n));
        assert_eq!(c.nodes.get(n).ty, Some(TypeId::UINT8));
        assert_eq!(int_result(&c, n), Some(255));

        let t = typed(&mut c, 200, TypeId::UINT8);
        let u = int(&mut c, 56);
        let n = binary(&mut c, Op::Add, t, u);
        assert!(!c.fold(n));
        assert_eq!(
            c.errors()[0].error,
            SemanticError::ConstantOverflowsType {
                value: "256".into(),
                ty: "uint8".into()
            }
        );
    }

    #[test]
    fn mismatched_typed_operands() {
        let mut c = CompilationBuilder::new().build();
        let a = typed(&mut c, 1, TypeId::INT);
        let b = typed(&mut c, 1, TypeId::INT64);
        let n = binary(&mut c, Op::Add, a, b);
        assert!(!c.fold(n));
        assert_eq!(
            c.errors()[0].error,
            SemanticError::MismatchedTypes {
                op: "+".into(),
                left: "int".into(),
                right: "int64".into()
            }
        );
    }

    #[test]
    fn unary_operators() {
        let mut c = CompilationBuilder::new().build();
        let five = int(&mut c, 5);
        let neg = c.nodes.make_node(Op::Minus, Some(five), None, Pos::new(1));
        assert!(c.fold(neg));
        assert_eq!(int_result(&c, neg), Some(-5));

        let zero = typed(&mut c, 0, TypeId::UINT8);
        let com = c.nodes.make_node(Op::Com, Some(zero), None, Pos::new(1));
        assert!(c.fold(com));
        assert_eq!(int_result(&c, com), Some(255));

        let zero = int(&mut c, 0);
        let com = c.nodes.make_node(Op::Com, Some(zero), None, Pos::new(1));
        assert!(c.fold(com));
        assert_eq!(int_result(&c, com), Some(-1));

        let t = c.nodes.bool_const(true, Pos::new(1));
        let not = c.nodes.make_node(Op::Not, Some(t), None, Pos::new(1));
        assert!(c.fold(not));
        assert_eq!(c.nodes.get(not).val, Some(Val::Bool(false)));

        let s = c.literal(LiteralText::Str(b"x"), Pos::new(1));
        let bad = c.nodes.make_node(Op::Minus, Some(s), None, Pos::new(1));
        assert!(!c.fold(bad));
        assert!(matches!(
            c.errors()[0].error,
            SemanticError::InvalidOperation { .. }
        ));
    }

    #[test]
    fn shifts() {
        let mut c = CompilationBuilder::new().build();
        let (l, r) = (int(&mut c, 1), int(&mut c, 100));
        let n = binary(&mut c, Op::Lsh, l, r);
        assert!(c.fold(n));
        assert_eq!(c.nodes.get(n).int_val(), Some(&MpInt::pow2(100)));

        let (l, r) = (int(&mut c, -9), int(&mut c, 1));
        let n = binary(&mut c, Op::Rsh, l, r);
        assert!(c.fold(n));
        assert_eq!(int_result(&c, n), Some(-5));

        let (l, r) = (int(&mut c, 1), int(&mut c, -1));
        let n = binary(&mut c, Op::Lsh, l, r);
        assert!(!c.fold(n));
        assert_eq!(
            c.errors()[0].error,
            SemanticError::InvalidShift { count: "-1".into() }
        );

        let (l, r) = (int(&mut c, 1), int(&mut c, 464));
        let n = binary(&mut c, Op::Lsh, l, r);
        assert!(!c.fold(n));
        assert_eq!(c.errors()[1].error, SemanticError::ConstantOverflow);
    }

    #[test]
    fn string_concatenation() {
        let mut c = CompilationBuilder::new().build();
        let a = c.literal(LiteralText::Str(b"foo"), Pos::new(1));
        let b = c.literal(LiteralText::Str(b"bar"), Pos::new(1));
        let n = binary(&mut c, Op::Add, a, b);
        assert!(c.fold(n));
        let Some(Val::Str(s)) = c.nodes.get(n).val else {
            panic!("expected a string");
        };
        assert_eq!(c.strings.get(s), b"foobar");
    }

    #[test]
    fn float_mod_is_invalid() {
        let mut c = CompilationBuilder::new().build();
        let a = c.literal(LiteralText::Float("1.5"), Pos::new(1));
        let b = c.literal(LiteralText::Float("0.5"), Pos::new(1));
        let n = binary(&mut c, Op::Mod, a, b);
        assert!(!c.fold(n));
        assert_eq!(
            c.errors()[0].error,
            SemanticError::InvalidOperation {
                op: "%".into(),
                ty: "untyped float".into()
            }
        );
    }

    #[test]
    fn fold_tree_nested() {
        let mut c = CompilationBuilder::new().build();
        // (1 + 2) * (10 - 4)
        let (a, b) = (int(&mut c, 1), int(&mut c, 2));
        let sum = binary(&mut c, Op::Add, a, b);
        let (x, y) = (int(&mut c, 10), int(&mut c, 4));
        let diff = binary(&mut c, Op::Sub, x, y);
        let product = binary(&mut c, Op::Mul, sum, diff);
        assert_eq!(c.fold_tree(product), Ok(()));
        assert_eq!(int_result(&c, product), Some(18));
        assert!(c.nodes.get(product).is_literal());
    }

    #[test]
    fn diagnosed_operand_propagates_silently() {
        let mut c = CompilationBuilder::new().build();
        let (a, b) = (int(&mut c, 1), int(&mut c, 0));
        let div = binary(&mut c, Op::Div, a, b);
        let one = int(&mut c, 1);
        let outer = binary(&mut c, Op::Add, div, one);
        assert_eq!(c.fold_tree(outer), Ok(()));
        assert_eq!(c.error_count(), 1);
        assert!(c.nodes.get(outer).diag);
        assert_eq!(c.nodes.get(outer).ty, Some(TypeId::ERROR));
    }
}
