//! Literal construction and conversion of constants to concrete types.
//!
//! Untyped (ideal) constants keep their exact value until they are converted
//! to a concrete type, either explicitly with [`Compilation::convert_literal`]
//! or by defaulting with [`Compilation::default_literal`]. Conversion
//! re-checks the value against the range of the target type.

use keel_identity::Pos;
use keel_mparith::{MpError, MpFlt, MpInt};

use crate::Compilation;
use crate::ast::NodeId;
use crate::constant::{LiteralText, Val};
use crate::errors::SemanticError;
use crate::types::{Kind, TypeId};

impl Compilation {
    /// Build a literal node from parser text.
    ///
    /// Integer and float text beyond the arithmetic capacity produces an
    /// overflowed literal; the overflow is reported when the value is used.
    /// Malformed text is reported immediately and yields a `Bad` node.
    pub fn literal(&mut self, text: LiteralText<'_>, pos: Pos) -> NodeId {
        let parsed = match text {
            LiteralText::Bool(b) => return self.nodes.bool_const(b, pos),
            LiteralText::Nil => return self.nodes.nil_const(pos),
            LiteralText::Str(bytes) => Ok(Val::Str(self.strings.intern(bytes))),
            LiteralText::Int(s) => match MpInt::parse(s) {
                Err(MpError::Overflow) => Ok(Val::Int(MpInt::overflow(s.starts_with('-')))),
                r => r.map(Val::Int),
            },
            LiteralText::Float(s) => match MpFlt::parse(s) {
                Err(MpError::Overflow) => Ok(Val::Float(MpFlt::overflow(s.starts_with('-')))),
                r => r.map(Val::Float),
            },
        };
        match parsed {
            Ok(val) => {
                if val.overflowed() {
                    tracing::debug!(?text, "literal exceeds constant capacity");
                }
                self.nodes.make_literal(val, TypeId::IDEAL, pos)
            }
            Err(err) => {
                self.report(
                    SemanticError::MalformedConstant {
                        reason: err.to_string(),
                    },
                    pos,
                );
                self.nodes.bad(pos)
            }
        }
    }

    /// Whether `v` lies in the range of integer kind `kind`.
    pub(crate) fn int_fits(&self, v: &MpInt, kind: Kind) -> bool {
        kind.int_limits(self.target()).is_none_or(|(min, max)| {
            v.compare(&min).is_ge() && v.compare(&max).is_le()
        })
    }

    /// Whether `v` lies in the range of float kind `kind`.
    pub(crate) fn float_fits(&self, v: &MpFlt, kind: Kind) -> bool {
        kind.float_max()
            .is_none_or(|max| v.abs().compare(&max).is_le())
    }

    pub(crate) fn value_string(&self, val: &Val) -> String {
        match val {
            Val::Reg(r) => format!("R{r}"),
            Val::Bool(b) => b.to_string(),
            Val::Int(v) => v.to_string(),
            Val::Float(v) => v.to_string(),
            Val::Str(s) => self.strings.display(*s).to_string(),
            Val::Nil => "nil".to_string(),
        }
    }

    fn overflows_type(&self, val: &Val, ty: TypeId) -> SemanticError {
        SemanticError::ConstantOverflowsType {
            value: self.value_string(val),
            ty: self.display_type(ty),
        }
    }

    /// Convert literal `n` to type `ty` in place.
    ///
    /// Failures are reported once against the node. Range failures keep the
    /// target type; impossible conversions leave the node with the error
    /// type.
    pub fn convert_literal(&mut self, n: NodeId, ty: TypeId) {
        let node = self.nodes.get(n);
        if !node.is_literal() || node.diag || ty.is_error() {
            return;
        }
        let Some(val) = node.val else {
            return;
        };
        let from = node.ty.unwrap_or(TypeId::IDEAL);
        if from == ty {
            return;
        }
        if val.overflowed() {
            self.diagnose(n, SemanticError::ConstantOverflow);
            return;
        }

        let kind = self.types.etype(ty);
        let converted = match val {
            Val::Nil if self.types.accepts_nil(ty) => Ok(val),
            Val::Int(v) if kind.is_int() => {
                if self.int_fits(&v, kind) {
                    Ok(val)
                } else {
                    Err(self.overflows_type(&val, ty))
                }
            }
            Val::Int(v) if kind.is_float() => match MpFlt::from_int(&v) {
                Ok(f) if self.float_fits(&f, kind) => Ok(Val::Float(f)),
                Ok(_) => Err(self.overflows_type(&val, ty)),
                Err(_) => Err(SemanticError::InexactConstant {
                    value: v.to_string(),
                }),
            },
            Val::Float(f) if kind.is_int() => match f.to_int() {
                Ok(i) if self.int_fits(&i, kind) => Ok(Val::Int(i)),
                Ok(_) | Err(MpError::Overflow) => Err(self.overflows_type(&val, ty)),
                Err(_) => Err(SemanticError::ConstantTruncated {
                    value: f.to_string(),
                    ty: self.display_type(ty),
                }),
            },
            Val::Float(f) if kind.is_float() => {
                if self.float_fits(&f, kind) {
                    Ok(val)
                } else {
                    Err(self.overflows_type(&val, ty))
                }
            }
            Val::Int(_) | Val::Float(_) if kind == Kind::Ideal => Ok(val),
            Val::Str(_) if kind == Kind::String || kind == Kind::Ideal => Ok(val),
            Val::Bool(_) if kind == Kind::Bool => Ok(val),
            Val::Reg(_) => Ok(val),
            _ => Err(SemanticError::InvalidConversion {
                from: val.kind_name().to_string(),
                to: self.display_type(ty),
            }),
        };

        match converted {
            Ok(val) => {
                let node = self.nodes.get_mut(n);
                node.val = Some(val);
                node.ty = Some(ty);
            }
            Err(error) => {
                let invalid = matches!(error, SemanticError::InvalidConversion { .. });
                self.diagnose(n, error);
                self.nodes.get_mut(n).ty = Some(if invalid { TypeId::ERROR } else { ty });
            }
        }
    }

    /// Give an untyped literal its default type: `int`, `float`, `string`
    /// or `bool`. Untyped `nil` has no default and is reported.
    pub fn default_literal(&mut self, n: NodeId) -> TypeId {
        let node = self.nodes.get(n);
        let ty = node.ty.unwrap_or(TypeId::ERROR);
        if !node.is_literal() || !matches!(ty, TypeId::IDEAL | TypeId::NIL) {
            return ty;
        }
        let target = match node.val {
            Some(Val::Int(_)) => TypeId::INT,
            Some(Val::Float(_)) => TypeId::FLOAT,
            Some(Val::Str(_)) => TypeId::STRING,
            Some(Val::Bool(_)) => TypeId::BOOL,
            Some(Val::Nil) => {
                self.diagnose(n, SemanticError::UntypedNil);
                return TypeId::ERROR;
            }
            Some(Val::Reg(_)) | None => return ty,
        };
        self.convert_literal(n, target);
        self.nodes.get(n).ty.unwrap_or(TypeId::ERROR)
    }
}

#[cfg(test)]
mod tests {
    use keel_identity::Pos;
    use keel_mparith::MpInt;

    use crate::CompilationBuilder;
    use crate::constant::{LiteralText, Val};
    use crate::errors::SemanticError;
    use crate::types::TypeId;

    #[test]
    fn literal_parsing() {
        let mut c = CompilationBuilder::new().build();
        let n = c.literal(LiteralText::Int("0x1F"), Pos::new(1));
        assert_eq!(c.nodes.get(n).int_val(), Some(&MpInt::from_i64(31)));
        assert_eq!(c.nodes.get(n).ty, Some(TypeId::IDEAL));

        let bad = c.literal(LiteralText::Int("12a"), Pos::new(2));
        assert!(c.nodes.get(bad).diag);
        assert!(matches!(
            c.errors()[0].error,
            SemanticError::MalformedConstant { .. }
        ));

        let huge = c.literal(LiteralText::Int(&"9".repeat(200)), Pos::new(3));
        assert!(c.nodes.get(huge).val.unwrap().overflowed());
        assert_eq!(c.error_count(), 1);
    }

    #[test]
    fn int_range_checks() {
        let mut c = CompilationBuilder::new().build();
        let ok = c.nodes.int_const(255, Pos::new(1));
        c.convert_literal(ok, TypeId::UINT8);
        assert_eq!(c.nodes.get(ok).ty, Some(TypeId::UINT8));
        assert!(c.succeeded());

        let big = c.nodes.int_const(256, Pos::new(2));
        c.convert_literal(big, TypeId::UINT8);
        assert_eq!(
            c.errors()[0].error,
            SemanticError::ConstantOverflowsType {
                value: "256".into(),
                ty: "uint8".into()
            }
        );
        // Reported once per node.
        c.convert_literal(big, TypeId::INT8);
        assert_eq!(c.error_count(), 1);

        let neg = c.nodes.int_const(-1, Pos::new(3));
        c.convert_literal(neg, TypeId::UINT);
        assert_eq!(c.error_count(), 2);
    }

    #[test]
    fn float_conversions() {
        let mut c = CompilationBuilder::new().build();
        let whole = c.literal(LiteralText::Float("3.0"), Pos::new(1));
        c.convert_literal(whole, TypeId::INT);
        assert_eq!(c.nodes.get(whole).int_val(), Some(&MpInt::from_i64(3)));

        let frac = c.literal(LiteralText::Float("3.5"), Pos::new(2));
        c.convert_literal(frac, TypeId::INT);
        assert!(matches!(
            c.errors()[0].error,
            SemanticError::ConstantTruncated { .. }
        ));

        let seven = c.nodes.int_const(7, Pos::new(3));
        c.convert_literal(seven, TypeId::FLOAT64);
        assert!(matches!(c.nodes.get(seven).val, Some(Val::Float(_))));

        let big = c.literal(LiteralText::Float("1e300"), Pos::new(4));
        c.convert_literal(big, TypeId::FLOAT32);
        assert!(matches!(
            c.errors()[1].error,
            SemanticError::ConstantOverflowsType { .. }
        ));
    }

    #[test]
    fn nil_and_impossible_conversions() {
        let mut c = CompilationBuilder::new().build();
        let ptr = c.types.make_pointer_to(TypeId::INT);
        let nil = c.nodes.nil_const(Pos::new(1));
        c.convert_literal(nil, ptr);
        assert_eq!(c.nodes.get(nil).ty, Some(ptr));

        let s = c.literal(LiteralText::Str(b"hi"), Pos::new(2));
        c.convert_literal(s, TypeId::INT);
        assert_eq!(c.nodes.get(s).ty, Some(TypeId::ERROR));
        assert_eq!(
            c.errors()[0].error,
            SemanticError::InvalidConversion {
                from: "string".into(),
                to: "int".into()
            }
        );
    }

    #[test]
    fn defaults() {
        let mut c = CompilationBuilder::new().build();
        let i = c.nodes.int_const(1, Pos::new(1));
        let f = c.literal(LiteralText::Float("1.5"), Pos::new(2));
        let s = c.literal(LiteralText::Str(b"x"), Pos::new(3));
        assert_eq!(c.default_literal(i), TypeId::INT);
        assert_eq!(c.default_literal(f), TypeId::FLOAT);
        assert_eq!(c.default_literal(s), TypeId::STRING);
        assert!(c.succeeded());

        let nil = c.nodes.nil_const(Pos::new(4));
        assert_eq!(c.default_literal(nil), TypeId::ERROR);
        assert_eq!(c.errors()[0].error, SemanticError::UntypedNil);

        let huge = c.nodes.int_const(i64::MAX, Pos::new(5));
        c.default_literal(huge);
        assert_eq!(c.error_count(), 2);
    }
}
