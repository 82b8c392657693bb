// types/kind.rs
//
// Type constructor kinds and the static per-kind metadata (classification,
// operator tables, constant limits).

use std::fmt;

use keel_mparith::{MpFlt, MpInt};
use serde::{Deserialize, Serialize};

use crate::config::Target;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kind {
    Int8,
    Uint8,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Int64,
    Uint64,
    Int,
    Uint,
    Uintptr,

    Float32,
    Float64,
    Float80,
    Float,

    Bool,
    String,

    Ptr,
    Func,
    Array,
    Struct,
    Chan,
    Map,
    Interface,

    Forward,
    /// Untyped constant.
    Ideal,
    Nil,
    Error,
}

impl Kind {
    /// Basic kinds, in the order of their reserved type ids.
    pub const BASIC: [Kind; 17] = [
        Kind::Int8,
        Kind::Uint8,
        Kind::Int16,
        Kind::Uint16,
        Kind::Int32,
        Kind::Uint32,
        Kind::Int64,
        Kind::Uint64,
        Kind::Int,
        Kind::Uint,
        Kind::Uintptr,
        Kind::Float32,
        Kind::Float64,
        Kind::Float80,
        Kind::Float,
        Kind::Bool,
        Kind::String,
    ];

    #[inline]
    pub const fn is_int(self) -> bool {
        self.is_signed() || self.is_unsigned()
    }

    #[inline]
    pub const fn is_signed(self) -> bool {
        matches!(
            self,
            Kind::Int8 | Kind::Int16 | Kind::Int32 | Kind::Int64 | Kind::Int
        )
    }

    #[inline]
    pub const fn is_unsigned(self) -> bool {
        matches!(
            self,
            Kind::Uint8 | Kind::Uint16 | Kind::Uint32 | Kind::Uint64 | Kind::Uint | Kind::Uintptr
        )
    }

    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(
            self,
            Kind::Float32 | Kind::Float64 | Kind::Float80 | Kind::Float
        )
    }

    #[inline]
    pub const fn is_numeric(self) -> bool {
        self.is_int() || self.is_float()
    }

    /// Predeclared, non-composite kinds.
    pub const fn is_basic(self) -> bool {
        self.is_numeric() || matches!(self, Kind::Bool | Kind::String)
    }

    pub const fn ok_for_eq(self) -> bool {
        self.is_basic()
            || matches!(
                self,
                Kind::Ptr | Kind::Chan | Kind::Map | Kind::Func | Kind::Interface | Kind::Nil
            )
    }

    /// `<`, `<=`, `>`, `>=`.
    pub const fn ok_for_order(self) -> bool {
        self.is_numeric() || matches!(self, Kind::String)
    }

    /// Binary `+`.
    pub const fn ok_for_add(self) -> bool {
        self.is_numeric() || matches!(self, Kind::String)
    }

    /// `-`, `*`, `/` and unary `-`.
    pub const fn ok_for_arith(self) -> bool {
        self.is_numeric()
    }

    /// `%`, `&`, `|`, `^`, `&^`, shifts and unary `^`.
    pub const fn ok_for_and(self) -> bool {
        self.is_int()
    }

    /// Width in bytes of a basic kind.
    pub fn basic_width(self, target: &Target) -> Option<u64> {
        let width = match self {
            Kind::Int8 | Kind::Uint8 | Kind::Bool => 1,
            Kind::Int16 | Kind::Uint16 => 2,
            Kind::Int32 | Kind::Uint32 | Kind::Float32 | Kind::Float => 4,
            Kind::Int64 | Kind::Uint64 | Kind::Float64 => 8,
            Kind::Int | Kind::Uint => target.int_width,
            Kind::Uintptr => target.ptr_width,
            Kind::Float80 => 16,
            Kind::String => 2 * target.ptr_width,
            _ => return None,
        };
        Some(width)
    }

    /// Smallest and largest value of an integer kind.
    pub fn int_limits(self, target: &Target) -> Option<(MpInt, MpInt)> {
        if !self.is_int() {
            return None;
        }
        let bits = (self.basic_width(target)? * 8) as u32;
        let one = MpInt::from_i64(1);
        Some(if self.is_signed() {
            let half = MpInt::pow2(bits - 1);
            (-half, half - one)
        } else {
            (MpInt::ZERO, MpInt::pow2(bits) - one)
        })
    }

    /// Largest finite magnitude of a float kind.
    pub fn float_max(self) -> Option<MpFlt> {
        match self {
            Kind::Float32 | Kind::Float => MpFlt::from_f64(f32::MAX as f64).ok(),
            Kind::Float64 | Kind::Float80 => MpFlt::from_f64(f64::MAX).ok(),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Kind::Int8 => "int8",
            Kind::Uint8 => "uint8",
            Kind::Int16 => "int16",
            Kind::Uint16 => "uint16",
            Kind::Int32 => "int32",
            Kind::Uint32 => "uint32",
            Kind::Int64 => "int64",
            Kind::Uint64 => "uint64",
            Kind::Int => "int",
            Kind::Uint => "uint",
            Kind::Uintptr => "uintptr",
            Kind::Float32 => "float32",
            Kind::Float64 => "float64",
            Kind::Float80 => "float80",
            Kind::Float => "float",
            Kind::Bool => "bool",
            Kind::String => "string",
            Kind::Ptr => "pointer",
            Kind::Func => "func",
            Kind::Array => "array",
            Kind::Struct => "struct",
            Kind::Chan => "chan",
            Kind::Map => "map",
            Kind::Interface => "interface",
            Kind::Forward => "forward",
            Kind::Ideal => "ideal",
            Kind::Nil => "nil",
            Kind::Error => "<error>",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        assert!(Kind::Int8.is_signed());
        assert!(Kind::Uintptr.is_unsigned());
        assert!(Kind::Float80.is_float());
        assert!(!Kind::Bool.is_numeric());
        assert!(Kind::String.is_basic());
        assert!(!Kind::Map.is_basic());
    }

    #[test]
    fn operator_tables() {
        assert!(Kind::String.ok_for_add());
        assert!(!Kind::String.ok_for_arith());
        assert!(!Kind::Float64.ok_for_and());
        assert!(Kind::Map.ok_for_eq());
        assert!(!Kind::Struct.ok_for_eq());
        assert!(!Kind::Bool.ok_for_order());
    }

    #[test]
    fn limits_follow_target_widths() {
        let target = Target::default();
        let (min, max) = Kind::Int8.int_limits(&target).unwrap();
        assert_eq!((min.to_i64(), max.to_i64()), (Some(-128), Some(127)));
        let (_, max) = Kind::Uint.int_limits(&target).unwrap();
        assert_eq!(max.to_u64(), Some(u32::MAX as u64));
        let (min, max) = Kind::Uint64.int_limits(&target).unwrap();
        assert!(min.is_zero());
        assert_eq!(max.to_u64(), Some(u64::MAX));
        assert_eq!(Kind::Bool.int_limits(&target), None);
    }

    #[test]
    fn float_limits() {
        assert_eq!(
            Kind::Float32.float_max().map(|f| f.to_f64()),
            Some(f32::MAX as f64)
        );
        assert_eq!(Kind::Float64.float_max().map(|f| f.to_f64()), Some(f64::MAX));
        assert!(Kind::Int.float_max().is_none());
    }
}
