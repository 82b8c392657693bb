// int.rs
//
// Sign-magnitude fixed-capacity integer with a sticky overflow flag.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, BitAnd, BitOr, BitXor, Mul, Neg, Not, Shl, Shr, Sub};
use std::str::FromStr;

use crate::limbs::{self, MASK};
use crate::{MP_BITS, MP_PREC, MP_SCALE, MpError};

/// Exact integer of up to [`MP_BITS`] bits of magnitude.
///
/// Zero is never negative. An overflowed value has a zero magnitude and the
/// `ovf` flag set; the flag is contagious through every operation.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct MpInt {
    pub(crate) limbs: [u32; MP_PREC],
    pub(crate) neg: bool,
    pub(crate) ovf: bool,
}

impl Default for MpInt {
    fn default() -> Self {
        Self::ZERO
    }
}

impl MpInt {
    pub const ZERO: MpInt = MpInt {
        limbs: [0; MP_PREC],
        neg: false,
        ovf: false,
    };

    /// Canonical constructor: clears the sign of zero.
    pub(crate) fn from_parts(neg: bool, limbs: [u32; MP_PREC]) -> Self {
        let neg = neg && !limbs::is_zero(&limbs);
        Self {
            limbs,
            neg,
            ovf: false,
        }
    }

    /// An overflowed value carrying only its sign.
    pub fn overflow(neg: bool) -> Self {
        Self {
            limbs: [0; MP_PREC],
            neg,
            ovf: true,
        }
    }

    /// Build from a magnitude slice, flagging overflow if it does not fit.
    pub(crate) fn from_magnitude(neg: bool, mag: &[u32]) -> Self {
        if mag.iter().skip(MP_PREC).any(|&l| l != 0) {
            return Self::overflow(neg);
        }
        let mut limbs = [0u32; MP_PREC];
        for (slot, &l) in limbs.iter_mut().zip(mag) {
            *slot = l;
        }
        Self::from_parts(neg, limbs)
    }

    pub fn from_i64(v: i64) -> Self {
        let mut out = Self::from_u64(v.unsigned_abs());
        out.neg = v < 0;
        out
    }

    pub fn from_u64(v: u64) -> Self {
        let mut limbs = [0u32; MP_PREC];
        let mut rest = v;
        for slot in limbs.iter_mut() {
            if rest == 0 {
                break;
            }
            *slot = (rest & MASK as u64) as u32;
            rest >>= MP_SCALE;
        }
        Self::from_parts(false, limbs)
    }

    /// `2^bits`, overflowing when it exceeds capacity.
    pub fn pow2(bits: u32) -> Self {
        Self::from_i64(1) << bits
    }

    fn magnitude_u128(&self) -> Option<u128> {
        if self.ovf || self.bit_len() > 128 {
            return None;
        }
        Some(
            self.limbs
                .iter()
                .rev()
                .fold(0u128, |acc, &l| (acc << MP_SCALE) | l as u128),
        )
    }

    /// Value as an `i64`, if it fits.
    pub fn to_i64(&self) -> Option<i64> {
        let mag = self.magnitude_u128()?;
        if self.neg {
            if mag <= i64::MAX as u128 + 1 {
                Some((mag as i128).wrapping_neg() as i64)
            } else {
                None
            }
        } else {
            i64::try_from(mag).ok()
        }
    }

    /// Value as a `u64`, if it is non-negative and fits.
    pub fn to_u64(&self) -> Option<u64> {
        if self.neg {
            return None;
        }
        u64::try_from(self.magnitude_u128()?).ok()
    }

    pub fn is_zero(&self) -> bool {
        !self.ovf && limbs::is_zero(&self.limbs)
    }

    pub fn is_negative(&self) -> bool {
        self.neg
    }

    pub fn overflowed(&self) -> bool {
        self.ovf
    }

    /// -1, 0 or +1.
    pub fn signum(&self) -> i32 {
        if self.is_zero() {
            0
        } else if self.neg {
            -1
        } else {
            1
        }
    }

    /// Bits in the magnitude.
    pub fn bit_len(&self) -> u32 {
        limbs::bit_len(&self.limbs)
    }

    pub fn abs(self) -> Self {
        Self { neg: false, ..self }
    }

    /// Compare two values numerically, ignoring the overflow flag.
    pub fn compare(&self, other: &MpInt) -> Ordering {
        match (self.signum(), other.signum()) {
            (a, b) if a != b => a.cmp(&b),
            (0, _) => Ordering::Equal,
            (sign, _) => {
                let by_mag = limbs::cmp(&self.limbs, &other.limbs);
                if sign < 0 { by_mag.reverse() } else { by_mag }
            }
        }
    }

    pub fn compare_i64(&self, other: i64) -> Ordering {
        self.compare(&Self::from_i64(other))
    }

    fn signed_add(self, rhs: MpInt, rhs_neg: bool) -> MpInt {
        if self.ovf || rhs.ovf {
            return Self::overflow(self.neg);
        }
        let mut mag = self.limbs;
        if self.neg == rhs_neg {
            if limbs::add_assign(&mut mag, &rhs.limbs) {
                tracing::trace!("integer addition overflowed");
                return Self::overflow(self.neg);
            }
            return Self::from_parts(self.neg, mag);
        }
        match limbs::cmp(&self.limbs, &rhs.limbs) {
            Ordering::Less => {
                let mut larger = rhs.limbs;
                limbs::sub_assign(&mut larger, &self.limbs);
                Self::from_parts(rhs_neg, larger)
            }
            _ => {
                limbs::sub_assign(&mut mag, &rhs.limbs);
                Self::from_parts(self.neg, mag)
            }
        }
    }

    fn divmod(self, rhs: MpInt) -> Result<(MpInt, MpInt), MpError> {
        if self.ovf || rhs.ovf {
            return Ok((Self::overflow(self.neg), Self::overflow(self.neg)));
        }
        if rhs.is_zero() {
            return Err(MpError::DivisionByZero);
        }
        let (q, r) = limbs::divmod(&self.limbs, &rhs.limbs);
        Ok((
            Self::from_magnitude(self.neg != rhs.neg, &q),
            Self::from_magnitude(self.neg, &r),
        ))
    }

    /// Quotient truncated toward zero.
    pub fn checked_div(self, rhs: MpInt) -> Result<MpInt, MpError> {
        self.divmod(rhs).map(|(q, _)| q)
    }

    /// Remainder with the sign of the dividend.
    pub fn checked_rem(self, rhs: MpInt) -> Result<MpInt, MpError> {
        self.divmod(rhs).map(|(_, r)| r)
    }

    /// `self & !rhs`
    pub fn and_not(self, rhs: MpInt) -> MpInt {
        self & !rhs
    }

    /// Two's complement limbs with an implied infinite sign extension.
    fn to_twos(self) -> ([u32; MP_PREC], bool) {
        if !self.neg {
            return (self.limbs, false);
        }
        let mut mag = self.limbs;
        limbs::sub_assign(&mut mag, &[1]);
        (mag.map(|l| !l & MASK), true)
    }

    fn from_twos(twos: [u32; MP_PREC], neg: bool) -> MpInt {
        if !neg {
            return Self::from_parts(false, twos);
        }
        let mut mag = twos.map(|l| !l & MASK);
        if limbs::add_assign(&mut mag, &[1]) {
            return Self::overflow(true);
        }
        Self::from_parts(true, mag)
    }

    fn bitwise(self, rhs: MpInt, op: impl Fn(u32, u32) -> u32, sign: fn(bool, bool) -> bool) -> MpInt {
        if self.ovf || rhs.ovf {
            return Self::overflow(false);
        }
        let (a, a_neg) = self.to_twos();
        let (b, b_neg) = rhs.to_twos();
        let mut out = [0u32; MP_PREC];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = op(a[i], b[i]) & MASK;
        }
        Self::from_twos(out, sign(a_neg, b_neg))
    }

    /// Parse an integer literal: decimal, octal (leading `0`) or hexadecimal
    /// (`0x`), with an optional sign.
    pub fn parse(text: &str) -> Result<MpInt, MpError> {
        let (neg, body) = match text.as_bytes().first() {
            Some(b'-') => (true, &text[1..]),
            Some(b'+') => (false, &text[1..]),
            _ => (false, text),
        };
        let (radix, digits) = if let Some(hex) = body
            .strip_prefix("0x")
            .or_else(|| body.strip_prefix("0X"))
        {
            (16, hex)
        } else if body.len() > 1 && body.starts_with('0') {
            (8, &body[1..])
        } else {
            (10, body)
        };
        if digits.is_empty() {
            return Err(MpError::malformed("no digits"));
        }

        let mut mag = [0u32; MP_PREC];
        for c in digits.chars() {
            let digit = c
                .to_digit(radix)
                .ok_or(MpError::malformed("invalid digit in integer literal"))?;
            if limbs::mul_small_add(&mut mag, radix, digit) {
                return Err(MpError::Overflow);
            }
        }
        Ok(Self::from_parts(neg, mag))
    }
}

impl Add for MpInt {
    type Output = MpInt;

    fn add(self, rhs: MpInt) -> MpInt {
        self.signed_add(rhs, rhs.neg)
    }
}

impl Sub for MpInt {
    type Output = MpInt;

    fn sub(self, rhs: MpInt) -> MpInt {
        let rhs_neg = !rhs.neg && !rhs.is_zero();
        self.signed_add(rhs, rhs_neg)
    }
}

impl Mul for MpInt {
    type Output = MpInt;

    fn mul(self, rhs: MpInt) -> MpInt {
        let neg = self.neg != rhs.neg;
        if self.ovf || rhs.ovf {
            return Self::overflow(neg);
        }
        let mut out = [0u32; MP_PREC];
        if limbs::mul(&self.limbs, &rhs.limbs, &mut out) {
            tracing::trace!("integer multiplication overflowed");
            return Self::overflow(neg);
        }
        Self::from_parts(neg, out)
    }
}

impl Neg for MpInt {
    type Output = MpInt;

    fn neg(self) -> MpInt {
        if self.ovf {
            return Self::overflow(!self.neg);
        }
        Self::from_parts(!self.neg, self.limbs)
    }
}

impl Not for MpInt {
    type Output = MpInt;

    /// Bitwise complement, `-x - 1`.
    fn not(self) -> MpInt {
        if self.ovf {
            return self;
        }
        let (twos, neg) = self.to_twos();
        Self::from_twos(twos.map(|l| !l & MASK), !neg)
    }
}

impl BitAnd for MpInt {
    type Output = MpInt;

    fn bitand(self, rhs: MpInt) -> MpInt {
        self.bitwise(rhs, |a, b| a & b, |a, b| a && b)
    }
}

impl BitOr for MpInt {
    type Output = MpInt;

    fn bitor(self, rhs: MpInt) -> MpInt {
        self.bitwise(rhs, |a, b| a | b, |a, b| a || b)
    }
}

impl BitXor for MpInt {
    type Output = MpInt;

    fn bitxor(self, rhs: MpInt) -> MpInt {
        self.bitwise(rhs, |a, b| a ^ b, |a, b| a != b)
    }
}

impl Shl<u32> for MpInt {
    type Output = MpInt;

    fn shl(self, bits: u32) -> MpInt {
        if self.ovf {
            return self;
        }
        let mut mag = self.limbs;
        if limbs::shl_assign(&mut mag, bits) {
            return Self::overflow(self.neg);
        }
        Self::from_parts(self.neg, mag)
    }
}

impl Shr<u32> for MpInt {
    type Output = MpInt;

    /// Arithmetic shift: rounds toward negative infinity.
    fn shr(self, bits: u32) -> MpInt {
        if self.ovf {
            return self;
        }
        let bits = bits.min(MP_BITS);
        if !self.neg {
            let mut mag = self.limbs;
            limbs::shr_assign(&mut mag, bits);
            return Self::from_parts(false, mag);
        }
        // -((|x| - 1) >> n) - 1
        let mut mag = self.limbs;
        limbs::sub_assign(&mut mag, &[1]);
        limbs::shr_assign(&mut mag, bits);
        let shifted = Self::from_parts(false, mag);
        -shifted - Self::from_i64(1)
    }
}

impl FromStr for MpInt {
    type Err = MpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for MpInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ovf {
            return f.write_str("<overflow>");
        }
        const CHUNK: u32 = 1_000_000_000;
        let mut mag = self.limbs;
        let mut chunks = Vec::new();
        while !limbs::is_zero(&mag) {
            chunks.push(limbs::div_small(&mut mag, CHUNK));
        }
        if self.neg {
            f.write_str("-")?;
        }
        match chunks.split_last() {
            None => f.write_str("0"),
            Some((top, rest)) => {
                write!(f, "{}", top)?;
                for chunk in rest.iter().rev() {
                    write!(f, "{:09}", chunk)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Debug for MpInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MpInt({})", self)
    }
}

impl From<i64> for MpInt {
    fn from(v: i64) -> Self {
        Self::from_i64(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(v: i64) -> MpInt {
        MpInt::from_i64(v)
    }

    #[test]
    fn parses_all_radixes() {
        assert_eq!(MpInt::parse("42"), Ok(int(42)));
        assert_eq!(MpInt::parse("0x2A"), Ok(int(42)));
        assert_eq!(MpInt::parse("052"), Ok(int(42)));
        assert_eq!(MpInt::parse("-17"), Ok(int(-17)));
        assert_eq!(MpInt::parse("0"), Ok(MpInt::ZERO));
    }

    #[test]
    fn rejects_malformed_literals() {
        assert!(matches!(MpInt::parse(""), Err(MpError::Malformed { .. })));
        assert!(matches!(MpInt::parse("0x"), Err(MpError::Malformed { .. })));
        assert!(matches!(MpInt::parse("09"), Err(MpError::Malformed { .. })));
        assert!(matches!(MpInt::parse("12a"), Err(MpError::Malformed { .. })));
    }

    #[test]
    fn literal_beyond_capacity_overflows() {
        let huge = format!("1{}", "0".repeat(150));
        assert_eq!(MpInt::parse(&huge), Err(MpError::Overflow));
        let fits = format!("1{}", "0".repeat(130));
        assert!(MpInt::parse(&fits).is_ok());
    }

    #[test]
    fn displays_decimal() {
        let big = MpInt::parse("123456789012345678901234567890").unwrap();
        assert_eq!(big.to_string(), "123456789012345678901234567890");
        assert_eq!(int(-1_000_000_000).to_string(), "-1000000000");
        assert_eq!(MpInt::ZERO.to_string(), "0");
    }

    #[test]
    fn arithmetic_matches_native() {
        for (a, b) in [(7, 3), (-7, 3), (7, -3), (-7, -3), (0, 5), (1 << 40, 12345)] {
            assert_eq!((int(a) + int(b)).to_i64(), Some(a + b));
            assert_eq!((int(a) - int(b)).to_i64(), Some(a - b));
            assert_eq!((int(a) * int(b)).to_i64(), Some(a * b));
            assert_eq!(int(a).checked_div(int(b)).unwrap().to_i64(), Some(a / b));
            assert_eq!(int(a).checked_rem(int(b)).unwrap().to_i64(), Some(a % b));
        }
    }

    #[test]
    fn bitwise_matches_twos_complement() {
        for (a, b) in [(12, 10), (-12, 10), (12, -10), (-12, -10), (0, -1)] {
            assert_eq!((int(a) & int(b)).to_i64(), Some(a & b));
            assert_eq!((int(a) | int(b)).to_i64(), Some(a | b));
            assert_eq!((int(a) ^ int(b)).to_i64(), Some(a ^ b));
            assert_eq!(int(a).and_not(int(b)).to_i64(), Some(a & !b));
            assert_eq!((!int(a)).to_i64(), Some(!a));
        }
    }

    #[test]
    fn shifts_match_native() {
        assert_eq!((int(3) << 10).to_i64(), Some(3 << 10));
        assert_eq!((int(-3) << 10).to_i64(), Some(-3 << 10));
        assert_eq!((int(1000) >> 3).to_i64(), Some(1000 >> 3));
        assert_eq!((int(-1000) >> 3).to_i64(), Some(-1000 >> 3));
        assert_eq!((int(-1) >> 200).to_i64(), Some(-1));
    }

    #[test]
    fn division_by_zero_is_an_error() {
        assert_eq!(int(1).checked_div(MpInt::ZERO), Err(MpError::DivisionByZero));
        assert_eq!(int(1).checked_rem(MpInt::ZERO), Err(MpError::DivisionByZero));
    }

    #[test]
    fn overflow_is_sticky() {
        let max = MpInt::pow2(MP_BITS - 1);
        assert!(!max.overflowed());
        let doubled = max + max;
        assert!(doubled.overflowed());
        assert!((doubled - max).overflowed());
        assert!((doubled * int(0)).overflowed());
        assert!(MpInt::pow2(MP_BITS).overflowed());
    }

    #[test]
    fn compare_orders_by_value() {
        assert_eq!(int(-5).compare(&int(3)), Ordering::Less);
        assert_eq!(int(-5).compare(&int(-7)), Ordering::Greater);
        assert_eq!(int(9).compare_i64(9), Ordering::Equal);
    }

    #[test]
    fn i64_extremes_round_trip() {
        assert_eq!(int(i64::MIN).to_i64(), Some(i64::MIN));
        assert_eq!(int(i64::MAX).to_i64(), Some(i64::MAX));
        assert_eq!((int(i64::MAX) + int(1)).to_i64(), None);
        assert_eq!(MpInt::from_u64(u64::MAX).to_u64(), Some(u64::MAX));
    }
}
