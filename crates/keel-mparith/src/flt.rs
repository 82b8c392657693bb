// flt.rs
//
// Binary floating constant: MpInt mantissa scaled by a power of two.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;

use crate::limbs;
use crate::{MP_BITS, MP_NORM, MP_PREC, MP_SCALE, MpError, MpInt};

/// Significant bits of a normalized mantissa.
const NORM_BITS: u32 = MP_NORM as u32 * MP_SCALE;
/// Scratch width for intermediate results: a full double-width product.
const WIDE: usize = 2 * MP_PREC + 1;
/// Binary exponent bounds; larger values overflow, smaller flush to zero.
const MAX_EXP: i64 = 1 << 20;
/// Decimal exponent bound accepted by the literal parser.
const MAX_DEC_EXP: i64 = 300_000;

type Wide = [u32; WIDE];

/// Exact scaled binary float: `mant * 2^exp`.
///
/// A nonzero value always has a mantissa of exactly [`MP_NORM`] significant
/// limbs (its top bit at `NORM_BITS - 1`), so the representation of every
/// value is unique. Zero has a zero mantissa and exponent.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MpFlt {
    mant: MpInt,
    exp: i32,
}

fn widen(int: &MpInt) -> Wide {
    let mut wide = [0u32; WIDE];
    wide[..MP_PREC].copy_from_slice(&int.limbs);
    wide
}

impl MpFlt {
    pub const ZERO: MpFlt = MpFlt {
        mant: MpInt::ZERO,
        exp: 0,
    };

    /// An overflowed value carrying only its sign.
    pub fn overflow(neg: bool) -> Self {
        Self {
            mant: MpInt::overflow(neg),
            exp: 0,
        }
    }

    /// Renormalize a wide magnitude. Returns the value and whether set bits
    /// were discarded on the way.
    fn normalize(neg: bool, mag: &mut Wide, exp: i64) -> (MpFlt, bool) {
        let len = limbs::bit_len(mag);
        if len == 0 {
            return (Self::ZERO, false);
        }
        let mut exp = exp;
        let inexact = if len > NORM_BITS {
            let shift = len - NORM_BITS;
            exp += shift as i64;
            limbs::shr_assign(mag, shift)
        } else {
            let shift = NORM_BITS - len;
            exp -= shift as i64;
            limbs::shl_assign(mag, shift)
        };
        if exp > MAX_EXP {
            tracing::trace!(exp, "float constant exponent overflowed");
            return (Self::overflow(neg), true);
        }
        if exp < -MAX_EXP {
            return (Self::ZERO, true);
        }
        let mant = MpInt::from_magnitude(neg, &mag[..MP_PREC]);
        (
            Self {
                mant,
                exp: exp as i32,
            },
            inexact,
        )
    }

    pub fn from_i64(v: i64) -> Self {
        // 64 bits always fit in the normalized mantissa.
        Self::normalize(v < 0, &mut widen(&MpInt::from_i64(v).abs()), 0).0
    }

    /// Convert an integer, failing if low-order bits would be dropped.
    pub fn from_int(int: &MpInt) -> Result<MpFlt, MpError> {
        if int.overflowed() {
            return Err(MpError::Overflow);
        }
        match Self::normalize(int.is_negative(), &mut widen(int), 0) {
            (_, true) => Err(MpError::Inexact),
            (value, false) => Ok(value),
        }
    }

    /// Convert an integer, truncating bits beyond the mantissa precision.
    pub fn from_int_lossy(int: &MpInt) -> MpFlt {
        if int.overflowed() {
            return Self::overflow(int.is_negative());
        }
        Self::normalize(int.is_negative(), &mut widen(int), 0).0
    }

    /// Convert to an integer. Fails if the value has a fractional part or
    /// exceeds integer capacity.
    pub fn to_int(&self) -> Result<MpInt, MpError> {
        if self.overflowed() {
            return Err(MpError::Overflow);
        }
        if self.is_zero() {
            return Ok(MpInt::ZERO);
        }
        let exp = self.exp as i64;
        let mut wide = widen(&self.mant);
        if exp >= 0 {
            if NORM_BITS as i64 + exp > MP_BITS as i64 {
                return Err(MpError::Overflow);
            }
            limbs::shl_assign(&mut wide, exp as u32);
        } else {
            let shift = (-exp).min(WIDE as i64 * MP_SCALE as i64) as u32;
            if limbs::shr_assign(&mut wide, shift) {
                return Err(MpError::Truncated);
            }
        }
        Ok(MpInt::from_magnitude(self.is_negative(), &wide))
    }

    pub fn from_f64(v: f64) -> Result<MpFlt, MpError> {
        if !v.is_finite() {
            return Err(MpError::NotFinite);
        }
        if v == 0.0 {
            return Ok(Self::ZERO);
        }
        let bits = v.to_bits();
        let neg = bits >> 63 == 1;
        let biased = ((bits >> 52) & 0x7ff) as i64;
        let fraction = bits & ((1 << 52) - 1);
        let (mantissa, exp) = if biased == 0 {
            (fraction, -1074)
        } else {
            (fraction | (1 << 52), biased - 1075)
        };
        Ok(Self::normalize(neg, &mut widen(&MpInt::from_u64(mantissa)), exp).0)
    }

    /// Nearest `f64`.
    pub fn to_f64(&self) -> f64 {
        if self.overflowed() {
            return if self.is_negative() {
                f64::NEG_INFINITY
            } else {
                f64::INFINITY
            };
        }
        if self.is_zero() {
            return 0.0;
        }
        let shift = NORM_BITS - 64;
        let mut wide = widen(&self.mant);
        // Keep a sticky bit so the final rounding to 53 bits is correct.
        let sticky = limbs::shr_assign(&mut wide, shift);
        let top = wide
            .iter()
            .take(3)
            .rev()
            .fold(0u64, |acc, &l| (acc << MP_SCALE) | l as u64)
            | sticky as u64;
        let magnitude = ldexp(top as f64, self.exp as i64 + shift as i64);
        if self.is_negative() { -magnitude } else { magnitude }
    }

    /// Rebuild from a mantissa and binary exponent, as returned by
    /// [`MpFlt::parts`].
    pub fn from_parts(mant: MpInt, exp: i32) -> MpFlt {
        if mant.overflowed() {
            return Self::overflow(mant.is_negative());
        }
        Self::normalize(mant.is_negative(), &mut widen(&mant), exp as i64).0
    }

    pub fn abs(self) -> MpFlt {
        Self {
            mant: self.mant.abs(),
            exp: self.exp,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.mant.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.mant.is_negative()
    }

    pub fn overflowed(&self) -> bool {
        self.mant.overflowed()
    }

    pub fn signum(&self) -> i32 {
        self.mant.signum()
    }

    /// Mantissa and binary exponent: the value is `mantissa * 2^exponent`.
    pub fn parts(&self) -> (&MpInt, i32) {
        (&self.mant, self.exp)
    }

    /// Compare by computing the exact difference and testing its sign.
    pub fn compare(&self, other: &MpFlt) -> Ordering {
        (*self - *other).signum().cmp(&0)
    }

    /// Compare against an integer, converting it first. Fails when the
    /// integer is not exactly representable.
    pub fn compare_int(&self, other: &MpInt) -> Result<Ordering, MpError> {
        Ok(self.compare(&MpFlt::from_int(other)?))
    }

    pub fn checked_div(self, rhs: MpFlt) -> Result<MpFlt, MpError> {
        let neg = self.is_negative() != rhs.is_negative();
        if self.overflowed() || rhs.overflowed() {
            return Ok(Self::overflow(neg));
        }
        if rhs.is_zero() {
            return Err(MpError::DivisionByZero);
        }
        if self.is_zero() {
            return Ok(Self::ZERO);
        }
        // Pre-shift the dividend so the quotient keeps a full mantissa.
        let pre = NORM_BITS + 2;
        let mut dividend = widen(&self.mant);
        limbs::shl_assign(&mut dividend, pre);
        let (quotient, _) = limbs::divmod(&dividend, &rhs.mant.limbs);
        let mut wide = [0u32; WIDE];
        for (slot, &l) in wide.iter_mut().zip(&quotient) {
            *slot = l;
        }
        let exp = self.exp as i64 - rhs.exp as i64 - pre as i64;
        Ok(Self::normalize(neg, &mut wide, exp).0)
    }

    /// Parse a decimal float literal: digits with an optional fraction and
    /// an optional `e`/`E` exponent, with an optional leading sign.
    pub fn parse(text: &str) -> Result<MpFlt, MpError> {
        let (neg, body) = match text.as_bytes().first() {
            Some(b'-') => (true, &text[1..]),
            Some(b'+') => (false, &text[1..]),
            _ => (false, text),
        };
        let (mantissa, exponent) = match body.find(['e', 'E']) {
            Some(at) => (&body[..at], Some(&body[at + 1..])),
            None => (body, None),
        };

        let exp10 = match exponent {
            Some(text) => parse_exponent(text)?,
            None => 0,
        };

        let ten = MpFlt::from_i64(10);
        let mut value = MpFlt::ZERO;
        let mut digits = 0usize;
        let mut fraction_digits = 0i64;
        let mut seen_dot = false;
        for c in mantissa.chars() {
            match c {
                '.' if !seen_dot => seen_dot = true,
                '.' => return Err(MpError::malformed("second decimal point")),
                '0'..='9' => {
                    let digit = c as i64 - '0' as i64;
                    value = value * ten + MpFlt::from_i64(digit);
                    digits += 1;
                    if seen_dot {
                        fraction_digits += 1;
                    }
                }
                _ => return Err(MpError::malformed("invalid character in float literal")),
            }
        }
        if digits == 0 {
            return Err(MpError::malformed("no digits"));
        }
        if value.is_zero() {
            return Ok(Self::ZERO);
        }

        let dexp = exp10.saturating_sub(fraction_digits);
        if dexp > MAX_DEC_EXP {
            return Err(MpError::Overflow);
        }
        if dexp < -MAX_DEC_EXP {
            return Ok(Self::ZERO);
        }
        let scale = pow10(dexp.unsigned_abs());
        let value = if dexp >= 0 {
            value * scale
        } else {
            value.checked_div(scale)?
        };
        if value.overflowed() {
            return Err(MpError::Overflow);
        }
        Ok(if neg { -value } else { value })
    }
}

fn parse_exponent(text: &str) -> Result<i64, MpError> {
    let (neg, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    if digits.is_empty() {
        return Err(MpError::malformed("empty exponent"));
    }
    let mut exp = 0i64;
    for c in digits.chars() {
        let digit = c
            .to_digit(10)
            .ok_or(MpError::malformed("invalid digit in exponent"))?;
        exp = exp.saturating_mul(10).saturating_add(digit as i64);
    }
    Ok(if neg { -exp } else { exp })
}

/// `10^n` by repeated squaring.
fn pow10(mut n: u64) -> MpFlt {
    let mut result = MpFlt::from_i64(1);
    let mut base = MpFlt::from_i64(10);
    while n > 0 {
        if n & 1 == 1 {
            result = result * base;
        }
        n >>= 1;
        if n > 0 {
            base = base * base;
        }
    }
    result
}

/// `x * 2^exp` without intermediate overflow of the scale factor.
fn ldexp(mut x: f64, mut exp: i64) -> f64 {
    const STEP: i64 = 1000;
    while exp > STEP && x.is_finite() {
        x *= 2f64.powi(STEP as i32);
        exp -= STEP;
    }
    while exp < -STEP && x != 0.0 {
        x *= 2f64.powi(-STEP as i32);
        exp += STEP;
    }
    x * 2f64.powi(exp as i32)
}

impl Add for MpFlt {
    type Output = MpFlt;

    fn add(self, rhs: MpFlt) -> MpFlt {
        if self.overflowed() || rhs.overflowed() {
            return Self::overflow(self.is_negative());
        }
        if rhs.is_zero() {
            return self;
        }
        if self.is_zero() {
            return rhs;
        }
        let (hi, lo) = if self.exp >= rhs.exp {
            (self, rhs)
        } else {
            (rhs, self)
        };
        let distance = hi.exp as i64 - lo.exp as i64;
        if distance > NORM_BITS as i64 + 2 {
            // The smaller operand is entirely below the mantissa precision.
            return hi;
        }
        let mut a = widen(&hi.mant);
        limbs::shl_assign(&mut a, distance as u32);
        let mut b = widen(&lo.mant);
        let (neg, mag) = if hi.is_negative() == lo.is_negative() {
            limbs::add_assign(&mut a, &b);
            (hi.is_negative(), &mut a)
        } else {
            match limbs::cmp(&a, &b) {
                Ordering::Equal => return Self::ZERO,
                Ordering::Greater => {
                    limbs::sub_assign(&mut a, &b);
                    (hi.is_negative(), &mut a)
                }
                Ordering::Less => {
                    limbs::sub_assign(&mut b, &a);
                    (lo.is_negative(), &mut b)
                }
            }
        };
        Self::normalize(neg, mag, lo.exp as i64).0
    }
}

impl Sub for MpFlt {
    type Output = MpFlt;

    fn sub(self, rhs: MpFlt) -> MpFlt {
        self + -rhs
    }
}

impl Mul for MpFlt {
    type Output = MpFlt;

    fn mul(self, rhs: MpFlt) -> MpFlt {
        let neg = self.is_negative() != rhs.is_negative();
        if self.overflowed() || rhs.overflowed() {
            return Self::overflow(neg);
        }
        if self.is_zero() || rhs.is_zero() {
            return Self::ZERO;
        }
        let mut wide = [0u32; WIDE];
        limbs::mul(&self.mant.limbs, &rhs.mant.limbs, &mut wide);
        Self::normalize(neg, &mut wide, self.exp as i64 + rhs.exp as i64).0
    }
}

impl Neg for MpFlt {
    type Output = MpFlt;

    fn neg(self) -> MpFlt {
        Self {
            mant: -self.mant,
            exp: self.exp,
        }
    }
}

impl FromStr for MpFlt {
    type Err = MpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for MpFlt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.overflowed() {
            return f.write_str("<overflow>");
        }
        let v = self.to_f64();
        if !v.is_finite() || (v == 0.0 && !self.is_zero()) {
            return write!(f, "{}p{}", self.mant, self.exp);
        }
        let magnitude = v.abs();
        if magnitude == 0.0 || (1e-4..1e21).contains(&magnitude) {
            write!(f, "{}", v)
        } else {
            write!(f, "{:e}", v)
        }
    }
}

impl fmt::Debug for MpFlt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MpFlt({})", self)
    }
}
