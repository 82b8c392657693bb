//! Fixed-capacity exact arithmetic for compile-time constants.
//!
//! [`MpInt`] is a sign-magnitude integer of [`MP_PREC`] limbs holding
//! [`MP_SCALE`] bits each. Results that do not fit set a sticky overflow flag
//! instead of wrapping; any operation with an overflowed operand yields an
//! overflowed result. [`MpFlt`] pairs an `MpInt` mantissa with a binary
//! exponent and is renormalized after every operation so that exactly
//! [`MP_NORM`] limbs are significant.

mod error;
mod flt;
mod int;
mod limbs;

pub use error::MpError;
pub use flt::MpFlt;
pub use int::MpInt;

/// Bits per limb. Small enough that a limb product fits in a `u64`.
pub const MP_SCALE: u32 = 29;
/// Limbs per integer.
pub const MP_PREC: usize = 16;
/// Significant limbs in a normalized float mantissa.
pub const MP_NORM: usize = MP_PREC - 1;
/// Largest integer magnitude, in bits.
pub const MP_BITS: u32 = MP_SCALE * MP_PREC as u32;
