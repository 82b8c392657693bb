// limbs.rs
//
// Unsigned magnitude arithmetic over little-endian limb slices. Every limb
// holds MP_SCALE bits; the upper bits of each u32 are always zero.

use std::cmp::Ordering;

use crate::MP_SCALE;

pub(crate) const MASK: u32 = (1 << MP_SCALE) - 1;

pub(crate) fn is_zero(a: &[u32]) -> bool {
    a.iter().all(|&limb| limb == 0)
}

/// Number of significant bits.
pub(crate) fn bit_len(a: &[u32]) -> u32 {
    for (i, &limb) in a.iter().enumerate().rev() {
        if limb != 0 {
            return i as u32 * MP_SCALE + (u32::BITS - limb.leading_zeros());
        }
    }
    0
}

pub(crate) fn get_bit(a: &[u32], bit: u32) -> bool {
    let limb = (bit / MP_SCALE) as usize;
    a.get(limb).is_some_and(|&l| l >> (bit % MP_SCALE) & 1 == 1)
}

pub(crate) fn set_bit(a: &mut [u32], bit: u32) {
    a[(bit / MP_SCALE) as usize] |= 1 << (bit % MP_SCALE);
}

pub(crate) fn cmp(a: &[u32], b: &[u32]) -> Ordering {
    for i in (0..a.len().max(b.len())).rev() {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        if x != y {
            return x.cmp(&y);
        }
    }
    Ordering::Equal
}

/// `a += b`. Returns true if the sum did not fit in `a`.
pub(crate) fn add_assign(a: &mut [u32], b: &[u32]) -> bool {
    let mut carry = 0u32;
    for (i, limb) in a.iter_mut().enumerate() {
        let sum = *limb + b.get(i).copied().unwrap_or(0) + carry;
        *limb = sum & MASK;
        carry = sum >> MP_SCALE;
    }
    carry != 0 || b.iter().skip(a.len()).any(|&l| l != 0)
}

/// `a -= b`. Requires `a >= b`.
pub(crate) fn sub_assign(a: &mut [u32], b: &[u32]) {
    debug_assert!(cmp(a, b) != Ordering::Less);
    let mut borrow = 0i64;
    for (i, limb) in a.iter_mut().enumerate() {
        let mut diff = *limb as i64 - b.get(i).copied().unwrap_or(0) as i64 - borrow;
        borrow = 0;
        if diff < 0 {
            diff += 1 << MP_SCALE;
            borrow = 1;
        }
        *limb = diff as u32;
    }
    debug_assert_eq!(borrow, 0);
}

/// `out = a * b`. Returns true if the product did not fit in `out`.
pub(crate) fn mul(a: &[u32], b: &[u32], out: &mut [u32]) -> bool {
    out.fill(0);
    let mut lost = false;
    for (i, &x) in a.iter().enumerate() {
        if x == 0 {
            continue;
        }
        let mut carry = 0u64;
        for (j, &y) in b.iter().enumerate() {
            let k = i + j;
            let current = out.get(k).copied().unwrap_or(0) as u64;
            let cur = x as u64 * y as u64 + carry + current;
            match out.get_mut(k) {
                Some(slot) => *slot = (cur & MASK as u64) as u32,
                None => lost |= cur & MASK as u64 != 0,
            }
            carry = cur >> MP_SCALE;
        }
        let mut k = i + b.len();
        while carry != 0 {
            let Some(slot) = out.get_mut(k) else {
                lost = true;
                break;
            };
            let cur = *slot as u64 + carry;
            *slot = (cur & MASK as u64) as u32;
            carry = cur >> MP_SCALE;
            k += 1;
        }
    }
    lost
}

/// `a = a * m + add` for small factors. Returns true on overflow.
pub(crate) fn mul_small_add(a: &mut [u32], m: u32, add: u32) -> bool {
    let mut carry = add as u64;
    for limb in a.iter_mut() {
        let cur = *limb as u64 * m as u64 + carry;
        *limb = (cur & MASK as u64) as u32;
        carry = cur >> MP_SCALE;
    }
    carry != 0
}

/// `a /= d` for small divisors, returning the remainder.
pub(crate) fn div_small(a: &mut [u32], d: u32) -> u32 {
    debug_assert!(d != 0);
    let mut rem = 0u64;
    for limb in a.iter_mut().rev() {
        let cur = (rem << MP_SCALE) | *limb as u64;
        *limb = (cur / d as u64) as u32;
        rem = cur % d as u64;
    }
    rem as u32
}

/// Shift left by `bits`. Returns true if set bits were shifted out.
pub(crate) fn shl_assign(a: &mut [u32], bits: u32) -> bool {
    if bits == 0 {
        return false;
    }
    let capacity = a.len() as u64 * MP_SCALE as u64;
    let len = bit_len(a) as u64;
    let lost = len != 0 && len + bits as u64 > capacity;

    let limbs = (bits / MP_SCALE) as usize;
    let rem = bits % MP_SCALE;
    let mut out = vec![0u32; a.len()];
    for (i, &limb) in a.iter().enumerate() {
        let wide = (limb as u64) << rem;
        if let Some(slot) = out.get_mut(i + limbs) {
            *slot |= (wide & MASK as u64) as u32;
        }
        if let Some(slot) = out.get_mut(i + limbs + 1) {
            *slot |= (wide >> MP_SCALE) as u32;
        }
    }
    a.copy_from_slice(&out);
    lost
}

/// Shift right by `bits`. Returns true if set bits were shifted out.
pub(crate) fn shr_assign(a: &mut [u32], bits: u32) -> bool {
    if bits == 0 {
        return false;
    }
    let limbs = (bits / MP_SCALE) as usize;
    let rem = bits % MP_SCALE;
    let lost = a.iter().take(limbs).any(|&l| l != 0)
        || a.get(limbs).is_some_and(|&l| l & ((1 << rem) - 1) != 0);

    let mut out = vec![0u32; a.len()];
    for (i, slot) in out.iter_mut().enumerate() {
        let lo = a.get(i + limbs).copied().unwrap_or(0) >> rem;
        let hi = if rem == 0 {
            0
        } else {
            (a.get(i + limbs + 1).copied().unwrap_or(0) << (MP_SCALE - rem)) & MASK
        };
        *slot = lo | hi;
    }
    a.copy_from_slice(&out);
    lost
}

/// Schoolbook binary long division: returns `(n / d, n % d)`.
pub(crate) fn divmod(n: &[u32], d: &[u32]) -> (Vec<u32>, Vec<u32>) {
    debug_assert!(!is_zero(d));
    let mut quotient = vec![0u32; n.len()];
    let mut rem = vec![0u32; d.len() + 1];
    for bit in (0..bit_len(n)).rev() {
        shl_assign(&mut rem, 1);
        if get_bit(n, bit) {
            rem[0] |= 1;
        }
        if cmp(&rem, d) != Ordering::Less {
            sub_assign(&mut rem, d);
            set_bit(&mut quotient, bit);
        }
    }
    (quotient, rem)
}
