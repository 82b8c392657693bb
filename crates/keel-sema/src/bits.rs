// bits.rs
//
// Fixed 160-bit set over small integer universes (variable numbers in the
// flow passes). Value semantics only: every operation returns a new set.

use std::fmt;
use std::ops::{BitAnd, BitOr, Not};

/// Number of 32-bit words in a set.
pub const BITS_WORDS: usize = 5;
/// Size of the universe a set can index.
pub const NVAR: usize = BITS_WORDS * 32;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Bits([u32; BITS_WORDS]);

#[inline]
fn locate(i: usize) -> (usize, u32) {
    assert!(i < NVAR, "bit index {i} outside the {NVAR}-bit universe");
    (i / 32, 1 << (i % 32))
}

impl Bits {
    pub const ZERO: Bits = Bits([0; BITS_WORDS]);

    /// The set `{i}`.
    ///
    /// # Panics
    /// If `i >= NVAR`.
    pub fn single_bit_mask(i: usize) -> Bits {
        let (word, mask) = locate(i);
        let mut bits = Self::ZERO;
        bits.0[word] = mask;
        bits
    }

    pub fn union(self, other: Bits) -> Bits {
        Bits(std::array::from_fn(|w| self.0[w] | other.0[w]))
    }

    pub fn intersect(self, other: Bits) -> Bits {
        Bits(std::array::from_fn(|w| self.0[w] & other.0[w]))
    }

    pub fn complement(self) -> Bits {
        Bits(self.0.map(|w| !w))
    }

    /// # Panics
    /// If `i >= NVAR`.
    pub fn is_member(&self, i: usize) -> bool {
        let (word, mask) = locate(i);
        self.0[word] & mask != 0
    }

    pub fn count_set(&self) -> u32 {
        self.0.iter().map(|w| w.count_ones()).sum()
    }

    pub fn any_set(&self) -> bool {
        self.0.iter().any(|&w| w != 0)
    }

    /// Lowest member, if any.
    pub fn first_set(&self) -> Option<usize> {
        self.0
            .iter()
            .enumerate()
            .find(|(_, w)| **w != 0)
            .map(|(i, w)| i * 32 + w.trailing_zeros() as usize)
    }

    pub fn insert(&mut self, i: usize) {
        let (word, mask) = locate(i);
        self.0[word] |= mask;
    }

    pub fn remove(&mut self, i: usize) {
        let (word, mask) = locate(i);
        self.0[word] &= !mask;
    }

    /// Members in increasing order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        (0..NVAR).filter(|&i| self.is_member(i))
    }
}

impl BitOr for Bits {
    type Output = Bits;

    fn bitor(self, rhs: Bits) -> Bits {
        self.union(rhs)
    }
}

impl BitAnd for Bits {
    type Output = Bits;

    fn bitand(self, rhs: Bits) -> Bits {
        self.intersect(rhs)
    }
}

impl Not for Bits {
    type Output = Bits;

    fn not(self) -> Bits {
        self.complement()
    }
}

impl FromIterator<usize> for Bits {
    fn from_iter<T: IntoIterator<Item = usize>>(iter: T) -> Self {
        let mut bits = Bits::ZERO;
        for i in iter {
            bits.insert(i);
        }
        bits
    }
}

impl fmt::Display for Bits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (n, i) in self.iter().enumerate() {
            if n > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{i}")?;
        }
        f.write_str("}")
    }
}

impl fmt::Debug for Bits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bits{self}")
    }
}
