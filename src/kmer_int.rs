//! Fixed-width unsigned integers holding packed 2-bit k-mers.
//!
//! [`KmerInt`] stores `W` little-endian 64-bit limbs, so a `KmerInt<W>`
//! holds k-mers up to `32 * W - 1` nucleotides. The supported widths are a
//! small closed set, exposed as the [`Kmer32`], [`Kmer64`], [`Kmer96`] and
//! [`Kmer128`] aliases; callers dispatch over them once at their public
//! boundary and everything below is monomorphized.
//!
//! The type deliberately stays away from carrying arithmetic: k-mer
//! encoding only ever multiplies by four (`<< 2`) and ors in a nucleotide
//! code, so shifts, bitwise ops, ordering and the reverse complement are
//! the whole surface.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{BitAnd, BitOr, Shl, Shr};

use serde::de::{self, SeqAccess, Visitor};
use serde::ser::SerializeTuple;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Reverse complement of the 4 nucleotides packed in one byte.
///
/// Entry `b` holds the 2-bit digits of `b` in reverse order, each
/// complemented (`digit ^ 2` under the A=0, C=1, T=2, G=3 alphabet).
const REVCOMP_BYTE: [u8; 256] = {
    let mut table = [0u8; 256];
    let mut b = 0usize;
    while b < 256 {
        let x = b as u8;
        table[b] = (((x & 3) ^ 2) << 6)
            | ((((x >> 2) & 3) ^ 2) << 4)
            | ((((x >> 4) & 3) ^ 2) << 2)
            | (((x >> 6) & 3) ^ 2);
        b += 1;
    }
    table
};

/// Reverse-complement all 32 digit positions of one limb.
#[inline]
fn revcomp_limb(mut x: u64) -> u64 {
    let mut out = 0u64;
    let mut i = 0;
    while i < 8 {
        out = (out << 8) | REVCOMP_BYTE[(x & 0xFF) as usize] as u64;
        x >>= 8;
        i += 1;
    }
    out
}

// ---------------------------------------------------------------------------
// KmerInt
// ---------------------------------------------------------------------------

/// Fixed-width unsigned integer of `W` 64-bit limbs, least significant
/// limb first.
///
/// Ordering and equality are unsigned magnitude. Shifts drop bits falling
/// off either end.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct KmerInt<const W: usize> {
    limbs: [u64; W],
}

/// Width for k up to 31.
pub type Kmer32 = KmerInt<1>;
/// Width for k up to 63.
pub type Kmer64 = KmerInt<2>;
/// Width for k up to 95.
pub type Kmer96 = KmerInt<3>;
/// Width for k up to 127.
pub type Kmer128 = KmerInt<4>;

impl<const W: usize> KmerInt<W> {
    /// The all-zero value.
    pub const ZERO: Self = Self { limbs: [0; W] };

    /// Total width in bits.
    pub const BITS: usize = 64 * W;

    /// Build from a small constant.
    #[inline]
    pub fn from_u64(v: u64) -> Self {
        let mut limbs = [0u64; W];
        limbs[0] = v;
        Self { limbs }
    }

    /// The low 64 bits. Used for lookup-table indexing where the indexed
    /// value is known to fit one limb.
    #[inline]
    pub fn to_u64(self) -> u64 {
        self.limbs[0]
    }

    /// A value with the `bits` lowest bits set.
    pub fn low_mask(bits: usize) -> Self {
        debug_assert!(bits <= Self::BITS);
        let mut limbs = [0u64; W];
        let full = bits / 64;
        let rem = bits % 64;
        for limb in limbs.iter_mut().take(full) {
            *limb = u64::MAX;
        }
        if rem > 0 {
            limbs[full] = (1u64 << rem) - 1;
        }
        Self { limbs }
    }

    /// Whether the value is zero.
    #[inline]
    pub fn is_zero(self) -> bool {
        self.limbs.iter().all(|&l| l == 0)
    }

    /// Reverse complement of the low `k` 2-bit digits.
    ///
    /// Reverses the digit order and complements each digit. Digits above
    /// position `k` must be zero; the result keeps that property.
    ///
    /// Works byte-wise: each limb is passed through [`REVCOMP_BYTE`] with
    /// its bytes reversed, the limb order is reversed, and a final right
    /// shift aligns the `k` meaningful digits back to bit 0.
    pub fn reverse_complement(self, k: usize) -> Self {
        debug_assert!(k >= 1 && k <= 32 * W);
        let mut limbs = [0u64; W];
        for (i, limb) in limbs.iter_mut().enumerate() {
            *limb = revcomp_limb(self.limbs[W - 1 - i]);
        }
        Self { limbs } >> (2 * (32 * W - k))
    }
}

impl<const W: usize> Default for KmerInt<W> {
    fn default() -> Self {
        Self::ZERO
    }
}

impl<const W: usize> From<u64> for KmerInt<W> {
    fn from(v: u64) -> Self {
        Self::from_u64(v)
    }
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

impl<const W: usize> Ord for KmerInt<W> {
    fn cmp(&self, other: &Self) -> Ordering {
        for i in (0..W).rev() {
            match self.limbs[i].cmp(&other.limbs[i]) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        Ordering::Equal
    }
}

impl<const W: usize> PartialOrd for KmerInt<W> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// ---------------------------------------------------------------------------
// Shifts and bitwise ops
// ---------------------------------------------------------------------------

impl<const W: usize> Shl<usize> for KmerInt<W> {
    type Output = Self;

    #[inline]
    fn shl(self, n: usize) -> Self {
        if n >= Self::BITS {
            return Self::ZERO;
        }
        let limb_off = n / 64;
        let bit_off = n % 64;
        let mut limbs = [0u64; W];
        for i in (limb_off..W).rev() {
            let src = i - limb_off;
            let mut v = self.limbs[src] << bit_off;
            if bit_off > 0 && src > 0 {
                v |= self.limbs[src - 1] >> (64 - bit_off);
            }
            limbs[i] = v;
        }
        Self { limbs }
    }
}

impl<const W: usize> Shr<usize> for KmerInt<W> {
    type Output = Self;

    #[inline]
    fn shr(self, n: usize) -> Self {
        if n >= Self::BITS {
            return Self::ZERO;
        }
        let limb_off = n / 64;
        let bit_off = n % 64;
        let mut limbs = [0u64; W];
        for i in 0..W - limb_off {
            let src = i + limb_off;
            let mut v = self.limbs[src] >> bit_off;
            if bit_off > 0 && src + 1 < W {
                v |= self.limbs[src + 1] << (64 - bit_off);
            }
            limbs[i] = v;
        }
        Self { limbs }
    }
}

impl<const W: usize> BitAnd for KmerInt<W> {
    type Output = Self;

    #[inline]
    fn bitand(self, rhs: Self) -> Self {
        let mut limbs = [0u64; W];
        for i in 0..W {
            limbs[i] = self.limbs[i] & rhs.limbs[i];
        }
        Self { limbs }
    }
}

impl<const W: usize> BitOr for KmerInt<W> {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        let mut limbs = [0u64; W];
        for i in 0..W {
            limbs[i] = self.limbs[i] | rhs.limbs[i];
        }
        Self { limbs }
    }
}

impl<const W: usize> BitAnd<u64> for KmerInt<W> {
    type Output = Self;

    #[inline]
    fn bitand(self, rhs: u64) -> Self {
        let mut limbs = [0u64; W];
        limbs[0] = self.limbs[0] & rhs;
        Self { limbs }
    }
}

impl<const W: usize> BitOr<u64> for KmerInt<W> {
    type Output = Self;

    #[inline]
    fn bitor(mut self, rhs: u64) -> Self {
        self.limbs[0] |= rhs;
        self
    }
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

impl<const W: usize> fmt::Debug for KmerInt<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KmerInt(0x")?;
        for i in (0..W).rev() {
            write!(f, "{:016x}", self.limbs[i])?;
        }
        write!(f, ")")
    }
}

impl<const W: usize> fmt::Display for KmerInt<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x")?;
        for i in (0..W).rev() {
            write!(f, "{:016x}", self.limbs[i])?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Serde
// ---------------------------------------------------------------------------

// Const-generic arrays do not get derived serde impls, so the limbs are
// written out as a fixed-length tuple by hand.

impl<const W: usize> Serialize for KmerInt<W> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tup = serializer.serialize_tuple(W)?;
        for limb in &self.limbs {
            tup.serialize_element(limb)?;
        }
        tup.end()
    }
}

impl<'de, const W: usize> Deserialize<'de> for KmerInt<W> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct LimbVisitor<const W: usize>;

        impl<'de, const W: usize> Visitor<'de> for LimbVisitor<W> {
            type Value = KmerInt<W>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{} little-endian u64 limbs", W)
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut limbs = [0u64; W];
                for (i, limb) in limbs.iter_mut().enumerate() {
                    *limb = seq
                        .next_element()?
                        .ok_or_else(|| de::Error::invalid_length(i, &self))?;
                }
                Ok(KmerInt { limbs })
            }
        }

        deserializer.deserialize_tuple(W, LimbVisitor::<W>)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_to_u64() {
        let x = Kmer64::from_u64(0xDEAD_BEEF);
        assert_eq!(x.to_u64(), 0xDEAD_BEEF);
        assert!(Kmer64::ZERO.is_zero());
        assert!(!x.is_zero());
    }

    #[test]
    fn test_low_mask() {
        assert_eq!(Kmer32::low_mask(6).to_u64(), 0b11_1111);
        assert_eq!(Kmer32::low_mask(0), Kmer32::ZERO);
        // Mask spanning a limb boundary.
        let m = Kmer64::low_mask(70);
        assert_eq!(m.to_u64(), u64::MAX);
        assert_eq!((m >> 64).to_u64(), 0b11_1111);
    }

    #[test]
    fn test_shift_across_limbs() {
        let x = Kmer64::from_u64(1) << 70;
        assert_eq!(x.to_u64(), 0);
        assert_eq!((x >> 70).to_u64(), 1);
        assert_eq!((x >> 64).to_u64(), 1 << 6);
        // Shifting by the full width drains the value.
        assert!((x << 128).is_zero());
        assert!((x >> 128).is_zero());
    }

    #[test]
    fn test_ordering_is_magnitude() {
        let small = Kmer64::from_u64(u64::MAX);
        let big = Kmer64::from_u64(1) << 64;
        assert!(small < big);
        assert_eq!(small.min(big), small);
        assert_eq!(small.cmp(&small), Ordering::Equal);
    }

    #[test]
    fn test_bit_ops() {
        let a = Kmer64::low_mask(10);
        let b = Kmer64::from_u64(0b1100) << 64;
        assert_eq!((a & b), Kmer64::ZERO);
        assert_eq!(((a | b) >> 64).to_u64(), 0b1100);
        assert_eq!((a | 0b1u64).to_u64(), a.to_u64());
        assert_eq!((a & 0b111u64).to_u64(), 0b111);
        assert!(((a | b) & 0xFFu64) < (a | b));
    }

    #[test]
    fn test_revcomp_known_value() {
        // "CAT" = C,A,T = 0b01_00_10 = 18; its reverse complement is
        // "ATG" = A,T,G = 0b00_10_11 = 11.
        let cat = Kmer32::from_u64(18);
        assert_eq!(cat.reverse_complement(3).to_u64(), 11);
    }

    #[test]
    fn test_revcomp_involution() {
        for k in [3usize, 15, 31] {
            for v in [0u64, 1, 18, 0x3FFF, 0xABCD_EF01] {
                let x = Kmer32::from_u64(v & ((1 << (2 * k)) - 1));
                assert_eq!(x.reverse_complement(k).reverse_complement(k), x);
            }
        }
    }

    #[test]
    fn test_revcomp_multi_limb() {
        // A k=40 value: digits above the low limb participate.
        let k = 40usize;
        let x = (Kmer128::from_u64(0x1234_5678) << 50) | 0b10u64;
        let masked = x & Kmer128::low_mask(2 * k);
        let rc = masked.reverse_complement(k);
        assert_eq!(rc.reverse_complement(k), masked);
        // The last digit of x ("T") becomes the complemented first digit
        // ("A") of the reverse complement.
        assert_eq!((rc >> (2 * (k - 1))).to_u64() & 3, 0);
    }

    #[test]
    fn test_serde_roundtrip() {
        let x = (Kmer96::from_u64(0xFACE) << 100) | 0x42u64;
        let json = serde_json::to_string(&x).unwrap();
        let back: Kmer96 = serde_json::from_str(&json).unwrap();
        assert_eq!(back, x);
    }

    #[test]
    fn test_display_hex() {
        let x = Kmer32::from_u64(0xAB);
        assert_eq!(format!("{x}"), "0x00000000000000ab");
    }
}
