//! # Signatures
//!
//! A signature records which component kinds an entity carries.
//!
//! ```text
//! byte:   [   0    ][   1    ] ...
//! bit:     76543210  76543210
//! kind:    87654321  ...     9
//! ```
//!
//! Bit `i` stands for [`ComponentKind`] `i + 1`. A world with `K` registered
//! kinds uses signatures of `⌈K/8⌉` bytes; growing a signature always
//! zero-extends, so existing bits keep their meaning.
//!
//! Signatures of different widths can be combined freely. Missing trailing
//! bytes read as zero.

use std::fmt;

use super::component::ComponentKind;

/// Number of bytes needed to hold `kind_count` kinds.
#[inline]
#[must_use]
pub const fn width_for(kind_count: usize) -> usize {
    kind_count.div_ceil(8)
}

/// Growable bitset of component kinds.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Signature {
    /// One bit per kind, little-endian within each byte.
    bytes: Vec<u8>,
}

impl Signature {
    /// Creates an all-zero signature `width` bytes wide.
    #[must_use]
    pub fn zero(width: usize) -> Self {
        Self {
            bytes: vec![0; width],
        }
    }

    /// Creates a signature with exactly one bit per supplied kind.
    ///
    /// Duplicates are no-ops. The signature is at least `width` bytes wide and
    /// grows if a kind does not fit.
    #[must_use]
    pub fn from_kinds<I>(width: usize, kinds: I) -> Self
    where
        I: IntoIterator<Item = ComponentKind>,
    {
        let mut signature = Self::zero(width);
        for kind in kinds {
            signature.set(kind);
        }
        signature
    }

    /// Creates a signature from raw 1-based kind ids.
    ///
    /// Id `0` is the reserved "unregistered" id and is skipped.
    #[must_use]
    pub fn from_ids<I>(width: usize, ids: I) -> Self
    where
        I: IntoIterator<Item = u32>,
    {
        Self::from_kinds(width, ids.into_iter().filter_map(ComponentKind::from_raw))
    }

    /// Width in bytes.
    #[inline]
    #[must_use]
    pub fn width(&self) -> usize {
        self.bytes.len()
    }

    /// Raw bytes of the signature.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Checks whether no bit is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.iter().all(|b| *b == 0)
    }

    /// Grows the signature to `width` bytes, zero-filling the new bytes.
    ///
    /// Requests to shrink are ignored.
    pub fn resize(&mut self, width: usize) {
        if width > self.bytes.len() {
            self.bytes.resize(width, 0);
        }
    }

    /// Sets the bit for `kind`, growing the signature if needed.
    pub fn set(&mut self, kind: ComponentKind) {
        let (byte, mask) = Self::locate(kind);
        self.resize(byte + 1);
        self.bytes[byte] |= mask;
    }

    /// Clears the bit for `kind`.
    pub fn clear(&mut self, kind: ComponentKind) {
        let (byte, mask) = Self::locate(kind);
        if let Some(b) = self.bytes.get_mut(byte) {
            *b &= !mask;
        }
    }

    /// Checks whether the bit for `kind` is set.
    #[must_use]
    pub fn contains(&self, kind: ComponentKind) -> bool {
        let (byte, mask) = Self::locate(kind);
        self.bytes.get(byte).is_some_and(|b| b & mask != 0)
    }

    /// `self |= other`.
    pub fn union(&mut self, other: &Self) {
        self.resize(other.width());
        for (dst, src) in self.bytes.iter_mut().zip(&other.bytes) {
            *dst |= src;
        }
    }

    /// `self &= !other`.
    pub fn difference(&mut self, other: &Self) {
        for (dst, src) in self.bytes.iter_mut().zip(&other.bytes) {
            *dst &= !src;
        }
    }

    /// Superset test: every bit of `query` is also set in `self`.
    ///
    /// This is the matching rule for filters. An empty query matches every
    /// signature.
    #[must_use]
    pub fn matches(&self, query: &Self) -> bool {
        query
            .bytes
            .iter()
            .enumerate()
            .all(|(i, q)| self.byte(i) & q == *q)
    }

    /// Overlap test: at least one bit is set in both signatures.
    ///
    /// Only used for exclusion filters. It is not a substitute for
    /// [`Signature::matches`].
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.bytes
            .iter()
            .zip(&other.bytes)
            .any(|(a, b)| a & b != 0)
    }

    /// Iterates over the kinds whose bit is set, in ascending order.
    pub fn kinds(&self) -> impl Iterator<Item = ComponentKind> + '_ {
        self.bytes.iter().enumerate().flat_map(|(byte, bits)| {
            (0..8u32)
                .filter(move |bit| bits & (1 << bit) != 0)
                .filter_map(move |bit| {
                    let id = u32::try_from(byte).ok()? * 8 + bit + 1;
                    ComponentKind::from_raw(id)
                })
        })
    }

    #[inline]
    fn byte(&self, index: usize) -> u8 {
        self.bytes.get(index).copied().unwrap_or(0)
    }

    #[inline]
    fn locate(kind: ComponentKind) -> (usize, u8) {
        let bit = kind.index();
        (bit / 8, 1 << (bit % 8))
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Signature(")?;
        // Highest byte first so the string reads like a binary number.
        for (i, byte) in self.bytes.iter().rev().enumerate() {
            if i > 0 {
                f.write_str("_")?;
            }
            write!(f, "{byte:08b}")?;
        }
        f.write_str(")")
    }
}
