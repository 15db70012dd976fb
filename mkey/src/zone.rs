//! Bit-set of the keys held down in one MKEY zone.

/// Maximum number of keys in one zone.
pub const MAX_ZONE_KEYS: usize = 8;

/// Set of zone key indices `0..N`, bit `i` represents key `i`.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ZoneSet<const N: usize>(u8);

impl<const N: usize> ZoneSet<N> {
    const MASK: u8 = if N >= MAX_ZONE_KEYS { u8::MAX } else { (1u8 << N) - 1 };

    pub const fn new() -> Self {
        Self(0)
    }

    const fn in_zone(index: u8) -> bool {
        (index as usize) < N && (index as usize) < MAX_ZONE_KEYS
    }

    /// Create a set from a raw pattern, bits above `N` are dropped
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & Self::MASK)
    }

    pub const fn bits(&self) -> u8 {
        self.0
    }

    pub const fn contains(&self, index: u8) -> bool {
        Self::in_zone(index) && self.0 & (1 << index) != 0
    }

    pub fn add(&mut self, index: u8) {
        if Self::in_zone(index) {
            self.0 |= 1 << index;
        }
    }

    pub fn remove(&mut self, index: u8) {
        if Self::in_zone(index) {
            self.0 &= !(1 << index);
        }
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub const fn is_full(&self) -> bool {
        self.0 == Self::MASK
    }

    pub const fn len(&self) -> u32 {
        self.0.count_ones()
    }

    /// Index of the only key in the set, `None` if the set is empty or has more than one key
    pub const fn sole_member(&self) -> Option<u8> {
        if self.0.count_ones() == 1 {
            Some(self.0.trailing_zeros() as u8)
        } else {
            None
        }
    }
}
