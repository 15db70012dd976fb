use crate::zone::{MAX_ZONE_KEYS, ZoneSet};

const TABLE_SIZE: usize = 1 << MAX_ZONE_KEYS;

/// Lookup from a chord of primary keys to the overlay layer it selects.
///
/// Indexed by the bit pattern of the held primary keys. Only patterns with two or more keys can
/// select a layer, [`super::MkeyConfig::validate`] rejects anything else.
#[derive(Clone, Debug)]
pub struct ChordLayers<const N: usize> {
    table: [Option<u8>; TABLE_SIZE],
}

impl<const N: usize> ChordLayers<N> {
    pub const fn new() -> Self {
        Self {
            table: [None; TABLE_SIZE],
        }
    }

    /// Build the lookup from `(pattern, layer)` pairs
    pub const fn from_table(entries: &[(u8, u8)]) -> Self {
        let mut table = [None; TABLE_SIZE];
        let mut i = 0;
        while i < entries.len() {
            table[entries[i].0 as usize] = Some(entries[i].1);
            i += 1;
        }
        Self { table }
    }

    /// Assign `layer` to the chord made of `keys`
    pub const fn with_chord(mut self, keys: &[u8], layer: u8) -> Self {
        let mut bits = 0u8;
        let mut i = 0;
        while i < keys.len() {
            if (keys[i] as usize) < MAX_ZONE_KEYS {
                bits |= 1 << keys[i];
            }
            i += 1;
        }
        self.table[bits as usize] = Some(layer);
        self
    }

    /// The layer selected by `chord`, `None` if the chord selects nothing
    pub fn layer_for(&self, chord: ZoneSet<N>) -> Option<u8> {
        self.table[chord.bits() as usize]
    }

    /// All assigned `(pattern, layer)` pairs
    pub fn entries(&self) -> impl Iterator<Item = (u8, u8)> + '_ {
        self.table
            .iter()
            .enumerate()
            .filter_map(|(bits, layer)| layer.map(|l| (bits as u8, l)))
    }
}

impl<const N: usize> Default for ChordLayers<N> {
    fn default() -> Self {
        Self::new()
    }
}
