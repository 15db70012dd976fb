//! Dispatch tables of the MKEY state machine.
//!
//! All tables are immutable once the [`crate::processor::MkeyProcessor`] is created. Every entry may be
//! [`MkeyCode::No`], which means "take no action".

mod chord;

use core::fmt;

pub use chord::ChordLayers;
use mkey_types::action::{GenericModifier, MkeyCode};
use mkey_types::keycode::HidKeyCode;

use crate::zone::{MAX_ZONE_KEYS, ZoneSet};

/// Maximum number of layers, including layer 0
pub const MAX_LAYER_NUM: usize = 32;

/// Config of the MKEY state machine, `N` is the number of keys in each zone.
#[derive(Clone, Debug)]
pub struct MkeyConfig<const N: usize, const NUM_LAYER: usize> {
    /// Tapped when a single primary key is released without any other key pressed
    pub tap: [MkeyCode; N],
    /// Held while a single primary key is held and typing keys are pressed
    pub hold: [MkeyCode; N],
    /// Row per primary key, column per secondary key
    pub modified: [[MkeyCode; N]; N],
    /// Sent when a secondary key is pressed while a chord of primary keys is held
    pub chord_action: [MkeyCode; N],
    /// Row per sticky primary key, column per primary key pressed again while secondary keys are held
    pub nested: [[MkeyCode; N]; N],
    /// Tapped when a layer becomes active
    pub layer_enter: [MkeyCode; NUM_LAYER],
    /// Tapped when a layer is left
    pub layer_exit: [MkeyCode; NUM_LAYER],
    /// Overlay layer selected by each chord of primary keys
    pub chord_layers: ChordLayers<N>,
    /// The overlay layer selected at start up
    pub initial_layer: u8,
}

impl<const N: usize, const NUM_LAYER: usize> MkeyConfig<N, NUM_LAYER> {
    /// Create a config in which no key does anything
    pub const fn new() -> Self {
        Self {
            tap: [MkeyCode::No; N],
            hold: [MkeyCode::No; N],
            modified: [[MkeyCode::No; N]; N],
            chord_action: [MkeyCode::No; N],
            nested: [[MkeyCode::No; N]; N],
            layer_enter: [MkeyCode::No; NUM_LAYER],
            layer_exit: [MkeyCode::No; NUM_LAYER],
            chord_layers: ChordLayers::new(),
            initial_layer: 0,
        }
    }

    /// Check the table shapes and the chord lookup, should be done once before the config is used
    pub fn validate(&self) -> Result<(), MkeyConfigError> {
        if !(2..=MAX_ZONE_KEYS).contains(&N) {
            return Err(MkeyConfigError::ZoneWidth(N));
        }
        if !(2..=MAX_LAYER_NUM).contains(&NUM_LAYER) {
            return Err(MkeyConfigError::LayerNum(NUM_LAYER));
        }
        if self.initial_layer as usize >= NUM_LAYER {
            return Err(MkeyConfigError::InvalidLayer {
                chord: None,
                layer: self.initial_layer,
            });
        }
        for (bits, layer) in self.chord_layers.entries() {
            let chord = ZoneSet::<N>::from_bits(bits);
            if chord.bits() != bits || chord.len() < 2 {
                return Err(MkeyConfigError::NotAChord(bits));
            }
            if layer == 0 || layer as usize >= NUM_LAYER {
                return Err(MkeyConfigError::InvalidLayer {
                    chord: Some(bits),
                    layer,
                });
            }
        }
        Ok(())
    }
}

/// Same as [`MkeyConfig::new`], see [`MkeyConfig::ortho_4x12`] for a usable config
impl<const N: usize, const NUM_LAYER: usize> Default for MkeyConfig<N, NUM_LAYER> {
    fn default() -> Self {
        Self::new()
    }
}

impl MkeyConfig<4, 4> {
    /// Reference config for a 12x4 ortholinear board: the outer columns are the two zones,
    /// layer 1 is QWERTY, layer 2 holds the overflow punctuation and layer 3 is a numeric keypad.
    pub fn ortho_4x12() -> Self {
        use GenericModifier::*;
        use HidKeyCode::*;
        let k = MkeyCode::Key;
        let m = MkeyCode::Modifier;
        Self {
            tap: [k(Space), k(Enter), k(Tab), k(Backspace)],
            hold: [m(Shift), m(Ctrl), m(Alt), m(Gui)],
            modified: [
                // Shifted functions of the secondary keys
                [k(CapsLock), k(Escape), k(Insert), k(Delete)],
                // The 2nd and 3rd primary keys turn the secondary keys into modifiers
                [m(Shift), m(Ctrl), m(Alt), m(Gui)],
                [m(Shift), m(Ctrl), m(Alt), m(Gui)],
                // Arrows
                [k(Down), k(Left), k(Right), k(Up)],
            ],
            chord_action: [MkeyCode::LayerLock, MkeyCode::No, MkeyCode::No, MkeyCode::No],
            nested: [
                [MkeyCode::No; 4],
                [k(Space), k(Enter), k(Tab), k(Backspace)],
                [k(CapsLock), k(Escape), k(Insert), k(Delete)],
                [MkeyCode::No; 4],
            ],
            layer_enter: [MkeyCode::No, MkeyCode::No, MkeyCode::No, MkeyCode::NumLockOn],
            layer_exit: [MkeyCode::No; 4],
            chord_layers: ChordLayers::new()
                .with_chord(&[0, 1], 1)
                .with_chord(&[1, 2], 2)
                .with_chord(&[2, 3], 3),
            initial_layer: 1,
        }
    }
}

/// Reasons for rejecting a [`MkeyConfig`]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MkeyConfigError {
    /// Zone width must be 2..=8
    ZoneWidth(usize),
    /// Layer number must be 2..=32
    LayerNum(usize),
    /// A layer is assigned to a pattern with fewer than two keys, or with keys outside the zone
    NotAChord(u8),
    /// Layer out of range, `chord` is `None` for the initial layer
    InvalidLayer { chord: Option<u8>, layer: u8 },
}

impl fmt::Display for MkeyConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MkeyConfigError::ZoneWidth(n) => write!(f, "zone width {} is not in 2..={}", n, MAX_ZONE_KEYS),
            MkeyConfigError::LayerNum(n) => write!(f, "layer number {} is not in 2..={}", n, MAX_LAYER_NUM),
            MkeyConfigError::NotAChord(bits) => {
                write!(f, "pattern {:#010b} is not a chord of two or more zone keys", bits)
            }
            MkeyConfigError::InvalidLayer { chord: Some(bits), layer } => {
                write!(f, "chord {:#010b} selects invalid layer {}", bits, layer)
            }
            MkeyConfigError::InvalidLayer { chord: None, layer } => {
                write!(f, "initial layer {} is out of range", layer)
            }
        }
    }
}

impl core::error::Error for MkeyConfigError {}
