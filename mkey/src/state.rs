use mkey_types::action::ZoneSide;

use crate::zone::ZoneSet;

/// Interpretation mode of the MKEY state machine
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// M0: no zone key is held
    #[default]
    Idle,
    /// M1: one primary key is held, a tap is pending
    Single,
    /// M2: a typing key was pressed while one primary key is held, the hold modifier is applied
    Hold,
    /// M3: a secondary key was pressed while one primary key is held
    Modified,
    /// M4: a chord of primary keys is held and selects an overlay layer
    Chord,
    /// M5: a secondary key was pressed while a chord of primary keys is held
    ChordAction,
    /// M6: the primary key was released while secondary keys are still held
    Dormant,
    /// M7: a primary key was pressed again under held secondary keys
    Nested,
}

/// State of one MKEY episode, from the first zone key press to the release of all zone keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Session<const N: usize> {
    /// The zone playing the primary role, fixed by the first zone key pressed
    pub(crate) primary_side: Option<ZoneSide>,
    pub(crate) mode: Mode,
    /// Held keys of the primary zone
    pub(crate) primary: ZoneSet<N>,
    /// Held keys of the secondary zone
    pub(crate) secondary: ZoneSet<N>,
    /// The primary key that started the episode, row index of the `modified` and `nested` tables
    pub(crate) saved_index: Option<u8>,
}

impl<const N: usize> Session<N> {
    pub const fn new() -> Self {
        Self {
            primary_side: None,
            mode: Mode::Idle,
            primary: ZoneSet::new(),
            secondary: ZoneSet::new(),
            saved_index: None,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn primary_side(&self) -> Option<ZoneSide> {
        self.primary_side
    }

    pub fn secondary_side(&self) -> Option<ZoneSide> {
        self.primary_side.map(ZoneSide::opposite)
    }

    pub fn primary_keys(&self) -> ZoneSet<N> {
        self.primary
    }

    pub fn secondary_keys(&self) -> ZoneSet<N> {
        self.secondary
    }

    pub fn saved_index(&self) -> Option<u8> {
        self.saved_index
    }

    /// Side whose left/right modifier variants are used.
    ///
    /// Once secondary keys act as modifiers (M3, M6, M7) that's the secondary side, otherwise the primary side.
    /// Outside an episode it falls back to the left side.
    pub fn modifier_side(&self) -> ZoneSide {
        let side = match self.mode {
            Mode::Modified | Mode::Dormant | Mode::Nested => self.secondary_side(),
            _ => self.primary_side,
        };
        side.unwrap_or(ZoneSide::Left)
    }

    /// Both zones are released
    pub fn is_released(&self) -> bool {
        self.primary.is_empty() && self.secondary.is_empty()
    }

    pub(crate) fn set_mode(&mut self, mode: Mode) {
        if self.mode != mode {
            debug!("MKEY mode {:?} -> {:?}", self.mode, mode);
            self.mode = mode;
        }
    }

    /// End the episode, the next zone key pressed becomes primary
    pub(crate) fn reset(&mut self) {
        self.set_mode(Mode::Idle);
        self.primary_side = None;
        self.primary = ZoneSet::new();
        self.secondary = ZoneSet::new();
        self.saved_index = None;
    }
}
