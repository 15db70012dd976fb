//! The MKEY interpretation state machine.
//!
//! [`transition`] consumes one [`MkeyEvent`], updates the [`Session`] and returns what should be done as a list
//! of [`Intent`]s. It performs no action by itself, [`crate::processor::MkeyProcessor`] executes the intents.

use heapless::Vec;
use mkey_types::action::{MkeyCode, ZoneSide};

use crate::config::MkeyConfig;
use crate::state::{Mode, Session};

/// Input of the state machine
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MkeyEvent {
    /// A key of one of the two zones is pressed or released
    Zone { index: u8, side: ZoneSide, pressed: bool },
    /// A typing key, i.e. any key outside both zones, is pressed or released
    Typing { pressed: bool },
    /// A key whose keymap entry is an MKEY code, e.g. a dedicated layer lock key
    Direct { code: MkeyCode, pressed: bool },
}

impl MkeyEvent {
    pub const fn zone(index: u8, side: ZoneSide, pressed: bool) -> Self {
        MkeyEvent::Zone { index, side, pressed }
    }
}

/// An action decided by the state machine.
///
/// Each intent records the side whose modifiers apply, as it was when the intent was made.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Intent {
    Register(MkeyCode, ZoneSide),
    Unregister(MkeyCode, ZoneSide),
    Tap(MkeyCode, ZoneSide),
    /// Switch to the given overlay layer
    SelectLayer(u8, ZoneSide),
    /// Switch back to the base (locked) overlay layer
    RestoreBaseLayer(ZoneSide),
}

pub const MAX_INTENTS: usize = 8;

pub type Intents = Vec<Intent, MAX_INTENTS>;

/// Feed one event to the state machine
pub fn transition<const N: usize, const NUM_LAYER: usize>(
    session: &mut Session<N>,
    config: &MkeyConfig<N, NUM_LAYER>,
    event: MkeyEvent,
) -> Intents {
    let mut intents = Intents::new();
    let mut machine = Machine {
        session,
        config,
        intents: &mut intents,
    };
    match event {
        MkeyEvent::Zone { index, side, pressed } => {
            if index as usize >= N {
                warn!("Zone key index {} out of range, zone has {} keys", index, N);
                return intents;
            }
            if pressed {
                machine.zone_pressed(index, side);
            } else {
                machine.zone_released(index, side);
            }
        }
        MkeyEvent::Typing { pressed: true } => machine.typing_pressed(),
        MkeyEvent::Typing { pressed: false } => (),
        MkeyEvent::Direct { code, pressed } => {
            let side = machine.session.modifier_side();
            if pressed {
                machine.push(Intent::Register(code, side));
            } else {
                machine.push(Intent::Unregister(code, side));
            }
        }
    }
    intents
}

struct Machine<'s, 'c, const N: usize, const NUM_LAYER: usize> {
    session: &'s mut Session<N>,
    config: &'c MkeyConfig<N, NUM_LAYER>,
    intents: &'s mut Intents,
}

impl<const N: usize, const NUM_LAYER: usize> Machine<'_, '_, N, NUM_LAYER> {
    fn push(&mut self, intent: Intent) {
        let skip = match intent {
            Intent::Register(code, _) | Intent::Unregister(code, _) | Intent::Tap(code, _) => code.is_no(),
            _ => false,
        };
        if !skip && self.intents.push(intent).is_err() {
            error!("Intent buffer full, dropping {:?}", intent);
        }
    }

    fn register(&mut self, code: MkeyCode) {
        let side = self.session.modifier_side();
        self.push(Intent::Register(code, side));
    }

    fn unregister(&mut self, code: MkeyCode) {
        let side = self.session.modifier_side();
        self.push(Intent::Unregister(code, side));
    }

    fn tap(&mut self, code: MkeyCode) {
        let side = self.session.modifier_side();
        self.push(Intent::Tap(code, side));
    }

    /// Index of the primary key which started the episode, used as table row.
    fn saved(&self) -> usize {
        self.session.saved_index.map_or(0, |i| i as usize)
    }

    fn zone_pressed(&mut self, index: u8, side: ZoneSide) {
        if self.session.primary_side.is_none() && self.session.is_released() {
            debug!("MKEY primary side: {:?}", side);
            self.session.primary_side = Some(side);
        }

        if Some(side) == self.session.primary_side {
            self.primary_pressed(index);
        } else {
            self.secondary_pressed(index);
        }
    }

    fn zone_released(&mut self, index: u8, side: ZoneSide) {
        match self.session.primary_side {
            Some(primary) if primary == side => self.primary_released(index),
            Some(_) => self.secondary_released(index),
            None => warn!("Release of zone key {} on {:?} side outside of an episode", index, side),
        }

        // Releasing all zone keys ends the episode, whatever mode the machine is in
        if self.session.is_released() {
            if self.session.mode != Mode::Idle || self.session.primary_side.is_some() {
                let side = self.session.modifier_side();
                self.push(Intent::RestoreBaseLayer(side));
            }
            self.session.reset();
        }
    }

    fn primary_pressed(&mut self, index: u8) {
        if self.session.primary.contains(index) {
            warn!("Primary key {} is already pressed", index);
            return;
        }
        self.session.primary.add(index);

        match self.session.mode {
            Mode::Idle => {
                self.session.set_mode(Mode::Single);
                self.session.saved_index = Some(index);
            }
            Mode::Single => {
                self.session.set_mode(Mode::Chord);
                if let Some(layer) = self.config.chord_layers.layer_for(self.session.primary) {
                    let side = self.session.modifier_side();
                    self.push(Intent::SelectLayer(layer, side));
                }
            }
            Mode::Dormant => {
                self.session.set_mode(Mode::Nested);
                self.register(self.config.nested[self.saved()][index as usize]);
            }
            _ => (),
        }
    }

    fn primary_released(&mut self, index: u8) {
        if !self.session.primary.contains(index) {
            warn!("Primary key {} released but not pressed", index);
            return;
        }

        match self.session.mode {
            Mode::Single => self.tap(self.config.tap[self.saved()]),
            Mode::Hold => self.unregister(self.config.hold[self.saved()]),
            Mode::Modified => self.session.set_mode(Mode::Dormant),
            Mode::Nested => self.unregister(self.config.nested[self.saved()][index as usize]),
            _ => (),
        }
        self.session.primary.remove(index);
    }

    fn secondary_pressed(&mut self, index: u8) {
        if self.session.secondary.contains(index) {
            warn!("Secondary key {} is already pressed", index);
            return;
        }
        self.session.secondary.add(index);

        match self.session.mode {
            Mode::Single | Mode::Modified | Mode::Dormant | Mode::Nested => {
                // The first secondary key switches to M3, then every secondary key sends its modified function
                if self.session.mode == Mode::Single {
                    self.session.set_mode(Mode::Modified);
                }
                self.register(self.config.modified[self.saved()][index as usize]);
            }
            Mode::Chord | Mode::ChordAction => {
                self.session.set_mode(Mode::ChordAction);
                self.register(self.config.chord_action[index as usize]);
            }
            _ => (),
        }
    }

    fn secondary_released(&mut self, index: u8) {
        if !self.session.secondary.contains(index) {
            warn!("Secondary key {} released but not pressed", index);
            return;
        }

        match self.session.mode {
            Mode::Modified | Mode::Dormant | Mode::Nested => {
                self.unregister(self.config.modified[self.saved()][index as usize])
            }
            Mode::ChordAction => self.unregister(self.config.chord_action[index as usize]),
            _ => (),
        }
        self.session.secondary.remove(index);
    }

    fn typing_pressed(&mut self) {
        if self.session.mode == Mode::Single {
            self.session.set_mode(Mode::Hold);
            self.register(self.config.hold[self.saved()]);
        }
    }
}

#[cfg(test)]
mod test {
    use mkey_types::action::GenericModifier;
    use mkey_types::keycode::HidKeyCode;

    use super::*;
    use crate::config::ChordLayers;

    const L: ZoneSide = ZoneSide::Left;
    const R: ZoneSide = ZoneSide::Right;

    fn key(k: HidKeyCode) -> MkeyCode {
        MkeyCode::Key(k)
    }

    fn config() -> MkeyConfig<4, 4> {
        let mut config = MkeyConfig::new();
        config.tap = [
            key(HidKeyCode::Space),
            key(HidKeyCode::Enter),
            key(HidKeyCode::Tab),
            key(HidKeyCode::Backspace),
        ];
        config.hold = [
            MkeyCode::Modifier(GenericModifier::Shift),
            MkeyCode::Modifier(GenericModifier::Ctrl),
            MkeyCode::No,
            MkeyCode::No,
        ];
        config.modified[0] = [
            key(HidKeyCode::CapsLock),
            key(HidKeyCode::Escape),
            key(HidKeyCode::Insert),
            key(HidKeyCode::Delete),
        ];
        config.nested[0][0] = key(HidKeyCode::A);
        config.nested[0][1] = key(HidKeyCode::B);
        config.chord_action[0] = MkeyCode::LayerLock;
        config.chord_layers = ChordLayers::new().with_chord(&[0, 1], 2);
        config
    }

    fn feed(session: &mut Session<4>, config: &MkeyConfig<4, 4>, events: &[MkeyEvent]) -> std::vec::Vec<Intent> {
        events
            .iter()
            .flat_map(|e| transition(session, config, *e))
            .collect()
    }

    #[test]
    fn test_single_tap() {
        let config = config();
        let mut session = Session::new();
        let intents = feed(
            &mut session,
            &config,
            &[MkeyEvent::zone(2, R, true), MkeyEvent::zone(2, R, false)],
        );
        assert_eq!(
            intents,
            [Intent::Tap(key(HidKeyCode::Tab), R), Intent::RestoreBaseLayer(R)]
        );
        assert_eq!(session, Session::new());
    }

    #[test]
    fn test_hold_modifier_once_per_episode() {
        let config = config();
        let mut session = Session::new();
        let shift = MkeyCode::Modifier(GenericModifier::Shift);

        let intents = feed(
            &mut session,
            &config,
            &[
                MkeyEvent::zone(0, L, true),
                MkeyEvent::Typing { pressed: true },
                MkeyEvent::Typing { pressed: false },
                MkeyEvent::Typing { pressed: true },
            ],
        );
        assert_eq!(intents, [Intent::Register(shift, L)]);
        assert_eq!(session.mode(), Mode::Hold);

        let intents = feed(&mut session, &config, &[MkeyEvent::zone(0, L, false)]);
        assert_eq!(intents, [Intent::Unregister(shift, L), Intent::RestoreBaseLayer(L)]);
    }

    #[test]
    fn test_typing_outside_single_mode() {
        let config = config();
        let mut session = Session::new();
        assert!(feed(&mut session, &config, &[MkeyEvent::Typing { pressed: true }]).is_empty());
        assert_eq!(session.mode(), Mode::Idle);
    }

    #[test]
    fn test_chord_selects_layer() {
        let config = config();
        let mut session = Session::new();
        let intents = feed(
            &mut session,
            &config,
            &[MkeyEvent::zone(0, L, true), MkeyEvent::zone(1, L, true)],
        );
        assert_eq!(intents, [Intent::SelectLayer(2, L)]);
        assert_eq!(session.mode(), Mode::Chord);

        // Releasing the chord keys doesn't tap anything
        let intents = feed(
            &mut session,
            &config,
            &[MkeyEvent::zone(1, L, false), MkeyEvent::zone(0, L, false)],
        );
        assert_eq!(intents, [Intent::RestoreBaseLayer(L)]);
    }

    #[test]
    fn test_unassigned_chord() {
        let config = config();
        let mut session = Session::new();
        let intents = feed(
            &mut session,
            &config,
            &[MkeyEvent::zone(2, L, true), MkeyEvent::zone(3, L, true)],
        );
        assert!(intents.is_empty());
        assert_eq!(session.mode(), Mode::Chord);
    }

    #[test]
    fn test_chord_action() {
        let config = config();
        let mut session = Session::new();
        let intents = feed(
            &mut session,
            &config,
            &[
                MkeyEvent::zone(0, L, true),
                MkeyEvent::zone(1, L, true),
                MkeyEvent::zone(0, R, true),
                MkeyEvent::zone(0, R, false),
            ],
        );
        assert_eq!(
            intents,
            [
                Intent::SelectLayer(2, L),
                Intent::Register(MkeyCode::LayerLock, L),
                Intent::Unregister(MkeyCode::LayerLock, L),
            ]
        );
        assert_eq!(session.mode(), Mode::ChordAction);
    }

    #[test]
    fn test_modified_and_nested() {
        let config = config();
        let mut session = Session::new();
        let intents = feed(
            &mut session,
            &config,
            &[
                // M1 -> M3
                MkeyEvent::zone(0, R, true),
                MkeyEvent::zone(1, L, true),
                // M3 -> M6
                MkeyEvent::zone(0, R, false),
                // M6 -> M7
                MkeyEvent::zone(0, R, true),
                MkeyEvent::zone(0, R, false),
            ],
        );
        assert_eq!(
            intents,
            [
                Intent::Register(key(HidKeyCode::Escape), L),
                Intent::Register(key(HidKeyCode::A), L),
                Intent::Unregister(key(HidKeyCode::A), L),
            ]
        );
        assert_eq!(session.mode(), Mode::Nested);

        // Another secondary key in M7 still sends its modified function
        let intents = feed(
            &mut session,
            &config,
            &[MkeyEvent::zone(3, L, true), MkeyEvent::zone(3, L, false)],
        );
        assert_eq!(
            intents,
            [
                Intent::Register(key(HidKeyCode::Delete), L),
                Intent::Unregister(key(HidKeyCode::Delete), L),
            ]
        );

        let intents = feed(&mut session, &config, &[MkeyEvent::zone(1, L, false)]);
        assert_eq!(
            intents,
            [Intent::Unregister(key(HidKeyCode::Escape), L), Intent::RestoreBaseLayer(L)]
        );
        assert_eq!(session, Session::new());
    }

    #[test]
    fn test_nested_uses_saved_row() {
        let config = config();
        let mut session = Session::new();
        let intents = feed(
            &mut session,
            &config,
            &[
                MkeyEvent::zone(0, L, true),
                MkeyEvent::zone(2, R, true),
                MkeyEvent::zone(0, L, false),
                MkeyEvent::zone(1, L, true),
            ],
        );
        assert_eq!(
            intents,
            [
                Intent::Register(key(HidKeyCode::Insert), R),
                Intent::Register(key(HidKeyCode::B), R),
            ]
        );
        assert_eq!(session.saved_index(), Some(0));
    }

    #[test]
    fn test_duplicate_press_is_ignored() {
        let config = config();
        let mut session = Session::new();
        feed(&mut session, &config, &[MkeyEvent::zone(0, L, true)]);
        let before = session.clone();
        assert!(feed(&mut session, &config, &[MkeyEvent::zone(0, L, true)]).is_empty());
        assert_eq!(session, before);
    }

    #[test]
    fn test_duplicate_secondary_press_is_ignored() {
        let config = config();

        // M3
        let mut session = Session::new();
        let intents = feed(
            &mut session,
            &config,
            &[MkeyEvent::zone(0, L, true), MkeyEvent::zone(2, R, true)],
        );
        assert_eq!(intents, [Intent::Register(key(HidKeyCode::Insert), R)]);
        let before = session.clone();
        assert!(feed(&mut session, &config, &[MkeyEvent::zone(2, R, true)]).is_empty());
        assert_eq!(session, before);
        assert_eq!(session.mode(), Mode::Modified);

        // M5
        let mut session = Session::new();
        let intents = feed(
            &mut session,
            &config,
            &[
                MkeyEvent::zone(0, L, true),
                MkeyEvent::zone(1, L, true),
                MkeyEvent::zone(0, R, true),
            ],
        );
        assert_eq!(
            intents,
            [Intent::SelectLayer(2, L), Intent::Register(MkeyCode::LayerLock, L)]
        );
        let before = session.clone();
        assert!(feed(&mut session, &config, &[MkeyEvent::zone(0, R, true)]).is_empty());
        assert_eq!(session, before);
        assert_eq!(session.mode(), Mode::ChordAction);

        // A single release still ends the secondary key
        let intents = feed(&mut session, &config, &[MkeyEvent::zone(0, R, false)]);
        assert_eq!(intents, [Intent::Unregister(MkeyCode::LayerLock, L)]);
        assert!(session.secondary_keys().is_empty());
    }

    #[test]
    fn test_unknown_release_resets_idle_machine() {
        let config = config();
        let mut session = Session::new();
        assert!(feed(&mut session, &config, &[MkeyEvent::zone(3, R, false)]).is_empty());
        assert_eq!(session, Session::new());

        // A stray secondary release in the middle of an episode is dropped
        feed(&mut session, &config, &[MkeyEvent::zone(0, L, true)]);
        assert!(feed(&mut session, &config, &[MkeyEvent::zone(1, R, false)]).is_empty());
        assert_eq!(session.mode(), Mode::Single);
    }

    #[test]
    fn test_out_of_range_index() {
        let config = config();
        let mut session = Session::new();
        assert!(feed(&mut session, &config, &[MkeyEvent::zone(4, L, true)]).is_empty());
        assert_eq!(session, Session::new());
    }

    #[test]
    fn test_direct_code() {
        let config = config();
        let mut session = Session::new();
        let intents = feed(
            &mut session,
            &config,
            &[
                MkeyEvent::zone(0, R, true),
                MkeyEvent::Direct {
                    code: MkeyCode::Modifier(GenericModifier::Alt),
                    pressed: true,
                },
                MkeyEvent::Direct {
                    code: MkeyCode::No,
                    pressed: true,
                },
            ],
        );
        assert_eq!(
            intents,
            [Intent::Register(MkeyCode::Modifier(GenericModifier::Alt), R)]
        );
        // A direct code isn't a typing key, the tap is still pending
        assert_eq!(session.mode(), Mode::Single);
    }
}
