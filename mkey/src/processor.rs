use heapless::Vec;
use mkey_types::action::{HostAction, MkeyCode, ZoneSide};
use mkey_types::keycode::HidKeyCode;
use mkey_types::led_indicator::LedIndicator;

use crate::config::{MkeyConfig, MkeyConfigError};
use crate::layer::{LayerController, LayerStep};
use crate::machine::{Intent, MkeyEvent, transition};
use crate::state::{Mode, Session};

pub const MAX_HOST_ACTIONS: usize = 16;

/// Actions produced by a single event
pub type HostActions = Vec<HostAction, MAX_HOST_ACTIONS>;

/// Entry point of the MKEY input method.
///
/// It owns the session state and the layer state, runs the state machine for each event and resolves the
/// resulting MKEY codes into [`HostAction`]s.
pub struct MkeyProcessor<'a, const N: usize, const NUM_LAYER: usize> {
    config: &'a MkeyConfig<N, NUM_LAYER>,
    session: Session<N>,
    layers: LayerController,
}

impl<'a, const N: usize, const NUM_LAYER: usize> MkeyProcessor<'a, N, NUM_LAYER> {
    /// Create a processor, `config` is expected to be validated already
    pub fn new(config: &'a MkeyConfig<N, NUM_LAYER>) -> Self {
        Self {
            config,
            session: Session::new(),
            layers: LayerController::new(config.initial_layer),
        }
    }

    /// Validate `config` and create a processor
    pub fn try_new(config: &'a MkeyConfig<N, NUM_LAYER>) -> Result<Self, MkeyConfigError> {
        config.validate()?;
        Ok(Self::new(config))
    }

    /// Select the initial overlay layer, should be called once at power on
    pub fn start(&mut self, leds: LedIndicator) -> HostActions {
        info!("MKEY start, initial overlay layer {}", self.config.initial_layer);
        let mut executor = Executor {
            layers: &mut self.layers,
            config: self.config,
            leds,
            actions: HostActions::new(),
        };
        executor.select_layer(self.config.initial_layer, ZoneSide::Left);
        executor.actions
    }

    /// Process one input event
    pub fn process(&mut self, event: MkeyEvent, leds: LedIndicator) -> HostActions {
        let intents = transition(&mut self.session, self.config, event);
        let mut executor = Executor {
            layers: &mut self.layers,
            config: self.config,
            leds,
            actions: HostActions::new(),
        };
        for intent in intents {
            match intent {
                Intent::Register(code, side) => executor.register(code, side),
                Intent::Unregister(code, side) => executor.unregister(code, side),
                Intent::Tap(code, side) => executor.tap(code, side),
                Intent::SelectLayer(layer, side) => executor.select_layer(layer, side),
                Intent::RestoreBaseLayer(side) => {
                    let base = executor.layers.base();
                    executor.select_layer(base, side)
                }
            }
        }
        executor.actions
    }

    pub fn mode(&self) -> Mode {
        self.session.mode()
    }

    pub fn primary_side(&self) -> Option<ZoneSide> {
        self.session.primary_side()
    }

    pub fn session(&self) -> &Session<N> {
        &self.session
    }

    pub fn active_layer(&self) -> u8 {
        self.layers.active()
    }

    pub fn base_layer(&self) -> u8 {
        self.layers.base()
    }
}

/// Resolves MKEY codes into host actions
struct Executor<'l, 'c, const N: usize, const NUM_LAYER: usize> {
    layers: &'l mut LayerController,
    config: &'c MkeyConfig<N, NUM_LAYER>,
    leds: LedIndicator,
    actions: HostActions,
}

impl<const N: usize, const NUM_LAYER: usize> Executor<'_, '_, N, NUM_LAYER> {
    fn emit(&mut self, action: HostAction) {
        if self.actions.push(action).is_err() {
            error!("Host action buffer full, dropping {:?}", action);
        }
    }

    /// Tap NumLock if its indicator isn't in the wanted state
    fn set_num_lock(&mut self, on: bool) {
        if self.leds.num_lock() != on {
            self.emit(HostAction::Tap(HidKeyCode::NumLock));
        }
    }

    fn register(&mut self, code: MkeyCode, side: ZoneSide) {
        match code {
            MkeyCode::No => (),
            MkeyCode::Key(k) => self.emit(HostAction::Register(k)),
            MkeyCode::Modifier(m) => self.emit(HostAction::Register(m.resolve(side))),
            MkeyCode::NumLockOn => self.set_num_lock(true),
            MkeyCode::NumLockOff => self.set_num_lock(false),
            MkeyCode::LayerLock => self.layers.lock(),
        }
    }

    fn unregister(&mut self, code: MkeyCode, side: ZoneSide) {
        match code {
            MkeyCode::Key(k) => self.emit(HostAction::Unregister(k)),
            MkeyCode::Modifier(m) => self.emit(HostAction::Unregister(m.resolve(side))),
            // Nothing is held by the remaining codes
            MkeyCode::No | MkeyCode::NumLockOn | MkeyCode::NumLockOff | MkeyCode::LayerLock => (),
        }
    }

    fn tap(&mut self, code: MkeyCode, side: ZoneSide) {
        match code {
            MkeyCode::Key(k) => self.emit(HostAction::Tap(k)),
            MkeyCode::Modifier(m) => self.emit(HostAction::Tap(m.resolve(side))),
            _ => {
                self.register(code, side);
                self.unregister(code, side);
            }
        }
    }

    fn select_layer(&mut self, layer: u8, side: ZoneSide) {
        let steps = self
            .layers
            .select(layer, &self.config.layer_enter, &self.config.layer_exit);
        for step in steps.into_iter().flatten() {
            match step {
                LayerStep::Tap(code) => self.tap(code, side),
                LayerStep::Deactivate(l) => self.emit(HostAction::DeactivateLayer(l)),
                LayerStep::Activate(l) => self.emit(HostAction::ActivateLayer(l)),
            }
        }
    }
}

#[cfg(test)]
mod test {
    use mkey_types::action::GenericModifier;

    use super::*;

    const L: ZoneSide = ZoneSide::Left;
    const R: ZoneSide = ZoneSide::Right;

    fn leds_off() -> LedIndicator {
        LedIndicator::new()
    }

    #[test]
    fn test_start_selects_initial_layer() {
        let config = MkeyConfig::ortho_4x12();
        let mut processor = MkeyProcessor::try_new(&config).unwrap();
        assert_eq!(processor.start(leds_off()).as_slice(), [HostAction::ActivateLayer(1)]);
        assert_eq!(processor.active_layer(), 1);
        assert_eq!(processor.base_layer(), 1);
    }

    #[test]
    fn test_start_taps_layer_zero_exit_code() {
        let mut config = MkeyConfig::ortho_4x12();
        config.layer_exit[0] = MkeyCode::Key(HidKeyCode::F13);
        let mut processor = MkeyProcessor::try_new(&config).unwrap();
        assert_eq!(
            processor.start(leds_off()).as_slice(),
            [HostAction::Tap(HidKeyCode::F13), HostAction::ActivateLayer(1)]
        );

        // Layer 0 is left only once
        processor.process(MkeyEvent::zone(1, L, true), leds_off());
        let actions = processor.process(MkeyEvent::zone(2, L, true), leds_off());
        assert_eq!(actions.as_slice(), [HostAction::DeactivateLayer(1), HostAction::ActivateLayer(2)]);
    }

    #[test]
    fn test_try_new_rejects_invalid_config() {
        let mut config = MkeyConfig::<4, 4>::new();
        config.initial_layer = 4;
        assert!(MkeyProcessor::try_new(&config).is_err());
    }

    #[test]
    fn test_numlock_enter_code() {
        let config = MkeyConfig::ortho_4x12();
        let mut processor = MkeyProcessor::new(&config);
        processor.start(leds_off());

        processor.process(MkeyEvent::zone(2, L, true), leds_off());
        let actions = processor.process(MkeyEvent::zone(3, L, true), leds_off());
        assert_eq!(
            actions.as_slice(),
            [
                HostAction::DeactivateLayer(1),
                HostAction::ActivateLayer(3),
                HostAction::Tap(HidKeyCode::NumLock),
            ]
        );
    }

    #[test]
    fn test_numlock_already_on() {
        let config = MkeyConfig::ortho_4x12();
        let mut processor = MkeyProcessor::new(&config);
        processor.start(LedIndicator::NUM_LOCK);

        processor.process(MkeyEvent::zone(2, R, true), LedIndicator::NUM_LOCK);
        let actions = processor.process(MkeyEvent::zone(3, R, true), LedIndicator::NUM_LOCK);
        assert_eq!(
            actions.as_slice(),
            [HostAction::DeactivateLayer(1), HostAction::ActivateLayer(3)]
        );
    }

    #[test]
    fn test_modifier_polarity() {
        let config = MkeyConfig::ortho_4x12();
        let mut processor = MkeyProcessor::new(&config);
        processor.start(leds_off());

        // Primary key 1 on the right holds right ctrl
        processor.process(MkeyEvent::zone(1, R, true), leds_off());
        let actions = processor.process(MkeyEvent::Typing { pressed: true }, leds_off());
        assert_eq!(actions.as_slice(), [HostAction::Register(HidKeyCode::RCtrl)]);
        let actions = processor.process(MkeyEvent::zone(1, R, false), leds_off());
        assert_eq!(actions.as_slice(), [HostAction::Unregister(HidKeyCode::RCtrl)]);

        // Primary key 2 on the right with left secondary keys: the secondary keys are left modifiers
        processor.process(MkeyEvent::zone(2, R, true), leds_off());
        let actions = processor.process(MkeyEvent::zone(0, L, true), leds_off());
        assert_eq!(actions.as_slice(), [HostAction::Register(HidKeyCode::LShift)]);
    }

    #[test]
    fn test_direct_modifier_outside_episode() {
        let config = MkeyConfig::ortho_4x12();
        let mut processor = MkeyProcessor::new(&config);
        let actions = processor.process(
            MkeyEvent::Direct {
                code: MkeyCode::Modifier(GenericModifier::Gui),
                pressed: true,
            },
            leds_off(),
        );
        assert_eq!(actions.as_slice(), [HostAction::Register(HidKeyCode::LGui)]);
    }
}
