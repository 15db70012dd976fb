use mkey_types::action::MkeyCode;

/// A step of a layer switch, executed in order by the processor
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub(crate) enum LayerStep {
    Tap(MkeyCode),
    Deactivate(u8),
    Activate(u8),
}

/// Tracks the overlay layer of the typing keys.
///
/// Layer 0 carries the zone keys themselves and is always on, so it's never deactivated, but its exit code is still
/// tapped when the first overlay is selected. An overlay selected by a chord is transient: it's replaced by the base
/// layer when all zone keys are released, unless it has been locked.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LayerController {
    active: u8,
    base: u8,
}

impl LayerController {
    pub const fn new(base: u8) -> Self {
        Self { active: 0, base }
    }

    /// The currently active overlay layer
    pub fn active(&self) -> u8 {
        self.active
    }

    /// The overlay layer restored at the end of an episode
    pub fn base(&self) -> u8 {
        self.base
    }

    /// Switch to `layer`, returning the steps the host has to see.
    ///
    /// Nothing happens if `layer` is 0 or already active.
    pub(crate) fn select(&mut self, layer: u8, enter: &[MkeyCode], exit: &[MkeyCode]) -> [Option<LayerStep>; 4] {
        let mut steps = [None; 4];
        if layer == 0 || layer == self.active {
            return steps;
        }
        if layer as usize >= enter.len() {
            warn!("Not a valid layer {}, keyboard supports only {} layers", layer, enter.len());
            return steps;
        }

        debug!("Overlay layer {} -> {}", self.active, layer);
        steps[0] = exit.get(self.active as usize).map(|c| LayerStep::Tap(*c));
        if self.active != 0 {
            steps[1] = Some(LayerStep::Deactivate(self.active));
        }
        steps[2] = Some(LayerStep::Activate(layer));
        steps[3] = Some(LayerStep::Tap(enter[layer as usize]));
        self.active = layer;
        steps
    }

    /// Keep the active overlay after the episode ends
    pub fn lock(&mut self) {
        info!("Lock overlay layer {}", self.active);
        self.base = self.active;
    }
}
