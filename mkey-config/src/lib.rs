//! Loads the MKEY dispatch tables from a TOML file.
//!
//! ```toml
//! [zone]
//! keys = 4
//! initial_layer = 1
//!
//! [codes]
//! tap = ["Space", "Enter", "Tab", "Backspace"]
//! hold = ["Shift", "Ctrl", "Alt", "Gui"]
//!
//! [[layer]]
//! name = "qwerty"
//! chord = [0, 1]
//! ```
//!
//! The first `[[layer]]` is layer 1, layer 0 holds the zone keys and has no entry.

use std::path::Path;

use mkey::config::{ChordLayers, MkeyConfig};
use mkey_types::action::MkeyCode;
use serde_derive::Deserialize;

pub mod error;
mod validation;

pub use error::{ConfigError, ConfigResult};

/// Configurations of the MKEY input method
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MkeyTomlConfig {
    pub zone: ZoneConfig,
    #[serde(default)]
    pub codes: CodesConfig,
    /// Overlay layers, starting from layer 1
    #[serde(default, rename = "layer")]
    pub layers: Vec<LayerConfig>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ZoneConfig {
    /// Number of keys in each zone
    pub keys: usize,
    #[serde(default = "default_initial_layer")]
    pub initial_layer: u8,
    /// Exit code of layer 0, tapped when the initial overlay is selected
    #[serde(default)]
    pub exit: MkeyCode,
}

fn default_initial_layer() -> u8 {
    1
}

/// Dispatch tables, an empty table means no key in it does anything
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CodesConfig {
    #[serde(default)]
    pub tap: Vec<MkeyCode>,
    #[serde(default)]
    pub hold: Vec<MkeyCode>,
    /// One row per primary key, one column per secondary key
    #[serde(default)]
    pub modified: Vec<Vec<MkeyCode>>,
    #[serde(default)]
    pub chord_action: Vec<MkeyCode>,
    /// One row per sticky primary key, one column per primary key pressed again
    #[serde(default)]
    pub nested: Vec<Vec<MkeyCode>>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayerConfig {
    pub name: Option<String>,
    /// Zone key indices of the chord selecting this layer, empty if no chord selects it
    #[serde(default)]
    pub chord: Vec<u8>,
    #[serde(default)]
    pub enter: MkeyCode,
    #[serde(default)]
    pub exit: MkeyCode,
}

impl MkeyTomlConfig {
    /// Parse a config from a TOML string
    pub fn from_toml_str(s: &str) -> ConfigResult<Self> {
        Self::parse(s, "<string>")
    }

    /// Read and parse a config file
    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::parse(&s, &path.display().to_string())
    }

    fn parse(s: &str, path: &str) -> ConfigResult<Self> {
        toml::from_str(s).map_err(|e| ConfigError::TomlParse {
            path: path.to_string(),
            message: e.message().to_string(),
        })
    }

    /// Check the config independently of the firmware's const parameters
    pub fn validate(&self) -> ConfigResult<()> {
        validation::validate_config(self)
    }

    /// Number of layers described by the config, layer 0 included
    pub fn layer_num(&self) -> usize {
        self.layers.len() + 1
    }

    /// Build the dispatch tables for a firmware with `N` keys per zone and `NUM_LAYER` layers
    pub fn build<const N: usize, const NUM_LAYER: usize>(&self) -> ConfigResult<MkeyConfig<N, NUM_LAYER>> {
        self.validate()?;
        if self.zone.keys != N {
            return Err(ConfigError::ZoneWidthMismatch {
                keys: self.zone.keys,
                firmware: N,
            });
        }
        if self.layer_num() > NUM_LAYER {
            return Err(ConfigError::LayerCount {
                layer_num: self.layer_num(),
                max: NUM_LAYER,
            });
        }

        let mut config = MkeyConfig::<N, NUM_LAYER>::new();
        fill_row(&mut config.tap, &self.codes.tap);
        fill_row(&mut config.hold, &self.codes.hold);
        fill_row(&mut config.chord_action, &self.codes.chord_action);
        for (row, codes) in config.modified.iter_mut().zip(&self.codes.modified) {
            fill_row(row, codes);
        }
        for (row, codes) in config.nested.iter_mut().zip(&self.codes.nested) {
            fill_row(row, codes);
        }

        config.layer_exit[0] = self.zone.exit;
        let mut chord_layers = ChordLayers::new();
        for (i, layer) in self.layers.iter().enumerate() {
            let number = (i + 1) as u8;
            config.layer_enter[i + 1] = layer.enter;
            config.layer_exit[i + 1] = layer.exit;
            if !layer.chord.is_empty() {
                chord_layers = chord_layers.with_chord(&layer.chord, number);
            }
        }
        config.chord_layers = chord_layers;
        config.initial_layer = self.zone.initial_layer;

        config.validate()?;
        Ok(config)
    }
}

fn fill_row(row: &mut [MkeyCode], codes: &[MkeyCode]) {
    for (slot, code) in row.iter_mut().zip(codes) {
        *slot = *code;
    }
}
