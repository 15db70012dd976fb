//! Checks of an MKEY config file which don't depend on the firmware's const parameters

use std::collections::HashMap;

use mkey::config::MAX_LAYER_NUM;
use mkey::zone::MAX_ZONE_KEYS;

use crate::error::{ConfigError, ConfigResult};
use crate::{CodesConfig, MkeyTomlConfig};

pub(crate) fn validate_config(config: &MkeyTomlConfig) -> ConfigResult<()> {
    validate_zone_section(config)?;
    validate_codes_section(&config.codes, config.zone.keys)?;
    validate_layer_section(config)?;
    Ok(())
}

/// Validates the [zone] section
fn validate_zone_section(config: &MkeyTomlConfig) -> ConfigResult<()> {
    let zone = &config.zone;
    if !(2..=MAX_ZONE_KEYS).contains(&zone.keys) {
        return Err(ConfigError::ZoneWidth { keys: zone.keys });
    }
    if zone.initial_layer as usize >= config.layer_num() {
        return Err(ConfigError::InitialLayer {
            layer: zone.initial_layer,
            layer_num: config.layer_num(),
        });
    }
    Ok(())
}

/// Validates the [codes] section, every table is empty or exactly as wide as a zone
fn validate_codes_section(codes: &CodesConfig, keys: usize) -> ConfigResult<()> {
    validate_width("tap", codes.tap.len(), keys)?;
    validate_width("hold", codes.hold.len(), keys)?;
    validate_width("chord_action", codes.chord_action.len(), keys)?;
    for (table, matrix) in [("modified", &codes.modified), ("nested", &codes.nested)] {
        validate_width(table, matrix.len(), keys)?;
        if let Some((row, row_codes)) = matrix.iter().enumerate().find(|(_, r)| r.len() != keys) {
            return Err(ConfigError::TableWidth {
                table,
                row: Some(row),
                len: row_codes.len(),
                keys,
            });
        }
    }
    Ok(())
}

fn validate_width(table: &'static str, len: usize, keys: usize) -> ConfigResult<()> {
    if len != 0 && len != keys {
        return Err(ConfigError::TableWidth {
            table,
            row: None,
            len,
            keys,
        });
    }
    Ok(())
}

/// Validates the [[layer]] entries
fn validate_layer_section(config: &MkeyTomlConfig) -> ConfigResult<()> {
    if config.layer_num() > MAX_LAYER_NUM {
        return Err(ConfigError::LayerCount {
            layer_num: config.layer_num(),
            max: MAX_LAYER_NUM,
        });
    }

    // Chord pattern -> the layer it selects
    let mut chords: HashMap<u8, u8> = HashMap::new();
    for (i, entry) in config.layers.iter().enumerate() {
        if entry.chord.is_empty() {
            continue;
        }
        let layer = (i + 1) as u8;
        let mut bits = 0u8;
        for &key in &entry.chord {
            if key as usize >= config.zone.keys {
                return Err(ConfigError::ChordKey {
                    layer,
                    key,
                    keys: config.zone.keys,
                });
            }
            bits |= 1 << key;
        }
        if bits.count_ones() < 2 {
            return Err(ConfigError::NotAChord { layer });
        }
        if let Some(&first) = chords.get(&bits) {
            return Err(ConfigError::DuplicateChord { layer, first });
        }
        chords.insert(bits, layer);
    }
    Ok(())
}
