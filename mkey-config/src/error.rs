//! Errors of loading an MKEY config file and building the dispatch tables from it

use std::fmt;

use mkey::config::MkeyConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The config file can't be read
    FileRead { path: String, message: String },
    /// Not valid TOML, or an unknown field or code name
    TomlParse { path: String, message: String },
    /// `zone.keys` is out of range
    ZoneWidth { keys: usize },
    /// A code table is neither empty nor as wide as a zone, `row` is set for the `modified` and `nested` matrices
    TableWidth {
        table: &'static str,
        row: Option<usize>,
        len: usize,
        keys: usize,
    },
    /// A chord names a key outside the zone
    ChordKey { layer: u8, key: u8, keys: usize },
    /// A chord has fewer than two different keys
    NotAChord { layer: u8 },
    /// Two layers are selected by the same chord
    DuplicateChord { layer: u8, first: u8 },
    /// `zone.initial_layer` isn't one of the configured layers
    InitialLayer { layer: u8, layer_num: usize },
    /// More layers than the file format or the firmware supports, layer 0 included
    LayerCount { layer_num: usize, max: usize },
    /// The file describes zones of another width than the firmware's
    ZoneWidthMismatch { keys: usize, firmware: usize },
    /// The built tables are rejected by the firmware
    Tables(MkeyConfigError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileRead { path, message } => write!(f, "Can't read MKEY config '{}': {}", path, message),
            ConfigError::TomlParse { path, message } => write!(f, "Invalid MKEY config '{}': {}", path, message),
            ConfigError::ZoneWidth { keys } => write!(
                f,
                "zone.keys = {}, a zone has 2 to {} keys",
                keys,
                mkey::zone::MAX_ZONE_KEYS
            ),
            ConfigError::TableWidth {
                table,
                row: Some(row),
                len,
                keys,
            } => write!(f, "codes.{}[{}] has {} codes, expected {}", table, row, len, keys),
            ConfigError::TableWidth {
                table,
                row: None,
                len,
                keys,
            } => write!(f, "codes.{} has {} entries, expected 0 or {}", table, len, keys),
            ConfigError::ChordKey { layer, key, keys } => write!(
                f,
                "chord of layer {} uses key {}, but a zone has only {} keys",
                layer, key, keys
            ),
            ConfigError::NotAChord { layer } => {
                write!(f, "chord of layer {} needs at least two different zone keys", layer)
            }
            ConfigError::DuplicateChord { layer, first } => {
                write!(f, "chord of layer {} already selects layer {}", layer, first)
            }
            ConfigError::InitialLayer { layer, layer_num } => write!(
                f,
                "initial layer {} doesn't exist, {} layers are configured",
                layer, layer_num
            ),
            ConfigError::LayerCount { layer_num, max } => {
                write!(f, "{} layers configured, at most {} are supported", layer_num, max)
            }
            ConfigError::ZoneWidthMismatch { keys, firmware } => write!(
                f,
                "zones of {} keys configured, but the firmware is built for {}",
                keys, firmware
            ),
            ConfigError::Tables(e) => write!(f, "dispatch tables rejected: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Tables(e) => Some(e),
            _ => None,
        }
    }
}

impl From<MkeyConfigError> for ConfigError {
    fn from(e: MkeyConfigError) -> Self {
        ConfigError::Tables(e)
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;
