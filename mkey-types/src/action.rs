use core::fmt;
use core::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::keycode::HidKeyCode;

/// Physical zone of multi-purpose keys.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ZoneSide {
    Left,
    Right,
}

impl ZoneSide {
    pub const fn opposite(self) -> Self {
        match self {
            ZoneSide::Left => ZoneSide::Right,
            ZoneSide::Right => ZoneSide::Left,
        }
    }
}

/// A modifier whose left/right variant is decided by the side that applies it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GenericModifier {
    Shift,
    Ctrl,
    Alt,
    Gui,
}

impl GenericModifier {
    /// Resolve to the physical modifier keycode of `side`
    pub const fn resolve(self, side: ZoneSide) -> HidKeyCode {
        match (self, side) {
            (GenericModifier::Shift, ZoneSide::Left) => HidKeyCode::LShift,
            (GenericModifier::Shift, ZoneSide::Right) => HidKeyCode::RShift,
            (GenericModifier::Ctrl, ZoneSide::Left) => HidKeyCode::LCtrl,
            (GenericModifier::Ctrl, ZoneSide::Right) => HidKeyCode::RCtrl,
            (GenericModifier::Alt, ZoneSide::Left) => HidKeyCode::LAlt,
            (GenericModifier::Alt, ZoneSide::Right) => HidKeyCode::RAlt,
            (GenericModifier::Gui, ZoneSide::Left) => HidKeyCode::LGui,
            (GenericModifier::Gui, ZoneSide::Right) => HidKeyCode::RGui,
        }
    }
}

/// An entry of the MKEY dispatch tables.
///
/// Besides plain keycodes, an entry can hold a pseudo-code which is resolved when it's executed:
/// a side-dependent modifier, a conditional NumLock toggle, or the layer lock.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MkeyCode {
    /// No action.
    #[default]
    No,
    /// A plain keycode, forwarded unchanged.
    Key(HidKeyCode),
    /// Shift/Ctrl/Alt/Gui of the side currently acting as modifier source.
    Modifier(GenericModifier),
    /// Tap NumLock if NumLock is off.
    NumLockOn,
    /// Tap NumLock if NumLock is on.
    NumLockOff,
    /// Keep the currently selected overlay layer after all MKEYs are released.
    LayerLock,
}

impl MkeyCode {
    pub const fn is_no(&self) -> bool {
        matches!(self, MkeyCode::No)
    }

    /// Name used in config files
    pub fn name(&self) -> &'static str {
        match self {
            MkeyCode::No => "No",
            MkeyCode::Key(k) => k.name(),
            MkeyCode::Modifier(GenericModifier::Shift) => "Shift",
            MkeyCode::Modifier(GenericModifier::Ctrl) => "Ctrl",
            MkeyCode::Modifier(GenericModifier::Alt) => "Alt",
            MkeyCode::Modifier(GenericModifier::Gui) => "Gui",
            MkeyCode::NumLockOn => "NumLockOn",
            MkeyCode::NumLockOff => "NumLockOff",
            MkeyCode::LayerLock => "LayerLock",
        }
    }
}

impl From<HidKeyCode> for MkeyCode {
    fn from(key: HidKeyCode) -> Self {
        match key {
            HidKeyCode::No => MkeyCode::No,
            k => MkeyCode::Key(k),
        }
    }
}

impl From<GenericModifier> for MkeyCode {
    fn from(modifier: GenericModifier) -> Self {
        MkeyCode::Modifier(modifier)
    }
}

/// Error returned when a name is neither a pseudo-code nor a [`HidKeyCode`] variant.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UnknownCode;

impl fmt::Display for UnknownCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("unknown keycode name")
    }
}

impl FromStr for MkeyCode {
    type Err = UnknownCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "No" => MkeyCode::No,
            "Shift" => MkeyCode::Modifier(GenericModifier::Shift),
            "Ctrl" => MkeyCode::Modifier(GenericModifier::Ctrl),
            "Alt" => MkeyCode::Modifier(GenericModifier::Alt),
            "Gui" => MkeyCode::Modifier(GenericModifier::Gui),
            "NumLockOn" => MkeyCode::NumLockOn,
            "NumLockOff" => MkeyCode::NumLockOff,
            "LayerLock" => MkeyCode::LayerLock,
            name => HidKeyCode::from_str(name).map_err(|_| UnknownCode)?.into(),
        })
    }
}

impl fmt::Display for MkeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// Codes are (de)serialized by name, so that a config file reads `"Space"` or `"LayerLock"`.
impl Serialize for MkeyCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for MkeyCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CodeVisitor;

        impl Visitor<'_> for CodeVisitor {
            type Value = MkeyCode;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a keycode name such as \"Space\", \"Shift\" or \"LayerLock\"")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                v.parse()
                    .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
            }
        }

        deserializer.deserialize_str(CodeVisitor)
    }
}

/// Primitive action consumed by the host side.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HostAction {
    /// Press and hold a keycode
    Register(HidKeyCode),
    /// Release a held keycode
    Unregister(HidKeyCode),
    /// Press and release a keycode immediately
    Tap(HidKeyCode),
    /// Turn an overlay layer on
    ActivateLayer(u8),
    /// Turn an overlay layer off
    DeactivateLayer(u8),
}
