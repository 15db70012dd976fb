//! Exposed channels which connect the MKEY processor to the key scanner and the host side

use core::sync::atomic::{AtomicU8, Ordering};

use embassy_sync::channel::Channel;
pub use embassy_sync::{blocking_mutex, channel};
use mkey_types::action::HostAction;
use mkey_types::led_indicator::LedIndicator;

use crate::machine::MkeyEvent;
use crate::{EVENT_CHANNEL_SIZE, HOST_ACTION_CHANNEL_SIZE, RawMutex};

/// Channel for classified key events, from the key scanner to the MKEY processor
pub static MKEY_EVENT_CHANNEL: Channel<RawMutex, MkeyEvent, EVENT_CHANNEL_SIZE> = Channel::new();
/// Channel for host actions, from the MKEY processor to the HID writer
pub static HOST_ACTION_CHANNEL: Channel<RawMutex, HostAction, HOST_ACTION_CHANNEL_SIZE> = Channel::new();

/// Lock indicator state, written by the host side whenever a LED report is received
pub(crate) static LOCK_LED_STATES: AtomicU8 = AtomicU8::new(0u8);

/// Record the latest lock indicator state reported by the host
pub fn update_lock_leds(leds: LedIndicator) {
    LOCK_LED_STATES.store(leds.into_bits(), Ordering::Relaxed);
}

/// The latest lock indicator state reported by the host
pub fn lock_leds() -> LedIndicator {
    LedIndicator::from_bits(LOCK_LED_STATES.load(Ordering::Relaxed))
}
