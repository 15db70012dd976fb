//! # MKEY
//!
//! Interpreter for two zones of multi-purpose keys (MKEY), usually the outer columns of an ortholinear board.
//!
//! The first zone key pressed makes its zone *primary*, the other zone is *secondary*, all other keys are
//! *typing* keys. Depending on what is pressed while the primary key is down, a zone key:
//!
//! 1. taps its own code when tapped alone (space, enter, ...),
//! 2. acts as a modifier of typing keys,
//! 3. gives the secondary keys another function,
//! 4. selects an overlay layer for the typing keys when chorded with other primary keys,
//! 5. locks that overlay with a secondary key,
//! 6. stays sticky while secondary keys are held, so that a second primary press gets a nested function
//!    (e.g. ctrl+alt+del).
//!
//! The decision only depends on the order of press and release events, never on timing.
//!
//! ## Feature flags
#![doc = document_features::document_features!()]
#![cfg_attr(not(test), no_std)]

#[macro_use]
extern crate log;

pub mod channel;
pub mod config;
pub mod layer;
pub mod machine;
pub mod processor;
pub mod runner;
pub mod state;
pub mod zone;

pub use mkey_types as types;

pub type RawMutex = embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

/// Size of the input event channel
pub const EVENT_CHANNEL_SIZE: usize = 16;
/// Size of the host action channel
pub const HOST_ACTION_CHANNEL_SIZE: usize = 16;
