//! # MKEY Types
//!
//! Fundamental type definitions shared by the MKEY crates.
//!
//! - [`keycode`] - HID keyboard keycodes
//! - [`action`] - MKEY dispatch-table codes, zone sides and host actions
//! - [`led_indicator`] - Lock indicator state reported by the host
//!
//! `mkey` consumes these types in its state machine, `mkey-config` produces them from `mkey.toml`.

#![cfg_attr(not(test), no_std)]

pub mod action;
pub mod keycode;
pub mod led_indicator;
