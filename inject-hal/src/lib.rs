//! Hardware-abstraction ports consumed by the injection engine.
//!
//! `inject-engine` is generic over these traits rather than depending on
//! any concrete radio/timer/device-inventory/HID-map implementation —
//! those remain out of scope (spec.md §1, §6). This crate only defines
//! the narrow interfaces the engine needs, plus (behind the `sim`
//! feature) software test doubles standing in for real hardware.

#![cfg_attr(not(feature = "std"), no_std)]

pub mod address;
pub mod device;
pub mod frame;
pub mod hid;
pub mod radio;
pub mod timer;

#[cfg(feature = "sim")]
pub mod sim;

pub use address::{RadioAddress, RadioBaseAddress, RadioPrefix};
pub use device::{Device, DeviceInventory};
pub use frame::{unifying_update_checksum, Frame, KeyReport, MAX_FRAME_LEN};
pub use hid::{HidMap, KeyboardLang};
pub use radio::{RadioControl, RadioEvent};
pub use timer::Timer;
