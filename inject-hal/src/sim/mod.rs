//! Software test doubles for [`crate::radio::RadioControl`],
//! [`crate::timer::Timer`], [`crate::device::DeviceInventory`] and
//! [`crate::hid::HidMap`], grounded on the `TestRadio` double in
//! `dot15d4/src/radio/driver.rs`. Only compiled under the `sim` feature
//! (which pulls in `std`), so this module never reaches a firmware build.

extern crate std;

mod radio;
mod timer;

pub use radio::{RecordedRadioCall, TestRadio};
pub use timer::TestTimer;

use std::collections::BTreeMap;
use std::string::String;

use crate::address::RadioAddress;
use crate::device::{Device, DeviceInventory};
use crate::frame::KeyReport;
use crate::hid::{HidMap, KeyboardLang};

/// A [`DeviceInventory`] that always misses, forcing the synthetic-device
/// fallback path.
#[derive(Default)]
pub struct EmptyDeviceInventory;

impl DeviceInventory for EmptyDeviceInventory {
    fn get_device(&self, _address: RadioAddress) -> Option<Device> {
        None
    }
}

/// A minimal US-layout [`HidMap`] covering the ASCII letters/digits used
/// in tests, plus a couple of named combos.
#[derive(Default)]
pub struct TestHidMap {
    combos: BTreeMap<String, KeyReport>,
}

impl TestHidMap {
    pub fn new() -> Self {
        let mut combos = BTreeMap::new();
        // Ctrl+Alt+Del: modifier bits 0x01 (L-Ctrl) | 0x04 (L-Alt) = 0x05,
        // Delete = HID usage 0x4C.
        combos.insert(
            String::from("CTRL+ALT+DEL"),
            KeyReport::new(0x05, [0x4C, 0, 0, 0, 0, 0]),
        );
        // GUI+L: modifier 0x08 (L-GUI), L = HID usage 0x0F.
        combos.insert(
            String::from("GUI+L"),
            KeyReport::new(0x08, [0x0F, 0, 0, 0, 0, 0]),
        );
        Self { combos }
    }
}

impl HidMap for TestHidMap {
    fn lookup_char(&self, _lang: KeyboardLang, ch: char) -> Option<KeyReport> {
        match ch {
            'a'..='z' => {
                let usage = 0x04 + (ch as u8 - b'a');
                Some(KeyReport::new(0, [usage, 0, 0, 0, 0, 0]))
            }
            'A'..='Z' => {
                let usage = 0x04 + (ch as u8 - b'A');
                Some(KeyReport::new(0x02, [usage, 0, 0, 0, 0, 0])) // left shift
            }
            '1'..='9' => {
                let usage = 0x1E + (ch as u8 - b'1');
                Some(KeyReport::new(0, [usage, 0, 0, 0, 0, 0]))
            }
            '0' => Some(KeyReport::new(0, [0x27, 0, 0, 0, 0, 0])),
            ' ' => Some(KeyReport::new(0, [0x2C, 0, 0, 0, 0, 0])),
            _ => None,
        }
    }

    fn lookup_combo(&self, _lang: KeyboardLang, combo: &str) -> Option<KeyReport> {
        self.combos.get(combo).copied()
    }
}
