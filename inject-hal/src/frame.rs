//! Radio-ready frames: a Unifying HID report plus a checksum trailer.
//!
//! A [`Frame`] is the unit the payload providers fill in and the engine
//! hands to [`crate::radio::RadioControl`]. Its shape follows the
//! Logitech Unifying keyboard framing described in spec.md §4.2: a fixed
//! HID report body followed by a trailing checksum byte that is the two's
//! complement of the sum of every preceding byte, so that the sum of the
//! whole frame (including the checksum) is zero modulo 256.

/// Maximum number of payload bytes a frame can carry, including the
/// trailing checksum byte. Generously sized for a standard 8-byte boot
/// keyboard HID report plus the 1-byte Unifying RF report header.
pub const MAX_FRAME_LEN: usize = 10;

/// A boot-protocol keyboard HID report: one modifier byte and up to six
/// simultaneously pressed keycodes.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyReport {
    pub modifier: u8,
    pub keycodes: [u8; 6],
}

impl KeyReport {
    /// The all-zero "all keys released" report.
    pub const RELEASE: KeyReport = KeyReport {
        modifier: 0,
        keycodes: [0; 6],
    };

    pub const fn new(modifier: u8, keycodes: [u8; 6]) -> Self {
        Self { modifier, keycodes }
    }

    /// Writes this report into a frame's HID report body, at a
    /// conventional offset of 1 (byte 0 is the Unifying RF report type).
    pub fn write_into(&self, frame: &mut Frame) {
        frame.data[0] = UNIFYING_KEYBOARD_REPORT_TYPE;
        frame.data[1] = self.modifier;
        frame.data[2..8].copy_from_slice(&self.keycodes);
        frame.len = 9; // report type + 8-byte HID report, checksum appended separately
    }
}

/// The Unifying RF report type byte used for keyboard HID reports.
pub const UNIFYING_KEYBOARD_REPORT_TYPE: u8 = 0xC1;

/// A single ShockBurst payload targeting one pipe.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
    pub pipe: u8,
    pub len: u8,
    pub data: [u8; MAX_FRAME_LEN],
    pub noack: bool,
}

impl Default for Frame {
    fn default() -> Self {
        Self {
            pipe: 0,
            len: 0,
            data: [0; MAX_FRAME_LEN],
            noack: false,
        }
    }
}

impl Frame {
    /// The frame bytes excluding the not-yet-written trailing checksum.
    pub fn body(&self) -> &[u8] {
        &self.data[..self.len as usize]
    }
}

impl PartialEq for Frame {
    fn eq(&self, other: &Self) -> bool {
        self.pipe == other.pipe && self.body() == other.body()
    }
}

/// Rewrites the trailing checksum byte of `frame` so the sum of every
/// byte in `frame.body()` plus the checksum is zero modulo 256 — the
/// Unifying checksum scheme.
///
/// `frame.len` is advanced by one to include the checksum byte; callers
/// must have already written the report body (and left room for the
/// trailing byte) before calling this.
pub fn unifying_update_checksum(frame: &mut Frame) {
    let body_len = frame.len as usize;
    let sum: u8 = frame.data[..body_len]
        .iter()
        .fold(0u8, |acc, b| acc.wrapping_add(*b));
    frame.data[body_len] = (!sum).wrapping_add(1);
    frame.len += 1;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_makes_frame_sum_to_zero() {
        let mut frame = Frame::default();
        KeyReport::new(0x02, [0x04, 0, 0, 0, 0, 0]).write_into(&mut frame);
        unifying_update_checksum(&mut frame);
        let sum: u8 = frame.body().iter().fold(0u8, |a, b| a.wrapping_add(*b));
        assert_eq!(sum, 0);
    }
}
