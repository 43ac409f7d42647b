//! The 5-byte ShockBurst radio address and its base/prefix split.

use core::fmt;

/// A full 5-byte ShockBurst address, as stored against a device in the
/// device inventory.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct RadioAddress(pub [u8; 5]);

/// The 4-byte portion of an address shared by every pipe.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct RadioBaseAddress(pub [u8; 4]);

/// The single byte that, together with a [`RadioBaseAddress`], uniquely
/// identifies one pipe's address.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct RadioPrefix(pub u8);

impl RadioAddress {
    /// Splits a 5-byte target address into the base address (shared by all
    /// pipes) and the prefix byte bound to pipe 0.
    ///
    /// The base address is the leading 4 bytes; the prefix is the
    /// trailing byte, matching the original processor's
    /// `helper_addr_to_base_and_prefix`.
    pub fn split(self) -> (RadioBaseAddress, RadioPrefix) {
        let [a, b, c, d, e] = self.0;
        (RadioBaseAddress([a, b, c, d]), RadioPrefix(e))
    }
}

impl fmt::Debug for RadioAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, b) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ":")?;
            }
            write!(f, "{b:02X}")?;
        }
        Ok(())
    }
}

impl fmt::Display for RadioAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for RadioAddress {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            self.0[0],
            self.0[1],
            self.0[2],
            self.0[3],
            self.0[4]
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_address_is_4_plus_1() {
        let addr = RadioAddress([0xde, 0xad, 0xbe, 0xef, 0x42]);
        let (base, prefix) = addr.split();
        assert_eq!(base.0, [0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(prefix.0, 0x42);
    }
}
