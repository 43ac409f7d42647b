//! Bit-exact constants from spec.md §6.

/// Ring buffer size: 32 KiB.
pub use crate::buffer::RING_BUFFER_SIZE;

/// Default inter-frame delay between successfully transmitted frames.
pub const TX_DELAY_MS: u32 = 8;

/// Default number of `TX_FAILED` events tolerated before failing the
/// current task.
pub const RETRANSMIT_BUDGET: u8 = 10;

/// Radio hardware retransmit count, configured once at `init`.
pub const HW_RETRANSMIT_COUNT: u8 = 1;

/// Radio hardware retransmit spacing, in microseconds.
pub const HW_RETRANSMIT_DELAY_US: u16 = 250;

/// TX power, in dBm.
pub const TX_POWER_DBM: i8 = 8;

/// Number of times the radio loops over the full channel set before
/// giving up on an all-channel TX failover retry.
pub const ALL_CHANNEL_FAILOVER_LOOP_COUNT: u8 = 2;
