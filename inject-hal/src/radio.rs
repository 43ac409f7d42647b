//! The out-of-scope radio driver collaborator (spec.md §6).
//!
//! `RadioControl` narrows the ESB PTX configuration surface down to
//! exactly the calls the injection processor's lifecycle wrapper and
//! engine need (spec.md §4.4). Channel hopping, RX timeouts and the rest
//! of the receive path live entirely behind the driver and are never
//! touched by this crate.

use crate::address::{RadioAddress, RadioBaseAddress, RadioPrefix};
use crate::frame::Frame;

/// Events the radio driver reports back to the engine through
/// [`crate::engine`]'s callback router.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RadioEvent {
    TxSuccess,
    /// Transmission succeeded and the receiver piggy-backed an ack
    /// payload, which must be discarded (spec.md §4.3).
    TxSuccessAckPay,
    TxFailed,
    /// A protocol error in this mode: this processor never enables RX.
    RxReceived,
}

/// The radio driver external collaborator, narrowed to the PTX injection
/// surface described in spec.md §6.
pub trait RadioControl {
    /// Puts the radio in Enhanced ShockBurst PTX (transmitter) mode.
    fn set_mode_ptx(&mut self);

    /// Puts the radio in a neutral, non-transmitting mode (used on
    /// teardown).
    fn set_mode_idle(&mut self);

    /// Enables exactly the pipes set in `mask` (bit N = pipe N).
    fn enable_pipes(&mut self, mask: u8);

    fn set_base_address_0(&mut self, base: RadioBaseAddress);

    fn update_prefix_0(&mut self, prefix: RadioPrefix);

    /// Enables or disables retrying a failed transmission across all
    /// available channels, looping over the channel set `loop_count`
    /// times before giving up.
    fn set_all_channel_tx_failover(&mut self, enabled: bool, loop_count: u8);

    /// Configures the radio hardware's own retransmit behavior,
    /// independent of the engine's software retransmit budget.
    fn set_retransmit(&mut self, count: u8, delay_us: u16);

    fn set_tx_power(&mut self, dbm: i8);

    /// Loads `frame` into the radio's TX buffer and starts transmission.
    fn write_and_start_tx(&mut self, frame: &Frame);

    /// Re-starts transmission of the frame already loaded into the radio
    /// (used to retry after `TxFailed` without re-writing the payload).
    fn start_tx(&mut self);

    fn stop_rx(&mut self);

    fn flush_rx(&mut self);

    /// Resolves the address bound to `pipe`, for log lines.
    fn pipe_to_address(&self, pipe: u8) -> RadioAddress;
}
