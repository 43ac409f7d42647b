extern crate std;

use std::vec::Vec;

use crate::address::{RadioAddress, RadioBaseAddress, RadioPrefix};
use crate::frame::Frame;
use crate::radio::RadioControl;

/// One call recorded by [`TestRadio`], in call order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RecordedRadioCall {
    SetModePtx,
    SetModeIdle,
    EnablePipes(u8),
    SetBaseAddress0(RadioBaseAddress),
    UpdatePrefix0(RadioPrefix),
    SetAllChannelTxFailover(bool, u8),
    SetRetransmit(u8, u16),
    SetTxPower(i8),
    WriteAndStartTx(Frame),
    StartTx,
    StopRx,
    FlushRx,
}

/// A software radio double recording every [`RadioControl`] call it
/// receives, grounded on `dot15d4/src/radio/driver.rs::tests::TestRadio`.
#[derive(Default)]
pub struct TestRadio {
    pub calls: Vec<RecordedRadioCall>,
    pub write_and_start_tx_count: usize,
    pub start_tx_count: usize,
    pub last_written_frame: Option<Frame>,
}

impl TestRadio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of times the radio was asked to transmit, whether by
    /// writing a fresh payload or by retrying the one already loaded.
    pub fn tx_attempts(&self) -> usize {
        self.write_and_start_tx_count + self.start_tx_count
    }
}

impl RadioControl for TestRadio {
    fn set_mode_ptx(&mut self) {
        self.calls.push(RecordedRadioCall::SetModePtx);
    }

    fn set_mode_idle(&mut self) {
        self.calls.push(RecordedRadioCall::SetModeIdle);
    }

    fn enable_pipes(&mut self, mask: u8) {
        self.calls.push(RecordedRadioCall::EnablePipes(mask));
    }

    fn set_base_address_0(&mut self, base: RadioBaseAddress) {
        self.calls.push(RecordedRadioCall::SetBaseAddress0(base));
    }

    fn update_prefix_0(&mut self, prefix: RadioPrefix) {
        self.calls.push(RecordedRadioCall::UpdatePrefix0(prefix));
    }

    fn set_all_channel_tx_failover(&mut self, enabled: bool, loop_count: u8) {
        self.calls
            .push(RecordedRadioCall::SetAllChannelTxFailover(
                enabled, loop_count,
            ));
    }

    fn set_retransmit(&mut self, count: u8, delay_us: u16) {
        self.calls
            .push(RecordedRadioCall::SetRetransmit(count, delay_us));
    }

    fn set_tx_power(&mut self, dbm: i8) {
        self.calls.push(RecordedRadioCall::SetTxPower(dbm));
    }

    fn write_and_start_tx(&mut self, frame: &Frame) {
        self.calls
            .push(RecordedRadioCall::WriteAndStartTx(*frame));
        self.last_written_frame = Some(*frame);
        self.write_and_start_tx_count += 1;
    }

    fn start_tx(&mut self) {
        self.calls.push(RecordedRadioCall::StartTx);
        self.start_tx_count += 1;
    }

    fn stop_rx(&mut self) {
        self.calls.push(RecordedRadioCall::StopRx);
    }

    fn flush_rx(&mut self) {
        self.calls.push(RecordedRadioCall::FlushRx);
    }

    fn pipe_to_address(&self, _pipe: u8) -> RadioAddress {
        RadioAddress([0; 5])
    }
}
