//! [`InjectionProcessor`]: construction, radio bring-up/teardown and the
//! public enqueue/list/clear/execute surface in front of
//! [`crate::engine::InjectionEngine`] (spec.md §4.4).
//!
//! Exactly one processor may exist at a time. This mirrors the singleton
//! timer driver in `dot15d4-driver/src/socs/nrf/timer.rs`: a
//! `critical_section::Mutex<Cell<bool>>` guards a process-wide flag,
//! checked at construction and released on `Drop`, rather than leaning on
//! a type-level "only one instance" trick.

use core::cell::Cell;

use critical_section::Mutex;

use inject_hal::{Device, DeviceInventory, HidMap, RadioAddress, RadioControl, RadioEvent, Timer};
use inject_util::log::info;

use crate::buffer::{PushError, TaskBuffer, RING_BUFFER_SIZE};
use crate::constants::{
    ALL_CHANNEL_FAILOVER_LOOP_COUNT, HW_RETRANSMIT_COUNT, HW_RETRANSMIT_DELAY_US, TX_POWER_DBM,
};
use crate::engine::{EngineState, InjectionEngine};
use crate::task::TaskHeader;

static INSTANCE_TAKEN: Mutex<Cell<bool>> = Mutex::new(Cell::new(false));

/// Returned by [`InjectionProcessor::new`] when a processor already
/// exists.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlreadyInitialized;

/// The sole owner of the ring buffer and the engine driving it, generic
/// over the ring's capacity `N` (defaults to [`RING_BUFFER_SIZE`] in
/// firmware; tests use much smaller rings).
pub struct InjectionProcessor<'d, R, T, H, D, const N: usize = RING_BUFFER_SIZE> {
    engine: InjectionEngine<'d, R, T, H>,
    buffer: TaskBuffer<N>,
    device_inventory: D,
}

impl<'d, R, T, H, D, const N: usize> InjectionProcessor<'d, R, T, H, D, N>
where
    R: RadioControl,
    T: Timer,
    H: HidMap,
    D: DeviceInventory,
{
    /// Builds an uninitialized processor. Fails if one already exists
    /// process-wide; the caller must drop the existing instance first.
    pub fn new(radio: R, timer: T, hid: &'d H, device_inventory: D) -> Result<Self, AlreadyInitialized> {
        let already_taken = critical_section::with(|cs| INSTANCE_TAKEN.borrow(cs).replace(true));
        if already_taken {
            return Err(AlreadyInitialized);
        }

        Ok(Self {
            engine: InjectionEngine::new(radio, timer, hid),
            buffer: TaskBuffer::new(),
            device_inventory,
        })
    }

    pub fn state(&self) -> EngineState {
        self.engine.state()
    }

    /// Resolves `address` against the device inventory (falling back to
    /// a synthetic device on a miss), configures the radio for Enhanced
    /// ShockBurst PTX transmission to it, and brings the engine to
    /// `Idle` (spec.md §4.4, §6).
    pub fn init(&mut self, address: RadioAddress) -> Device {
        let device = self
            .device_inventory
            .get_device(address)
            .unwrap_or_else(|| Device::synthetic(address));

        let (base, prefix) = device.address.split();
        let radio = self.engine.radio();
        radio.stop_rx();
        radio.enable_pipes(0x00);
        radio.set_base_address_0(base);
        radio.update_prefix_0(prefix);
        radio.enable_pipes(0x01);
        radio.set_retransmit(HW_RETRANSMIT_COUNT, HW_RETRANSMIT_DELAY_US);
        radio.set_tx_power(TX_POWER_DBM);
        radio.set_all_channel_tx_failover(true, ALL_CHANNEL_FAILOVER_LOOP_COUNT);
        radio.set_mode_ptx();

        info!("injection processor initialized against {}", device.address);
        self.engine.mark_idle();
        device
    }

    /// Returns the radio to a neutral mode, stops the timer, flushes the
    /// task buffer and discards any task currently in flight (spec.md
    /// §4.4).
    pub fn deinit(&mut self) {
        self.engine.radio().set_mode_idle();
        self.engine.mark_uninitialized();
        self.buffer.flush();
    }

    pub fn enqueue_string(
        &mut self,
        lang: inject_hal::KeyboardLang,
        nul_terminated_utf8: &[u8],
    ) -> Result<(), PushError> {
        self.engine
            .enqueue_string(&mut self.buffer, lang, nul_terminated_utf8)
    }

    pub fn enqueue_press(
        &mut self,
        lang: inject_hal::KeyboardLang,
        combo_nul_terminated: &[u8],
    ) -> Result<(), PushError> {
        self.engine
            .enqueue_press(&mut self.buffer, lang, combo_nul_terminated)
    }

    pub fn enqueue_delay(&mut self, delay_ms: u32) -> Result<(), PushError> {
        self.engine.enqueue_delay(&mut self.buffer, delay_ms)
    }

    pub fn set_execute(&mut self, on: bool) {
        self.engine.set_execute(on, &mut self.buffer);
    }

    pub fn is_executing(&self) -> bool {
        self.engine.is_executing()
    }

    /// Overrides the inter-frame delay (default [`crate::constants::TX_DELAY_MS`]).
    pub fn set_tx_delay_ms(&mut self, tx_delay_ms: u32) {
        self.engine.set_tx_delay_ms(tx_delay_ms);
    }

    /// Overrides the retransmit budget (default
    /// [`crate::constants::RETRANSMIT_BUDGET`]).
    pub fn set_retransmit_budget(&mut self, retransmit_budget: u8) {
        self.engine.set_retransmit_budget(retransmit_budget);
    }

    /// Walks every queued task without disturbing the queue, invoking
    /// `emit(1-based index, header, payload)` for each (spec.md §4.3/§4.4
    /// `list`).
    pub fn list(&mut self, emit: impl FnMut(u32, &TaskHeader, &[u8])) {
        self.engine.list(&mut self.buffer, emit);
    }

    /// Discards every queued task. Does not abort a task already in
    /// flight.
    pub fn clear(&mut self) {
        self.engine.clear(&mut self.buffer);
    }

    /// Routes a timer expiry into the engine. The lifecycle wrapper's
    /// owner is expected to call this from whatever ISR or poll loop
    /// observes the underlying hardware timer firing.
    pub fn on_timer(&mut self) {
        self.engine.on_timer(&mut self.buffer);
    }

    /// Routes a radio driver event into the engine (spec.md §4.3 "Radio
    /// handler").
    pub fn on_radio_event(&mut self, event: RadioEvent) {
        self.engine.on_radio_event(&mut self.buffer, event);
    }
}

impl<'d, R, T, H, D, const N: usize> Drop for InjectionProcessor<'d, R, T, H, D, N> {
    fn drop(&mut self) {
        critical_section::with(|cs| INSTANCE_TAKEN.borrow(cs).set(false));
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use inject_hal::sim::{EmptyDeviceInventory, TestHidMap, TestRadio, TestTimer};
    use inject_hal::sim::RecordedRadioCall;
    use inject_hal::KeyboardLang;
    use std::sync::Mutex as StdMutex;

    type TestProcessor<'d> =
        InjectionProcessor<'d, TestRadio, TestTimer, TestHidMap, EmptyDeviceInventory, 256>;

    // The singleton guard is a single process-wide static; serialize the
    // tests that exercise it so they can't observe each other's instances.
    static TEST_LOCK: StdMutex<()> = StdMutex::new(());

    fn processor(hid: &TestHidMap) -> TestProcessor<'_> {
        InjectionProcessor::new(TestRadio::new(), TestTimer::new(), hid, EmptyDeviceInventory).unwrap()
    }

    #[test]
    fn a_second_processor_is_rejected_while_the_first_lives() {
        let _guard = TEST_LOCK.lock().unwrap();
        let hid = TestHidMap::new();
        let first = processor(&hid);
        let second: Result<TestProcessor<'_>, _> =
            InjectionProcessor::new(TestRadio::new(), TestTimer::new(), &hid, EmptyDeviceInventory);
        assert_eq!(second.unwrap_err(), AlreadyInitialized);
        drop(first);
    }

    #[test]
    fn dropping_a_processor_frees_the_slot_for_a_new_one() {
        let _guard = TEST_LOCK.lock().unwrap();
        let hid = TestHidMap::new();
        let first = processor(&hid);
        drop(first);
        let second = processor(&hid);
        drop(second);
    }

    #[test]
    fn init_configures_the_radio_for_ptx_and_reaches_idle() {
        let _guard = TEST_LOCK.lock().unwrap();
        let hid = TestHidMap::new();
        let mut p = processor(&hid);
        p.init(RadioAddress([0xde, 0xad, 0xbe, 0xef, 0x42]));

        assert_eq!(p.state(), EngineState::Idle);
        assert!(p
            .engine
            .radio_ref()
            .calls
            .contains(&RecordedRadioCall::SetModePtx));
        assert!(p
            .engine
            .radio_ref()
            .calls
            .contains(&RecordedRadioCall::EnablePipes(0x01)));
    }

    #[test]
    fn deinit_idles_the_radio_and_uninitializes_the_engine() {
        let _guard = TEST_LOCK.lock().unwrap();
        let hid = TestHidMap::new();
        let mut p = processor(&hid);
        p.init(RadioAddress([1, 2, 3, 4, 5]));
        p.deinit();

        assert_eq!(p.state(), EngineState::Uninitialized);
        assert!(p
            .engine
            .radio_ref()
            .calls
            .contains(&RecordedRadioCall::SetModeIdle));
    }

    #[test]
    fn enqueue_and_execute_through_the_processor_facade() {
        let _guard = TEST_LOCK.lock().unwrap();
        let hid = TestHidMap::new();
        let mut p = processor(&hid);
        p.init(RadioAddress([1, 2, 3, 4, 5]));

        p.enqueue_delay(0).unwrap();
        p.set_execute(true);

        assert_eq!(p.state(), EngineState::Idle);
        assert!(!p.is_executing());
    }

    #[test]
    fn list_reports_queued_tasks_in_order() {
        let _guard = TEST_LOCK.lock().unwrap();
        let hid = TestHidMap::new();
        let mut p = processor(&hid);
        p.init(RadioAddress([1, 2, 3, 4, 5]));

        p.enqueue_press(KeyboardLang(0), b"CTRL+ALT+DEL\0").unwrap();
        p.enqueue_delay(5).unwrap();

        let mut count = 0u32;
        p.list(|n, _header, _payload| {
            count = n;
        });
        assert_eq!(count, 2);
    }
}
