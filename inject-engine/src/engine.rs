//! [`InjectionEngine`]: the task-queue-backed state machine described in
//! spec.md §4.3.
//!
//! The engine owns the current task, the current payload provider, the
//! retransmit counter and the next-action timer handle. The task buffer
//! itself is "process-wide" (spec.md §3 Ownership) — every method below
//! that needs to read or rewind it takes `buffer: &mut TaskBuffer<N>` as
//! a parameter rather than owning it, so [`crate::lifecycle`] can hold
//! exactly one buffer alongside exactly one engine.

use inject_hal::{unifying_update_checksum, Frame, HidMap, KeyboardLang, RadioControl, RadioEvent, Timer};
use inject_util::log::{error, info, warn};

use crate::buffer::TaskBuffer;
use crate::constants::{RETRANSMIT_BUDGET, TX_DELAY_MS};
use crate::provider::{ComboPress, PayloadProvider, StringTyping};
use crate::task::{TaskHeader, TaskKind, MAX_TASK_PAYLOAD};

/// The engine's state (spec.md §3). `Succeeded` and `Failed` are
/// transient: the engine reduces them to `Idle` before any public method
/// returns, attempting the next task first if execution is enabled.
/// `Uninitialized` is entered only by [`crate::lifecycle::InjectionProcessor`]
/// teardown.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EngineState {
    Uninitialized,
    Idle,
    Working,
    Succeeded,
    Failed,
}

/// The injection processor's state machine, generic over the radio,
/// timer and HID map ports it is driven by (spec.md §6).
pub struct InjectionEngine<'d, R, T, H> {
    state: EngineState,
    current_task: Option<TaskHeader>,
    current_payload: [u8; MAX_TASK_PAYLOAD],
    current_payload_len: usize,
    provider: Option<PayloadProvider<'d, H>>,
    retransmit_counter: u8,
    retransmit_budget: u8,
    execute: bool,
    tx_delay_ms: u32,
    tx_frame: Frame,
    radio: R,
    timer: T,
    hid: &'d H,
}

impl<'d, R: RadioControl, T: Timer, H: HidMap> InjectionEngine<'d, R, T, H> {
    pub fn new(radio: R, timer: T, hid: &'d H) -> Self {
        Self {
            state: EngineState::Uninitialized,
            current_task: None,
            current_payload: [0; MAX_TASK_PAYLOAD],
            current_payload_len: 0,
            provider: None,
            retransmit_counter: 0,
            retransmit_budget: RETRANSMIT_BUDGET,
            execute: false,
            tx_delay_ms: TX_DELAY_MS,
            tx_frame: Frame::default(),
            radio,
            timer,
            hid,
        }
    }

    /// Overrides the inter-frame delay (default [`TX_DELAY_MS`]).
    pub fn set_tx_delay_ms(&mut self, tx_delay_ms: u32) {
        self.tx_delay_ms = tx_delay_ms;
    }

    /// Overrides the retransmit budget (default [`RETRANSMIT_BUDGET`]).
    pub fn set_retransmit_budget(&mut self, retransmit_budget: u8) {
        self.retransmit_budget = retransmit_budget;
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_executing(&self) -> bool {
        self.execute
    }

    pub fn retransmit_counter(&self) -> u8 {
        self.retransmit_counter
    }

    pub(crate) fn radio(&mut self) -> &mut R {
        &mut self.radio
    }

    pub(crate) fn radio_ref(&self) -> &R {
        &self.radio
    }

    /// Entered by the lifecycle wrapper once radio/pipe configuration has
    /// completed.
    pub(crate) fn mark_idle(&mut self) {
        self.state = EngineState::Idle;
        self.retransmit_counter = 0;
        self.execute = false;
        self.provider = None;
    }

    /// Entered by the lifecycle wrapper on teardown.
    pub(crate) fn mark_uninitialized(&mut self) {
        self.timer.stop();
        self.state = EngineState::Uninitialized;
        self.retransmit_counter = 0;
        self.provider = None;
        self.current_task = None;
    }

    pub fn set_execute<const N: usize>(&mut self, on: bool, buffer: &mut TaskBuffer<N>) {
        self.execute = on;
        if self.execute {
            self.run_next_task(buffer);
        }
    }

    /// `peek`s the buffer and, if execution is enabled, dispatches the
    /// next task. A caller must hold `state == Idle`; any other state
    /// logs and returns without effect (spec.md §4.3 run_next_task, step 1).
    pub fn run_next_task<const N: usize>(&mut self, buffer: &mut TaskBuffer<N>) {
        if self.state != EngineState::Idle {
            error!("current task not finished");
            return;
        }

        let mut scratch = [0u8; MAX_TASK_PAYLOAD];
        let Some((header, len)) = buffer.peek(&mut scratch) else {
            info!("no more tasks scheduled or error fetching next task");
            buffer.rewind_peek();
            self.execute = false;
            return;
        };

        self.current_task = Some(header);
        self.current_payload = scratch;
        self.current_payload_len = len;

        match header.kind {
            TaskKind::PressCombo => self.start_press(buffer, header),
            TaskKind::TypeString => self.start_string(buffer, header),
            TaskKind::Delay => self.start_delay(buffer, header),
        }
    }

    fn start_delay<const N: usize>(&mut self, buffer: &mut TaskBuffer<N>, header: TaskHeader) {
        info!("process delay injection: {} milliseconds", header.delay_ms);
        self.provider = None;
        if header.delay_ms == 0 {
            self.transition(EngineState::Succeeded, buffer);
            return;
        }
        self.transition(EngineState::Working, buffer);
        self.timer.start(header.delay_ms);
    }

    fn start_string<const N: usize>(&mut self, buffer: &mut TaskBuffer<N>, header: TaskHeader) {
        self.start_provider(
            buffer,
            header,
            PayloadProvider::StringTyping(StringTyping::new(
                self.hid,
                header.lang,
                &self.current_payload[..self.current_payload_len],
            )),
        );
    }

    fn start_press<const N: usize>(&mut self, buffer: &mut TaskBuffer<N>, header: TaskHeader) {
        self.start_provider(
            buffer,
            header,
            PayloadProvider::ComboPress(ComboPress::new(
                self.hid,
                header.lang,
                &self.current_payload[..self.current_payload_len],
            )),
        );
    }

    fn start_provider<const N: usize>(
        &mut self,
        buffer: &mut TaskBuffer<N>,
        _header: TaskHeader,
        mut provider: PayloadProvider<'d, H>,
    ) {
        if !provider.next(&mut self.tx_frame) {
            warn!("failed to fetch initial RF report from payload provider");
            self.provider = None;
            self.transition(EngineState::Failed, buffer);
            return;
        }
        self.provider = Some(provider);
        self.transition(EngineState::Working, buffer);
        self.timer.start(self.tx_delay_ms);
    }

    /// Fires the scheduled frame (String/Combo) or completes the task
    /// (Delay) — spec.md §4.3 "Timer handler".
    pub fn on_timer<const N: usize>(&mut self, buffer: &mut TaskBuffer<N>) {
        if self.state != EngineState::Working {
            return;
        }

        match self.current_task.map(|t| t.kind) {
            Some(TaskKind::Delay) => {
                info!("delay end reached");
                self.transition(EngineState::Succeeded, buffer);
            }
            Some(TaskKind::TypeString) | Some(TaskKind::PressCombo) => {
                unifying_update_checksum(&mut self.tx_frame);
                self.radio.write_and_start_tx(&self.tx_frame);
                let addr = self.radio.pipe_to_address(self.tx_frame.pipe);
                info!("TX'ed to {}", addr);
            }
            None => {
                warn!("timer fired with no current task");
            }
        }
    }

    /// Reacts to a radio driver event — spec.md §4.3 "Radio handler".
    pub fn on_radio_event<const N: usize>(&mut self, buffer: &mut TaskBuffer<N>, event: RadioEvent) {
        match event {
            RadioEvent::TxFailed => {
                self.radio.start_tx();
                self.retransmit_counter += 1;
                if self.retransmit_counter >= self.retransmit_budget {
                    warn!("too many retransmissions");
                    self.transition(EngineState::Failed, buffer);
                }
            }
            RadioEvent::TxSuccessAckPay => {
                self.radio.flush_rx();
                self.handle_tx_success(buffer);
            }
            RadioEvent::TxSuccess => {
                self.handle_tx_success(buffer);
            }
            RadioEvent::RxReceived => {
                error!("RX_RECEIVED in injection mode is a protocol error, ignoring");
            }
        }
    }

    fn handle_tx_success<const N: usize>(&mut self, buffer: &mut TaskBuffer<N>) {
        info!("TX_SUCCESS");
        self.retransmit_counter = 0;

        let Some(provider) = &mut self.provider else {
            self.transition(EngineState::Idle, buffer);
            return;
        };

        if provider.next(&mut self.tx_frame) {
            info!("new payload retrieved from payload provider");
            self.timer.start(self.tx_delay_ms);
        } else {
            self.transition(EngineState::Succeeded, buffer);
        }
    }

    /// The single state-transition function (spec.md §4.3). `Succeeded`
    /// and `Failed` are reduced to `Idle` before returning, attempting the
    /// next task first if execution is enabled — each performed with a
    /// single assignment, with no redundant re-assignment or dead "free
    /// task" bookkeeping (spec.md §9, resolved Open Question).
    fn transition<const N: usize>(&mut self, new_state: EngineState, buffer: &mut TaskBuffer<N>) {
        if new_state == self.state {
            return;
        }

        let (settles_to, run_next) = match new_state {
            EngineState::Idle => (EngineState::Idle, true),
            EngineState::Succeeded => {
                info!("inject task succeeded");
                (EngineState::Idle, true)
            }
            EngineState::Failed => {
                warn!("inject task failed");
                (EngineState::Idle, true)
            }
            other => {
                self.state = other;
                return;
            }
        };

        self.timer.stop();
        self.retransmit_counter = 0;
        self.provider = None;
        self.state = settles_to;

        if run_next && self.execute {
            self.run_next_task(buffer);
        }
    }

    /// Walks the buffer with the peek cursor, invoking `emit` once per
    /// queued task, then rewinds the peek cursor (spec.md §4.3 `list`).
    pub fn list<const N: usize>(
        &mut self,
        buffer: &mut TaskBuffer<N>,
        mut emit: impl FnMut(u32, &TaskHeader, &[u8]),
    ) {
        buffer.rewind_peek();
        let mut scratch = [0u8; MAX_TASK_PAYLOAD];
        let mut n = 1u32;
        while let Some((header, len)) = buffer.peek(&mut scratch) {
            emit(n, &header, &scratch[..len]);
            n += 1;
        }
        buffer.rewind_peek();
    }

    /// Enqueues a task and, if the engine is `Idle` and execution is
    /// enabled, starts it immediately (spec.md §4.3 public contract).
    /// `execute` never auto-latches to `true` on enqueue (spec.md §9,
    /// resolved Open Question): the caller must call [`Self::set_execute`]
    /// explicitly.
    fn enqueue<const N: usize>(
        &mut self,
        buffer: &mut TaskBuffer<N>,
        header: TaskHeader,
        payload: &[u8],
    ) -> Result<(), crate::buffer::PushError> {
        buffer.push(header, payload)?;
        if self.state == EngineState::Idle && self.execute {
            self.run_next_task(buffer);
        }
        Ok(())
    }

    pub fn enqueue_string<const N: usize>(
        &mut self,
        buffer: &mut TaskBuffer<N>,
        lang: KeyboardLang,
        nul_terminated_utf8: &[u8],
    ) -> Result<(), crate::buffer::PushError> {
        let header = TaskHeader::type_string(lang, nul_terminated_utf8.len() as u16);
        self.enqueue(buffer, header, nul_terminated_utf8)
    }

    pub fn enqueue_press<const N: usize>(
        &mut self,
        buffer: &mut TaskBuffer<N>,
        lang: KeyboardLang,
        combo_nul_terminated: &[u8],
    ) -> Result<(), crate::buffer::PushError> {
        let header = TaskHeader::press_combo(lang, combo_nul_terminated.len() as u16);
        self.enqueue(buffer, header, combo_nul_terminated)
    }

    pub fn enqueue_delay<const N: usize>(
        &mut self,
        buffer: &mut TaskBuffer<N>,
        delay_ms: u32,
    ) -> Result<(), crate::buffer::PushError> {
        let header = TaskHeader::delay(delay_ms);
        self.enqueue(buffer, header, &[])
    }

    /// Flushes the task buffer. Does not abort a running task (spec.md
    /// §4.3).
    pub fn clear<const N: usize>(&mut self, buffer: &mut TaskBuffer<N>) {
        buffer.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heapless::Vec as HVec;
    use inject_hal::sim::{TestHidMap, TestRadio, TestTimer};

    fn engine(hid: &TestHidMap) -> InjectionEngine<'_, TestRadio, TestTimer, TestHidMap> {
        let mut e = InjectionEngine::new(TestRadio::new(), TestTimer::new(), hid);
        e.mark_idle();
        e
    }

    #[test]
    fn empty_delay_is_a_fast_path_to_idle() {
        let hid = TestHidMap::new();
        let mut e = engine(&hid);
        let mut buf: TaskBuffer<256> = TaskBuffer::new();

        e.enqueue_delay(&mut buf, 0).unwrap();
        e.set_execute(true, &mut buf);

        assert_eq!(e.state(), EngineState::Idle);
        assert!(!e.timer.is_armed());
        assert_eq!(e.radio.tx_attempts(), 0);
    }

    #[test]
    fn nonzero_delay_arms_timer_and_settles_on_expiry() {
        let hid = TestHidMap::new();
        let mut e = engine(&hid);
        let mut buf: TaskBuffer<256> = TaskBuffer::new();

        e.enqueue_delay(&mut buf, 50).unwrap();
        e.set_execute(true, &mut buf);
        assert_eq!(e.state(), EngineState::Working);
        assert_eq!(e.timer.armed_for_ms, Some(50));

        e.on_timer(&mut buf);
        assert_eq!(e.state(), EngineState::Idle);
        assert_eq!(e.radio.tx_attempts(), 0);
    }

    #[test]
    fn single_combo_press_runs_to_completion() {
        let hid = TestHidMap::new();
        let mut e = engine(&hid);
        let mut buf: TaskBuffer<256> = TaskBuffer::new();

        e.enqueue_press(&mut buf, KeyboardLang(0), b"CTRL+ALT+DEL\0")
            .unwrap();
        e.set_execute(true, &mut buf);
        assert_eq!(e.state(), EngineState::Working);
        assert_eq!(e.radio.tx_attempts(), 0); // not written until the timer fires

        e.on_timer(&mut buf); // key-down frame
        assert_eq!(e.radio.write_and_start_tx_count, 1);
        e.on_radio_event(&mut buf, RadioEvent::TxSuccess); // arms release frame
        assert_eq!(e.state(), EngineState::Working);

        e.on_timer(&mut buf); // key-release frame
        assert_eq!(e.radio.write_and_start_tx_count, 2);
        e.on_radio_event(&mut buf, RadioEvent::TxSuccess); // provider exhausted

        assert_eq!(e.state(), EngineState::Idle);
        assert!(!e.is_executing()); // queue drained, run_next_task cleared it
    }

    #[test]
    fn ack_payload_flushes_rx_before_continuing() {
        let hid = TestHidMap::new();
        let mut e = engine(&hid);
        let mut buf: TaskBuffer<256> = TaskBuffer::new();

        e.enqueue_press(&mut buf, KeyboardLang(0), b"GUI+L\0").unwrap();
        e.set_execute(true, &mut buf);
        e.on_timer(&mut buf);
        e.on_radio_event(&mut buf, RadioEvent::TxSuccessAckPay);

        assert!(e
            .radio
            .calls
            .contains(&inject_hal::sim::RecordedRadioCall::FlushRx));
    }

    #[test]
    fn ten_consecutive_tx_failures_fail_the_task_and_reset_the_counter() {
        let hid = TestHidMap::new();
        let mut e = engine(&hid);
        let mut buf: TaskBuffer<256> = TaskBuffer::new();

        e.enqueue_press(&mut buf, KeyboardLang(0), b"CTRL+ALT+DEL\0")
            .unwrap();
        e.set_execute(true, &mut buf);
        e.on_timer(&mut buf);
        assert_eq!(e.radio.write_and_start_tx_count, 1);

        for i in 0..10 {
            e.on_radio_event(&mut buf, RadioEvent::TxFailed);
            if i < 9 {
                assert_eq!(e.state(), EngineState::Working);
            }
        }

        assert_eq!(e.state(), EngineState::Idle);
        assert_eq!(e.retransmit_counter(), 0);
        assert_eq!(e.radio.start_tx_count, 10);
        assert!(!e.is_executing());
    }

    #[test]
    fn list_does_not_disturb_queue_order_or_peek_cursor() {
        let hid = TestHidMap::new();
        let mut e = engine(&hid);
        let mut buf: TaskBuffer<512> = TaskBuffer::new();

        e.enqueue_delay(&mut buf, 10).unwrap();
        e.enqueue_delay(&mut buf, 20).unwrap();

        let mut seen = HVec::<u32, 4>::new();
        e.list(&mut buf, |n, header, _payload| {
            let _ = seen.push(n);
            assert_eq!(header.kind, TaskKind::Delay);
        });
        assert_eq!(seen.len(), 2);

        // The queue itself is untouched: execution still starts at the
        // first task.
        e.set_execute(true, &mut buf);
        assert_eq!(e.timer.armed_for_ms, Some(10));
    }

    #[test]
    fn clear_flushes_without_aborting_a_running_task() {
        let hid = TestHidMap::new();
        let mut e = engine(&hid);
        let mut buf: TaskBuffer<256> = TaskBuffer::new();

        e.enqueue_delay(&mut buf, 50).unwrap();
        e.set_execute(true, &mut buf);
        assert_eq!(e.state(), EngineState::Working);

        e.clear(&mut buf);
        assert_eq!(e.state(), EngineState::Working);
        assert_eq!(buf.available(), buf.capacity());
    }
}
