use crate::timer::Timer;

/// A software timer double. Tests drive the engine's `on_timer` by
/// checking `armed_for_ms` rather than waiting on wall-clock time.
#[derive(Default)]
pub struct TestTimer {
    pub armed_for_ms: Option<u32>,
    pub start_count: usize,
    pub stop_count: usize,
}

impl TestTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_armed(&self) -> bool {
        self.armed_for_ms.is_some()
    }
}

impl Timer for TestTimer {
    fn start(&mut self, ms: u32) {
        self.armed_for_ms = Some(ms);
        self.start_count += 1;
    }

    fn stop(&mut self) {
        self.armed_for_ms = None;
        self.stop_count += 1;
    }
}
