//! [`PayloadProvider`]: a lazy, finite frame generator for one task
//! (spec.md §4.2).
//!
//! Realized as a closed sum type rather than an open class hierarchy or a
//! `dyn Trait` object, per spec.md §9 ("a narrow capability pair ...
//! realize it as a small sum type or a two-function table"), matching how
//! `dot15d4`'s own task/MAC state machines are closed enums driven by
//! `match` rather than dynamic dispatch.

use heapless::Vec as HVec;

use inject_hal::{Frame, HidMap, KeyReport, KeyboardLang};
use inject_util::log::warn;

use crate::task::MAX_TASK_PAYLOAD;

#[derive(Clone, Copy, PartialEq, Eq)]
enum StringPhase {
    KeyDown,
    KeyRelease,
}

/// Emits a key-down report followed by a key-release report for every
/// code point in the task's string, skipping code points the [`HidMap`]
/// cannot resolve (spec.md §4.2).
pub struct StringTyping<'d, H> {
    hid: &'d H,
    lang: KeyboardLang,
    chars: HVec<char, MAX_TASK_PAYLOAD>,
    cursor: usize,
    phase: StringPhase,
}

impl<'d, H: HidMap> StringTyping<'d, H> {
    pub fn new(hid: &'d H, lang: KeyboardLang, nul_terminated_utf8: &[u8]) -> Self {
        let mut chars = HVec::new();
        if let Ok(text) = core::str::from_utf8(nul_terminated_utf8) {
            for ch in text.chars() {
                if ch == '\0' {
                    break;
                }
                // A malformed/too-long script item is silently truncated
                // at the scratch buffer's own 255-byte cap; this can never
                // fail here since `chars` shares that cap.
                let _ = chars.push(ch);
            }
        }
        Self {
            hid,
            lang,
            chars,
            cursor: 0,
            phase: StringPhase::KeyDown,
        }
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
        self.phase = StringPhase::KeyDown;
    }

    pub fn next(&mut self, frame: &mut Frame) -> bool {
        loop {
            if self.cursor >= self.chars.len() {
                return false;
            }

            match self.phase {
                StringPhase::KeyDown => {
                    let ch = self.chars[self.cursor];
                    match self.hid.lookup_char(self.lang, ch) {
                        Some(report) => {
                            report.write_into(frame);
                            self.phase = StringPhase::KeyRelease;
                            return true;
                        }
                        None => {
                            warn!("skipping code point not present in the selected HID map");
                            self.cursor += 1;
                        }
                    }
                }
                StringPhase::KeyRelease => {
                    KeyReport::RELEASE.write_into(frame);
                    self.cursor += 1;
                    self.phase = StringPhase::KeyDown;
                    return true;
                }
            }
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ComboPhase {
    KeyDown,
    KeyRelease,
    Done,
}

/// Emits one key-down report for a resolved key combo, followed by one
/// key-release report — exactly two frames (spec.md §4.2).
pub struct ComboPress {
    report: Option<KeyReport>,
    phase: ComboPhase,
}

impl ComboPress {
    pub fn new<H: HidMap>(hid: &H, lang: KeyboardLang, combo_nul_terminated: &[u8]) -> Self {
        let combo_str = core::str::from_utf8(combo_nul_terminated)
            .ok()
            .map(|s| s.trim_end_matches('\0'))
            .unwrap_or("");
        let report = hid.lookup_combo(lang, combo_str);
        if report.is_none() {
            warn!("combo not present in the selected HID map");
        }
        Self {
            report,
            phase: ComboPhase::KeyDown,
        }
    }

    pub fn reset(&mut self) {
        self.phase = ComboPhase::KeyDown;
    }

    pub fn next(&mut self, frame: &mut Frame) -> bool {
        match self.phase {
            ComboPhase::KeyDown => match self.report {
                Some(report) => {
                    report.write_into(frame);
                    self.phase = ComboPhase::KeyRelease;
                    true
                }
                None => false,
            },
            ComboPhase::KeyRelease => {
                KeyReport::RELEASE.write_into(frame);
                self.phase = ComboPhase::Done;
                true
            }
            ComboPhase::Done => false,
        }
    }
}

/// The two non-delay payload providers. Delay tasks need no provider —
/// their completion is signaled by a single timer expiry (spec.md §4.2).
pub enum PayloadProvider<'d, H> {
    StringTyping(StringTyping<'d, H>),
    ComboPress(ComboPress),
}

impl<'d, H: HidMap> PayloadProvider<'d, H> {
    pub fn reset(&mut self) {
        match self {
            PayloadProvider::StringTyping(p) => p.reset(),
            PayloadProvider::ComboPress(p) => p.reset(),
        }
    }

    pub fn next(&mut self, frame: &mut Frame) -> bool {
        match self {
            PayloadProvider::StringTyping(p) => p.next(frame),
            PayloadProvider::ComboPress(p) => p.next(frame),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inject_hal::sim::TestHidMap;

    #[test]
    fn string_typing_emits_down_then_release_per_char() {
        let hid = TestHidMap::new();
        let mut provider = StringTyping::new(&hid, KeyboardLang(0), b"A\0");
        let mut frame = Frame::default();

        assert!(provider.next(&mut frame));
        assert_eq!(frame.data[1], 0x02); // left shift modifier
        assert_eq!(frame.data[2], 0x04); // 'a' usage code

        assert!(provider.next(&mut frame));
        assert_eq!(frame.data[1], 0);
        assert_eq!(frame.data[2], 0);

        assert!(!provider.next(&mut frame));
    }

    #[test]
    fn string_typing_skips_unmapped_code_points() {
        let hid = TestHidMap::new();
        // '!' is unmapped in the test HID map; 'a' is mapped.
        let mut provider = StringTyping::new(&hid, KeyboardLang(0), b"!a\0");
        let mut frame = Frame::default();

        assert!(provider.next(&mut frame)); // key-down for 'a', '!' skipped
        assert_eq!(frame.data[2], 0x04);
        assert!(provider.next(&mut frame)); // release
        assert!(!provider.next(&mut frame));
    }

    #[test]
    fn combo_press_emits_exactly_two_frames() {
        let hid = TestHidMap::new();
        let mut provider = ComboPress::new(&hid, KeyboardLang(0), b"CTRL+ALT+DEL\0");
        let mut frame = Frame::default();

        assert!(provider.next(&mut frame));
        assert_eq!(frame.data[1], 0x05);
        assert_eq!(frame.data[2], 0x4C);

        assert!(provider.next(&mut frame));
        assert_eq!(frame.data[1], 0);

        assert!(!provider.next(&mut frame));
    }

    #[test]
    fn unresolvable_combo_fails_first_frame() {
        let hid = TestHidMap::new();
        let mut provider = ComboPress::new(&hid, KeyboardLang(0), b"NONSENSE\0");
        let mut frame = Frame::default();
        assert!(!provider.next(&mut frame));
    }
}
