//! The task record stored in the [`crate::buffer::TaskBuffer`].

use inject_hal::KeyboardLang;

/// Maximum number of payload bytes a task may carry, including the
/// terminating NUL for string/combo tasks (spec.md §3, §6).
pub const MAX_TASK_PAYLOAD: usize = 255;

/// Size in bytes of the fixed header written ahead of every task's
/// payload in the ring (kind, lang, 2-byte length, 4-byte delay).
pub const HEADER_LEN: usize = 8;

/// The kind of one script item.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum TaskKind {
    TypeString = 0,
    PressCombo = 1,
    Delay = 2,
}

impl TaskKind {
    fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::TypeString),
            1 => Some(Self::PressCombo),
            2 => Some(Self::Delay),
            _ => None,
        }
    }
}

/// The fixed-size record header stored immediately before a task's
/// payload bytes (spec.md §3: "a fixed-size header ... immediately
/// followed by `length` payload bytes").
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TaskHeader {
    pub kind: TaskKind,
    pub lang: KeyboardLang,
    pub len: u16,
    pub delay_ms: u32,
}

impl TaskHeader {
    pub fn delay(delay_ms: u32) -> Self {
        Self {
            kind: TaskKind::Delay,
            lang: KeyboardLang(0),
            len: 0,
            delay_ms,
        }
    }

    pub fn type_string(lang: KeyboardLang, len: u16) -> Self {
        Self {
            kind: TaskKind::TypeString,
            lang,
            len,
            delay_ms: 0,
        }
    }

    pub fn press_combo(lang: KeyboardLang, len: u16) -> Self {
        Self {
            kind: TaskKind::PressCombo,
            lang,
            len,
            delay_ms: 0,
        }
    }

    pub fn encode(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[0] = self.kind as u8;
        out[1] = self.lang.0;
        out[2..4].copy_from_slice(&self.len.to_le_bytes());
        out[4..8].copy_from_slice(&self.delay_ms.to_le_bytes());
        out
    }

    /// Decodes a header from `HEADER_LEN` bytes. Returns `None` when the
    /// kind byte is not a valid discriminant — a framing fault (spec.md
    /// §4.1).
    pub fn decode(bytes: &[u8; HEADER_LEN]) -> Option<Self> {
        let kind = TaskKind::from_u8(bytes[0])?;
        let lang = KeyboardLang(bytes[1]);
        let len = u16::from_le_bytes([bytes[2], bytes[3]]);
        let delay_ms = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        Some(Self {
            kind,
            lang,
            len,
            delay_ms,
        })
    }
}
