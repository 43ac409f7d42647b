//! The out-of-scope HID mapping collaborator (spec.md §6).
//!
//! The actual UTF-8-to-HID-usage and combo-syntax-to-HID-usage tables are
//! external to this crate; `inject-engine` only needs the narrow lookup
//! capability below to build [`crate::frame::KeyReport`]s.

use crate::frame::KeyReport;

/// Opaque language tag, carried by the engine but never interpreted by it
/// — it is only ever handed back to a [`HidMap`].
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyboardLang(pub u8);

/// The HID map / combo parser external collaborator.
pub trait HidMap {
    /// Resolves one code point to the key-down report that types it under
    /// `lang`. Returns `None` if the code point is not present in the
    /// selected map; the caller must skip it with a diagnostic rather
    /// than fail the whole task (spec.md §4.2).
    fn lookup_char(&self, lang: KeyboardLang, ch: char) -> Option<KeyReport>;

    /// Resolves a combo string such as `"CTRL+ALT+DEL"` to the single
    /// key-down report that presses the whole combo at once.
    fn lookup_combo(&self, lang: KeyboardLang, combo: &str) -> Option<KeyReport>;
}
