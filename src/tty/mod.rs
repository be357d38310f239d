//! Terminal back-end abstraction (§4.1, C1).
//!
//! A [`Terminal`] hides terminfo vs. dumb-terminal vs. Windows-console
//! differences behind one interface: enter/leave raw mode, a multiplexed
//! key-and-signal event stream, and the small set of rendering primitives
//! [`crate::render`] needs. Modeled on `rustyline`'s `Term`/`RawMode`/
//! `RawReader` split (retrieved as reference material) but collapsed into
//! fewer traits since this crate targets one real back-end (Unix, via
//! `crossterm`) plus a dumb-terminal fallback rather than Unix/Windows/WASM.

#[cfg(unix)]
pub mod unix;

#[cfg(windows)]
pub mod console;

pub mod dumb;

use std::time::Duration;

use crate::error::Result;
use crate::keys::KeyEvent;

/// Current physical terminal dimensions, in character cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Size {
    pub cols: u16,
    pub rows: u16,
}

/// RAII handle for a raw-mode acquisition; dropping it restores the
/// terminal's prior mode (§4.1 point 1).
pub trait RawModeGuard {}

/// A terminal back-end (C1).
pub trait Terminal {
    type Guard: RawModeGuard;

    /// Enter raw mode (no canonical processing, no echo); restored when the
    /// returned guard drops.
    fn enter_raw_mode(&mut self) -> Result<Self::Guard>;

    /// Current terminal size; re-read after a `Signal::Resize` event.
    fn size(&self) -> Result<Size>;

    /// Whether stdin is actually attached to a terminal. When `false`, the
    /// session driver falls back to unedited line reads (§7) rather than
    /// constructing a back-end at all.
    fn is_input_tty(&self) -> bool;

    /// Block for the next key event or synthetic signal, up to `timeout`
    /// (used to resolve a pending, ambiguous key sequence, §4.1 point 2).
    /// `None` timeout blocks indefinitely. Returns `Ok(None)` on timeout.
    fn read_event(&mut self, timeout: Option<Duration>) -> Result<Option<KeyEvent>>;

    /// Rendering primitives (§4.1 point 3); widths are already accounted
    /// for by the caller using [`display_width`].
    fn write_str(&mut self, s: &str) -> Result<()>;
    fn move_cursor_left(&mut self, n: u16) -> Result<()>;
    fn move_cursor_right(&mut self, n: u16) -> Result<()>;
    fn move_cursor_up(&mut self, n: u16) -> Result<()>;
    fn move_cursor_down(&mut self, n: u16) -> Result<()>;
    fn move_to_column(&mut self, col: u16) -> Result<()>;
    fn clear_to_end_of_line(&mut self) -> Result<()>;
    fn clear_to_end_of_screen(&mut self) -> Result<()>;
    fn ring_bell(&mut self) -> Result<()>;
    fn flush(&mut self) -> Result<()>;

    /// Visual bell (§3 `bellStyle = visual`): a brief reverse-video flash in
    /// place of the audible `\x07`. Default is a no-op for back-ends (like
    /// [`dumb::DumbTerminal`]) with nothing capable of flashing.
    fn flash(&mut self) -> Result<()> {
        Ok(())
    }

    /// Whether this back-end can address rows/arbitrary columns for a
    /// wrapped multi-row prompt (§4.1's terminfo-vs-dumb split). `false`
    /// routes [`crate::render::Renderer`] into the single-row horizontal-
    /// scroll path instead of multi-row wrapping.
    fn supports_multiline(&self) -> bool {
        true
    }
}

/// Unicode East-Asian Width for one character: 0 for combining marks and
/// other zero-width codepoints, 2 for wide/fullwidth, 1 otherwise (§4.3
/// point 7's width-accounting invariant).
#[must_use]
pub fn char_width(c: char) -> usize {
    if c == '\t' {
        return 8;
    }
    unicode_width::UnicodeWidthChar::width(c).unwrap_or(0)
}

/// Total display width of a string under [`char_width`].
#[must_use]
pub fn display_width(s: &str) -> usize {
    s.chars().map(char_width).sum()
}

/// `TERM` values known to not support a rich raw-mode UI (§4.1's terminfo
/// branch); the session driver uses the dumb-terminal back-end for these.
const UNSUPPORTED_TERM: [&str; 3] = ["dumb", "cons25", "emacs"];

#[must_use]
pub fn is_dumb_term() -> bool {
    match std::env::var("TERM") {
        Ok(term) => UNSUPPORTED_TERM.iter().any(|t| t.eq_ignore_ascii_case(&term)),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_chars_are_width_one() {
        assert_eq!(display_width("abc"), 3);
    }

    #[test]
    fn combining_mark_is_width_zero() {
        // U+0301 COMBINING ACUTE ACCENT
        assert_eq!(char_width('\u{0301}'), 0);
    }

    #[test]
    fn wide_cjk_char_is_width_two() {
        assert_eq!(char_width('文'), 2);
        assert_eq!(display_width("文字"), 4);
    }

    #[test]
    fn dumb_term_detection() {
        std::env::set_var("TERM", "dumb");
        assert!(is_dumb_term());
        std::env::set_var("TERM", "xterm-256color");
        assert!(!is_dumb_term());
    }
}
