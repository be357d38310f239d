//! Decoded key events, independent of any particular terminal back-end.
//!
//! Back-ends (§4.1) translate raw bytes/escape sequences into these values;
//! everything above the back-end — the dispatcher, the keymaps, the
//! completion engine — only ever sees [`KeyEvent`].

use std::fmt;

/// A single decoded input event.
///
/// `Ctrl`/`Meta`/`Shift` wrap an inner event rather than being flags on
/// `Char`, so that e.g. `Ctrl(Fn(Left))` and `Meta(Char('b'))` are
/// expressible uniformly; [`KeyEvent::normalize`] collapses the common case
/// of `Ctrl` over an ASCII letter back down to the control-character form
/// most keymaps match on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyEvent {
    /// A single decoded Unicode scalar value.
    Char(char),
    /// A named, non-character key.
    Fn(FnKey),
    /// `key` held with Control.
    Ctrl(Box<KeyEvent>),
    /// `key` held with Meta/Alt (typically delivered as an ESC prefix).
    Meta(Box<KeyEvent>),
    /// `key` held with Shift, when the back-end cannot fold it into `Char`.
    Shift(Box<KeyEvent>),
    /// A synthetic event injected by the back-end's signal coordination
    /// (§4.1 point 4), not produced by a keystroke.
    Signal(Signal),
}

/// Named, non-printable keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FnKey {
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
    DeleteForward,
    Backspace,
    Tab,
    Enter,
    Escape,
    Clear,
    KillLine,
    F(u8),
}

/// Synthetic events delivered on the same stream as keystrokes (§4.1, §5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    /// SIGINT (or Ctrl-C observed as a raw-mode key event).
    Interrupt,
    /// SIGWINCH: terminal dimensions changed; renderer must reflow.
    Resize,
    /// SIGTSTP: caller-requested suspension; back-end has already dropped
    /// raw mode by the time this reaches the dispatcher.
    Suspend,
    /// SIGCONT: raw mode has been reacquired; redraw is needed.
    Resume,
}

impl KeyEvent {
    /// Build a plain control-character binding, e.g. `ctrl('a')` for Ctrl-A.
    #[must_use]
    pub fn ctrl(c: char) -> Self {
        KeyEvent::Ctrl(Box::new(KeyEvent::Char(c.to_ascii_lowercase())))
    }

    /// Build a Meta/Alt binding, e.g. `meta('b')` for Meta-B / Alt-B.
    #[must_use]
    pub fn meta(c: char) -> Self {
        KeyEvent::Meta(Box::new(KeyEvent::Char(c)))
    }

    /// Build a named-key binding.
    #[must_use]
    pub fn fn_key(key: FnKey) -> Self {
        KeyEvent::Fn(key)
    }

    /// True for an unmodified printable character (what [`crate::line_buffer::LineBuffer::insert_char`]
    /// is driven by when no binding claims the key).
    #[must_use]
    pub fn as_self_insert(&self) -> Option<char> {
        match self {
            KeyEvent::Char(c) if !c.is_control() => Some(*c),
            _ => None,
        }
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyEvent::Char(c) => write!(f, "{c}"),
            KeyEvent::Fn(k) => write!(f, "{k:?}"),
            KeyEvent::Ctrl(k) => write!(f, "C-{k}"),
            KeyEvent::Meta(k) => write!(f, "M-{k}"),
            KeyEvent::Shift(k) => write!(f, "S-{k}"),
            KeyEvent::Signal(s) => write!(f, "<{s:?}>"),
        }
    }
}
