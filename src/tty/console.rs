//! Windows console back-end (§4.1, §6, C1): same `crossterm` event/raw-mode
//! surface as [`super::unix::UnixTerminal`], minus the Unix-only job-control
//! signal plumbing (`job_control.rs`'s SIGWINCH/SIGTSTP dance has no console
//! analogue — `crossterm` already reports a resize as `Event::Resize` on
//! this platform, and there is no POSIX-style stop/continue to intercept).
//! Per §6 ("On Windows none of the above applies; the console back-end is
//! used unconditionally"), [`super::is_dumb_term`]'s `TERM`-based dumb
//! detection is bypassed entirely when selecting this back-end.

use std::io::{self, Write};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyModifiers};
use crossterm::terminal;

use crate::error::{ReadlineError, Result};
use crate::keys::{FnKey, KeyEvent, Signal};
use crate::tty::{RawModeGuard, Size, Terminal};

pub struct ConsoleRawGuard {
    _private: (),
}

impl RawModeGuard for ConsoleRawGuard {}

impl Drop for ConsoleRawGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// `crossterm`-backed terminal for the Windows console (C1's third back-end
/// variant). Supports the same multi-line wrap and absolute cursor moves as
/// [`super::unix::UnixTerminal`]; only signal sourcing differs.
pub struct ConsoleTerminal;

impl ConsoleTerminal {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn translate(ev: Event) -> Option<KeyEvent> {
        match ev {
            Event::Resize(_, _) => Some(KeyEvent::Signal(Signal::Resize)),
            Event::Key(key) => {
                if key.kind == crossterm::event::KeyEventKind::Release {
                    return None;
                }
                let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
                let alt = key.modifiers.contains(KeyModifiers::ALT);

                // As on the Unix back-end, Ctrl-C is folded into the
                // uniform interrupt signal rather than left as a plain key
                // (§4.1 point 4) — raw mode on the console also suppresses
                // the default Ctrl-C handler via crossterm's `CTRL_C_EVENT`
                // translation.
                if ctrl && matches!(key.code, KeyCode::Char('c' | 'C')) {
                    return Some(KeyEvent::Signal(Signal::Interrupt));
                }

                let base = match key.code {
                    KeyCode::Char(c) => KeyEvent::Char(c),
                    KeyCode::Left => KeyEvent::fn_key(FnKey::Left),
                    KeyCode::Right => KeyEvent::fn_key(FnKey::Right),
                    KeyCode::Up => KeyEvent::fn_key(FnKey::Up),
                    KeyCode::Down => KeyEvent::fn_key(FnKey::Down),
                    KeyCode::Home => KeyEvent::fn_key(FnKey::Home),
                    KeyCode::End => KeyEvent::fn_key(FnKey::End),
                    KeyCode::PageUp => KeyEvent::fn_key(FnKey::PageUp),
                    KeyCode::PageDown => KeyEvent::fn_key(FnKey::PageDown),
                    KeyCode::Backspace => KeyEvent::fn_key(FnKey::Backspace),
                    KeyCode::Delete => KeyEvent::fn_key(FnKey::DeleteForward),
                    KeyCode::Tab => KeyEvent::fn_key(FnKey::Tab),
                    KeyCode::Enter => KeyEvent::fn_key(FnKey::Enter),
                    KeyCode::Esc => KeyEvent::fn_key(FnKey::Escape),
                    KeyCode::F(n) => KeyEvent::fn_key(FnKey::F(n)),
                    _ => return None,
                };

                let with_ctrl = if ctrl {
                    match &base {
                        KeyEvent::Char(c) => KeyEvent::ctrl(*c),
                        _ => KeyEvent::Ctrl(Box::new(base)),
                    }
                } else {
                    base
                };

                Some(if alt {
                    KeyEvent::Meta(Box::new(with_ctrl))
                } else {
                    with_ctrl
                })
            }
            _ => None,
        }
    }
}

impl Default for ConsoleTerminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Terminal for ConsoleTerminal {
    type Guard = ConsoleRawGuard;

    fn enter_raw_mode(&mut self) -> Result<Self::Guard> {
        terminal::enable_raw_mode().map_err(|e| ReadlineError::Io(io::Error::from(e)))?;
        Ok(ConsoleRawGuard { _private: () })
    }

    fn size(&self) -> Result<Size> {
        let (cols, rows) =
            terminal::size().map_err(|e| ReadlineError::Io(io::Error::from(e)))?;
        Ok(Size { cols, rows })
    }

    fn is_input_tty(&self) -> bool {
        io::IsTerminal::is_terminal(&io::stdin())
    }

    fn read_event(&mut self, timeout: Option<Duration>) -> Result<Option<KeyEvent>> {
        let ready = match timeout {
            Some(d) => event::poll(d).map_err(|e| ReadlineError::Io(io::Error::from(e)))?,
            None => {
                event::poll(Duration::from_secs(3600))
                    .map_err(|e| ReadlineError::Io(io::Error::from(e)))?
            }
        };
        if !ready {
            return Ok(None);
        }
        let ev = event::read().map_err(|e| ReadlineError::Io(io::Error::from(e)))?;
        Ok(Self::translate(ev))
    }

    fn write_str(&mut self, s: &str) -> Result<()> {
        io::stdout().write_all(s.as_bytes())?;
        Ok(())
    }

    fn move_cursor_left(&mut self, n: u16) -> Result<()> {
        if n == 0 {
            return Ok(());
        }
        self.write_str(&format!("\x1b[{n}D"))
    }

    fn move_cursor_right(&mut self, n: u16) -> Result<()> {
        if n == 0 {
            return Ok(());
        }
        self.write_str(&format!("\x1b[{n}C"))
    }

    fn move_cursor_up(&mut self, n: u16) -> Result<()> {
        if n == 0 {
            return Ok(());
        }
        self.write_str(&format!("\x1b[{n}A"))
    }

    fn move_cursor_down(&mut self, n: u16) -> Result<()> {
        if n == 0 {
            return Ok(());
        }
        self.write_str(&format!("\x1b[{n}B"))
    }

    fn move_to_column(&mut self, col: u16) -> Result<()> {
        self.write_str(&format!("\x1b[{}G", col + 1))
    }

    fn clear_to_end_of_line(&mut self) -> Result<()> {
        self.write_str("\x1b[K")
    }

    fn clear_to_end_of_screen(&mut self) -> Result<()> {
        self.write_str("\x1b[J")
    }

    fn ring_bell(&mut self) -> Result<()> {
        self.write_str("\x07")
    }

    fn flush(&mut self) -> Result<()> {
        io::stdout().flush()?;
        Ok(())
    }

    fn flash(&mut self) -> Result<()> {
        // Same DECSCNM reverse-video toggle as the Unix back-end; the
        // Windows terminal's ANSI processing (what the rest of this
        // back-end already relies on for cursor/erase sequences) honors it.
        self.write_str("\x1b[?5h\x1b[?5l")
    }
}
