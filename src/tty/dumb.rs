//! Dumb-terminal fallback (§4.1, §4.3): no absolute cursor addressing, no
//! multi-line wrap. [`crate::render::Renderer`] compensates with a
//! horizontal scroll window (`<`/`>` overflow markers), always repainting
//! the whole visible window from column 0 rather than issuing relative
//! cursor moves, then walking the cursor back from the end of that window
//! with literal backspace bytes — a "dumb" terminal is defined by
//! supporting backspace/CR and nothing fancier, so [`Terminal::move_cursor_left`]
//! is real here. [`Terminal::move_cursor_right`] stays a no-op: the window
//! is always rebuilt left-to-right from column 0, so nothing ever needs to
//! skip forward over content already on screen.

use std::io::{self, Write};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyModifiers};
use crossterm::terminal;

use crate::error::{ReadlineError, Result};
use crate::keys::{FnKey, KeyEvent, Signal};
use crate::tty::{RawModeGuard, Size, Terminal};

pub struct DumbRawGuard {
    _private: (),
}

impl RawModeGuard for DumbRawGuard {}

impl Drop for DumbRawGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// Fallback back-end for `TERM=dumb` and friends (§4.1's terminfo/dumb/
/// Windows three-way split). Still reads raw key events through
/// `crossterm` — it's the *output* capabilities that are assumed absent,
/// not input.
pub struct DumbTerminal {
    last_line_width: usize,
}

impl DumbTerminal {
    #[must_use]
    pub fn new() -> Self {
        Self { last_line_width: 0 }
    }
}

impl Default for DumbTerminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Terminal for DumbTerminal {
    type Guard = DumbRawGuard;

    fn enter_raw_mode(&mut self) -> Result<Self::Guard> {
        terminal::enable_raw_mode().map_err(|e| ReadlineError::Io(io::Error::from(e)))?;
        Ok(DumbRawGuard { _private: () })
    }

    fn size(&self) -> Result<Size> {
        // No terminfo capability DB to consult; assume a conservative
        // 80-column, single-row window and let the renderer's horizontal
        // scroll window handle anything longer.
        Ok(Size { cols: 80, rows: 1 })
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
        Ok(translate(ev))
    }

    fn write_str(&mut self, s: &str) -> Result<()> {
        self.last_line_width += crate::tty::display_width(s);
        io::stdout().write_all(s.as_bytes())?;
        Ok(())
    }

    fn move_cursor_left(&mut self, n: u16) -> Result<()> {
        if n > 0 {
            io::stdout().write_all("\x08".repeat(usize::from(n)).as_bytes())?;
        }
        Ok(())
    }

    fn move_cursor_right(&mut self, _n: u16) -> Result<()> {
        Ok(())
    }

    fn move_cursor_up(&mut self, _n: u16) -> Result<()> {
        Ok(())
    }

    fn move_cursor_down(&mut self, _n: u16) -> Result<()> {
        Ok(())
    }

    fn move_to_column(&mut self, col: u16) -> Result<()> {
        if col == 0 {
            io::stdout().write_all(b"\r")?;
        }
        Ok(())
    }

    fn clear_to_end_of_line(&mut self) -> Result<()> {
        let spaces = " ".repeat(self.last_line_width);
        io::stdout().write_all(spaces.as_bytes())?;
        io::stdout().write_all(b"\r")?;
        self.last_line_width = 0;
        Ok(())
    }

    fn clear_to_end_of_screen(&mut self) -> Result<()> {
        self.clear_to_end_of_line()
    }

    fn ring_bell(&mut self) -> Result<()> {
        io::stdout().write_all(b"\x07")?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        io::stdout().flush()?;
        Ok(())
    }

    fn supports_multiline(&self) -> bool {
        false
    }
}

fn translate(ev: Event) -> Option<KeyEvent> {
    match ev {
        Event::Resize(_, _) => Some(KeyEvent::Signal(Signal::Resize)),
        Event::Key(key) => {
            if key.kind == crossterm::event::KeyEventKind::Release {
                return None;
            }
            let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
            if ctrl && matches!(key.code, KeyCode::Char('c' | 'C')) {
                return Some(KeyEvent::Signal(Signal::Interrupt));
            }
            let base = match key.code {
                KeyCode::Char(c) => KeyEvent::Char(c),
                KeyCode::Backspace => KeyEvent::fn_key(FnKey::Backspace),
                KeyCode::Enter => KeyEvent::fn_key(FnKey::Enter),
                KeyCode::Tab => KeyEvent::fn_key(FnKey::Tab),
                KeyCode::Esc => KeyEvent::fn_key(FnKey::Escape),
                KeyCode::Left => KeyEvent::fn_key(FnKey::Left),
                KeyCode::Right => KeyEvent::fn_key(FnKey::Right),
                _ => return None,
            };
            Some(if ctrl {
                match &base {
                    KeyEvent::Char(c) => KeyEvent::ctrl(*c),
                    _ => KeyEvent::Ctrl(Box::new(base)),
                }
            } else {
                base
            })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_to_end_of_line_erases_exactly_what_was_written() {
        let mut term = DumbTerminal::new();
        term.last_line_width = 5;
        // Can't assert on stdout content here, but the width bookkeeping
        // resetting to zero is directly observable.
        term.clear_to_end_of_line().unwrap();
        assert_eq!(term.last_line_width, 0);
    }
}
