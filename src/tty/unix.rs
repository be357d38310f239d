//! Unix back-end (§4.1, C1): `crossterm` for raw mode, key decoding and
//! cursor/erase primitives; `libc` for the job-control signal dance that
//! `crossterm` doesn't cover (SIGWINCH, and the self-suspend-on-Ctrl-Z
//! pattern real shells use once `ISIG` is off). The retry-on-`EINTR` and
//! guard-restores-previous-state style here is carried over from this
//! crate's shell-interpreter ancestor's job-control guards.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Once;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyModifiers};
use crossterm::terminal;

use crate::error::{ReadlineError, Result};
use crate::keys::{FnKey, KeyEvent, Signal};
use crate::tty::{RawModeGuard, Size, Terminal};

static SIGWINCH_SEEN: AtomicBool = AtomicBool::new(false);
static SIGCONT_SEEN: AtomicBool = AtomicBool::new(false);
static HANDLERS_INSTALLED: Once = Once::new();

extern "C" fn on_sigwinch(_sig: libc::c_int) {
    SIGWINCH_SEEN.store(true, Ordering::SeqCst);
}

extern "C" fn on_sigcont(_sig: libc::c_int) {
    SIGCONT_SEEN.store(true, Ordering::SeqCst);
}

fn install_handlers() {
    HANDLERS_INSTALLED.call_once(|| unsafe {
        libc::signal(libc::SIGWINCH, on_sigwinch as libc::sighandler_t);
        libc::signal(libc::SIGCONT, on_sigcont as libc::sighandler_t);
    });
}

/// Drops raw mode when the session's `read_line` call ends.
pub struct UnixRawGuard {
    _private: (),
}

impl RawModeGuard for UnixRawGuard {}

impl Drop for UnixRawGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// `crossterm`-backed terminal for real TTYs.
pub struct UnixTerminal {
    /// A `Signal::Resume` queued by a just-completed Ctrl-Z suspend dance,
    /// delivered on the *next* call to `read_event` rather than bundled
    /// with `Signal::Suspend` (§5's ordering guarantee: the dispatcher
    /// sees Suspend, then — once actually resumed — Resume).
    pending_resume: bool,
}

impl UnixTerminal {
    #[must_use]
    pub fn new() -> Self {
        install_handlers();
        Self {
            pending_resume: false,
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
                let alt = key.modifiers.contains(KeyModifiers::ALT);

                // Ctrl-C is reinterpreted as the uniform interrupt signal
                // rather than a plain control key, since raw mode has
                // deliberately disabled the line discipline's own SIGINT
                // generation (§4.1 point 4).
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

    /// Ctrl-Z reaches us as a plain keystroke (raw mode disabled `ISIG`);
    /// replay what a cooked terminal would have done — stop the whole
    /// process group — by dropping raw mode and raising SIGTSTP ourselves.
    fn self_suspend(&mut self) -> Result<()> {
        terminal::disable_raw_mode().map_err(|e| ReadlineError::Io(io::Error::from(e)))?;
        unsafe {
            libc::raise(libc::SIGTSTP);
        }
        // Execution resumes here once a SIGCONT (from the shell's `fg`)
        // wakes the stopped process back up.
        terminal::enable_raw_mode().map_err(|e| ReadlineError::Io(io::Error::from(e)))?;
        self.pending_resume = true;
        Ok(())
    }
}

impl Default for UnixTerminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Terminal for UnixTerminal {
    type Guard = UnixRawGuard;

    fn enter_raw_mode(&mut self) -> Result<Self::Guard> {
        terminal::enable_raw_mode().map_err(|e| ReadlineError::Io(io::Error::from(e)))?;
        Ok(UnixRawGuard { _private: () })
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
        if self.pending_resume {
            self.pending_resume = false;
            SIGCONT_SEEN.store(false, Ordering::SeqCst);
            return Ok(Some(KeyEvent::Signal(Signal::Resume)));
        }
        if SIGWINCH_SEEN.swap(false, Ordering::SeqCst) {
            return Ok(Some(KeyEvent::Signal(Signal::Resize)));
        }
        if SIGCONT_SEEN.swap(false, Ordering::SeqCst) {
            return Ok(Some(KeyEvent::Signal(Signal::Resume)));
        }

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

        if let Event::Key(key) = &ev {
            if key.modifiers.contains(KeyModifiers::CONTROL) && matches!(key.code, KeyCode::Char('z' | 'Z'))
            {
                self.self_suspend()?;
                return Ok(Some(KeyEvent::Signal(Signal::Suspend)));
            }
        }

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
        // terminfo's `flash` capability, widely supported as the DECSCNM
        // reverse-video toggle: flip the whole screen and flip it back.
        self.write_str("\x1b[?5h\x1b[?5l")
    }
}
