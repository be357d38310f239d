//! Session driver (§4.8 / C8): the glue between the back-end, the
//! dispatcher, and the line-state/history/completion components — prompt
//! emission, the top-level `read_line` family, interrupt handling, and
//! preferences loading.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::completion::{CompletionResult, Completer};
use crate::config::{BellStyle, Config, CompletionType};
use crate::error::{ReadlineError, Result};
use crate::history::{History, HistoryCursor};
use crate::keymap::emacs;
use crate::keymap::vi::{self, ViAction, ViMachine};
use crate::keymap::{Cmd, Dispatcher, KeyTrie, Motion};
use crate::keys::{KeyEvent, Signal};
use crate::kill_ring::{KillDirection, KillRing};
use crate::line_buffer::{LineBuffer, WordKind};
use crate::render::Renderer;
use crate::search::ReverseSearch;
use crate::tty::dumb::DumbTerminal;
#[cfg(windows)]
use crate::tty::console::ConsoleTerminal;
#[cfg(unix)]
use crate::tty::unix::UnixTerminal;
use crate::tty::{RawModeGuard, Terminal};
use crate::undo::UndoLog;

/// How `read_line`'s input should be echoed (§6 `readPassword`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Echo {
    Plain,
    Masked(Option<char>),
}

/// What a completed editing session produced.
#[derive(Debug)]
enum LineOutcome {
    Finished(String),
    Eof,
}

/// RAII guard for either back-end's raw mode, so `Editor` doesn't need to be
/// generic over one.
enum AnyGuard {
    #[cfg(unix)]
    Unix(<UnixTerminal as Terminal>::Guard),
    #[cfg(windows)]
    Console(<ConsoleTerminal as Terminal>::Guard),
    Dumb(<DumbTerminal as Terminal>::Guard),
}

impl RawModeGuard for AnyGuard {}

/// Either real back-end, chosen once at construction (§4.1's terminfo/
/// dumb-terminal/console three-way split).
enum AnyTerminal {
    #[cfg(unix)]
    Unix(UnixTerminal),
    #[cfg(windows)]
    Console(ConsoleTerminal),
    Dumb(DumbTerminal),
}

impl AnyTerminal {
    fn auto_detect() -> Self {
        #[cfg(windows)]
        {
            // §6: "On Windows none of the above applies; the console
            // back-end is used unconditionally" — no `TERM`-based dumb
            // fallback on this platform.
            return AnyTerminal::Console(ConsoleTerminal::new());
        }
        #[cfg(unix)]
        {
            if crate::tty::is_dumb_term() {
                AnyTerminal::Dumb(DumbTerminal::new())
            } else {
                AnyTerminal::Unix(UnixTerminal::new())
            }
        }
        #[cfg(not(any(unix, windows)))]
        {
            AnyTerminal::Dumb(DumbTerminal::new())
        }
    }
}

impl Terminal for AnyTerminal {
    type Guard = AnyGuard;

    fn enter_raw_mode(&mut self) -> Result<Self::Guard> {
        match self {
            #[cfg(unix)]
            AnyTerminal::Unix(t) => Ok(AnyGuard::Unix(t.enter_raw_mode()?)),
            #[cfg(windows)]
            AnyTerminal::Console(t) => Ok(AnyGuard::Console(t.enter_raw_mode()?)),
            AnyTerminal::Dumb(t) => Ok(AnyGuard::Dumb(t.enter_raw_mode()?)),
        }
    }

    fn size(&self) -> Result<crate::tty::Size> {
        match self {
            #[cfg(unix)]
            AnyTerminal::Unix(t) => t.size(),
            #[cfg(windows)]
            AnyTerminal::Console(t) => t.size(),
            AnyTerminal::Dumb(t) => t.size(),
        }
    }

    fn is_input_tty(&self) -> bool {
        match self {
            #[cfg(unix)]
            AnyTerminal::Unix(t) => t.is_input_tty(),
            #[cfg(windows)]
            AnyTerminal::Console(t) => t.is_input_tty(),
            AnyTerminal::Dumb(t) => t.is_input_tty(),
        }
    }

    fn read_event(&mut self, timeout: Option<Duration>) -> Result<Option<KeyEvent>> {
        match self {
            #[cfg(unix)]
            AnyTerminal::Unix(t) => t.read_event(timeout),
            #[cfg(windows)]
            AnyTerminal::Console(t) => t.read_event(timeout),
            AnyTerminal::Dumb(t) => t.read_event(timeout),
        }
    }

    fn write_str(&mut self, s: &str) -> Result<()> {
        match self {
            #[cfg(unix)]
            AnyTerminal::Unix(t) => t.write_str(s),
            #[cfg(windows)]
            AnyTerminal::Console(t) => t.write_str(s),
            AnyTerminal::Dumb(t) => t.write_str(s),
        }
    }

    fn move_cursor_left(&mut self, n: u16) -> Result<()> {
        match self {
            #[cfg(unix)]
            AnyTerminal::Unix(t) => t.move_cursor_left(n),
            #[cfg(windows)]
            AnyTerminal::Console(t) => t.move_cursor_left(n),
            AnyTerminal::Dumb(t) => t.move_cursor_left(n),
        }
    }

    fn move_cursor_right(&mut self, n: u16) -> Result<()> {
        match self {
            #[cfg(unix)]
            AnyTerminal::Unix(t) => t.move_cursor_right(n),
            #[cfg(windows)]
            AnyTerminal::Console(t) => t.move_cursor_right(n),
            AnyTerminal::Dumb(t) => t.move_cursor_right(n),
        }
    }

    fn move_cursor_up(&mut self, n: u16) -> Result<()> {
        match self {
            #[cfg(unix)]
            AnyTerminal::Unix(t) => t.move_cursor_up(n),
            #[cfg(windows)]
            AnyTerminal::Console(t) => t.move_cursor_up(n),
            AnyTerminal::Dumb(t) => t.move_cursor_up(n),
        }
    }

    fn move_cursor_down(&mut self, n: u16) -> Result<()> {
        match self {
            #[cfg(unix)]
            AnyTerminal::Unix(t) => t.move_cursor_down(n),
            #[cfg(windows)]
            AnyTerminal::Console(t) => t.move_cursor_down(n),
            AnyTerminal::Dumb(t) => t.move_cursor_down(n),
        }
    }

    fn move_to_column(&mut self, col: u16) -> Result<()> {
        match self {
            #[cfg(unix)]
            AnyTerminal::Unix(t) => t.move_to_column(col),
            #[cfg(windows)]
            AnyTerminal::Console(t) => t.move_to_column(col),
            AnyTerminal::Dumb(t) => t.move_to_column(col),
        }
    }

    fn clear_to_end_of_line(&mut self) -> Result<()> {
        match self {
            #[cfg(unix)]
            AnyTerminal::Unix(t) => t.clear_to_end_of_line(),
            #[cfg(windows)]
            AnyTerminal::Console(t) => t.clear_to_end_of_line(),
            AnyTerminal::Dumb(t) => t.clear_to_end_of_line(),
        }
    }

    fn clear_to_end_of_screen(&mut self) -> Result<()> {
        match self {
            #[cfg(unix)]
            AnyTerminal::Unix(t) => t.clear_to_end_of_screen(),
            #[cfg(windows)]
            AnyTerminal::Console(t) => t.clear_to_end_of_screen(),
            AnyTerminal::Dumb(t) => t.clear_to_end_of_screen(),
        }
    }

    fn ring_bell(&mut self) -> Result<()> {
        match self {
            #[cfg(unix)]
            AnyTerminal::Unix(t) => t.ring_bell(),
            #[cfg(windows)]
            AnyTerminal::Console(t) => t.ring_bell(),
            AnyTerminal::Dumb(t) => t.ring_bell(),
        }
    }

    fn flush(&mut self) -> Result<()> {
        match self {
            #[cfg(unix)]
            AnyTerminal::Unix(t) => t.flush(),
            #[cfg(windows)]
            AnyTerminal::Console(t) => t.flush(),
            AnyTerminal::Dumb(t) => t.flush(),
        }
    }

    fn flash(&mut self) -> Result<()> {
        match self {
            #[cfg(unix)]
            AnyTerminal::Unix(t) => t.flash(),
            #[cfg(windows)]
            AnyTerminal::Console(t) => t.flash(),
            AnyTerminal::Dumb(t) => t.flash(),
        }
    }

    fn supports_multiline(&self) -> bool {
        match self {
            #[cfg(unix)]
            AnyTerminal::Unix(t) => t.supports_multiline(),
            #[cfg(windows)]
            AnyTerminal::Console(t) => t.supports_multiline(),
            AnyTerminal::Dumb(t) => t.supports_multiline(),
        }
    }
}

/// A line-editing session (C8). Owns the terminal back-end, history, kill
/// ring, and keymaps; `read_line` and friends are the public entry points.
pub struct Editor {
    config: Config,
    term: AnyTerminal,
    renderer: Renderer,
    history: History,
    kill_ring: KillRing,
    emacs_keymap: KeyTrie,
    vi_insert_keymap: KeyTrie,
    vi_command_keymap: KeyTrie,
    completer: Option<Box<dyn Completer>>,
}

impl Editor {
    /// Build a session from `config`, auto-detecting the terminal back-end
    /// (§4.1's terminfo/dumb split).
    #[must_use]
    pub fn new(config: Config) -> Self {
        let history = History::new(&config);
        Self {
            config,
            term: AnyTerminal::auto_detect(),
            renderer: Renderer::new(),
            history,
            kill_ring: KillRing::new(),
            emacs_keymap: emacs::default_keymap(),
            vi_insert_keymap: vi::insert_keymap(),
            vi_command_keymap: vi::command_keymap(),
            completer: None,
        }
    }

    pub fn set_completer(&mut self, completer: impl Completer + 'static) {
        self.completer = Some(Box::new(completer));
    }

    /// Load persisted history from `path` (§6); tolerated failure per §7
    /// `HistoryIoError` — logs and proceeds with an empty in-memory history.
    pub fn load_history(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        self.history = History::new(&self.config);
        if let Err(e) = self.history.load(path) {
            log::warn!("failed to load history from {}: {e}", path.display());
        }
        self.history = std::mem::replace(&mut self.history, History::new(&self.config))
            .with_path(path.to_path_buf());
    }

    /// Persist history to its configured path, if any (§6). Failures are
    /// logged and otherwise ignored (§7 `HistoryIoError`).
    pub fn save_history(&self) {
        if let Err(e) = self.history.save() {
            log::warn!("failed to save history: {e}");
        }
    }

    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn modify_history(&mut self, f: impl FnOnce(&mut History)) {
        f(&mut self.history);
    }

    /// Print `s` above the prompt without corrupting the in-progress line
    /// (§6 `outputLine`).
    pub fn output_line(&mut self, s: &str) -> Result<()> {
        self.renderer.reset_footprint();
        self.term.write_str(s)?;
        self.term.write_str("\r\n")?;
        self.term.flush()
    }

    /// Ring the bell per `bell_style` (§3, §4.4): `None` suppresses it
    /// entirely, `Audible` writes `\x07`, `Visual` flashes the screen
    /// instead of making noise.
    fn bell(&mut self) -> Result<()> {
        match self.config.bell_style() {
            BellStyle::None => Ok(()),
            BellStyle::Audible => self.term.ring_bell(),
            BellStyle::Visual => self.term.flash(),
        }
    }

    /// `withInterrupt` (§5, §6): runs `body`, letting a `ReadlineError::Interrupted`
    /// raised by a nested `read_line` propagate out unchanged.
    pub fn with_interrupt<F, R>(&mut self, body: F) -> Result<R>
    where
        F: FnOnce(&mut Self) -> Result<R>,
    {
        body(self)
    }

    /// `handleInterrupt` (§5, §6): like [`Editor::with_interrupt`], but an
    /// `Interrupted` error is caught and replaced by `handler`'s value
    /// instead of propagating.
    pub fn handle_interrupt<F, H, R>(&mut self, handler: H, body: F) -> Result<R>
    where
        F: FnOnce(&mut Self) -> Result<R>,
        H: FnOnce(&mut Self) -> R,
    {
        match self.with_interrupt(body) {
            Ok(v) => Ok(v),
            Err(ReadlineError::Interrupted) => Ok(handler(self)),
            Err(e) => Err(e),
        }
    }

    /// `readLine(prompt)` (§6).
    pub fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        self.read_line_with_initial(prompt, ("", ""))
    }

    /// `readLineWithInitial(prompt, (left, right))` (§6).
    pub fn read_line_with_initial(
        &mut self,
        prompt: &str,
        initial: (&str, &str),
    ) -> Result<Option<String>> {
        if !self.term.is_input_tty() {
            return self.read_line_fallback(prompt);
        }
        let buf = LineBuffer::from_split(initial.0, initial.1);
        match self.run_line(prompt, buf, Echo::Plain)? {
            LineOutcome::Eof => Ok(None),
            LineOutcome::Finished(line) => {
                if self.config.auto_add_history() {
                    self.history.add(&line);
                }
                Ok(Some(line))
            }
        }
    }

    /// `readPassword(prompt, maskChar?)` (§6): input is never echoed in the
    /// clear; `mask` is the optional placeholder glyph shown per keystroke.
    pub fn read_password(&mut self, prompt: &str, mask: Option<char>) -> Result<Option<String>> {
        if !self.term.is_input_tty() {
            return self.read_line_fallback(prompt);
        }
        match self.run_line(prompt, LineBuffer::new(), Echo::Masked(mask))? {
            LineOutcome::Eof => Ok(None),
            LineOutcome::Finished(line) => Ok(Some(line)),
        }
    }

    /// `readChar(prompt)` (§6): returns the first key that decodes to a
    /// printable character, without line editing.
    pub fn read_char(&mut self, prompt: &str) -> Result<Option<char>> {
        if !self.term.is_input_tty() {
            let mut line = String::new();
            std::io::Write::flush(&mut std::io::stdout())?;
            print_prompt_plain(prompt)?;
            std::io::stdin().read_line(&mut line)?;
            return Ok(line.chars().next());
        }

        let _guard = self.term.enter_raw_mode()?;
        self.term.write_str(prompt)?;
        self.term.flush()?;
        loop {
            let Some(ev) = self.term.read_event(None)? else {
                continue;
            };
            match ev {
                KeyEvent::Signal(Signal::Interrupt) => return Err(ReadlineError::Interrupted),
                KeyEvent::Signal(_) => continue,
                KeyEvent::Ctrl(inner) if matches!(*inner, KeyEvent::Char('d')) => return Ok(None),
                other => {
                    if let Some(c) = other.as_self_insert() {
                        self.term.write_str("\r\n")?;
                        self.term.flush()?;
                        return Ok(Some(c));
                    }
                }
            }
        }
    }

    fn read_line_fallback(&mut self, prompt: &str) -> Result<Option<String>> {
        print_prompt_plain(prompt)?;
        let mut line = String::new();
        let n = std::io::stdin().read_line(&mut line)?;
        if n == 0 {
            return Ok(None);
        }
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(Some(line))
    }

    /// The shared editing loop behind every `read*` entry point that needs
    /// live interaction.
    fn run_line(&mut self, prompt: &str, mut buf: LineBuffer, echo: Echo) -> Result<LineOutcome> {
        let _guard = self.term.enter_raw_mode()?;
        let mut undo = UndoLog::new();
        let mut cursor = HistoryCursor::new(self.history.len());
        let mut last_kill: Option<KillDirection> = None;
        let mut search: Option<ReverseSearch> = None;
        let mut vi = ViMachine::new();
        let in_vi = matches!(self.config.edit_mode(), crate::config::EditMode::Vi);

        self.renderer.reset_footprint();
        self.render_current(prompt, &buf, echo, search.as_ref())?;

        let mut last_yank_len: Option<usize> = None;

        loop {
            let timeout = Some(Duration::from_millis(u64::from(self.config.keyseq_timeout_ms())));

            let Some(ev) = self.next_logical_event(timeout)? else {
                continue;
            };

            if let KeyEvent::Signal(sig) = ev {
                match sig {
                    Signal::Interrupt => return Err(ReadlineError::Interrupted),
                    Signal::Resize => {
                        self.renderer.reset_footprint();
                        self.render_current(prompt, &buf, echo, search.as_ref())?;
                    }
                    Signal::Suspend => { /* raw mode already dropped by the back-end */ }
                    Signal::Resume => {
                        self.renderer.reset_footprint();
                        self.render_current(prompt, &buf, echo, search.as_ref())?;
                    }
                }
                continue;
            }

            // Ctrl-D on an empty line is EOF regardless of discipline or
            // keymap binding (§4.4's note, §7 `EndOfInput`).
            if buf.is_empty() && is_ctrl_d(&ev) && search.is_none() {
                return Ok(LineOutcome::Eof);
            }

            if let Some(active_search) = search.as_mut() {
                if self.drive_search(active_search, ev, &mut buf)? {
                    search = None;
                }
                self.render_current(prompt, &buf, echo, search.as_ref())?;
                continue;
            }

            // Cloned rather than borrowed so the match below stays free to
            // call back into `self` (e.g. for the follow-up event read in
            // the `Ambiguous` arm) without fighting the borrow checker over
            // a live reference into one of `self`'s keymap fields.
            let active_keymap: KeyTrie = if !in_vi {
                self.emacs_keymap.clone()
            } else if matches!(vi.mode(), vi::ViMode::Insert) {
                self.vi_insert_keymap.clone()
            } else {
                self.vi_command_keymap.clone()
            };

            let mut dispatcher = Dispatcher::new(&active_keymap);
            let step = dispatcher.feed(ev);
            let cmd = match step {
                crate::keymap::Step::Matched(cmd) => Some(cmd),
                crate::keymap::Step::Ambiguous(cmd) => {
                    // Give one inter-key-timeout window for a longer
                    // sequence (e.g. Vi's `dd`) before committing.
                    match self.term.read_event(timeout)? {
                        Some(next) => {
                            match dispatcher.feed(next) {
                                crate::keymap::Step::Matched(c2) => Some(c2),
                                _ => Some(cmd),
                            }
                        }
                        None => Some(cmd),
                    }
                }
                crate::keymap::Step::Pending => dispatcher.resolve_pending(),
                crate::keymap::Step::NoMatch(orphan) => {
                    let mut out = None;
                    for key in orphan {
                        if let Some(c) = key.as_self_insert() {
                            out = Some(Cmd::SelfInsert(c));
                        } else {
                            out = Some(Cmd::Bell);
                        }
                    }
                    out
                }
            };

            let Some(cmd) = cmd else { continue };

            let outcome = if in_vi {
                last_yank_len = None;
                self.apply_vi(&mut vi, cmd, &mut buf, &mut undo, &mut last_kill, &mut cursor)?
            } else {
                self.apply_emacs(cmd, &mut buf, &mut undo, &mut last_kill, &mut last_yank_len, &mut cursor, &mut search)?
            };

            match outcome {
                StepOutcome::Continue => {}
                StepOutcome::ClearScreen => {
                    self.renderer.clear_screen(&mut self.term, &full_prompt(prompt, &search), &display_buf(&buf, echo))?;
                    continue;
                }
                StepOutcome::Finish => {
                    self.term.write_str("\r\n")?;
                    self.term.flush()?;
                    return Ok(LineOutcome::Finished(buf.to_line()));
                }
                StepOutcome::Eof => return Ok(LineOutcome::Eof),
                StepOutcome::StartSearch => {
                    search = Some(ReverseSearch::new(self.history.len()));
                }
            }

            self.render_current(prompt, &buf, echo, search.as_ref())?;
        }
    }

    fn next_logical_event(&mut self, timeout: Option<Duration>) -> Result<Option<KeyEvent>> {
        self.term.read_event(timeout)
    }

    fn render_current(
        &mut self,
        prompt: &str,
        buf: &LineBuffer,
        echo: Echo,
        search: Option<&ReverseSearch>,
    ) -> Result<()> {
        let shown = full_prompt(prompt, &search.cloned());
        let display = display_buf(buf, echo);
        self.renderer.render(&mut self.term, &shown, &display)
    }

    fn drive_search(&mut self, search: &mut ReverseSearch, ev: KeyEvent, buf: &mut LineBuffer) -> Result<bool> {
        match ev {
            KeyEvent::Ctrl(inner) if matches!(*inner, KeyEvent::Char('r')) => {
                search.advance(&self.history);
                Ok(false)
            }
            KeyEvent::Ctrl(inner) if matches!(*inner, KeyEvent::Char('g')) => {
                Ok(true) // abort; caller leaves `buf` as it was before search
            }
            KeyEvent::Fn(crate::keys::FnKey::Escape) => Ok(true),
            KeyEvent::Fn(crate::keys::FnKey::Enter) => {
                if let Some(idx) = search.matched_index() {
                    if let Some(text) = self.history.get(idx) {
                        *buf = LineBuffer::from_split(text, "");
                    }
                }
                Ok(true)
            }
            KeyEvent::Fn(crate::keys::FnKey::Backspace) => {
                search.pop_char(&self.history);
                if let Some(idx) = search.matched_index() {
                    if let Some(text) = self.history.get(idx) {
                        *buf = LineBuffer::from_split(text, "");
                    }
                }
                Ok(false)
            }
            _ => {
                if let Some(c) = ev.as_self_insert() {
                    search.push_char(c, &self.history);
                    if let Some(idx) = search.matched_index() {
                        if let Some(text) = self.history.get(idx) {
                            *buf = LineBuffer::from_split(text, "");
                        }
                    }
                }
                Ok(false)
            }
        }
    }

    fn apply_emacs(
        &mut self,
        cmd: Cmd,
        buf: &mut LineBuffer,
        undo: &mut UndoLog,
        last_kill: &mut Option<KillDirection>,
        last_yank_len: &mut Option<usize>,
        cursor: &mut HistoryCursor,
        search: &mut Option<ReverseSearch>,
    ) -> Result<StepOutcome> {
        let mut this_kill: Option<KillDirection> = None;
        let mut this_yank_len: Option<usize> = None;

        match cmd {
            Cmd::Finish => return Ok(StepOutcome::Finish),
            Cmd::Eof => return Ok(StepOutcome::Eof),
            Cmd::Move(motion) => *buf = apply_motion(buf, motion, 1),
            Cmd::DeleteMotion(motion) => {
                undo.record(buf);
                let moved = apply_motion(buf, motion, 1);
                let (result, killed) = buf.delete_between(&moved);
                let dir = motion_kill_direction(motion);
                self.kill_ring.kill(&killed, dir, *last_kill == Some(dir));
                this_kill = Some(dir);
                *buf = result;
            }
            Cmd::DeletePrevChar => {
                undo.record(buf);
                *buf = buf.delete_prev();
            }
            Cmd::DeleteNextChar => {
                undo.record(buf);
                *buf = buf.delete_next();
            }
            Cmd::TransposeChars => {
                undo.record(buf);
                *buf = buf.transpose_chars();
            }
            Cmd::Yank => {
                if let Some(text) = self.kill_ring.head() {
                    undo.record(buf);
                    let len = text.chars().count();
                    *buf = buf.insert_str(text);
                    this_yank_len = Some(len);
                }
            }
            Cmd::YankPop => {
                // Only meaningful immediately after a Yank/YankPop: replace
                // the text just inserted with the next-older kill-ring entry
                // (§3's `yank-pop`).
                if let Some(prev_len) = *last_yank_len {
                    if let Some(text) = self.kill_ring.rotate() {
                        undo.record(buf);
                        *buf = drop_left_chars(buf, prev_len).insert_str(text);
                        this_yank_len = Some(text.chars().count());
                    }
                } else {
                    self.bell()?;
                }
            }
            Cmd::Undo => {
                if let Some(prev) = undo.undo() {
                    *buf = prev;
                }
            }
            Cmd::ClearScreen => return Ok(StepOutcome::ClearScreen),
            Cmd::HistoryPrev => {
                if let Some(text) = cursor.prev(&self.history, &buf.to_line()) {
                    *buf = LineBuffer::from_split(text, "");
                }
            }
            Cmd::HistoryNext => {
                if let Some(text) = cursor.next(&self.history) {
                    *buf = LineBuffer::from_split(&text, "");
                }
            }
            Cmd::ReverseSearchStart => return Ok(StepOutcome::StartSearch),
            Cmd::Complete => {
                *buf = self.handle_complete(buf)?;
            }
            Cmd::SelfInsert(c) => {
                *buf = buf.insert_char(c);
            }
            Cmd::Bell => {
                self.bell()?;
            }
            _ => {
                self.bell()?;
            }
        }

        *last_kill = this_kill;
        *last_yank_len = this_yank_len;
        let _ = search;
        Ok(StepOutcome::Continue)
    }

    fn apply_vi(
        &mut self,
        vi: &mut ViMachine,
        cmd: Cmd,
        buf: &mut LineBuffer,
        undo: &mut UndoLog,
        last_kill: &mut Option<KillDirection>,
        cursor: &mut HistoryCursor,
    ) -> Result<StepOutcome> {
        // `Cmd::HistoryPrev`/`HistoryNext` (bound to `j`/`k` in command mode)
        // and `Cmd::Complete`/`ReverseSearchStart` bypass the modal machine:
        // they aren't part of its Insert/Command/Operator/Replace contract.
        match cmd {
            Cmd::HistoryPrev => {
                if let Some(text) = cursor.prev(&self.history, &buf.to_line()) {
                    *buf = LineBuffer::from_split(text, "");
                }
                *last_kill = None;
                return Ok(StepOutcome::Continue);
            }
            Cmd::HistoryNext => {
                if let Some(text) = cursor.next(&self.history) {
                    *buf = LineBuffer::from_split(&text, "");
                }
                *last_kill = None;
                return Ok(StepOutcome::Continue);
            }
            _ => {}
        }

        let action = vi.handle(cmd);
        *last_kill = None;

        match action {
            ViAction::Continue => {}
            ViAction::Finish => return Ok(StepOutcome::Finish),
            ViAction::Eof => return Ok(StepOutcome::Eof),
            ViAction::Bell => {
                self.bell()?;
            }
            ViAction::Motion { motion, count } => {
                *buf = apply_motion(buf, motion, count);
            }
            ViAction::Operate { op, motion, count } => {
                let (start, end) = if matches!(motion, Motion::WholeLine) {
                    (buf.move_to_start(), buf.move_to_end())
                } else {
                    (buf.clone(), apply_motion(buf, motion, count))
                };
                let (result, span) = start.delete_between(&end);
                match op {
                    vi::Operator::Yank => {
                        self.kill_ring.kill(&span, KillDirection::Forward, false);
                    }
                    vi::Operator::Delete => {
                        undo.record(buf);
                        self.kill_ring.kill(&span, KillDirection::Forward, false);
                        *buf = result;
                    }
                    vi::Operator::Change => {
                        undo.record(buf);
                        self.kill_ring.kill(&span, KillDirection::Forward, false);
                        *buf = result;
                        *vi = ViMachine::new();
                        vi.handle(Cmd::ViEnterInsert(vi::InsertEntry::Before));
                    }
                }
            }
            ViAction::EnterInsert(entry) => {
                *buf = match entry {
                    vi::InsertEntry::Before => buf.clone(),
                    vi::InsertEntry::After => buf.go_right(),
                    vi::InsertEntry::LineStart => buf.move_to_start(),
                    vi::InsertEntry::LineEnd => buf.move_to_end(),
                    // A single logical line has no "line below"/"line
                    // above" to open; `o`/`O` degrade to appending at or
                    // inserting at the respective end rather than splicing
                    // in a literal newline the renderer would have to treat
                    // as editable content.
                    vi::InsertEntry::OpenBelow => buf.move_to_end(),
                    vi::InsertEntry::OpenAbove => buf.move_to_start(),
                };
            }
            ViAction::EscapeToCommand => {
                *buf = buf.go_left();
            }
            ViAction::DeleteCharUnderCursor => {
                undo.record(buf);
                *buf = buf.delete_next();
            }
            ViAction::PasteAfter => {
                if let Some(text) = self.kill_ring.head() {
                    undo.record(buf);
                    *buf = buf.go_right().insert_str(text);
                }
            }
            ViAction::PasteBefore => {
                if let Some(text) = self.kill_ring.head() {
                    undo.record(buf);
                    *buf = buf.insert_str(text);
                }
            }
            ViAction::Undo => {
                if let Some(prev) = undo.undo() {
                    *buf = prev;
                }
            }
            ViAction::ReplacePrompt => {}
            ViAction::ReplaceChar(c) => {
                undo.record(buf);
                *buf = buf.delete_next().insert_char(c).go_left();
            }
            ViAction::StartSearch => return Ok(StepOutcome::StartSearch),
            ViAction::SelfInsertInInsertMode(c) => {
                *buf = buf.insert_char(c);
            }
            ViAction::DeletePrevCharInInsertMode => {
                *buf = buf.delete_prev();
            }
        }

        Ok(StepOutcome::Continue)
    }

    fn handle_complete(&mut self, buf: &LineBuffer) -> Result<LineBuffer> {
        let Some(completer) = self.completer.as_ref() else {
            self.bell()?;
            return Ok(buf.clone());
        };
        let left = buf.left();
        let right = buf.right();
        let result = completer.complete(&left, &right);

        if result.candidates.is_empty() {
            self.bell()?;
            return Ok(buf.clone());
        }

        match self.config.completion_type() {
            CompletionType::MenuCompletion => Ok(self.menu_complete(buf, &result, 0)),
            CompletionType::ListCompletion => self.list_or_complete(buf, &result, false),
            CompletionType::ListCompletionOrMenu => self.list_or_complete(buf, &result, true),
        }
    }

    fn list_or_complete(
        &mut self,
        buf: &LineBuffer,
        result: &CompletionResult,
        allow_menu_fallback: bool,
    ) -> Result<LineBuffer> {
        let common = crate::completion::common_prefix(&result.candidates);
        let left = buf.left();
        let new_left = format!("{}{common}", result.unused_left);

        if new_left != left {
            let mut out = LineBuffer::from_split(&new_left, &buf.right());
            if result.candidates.len() == 1 && result.candidates[0].is_finished && common == result.candidates[0].replacement
            {
                out = out.insert_str(" ");
            }
            return Ok(out);
        }

        if allow_menu_fallback {
            return Ok(self.menu_complete(buf, result, 0));
        }

        // §3/§4.6: past `completion_prompt_limit`, ask before dumping the
        // whole candidate list onto the screen.
        if result.candidates.len() > self.config.completion_prompt_limit() {
            let question = format!(
                "\r\nDisplay all {} possibilities? (y/n)",
                result.candidates.len()
            );
            self.term.write_str(&question)?;
            self.term.flush()?;
            let confirmed = self.read_yes_no()?;
            if !confirmed {
                self.term.write_str("\r\n")?;
                self.renderer.reset_footprint();
                return Ok(buf.clone());
            }
        }

        let listing = result
            .candidates
            .iter()
            .map(|c| c.display.as_str())
            .collect::<Vec<_>>()
            .join("  ");
        self.term.write_str("\r\n")?;
        self.term.write_str(&listing)?;
        self.term.write_str("\r\n")?;
        self.renderer.reset_footprint();
        Ok(buf.clone())
    }

    /// Block for a `y`/`n` keypress (the `Display all N possibilities?`
    /// prompt, §4.6); `Ctrl-C` aborts the same way it would mid-line.
    fn read_yes_no(&mut self) -> Result<bool> {
        loop {
            match self.term.read_event(None)? {
                Some(KeyEvent::Char('y' | 'Y')) => return Ok(true),
                Some(KeyEvent::Char('n' | 'N')) => return Ok(false),
                Some(KeyEvent::Signal(Signal::Interrupt)) => return Err(ReadlineError::Interrupted),
                _ => continue,
            }
        }
    }

    fn menu_complete(&self, buf: &LineBuffer, result: &CompletionResult, index: usize) -> LineBuffer {
        let cand = &result.candidates[index % result.candidates.len()];
        LineBuffer::from_split(&format!("{}{}", result.unused_left, cand.replacement), &buf.right())
    }
}

enum StepOutcome {
    Continue,
    ClearScreen,
    Finish,
    Eof,
    StartSearch,
}

fn is_ctrl_d(ev: &KeyEvent) -> bool {
    matches!(ev, KeyEvent::Ctrl(inner) if matches!(**inner, KeyEvent::Char('d')))
}

/// Drop the last `n` characters from the text left of the cursor, leaving
/// the right side untouched. Used by `yank-pop` to retract exactly the span
/// the previous yank inserted before splicing in the next kill-ring entry.
fn drop_left_chars(buf: &LineBuffer, n: usize) -> LineBuffer {
    let left: Vec<char> = buf.left().chars().collect();
    let keep = left.len().saturating_sub(n);
    let new_left: String = left[..keep].iter().collect();
    LineBuffer::from_split(&new_left, &buf.right())
}

fn apply_motion(buf: &LineBuffer, motion: Motion, times: u32) -> LineBuffer {
    let mut cur = buf.clone();
    for _ in 0..times.max(1) {
        cur = match motion {
            Motion::Left => cur.go_left(),
            Motion::Right => cur.go_right(),
            Motion::Start => cur.move_to_start(),
            Motion::End => cur.move_to_end(),
            Motion::WordLeft => cur.word_left(WordKind::Small),
            Motion::WordRight => cur.word_right(WordKind::Small),
            Motion::BigWordLeft => cur.word_left(WordKind::Big),
            Motion::BigWordRight => cur.word_right(WordKind::Big),
            Motion::WholeLine => cur,
        };
    }
    cur
}

fn motion_kill_direction(motion: Motion) -> KillDirection {
    match motion {
        Motion::Start | Motion::WordLeft | Motion::BigWordLeft | Motion::Left => KillDirection::Backward,
        _ => KillDirection::Forward,
    }
}

fn display_buf(buf: &LineBuffer, echo: Echo) -> LineBuffer {
    match echo {
        Echo::Plain => buf.clone(),
        Echo::Masked(None) => LineBuffer::new(),
        Echo::Masked(Some(c)) => {
            let left = c.to_string().repeat(buf.left().chars().count());
            let right = c.to_string().repeat(buf.right().chars().count());
            LineBuffer::from_split(&left, &right)
        }
    }
}

fn full_prompt(prompt: &str, search: &Option<ReverseSearch>) -> String {
    match search {
        None => prompt.to_string(),
        Some(s) => format!("(reverse-i-search)`{}': ", s.query()),
    }
}

fn print_prompt_plain(prompt: &str) -> Result<()> {
    use std::io::Write;
    let mut out = std::io::stdout();
    out.write_all(prompt.as_bytes())?;
    out.flush()?;
    Ok(())
}

/// Load a preferences file and build an [`Editor`] from it, falling back to
/// defaults and logging per §7 `InvalidPrefs` on a malformed file.
pub fn editor_from_prefs_file(path: impl AsRef<Path>) -> Editor {
    let path = path.as_ref();
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            let (config, errors) = crate::config::parse_prefs(&contents);
            for e in errors {
                log::warn!("{e}");
            }
            Editor::new(config)
        }
        Err(e) => {
            log::warn!("could not read prefs file {}: {e}", path.display());
            Editor::new(Config::default())
        }
    }
}

/// Default history file location: `$HOME/.lineedit_history`, mirroring the
/// teacher's own shell-history convention.
#[must_use]
pub fn default_history_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".lineedit_history"))
}
