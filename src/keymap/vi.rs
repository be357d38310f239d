//! Vi editing discipline (§4.5): Insert and Command key maps plus the
//! modal state machine (Insert / Command / PendingOperator / PendingReplace)
//! that sits above them. Per §9's design note, this is modeled as an
//! exhaustive match over tagged variants rather than ad hoc conditionals.

use super::{Cmd, KeyTrie, Motion};
use crate::keys::{FnKey, KeyEvent};

/// Where `i a I A o O` positions the cursor on entering Insert mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InsertEntry {
    /// `i` — insert before the cursor (no motion needed).
    Before,
    /// `a` — insert after the cursor.
    After,
    /// `I` — insert at the start of the line.
    LineStart,
    /// `A` — insert at the end of the line.
    LineEnd,
    /// `o` — open a new line below and insert there.
    OpenBelow,
    /// `O` — open a new line above and insert there.
    OpenAbove,
}

/// An operator awaiting a motion (§4.5's `PendingOperator(op)`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operator {
    Delete,
    Change,
    Yank,
}

/// The Vi sub-machine's state (§4.5's transition table).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViMode {
    Insert,
    Command,
    PendingOperator { op: Operator, count: u32 },
    PendingReplace,
}

/// What the session driver should do in response to a raw [`Cmd`] reaching
/// the Vi machine. This is the machine's half of the transition table;
/// executing an action against the line state lives in `editor.rs`, which
/// owns the buffer, kill ring, and undo log the machine itself is
/// deliberately kept ignorant of.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViAction {
    /// Apply a plain motion `count` times.
    Motion { motion: Motion, count: u32 },
    /// Apply `op` over `motion` (or the whole line), `count` times.
    Operate {
        op: Operator,
        motion: Motion,
        count: u32,
    },
    EnterInsert(InsertEntry),
    EscapeToCommand,
    DeleteCharUnderCursor,
    PasteAfter,
    PasteBefore,
    Undo,
    ReplacePrompt,
    ReplaceChar(char),
    StartSearch,
    Finish,
    Eof,
    SelfInsertInInsertMode(char),
    DeletePrevCharInInsertMode,
    Bell,
    /// More input needed (e.g. an operator awaiting its motion, or a count
    /// digit awaiting more digits); nothing to execute yet.
    Continue,
}

/// Drives the Vi modal state machine. Key lookup is delegated to
/// [`insert_keymap`]/[`command_keymap`] by the caller, which feeds the
/// resulting [`Cmd`] into [`ViMachine::handle`].
#[derive(Clone, Debug)]
pub struct ViMachine {
    mode: ViMode,
    /// Count accumulated in Command mode before an operator or motion.
    count: u32,
}

impl Default for ViMachine {
    fn default() -> Self {
        Self {
            mode: ViMode::Command,
            count: 0,
        }
    }
}

impl ViMachine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn mode(&self) -> &ViMode {
        &self.mode
    }

    /// `Esc` in Insert mode drops back to Command with the cursor moved one
    /// left if possible — the session driver applies that motion itself
    /// when it sees `EscapeToCommand`.
    fn take_count(&mut self) -> u32 {
        let n = if self.count == 0 { 1 } else { self.count };
        self.count = 0;
        n
    }

    pub fn handle(&mut self, cmd: Cmd) -> ViAction {
        match std::mem::replace(&mut self.mode, ViMode::Command) {
            ViMode::Insert => self.handle_insert(cmd),
            ViMode::Command => self.handle_command(cmd),
            ViMode::PendingOperator { op, count } => self.handle_pending_operator(op, count, cmd),
            ViMode::PendingReplace => self.handle_pending_replace(cmd),
        }
    }

    fn handle_insert(&mut self, cmd: Cmd) -> ViAction {
        match cmd {
            Cmd::ViEnterCommand => ViAction::EscapeToCommand,
            Cmd::SelfInsert(c) => {
                self.mode = ViMode::Insert;
                ViAction::SelfInsertInInsertMode(c)
            }
            Cmd::DeletePrevChar => {
                self.mode = ViMode::Insert;
                ViAction::DeletePrevCharInInsertMode
            }
            Cmd::Finish => ViAction::Finish,
            Cmd::Eof => ViAction::Eof,
            _ => {
                self.mode = ViMode::Insert;
                ViAction::Continue
            }
        }
    }

    fn handle_command(&mut self, cmd: Cmd) -> ViAction {
        match cmd {
            Cmd::Finish => ViAction::Finish,
            Cmd::Eof => ViAction::Eof,
            Cmd::ViDigit(0) if self.count == 0 => {
                self.mode = ViMode::Command;
                ViAction::Motion {
                    motion: Motion::Start,
                    count: 1,
                }
            }
            Cmd::ViDigit(d) => {
                self.count = self.count.saturating_mul(10).saturating_add(u32::from(d));
                self.mode = ViMode::Command;
                ViAction::Continue
            }
            Cmd::Move(motion) => {
                self.mode = ViMode::Command;
                ViAction::Motion {
                    motion,
                    count: self.take_count(),
                }
            }
            Cmd::ViOperator(op) => {
                let count = self.take_count();
                self.mode = ViMode::PendingOperator { op, count };
                ViAction::Continue
            }
            Cmd::ViEnterInsert(entry) => {
                self.mode = ViMode::Insert;
                ViAction::EnterInsert(entry)
            }
            Cmd::ViDeleteChar => {
                self.mode = ViMode::Command;
                ViAction::DeleteCharUnderCursor
            }
            Cmd::ViPasteAfter => {
                self.mode = ViMode::Command;
                ViAction::PasteAfter
            }
            Cmd::ViPasteBefore => {
                self.mode = ViMode::Command;
                ViAction::PasteBefore
            }
            Cmd::ViUndo => {
                self.mode = ViMode::Command;
                ViAction::Undo
            }
            Cmd::ViReplacePrompt => {
                self.mode = ViMode::PendingReplace;
                ViAction::Continue
            }
            Cmd::ReverseSearchStart => {
                self.mode = ViMode::Command;
                ViAction::StartSearch
            }
            _ => {
                self.mode = ViMode::Command;
                ViAction::Bell
            }
        }
    }

    fn handle_pending_operator(&mut self, op: Operator, count: u32, cmd: Cmd) -> ViAction {
        match cmd {
            // `dd`, `cc`, `yy`: the operator letter doubled operates on the
            // whole line (§4.5).
            Cmd::ViOperator(op2) if op2 == op => {
                self.mode = ViMode::Command;
                ViAction::Operate {
                    op,
                    motion: Motion::WholeLine,
                    count,
                }
            }
            Cmd::ViDigit(d) => {
                // A count between the operator and its motion multiplies
                // with the operator's own count (classic Vi: `2d3w`).
                self.mode = ViMode::PendingOperator {
                    op,
                    count: count.saturating_mul(if d == 0 { 1 } else { 10 }).saturating_add(u32::from(d)),
                };
                ViAction::Continue
            }
            Cmd::Move(motion) => {
                self.mode = ViMode::Command;
                ViAction::Operate { op, motion, count }
            }
            _ => {
                self.mode = ViMode::Command;
                ViAction::Bell
            }
        }
    }

    fn handle_pending_replace(&mut self, cmd: Cmd) -> ViAction {
        self.mode = ViMode::Command;
        match cmd {
            Cmd::SelfInsert(c) => ViAction::ReplaceChar(c),
            _ => ViAction::Bell,
        }
    }
}

/// Insert sub-state key map: like Emacs insert, plus `Escape` back to
/// Command (§4.5).
#[must_use]
pub fn insert_keymap() -> KeyTrie {
    let mut m = KeyTrie::new();
    m.bind(KeyEvent::fn_key(FnKey::Escape), Cmd::ViEnterCommand);
    m.bind(KeyEvent::fn_key(FnKey::Enter), Cmd::Finish);
    m.bind(KeyEvent::ctrl('j'), Cmd::Finish);
    m.bind(KeyEvent::fn_key(FnKey::Backspace), Cmd::DeletePrevChar);
    m.bind(KeyEvent::ctrl('h'), Cmd::DeletePrevChar);
    m.bind(KeyEvent::ctrl('d'), Cmd::Eof);
    m
}

/// Command sub-state key map (§4.5).
#[must_use]
pub fn command_keymap() -> KeyTrie {
    let mut m = KeyTrie::new();

    m.bind(KeyEvent::Char('h'), Cmd::Move(Motion::Left));
    m.bind(KeyEvent::Char('l'), Cmd::Move(Motion::Right));
    m.bind(KeyEvent::fn_key(FnKey::Left), Cmd::Move(Motion::Left));
    m.bind(KeyEvent::fn_key(FnKey::Right), Cmd::Move(Motion::Right));
    // No second physical line in a single logical buffer: `j`/`k` walk
    // history instead, matching how Vi-mode shells commonly repurpose them.
    m.bind(KeyEvent::Char('j'), Cmd::HistoryNext);
    m.bind(KeyEvent::Char('k'), Cmd::HistoryPrev);

    m.bind(KeyEvent::Char('w'), Cmd::Move(Motion::WordRight));
    m.bind(KeyEvent::Char('b'), Cmd::Move(Motion::WordLeft));
    m.bind(KeyEvent::Char('e'), Cmd::Move(Motion::WordRight));
    m.bind(KeyEvent::Char('0'), Cmd::ViDigit(0));
    m.bind(KeyEvent::Char('^'), Cmd::Move(Motion::Start));
    m.bind(KeyEvent::Char('$'), Cmd::Move(Motion::End));

    for d in 1..=9u8 {
        let c = char::from(b'0' + d);
        m.bind(KeyEvent::Char(c), Cmd::ViDigit(d));
    }

    m.bind(KeyEvent::Char('d'), Cmd::ViOperator(Operator::Delete));
    m.bind(KeyEvent::Char('c'), Cmd::ViOperator(Operator::Change));
    m.bind(KeyEvent::Char('y'), Cmd::ViOperator(Operator::Yank));

    m.bind(KeyEvent::Char('x'), Cmd::ViDeleteChar);
    m.bind(KeyEvent::Char('p'), Cmd::ViPasteAfter);
    m.bind(KeyEvent::Char('P'), Cmd::ViPasteBefore);
    m.bind(KeyEvent::Char('u'), Cmd::ViUndo);

    m.bind(KeyEvent::Char('i'), Cmd::ViEnterInsert(InsertEntry::Before));
    m.bind(KeyEvent::Char('a'), Cmd::ViEnterInsert(InsertEntry::After));
    m.bind(KeyEvent::Char('I'), Cmd::ViEnterInsert(InsertEntry::LineStart));
    m.bind(KeyEvent::Char('A'), Cmd::ViEnterInsert(InsertEntry::LineEnd));
    m.bind(KeyEvent::Char('o'), Cmd::ViEnterInsert(InsertEntry::OpenBelow));
    m.bind(KeyEvent::Char('O'), Cmd::ViEnterInsert(InsertEntry::OpenAbove));

    m.bind(KeyEvent::Char('r'), Cmd::ViReplacePrompt);
    m.bind(KeyEvent::Char('/'), Cmd::ReverseSearchStart);
    m.bind(KeyEvent::Char('?'), Cmd::ReverseSearchStart);

    m.bind(KeyEvent::fn_key(FnKey::Enter), Cmd::Finish);
    // Ctrl-D's EOF-on-empty-line behavior is handled by the session driver
    // inspecting the raw key before dispatch (see `emacs.rs`); Command mode
    // otherwise leaves Ctrl-D unbound.

    m
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dw_deletes_a_word() {
        let mut vm = ViMachine::new();
        assert_eq!(
            vm.handle(Cmd::ViOperator(Operator::Delete)),
            ViAction::Continue
        );
        assert_eq!(
            vm.handle(Cmd::Move(Motion::WordRight)),
            ViAction::Operate {
                op: Operator::Delete,
                motion: Motion::WordRight,
                count: 1,
            }
        );
    }

    #[test]
    fn dd_operates_on_whole_line() {
        let mut vm = ViMachine::new();
        vm.handle(Cmd::ViOperator(Operator::Delete));
        let action = vm.handle(Cmd::ViOperator(Operator::Delete));
        assert_eq!(
            action,
            ViAction::Operate {
                op: Operator::Delete,
                motion: Motion::WholeLine,
                count: 1,
            }
        );
    }

    #[test]
    fn count_prefix_multiplies_motion() {
        let mut vm = ViMachine::new();
        assert_eq!(vm.handle(Cmd::ViDigit(3)), ViAction::Continue);
        assert_eq!(
            vm.handle(Cmd::Move(Motion::Right)),
            ViAction::Motion {
                motion: Motion::Right,
                count: 3,
            }
        );
    }

    #[test]
    fn leading_zero_with_no_count_is_move_to_start() {
        let mut vm = ViMachine::new();
        assert_eq!(
            vm.handle(Cmd::ViDigit(0)),
            ViAction::Motion {
                motion: Motion::Start,
                count: 1,
            }
        );
    }

    #[test]
    fn zero_after_nonzero_digit_extends_the_count() {
        let mut vm = ViMachine::new();
        vm.handle(Cmd::ViDigit(3));
        assert_eq!(vm.handle(Cmd::ViDigit(0)), ViAction::Continue);
        assert_eq!(
            vm.handle(Cmd::Move(Motion::Right)),
            ViAction::Motion {
                motion: Motion::Right,
                count: 30,
            }
        );
    }

    #[test]
    fn replace_char_round_trip() {
        let mut vm = ViMachine::new();
        assert_eq!(vm.handle(Cmd::ViReplacePrompt), ViAction::Continue);
        assert_eq!(
            vm.handle(Cmd::SelfInsert('q')),
            ViAction::ReplaceChar('q')
        );
    }

    #[test]
    fn escape_from_insert_returns_to_command() {
        let mut vm = ViMachine::new();
        vm.handle(Cmd::ViEnterInsert(InsertEntry::Before));
        assert_eq!(vm.handle(Cmd::ViEnterCommand), ViAction::EscapeToCommand);
    }
}
