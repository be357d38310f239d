//! Key map / command dispatcher (§4.4, C4).
//!
//! A [`KeyTrie`] binds key-event *sequences* to [`Cmd`]s. Internally it's a
//! flattened `HashMap<Vec<KeyEvent>, Cmd>` rather than a linked node tree —
//! the trie's defining property (lookups resolve by longest matching
//! prefix, and a pending prefix keeps waiting for a possible continuation)
//! is implemented over that map by [`Dispatcher`] rather than by node
//! pointers, which keeps the whole thing `Clone`-able and free of lifetime
//! plumbing while a session is juggling two keymaps (Emacs/Vi) at once.

pub mod emacs;
pub mod vi;

use std::collections::HashMap;

use crate::keys::KeyEvent;
use crate::line_buffer::WordKind;

/// A motion, usable standalone (`Cmd::Move`) or as the operand of a
/// compound delete/change/yank (`Cmd::DeleteMotion`) — §4.2's composite
/// `deleteFromMove`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Motion {
    Left,
    Right,
    Start,
    End,
    WordLeft,
    WordRight,
    BigWordLeft,
    BigWordRight,
    /// The whole line (only meaningful as a delete/change operand — `dd`,
    /// `cc`, `yy` in Vi, §4.5).
    WholeLine,
}

impl Motion {
    #[must_use]
    pub fn word_kind(self) -> Option<WordKind> {
        match self {
            Motion::WordLeft | Motion::WordRight => Some(WordKind::Small),
            Motion::BigWordLeft | Motion::BigWordRight => Some(WordKind::Big),
            _ => None,
        }
    }
}

/// Named editing commands a keymap can bind a key sequence to. This is the
/// Rust stand-in for the spec's monadic `Change | Finish | Fail | Effect`
/// command results (§4.4, §9 "polymorphism over many monads") — a plain
/// enum the session driver (C8) pattern-matches and executes, rather than a
/// closure capturing an abstract IO context.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Cmd {
    /// `Enter` — return the current line to the caller.
    Finish,
    /// `Ctrl-D` on an empty line — EOF.
    Eof,
    /// A plain cursor motion.
    Move(Motion),
    /// Delete the span `motion` would move over, pushing it onto the kill
    /// ring (§4.2's `deleteFromMove`, chained per §3).
    DeleteMotion(Motion),
    DeletePrevChar,
    DeleteNextChar,
    TransposeChars,
    Yank,
    YankPop,
    Undo,
    ClearScreen,
    HistoryPrev,
    HistoryNext,
    ReverseSearchStart,
    Complete,
    /// Insert the literal character that reached the dispatcher unbound
    /// (§4.4's "for self-insertable characters — inserts them"); never
    /// itself bound as a trie leaf.
    SelfInsert(char),
    /// Ring the bell; emitted when a key has no binding and isn't
    /// self-insertable.
    Bell,

    // ── Vi-only (§4.5) ──────────────────────────────────────────────────────
    ViEnterInsert(vi::InsertEntry),
    ViEnterCommand,
    ViOperator(vi::Operator),
    ViReplacePrompt,
    ViPasteAfter,
    ViPasteBefore,
    ViDeleteChar,
    ViUndo,
    ViDigit(u8),
}

/// Binds key sequences to commands; see module docs for the trie/map
/// tradeoff.
#[derive(Clone, Debug, Default)]
pub struct KeyTrie {
    bindings: HashMap<Vec<KeyEvent>, Cmd>,
}

impl KeyTrie {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a single key (`key +> cmd` in the spec's notation).
    pub fn bind(&mut self, key: KeyEvent, cmd: Cmd) -> &mut Self {
        self.bindings.insert(vec![key], cmd);
        self
    }

    /// Bind a multi-key sequence (e.g. Vi's `dd`).
    pub fn bind_seq(&mut self, seq: &[KeyEvent], cmd: Cmd) -> &mut Self {
        self.bindings.insert(seq.to_vec(), cmd);
        self
    }

    /// Union two keymaps (`choiceCmd`). On an exact-sequence collision the
    /// binding from `other` wins; see module docs for why this is distinct
    /// from the longer-prefix-wins dispatch rule.
    #[must_use]
    pub fn merge(mut self, other: KeyTrie) -> Self {
        for (seq, cmd) in other.bindings {
            self.bindings.insert(seq, cmd);
        }
        self
    }

    pub(crate) fn exact(&self, seq: &[KeyEvent]) -> Option<&Cmd> {
        self.bindings.get(seq)
    }

    fn has_longer_continuation(&self, seq: &[KeyEvent]) -> bool {
        self.bindings
            .keys()
            .any(|k| k.len() > seq.len() && k.starts_with(seq))
    }
}

/// One step's result from feeding a [`KeyEvent`] into a [`Dispatcher`].
#[derive(Debug)]
pub enum Step {
    /// The sequence so far has no exact binding but could still be
    /// extended by a longer one; wait for the next event (within the
    /// inter-key timeout, §4.1 point 2).
    Pending,
    /// An exact binding fired with no live longer alternative.
    Matched(Cmd),
    /// An exact binding exists AND a longer one remains possible. The
    /// caller (driven by the back-end's inter-key timeout) decides: wait
    /// for one more event, or call [`Dispatcher::resolve_pending`] to fire
    /// `cmd` now.
    Ambiguous(Cmd),
    /// No binding matches, and none ever could by extending the sequence.
    /// Carries the orphaned events back so the caller can self-insert or
    /// bell (§4.4).
    NoMatch(Vec<KeyEvent>),
}

/// Live dispatch cursor over a [`KeyTrie`] (C4).
pub struct Dispatcher<'a> {
    trie: &'a KeyTrie,
    pending: Vec<KeyEvent>,
}

impl<'a> Dispatcher<'a> {
    #[must_use]
    pub fn new(trie: &'a KeyTrie) -> Self {
        Self {
            trie,
            pending: Vec::new(),
        }
    }

    /// Feed one key event, advancing the live match.
    pub fn feed(&mut self, ev: KeyEvent) -> Step {
        self.pending.push(ev);
        let exact = self.trie.exact(&self.pending).cloned();
        let has_continuation = self.trie.has_longer_continuation(&self.pending);
        match (exact, has_continuation) {
            (Some(cmd), false) => {
                self.pending.clear();
                Step::Matched(cmd)
            }
            (Some(cmd), true) => Step::Ambiguous(cmd),
            (None, true) => Step::Pending,
            (None, false) => Step::NoMatch(std::mem::take(&mut self.pending)),
        }
    }

    /// Called when the inter-key timeout elapses with no further key: fire
    /// whatever the currently pending sequence resolves to, if anything.
    pub fn resolve_pending(&mut self) -> Option<Cmd> {
        let cmd = self.trie.exact(&self.pending).cloned();
        self.pending.clear();
        cmd
    }

    /// Abandon the in-progress sequence (used when a `Signal` event arrives
    /// mid-sequence and must not be folded into it).
    pub fn reset(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::FnKey;

    #[test]
    fn single_key_binding_matches_immediately() {
        let mut trie = KeyTrie::new();
        trie.bind(KeyEvent::fn_key(FnKey::Enter), Cmd::Finish);
        let mut d = Dispatcher::new(&trie);
        assert!(matches!(d.feed(KeyEvent::fn_key(FnKey::Enter)), Step::Matched(Cmd::Finish)));
    }

    #[test]
    fn unbound_printable_key_returns_orphan_for_self_insert() {
        let trie = KeyTrie::new();
        let mut d = Dispatcher::new(&trie);
        match d.feed(KeyEvent::Char('x')) {
            Step::NoMatch(orphan) => assert_eq!(orphan, vec![KeyEvent::Char('x')]),
            other => panic!("expected NoMatch, got {other:?}"),
        }
    }

    #[test]
    fn longer_sequence_takes_priority_while_pending() {
        let mut trie = KeyTrie::new();
        trie.bind(KeyEvent::Char('d'), Cmd::DeletePrevChar);
        trie.bind_seq(&[KeyEvent::Char('d'), KeyEvent::Char('d')], Cmd::DeleteMotion(Motion::WholeLine));
        let mut d = Dispatcher::new(&trie);
        match d.feed(KeyEvent::Char('d')) {
            Step::Ambiguous(Cmd::DeletePrevChar) => {}
            other => panic!("expected Ambiguous(DeletePrevChar), got {other:?}"),
        }
        match d.feed(KeyEvent::Char('d')) {
            Step::Matched(Cmd::DeleteMotion(Motion::WholeLine)) => {}
            other => panic!("expected Matched(DeleteMotion(WholeLine)), got {other:?}"),
        }
    }

    #[test]
    fn resolve_pending_fires_short_binding_after_timeout() {
        let mut trie = KeyTrie::new();
        trie.bind(KeyEvent::Char('d'), Cmd::DeletePrevChar);
        trie.bind_seq(&[KeyEvent::Char('d'), KeyEvent::Char('d')], Cmd::DeleteMotion(Motion::WholeLine));
        let mut d = Dispatcher::new(&trie);
        d.feed(KeyEvent::Char('d'));
        assert_eq!(d.resolve_pending(), Some(Cmd::DeletePrevChar));
    }

    #[test]
    fn merge_resolves_collisions_in_favor_of_the_latter_map() {
        let mut a = KeyTrie::new();
        a.bind(KeyEvent::Char('k'), Cmd::Bell);
        let mut b = KeyTrie::new();
        b.bind(KeyEvent::Char('k'), Cmd::Finish);
        let merged = a.merge(b);
        assert_eq!(merged.exact(&[KeyEvent::Char('k')]), Some(&Cmd::Finish));
    }
}
