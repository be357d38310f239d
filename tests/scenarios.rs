//! End-to-end scenarios: feed synthetic key-event sequences through the
//! public dispatcher/keymap/line-buffer/kill-ring surface and check the
//! resulting line, the same way a session driver would, without needing a
//! real terminal underneath.

use lineedit::keymap::emacs;
use lineedit::keymap::vi::{self, ViAction, ViMachine};
use lineedit::keymap::{Cmd, Dispatcher, KeyTrie, Motion, Step};
use lineedit::keys::KeyEvent;
use lineedit::kill_ring::{KillDirection, KillRing};
use lineedit::line_buffer::LineBuffer;

/// Feed one whole sequence of events through `trie`, resolving an
/// `Ambiguous` step immediately (as if the inter-key timeout always fires
/// before the next key) unless the very next event extends it.
fn run_emacs(trie: &KeyTrie, events: &[KeyEvent], mut buf: LineBuffer) -> (LineBuffer, Vec<Cmd>) {
    let mut dispatcher = Dispatcher::new(trie);
    let mut cmds = Vec::new();
    for ev in events {
        match dispatcher.feed(ev.clone()) {
            Step::Matched(cmd) | Step::Ambiguous(cmd) => cmds.push(cmd),
            Step::Pending => {}
            Step::NoMatch(orphan) => {
                for e in orphan {
                    if let Some(c) = e.as_self_insert() {
                        cmds.push(Cmd::SelfInsert(c));
                    } else {
                        cmds.push(Cmd::Bell);
                    }
                }
            }
        }
    }
    if let Some(cmd) = dispatcher.resolve_pending() {
        cmds.push(cmd);
    }

    let mut kill_ring = KillRing::new();
    let mut last_kill: Option<KillDirection> = None;
    for cmd in &cmds {
        buf = apply(&mut kill_ring, &mut last_kill, cmd.clone(), buf);
    }
    (buf, cmds)
}

fn apply(kill_ring: &mut KillRing, last_kill: &mut Option<KillDirection>, cmd: Cmd, buf: LineBuffer) -> LineBuffer {
    match cmd {
        Cmd::SelfInsert(c) => {
            *last_kill = None;
            buf.insert_char(c)
        }
        Cmd::Move(m) => apply_motion(&buf, m),
        Cmd::DeleteMotion(m) => {
            let moved = apply_motion(&buf, m);
            let (next, killed) = buf.delete_between(&moved);
            let dir = motion_kill_direction(m);
            let chain = *last_kill == Some(dir);
            kill_ring.kill(&killed, dir, chain);
            *last_kill = Some(dir);
            next
        }
        Cmd::DeletePrevChar => {
            *last_kill = None;
            buf.delete_prev()
        }
        Cmd::DeleteNextChar => {
            *last_kill = None;
            buf.delete_next()
        }
        Cmd::TransposeChars => {
            *last_kill = None;
            buf.transpose_chars()
        }
        Cmd::Yank => {
            *last_kill = None;
            match kill_ring.head() {
                Some(text) => buf.insert_str(text),
                None => buf,
            }
        }
        Cmd::Finish | Cmd::Eof | Cmd::Bell | Cmd::ClearScreen | Cmd::Undo | Cmd::HistoryPrev
        | Cmd::HistoryNext | Cmd::ReverseSearchStart | Cmd::Complete | Cmd::YankPop => buf,
        other => panic!("scenario does not expect {other:?}"),
    }
}

fn apply_motion(buf: &LineBuffer, motion: Motion) -> LineBuffer {
    match motion {
        Motion::Left => buf.go_left(),
        Motion::Right => buf.go_right(),
        Motion::Start => buf.move_to_start(),
        Motion::End => buf.move_to_end(),
        Motion::WordLeft => buf.word_left(lineedit::line_buffer::WordKind::Small),
        Motion::WordRight => buf.word_right(lineedit::line_buffer::WordKind::Small),
        Motion::BigWordLeft => buf.word_left(lineedit::line_buffer::WordKind::Big),
        Motion::BigWordRight => buf.word_right(lineedit::line_buffer::WordKind::Big),
        Motion::WholeLine => buf.move_to_end(),
    }
}

fn motion_kill_direction(motion: Motion) -> KillDirection {
    match motion {
        Motion::Left | Motion::WordLeft | Motion::BigWordLeft | Motion::Start => KillDirection::Backward,
        _ => KillDirection::Forward,
    }
}

fn chars(s: &str) -> Vec<KeyEvent> {
    s.chars().map(KeyEvent::Char).collect()
}

fn seq(parts: Vec<KeyEvent>) -> Vec<KeyEvent> {
    parts
}

// ── Row 1: plain typing + Enter ─────────────────────────────────────────────
#[test]
fn typing_then_enter_yields_the_typed_line() {
    let m = emacs::default_keymap();
    let mut events = chars("hello");
    events.push(KeyEvent::fn_key(lineedit::keys::FnKey::Enter));
    let (buf, cmds) = run_emacs(&m, &events, LineBuffer::new());
    assert_eq!(buf.to_line(), "hello");
    assert_eq!(cmds.last(), Some(&Cmd::Finish));
}

// ── Row 2: Ctrl-A then Ctrl-D deletes the first character ──────────────────
#[test]
fn ctrl_a_then_ctrl_d_deletes_first_char() {
    let m = emacs::default_keymap();
    let mut events = chars("hello");
    events.push(KeyEvent::ctrl('a'));
    events.push(KeyEvent::ctrl('d'));
    let (buf, _) = run_emacs(&m, &events, LineBuffer::new());
    assert_eq!(buf.to_line(), "ello");
}

// ── Row 3: Meta-B Meta-D deletes the trailing word ─────────────────────────
#[test]
fn meta_b_meta_d_deletes_trailing_word() {
    let m = emacs::default_keymap();
    let mut events = chars("foo bar");
    events.push(KeyEvent::meta('b'));
    events.push(KeyEvent::meta('d'));
    let (buf, _) = run_emacs(&m, &events, LineBuffer::new());
    assert_eq!(buf.to_line(), "foo ");
}

// ── Row 4: kill to end of line, then yank it back ──────────────────────────
#[test]
fn kill_line_then_yank_round_trips() {
    let m = emacs::default_keymap();
    // Start as "abc" with the cursor between 'a' and 'b'.
    let start = LineBuffer::from_split("a", "bc");
    let events = seq(vec![KeyEvent::ctrl('k'), KeyEvent::ctrl('y')]);
    let (buf, _) = run_emacs(&m, &events, start);
    assert_eq!(buf.to_line(), "abc");
}

// ── Row 6: Ctrl-C is not in any keymap; the session driver turns it into an
// interrupt before it ever reaches the dispatcher, so the effect under test
// here is the kill ring/undo chaining around a no-op Bell. ─────────────────
#[test]
fn unbound_control_key_bells_rather_than_inserting() {
    let m = KeyTrie::new();
    let events = vec![KeyEvent::ctrl('x')];
    let (buf, cmds) = run_emacs(&m, &events, LineBuffer::new());
    assert_eq!(buf.to_line(), "");
    assert_eq!(cmds, vec![Cmd::Bell]);
}

#[test]
fn consecutive_kills_chain_into_one_kill_ring_entry() {
    let m = emacs::default_keymap();
    let events = seq(vec![KeyEvent::ctrl('k'), KeyEvent::ctrl('k')]);
    let start = LineBuffer::from_split("", "one two");
    let mut kill_ring = KillRing::new();
    let mut last_kill = None;
    let mut dispatcher = Dispatcher::new(&m);
    let mut buf = start;
    for ev in events {
        if let Step::Matched(cmd) = dispatcher.feed(ev) {
            buf = apply(&mut kill_ring, &mut last_kill, cmd, buf);
        }
    }
    assert_eq!(buf.to_line(), "");
    assert_eq!(kill_ring.len(), 1);
    assert_eq!(kill_ring.head(), Some("one two"));
}

// ── Vi: `dw` deletes the word under the cursor ─────────────────────────────
#[test]
fn vi_dw_deletes_a_word() {
    let mut machine = ViMachine::new();
    let command_map = vi::command_keymap();
    let mut buf = LineBuffer::from_split("", "foo bar");
    let mut kill_ring = KillRing::new();

    for ev in [KeyEvent::Char('d'), KeyEvent::Char('w')] {
        let mut dispatcher = Dispatcher::new(&command_map);
        if let Step::Matched(cmd) | Step::Ambiguous(cmd) = dispatcher.feed(ev) {
            match machine.handle(cmd) {
                ViAction::Operate { op, motion, count } => {
                    assert_eq!(op, vi::Operator::Delete);
                    assert_eq!(count, 1);
                    let moved = apply_motion_n(&buf, motion, count);
                    let (next, killed) = buf.delete_between(&moved);
                    kill_ring.kill(&killed, KillDirection::Forward, false);
                    buf = next;
                }
                ViAction::Continue => {}
                other => panic!("unexpected {other:?}"),
            }
        }
    }
    assert_eq!(buf.to_line(), "bar");
    assert_eq!(kill_ring.head(), Some("foo "));
}

// ── Vi: `3l` moves the cursor right three times ────────────────────────────
#[test]
fn vi_count_prefixed_motion_repeats_three_times() {
    let mut machine = ViMachine::new();
    let command_map = vi::command_keymap();
    let mut buf = LineBuffer::from_split("", "abcdef");

    for ev in [KeyEvent::Char('3'), KeyEvent::Char('l')] {
        let mut dispatcher = Dispatcher::new(&command_map);
        if let Step::Matched(cmd) | Step::Ambiguous(cmd) = dispatcher.feed(ev) {
            match machine.handle(cmd) {
                ViAction::Motion { motion, count } => {
                    buf = apply_motion_n(&buf, motion, count);
                }
                ViAction::Continue => {}
                other => panic!("unexpected {other:?}"),
            }
        }
    }
    assert_eq!(buf.left(), "abc");
    assert_eq!(buf.right(), "def");
}

fn apply_motion_n(buf: &LineBuffer, motion: Motion, count: u32) -> LineBuffer {
    let mut b = buf.clone();
    for _ in 0..count.max(1) {
        b = apply_motion(&b, motion);
    }
    b
}
