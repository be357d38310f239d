//! The Emacs editing discipline (§4.5): a single flat key map, no modes.

use super::{Cmd, KeyTrie, Motion};
use crate::keys::{FnKey, KeyEvent};

/// Build the default Emacs key map per §4.5's table.
#[must_use]
pub fn default_keymap() -> KeyTrie {
    let mut m = KeyTrie::new();

    m.bind(KeyEvent::fn_key(FnKey::Enter), Cmd::Finish);
    m.bind(KeyEvent::ctrl('j'), Cmd::Finish);

    m.bind(KeyEvent::ctrl('a'), Cmd::Move(Motion::Start));
    m.bind(KeyEvent::fn_key(FnKey::Home), Cmd::Move(Motion::Start));
    m.bind(KeyEvent::ctrl('e'), Cmd::Move(Motion::End));
    m.bind(KeyEvent::fn_key(FnKey::End), Cmd::Move(Motion::End));

    m.bind(KeyEvent::ctrl('b'), Cmd::Move(Motion::Left));
    m.bind(KeyEvent::fn_key(FnKey::Left), Cmd::Move(Motion::Left));
    m.bind(KeyEvent::ctrl('f'), Cmd::Move(Motion::Right));
    m.bind(KeyEvent::fn_key(FnKey::Right), Cmd::Move(Motion::Right));

    // Ctrl-D's EOF-on-empty-line behavior is special-cased by the session
    // driver (it needs to inspect buffer emptiness, which a pure Cmd can't
    // express); the binding here covers the non-empty case.
    m.bind(KeyEvent::ctrl('d'), Cmd::DeleteNextChar);
    m.bind(KeyEvent::fn_key(FnKey::Backspace), Cmd::DeletePrevChar);
    m.bind(KeyEvent::ctrl('h'), Cmd::DeletePrevChar);
    m.bind(KeyEvent::fn_key(FnKey::DeleteForward), Cmd::DeleteNextChar);

    m.bind(KeyEvent::ctrl('k'), Cmd::DeleteMotion(Motion::End));
    m.bind(KeyEvent::ctrl('u'), Cmd::DeleteMotion(Motion::Start));
    m.bind(KeyEvent::ctrl('w'), Cmd::DeleteMotion(Motion::BigWordLeft));
    m.bind(KeyEvent::meta('d'), Cmd::DeleteMotion(Motion::WordRight));
    m.bind(KeyEvent::meta('f'), Cmd::Move(Motion::WordRight));
    m.bind(KeyEvent::meta('b'), Cmd::Move(Motion::WordLeft));

    m.bind(KeyEvent::ctrl('y'), Cmd::Yank);
    m.bind(KeyEvent::meta('y'), Cmd::YankPop);

    m.bind(KeyEvent::ctrl('l'), Cmd::ClearScreen);
    m.bind(KeyEvent::ctrl('t'), Cmd::TransposeChars);

    m.bind(KeyEvent::ctrl('_'), Cmd::Undo);
    m.bind(KeyEvent::ctrl('/'), Cmd::Undo);

    m.bind(KeyEvent::fn_key(FnKey::Up), Cmd::HistoryPrev);
    m.bind(KeyEvent::ctrl('p'), Cmd::HistoryPrev);
    m.bind(KeyEvent::fn_key(FnKey::Down), Cmd::HistoryNext);
    m.bind(KeyEvent::ctrl('n'), Cmd::HistoryNext);

    m.bind(KeyEvent::ctrl('r'), Cmd::ReverseSearchStart);
    m.bind(KeyEvent::fn_key(FnKey::Tab), Cmd::Complete);

    m
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::Dispatcher;
    use crate::keymap::Step;

    #[test]
    fn enter_finishes() {
        let m = default_keymap();
        let mut d = Dispatcher::new(&m);
        assert!(matches!(
            d.feed(KeyEvent::fn_key(FnKey::Enter)),
            Step::Matched(Cmd::Finish)
        ));
    }

    #[test]
    fn ctrl_a_and_home_are_equivalent() {
        let m = default_keymap();
        assert_eq!(m.exact(&[KeyEvent::ctrl('a')]), m.exact(&[KeyEvent::fn_key(FnKey::Home)]));
    }
}
