//! Kill ring (§3, §4.2): a bounded, ordered buffer of recently-deleted
//! strings. Whether an incoming kill chains onto the existing head or
//! starts a new entry is a caller decision — see [`KillRing::kill`]'s
//! `chain` parameter — because only the session driver knows whether the
//! previous command was also a kill in the same direction (§3's "any
//! non-kill command breaks this chain").

use std::collections::VecDeque;

/// Direction a kill command removed text in, used to decide how a chained
/// kill should be appended to the existing head entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KillDirection {
    /// Text to the right of the point was removed (e.g. `kill-line`,
    /// `kill-word`): new text is appended after the existing head.
    Forward,
    /// Text to the left of the point was removed (e.g. `backward-kill-word`,
    /// `unix-line-discard`): new text is prepended before the existing head.
    Backward,
}

const DEFAULT_CAPACITY: usize = 64;

/// Ordered sequence of killed strings, most-recent at the head.
#[derive(Clone, Debug, Default)]
pub struct KillRing {
    entries: VecDeque<String>,
    capacity: usize,
}

impl KillRing {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: DEFAULT_CAPACITY,
        }
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Record a kill. If `chain` is true and an entry already exists, `text`
    /// is merged into the head instead of pushing a new entry, per §3.
    pub fn kill(&mut self, text: &str, direction: KillDirection, chain: bool) {
        if text.is_empty() {
            return;
        }
        if chain {
            if let Some(head) = self.entries.front_mut() {
                match direction {
                    KillDirection::Forward => head.push_str(text),
                    KillDirection::Backward => head.insert_str(0, text),
                }
                return;
            }
        }
        self.entries.push_front(text.to_string());
        while self.entries.len() > self.capacity {
            self.entries.pop_back();
        }
    }

    /// The most recently killed text, for `yank`.
    #[must_use]
    pub fn head(&self) -> Option<&str> {
        self.entries.front().map(String::as_str)
    }

    /// Rotate so the next-older entry becomes the head, returning it. Used
    /// by `yank-pop`; a no-op returning `None` when there's nothing to
    /// rotate to.
    pub fn rotate(&mut self) -> Option<&str> {
        if self.entries.len() < 2 {
            return self.entries.front().map(String::as_str);
        }
        let front = self.entries.pop_front()?;
        self.entries.push_back(front);
        self.entries.front().map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yank_reads_head() {
        let mut ring = KillRing::new();
        ring.kill("abc", KillDirection::Forward, false);
        assert_eq!(ring.head(), Some("abc"));
    }

    #[test]
    fn chained_forward_kills_append() {
        let mut ring = KillRing::new();
        ring.kill("foo", KillDirection::Forward, false);
        ring.kill("bar", KillDirection::Forward, true);
        assert_eq!(ring.head(), Some("foobar"));
        assert_eq!(ring.len(), 1);
    }

    #[test]
    fn chained_backward_kills_prepend() {
        let mut ring = KillRing::new();
        ring.kill("bar", KillDirection::Backward, false);
        ring.kill("foo", KillDirection::Backward, true);
        assert_eq!(ring.head(), Some("foobar"));
    }

    #[test]
    fn non_chained_kill_pushes_new_entry() {
        let mut ring = KillRing::new();
        ring.kill("foo", KillDirection::Forward, false);
        ring.kill("bar", KillDirection::Forward, false);
        assert_eq!(ring.len(), 2);
        assert_eq!(ring.head(), Some("bar"));
    }

    #[test]
    fn rotate_cycles_back_to_original_head() {
        let mut ring = KillRing::new();
        ring.kill("a", KillDirection::Forward, false);
        ring.kill("b", KillDirection::Forward, false);
        ring.kill("c", KillDirection::Forward, false);
        assert_eq!(ring.head(), Some("c"));
        assert_eq!(ring.rotate(), Some("b"));
        assert_eq!(ring.rotate(), Some("a"));
        assert_eq!(ring.rotate(), Some("c"));
    }

    #[test]
    fn capacity_evicts_oldest() {
        let mut ring = KillRing::with_capacity(2);
        ring.kill("a", KillDirection::Forward, false);
        ring.kill("b", KillDirection::Forward, false);
        ring.kill("c", KillDirection::Forward, false);
        assert_eq!(ring.len(), 2);
    }
}
