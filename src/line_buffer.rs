//! The line-state model (§3, §4.2, C2).
//!
//! `LineBuffer` is the pure data model: `prefix` holds everything left of
//! the cursor with the cursor-adjacent character at the tail, `suffix`
//! holds everything from the cursor onward with the cursor-adjacent
//! character at the front. Both ends sit at a `Vec`/`VecDeque` boundary
//! that supports O(1) push/pop, so every single-character motion or edit
//! at the cursor is O(1) — the same complexity the spec's "treat the
//! prefix in reverse" framing is after, just phrased for a cons-list
//! rather than a growable array. The invariant `prefix ++ suffix == line`
//! (read left to right) holds after every operation below.

use std::collections::VecDeque;

/// The edited line and cursor position.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct LineBuffer {
    prefix: Vec<char>,
    suffix: VecDeque<char>,
}

/// Whether a word boundary is defined by alphanumerics (Emacs "word") or by
/// whitespace (Vi "WORD" / Emacs "big word").
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WordKind {
    /// Maximal run of alphanumeric characters.
    Small,
    /// Maximal run of non-whitespace characters.
    Big,
}

impl LineBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a buffer from a `(left, right)` split, as `readLineWithInitial`
    /// accepts (§6).
    #[must_use]
    pub fn from_split(left: &str, right: &str) -> Self {
        Self {
            prefix: left.chars().collect(),
            suffix: right.chars().collect(),
        }
    }

    /// Cursor column: number of characters left of the cursor.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.prefix.len()
    }

    /// Total length of the line, in characters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.prefix.len() + self.suffix.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prefix.is_empty() && self.suffix.is_empty()
    }

    /// The full logical line as a `String`.
    #[must_use]
    pub fn to_line(&self) -> String {
        self.chars().collect()
    }

    /// Iterate the full logical line left to right.
    pub fn chars(&self) -> impl Iterator<Item = char> + '_ {
        self.prefix.iter().copied().chain(self.suffix.iter().copied())
    }

    /// Text left of the cursor.
    #[must_use]
    pub fn left(&self) -> String {
        self.prefix.iter().collect()
    }

    /// Text at and right of the cursor.
    #[must_use]
    pub fn right(&self) -> String {
        self.suffix.iter().collect()
    }

    // ── Motion (§4.2) ───────────────────────────────────────────────────────

    #[must_use]
    pub fn go_left(&self) -> Self {
        let mut out = self.clone();
        if let Some(c) = out.prefix.pop() {
            out.suffix.push_front(c);
        }
        out
    }

    #[must_use]
    pub fn go_right(&self) -> Self {
        let mut out = self.clone();
        if let Some(c) = out.suffix.pop_front() {
            out.prefix.push(c);
        }
        out
    }

    #[must_use]
    pub fn move_to_start(&self) -> Self {
        let mut out = self.clone();
        while let Some(c) = out.prefix.pop() {
            out.suffix.push_front(c);
        }
        out
    }

    #[must_use]
    pub fn move_to_end(&self) -> Self {
        let mut out = self.clone();
        while let Some(c) = out.suffix.pop_front() {
            out.prefix.push(c);
        }
        out
    }

    /// Word-left: invariant #4 — a no-op at column 0.
    #[must_use]
    pub fn word_left(&self, kind: WordKind) -> Self {
        let mut out = self.clone();
        // Skip non-word characters immediately left of the cursor, then the
        // word itself (readline's `backward-word`).
        while out.prefix.last().is_some_and(|&c| !is_word_char(c, kind)) {
            out = out.go_left();
        }
        while out.prefix.last().is_some_and(|&c| is_word_char(c, kind)) {
            out = out.go_left();
        }
        out
    }

    /// Word-right: invariant #4 — a no-op at the end of the line.
    #[must_use]
    pub fn word_right(&self, kind: WordKind) -> Self {
        let mut out = self.clone();
        while out.suffix.front().is_some_and(|&c| !is_word_char(c, kind)) {
            out = out.go_right();
        }
        while out.suffix.front().is_some_and(|&c| is_word_char(c, kind)) {
            out = out.go_right();
        }
        out
    }

    // ── Mutation (§4.2) ─────────────────────────────────────────────────────

    #[must_use]
    pub fn insert_char(&self, c: char) -> Self {
        let mut out = self.clone();
        out.prefix.push(c);
        out
    }

    #[must_use]
    pub fn insert_str(&self, s: &str) -> Self {
        let mut out = self.clone();
        out.prefix.extend(s.chars());
        out
    }

    #[must_use]
    pub fn delete_prev(&self) -> Self {
        let mut out = self.clone();
        out.prefix.pop();
        out
    }

    #[must_use]
    pub fn delete_next(&self) -> Self {
        let mut out = self.clone();
        out.suffix.pop_front();
        out
    }

    /// Swap the two characters surrounding the cursor and advance past both;
    /// at line end, swap the last two characters instead (§4.2).
    #[must_use]
    pub fn transpose_chars(&self) -> Self {
        let mut out = self.clone();
        if out.suffix.is_empty() {
            let n = out.prefix.len();
            if n >= 2 {
                out.prefix.swap(n - 1, n - 2);
            }
        } else if let Some(before) = out.prefix.pop() {
            if let Some(at) = out.suffix.pop_front() {
                out.prefix.push(at);
                out.prefix.push(before);
            } else {
                out.prefix.push(before);
            }
        }
        out
    }

    // ── Composite (§4.2) ─────────────────────────────────────────────────────

    /// Delete the span between this buffer's cursor and `moved`'s cursor
    /// (both assumed to share the same underlying text — `moved` must be
    /// the result of applying some motion to `self`). Returns the resulting
    /// buffer and the deleted text, for the caller to push onto the kill
    /// ring (§4.2's `deleteFromMove`).
    #[must_use]
    pub fn delete_between(&self, moved: &Self) -> (Self, String) {
        let line: Vec<char> = self.chars().collect();
        let (lo, hi) = if self.cursor() <= moved.cursor() {
            (self.cursor(), moved.cursor())
        } else {
            (moved.cursor(), self.cursor())
        };
        let killed: String = line[lo..hi].iter().collect();
        let out = Self {
            prefix: line[..lo].to_vec(),
            suffix: line[hi..].iter().copied().collect(),
        };
        (out, killed)
    }
}

fn is_word_char(c: char, kind: WordKind) -> bool {
    match kind {
        WordKind::Small => c.is_alphanumeric(),
        WordKind::Big => !c.is_whitespace(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn of(left: &str, right: &str) -> LineBuffer {
        LineBuffer::from_split(left, right)
    }

    #[test]
    fn invariant_concatenation_holds() {
        let b = of("hel", "lo");
        assert_eq!(b.to_line(), "hello");
        assert_eq!(b.cursor(), 3);
    }

    #[test]
    fn go_left_and_right_are_inverses() {
        let b = of("hel", "lo");
        let moved = b.go_left().go_right();
        assert_eq!(moved, b);
    }

    #[test]
    fn word_left_is_noop_at_start() {
        let b = of("", "hello");
        assert_eq!(b.word_left(WordKind::Small), b);
    }

    #[test]
    fn word_right_is_noop_at_end() {
        let b = of("hello", "");
        assert_eq!(b.word_right(WordKind::Small), b);
    }

    #[test]
    fn word_motion_skips_punctuation_then_word() {
        // "foo |bar" -> word_right from within "foo" lands after "bar".
        let b = of("foo", " bar baz");
        let moved = b.word_right(WordKind::Small);
        assert_eq!(moved.left(), "foo bar");
    }

    #[test]
    fn transpose_at_end_swaps_last_two() {
        let b = of("13", "");
        assert_eq!(b.transpose_chars().to_line(), "31");
    }

    #[test]
    fn transpose_in_middle_drags_char_forward() {
        // "abc|d" -> drag 'c' forward over 'd' -> "abdc|"
        let b = of("abc", "d");
        let out = b.transpose_chars();
        assert_eq!(out.to_line(), "abdc");
        assert_eq!(out.cursor(), 4);
    }

    #[test]
    fn delete_between_to_end_captures_suffix() {
        let b = of("ab", "cd");
        let moved = b.move_to_end();
        let (result, killed) = b.delete_between(&moved);
        assert_eq!(result.to_line(), "ab");
        assert_eq!(killed, "cd");
    }

    #[test]
    fn delete_between_word_left_captures_prior_word() {
        let b = of("foo bar", "");
        let moved = b.word_left(WordKind::Small);
        let (result, killed) = b.delete_between(&moved);
        assert_eq!(result.to_line(), "foo ");
        assert_eq!(killed, "bar");
    }

    #[test]
    fn insert_then_delete_prev_round_trips() {
        let b = of("ab", "cd");
        let inserted = b.insert_char('X');
        assert_eq!(inserted.to_line(), "abXcd");
        let back = inserted.delete_prev();
        assert_eq!(back, b);
    }
}
