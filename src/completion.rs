//! Completion engine (§4.6, C6): word extraction, quote/escape handling,
//! filesystem listing, and composition helpers (fallback chaining).
//!
//! `listFiles` and home-directory resolution are the OS-specific
//! collaborators §1 calls out as external; [`FilenameCompleter`] depends on
//! `std::fs`/`std::env` directly rather than introducing a trait for them,
//! matching how the teacher's own `editor.rs` talks to `std::fs` and
//! `std::env::var("HOME")` without an abstraction layer.

use std::fs;
use std::path::{Path, PathBuf};

/// One completion candidate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Completion {
    /// Text that replaces the matched word.
    pub replacement: String,
    /// Text shown to the user in a candidate list (may differ from
    /// `replacement`, e.g. a directory shown without its trailing slash).
    pub display: String,
    /// Whether accepting this candidate should be followed by a terminator
    /// (space or closing quote) — §4.6, GLOSSARY "Finished completion".
    pub is_finished: bool,
}

impl Completion {
    #[must_use]
    pub fn simple(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            display: text.clone(),
            replacement: text,
            is_finished: true,
        }
    }
}

/// Result of running a completer: the portion of `left` not consumed by the
/// match, plus the candidates that replace the consumed portion.
#[derive(Clone, Debug, Default)]
pub struct CompletionResult {
    pub unused_left: String,
    pub candidates: Vec<Completion>,
}

/// Produces completions given the text left and right of the cursor.
pub trait Completer {
    fn complete(&self, left: &str, right: &str) -> CompletionResult;
}

/// Longest common prefix shared by every candidate's `replacement`, used by
/// `ListCompletion` to advance the line even when more than one candidate
/// remains (§4.6).
#[must_use]
pub fn common_prefix(candidates: &[Completion]) -> String {
    let mut iter = candidates.iter();
    let Some(first) = iter.next() else {
        return String::new();
    };
    let mut prefix: Vec<char> = first.replacement.chars().collect();
    for cand in iter {
        let chars: Vec<char> = cand.replacement.chars().collect();
        let common = prefix
            .iter()
            .zip(chars.iter())
            .take_while(|(a, b)| a == b)
            .count();
        prefix.truncate(common);
        if prefix.is_empty() {
            break;
        }
    }
    prefix.into_iter().collect()
}

// ── Word completer (§4.6) ────────────────────────────────────────────────────

/// Splits the word under the cursor using a whitespace predicate and an
/// optional escape character, then delegates candidate production to a
/// closure.
///
/// Open Question (b): the escape character always *precedes* the character
/// it escapes (standard backslash convention) — scanning backward from the
/// cursor, a break character is only treated as escaped when the character
/// further left (the next one visited) is the escape char. This matches
/// `readline`'s own convention rather than the alternative (escape as a
/// suffix) the spec calls out as historically surprising.
pub struct WordCompleter<F> {
    escape: Option<char>,
    is_break: fn(char) -> bool,
    candidates: F,
}

impl<F> WordCompleter<F>
where
    F: Fn(&str, &str) -> Vec<Completion>,
{
    pub fn new(escape: Option<char>, is_break: fn(char) -> bool, candidates: F) -> Self {
        Self {
            escape,
            is_break,
            candidates,
        }
    }
}

/// Scan `left` backward from the cursor, returning `(unused_left, word)`.
/// `word` has escape characters stripped; re-escaping on the way back out
/// is the candidate function's responsibility (via [`escape_replacement`]).
#[must_use]
pub fn extract_word(left: &str, is_break: fn(char) -> bool, escape: Option<char>) -> (String, String) {
    let chars: Vec<char> = left.chars().collect();
    let mut i = chars.len();
    let mut word_rev: Vec<char> = Vec::new();

    while i > 0 {
        let c = chars[i - 1];
        if (is_break)(c) {
            if i >= 2 && escape == Some(chars[i - 2]) {
                word_rev.push(c);
                i -= 2;
                continue;
            }
            break;
        }
        word_rev.push(c);
        i -= 1;
    }

    word_rev.reverse();
    let word: String = word_rev.into_iter().collect();
    let unused_left: String = chars[..i].iter().collect();
    (unused_left, word)
}

/// Escape whitespace/escape characters within `replacement` so it can be
/// spliced back into the line literally.
#[must_use]
pub fn escape_replacement(replacement: &str, is_break: fn(char) -> bool, escape: Option<char>) -> String {
    let Some(escape) = escape else {
        return replacement.to_string();
    };
    let mut out = String::with_capacity(replacement.len());
    for c in replacement.chars() {
        if (is_break)(c) || c == escape {
            out.push(escape);
        }
        out.push(c);
    }
    out
}

impl<F> Completer for WordCompleter<F>
where
    F: Fn(&str, &str) -> Vec<Completion>,
{
    fn complete(&self, left: &str, right: &str) -> CompletionResult {
        let (unused_left, word) = extract_word(left, self.is_break, self.escape);
        let mut candidates = (self.candidates)(&word, right);
        for cand in &mut candidates {
            cand.replacement = escape_replacement(&cand.replacement, self.is_break, self.escape);
        }
        CompletionResult {
            unused_left,
            candidates,
        }
    }
}

pub fn is_ascii_whitespace_break(c: char) -> bool {
    c.is_whitespace()
}

// ── Quoted-word completer (§4.6) ─────────────────────────────────────────────

/// Wraps an underlying completer: if the cursor sits inside an open quote,
/// extracts the quoted content as the word and wraps replacements in
/// quotes; otherwise defers to `inner`.
pub struct QuotedWordCompleter<C> {
    quote_chars: &'static [char],
    escape: Option<char>,
    inner: C,
}

impl<C: Completer> QuotedWordCompleter<C> {
    pub fn new(quote_chars: &'static [char], escape: Option<char>, inner: C) -> Self {
        Self {
            quote_chars,
            escape,
            inner,
        }
    }

    /// Count unescaped quote characters in `left`; odd means the cursor is
    /// inside an open quote. Returns the opening quote char when inside one.
    fn open_quote(&self, left: &str) -> Option<char> {
        let chars: Vec<char> = left.chars().collect();
        let mut open: Option<char> = None;
        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            if self.escape == Some(c) {
                i += 2;
                continue;
            }
            if self.quote_chars.contains(&c) {
                open = match open {
                    Some(q) if q == c => None,
                    Some(q) => Some(q), // a different quote char inside an open one: ignore
                    None => Some(c),
                };
            }
            i += 1;
        }
        open
    }
}

impl<C: Completer> Completer for QuotedWordCompleter<C> {
    fn complete(&self, left: &str, right: &str) -> CompletionResult {
        let Some(quote) = self.open_quote(left) else {
            return self.inner.complete(left, right);
        };
        // Word = everything after the last unescaped opening quote.
        let chars: Vec<char> = left.chars().collect();
        let mut start = chars.len();
        let mut i = 0;
        let mut depth_open_at = None;
        while i < chars.len() {
            if self.escape == Some(chars[i]) {
                i += 2;
                continue;
            }
            if chars[i] == quote {
                depth_open_at = Some(i);
            }
            i += 1;
        }
        if let Some(pos) = depth_open_at {
            start = pos + 1;
        }
        let word: String = chars[start..].iter().collect();
        let unused_left: String = chars[..start].iter().collect();

        let mut result = self.inner.complete(&word, right);
        // Re-run candidate generation isn't accessible generically here, so
        // quoting is applied to whatever the inner completer already
        // produced for this narrowed `word`.
        for cand in &mut result.candidates {
            cand.replacement = format!("{quote}{}{quote}", cand.replacement);
        }
        CompletionResult {
            unused_left,
            candidates: result.candidates,
        }
    }
}

// ── Filename completer (§4.6) ────────────────────────────────────────────────

pub fn filename_word_break(c: char) -> bool {
    c.is_whitespace()
}

/// Lists directory entries under `path` (a partial path whose final
/// component is a prefix to match), resolving a leading `~/` via `HOME`.
/// Directories are marked `is_finished = false` so completion can continue
/// descending without the caller committing a terminator.
pub fn list_files(path: &str) -> Vec<Completion> {
    let expanded = expand_home(path);
    let (dir, file_prefix) = split_dir_file(&expanded);

    let dir_to_read: PathBuf = if dir.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        dir.clone()
    };

    let Ok(read) = fs::read_dir(&dir_to_read) else {
        return Vec::new();
    };

    let mut out = Vec::new();
    for entry in read.flatten() {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name == "." || name == ".." {
            continue;
        }
        if !name.starts_with(file_prefix.as_str()) {
            continue;
        }
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        let mut replacement = name.to_string();
        if is_dir {
            replacement.push(std::path::MAIN_SEPARATOR);
        }
        out.push(Completion {
            display: name.to_string(),
            replacement,
            is_finished: !is_dir,
        });
    }
    out.sort_by(|a, b| a.display.cmp(&b.display));
    out
}

fn expand_home(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            let mut home = home.to_string_lossy().into_owned();
            if !home.ends_with(std::path::MAIN_SEPARATOR) {
                home.push(std::path::MAIN_SEPARATOR);
            }
            return format!("{home}{rest}");
        }
    }
    path.to_string()
}

fn split_dir_file(path: &str) -> (PathBuf, String) {
    match path.rfind(std::path::MAIN_SEPARATOR) {
        Some(idx) => {
            let (dir, file) = path.split_at(idx);
            let file = &file[1..]; // drop the separator itself
            (PathBuf::from(if dir.is_empty() { "/" } else { dir }), file.to_string())
        }
        None => (PathBuf::new(), path.to_string()),
    }
}

/// A filename completer: quote-aware with `"`/`'` and `\`, falling back to
/// plain whitespace-delimited word completion when not inside a quote.
pub struct FilenameCompleter {
    inner: QuotedWordCompleter<WordCompleter<fn(&str, &str) -> Vec<Completion>>>,
}

impl FilenameCompleter {
    #[must_use]
    pub fn new() -> Self {
        fn candidates(word: &str, _right: &str) -> Vec<Completion> {
            list_files(word)
        }
        let word = WordCompleter::new(Some('\\'), filename_word_break, candidates as fn(&str, &str) -> Vec<Completion>);
        let quoted = QuotedWordCompleter::new(&['"', '\''], Some('\\'), word);
        Self { inner: quoted }
    }
}

impl Default for FilenameCompleter {
    fn default() -> Self {
        Self::new()
    }
}

impl Completer for FilenameCompleter {
    fn complete(&self, left: &str, right: &str) -> CompletionResult {
        self.inner.complete(left, right)
    }
}

// ── Fallback composition (§4.6) ──────────────────────────────────────────────

/// Runs `first`; if it returns no candidates, runs `second` instead.
pub struct FallbackCompleter<A, B> {
    first: A,
    second: B,
}

impl<A: Completer, B: Completer> FallbackCompleter<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }
}

impl<A: Completer, B: Completer> Completer for FallbackCompleter<A, B> {
    fn complete(&self, left: &str, right: &str) -> CompletionResult {
        let result = self.first.complete(left, right);
        if result.candidates.is_empty() {
            self.second.complete(left, right)
        } else {
            result
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn space_break(c: char) -> bool {
        c.is_whitespace()
    }

    #[test]
    fn extract_word_stops_at_unescaped_space() {
        let (unused, word) = extract_word("foo bar", space_break, Some('\\'));
        assert_eq!(unused, "foo ");
        assert_eq!(word, "bar");
    }

    #[test]
    fn extract_word_treats_escaped_space_as_literal() {
        let (unused, word) = extract_word(r"foo\ bar", space_break, Some('\\'));
        assert_eq!(unused, "");
        assert_eq!(word, "foo bar");
    }

    #[test]
    fn escape_replacement_reescapes_break_chars() {
        let escaped = escape_replacement("a b", space_break, Some('\\'));
        assert_eq!(escaped, r"a\ b");
    }

    #[test]
    fn common_prefix_of_single_candidate_is_itself() {
        let cands = vec![Completion::simple("hello")];
        assert_eq!(common_prefix(&cands), "hello");
    }

    #[test]
    fn common_prefix_stops_at_first_divergence() {
        let cands = vec![Completion::simple("help"), Completion::simple("hello")];
        assert_eq!(common_prefix(&cands), "hel");
    }

    #[test]
    fn fallback_runs_second_when_first_is_empty() {
        struct Empty;
        impl Completer for Empty {
            fn complete(&self, _left: &str, _right: &str) -> CompletionResult {
                CompletionResult::default()
            }
        }
        struct Always;
        impl Completer for Always {
            fn complete(&self, left: &str, _right: &str) -> CompletionResult {
                CompletionResult {
                    unused_left: left.to_string(),
                    candidates: vec![Completion::simple("x")],
                }
            }
        }
        let combo = FallbackCompleter::new(Empty, Always);
        let result = combo.complete("", "");
        assert_eq!(result.candidates.len(), 1);
    }

    #[test]
    fn quoted_word_completer_detects_open_quote() {
        struct Echo;
        impl Completer for Echo {
            fn complete(&self, left: &str, _right: &str) -> CompletionResult {
                CompletionResult {
                    unused_left: String::new(),
                    candidates: vec![Completion::simple(left)],
                }
            }
        }
        let quoted = QuotedWordCompleter::new(&['"'], Some('\\'), Echo);
        let result = quoted.complete(r#"cat "foo"#, "");
        assert_eq!(result.candidates[0].replacement, "\"foo\"");
    }
}
