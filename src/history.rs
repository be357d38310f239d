//! History store (§3, §4.7, C7): an in-memory ring with dedup policy, plus
//! an optional persistence path. Navigation lives on [`HistoryCursor`] since
//! each session owns exactly one of those while the underlying store can be
//! (briefly, at open/close) touched by more than one session (§3
//! "Ownership").

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::{Config, HistoryDuplicates};

/// Ordered sequence of completed input lines, newest last.
#[derive(Clone, Debug, Default)]
pub struct History {
    entries: Vec<String>,
    max_size: usize,
    duplicates: HistoryDuplicates,
    ignore_space: bool,
    path: Option<PathBuf>,
}

impl History {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            entries: Vec::new(),
            max_size: config.max_history_size(),
            duplicates: config.history_duplicates(),
            ignore_space: config.history_ignore_space(),
            path: None,
        }
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    #[must_use]
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Append `line`, applying the dedup and ignore-space policies (§3, §6).
    /// Returns whether the line was actually added.
    pub fn add(&mut self, line: &str) -> bool {
        if line.is_empty() {
            return false;
        }
        if self.ignore_space && line.starts_with(' ') {
            return false;
        }
        match self.duplicates {
            HistoryDuplicates::None => {}
            HistoryDuplicates::Consecutive => {
                if self.entries.last().map(String::as_str) == Some(line) {
                    return false;
                }
            }
            HistoryDuplicates::All => {
                if let Some(pos) = self.entries.iter().position(|e| e == line) {
                    self.entries.remove(pos);
                }
            }
        }
        self.entries.push(line.to_string());
        if self.entries.len() > self.max_size {
            let excess = self.entries.len() - self.max_size;
            self.entries.drain(..excess);
        }
        true
    }

    /// Load persisted entries (oldest first) from `path`, replacing the
    /// in-memory list. Recovered locally on failure per §7 `HistoryIoError`.
    pub fn load(&mut self, path: &Path) -> io::Result<()> {
        let contents = fs::read_to_string(path)?;
        self.entries = contents
            .lines()
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
        if self.entries.len() > self.max_size {
            let excess = self.entries.len() - self.max_size;
            self.entries.drain(..excess);
        }
        self.path = Some(path.to_path_buf());
        Ok(())
    }

    /// Truncate-and-rewrite the persisted file, capped at `max_history_size`
    /// (§6 "Persisted history format").
    pub fn save(&self) -> io::Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        self.save_to(path)
    }

    pub fn save_to(&self, path: &Path) -> io::Result<()> {
        let start = self.entries.len().saturating_sub(self.max_size);
        let mut buf = String::new();
        for line in &self.entries[start..] {
            buf.push_str(line);
            buf.push('\n');
        }
        fs::write(path, buf)
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

/// A session's live navigation cursor into [`History`], plus the scratch
/// buffer that preserves the user's in-progress line (§3, §4.7).
#[derive(Clone, Debug)]
pub struct HistoryCursor {
    /// Index into the history; `== len` means "past the end" (live edit).
    index: usize,
    scratch: String,
}

impl HistoryCursor {
    #[must_use]
    pub fn new(history_len: usize) -> Self {
        Self {
            index: history_len,
            scratch: String::new(),
        }
    }

    /// Reset to the past-the-end position, as happens at every new
    /// `read_line` call.
    pub fn reset(&mut self, history_len: usize) {
        self.index = history_len;
        self.scratch.clear();
    }

    #[must_use]
    pub fn is_at_end(&self, history_len: usize) -> bool {
        self.index >= history_len
    }

    /// Move toward older entries. On the first call, `current` is stashed
    /// as the scratch buffer to restore later. Returns the entry now
    /// selected, or `None` if already at the oldest entry.
    pub fn prev<'h>(&mut self, history: &'h History, current: &str) -> Option<&'h str> {
        if history.is_empty() {
            return None;
        }
        if self.is_at_end(history.len()) {
            self.scratch = current.to_string();
        }
        if self.index == 0 {
            return history.get(0);
        }
        self.index -= 1;
        history.get(self.index)
    }

    /// Move toward newer entries, restoring the scratch buffer once past
    /// the newest entry. Returns `None` if already at the past-the-end
    /// position (a no-op).
    pub fn next(&mut self, history: &History) -> Option<String> {
        if self.is_at_end(history.len()) {
            return None;
        }
        self.index += 1;
        if self.is_at_end(history.len()) {
            Some(std::mem::take(&mut self.scratch))
        } else {
            history.get(self.index).map(str::to_string)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history_with(entries: &[&str]) -> History {
        let mut h = History::new(&Config::default());
        for e in entries {
            h.add(e);
        }
        h
    }

    #[test]
    fn consecutive_dedup_drops_immediate_repeat() {
        let h = history_with(&["ls", "ls", "pwd"]);
        assert_eq!(h.len(), 2);
        assert_eq!(h.get(0), Some("ls"));
        assert_eq!(h.get(1), Some("pwd"));
    }

    #[test]
    fn consecutive_dedup_keeps_nonadjacent_repeat() {
        let h = history_with(&["ls", "pwd", "ls"]);
        assert_eq!(h.len(), 3);
    }

    #[test]
    fn all_dedup_moves_existing_entry_to_end() {
        let mut h = History::new(
            &Config::builder()
                .history_duplicates(HistoryDuplicates::All)
                .build(),
        );
        h.add("a");
        h.add("b");
        h.add("a");
        assert_eq!(h.len(), 2);
        assert_eq!(h.get(0), Some("b"));
        assert_eq!(h.get(1), Some("a"));
    }

    #[test]
    fn max_size_drops_oldest() {
        let mut h = History::new(&Config::builder().max_history_size(2).build());
        h.add("a");
        h.add("b");
        h.add("c");
        assert_eq!(h.len(), 2);
        assert_eq!(h.get(0), Some("b"));
    }

    #[test]
    fn ignore_space_skips_leading_space_lines() {
        let mut h = History::new(&Config::builder().history_ignore_space(true).build());
        assert!(!h.add(" secret"));
        assert!(h.add("visible"));
        assert_eq!(h.len(), 1);
    }

    #[test]
    fn navigation_saves_and_restores_scratch() {
        let h = history_with(&["echo hello", "ls -la"]);
        let mut cursor = HistoryCursor::new(h.len());

        assert_eq!(cursor.prev(&h, "pwd"), Some("ls -la"));
        assert_eq!(cursor.prev(&h, "pwd"), Some("echo hello"));
        assert_eq!(cursor.prev(&h, "pwd"), Some("echo hello")); // clamped at oldest

        assert_eq!(cursor.next(&h).as_deref(), Some("ls -la"));
        assert_eq!(cursor.next(&h).as_deref(), Some("pwd")); // scratch restored
        assert_eq!(cursor.next(&h), None); // already at end
    }

    #[test]
    fn round_trip_through_disk_preserves_order() {
        let dir = std::env::temp_dir().join(format!(
            "lineedit_history_test_{}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("history");

        let mut h = history_with(&["one", "two", "three"]);
        h.save_to(&path).unwrap();

        let mut loaded = History::new(&Config::default());
        loaded.load(&path).unwrap();
        assert_eq!(loaded.iter().collect::<Vec<_>>(), vec!["one", "two", "three"]);

        std::fs::remove_dir_all(&dir).ok();
    }
}
