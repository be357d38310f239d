//! Incremental reverse history search (§4.7): `Ctrl-R` builds a query
//! character by character; the newest history entry containing the query
//! as a substring is shown, ties broken by recency. Repeating `Ctrl-R`
//! advances to the next older match.

use crate::history::History;

/// State for an in-progress reverse-incremental search (`(reverse-i-search)`
/// in the prompt, per §4.7).
#[derive(Clone, Debug)]
pub struct ReverseSearch {
    query: String,
    /// History index strictly before which the next search starts; `len`
    /// when no match has been fixed yet.
    bound: usize,
    /// The most recently found match, if any.
    matched: Option<usize>,
}

impl ReverseSearch {
    #[must_use]
    pub fn new(history_len: usize) -> Self {
        Self {
            query: String::new(),
            bound: history_len,
            matched: None,
        }
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    #[must_use]
    pub fn matched_index(&self) -> Option<usize> {
        self.matched
    }

    /// Append a character to the query and re-search from the newest entry.
    pub fn push_char(&mut self, c: char, history: &History) -> Option<&str> {
        self.query.push(c);
        self.bound = history.len();
        self.search(history)
    }

    /// Remove the last character from the query and re-search.
    pub fn pop_char(&mut self, history: &History) -> Option<&str> {
        self.query.pop();
        self.bound = history.len();
        self.search(history)
    }

    /// Advance to the next older match (repeated `Ctrl-R`).
    pub fn advance(&mut self, history: &History) -> Option<&str> {
        if let Some(current) = self.matched {
            self.bound = current;
        }
        self.search(history)
    }

    /// Position of the query within the currently matched entry, for
    /// highlighting the match in the display.
    #[must_use]
    pub fn highlight_offset(&self, entry: &str) -> Option<usize> {
        if self.query.is_empty() {
            None
        } else {
            entry.find(&self.query)
        }
    }

    fn search(&mut self, history: &History) -> Option<&str> {
        if self.query.is_empty() {
            self.matched = None;
            return None;
        }
        for idx in (0..self.bound).rev() {
            if let Some(entry) = history.get(idx) {
                if entry.contains(&self.query) {
                    self.matched = Some(idx);
                    return history.get(idx);
                }
            }
        }
        self.matched = None;
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn history_with(entries: &[&str]) -> History {
        let mut h = History::new(&Config::default());
        for e in entries {
            h.add(e);
        }
        h
    }

    #[test]
    fn finds_newest_match_first() {
        let h = history_with(&["echo a", "ls -la", "echo b"]);
        let mut search = ReverseSearch::new(h.len());
        assert_eq!(search.push_char('e', &h), Some("echo b"));
        assert_eq!(search.push_char('c', &h), Some("echo b"));
    }

    #[test]
    fn repeated_ctrl_r_advances_to_older_match() {
        let h = history_with(&["echo a", "ls -la", "echo b"]);
        let mut search = ReverseSearch::new(h.len());
        search.push_char('e', &h);
        assert_eq!(search.advance(&h), Some("echo a"));
        // No further matches: stays None without panicking.
        assert_eq!(search.advance(&h), None);
    }

    #[test]
    fn empty_query_matches_nothing() {
        let h = history_with(&["echo a"]);
        let mut search = ReverseSearch::new(h.len());
        assert_eq!(search.search(&h), None);
    }

    #[test]
    fn highlight_offset_locates_query_in_match() {
        let h = history_with(&["git commit -m fix"]);
        let mut search = ReverseSearch::new(h.len());
        let entry = search.push_char('c', &h).unwrap().to_string();
        search.push_char('o', &h);
        assert_eq!(search.highlight_offset(&entry), Some(4));
    }
}
