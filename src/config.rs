//! User preferences (§3 "Preferences" table) and a lenient `.inputrc`-style
//! parser (§6). Structure is grounded on `rustyline`'s `Config`/`Builder`
//! split (retrieved as reference material): an opaque, validated struct plus
//! a chainable builder, rather than public mutable fields.

use std::fmt;

use crate::error::{ReadlineError, Result};

/// Emacs or Vi editing discipline (§4.5).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum EditMode {
    Emacs,
    Vi,
}

/// How Tab-completion is presented to the user (§3, §4.6).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum CompletionType {
    /// Always list all candidates; replace with the longest common prefix.
    ListCompletion,
    /// Cycle candidates inline on repeated Tab.
    MenuCompletion,
    /// List when unambiguous progress isn't possible, else advance the
    /// common prefix; falls into menu cycling on the next Tab.
    ListCompletionOrMenu,
}

/// History duplicate-entry policy (§3).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum HistoryDuplicates {
    /// No filtering; every submitted line is appended.
    None,
    /// Drop a line equal to the immediately preceding entry.
    Consecutive,
    /// Drop a line equal to any existing entry (moves it to the end instead).
    All,
}

/// Bell behavior when a keymap has nothing to do with an input (§4.4).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum BellStyle {
    None,
    Visual,
    Audible,
}

impl Default for BellStyle {
    fn default() -> Self {
        BellStyle::Audible
    }
}

/// Validated, immutable editor configuration. Construct via [`Config::builder`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    edit_mode: EditMode,
    completion_type: CompletionType,
    completion_prompt_limit: usize,
    max_history_size: usize,
    history_duplicates: HistoryDuplicates,
    auto_add_history: bool,
    bell_style: BellStyle,
    history_ignore_space: bool,
    /// Inter-byte timeout (milliseconds) for resolving an ambiguous escape
    /// sequence before emitting a bare `Escape` (§4.1 point 2).
    keyseq_timeout_ms: u16,
}

impl Config {
    #[must_use]
    pub fn builder() -> Builder {
        Builder::new()
    }

    #[must_use]
    pub fn edit_mode(&self) -> EditMode {
        self.edit_mode
    }

    #[must_use]
    pub fn completion_type(&self) -> CompletionType {
        self.completion_type
    }

    #[must_use]
    pub fn completion_prompt_limit(&self) -> usize {
        self.completion_prompt_limit
    }

    #[must_use]
    pub fn max_history_size(&self) -> usize {
        self.max_history_size
    }

    #[must_use]
    pub fn history_duplicates(&self) -> HistoryDuplicates {
        self.history_duplicates
    }

    #[must_use]
    pub fn auto_add_history(&self) -> bool {
        self.auto_add_history
    }

    #[must_use]
    pub fn bell_style(&self) -> BellStyle {
        self.bell_style
    }

    #[must_use]
    pub fn history_ignore_space(&self) -> bool {
        self.history_ignore_space
    }

    #[must_use]
    pub fn keyseq_timeout_ms(&self) -> u16 {
        self.keyseq_timeout_ms
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            edit_mode: EditMode::Emacs,
            completion_type: CompletionType::ListCompletion,
            completion_prompt_limit: 100,
            max_history_size: 1000,
            history_duplicates: HistoryDuplicates::Consecutive,
            auto_add_history: true,
            bell_style: BellStyle::default(),
            history_ignore_space: false,
            keyseq_timeout_ms: 50,
        }
    }
}

/// Chainable `Config` builder.
#[derive(Clone, Debug, Default)]
pub struct Builder {
    cfg: Config,
}

impl Builder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            cfg: Config::default(),
        }
    }

    #[must_use]
    pub fn edit_mode(mut self, mode: EditMode) -> Self {
        self.cfg.edit_mode = mode;
        // Vi's own two-character sequences (e.g. `dd`) need a much shorter
        // fuse than Emacs's mostly-single-key bindings, matching rustyline's
        // own default swap on mode change.
        self.cfg.keyseq_timeout_ms = match mode {
            EditMode::Emacs => 50,
            EditMode::Vi => 500,
        };
        self
    }

    #[must_use]
    pub fn completion_type(mut self, t: CompletionType) -> Self {
        self.cfg.completion_type = t;
        self
    }

    #[must_use]
    pub fn completion_prompt_limit(mut self, limit: usize) -> Self {
        self.cfg.completion_prompt_limit = limit;
        self
    }

    #[must_use]
    pub fn max_history_size(mut self, size: usize) -> Self {
        self.cfg.max_history_size = size;
        self
    }

    #[must_use]
    pub fn history_duplicates(mut self, policy: HistoryDuplicates) -> Self {
        self.cfg.history_duplicates = policy;
        self
    }

    #[must_use]
    pub fn auto_add_history(mut self, yes: bool) -> Self {
        self.cfg.auto_add_history = yes;
        self
    }

    #[must_use]
    pub fn bell_style(mut self, style: BellStyle) -> Self {
        self.cfg.bell_style = style;
        self
    }

    #[must_use]
    pub fn history_ignore_space(mut self, yes: bool) -> Self {
        self.cfg.history_ignore_space = yes;
        self
    }

    #[must_use]
    pub fn keyseq_timeout_ms(mut self, ms: u16) -> Self {
        self.cfg.keyseq_timeout_ms = ms;
        self
    }

    #[must_use]
    pub fn build(self) -> Config {
        self.cfg
    }
}

impl fmt::Display for EditMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditMode::Emacs => write!(f, "emacs"),
            EditMode::Vi => write!(f, "vi"),
        }
    }
}

/// Apply one `key = value` line from a preferences file, in the style of
/// `inputrc`. Unknown keys are ignored; malformed values for a known key
/// leave that key at its current value and the caller is expected to
/// surface `ReadlineError::InvalidPrefs` (§7) without aborting the parse.
pub fn apply_pref_line(builder: Builder, line: &str) -> (Builder, Option<ReadlineError>) {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return (builder, None);
    }
    let Some((key, value)) = line.split_once('=') else {
        return (builder, None);
    };
    let key = key.trim();
    let value = value.trim();

    match key {
        "editMode" => match value {
            "emacs" => (builder.edit_mode(EditMode::Emacs), None),
            "vi" => (builder.edit_mode(EditMode::Vi), None),
            other => (
                builder,
                Some(ReadlineError::InvalidPrefs(format!(
                    "editMode: unknown value {other:?}"
                ))),
            ),
        },
        "completionType" => match value {
            "ListCompletion" => (builder.completion_type(CompletionType::ListCompletion), None),
            "MenuCompletion" => (builder.completion_type(CompletionType::MenuCompletion), None),
            "ListCompletionOrMenu" => (
                builder.completion_type(CompletionType::ListCompletionOrMenu),
                None,
            ),
            other => (
                builder,
                Some(ReadlineError::InvalidPrefs(format!(
                    "completionType: unknown value {other:?}"
                ))),
            ),
        },
        "bellStyle" => match value {
            "none" => (builder.bell_style(BellStyle::None), None),
            "visual" => (builder.bell_style(BellStyle::Visual), None),
            "audible" => (builder.bell_style(BellStyle::Audible), None),
            other => (
                builder,
                Some(ReadlineError::InvalidPrefs(format!(
                    "bellStyle: unknown value {other:?}"
                ))),
            ),
        },
        "historyDuplicates" => match value {
            "none" => (builder.history_duplicates(HistoryDuplicates::None), None),
            "consecutive" => (
                builder.history_duplicates(HistoryDuplicates::Consecutive),
                None,
            ),
            "all" => (builder.history_duplicates(HistoryDuplicates::All), None),
            other => (
                builder,
                Some(ReadlineError::InvalidPrefs(format!(
                    "historyDuplicates: unknown value {other:?}"
                ))),
            ),
        },
        "maxHistorySize" => match value.parse::<usize>() {
            Ok(n) => (builder.max_history_size(n), None),
            Err(_) => (
                builder,
                Some(ReadlineError::InvalidPrefs(format!(
                    "maxHistorySize: not an integer: {value:?}"
                ))),
            ),
        },
        "autoAddHistory" => match parse_bool(value) {
            Some(b) => (builder.auto_add_history(b), None),
            None => (
                builder,
                Some(ReadlineError::InvalidPrefs(format!(
                    "autoAddHistory: not on/off: {value:?}"
                ))),
            ),
        },
        "completionPromptLimit" => match value.parse::<usize>() {
            Ok(n) => (builder.completion_prompt_limit(n), None),
            Err(_) => (
                builder,
                Some(ReadlineError::InvalidPrefs(format!(
                    "completionPromptLimit: not an integer: {value:?}"
                ))),
            ),
        },
        _ => (builder, None), // unknown keys are silently ignored (§6)
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "on" | "true" | "1" => Some(true),
        "off" | "false" | "0" => Some(false),
        _ => None,
    }
}

/// Parse a full preferences file's contents. Errors for individual lines are
/// collected but never abort the parse (§7 `InvalidPrefs` is recovered
/// locally, one key at a time).
pub fn parse_prefs(contents: &str) -> (Config, Vec<ReadlineError>) {
    let mut builder = Config::builder();
    let mut errors = Vec::new();
    for line in contents.lines() {
        let (next, err) = apply_pref_line(builder, line);
        builder = next;
        if let Some(e) = err {
            errors.push(e);
        }
    }
    (builder.build(), errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_table() {
        let cfg = Config::default();
        assert_eq!(cfg.edit_mode(), EditMode::Emacs);
        assert_eq!(cfg.history_duplicates(), HistoryDuplicates::Consecutive);
        assert!(cfg.auto_add_history());
    }

    #[test]
    fn vi_mode_shortens_keyseq_timeout() {
        let cfg = Config::builder().edit_mode(EditMode::Vi).build();
        assert_eq!(cfg.keyseq_timeout_ms(), 500);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let (cfg, errors) = parse_prefs("frobnicate = yes\neditMode = vi\n");
        assert!(errors.is_empty());
        assert_eq!(cfg.edit_mode(), EditMode::Vi);
    }

    #[test]
    fn malformed_known_key_reports_error_but_keeps_default() {
        let (cfg, errors) = parse_prefs("editMode = basic\n");
        assert_eq!(errors.len(), 1);
        assert_eq!(cfg.edit_mode(), EditMode::Emacs);
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let (cfg, errors) = parse_prefs("# comment\n\nmaxHistorySize = 42\n");
        assert!(errors.is_empty());
        assert_eq!(cfg.max_history_size(), 42);
    }
}
