//! Error taxonomy (§7). Only [`ReadlineError::TerminalUnavailable`] and the
//! catch-all [`ReadlineError::Io`] are expected to escape a `read_line`
//! call in practice — everything else is recovered locally by the session
//! driver per §7's propagation policy and only reaches a caller if they
//! explicitly surface it (e.g. through a logging sink).

use std::fmt;
use std::io;

/// Failures the core can surface to an embedding application.
#[derive(Debug)]
pub enum ReadlineError {
    /// stdin closed, or Ctrl-D on an empty line.
    Eof,
    /// SIGINT observed during input; see [`crate::editor::Editor::handle_interrupt`]
    /// for how callers intercept this before it becomes an error.
    Interrupted,
    /// Not a TTY and no override was given; caller should already have
    /// fallen back to unedited line reads (§7) before this is raised.
    TerminalUnavailable(io::Error),
    /// A byte sequence could not be decoded as UTF-8; recovered by
    /// substituting U+FFFD and continuing.
    Encoding,
    /// Reading or writing the persisted history file failed.
    HistoryIo(io::Error),
    /// The preferences file was malformed; defaults were used for the
    /// affected keys.
    InvalidPrefs(String),
    /// A user-supplied completer returned an error.
    CompleterFailed(String),
    /// Any other I/O failure not covered above.
    Io(io::Error),
}

impl fmt::Display for ReadlineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadlineError::Eof => write!(f, "end of input"),
            ReadlineError::Interrupted => write!(f, "interrupted"),
            ReadlineError::TerminalUnavailable(e) => write!(f, "terminal unavailable: {e}"),
            ReadlineError::Encoding => write!(f, "invalid UTF-8 in input"),
            ReadlineError::HistoryIo(e) => write!(f, "history I/O error: {e}"),
            ReadlineError::InvalidPrefs(msg) => write!(f, "invalid preferences: {msg}"),
            ReadlineError::CompleterFailed(msg) => write!(f, "completion failed: {msg}"),
            ReadlineError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for ReadlineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReadlineError::TerminalUnavailable(e)
            | ReadlineError::HistoryIo(e)
            | ReadlineError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ReadlineError {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::Interrupted {
            ReadlineError::Interrupted
        } else {
            ReadlineError::Io(e)
        }
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, ReadlineError>;
