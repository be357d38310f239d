//! A portable, embeddable interactive line-editing core: the pieces a
//! `readline`/Haskeline-style front end needs — cursor-addressable line
//! state with kill ring and undo, Emacs and Vi key dispatch, a terminal
//! back-end abstraction with raw-mode and signal handling, completion, and
//! a persisted history store with incremental search — without committing
//! to any one shell or REPL's surface syntax.
//!
//! The [`editor::Editor`] type ties every module together behind
//! `read_line`/`read_password`/`read_char`. Everything below it — keymaps,
//! the line buffer, history, completion — is also exported for callers
//! who want to drive the pieces themselves.

pub mod completion;
pub mod config;
pub mod editor;
pub mod error;
pub mod history;
pub mod keymap;
pub mod keys;
pub mod kill_ring;
pub mod line_buffer;
pub mod render;
pub mod search;
pub mod tty;
pub mod undo;

pub use completion::{Completer, Completion, CompletionResult};
pub use config::{BellStyle, Config, EditMode, HistoryDuplicates};
pub use editor::Editor;
pub use error::{ReadlineError, Result};
pub use history::History;
pub use keys::{FnKey, KeyEvent, Signal};
