//! Text-editing core for an interactive terminal line editor.
//!
//! `Document` is an immutable snapshot of text, cursor, and selection with
//! the full query/navigation/transform surface; `Buffer` is the mutable
//! session controller that owns the current document and its undo/redo
//! history. Rendering, key dispatch, and terminal I/O live elsewhere and
//! drive this crate through those two types.

mod bracket;
mod buffer;
mod cache;
mod clipboard;
mod document;
mod movement;
mod selection;
mod undo;
mod word;

pub use buffer::{AcceptSink, Buffer, Validator};
pub use cache::DocumentCache;
pub use clipboard::ClipboardData;
pub use document::{Document, DocumentError};
pub use selection::{PasteMode, SelectionState, SelectionType};
pub use word::{FIND_BIG_WORD_RE, FIND_WORD_RE};
