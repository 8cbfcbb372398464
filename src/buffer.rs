//! The mutable session controller that owns the current document.
//!
//! Buffer is the one place where text changes over time: it holds the
//! current `Document` snapshot, drives the undo/redo history, and talks to
//! the external validator and history store at accept time. Everything it
//! does is a plain document transform installed into the current slot.

use std::sync::Mutex;

use log::debug;

use crate::clipboard::ClipboardData;
use crate::document::{char_len, char_slice, Document, DocumentError};
use crate::selection::{PasteMode, SelectionState, SelectionType};
use crate::undo::{EditHistory, HistoryEntry};

/// Predicate consulted before accepting input. Lives outside this crate;
/// the buffer only calls it.
pub type Validator = dyn Fn(&Document) -> bool + Send + Sync;

/// Receives the final text of an accepted input, typically a persisted
/// history store.
pub type AcceptSink = dyn FnMut(&str) + Send + Sync;

pub struct Buffer {
    document: Document,
    // The stacks get their own lock so a background snapshot (say, an
    // auto-save calling `save_to_undo_stack` through a shared reference)
    // cannot interleave with user-driven undo/redo and corrupt the order.
    history: Mutex<EditHistory>,
    validator: Option<Box<Validator>>,
    accept_sink: Option<Box<AcceptSink>>,
}

impl Buffer {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            history: Mutex::new(EditHistory::new()),
            validator: None,
            accept_sink: None,
        }
    }

    pub fn with_validator(mut self, validator: Box<Validator>) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn with_accept_sink(mut self, sink: Box<AcceptSink>) -> Self {
        self.accept_sink = Some(sink);
        self
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn text(&self) -> &str {
        self.document.text()
    }

    pub fn cursor_position(&self) -> usize {
        self.document.cursor_position()
    }

    /// Install a document as the current one. History navigation feeds
    /// externally supplied text back in through here.
    pub fn set_document(&mut self, document: Document) {
        self.document = document;
    }

    fn lock_history(&self) -> std::sync::MutexGuard<'_, EditHistory> {
        // A poisoned lock still holds structurally consistent stacks.
        self.history
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Snapshot the current state onto the undo stack. When the top entry
    /// already carries the current text only its cursor is updated, so a
    /// run of cursor moves without edits stays a single entry. Ordinary
    /// edits clear the redo stack; `redo` itself passes `false` to keep
    /// the remaining future.
    pub fn save_to_undo_stack(&self, clear_redo_stack: bool) {
        self.lock_history().save(
            self.document.text(),
            self.document.cursor_position(),
            clear_redo_stack,
        );
    }

    /// Restore the top undo entry, moving the current state to the redo
    /// stack. Silent no-op when there is nothing to undo.
    pub fn undo(&mut self) {
        let entry = {
            let mut history = self.lock_history();
            let Some(entry) = history.pop_undo() else {
                return;
            };
            history.push_redo(HistoryEntry {
                text: self.document.text().to_string(),
                cursor_position: self.document.cursor_position(),
            });
            entry
        };
        debug!("undo to {} chars", entry.text.chars().count());
        self.document = Document::restored(entry.text, entry.cursor_position);
    }

    /// Restore the top redo entry, saving the current state onto the undo
    /// stack without discarding the remaining redo entries. Silent no-op
    /// when there is nothing to redo.
    pub fn redo(&mut self) {
        let entry = {
            let mut history = self.lock_history();
            let Some(entry) = history.pop_redo() else {
                return;
            };
            history.save(
                self.document.text(),
                self.document.cursor_position(),
                false,
            );
            entry
        };
        debug!("redo to {} chars", entry.text.chars().count());
        self.document = Document::restored(entry.text, entry.cursor_position);
    }

    pub fn can_undo(&self) -> bool {
        self.lock_history().can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.lock_history().can_redo()
    }

    pub fn clear_history(&self) {
        self.lock_history().clear();
    }

    // Editing conveniences. Each one installs a transformed snapshot.

    pub fn insert_text(&mut self, text: &str) {
        self.document = self.document.insert_text_at_cursor(text);
    }

    pub fn newline(&mut self) {
        self.insert_text("\n");
    }

    /// Delete up to `count` characters before the cursor and return them.
    pub fn delete_before_cursor(&mut self, count: usize) -> String {
        let cursor = self.document.cursor_position();
        let count = count.min(cursor);
        if count == 0 {
            return String::new();
        }
        let text = self.document.text();
        let deleted = char_slice(text, cursor - count, cursor).to_string();
        let mut new_text = String::new();
        new_text.push_str(char_slice(text, 0, cursor - count));
        new_text.push_str(self.document.text_after_cursor());
        self.document = Document::restored(new_text, cursor - count);
        deleted
    }

    /// Delete up to `count` characters after the cursor and return them.
    pub fn delete(&mut self, count: usize) -> String {
        let cursor = self.document.cursor_position();
        let text = self.document.text();
        let remaining = char_len(text) - cursor;
        let count = count.min(remaining);
        if count == 0 {
            return String::new();
        }
        let deleted = char_slice(text, cursor, cursor + count).to_string();
        let mut new_text = String::new();
        new_text.push_str(self.document.text_before_cursor());
        new_text.push_str(char_slice(text, cursor + count, char_len(text)));
        self.document = Document::restored(new_text, cursor);
        deleted
    }

    pub fn set_cursor_position(&mut self, position: usize) -> Result<(), DocumentError> {
        self.document = self.document.with_cursor_position(position)?;
        Ok(())
    }

    fn move_cursor(&mut self, offset: isize) {
        let position = self
            .document
            .cursor_position()
            .saturating_add_signed(offset);
        if let Ok(document) = self.document.with_cursor_position(position) {
            self.document = document;
        }
    }

    pub fn cursor_left(&mut self, count: usize) {
        let offset = self.document.get_cursor_left_position(count);
        self.move_cursor(offset);
    }

    pub fn cursor_right(&mut self, count: usize) {
        let offset = self.document.get_cursor_right_position(count);
        self.move_cursor(offset);
    }

    pub fn cursor_up(&mut self, count: usize) {
        let offset = self.document.get_cursor_up_position(count, None);
        self.move_cursor(offset);
    }

    pub fn cursor_down(&mut self, count: usize) {
        let offset = self.document.get_cursor_down_position(count, None);
        self.move_cursor(offset);
    }

    /// Anchor a new selection of the given shape at the cursor.
    pub fn start_selection(&mut self, selection_type: SelectionType) {
        let anchor = self.document.cursor_position();
        self.document = self
            .document
            .with_selection_state(SelectionState::new(anchor, selection_type));
    }

    pub fn exit_selection(&mut self) {
        self.document = self.document.without_selection();
    }

    /// Cut the active selection out of the buffer and hand back the
    /// clipboard content.
    pub fn cut_selection(&mut self) -> ClipboardData {
        let (document, clipboard) = self.document.cut_selection();
        self.document = document;
        clipboard
    }

    pub fn paste_clipboard_data(&mut self, data: &ClipboardData, paste_mode: PasteMode, count: usize) {
        self.document = self.document.paste_clipboard_data(data, paste_mode, count);
    }

    /// Run the external validator and, when it passes, hand the final text
    /// to the accept sink. A missing validator accepts everything; a
    /// rejection is an ordinary `false`, not an error.
    pub fn accept(&mut self) -> bool {
        let valid = self
            .validator
            .as_ref()
            .map(|validate| validate(&self.document))
            .unwrap_or(true);
        if valid {
            debug!("input accepted ({} chars)", char_len(self.document.text()));
            if let Some(sink) = self.accept_sink.as_mut() {
                sink(self.document.text());
            }
        } else {
            debug!("input rejected by validator");
        }
        valid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer_with(text: &str) -> Buffer {
        Buffer::new(Document::with_text(text))
    }

    #[test]
    fn test_insert_and_delete() {
        let mut buffer = buffer_with("");
        buffer.insert_text("hello");
        assert_eq!(buffer.text(), "hello");
        assert_eq!(buffer.cursor_position(), 5);

        assert_eq!(buffer.delete_before_cursor(2), "lo");
        assert_eq!(buffer.text(), "hel");

        buffer.set_cursor_position(0).unwrap();
        assert_eq!(buffer.delete(1), "h");
        assert_eq!(buffer.text(), "el");

        // Deleting past either edge stops at the boundary.
        assert_eq!(buffer.delete(10), "el");
        assert_eq!(buffer.delete_before_cursor(10), "");
    }

    #[test]
    fn test_cursor_movement() {
        let mut buffer = buffer_with("abc\ndef");
        buffer.set_cursor_position(1).unwrap();
        buffer.cursor_right(1);
        assert_eq!(buffer.cursor_position(), 2);
        buffer.cursor_down(1);
        assert_eq!(buffer.cursor_position(), 6);
        buffer.cursor_left(2);
        assert_eq!(buffer.cursor_position(), 4);
        buffer.cursor_up(1);
        assert_eq!(buffer.cursor_position(), 0);
    }

    #[test]
    fn test_undo_redo_scenario() {
        let mut buffer = buffer_with("one");
        buffer.save_to_undo_stack(true);
        buffer.set_document(Document::with_text("two"));
        buffer.save_to_undo_stack(true);
        buffer.set_document(Document::with_text("three"));

        buffer.undo();
        assert_eq!(buffer.text(), "two");
        buffer.undo();
        assert_eq!(buffer.text(), "one");
        buffer.undo();
        assert_eq!(buffer.text(), "one");

        buffer.redo();
        assert_eq!(buffer.text(), "two");
        buffer.redo();
        assert_eq!(buffer.text(), "three");
        buffer.redo();
        assert_eq!(buffer.text(), "three");
    }

    #[test]
    fn test_undo_redo_restores_cursor() {
        let mut buffer = buffer_with("hello");
        buffer.set_cursor_position(2).unwrap();
        buffer.save_to_undo_stack(true);
        buffer.insert_text(" there");
        let cursor_after_edit = buffer.cursor_position();

        buffer.undo();
        assert_eq!(buffer.cursor_position(), 2);
        buffer.redo();
        assert_eq!(buffer.cursor_position(), cursor_after_edit);
    }

    #[test]
    fn test_fresh_edit_discards_redo_branch() {
        let mut buffer = buffer_with("one");
        buffer.save_to_undo_stack(true);
        buffer.set_document(Document::with_text("two"));
        buffer.undo();
        assert!(buffer.can_redo());

        buffer.save_to_undo_stack(true);
        assert!(!buffer.can_redo());
    }

    #[test]
    fn test_coalescing_keeps_depth_but_updates_cursor() {
        let mut buffer = buffer_with("steady");
        buffer.save_to_undo_stack(true);
        buffer.set_cursor_position(1).unwrap();
        // Same text, so this only updates the stored cursor.
        buffer.save_to_undo_stack(true);

        buffer.set_document(Document::with_text("changed"));
        buffer.undo();
        assert_eq!(buffer.text(), "steady");
        assert_eq!(buffer.cursor_position(), 1);
        // One more undo hits an empty stack, not a second entry.
        buffer.undo();
        assert_eq!(buffer.text(), "steady");
    }

    #[test]
    fn test_clear_history() {
        let mut buffer = buffer_with("one");
        buffer.save_to_undo_stack(true);
        buffer.set_document(Document::with_text("two"));
        buffer.clear_history();
        buffer.undo();
        assert_eq!(buffer.text(), "two");
    }

    #[test]
    fn test_selection_cut_paste_through_buffer() {
        let mut buffer = buffer_with("hello world");
        buffer.set_cursor_position(6).unwrap();
        buffer.start_selection(SelectionType::Characters);
        buffer.set_cursor_position(11).unwrap();

        let clipboard = buffer.cut_selection();
        assert_eq!(buffer.text(), "hello ");
        assert_eq!(clipboard.text, "world");

        buffer.paste_clipboard_data(&clipboard, PasteMode::Emacs, 1);
        assert_eq!(buffer.text(), "hello world");
    }

    #[test]
    fn test_exit_selection() {
        let mut buffer = buffer_with("abc");
        buffer.start_selection(SelectionType::Lines);
        assert!(buffer.document().selection().is_some());
        buffer.exit_selection();
        assert!(buffer.document().selection().is_none());
    }

    #[test]
    fn test_accept_without_validator() {
        let mut buffer = buffer_with("anything");
        assert!(buffer.accept());
    }

    #[test]
    fn test_accept_runs_validator_and_sink() {
        use std::sync::{Arc, Mutex};

        let accepted: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let sink_log = Arc::clone(&accepted);

        let mut buffer = Buffer::new(Document::with_text("ok"))
            .with_validator(Box::new(|document| !document.text().is_empty()))
            .with_accept_sink(Box::new(move |text| {
                sink_log.lock().unwrap().push(text.to_string());
            }));

        assert!(buffer.accept());
        assert_eq!(*accepted.lock().unwrap(), ["ok"]);

        buffer.set_document(Document::with_text(""));
        assert!(!buffer.accept());
        assert_eq!(accepted.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_save_is_callable_through_shared_reference() {
        use std::sync::Arc;
        use std::thread;

        let buffer = Arc::new(buffer_with("shared"));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let buffer = Arc::clone(&buffer);
                thread::spawn(move || buffer.save_to_undo_stack(true))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        // Identical snapshots coalesce into one entry however the saves
        // interleave.
        assert!(buffer.can_undo());
    }
}
