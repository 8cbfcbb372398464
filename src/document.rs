//! Immutable text/cursor/selection snapshots.
//!
//! A Document never changes: every transform hands back a new snapshot.
//! Snapshots that share a text object also share one `DocumentCache`, so
//! cursor-only changes cost nothing beyond the struct itself.

use std::sync::Arc;

use thiserror::Error;
use unicode_width::UnicodeWidthStr;

use crate::cache::DocumentCache;
use crate::clipboard::ClipboardData;
use crate::selection::{PasteMode, SelectionState, SelectionType};

/// Number of characters in `text`. All cursor positions and offsets in this
/// crate are character indexes, never byte indexes.
pub(crate) fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Byte offset of the character at `char_index`, or `text.len()` when the
/// index points past the last character.
pub(crate) fn byte_offset(text: &str, char_index: usize) -> usize {
    text.char_indices()
        .nth(char_index)
        .map(|(offset, _)| offset)
        .unwrap_or(text.len())
}

/// Slice `text` by character positions.
pub(crate) fn char_slice(text: &str, start: usize, end: usize) -> &str {
    let start = byte_offset(text, start);
    let end = byte_offset(text, end);
    &text[start..end]
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DocumentError {
    #[error("cursor position {position} is out of range for text of {len} characters")]
    CursorOutOfRange { position: usize, len: usize },
}

/// An immutable snapshot of text, cursor position, and optional selection.
///
/// Equality considers `(text, cursor_position, selection)` only; the cache
/// handle is invisible to comparisons.
#[derive(Debug, Clone)]
pub struct Document {
    text: Arc<str>,
    cursor_position: usize,
    selection: Option<SelectionState>,
    cache: Arc<DocumentCache>,
}

impl Document {
    /// An empty document with the cursor at position 0.
    pub fn new() -> Self {
        Self::with_text("")
    }

    /// A document with the cursor at the end of the text.
    pub fn with_text(text: impl Into<String>) -> Self {
        let text: Arc<str> = Arc::from(text.into());
        let cursor_position = char_len(&text);
        Self {
            text,
            cursor_position,
            selection: None,
            cache: Arc::new(DocumentCache::new()),
        }
    }

    /// A document with an explicit cursor position. The position is
    /// validated against `[0, len]` and rejected when out of range, never
    /// clamped, so bugs surface at the call site.
    pub fn with_cursor(
        text: impl Into<String>,
        cursor_position: usize,
    ) -> Result<Self, DocumentError> {
        let mut document = Self::with_text(text);
        let len = char_len(&document.text);
        if cursor_position > len {
            return Err(DocumentError::CursorOutOfRange {
                position: cursor_position,
                len,
            });
        }
        document.cursor_position = cursor_position;
        Ok(document)
    }

    /// A document with an active selection.
    pub fn with_selection(
        text: impl Into<String>,
        cursor_position: usize,
        selection: SelectionState,
    ) -> Result<Self, DocumentError> {
        let mut document = Self::with_cursor(text, cursor_position)?;
        document.selection = Some(selection);
        Ok(document)
    }

    /// Rebuild from an undo/redo stack entry. The stored cursor may point
    /// past the stored text when coalescing updated it after a shortening
    /// edit, so it is clamped here rather than rejected.
    pub(crate) fn restored(text: String, cursor_position: usize) -> Self {
        let text: Arc<str> = Arc::from(text);
        let cursor_position = cursor_position.min(char_len(&text));
        Self {
            text,
            cursor_position,
            selection: None,
            cache: Arc::new(DocumentCache::new()),
        }
    }

    /// A snapshot of the same text with the cursor somewhere else. The two
    /// documents share one text object and therefore one cache.
    pub fn with_cursor_position(&self, cursor_position: usize) -> Result<Self, DocumentError> {
        let len = char_len(&self.text);
        if cursor_position > len {
            return Err(DocumentError::CursorOutOfRange {
                position: cursor_position,
                len,
            });
        }
        Ok(Self {
            text: Arc::clone(&self.text),
            cursor_position,
            selection: self.selection.clone(),
            cache: Arc::clone(&self.cache),
        })
    }

    /// The same text and cursor with a selection attached. The document
    /// stores its own copy of the state.
    pub fn with_selection_state(&self, selection: SelectionState) -> Self {
        Self {
            text: Arc::clone(&self.text),
            cursor_position: self.cursor_position,
            selection: Some(selection),
            cache: Arc::clone(&self.cache),
        }
    }

    /// The same text and cursor with no selection.
    pub fn without_selection(&self) -> Self {
        Self {
            text: Arc::clone(&self.text),
            cursor_position: self.cursor_position,
            selection: None,
            cache: Arc::clone(&self.cache),
        }
    }

    /// A fresh document derived from an edit. New text means a new cache.
    pub(crate) fn derived(text: String, cursor_position: usize) -> Self {
        let text: Arc<str> = Arc::from(text);
        debug_assert!(cursor_position <= char_len(&text));
        Self {
            text,
            cursor_position,
            selection: None,
            cache: Arc::new(DocumentCache::new()),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor_position(&self) -> usize {
        self.cursor_position
    }

    pub fn selection(&self) -> Option<&SelectionState> {
        self.selection.as_ref()
    }

    #[cfg(test)]
    pub(crate) fn shares_cache_with(&self, other: &Document) -> bool {
        Arc::ptr_eq(&self.cache, &other.cache)
    }

    // Core queries

    /// The character under the cursor, absent when the cursor sits at the
    /// end of the text.
    pub fn current_char(&self) -> Option<char> {
        self.text_after_cursor().chars().next()
    }

    /// The character left of the cursor, absent at the start of the text.
    pub fn char_before_cursor(&self) -> Option<char> {
        self.text_before_cursor().chars().next_back()
    }

    /// The character at `offset` characters from the cursor, in either
    /// direction.
    pub fn get_char_relative_to_cursor(&self, offset: isize) -> Option<char> {
        let position = self.cursor_position.checked_add_signed(offset)?;
        self.text.chars().nth(position)
    }

    pub fn text_before_cursor(&self) -> &str {
        &self.text[..byte_offset(&self.text, self.cursor_position)]
    }

    pub fn text_after_cursor(&self) -> &str {
        &self.text[byte_offset(&self.text, self.cursor_position)..]
    }

    pub fn current_line_before_cursor(&self) -> &str {
        self.text_before_cursor().rsplit('\n').next().unwrap_or("")
    }

    pub fn current_line_after_cursor(&self) -> &str {
        self.text_after_cursor().split('\n').next().unwrap_or("")
    }

    pub fn current_line(&self) -> &str {
        &self.lines()[self.cursor_position_row()]
    }

    /// The whitespace prefix of the current line.
    pub fn leading_whitespace_in_current_line(&self) -> &str {
        let line = self.current_line();
        &line[..line.len() - line.trim_start().len()]
    }

    /// All lines of the text, through the shared cache.
    pub fn lines(&self) -> &[String] {
        self.cache.lines(&self.text)
    }

    pub fn line_count(&self) -> usize {
        self.lines().len()
    }

    pub fn is_cursor_at_the_end(&self) -> bool {
        self.cursor_position == char_len(&self.text)
    }

    pub fn is_cursor_at_the_end_of_line(&self) -> bool {
        matches!(self.current_char(), None | Some('\n'))
    }

    pub fn on_first_line(&self) -> bool {
        self.cursor_position_row() == 0
    }

    pub fn on_last_line(&self) -> bool {
        self.cursor_position_row() == self.line_count() - 1
    }

    /// Terminal column of the cursor, counting wide glyphs by their
    /// rendered width.
    pub fn display_cursor_column(&self) -> usize {
        UnicodeWidthStr::width(self.current_line_before_cursor())
    }

    // Offset and (row, column) translation

    /// Translate an absolute character offset into a (row, column) pair.
    pub fn translate_index_to_position(&self, index: usize) -> (usize, usize) {
        let indexes = self.cache.line_start_indexes(&self.text);
        let row = match indexes.binary_search(&index) {
            Ok(row) => row,
            Err(insertion) => insertion - 1,
        };
        (row, index - indexes[row])
    }

    /// Translate a (row, column) pair into an absolute character offset.
    /// Row and column are clipped to real lines and columns, and the result
    /// never points past the end of the text.
    pub fn translate_row_col_to_index(&self, row: usize, col: usize) -> usize {
        let indexes = self.cache.line_start_indexes(&self.text);
        let lines = self.lines();
        let row = row.min(lines.len() - 1);
        let index = indexes[row] + col.min(char_len(&lines[row]));
        index.min(char_len(&self.text))
    }

    pub fn cursor_position_row(&self) -> usize {
        self.translate_index_to_position(self.cursor_position).0
    }

    pub fn cursor_position_col(&self) -> usize {
        self.translate_index_to_position(self.cursor_position).1
    }

    // Selection geometry

    /// The sorted `(from, to)` pair of cursor and selection anchor. Does
    /// not take the selection type into account; without a selection this
    /// is the zero-width span at the cursor.
    pub fn selection_range(&self) -> (usize, usize) {
        match &self.selection {
            Some(selection) => {
                let anchor = selection.original_cursor_position;
                (
                    anchor.min(self.cursor_position),
                    anchor.max(self.cursor_position),
                )
            }
            None => (self.cursor_position, self.cursor_position),
        }
    }

    /// Half-open `(from, to)` spans covered by the selection, shaped by its
    /// type. Without a selection there are no spans.
    ///
    /// Characters yields a single span. Lines yields one span per covered
    /// line, newline separators excluded. Block yields one span per row
    /// between the sorted columns, clipped to each row's length; rows that
    /// end before the left column yield nothing.
    pub fn selection_ranges(&self) -> Vec<(usize, usize)> {
        let Some(selection) = &self.selection else {
            return Vec::new();
        };
        let (from, to) = self.selection_range();

        match selection.selection_type {
            SelectionType::Characters => vec![(from, to)],
            SelectionType::Lines => {
                let (from_row, _) = self.translate_index_to_position(from);
                let (to_row, _) = self.translate_index_to_position(to);
                let lines = self.lines();
                (from_row..=to_row)
                    .map(|row| {
                        let start = self.translate_row_col_to_index(row, 0);
                        (start, start + char_len(&lines[row]))
                    })
                    .collect()
            }
            SelectionType::Block => {
                let (from_row, from_col) = self.translate_index_to_position(from);
                let (to_row, to_col) = self.translate_index_to_position(to);
                let left = from_col.min(to_col);
                let right = from_col.max(to_col);
                let lines = self.lines();

                let mut ranges = Vec::new();
                for row in from_row..=to_row {
                    let line_length = char_len(&lines[row]);
                    if left < line_length {
                        ranges.push((
                            self.translate_row_col_to_index(row, left),
                            self.translate_row_col_to_index(row, right.min(line_length)),
                        ));
                    }
                }
                ranges
            }
        }
    }

    /// The part of the selection that falls on `row`, as a half-open span,
    /// or `None` when the selection does not touch that row.
    pub fn selection_range_at_line(&self, row: usize) -> Option<(usize, usize)> {
        let selection = self.selection.as_ref()?;
        let line = self.lines().get(row)?;
        let line_length = char_len(line);

        let row_start = self.translate_row_col_to_index(row, 0);
        let row_end = row_start + line_length;

        let (from, to) = self.selection_range();
        let intersection_start = from.max(row_start);
        let intersection_end = to.min(row_end);
        if intersection_start > intersection_end {
            return None;
        }

        match selection.selection_type {
            SelectionType::Characters => Some((intersection_start, intersection_end)),
            SelectionType::Lines => Some((row_start, row_end)),
            SelectionType::Block => {
                let (_, from_col) = self.translate_index_to_position(from);
                let (_, to_col) = self.translate_index_to_position(to);
                let left = from_col.min(to_col);
                let right = from_col.max(to_col);
                if left >= line_length {
                    // The block sits entirely right of this row's text.
                    return None;
                }
                Some((
                    self.translate_row_col_to_index(row, left),
                    self.translate_row_col_to_index(row, right.min(line_length)),
                ))
            }
        }
    }

    // Cut and paste transforms

    /// Remove the selected spans, returning the trimmed document and the
    /// captured clipboard content. The cursor lands at the start of the
    /// removed region and the selection is cleared. Without a selection
    /// the document comes back unchanged alongside empty character data.
    pub fn cut_selection(&self) -> (Document, ClipboardData) {
        let Some(selection) = &self.selection else {
            return (self.without_selection(), ClipboardData::default());
        };

        if selection.selection_type == SelectionType::Lines {
            return self.cut_lines_selection();
        }

        let mut cut_parts = Vec::new();
        let mut remaining_parts = Vec::new();
        let mut new_cursor_position = self.cursor_position;
        let mut last_to = 0;

        for (from, to) in self.selection_ranges() {
            if cut_parts.is_empty() {
                new_cursor_position = from;
            }
            remaining_parts.push(char_slice(&self.text, last_to, from));
            cut_parts.push(char_slice(&self.text, from, to));
            last_to = to;
        }
        remaining_parts.push(char_slice(&self.text, last_to, char_len(&self.text)));

        // Block spans are removed per line, so the fragments are rejoined
        // with the newline they lost.
        let cut_text = cut_parts.join("\n");
        let remaining_text = remaining_parts.concat();

        (
            Document::derived(remaining_text, new_cursor_position),
            ClipboardData::new(cut_text, selection.selection_type),
        )
    }

    /// Lines selections consume whole lines including their separators, so
    /// no blank lines are left behind.
    fn cut_lines_selection(&self) -> (Document, ClipboardData) {
        let (from, to) = self.selection_range();
        let (from_row, _) = self.translate_index_to_position(from);
        let (to_row, _) = self.translate_index_to_position(to);
        let lines = self.lines();

        let cut_text = lines[from_row..=to_row].join("\n");
        let start = self.translate_row_col_to_index(from_row, 0);
        let end = if to_row + 1 < lines.len() {
            self.translate_row_col_to_index(to_row + 1, 0)
        } else {
            char_len(&self.text)
        };

        let mut remaining_text = String::new();
        remaining_text.push_str(char_slice(&self.text, 0, start));
        remaining_text.push_str(char_slice(&self.text, end, char_len(&self.text)));

        (
            Document::derived(remaining_text, start),
            ClipboardData::new(cut_text, SelectionType::Lines),
        )
    }

    /// The result of pasting `data` at the cursor, repeated `count` times.
    pub fn paste_clipboard_data(
        &self,
        data: &ClipboardData,
        paste_mode: PasteMode,
        count: usize,
    ) -> Document {
        let before = paste_mode == PasteMode::ViBefore;
        let after = paste_mode == PasteMode::ViAfter;
        let text_length = char_len(&self.text);

        match data.data_type {
            SelectionType::Characters => {
                // ViAfter lands after the character under the cursor,
                // ViBefore and Emacs land at the cursor itself.
                let insert_at = if after {
                    (self.cursor_position + 1).min(text_length)
                } else {
                    self.cursor_position
                };
                let pasted = data.text.repeat(count);
                let mut new_text = String::new();
                new_text.push_str(char_slice(&self.text, 0, insert_at));
                new_text.push_str(&pasted);
                new_text.push_str(char_slice(&self.text, insert_at, text_length));

                let mut new_cursor_position = self.cursor_position + char_len(&data.text) * count;
                if before {
                    new_cursor_position = new_cursor_position.saturating_sub(1);
                }
                Document::derived(new_text, new_cursor_position)
            }
            SelectionType::Lines => {
                let row = self.cursor_position_row();
                let lines = self.lines();
                let (split_at, new_cursor_position) = if before {
                    let offset: usize = lines[..row].iter().map(|l| char_len(l)).sum();
                    (row, offset + row)
                } else {
                    let offset: usize = lines[..=row].iter().map(|l| char_len(l)).sum();
                    (row + 1, offset + row + 1)
                };
                let mut new_lines: Vec<&str> = Vec::with_capacity(lines.len() + count);
                new_lines.extend(lines[..split_at].iter().map(String::as_str));
                new_lines.extend(std::iter::repeat(data.text.as_str()).take(count));
                new_lines.extend(lines[split_at..].iter().map(String::as_str));

                Document::derived(new_lines.join("\n"), new_cursor_position)
            }
            SelectionType::Block => {
                let mut lines: Vec<String> = self.lines().to_vec();
                let start_row = self.cursor_position_row();
                let start_col = self.cursor_position_col() + if before { 0 } else { 1 };

                for (i, paste_line) in data.text.split('\n').enumerate() {
                    let index = start_row + i;
                    if index >= lines.len() {
                        lines.push(String::new());
                    }
                    let line = &mut lines[index];
                    let line_length = char_len(line);
                    if line_length < start_col {
                        line.push_str(&" ".repeat(start_col - line_length));
                    }
                    let insert_byte = byte_offset(line, start_col);
                    line.insert_str(insert_byte, &paste_line.repeat(count));
                }

                let new_cursor_position = self.translate_row_col_to_index(start_row, start_col);
                Document::derived(lines.join("\n"), new_cursor_position)
            }
        }
    }

    /// Append `text` behind the document. Cursor and selection stay put.
    pub fn insert_after(&self, text: &str) -> Document {
        let mut document =
            Document::derived(format!("{}{}", self.text, text), self.cursor_position);
        document.selection = self.selection.clone();
        document
    }

    /// Prepend `text` before the document, shifting the cursor and the
    /// selection anchor along with it.
    pub fn insert_before(&self, text: &str) -> Document {
        let shift = char_len(text);
        let selection = self.selection.clone().map(|mut selection| {
            selection.original_cursor_position += shift;
            selection
        });
        let mut document = Document::derived(
            format!("{}{}", text, self.text),
            self.cursor_position + shift,
        );
        document.selection = selection;
        document
    }

    /// Insert `text` at the cursor, leaving the cursor after the insertion.
    pub fn insert_text_at_cursor(&self, text: &str) -> Document {
        let mut new_text = String::with_capacity(self.text.len() + text.len());
        new_text.push_str(self.text_before_cursor());
        new_text.push_str(text);
        new_text.push_str(self.text_after_cursor());
        Document::derived(new_text, self.cursor_position + char_len(text))
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        *self.text == *other.text
            && self.cursor_position == other.cursor_position
            && self.selection == other.selection
    }
}

impl Eq for Document {}
