//! Cursor-relative navigation queries.
//!
//! Every method returns a relative character offset from the cursor (or an
//! absent result for searches that find nothing); actually moving the
//! cursor is the session controller's job.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::document::{char_len, Document};

/// A blank line, possibly carrying stray spaces or tabs. Reads the same in
/// both directions, which the reversed backward scans rely on.
static PARAGRAPH_SEPARATOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n[ \t]*\n").expect("paragraph separator pattern"));

fn find_pattern(sub: &str, ignore_case: bool) -> Regex {
    let escaped = regex::escape(sub);
    let pattern = if ignore_case {
        format!("(?i){escaped}")
    } else {
        escaped
    };
    Regex::new(&pattern).expect("escaped literal pattern")
}

impl Document {
    /// Offset for moving `count` characters left, bounded by the start of
    /// the current line.
    pub fn get_cursor_left_position(&self, count: usize) -> isize {
        -(count.min(self.cursor_position_col()) as isize)
    }

    /// Offset for moving `count` characters right, bounded by the end of
    /// the current line.
    pub fn get_cursor_right_position(&self, count: usize) -> isize {
        count.min(char_len(self.current_line_after_cursor())) as isize
    }

    /// Offset for moving `count` rows up, keeping the column (or an
    /// explicitly preferred column) where possible.
    pub fn get_cursor_up_position(&self, count: usize, preferred_column: Option<usize>) -> isize {
        let column = preferred_column.unwrap_or_else(|| self.cursor_position_col());
        let row = self.cursor_position_row().saturating_sub(count.max(1));
        self.translate_row_col_to_index(row, column) as isize - self.cursor_position() as isize
    }

    /// Offset for moving `count` rows down, keeping the column (or an
    /// explicitly preferred column) where possible.
    pub fn get_cursor_down_position(&self, count: usize, preferred_column: Option<usize>) -> isize {
        let column = preferred_column.unwrap_or_else(|| self.cursor_position_col());
        let row = self.cursor_position_row() + count.max(1);
        self.translate_row_col_to_index(row, column) as isize - self.cursor_position() as isize
    }

    /// Offset to the start of the current line, or to its first
    /// non-whitespace character.
    pub fn get_start_of_line_position(&self, after_whitespace: bool) -> isize {
        if after_whitespace {
            let line = self.current_line();
            let indent = char_len(line) - char_len(line.trim_start());
            indent as isize - self.cursor_position_col() as isize
        } else {
            -(char_len(self.current_line_before_cursor()) as isize)
        }
    }

    /// Offset to the end of the current line.
    pub fn get_end_of_line_position(&self) -> isize {
        char_len(self.current_line_after_cursor()) as isize
    }

    /// Offset for jumping to `column` on the current line, clipped to the
    /// line's length.
    pub fn get_column_cursor_position(&self, column: usize) -> isize {
        let column = column.min(char_len(self.current_line()));
        column as isize - self.cursor_position_col() as isize
    }

    pub fn get_start_of_document_position(&self) -> isize {
        -(self.cursor_position() as isize)
    }

    pub fn get_end_of_document_position(&self) -> isize {
        char_len(self.text()) as isize - self.cursor_position() as isize
    }

    /// Offset to the start of the current paragraph, or of the `count`-th
    /// paragraph back. Paragraphs are separated by blank lines. With
    /// `before` the offset lands on the separator itself. Falls back to
    /// the start of the document.
    pub fn start_of_paragraph(&self, count: usize, before: bool) -> isize {
        let reversed: String = self.text_before_cursor().chars().rev().collect();
        for (i, found) in PARAGRAPH_SEPARATOR_RE.find_iter(&reversed).enumerate() {
            if i + 1 == count {
                let end = if before { found.end() } else { found.start() };
                return -(char_len(&reversed[..end]) as isize);
            }
        }
        -(char_len(self.text_before_cursor()) as isize)
    }

    /// Offset to the end of the current paragraph, or of the `count`-th
    /// paragraph ahead. With `after` the offset lands past the separator.
    /// Falls back to the end of the document.
    pub fn end_of_paragraph(&self, count: usize, after: bool) -> isize {
        let text = self.text_after_cursor();
        for (i, found) in PARAGRAPH_SEPARATOR_RE.find_iter(text).enumerate() {
            if i + 1 == count {
                let end = if after { found.end() } else { found.start() };
                return char_len(&text[..end]) as isize;
            }
        }
        char_len(text) as isize
    }

    /// Find the `count`-th occurrence of `sub` after the cursor and return
    /// its offset relative to the cursor, or `None`. The occurrence under
    /// the cursor only counts with `include_current_position`.
    pub fn find(
        &self,
        sub: &str,
        in_current_line: bool,
        include_current_position: bool,
        ignore_case: bool,
        count: usize,
    ) -> Option<isize> {
        let text = if in_current_line {
            self.current_line_after_cursor()
        } else {
            self.text_after_cursor()
        };

        // Skip the character under the cursor, otherwise the current
        // occurrence always matches.
        let (text, skipped) = if include_current_position {
            (text, 0)
        } else {
            if text.is_empty() {
                return None;
            }
            let mut chars = text.char_indices();
            chars.next();
            let offset = chars.next().map(|(i, _)| i).unwrap_or(text.len());
            (&text[offset..], 1)
        };

        let pattern = find_pattern(sub, ignore_case);
        for (i, found) in pattern.find_iter(text).enumerate() {
            if i + 1 == count {
                return Some((char_len(&text[..found.start()]) + skipped) as isize);
            }
        }
        None
    }

    /// Find the `count`-th occurrence of `sub` before the cursor and return
    /// its (negative) offset relative to the cursor, or `None`.
    pub fn find_backwards(
        &self,
        sub: &str,
        in_current_line: bool,
        ignore_case: bool,
        count: usize,
    ) -> Option<isize> {
        let before_cursor: String = if in_current_line {
            self.current_line_before_cursor().chars().rev().collect()
        } else {
            self.text_before_cursor().chars().rev().collect()
        };
        let reversed_sub: String = sub.chars().rev().collect();

        let pattern = find_pattern(&reversed_sub, ignore_case);
        for (i, found) in pattern.find_iter(&before_cursor).enumerate() {
            if i + 1 == count {
                let distance = char_len(&before_cursor[..found.start()]) + char_len(sub);
                return Some(-(distance as isize));
            }
        }
        None
    }

    /// Absolute positions of every occurrence of `sub`.
    pub fn find_all(&self, sub: &str, ignore_case: bool) -> Vec<usize> {
        let pattern = find_pattern(sub, ignore_case);
        pattern
            .find_iter(self.text())
            .map(|found| char_len(&self.text()[..found.start()]))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_left_stops_at_line_start() {
        let document = Document::with_cursor("ab\ncd", 4).unwrap();
        assert_eq!(document.get_cursor_left_position(1), -1);
        assert_eq!(document.get_cursor_left_position(5), -1);

        let at_start = Document::with_cursor("ab\ncd", 3).unwrap();
        assert_eq!(at_start.get_cursor_left_position(2), 0);
    }

    #[test]
    fn test_cursor_right_stops_at_line_end() {
        let document = Document::with_cursor("ab\ncd", 0).unwrap();
        assert_eq!(document.get_cursor_right_position(1), 1);
        assert_eq!(document.get_cursor_right_position(10), 2);
    }

    #[test]
    fn test_cursor_up_and_down() {
        let document = Document::with_cursor("abc\ndef\nghi", 5).unwrap();
        assert_eq!(document.get_cursor_up_position(1, None), -4);
        assert_eq!(document.get_cursor_down_position(1, None), 4);
        // Preferred column wins over the current one.
        assert_eq!(document.get_cursor_up_position(1, Some(2)), -3);
        // Clamped at the first row.
        assert_eq!(document.get_cursor_up_position(5, None), -4);
    }

    #[test]
    fn test_cursor_up_keeps_column_on_short_line() {
        let document = Document::with_cursor("ab\nlonger", 8).unwrap();
        // Column 5 does not exist on the first line, so clip to its end.
        assert_eq!(document.get_cursor_up_position(1, None), -6);
    }

    #[test]
    fn test_start_and_end_of_line() {
        let document = Document::with_cursor("  hello", 5).unwrap();
        assert_eq!(document.get_start_of_line_position(false), -5);
        assert_eq!(document.get_start_of_line_position(true), -3);
        assert_eq!(document.get_end_of_line_position(), 2);
    }

    #[test]
    fn test_column_and_document_positions() {
        let document = Document::with_cursor("abc\ndef", 5).unwrap();
        assert_eq!(document.get_column_cursor_position(0), -1);
        assert_eq!(document.get_column_cursor_position(99), 2);
        assert_eq!(document.get_start_of_document_position(), -5);
        assert_eq!(document.get_end_of_document_position(), 2);
    }

    #[test]
    fn test_paragraph_motions() {
        let text = "first\npara\n\nsecond\npara\n\nthird";
        let document = Document::with_cursor(text, 20).unwrap();
        // Back to the first line of the current paragraph.
        assert_eq!(document.start_of_paragraph(1, false), -8);
        // Including the separator itself.
        assert_eq!(document.start_of_paragraph(1, true), -10);
        // Forward to the blank line ending this paragraph.
        assert_eq!(document.end_of_paragraph(1, false), 3);
        assert_eq!(document.end_of_paragraph(1, true), 5);
    }

    #[test]
    fn test_paragraph_motion_falls_back_to_document_edges() {
        let document = Document::with_cursor("no blank lines here", 5).unwrap();
        assert_eq!(document.start_of_paragraph(1, false), -5);
        assert_eq!(document.end_of_paragraph(1, false), 14);
    }

    #[test]
    fn test_find() {
        let document = Document::with_cursor("abc abc abc", 0).unwrap();
        assert_eq!(document.find("abc", false, false, false, 1), Some(4));
        assert_eq!(document.find("abc", false, false, false, 2), Some(8));
        assert_eq!(document.find("abc", false, true, false, 1), Some(0));
        assert_eq!(document.find("abc", false, false, false, 3), None);
        assert_eq!(document.find("zzz", false, false, false, 1), None);
    }

    #[test]
    fn test_find_in_current_line_only() {
        let document = Document::with_cursor("abc\nxyz", 0).unwrap();
        assert_eq!(document.find("xyz", true, false, false, 1), None);
        assert_eq!(document.find("xyz", false, false, false, 1), Some(4));
    }

    #[test]
    fn test_find_ignore_case() {
        let document = Document::with_cursor("a ABC", 0).unwrap();
        assert_eq!(document.find("abc", false, false, false, 1), None);
        assert_eq!(document.find("abc", false, false, true, 1), Some(2));
    }

    #[test]
    fn test_find_backwards() {
        let document = Document::with_cursor("abc abc abc", 11).unwrap();
        assert_eq!(document.find_backwards("abc", false, false, 1), Some(-3));
        assert_eq!(document.find_backwards("abc", false, false, 2), Some(-7));
        assert_eq!(document.find_backwards("zzz", false, false, 1), None);
    }

    #[test]
    fn test_find_all() {
        let document = Document::with_cursor("ab ab ab", 0).unwrap();
        assert_eq!(document.find_all("ab", false), [0, 3, 6]);
        assert!(document.find_all("zz", false).is_empty());
    }
}
