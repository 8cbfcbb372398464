//! Word and WORD navigation.
//!
//! A "word" is a maximal run of `[A-Za-z0-9_]`; a "WORD" follows the vi
//! convention of a maximal run of non-whitespace. Both are plain stateless
//! patterns, injected as defaults and overridable per call through the
//! `_with_pattern` variants so callers can redefine what a word is for
//! special syntaxes.
//!
//! Backward scans run the pattern over the reversed prefix. That only works
//! because both default patterns are single character classes and therefore
//! read the same in either direction; custom patterns must hold the same
//! property.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::document::{byte_offset, char_len, Document};

/// Maximal run of alphanumerics and underscores.
pub static FIND_WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-zA-Z0-9_]+").expect("word pattern"));

/// Maximal run of non-whitespace.
pub static FIND_BIG_WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\s]+").expect("WORD pattern"));

fn default_pattern(big_word: bool) -> &'static Regex {
    if big_word {
        &FIND_BIG_WORD_RE
    } else {
        &FIND_WORD_RE
    }
}

impl Document {
    /// Relative offset of the start of the `count`-th word after the
    /// cursor, or `None` before a text boundary. A zero count is a no-op.
    pub fn find_next_word_beginning(&self, count: usize, big_word: bool) -> Option<isize> {
        self.find_next_word_beginning_with(default_pattern(big_word), count)
    }

    pub fn find_next_word_beginning_with(&self, pattern: &Regex, count: usize) -> Option<isize> {
        if count == 0 {
            return None;
        }
        let text = self.text_after_cursor();
        let mut count = count;
        for (i, found) in pattern.find_iter(text).enumerate() {
            // The word the cursor is already on does not count.
            if i == 0 && found.start() == 0 {
                count += 1;
            }
            if i + 1 == count {
                return Some(char_len(&text[..found.start()]) as isize);
            }
        }
        None
    }

    /// Relative offset of the end of the `count`-th word after the cursor.
    /// With `include_current_position` the end of the word under the cursor
    /// counts as well.
    pub fn find_next_word_ending(
        &self,
        include_current_position: bool,
        count: usize,
        big_word: bool,
    ) -> Option<isize> {
        self.find_next_word_ending_with(default_pattern(big_word), include_current_position, count)
    }

    pub fn find_next_word_ending_with(
        &self,
        pattern: &Regex,
        include_current_position: bool,
        count: usize,
    ) -> Option<isize> {
        if count == 0 {
            return None;
        }
        let after_cursor = self.text_after_cursor();
        // Drop the character under the cursor, otherwise a cursor already
        // on a word ending would match in place.
        let (text, skipped) = if include_current_position {
            (after_cursor, 0)
        } else {
            if after_cursor.is_empty() {
                return None;
            }
            (&after_cursor[byte_offset(after_cursor, 1)..], 1)
        };

        for (i, found) in pattern.find_iter(text).enumerate() {
            if i + 1 == count {
                return Some((char_len(&text[..found.end()]) + skipped) as isize);
            }
        }
        None
    }

    /// Negative relative offset of the start of the `count`-th word before
    /// the cursor. A cursor inside a word finds that word's own start
    /// first.
    pub fn find_previous_word_beginning(&self, count: usize, big_word: bool) -> Option<isize> {
        self.find_previous_word_beginning_with(default_pattern(big_word), count)
    }

    pub fn find_previous_word_beginning_with(
        &self,
        pattern: &Regex,
        count: usize,
    ) -> Option<isize> {
        if count == 0 {
            return None;
        }
        let reversed: String = self.text_before_cursor().chars().rev().collect();
        for (i, found) in pattern.find_iter(&reversed).enumerate() {
            if i + 1 == count {
                return Some(-(char_len(&reversed[..found.end()]) as isize));
            }
        }
        None
    }

    /// Negative relative offset of the end of the `count`-th word before
    /// the cursor.
    pub fn find_previous_word_ending(&self, count: usize, big_word: bool) -> Option<isize> {
        self.find_previous_word_ending_with(default_pattern(big_word), count)
    }

    pub fn find_previous_word_ending_with(&self, pattern: &Regex, count: usize) -> Option<isize> {
        if count == 0 {
            return None;
        }
        // One character after the cursor, then the reversed prefix, so a
        // word ending exactly at the cursor is visible to the scan.
        let mut text = String::new();
        text.extend(self.text_after_cursor().chars().take(1));
        text.extend(self.text_before_cursor().chars().rev());

        let mut count = count;
        for (i, found) in pattern.find_iter(&text).enumerate() {
            // The word the cursor is on does not count.
            if i == 0 && found.start() == 0 {
                count += 1;
            }
            if i + 1 == count {
                return Some(-(char_len(&text[..found.start()]) as isize) + 1);
            }
        }
        None
    }

    /// The word fragment directly left of the cursor, empty when the
    /// cursor follows whitespace.
    pub fn get_word_before_cursor(&self, big_word: bool) -> &str {
        let before = self.text_before_cursor();
        match before.chars().next_back() {
            None => return "",
            Some(c) if c.is_whitespace() => return "",
            Some(_) => {}
        }
        let start = self.find_previous_word_beginning(1, big_word).unwrap_or(0);
        let from = (char_len(before) as isize + start) as usize;
        &before[byte_offset(before, from)..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_next_word_beginning() {
        let document = Document::with_cursor("one two three", 0).unwrap();
        assert_eq!(document.find_next_word_beginning(1, false), Some(4));
        assert_eq!(document.find_next_word_beginning(2, false), Some(8));
        assert_eq!(document.find_next_word_beginning(3, false), None);
    }

    #[test]
    fn test_find_next_word_beginning_from_whitespace() {
        let document = Document::with_cursor("one two", 3).unwrap();
        // Not on a word, so the very next word counts as the first.
        assert_eq!(document.find_next_word_beginning(1, false), Some(1));
    }

    #[test]
    fn test_zero_count_is_a_no_op() {
        let document = Document::with_cursor("one two", 0).unwrap();
        assert_eq!(document.find_next_word_beginning(0, false), None);
        assert_eq!(document.find_next_word_ending(false, 0, false), None);
        assert_eq!(document.find_previous_word_beginning(0, false), None);
        assert_eq!(document.find_previous_word_ending(0, false), None);
    }

    #[test]
    fn test_word_versus_big_word() {
        let document = Document::with_cursor("foo.bar baz", 0).unwrap();
        // The dot separates words but not WORDs.
        assert_eq!(document.find_next_word_beginning(1, false), Some(4));
        assert_eq!(document.find_next_word_beginning(1, true), Some(8));
    }

    #[test]
    fn test_find_next_word_ending() {
        let document = Document::with_cursor("one two three", 0).unwrap();
        assert_eq!(document.find_next_word_ending(false, 1, false), Some(3));
        assert_eq!(document.find_next_word_ending(false, 2, false), Some(7));
        assert_eq!(document.find_next_word_ending(true, 1, false), Some(3));

        let at_ending = Document::with_cursor("one two", 2).unwrap();
        // Cursor on the last char of "one": without the current position
        // the scan reaches the next word.
        assert_eq!(at_ending.find_next_word_ending(false, 1, false), Some(5));
        assert_eq!(at_ending.find_next_word_ending(true, 1, false), Some(1));
    }

    #[test]
    fn test_find_previous_word_beginning() {
        let document = Document::with_cursor("one two three", 13).unwrap();
        assert_eq!(document.find_previous_word_beginning(1, false), Some(-5));
        assert_eq!(document.find_previous_word_beginning(2, false), Some(-9));
        assert_eq!(document.find_previous_word_beginning(3, false), Some(-13));
        assert_eq!(document.find_previous_word_beginning(4, false), None);
    }

    #[test]
    fn test_find_previous_word_beginning_mid_word() {
        let document = Document::with_cursor("one two", 6).unwrap();
        // Inside "two": its own start comes first.
        assert_eq!(document.find_previous_word_beginning(1, false), Some(-2));
        assert_eq!(document.find_previous_word_beginning(2, false), Some(-6));
    }

    #[test]
    fn test_find_previous_word_ending() {
        let document = Document::with_cursor("one two three", 8).unwrap();
        // Cursor at the start of "three"; previous ending is after "two".
        assert_eq!(document.find_previous_word_ending(1, false), Some(-1));
        assert_eq!(document.find_previous_word_ending(2, false), Some(-5));
        assert_eq!(document.find_previous_word_ending(3, false), None);
    }

    #[test]
    fn test_boundaries_return_none() {
        let at_end = Document::with_text("one two");
        assert_eq!(at_end.find_next_word_beginning(1, false), None);
        assert_eq!(at_end.find_next_word_ending(false, 1, false), None);

        let at_start = Document::with_cursor("one two", 0).unwrap();
        assert_eq!(at_start.find_previous_word_beginning(1, false), None);
        assert_eq!(at_start.find_previous_word_ending(1, false), None);
    }

    #[test]
    fn test_custom_pattern() {
        let hyphenated = Regex::new(r"[a-z-]+").unwrap();
        let document = Document::with_cursor("x foo-bar baz", 0).unwrap();
        assert_eq!(
            document.find_next_word_beginning_with(&hyphenated, 1),
            Some(2)
        );
        assert_eq!(
            document.find_next_word_ending_with(&hyphenated, false, 1),
            Some(9)
        );
    }

    #[test]
    fn test_get_word_before_cursor() {
        let document = Document::with_cursor("echo hel", 8).unwrap();
        assert_eq!(document.get_word_before_cursor(false), "hel");

        let after_space = Document::with_cursor("echo ", 5).unwrap();
        assert_eq!(after_space.get_word_before_cursor(false), "");

        let empty = Document::new();
        assert_eq!(empty.get_word_before_cursor(false), "");
    }

    #[test]
    fn test_get_word_before_cursor_big_word() {
        let document = Document::with_cursor("run a/b.c", 9).unwrap();
        assert_eq!(document.get_word_before_cursor(false), "c");
        assert_eq!(document.get_word_before_cursor(true), "a/b.c");
    }
}
