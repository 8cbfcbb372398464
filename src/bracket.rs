//! Bracket matching over the four pairs `()`, `[]`, `{}` and `<>`.

use crate::document::Document;

const BRACKET_PAIRS: [(char, char); 4] = [('(', ')'), ('[', ']'), ('{', '}'), ('<', '>')];

impl Document {
    fn scan_bracket_right(&self, left: char, right: char, end_pos: Option<usize>) -> Option<isize> {
        let chars: Vec<char> = self.text().chars().collect();
        let end = end_pos.unwrap_or(chars.len()).min(chars.len());
        let mut depth = 1usize;

        for (i, &c) in chars
            .iter()
            .enumerate()
            .take(end)
            .skip(self.cursor_position() + 1)
        {
            if c == left {
                depth += 1;
            } else if c == right {
                depth -= 1;
                if depth == 0 {
                    return Some((i - self.cursor_position()) as isize);
                }
            }
        }
        None
    }

    fn scan_bracket_left(&self, left: char, right: char, start_pos: Option<usize>) -> Option<isize> {
        let chars: Vec<char> = self.text().chars().collect();
        let start = start_pos.unwrap_or(0);
        let mut depth = 1usize;

        for i in (start..self.cursor_position().min(chars.len())).rev() {
            let c = chars[i];
            if c == right {
                depth += 1;
            } else if c == left {
                depth -= 1;
                if depth == 0 {
                    return Some(i as isize - self.cursor_position() as isize);
                }
            }
        }
        None
    }

    /// Relative offset of the bracket matching the one under the cursor.
    /// Scans forward from an opening bracket and backward from a closing
    /// one, keeping a nesting counter. `None` when the cursor is not on a
    /// bracket or the bracket is unbalanced. Optional `start_pos`/`end_pos`
    /// bound the scan.
    pub fn find_matching_bracket_position(
        &self,
        start_pos: Option<usize>,
        end_pos: Option<usize>,
    ) -> Option<isize> {
        let current = self.current_char()?;
        for (left, right) in BRACKET_PAIRS {
            if current == left {
                return self.scan_bracket_right(left, right, end_pos);
            }
            if current == right {
                return self.scan_bracket_left(left, right, start_pos);
            }
        }
        None
    }

    /// Relative offset of the nearest unmatched `left` bracket before the
    /// cursor, which is the one enclosing it. 0 when the cursor sits on
    /// such a bracket already; `None` when the cursor is not inside the
    /// pair.
    pub fn find_enclosing_bracket_left(
        &self,
        left: char,
        right: char,
        start_pos: Option<usize>,
    ) -> Option<isize> {
        if self.current_char() == Some(left) {
            return Some(0);
        }
        self.scan_bracket_left(left, right, start_pos)
    }

    /// Relative offset of the nearest unmatched `right` bracket after the
    /// cursor.
    pub fn find_enclosing_bracket_right(
        &self,
        left: char,
        right: char,
        end_pos: Option<usize>,
    ) -> Option<isize> {
        if self.current_char() == Some(right) {
            return Some(0);
        }
        self.scan_bracket_right(left, right, end_pos)
    }
}
