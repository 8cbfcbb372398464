//! Lazily computed per-text derived views.
//!
//! Splitting a document into lines and building the line-start offset table
//! is the expensive part of most queries, and a live session creates a new
//! Document snapshot on every cursor move. Snapshots built from the same
//! text object carry the same `Arc<DocumentCache>` handle, so the split
//! happens once per distinct text rather than once per snapshot.

use once_cell::sync::OnceCell;

/// Memoized line data for one text object.
///
/// Both views are computed on first access. `OnceCell` publishes the
/// finished result safely when two threads race on the first computation;
/// the computation itself is idempotent, so the race is benign.
#[derive(Debug, Default)]
pub struct DocumentCache {
    lines: OnceCell<Vec<String>>,
    line_start_indexes: OnceCell<Vec<usize>>,
}

impl DocumentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The text split on `\n`, the way a naive split does it: a trailing
    /// newline yields a trailing empty line, and empty text is one empty
    /// line.
    pub fn lines(&self, text: &str) -> &[String] {
        self.lines
            .get_or_init(|| text.split('\n').map(str::to_string).collect())
    }

    /// Character offset of the start of each line. Strictly increasing,
    /// starts at 0. Enables O(log n) offset to (row, column) translation
    /// through binary search.
    pub fn line_start_indexes(&self, text: &str) -> &[usize] {
        self.line_start_indexes.get_or_init(|| {
            let lines = self.lines(text);
            let mut indexes = Vec::with_capacity(lines.len());
            let mut position = 0;
            for line in lines {
                indexes.push(position);
                position += line.chars().count() + 1;
            }
            indexes
        })
    }
}
