//! The value exchanged between cut and paste.

use crate::selection::SelectionType;

/// Text captured by a cut or copy, together with the selection shape it was
/// captured with, so a later paste knows whether to treat it as character,
/// line, or block data. Carries no reference back to its source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardData {
    pub text: String,
    pub data_type: SelectionType,
}

impl ClipboardData {
    pub fn new(text: impl Into<String>, data_type: SelectionType) -> Self {
        Self {
            text: text.into(),
            data_type,
        }
    }
}

impl Default for ClipboardData {
    fn default() -> Self {
        Self::new(String::new(), SelectionType::Characters)
    }
}
