use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One corpus row that survived empty-text filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Position in the surviving-corpus ordering. Aligned with index row ids.
    pub row_id: usize,
    /// Row number in the source file (0-based, header excluded).
    pub source_row: usize,
    /// The field that gets embedded.
    pub text: String,
    /// Every other column of the row.
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl Document {
    pub fn new(row_id: usize, text: impl Into<String>) -> Self {
        Self {
            row_id,
            source_row: row_id,
            text: text.into(),
            metadata: BTreeMap::new(),
        }
    }

    /// True when the text field is missing or whitespace only.
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }
}
