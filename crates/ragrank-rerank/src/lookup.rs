//! Resolving candidate row ids back to document text.

use std::collections::HashMap;

use ragrank_core::models::Document;

/// `row_id -> text`. `None` means the row is unknown to the caller.
pub trait DocumentLookup: Sync {
    fn document_text(&self, row_id: usize) -> Option<&str>;
}

/// Documents indexed by position, as persisted with an index.
impl DocumentLookup for [Document] {
    fn document_text(&self, row_id: usize) -> Option<&str> {
        self.get(row_id).map(|d| d.text.as_str())
    }
}

impl DocumentLookup for Vec<Document> {
    fn document_text(&self, row_id: usize) -> Option<&str> {
        self.as_slice().document_text(row_id)
    }
}

impl DocumentLookup for [String] {
    fn document_text(&self, row_id: usize) -> Option<&str> {
        self.get(row_id).map(String::as_str)
    }
}

impl DocumentLookup for Vec<String> {
    fn document_text(&self, row_id: usize) -> Option<&str> {
        self.as_slice().document_text(row_id)
    }
}

impl DocumentLookup for HashMap<usize, String> {
    fn document_text(&self, row_id: usize) -> Option<&str> {
        self.get(&row_id).map(String::as_str)
    }
}
