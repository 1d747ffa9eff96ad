use serde::{Deserialize, Serialize};

/// A tracked book. The ISBN is the identifier used for store searches and
/// record keys; the title is only for display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Book {
    pub isbn: String,
    pub title: String,
}

impl Book {
    pub fn new(isbn: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            isbn: isbn.into(),
            title: title.into(),
        }
    }
}
