use serde::{Deserialize, Serialize};

use crate::models::{Book, Store};

/// One (book, store) pair scheduled for a check. The catalog is the
/// cross product of configured books and enabled stores.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckTarget {
    pub book: Book,
    pub store: Store,
}

impl CheckTarget {
    pub fn new(book: Book, store: Store) -> Self {
        Self { book, store }
    }
}
