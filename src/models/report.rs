use serde::{Deserialize, Serialize};

use crate::models::{Book, DiscountEvent, Store};

/// Why a single (book, store) pair produced no price update this run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Fetch,
    InvalidPrice,
    CurrencyMismatch,
}

/// A per-pair failure. The run carries on past these; only storage errors
/// abort it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckFailure {
    pub book: Book,
    pub store: Store,
    pub kind: FailureKind,
    pub reason: String,
}

/// The outcome of one full pass over the catalog. Events and failures keep
/// catalog iteration order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Report {
    pub pairs_checked: usize,
    pub records_updated: usize,
    pub events: Vec<DiscountEvent>,
    pub failures: Vec<CheckFailure>,
}

impl Report {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn has_events(&self) -> bool {
        !self.events.is_empty()
    }
}
