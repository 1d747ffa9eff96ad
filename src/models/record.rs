use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::PriceObservation;

/// The persisted best-price record for one (book, store) pair.
///
/// `best_price` is the minimum of every price ever observed for the pair:
/// it only decreases or stays equal, and `best_price_at` moves only when a
/// new minimum is set. `last_checked_at` advances on every successful check,
/// including the ones that change nothing else.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceRecord {
    pub book_id: String,
    pub store_id: String,
    pub currency: String,
    pub best_price: Decimal,
    pub best_price_at: DateTime<Utc>,
    pub last_checked_at: DateTime<Utc>,
}

impl PriceRecord {
    /// Creates the first record for a pair from its first valid observation.
    pub fn from_observation(observation: &PriceObservation) -> Self {
        Self {
            book_id: observation.book.isbn.clone(),
            store_id: observation.store.id.clone(),
            currency: observation.currency.clone(),
            best_price: observation.price,
            best_price_at: observation.observed_at,
            last_checked_at: observation.observed_at,
        }
    }

    /// The upsert key: record identity is the (book, store) pair.
    pub fn key(&self) -> (String, String) {
        (self.book_id.clone(), self.store_id.clone())
    }
}
