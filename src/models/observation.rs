use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Book, Store};

/// One freshly fetched price for a (book, store) pair. Created once per
/// successful fetch, never mutated, never persisted directly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceObservation {
    pub book: Book,
    pub store: Store,
    pub price: Decimal,
    pub currency: String,
    pub observed_at: DateTime<Utc>,
}

impl PriceObservation {
    /// Builds an observation timestamped now, quoted in the store's currency.
    pub fn new(book: Book, store: Store, price: Decimal) -> Self {
        let currency = store.currency.clone();
        Self {
            book,
            store,
            price,
            currency,
            observed_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_observation_takes_store_currency() {
        let book = Book::new("9789722040280", "Memorial do Convento");
        let store = Store::new("almedina", "Almedina", "EUR");

        let observation =
            PriceObservation::new(book, store, Decimal::from_str("17.00").unwrap());

        assert_eq!(observation.currency, "EUR");
        assert_eq!(observation.price, Decimal::from_str("17.00").unwrap());
        assert!(observation.observed_at <= Utc::now());
    }
}
