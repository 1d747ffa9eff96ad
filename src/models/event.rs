use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Book, Store};

/// A significant discount detected during a run. Ephemeral: handed to the
/// notifiers and the report, never persisted (the record store keeps the
/// durable state).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiscountEvent {
    pub book: Book,
    pub store: Store,
    pub observed_price: Decimal,
    pub previous_best: Decimal,
    pub currency: String,
    pub drop_fraction: Decimal,
    pub threshold_used: Decimal,
    pub is_new_best: bool,
    pub observed_at: DateTime<Utc>,
}

impl DiscountEvent {
    /// Absolute saving against the previous best price.
    pub fn saving(&self) -> Decimal {
        self.previous_best - self.observed_price
    }

    /// Drop expressed as a percentage, rounded to one decimal place.
    pub fn drop_percent(&self) -> Decimal {
        (self.drop_fraction * Decimal::from(100)).round_dp(1)
    }

    /// One-line rendering shared by the console notifier and the logs.
    pub fn summary(&self) -> String {
        format!(
            "{} @ {}: {} {} (was {} {}, -{}%)",
            self.book.title,
            self.store.name,
            self.observed_price,
            self.currency,
            self.previous_best,
            self.currency,
            self.drop_percent()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn create_test_event() -> DiscountEvent {
        DiscountEvent {
            book: Book::new("9789722040280", "Memorial do Convento"),
            store: Store::new("almedina", "Almedina", "EUR"),
            observed_price: Decimal::from_str("17.00").unwrap(),
            previous_best: Decimal::from_str("20.00").unwrap(),
            currency: "EUR".to_string(),
            drop_fraction: Decimal::from_str("0.15").unwrap(),
            threshold_used: Decimal::from_str("0.10").unwrap(),
            is_new_best: true,
            observed_at: Utc::now(),
        }
    }

    #[test]
    fn test_saving() {
        let event = create_test_event();
        assert_eq!(event.saving(), Decimal::from_str("3.00").unwrap());
    }

    #[test]
    fn test_drop_percent() {
        let event = create_test_event();
        assert_eq!(event.drop_percent(), Decimal::from_str("15.0").unwrap());
    }

    #[test]
    fn test_summary_mentions_both_prices() {
        let event = create_test_event();
        let summary = event.summary();

        assert!(summary.contains("Memorial do Convento"));
        assert!(summary.contains("Almedina"));
        assert!(summary.contains("17.00 EUR"));
        assert!(summary.contains("was 20.00 EUR"));
        assert!(summary.contains("-15.0%"));
    }

    #[test]
    fn test_serialization() {
        let event = create_test_event();

        let serialized = serde_json::to_string(&event).unwrap();
        let deserialized: DiscountEvent = serde_json::from_str(&serialized).unwrap();

        assert_eq!(event, deserialized);
    }
}
