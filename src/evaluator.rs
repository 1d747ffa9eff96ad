use rust_decimal::Decimal;

use crate::models::{DiscountEvent, PriceObservation, PriceRecord};
use crate::utils::error::{AppError, Result};

/// What one evaluation produced: the record to persist and, when the drop
/// was deep enough, the event to announce.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationResult {
    pub record: PriceRecord,
    pub event: Option<DiscountEvent>,
}

/// Pure price-drop detection against the best price seen so far.
///
/// The evaluator never touches storage. It takes one observation and the
/// prior record for the same (book, store) pair, and returns the updated
/// record plus an optional [`DiscountEvent`]; callers decide what to do
/// with both.
#[derive(Debug, Clone)]
pub struct DiscountEvaluator {
    threshold: Decimal,
}

impl DiscountEvaluator {
    /// `threshold` is a fraction of the previous best price: `0.10` means a
    /// new price must undercut the best by at least 10% to raise an event.
    /// Must lie in (0, 1].
    pub fn new(threshold: Decimal) -> Result<Self> {
        if threshold <= Decimal::ZERO || threshold > Decimal::ONE {
            return Err(AppError::Validation(format!(
                "discount threshold must be in (0, 1], got {}",
                threshold
            )));
        }
        Ok(Self { threshold })
    }

    pub fn threshold(&self) -> Decimal {
        self.threshold
    }

    /// Folds one observation into the pair's record.
    ///
    /// A non-positive price is rejected before the prior is even looked at,
    /// and a currency change rejects the observation without touching the
    /// record. On success the returned record always carries the
    /// observation's timestamp as `last_checked_at`; `best_price` only moves
    /// down, and only a drop of at least the threshold raises an event.
    pub fn evaluate(
        &self,
        observation: &PriceObservation,
        prior: Option<&PriceRecord>,
    ) -> Result<EvaluationResult> {
        if observation.price <= Decimal::ZERO {
            return Err(AppError::InvalidPrice(format!(
                "'{}' at '{}': {} is not a positive price",
                observation.book.isbn, observation.store.id, observation.price
            )));
        }

        let Some(prior) = prior else {
            // First sighting of this pair. There is nothing to compare
            // against, so no price is a "drop" yet.
            return Ok(EvaluationResult {
                record: PriceRecord::from_observation(observation),
                event: None,
            });
        };

        if prior.currency != observation.currency {
            return Err(AppError::CurrencyMismatch {
                stored: prior.currency.clone(),
                observed: observation.currency.clone(),
            });
        }

        let mut record = prior.clone();
        record.last_checked_at = observation.observed_at;

        if observation.price >= prior.best_price {
            // Same price or worse: only the check timestamp advances.
            return Ok(EvaluationResult {
                record,
                event: None,
            });
        }

        let drop_fraction = (prior.best_price - observation.price) / prior.best_price;

        record.best_price = observation.price;
        record.best_price_at = observation.observed_at;

        let event = if drop_fraction >= self.threshold {
            Some(DiscountEvent {
                book: observation.book.clone(),
                store: observation.store.clone(),
                observed_price: observation.price,
                previous_best: prior.best_price,
                currency: observation.currency.clone(),
                drop_fraction,
                threshold_used: self.threshold,
                is_new_best: true,
                observed_at: observation.observed_at,
            })
        } else {
            // Shallow drop: remember the better price, stay quiet.
            None
        };

        Ok(EvaluationResult { record, event })
    }
}
