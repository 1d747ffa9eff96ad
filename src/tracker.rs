use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::{pin_mut, stream, StreamExt};
use rust_decimal::Decimal;
use tokio_retry::strategy::FixedInterval;
use tokio_retry::Retry;
use tracing::{info, warn};

use crate::evaluator::DiscountEvaluator;
use crate::history::PriceRecordStore;
use crate::models::{
    Book, CheckFailure, CheckTarget, FailureKind, PriceObservation, Report,
};
use crate::sources::PriceSource;
use crate::utils::error::{AppError, Result};

const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 4;
const DEFAULT_RETRY_ATTEMPTS: usize = 2;
const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);

/// Orchestrates one full pass over the catalog.
///
/// Per pair: fetch the current price from the store's source, evaluate it
/// against the persisted record, persist the updated record, collect any
/// event. Pair failures are absorbed into the report; only storage errors
/// abort the run (pairs persisted before the abort stay persisted).
pub struct PriceTracker<S: PriceRecordStore> {
    records: S,
    sources: HashMap<String, Arc<dyn PriceSource>>,
    evaluator: DiscountEvaluator,
    max_concurrent_fetches: usize,
    retry_attempts: usize,
    retry_delay: Duration,
}

impl<S: PriceRecordStore> PriceTracker<S> {
    pub fn new(
        records: S,
        sources: HashMap<String, Arc<dyn PriceSource>>,
        evaluator: DiscountEvaluator,
    ) -> Self {
        Self {
            records,
            sources,
            evaluator,
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    pub fn with_max_concurrent_fetches(mut self, n: usize) -> Self {
        self.max_concurrent_fetches = n.max(1);
        self
    }

    /// `attempts` extra tries after the first failed fetch, `delay` apart.
    pub fn with_fetch_retries(mut self, attempts: usize, delay: Duration) -> Self {
        self.retry_attempts = attempts;
        self.retry_delay = delay;
        self
    }

    /// Checks every pair in `catalog` and aggregates the outcome.
    ///
    /// Fetches run concurrently through an order-preserving buffered
    /// stream; evaluation and store writes happen sequentially as fetches
    /// complete, so store access is serialized and the report keeps
    /// catalog order.
    pub async fn run(&self, catalog: &[CheckTarget]) -> Result<Report> {
        let started = Instant::now();
        info!(
            pairs = catalog.len(),
            threshold = %self.evaluator.threshold(),
            "Starting price check"
        );

        let mut report = Report {
            pairs_checked: catalog.len(),
            ..Report::default()
        };

        let fetches = stream::iter(catalog.iter().map(|target| {
            let source = self.sources.get(&target.store.id).cloned();
            async move {
                let outcome = match source {
                    Some(source) => self.fetch_with_retries(source.as_ref(), &target.book).await,
                    None => Err(AppError::fetch(
                        &target.store.id,
                        "no source registered for store",
                    )),
                };
                (target, outcome)
            }
        }))
        .buffered(self.max_concurrent_fetches);
        pin_mut!(fetches);

        while let Some((target, outcome)) = fetches.next().await {
            let price = match outcome {
                Ok(price) => price,
                Err(e) => {
                    warn!(
                        book = %target.book.isbn,
                        store = %target.store.id,
                        error = %e,
                        "Fetch failed"
                    );
                    report.failures.push(Self::classify_failure(target, e));
                    continue;
                }
            };

            let observation =
                PriceObservation::new(target.book.clone(), target.store.clone(), price);
            let prior = self
                .records
                .get(&target.book.isbn, &target.store.id)
                .await?;

            match self.evaluator.evaluate(&observation, prior.as_ref()) {
                Ok(result) => {
                    let best_changed = prior
                        .as_ref()
                        .is_none_or(|p| result.record.best_price < p.best_price);
                    self.records.put(&result.record).await?;
                    if best_changed {
                        report.records_updated += 1;
                    }
                    if let Some(event) = result.event {
                        info!(
                            book = %event.book.title,
                            store = %event.store.id,
                            price = %event.observed_price,
                            was = %event.previous_best,
                            drop = %event.drop_percent(),
                            "Discount found"
                        );
                        report.events.push(event);
                    }
                }
                Err(e) if e.is_pair_failure() => {
                    warn!(
                        book = %target.book.isbn,
                        store = %target.store.id,
                        error = %e,
                        "Observation rejected"
                    );
                    report.failures.push(Self::classify_failure(target, e));
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            events = report.events.len(),
            failures = report.failures.len(),
            updated = report.records_updated,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Price check complete"
        );

        Ok(report)
    }

    async fn fetch_with_retries(&self, source: &dyn PriceSource, book: &Book) -> Result<Decimal> {
        let strategy =
            FixedInterval::new(self.retry_delay).take(self.retry_attempts);
        Retry::spawn(strategy, || source.fetch_price(book)).await
    }

    fn classify_failure(target: &CheckTarget, error: AppError) -> CheckFailure {
        let kind = match &error {
            AppError::InvalidPrice(_) => FailureKind::InvalidPrice,
            AppError::CurrencyMismatch { .. } => FailureKind::CurrencyMismatch,
            _ => FailureKind::Fetch,
        };
        CheckFailure {
            book: target.book.clone(),
            store: target.store.clone(),
            kind,
            reason: error.to_string(),
        }
    }
}
