pub mod json_file;
pub mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

use std::sync::Arc;

use async_trait::async_trait;

use crate::models::PriceRecord;
use crate::utils::error::Result;

/// Durable best-price state, keyed by (book, store).
///
/// This is the whole persistence contract; the tracker composes these three
/// calls into read-evaluate-write per catalog pair. A missing record is not
/// an error, it just means the pair has never been checked.
#[async_trait]
pub trait PriceRecordStore: Send + Sync {
    /// Looks up the record for one pair.
    async fn get(&self, book_id: &str, store_id: &str) -> Result<Option<PriceRecord>>;

    /// Inserts or replaces the record for the pair in `record.key()`.
    async fn put(&self, record: &PriceRecord) -> Result<()>;

    /// Every stored record, ordered by (book_id, store_id).
    async fn all(&self) -> Result<Vec<PriceRecord>>;
}

// Lets callers share one store between the tracker and other consumers.
#[async_trait]
impl<T: PriceRecordStore + ?Sized> PriceRecordStore for Arc<T> {
    async fn get(&self, book_id: &str, store_id: &str) -> Result<Option<PriceRecord>> {
        (**self).get(book_id, store_id).await
    }

    async fn put(&self, record: &PriceRecord) -> Result<()> {
        (**self).put(record).await
    }

    async fn all(&self) -> Result<Vec<PriceRecord>> {
        (**self).all().await
    }
}
