use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::PriceRecordStore;
use crate::models::PriceRecord;
use crate::utils::error::Result;

/// In-memory store with the same contract as [`super::JsonFileStore`].
/// Nothing survives the process; meant for tests and embedding.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<BTreeMap<(String, String), PriceRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PriceRecordStore for MemoryStore {
    async fn get(&self, book_id: &str, store_id: &str) -> Result<Option<PriceRecord>> {
        let records = self.records.lock().await;
        Ok(records
            .get(&(book_id.to_string(), store_id.to_string()))
            .cloned())
    }

    async fn put(&self, record: &PriceRecord) -> Result<()> {
        let mut records = self.records.lock().await;
        records.insert(record.key(), record.clone());
        Ok(())
    }

    async fn all(&self) -> Result<Vec<PriceRecord>> {
        let records = self.records.lock().await;
        Ok(records.values().cloned().collect())
    }
}
