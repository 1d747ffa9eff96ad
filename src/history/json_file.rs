use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use super::PriceRecordStore;
use crate::models::PriceRecord;
use crate::utils::error::{AppError, Result};

/// File-backed store keeping the full history in one pretty-printed JSON
/// array.
///
/// The records live in memory behind a mutex and every `put` rewrites the
/// whole file, going through a sibling temp file plus rename so a crash
/// mid-write never leaves a truncated history behind. Sized for a personal
/// catalog, not for millions of rows.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    records: Mutex<BTreeMap<(String, String), PriceRecord>>,
}

impl JsonFileStore {
    /// Opens the store at `path`, loading any existing history. A missing
    /// file means an empty store; a file that exists but does not parse is
    /// a storage error, not something to silently start over from.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let records = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => {
                let list: Vec<PriceRecord> = serde_json::from_str(&contents).map_err(|e| {
                    AppError::Storage(format!(
                        "history file {} is corrupt: {}",
                        path.display(),
                        e
                    ))
                })?;
                debug!(records = list.len(), path = %path.display(), "Loaded price history");
                list.into_iter().map(|r| (r.key(), r)).collect()
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No history file yet, starting empty");
                BTreeMap::new()
            }
            Err(e) => {
                return Err(AppError::Storage(format!(
                    "cannot read history file {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    /// Rewrites the history file from the in-memory map. Callers hold the
    /// lock, so writes are serialized.
    async fn persist(&self, records: &BTreeMap<(String, String), PriceRecord>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    AppError::Storage(format!(
                        "cannot create history directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let list: Vec<&PriceRecord> = records.values().collect();
        let json = serde_json::to_string_pretty(&list)
            .map_err(|e| AppError::Storage(format!("cannot serialize history: {}", e)))?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, json.as_bytes()).await.map_err(|e| {
            AppError::Storage(format!("cannot write {}: {}", tmp.display(), e))
        })?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(|e| {
            AppError::Storage(format!(
                "cannot move {} into place: {}",
                tmp.display(),
                e
            ))
        })?;

        Ok(())
    }
}

#[async_trait]
impl PriceRecordStore for JsonFileStore {
    async fn get(&self, book_id: &str, store_id: &str) -> Result<Option<PriceRecord>> {
        let records = self.records.lock().await;
        Ok(records
            .get(&(book_id.to_string(), store_id.to_string()))
            .cloned())
    }

    async fn put(&self, record: &PriceRecord) -> Result<()> {
        let mut records = self.records.lock().await;
        records.insert(record.key(), record.clone());
        self.persist(&records).await
    }

    async fn all(&self) -> Result<Vec<PriceRecord>> {
        let records = self.records.lock().await;
        Ok(records.values().cloned().collect())
    }
}
