//! In-memory record store

use super::{RecordStore, StoreError};
use crate::model::StockRecord;
use crate::schema::check_record;
use async_trait::async_trait;
use std::cmp::Ordering;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Inner {
    next_id: i64,
    records: Vec<StockRecord>,
}

/// Process-local [`RecordStore`]
///
/// Enforces the same column limits as the PostgreSQL table so that a batch
/// refused there is refused here too. Identifiers start at 1 and are never
/// reused, even after deletes.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    inner: RwLock<Inner>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored record in id order
    pub async fn all(&self) -> Vec<StockRecord> {
        self.inner.read().await.records.clone()
    }
}

/// Date descending with undated records last, then id ascending
fn newest_first(a: &StockRecord, b: &StockRecord) -> Ordering {
    match (a.date, b.date) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.id.cmp(&b.id))
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn save_all(&self, records: Vec<StockRecord>) -> Result<Vec<StockRecord>, StoreError> {
        for record in &records {
            check_record(record)?;
        }

        let mut inner = self.inner.write().await;
        let mut saved = Vec::with_capacity(records.len());
        for mut record in records {
            inner.next_id += 1;
            record.id = Some(inner.next_id);
            inner.records.push(record.clone());
            saved.push(record);
        }

        tracing::trace!(count = saved.len(), total = inner.records.len(), "Saved batch");
        Ok(saved)
    }

    async fn find_by_ticker(&self, ticker: &str) -> Result<Vec<StockRecord>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .records
            .iter()
            .filter(|r| r.ticker.as_deref() == Some(ticker))
            .cloned()
            .collect())
    }

    async fn find_by_ticker_and_quarter(
        &self,
        ticker: &str,
        quarter: i32,
    ) -> Result<Vec<StockRecord>, StoreError> {
        let inner = self.inner.read().await;
        let mut found: Vec<StockRecord> = inner
            .records
            .iter()
            .filter(|r| r.ticker.as_deref() == Some(ticker) && r.quarter == Some(quarter))
            .cloned()
            .collect();
        found.sort_by(newest_first);
        Ok(found)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.inner.read().await.records.len() as u64)
    }

    async fn delete_all(&self) -> Result<u64, StoreError> {
        let mut inner = self.inner.write().await;
        let removed = inner.records.len() as u64;
        inner.records.clear();
        Ok(removed)
    }

    async fn delete_by_ticker(&self, ticker: &str) -> Result<Vec<StockRecord>, StoreError> {
        let mut inner = self.inner.write().await;
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut inner.records)
            .into_iter()
            .partition(|r| r.ticker.as_deref() == Some(ticker));
        inner.records = kept;
        Ok(removed)
    }
}
