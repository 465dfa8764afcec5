use serde::{Deserialize, Serialize};
use stocks_ingest::{RecordStore, StoreError};

#[derive(Debug, Clone, Default)]
pub struct CountStockRecordsQuery;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountStockRecordsResponse {
    pub count: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum CountStockRecordsError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

#[tracing::instrument(skip(store))]
pub async fn handle(
    store: &dyn RecordStore,
    _query: CountStockRecordsQuery,
) -> Result<CountStockRecordsResponse, CountStockRecordsError> {
    let count = store.count().await?;
    Ok(CountStockRecordsResponse { count })
}

#[cfg(test)]
mod tests {
    use super::*;
    use stocks_ingest::{MemoryRecordStore, StockRecord};

    #[tokio::test]
    async fn test_handle_counts_records() {
        let store = MemoryRecordStore::new();
        assert_eq!(handle(&store, CountStockRecordsQuery).await.unwrap().count, 0);

        store.save(StockRecord::default()).await.unwrap();
        assert_eq!(handle(&store, CountStockRecordsQuery).await.unwrap().count, 1);
    }
}
