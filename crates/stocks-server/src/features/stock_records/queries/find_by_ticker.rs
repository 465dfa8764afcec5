use serde::Deserialize;
use stocks_ingest::{RecordStore, StockRecord, StoreError};

/// All records for one ticker
#[derive(Debug, Clone, Deserialize)]
pub struct FindStockRecordsQuery {
    /// Exact, case-sensitive ticker symbol
    pub stock: String,
}

#[derive(Debug, thiserror::Error)]
pub enum FindStockRecordsError {
    #[error("Stock is required")]
    StockRequired,
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl FindStockRecordsQuery {
    pub fn validate(&self) -> Result<(), FindStockRecordsError> {
        if self.stock.trim().is_empty() {
            return Err(FindStockRecordsError::StockRequired);
        }
        Ok(())
    }
}

#[tracing::instrument(skip(store))]
pub async fn handle(
    store: &dyn RecordStore,
    query: FindStockRecordsQuery,
) -> Result<Vec<StockRecord>, FindStockRecordsError> {
    query.validate()?;
    let records = store.find_by_ticker(&query.stock).await?;
    tracing::debug!(found = records.len(), "Looked up stock records");
    Ok(records)
}
