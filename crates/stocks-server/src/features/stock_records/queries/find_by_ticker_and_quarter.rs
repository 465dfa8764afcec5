use serde::Deserialize;
use stocks_ingest::{RecordStore, StockRecord, StoreError};

/// Records for one ticker within one quarter, newest first
#[derive(Debug, Clone, Deserialize)]
pub struct FindStockRecordsByQuarterQuery {
    pub stock: String,
    pub quarter: i32,
}

#[derive(Debug, thiserror::Error)]
pub enum FindStockRecordsByQuarterError {
    #[error("Stock is required")]
    StockRequired,
    #[error("Quarter must be between 1 and 4, got {0}")]
    InvalidQuarter(i32),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl FindStockRecordsByQuarterQuery {
    pub fn validate(&self) -> Result<(), FindStockRecordsByQuarterError> {
        if self.stock.trim().is_empty() {
            return Err(FindStockRecordsByQuarterError::StockRequired);
        }
        if !(1..=4).contains(&self.quarter) {
            return Err(FindStockRecordsByQuarterError::InvalidQuarter(self.quarter));
        }
        Ok(())
    }
}

#[tracing::instrument(skip(store))]
pub async fn handle(
    store: &dyn RecordStore,
    query: FindStockRecordsByQuarterQuery,
) -> Result<Vec<StockRecord>, FindStockRecordsByQuarterError> {
    query.validate()?;
    Ok(store
        .find_by_ticker_and_quarter(&query.stock, query.quarter)
        .await?)
}
