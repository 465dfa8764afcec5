use stocks_ingest::schema::check_record;
use stocks_ingest::{RecordStore, StockRecord, StoreError};

/// Add one record supplied as JSON
#[derive(Debug, Clone)]
pub struct CreateStockRecordCommand {
    pub record: StockRecord,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateStockRecordError {
    #[error("Stock cannot be blank")]
    StockBlank,
    #[error("Invalid value for '{column}': {message}")]
    Invalid {
        column: &'static str,
        message: String,
    },
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl CreateStockRecordCommand {
    pub fn validate(&self) -> Result<(), CreateStockRecordError> {
        if self.record.ticker.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(CreateStockRecordError::StockBlank);
        }
        check_record(&self.record).map_err(|v| CreateStockRecordError::Invalid {
            column: v.column,
            message: v.message,
        })
    }
}

#[tracing::instrument(skip(store, command), fields(stock = ?command.record.ticker))]
pub async fn handle(
    store: &dyn RecordStore,
    command: CreateStockRecordCommand,
) -> Result<StockRecord, CreateStockRecordError> {
    command.validate()?;
    let mut record = command.record;
    record.id = None;
    Ok(store.save(record).await?)
}
