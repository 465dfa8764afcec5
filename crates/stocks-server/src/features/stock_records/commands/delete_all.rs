use serde::{Deserialize, Serialize};
use stocks_ingest::{RecordStore, StoreError};

#[derive(Debug, Clone, Default)]
pub struct DeleteAllStockRecordsCommand;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteAllStockRecordsResponse {
    pub deleted: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteAllStockRecordsError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

#[tracing::instrument(skip(store))]
pub async fn handle(
    store: &dyn RecordStore,
    _command: DeleteAllStockRecordsCommand,
) -> Result<DeleteAllStockRecordsResponse, DeleteAllStockRecordsError> {
    let deleted = store.delete_all().await?;
    tracing::warn!(deleted, "Deleted all stock records");
    Ok(DeleteAllStockRecordsResponse { deleted })
}
