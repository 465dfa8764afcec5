use serde::{Deserialize, Serialize};
use stocks_ingest::{RecordStore, StoreError};

#[derive(Debug, Clone, Deserialize)]
pub struct DeleteStockRecordsCommand {
    pub stock: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteStockRecordsResponse {
    pub stock: String,
    pub deleted: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteStockRecordsError {
    #[error("Stock is required")]
    StockRequired,
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl DeleteStockRecordsCommand {
    pub fn validate(&self) -> Result<(), DeleteStockRecordsError> {
        if self.stock.trim().is_empty() {
            return Err(DeleteStockRecordsError::StockRequired);
        }
        Ok(())
    }
}

/// Remove every record of one ticker
///
/// An unknown ticker is not an error; the response reports zero deletions.
#[tracing::instrument(skip(store))]
pub async fn handle(
    store: &dyn RecordStore,
    command: DeleteStockRecordsCommand,
) -> Result<DeleteStockRecordsResponse, DeleteStockRecordsError> {
    command.validate()?;

    let removed = store.delete_by_ticker(&command.stock).await?;
    let deleted = removed.len() as u64;
    tracing::info!(stock = %command.stock, deleted, "Deleted stock records");

    Ok(DeleteStockRecordsResponse {
        stock: command.stock,
        deleted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use stocks_ingest::{MemoryRecordStore, StockRecord};

    fn record(ticker: &str) -> StockRecord {
        StockRecord {
            ticker: Some(ticker.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_validation_blank_stock() {
        let cmd = DeleteStockRecordsCommand {
            stock: " ".to_string(),
        };
        assert!(matches!(
            cmd.validate(),
            Err(DeleteStockRecordsError::StockRequired)
        ));
    }

    #[tokio::test]
    async fn test_handle_deletes_only_matching_ticker() {
        let store = MemoryRecordStore::new();
        store
            .save_all(vec![record("AA"), record("AA"), record("KO")])
            .await
            .unwrap();

        let cmd = DeleteStockRecordsCommand {
            stock: "AA".to_string(),
        };
        let response = handle(&store, cmd).await.unwrap();

        assert_eq!(response.stock, "AA");
        assert_eq!(response.deleted, 2);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_handle_unknown_ticker() {
        let store = MemoryRecordStore::new();
        let cmd = DeleteStockRecordsCommand {
            stock: "ZZZ".to_string(),
        };
        assert_eq!(handle(&store, cmd).await.unwrap().deleted, 0);
    }
}
