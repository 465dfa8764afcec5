//! Persistence for stock records
//!
//! [`RecordStore`] is the only seam between ingestion and storage. The
//! in-memory store backs tests and the CLI; the PostgreSQL store is available
//! with the `database` feature.

use crate::model::StockRecord;
use crate::schema::Violation;
use async_trait::async_trait;
use thiserror::Error;

pub mod memory;
#[cfg(feature = "database")]
pub mod postgres;

/// Errors raised by a [`RecordStore`]
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Constraint violation on column '{column}': {message}")]
    Constraint { column: &'static str, message: String },

    #[cfg(feature = "database")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<Violation> for StoreError {
    fn from(violation: Violation) -> Self {
        StoreError::Constraint {
            column: violation.column,
            message: violation.message,
        }
    }
}

/// Durable collection of [`StockRecord`]s
///
/// Records come back from the store with `id` assigned. Ticker lookups are
/// exact and case-sensitive.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Persist a batch, returning the stored records in input order
    ///
    /// A batch is all-or-nothing: when any record is refused, none of the
    /// batch is stored.
    async fn save_all(&self, records: Vec<StockRecord>) -> Result<Vec<StockRecord>, StoreError>;

    /// Persist one record
    async fn save(&self, record: StockRecord) -> Result<StockRecord, StoreError> {
        self.save_all(vec![record])
            .await?
            .pop()
            .ok_or_else(|| StoreError::Unavailable("save returned no record".to_string()))
    }

    /// All records for a ticker, oldest first
    async fn find_by_ticker(&self, ticker: &str) -> Result<Vec<StockRecord>, StoreError>;

    /// Records for a ticker and quarter, newest date first, undated last
    async fn find_by_ticker_and_quarter(
        &self,
        ticker: &str,
        quarter: i32,
    ) -> Result<Vec<StockRecord>, StoreError>;

    async fn count(&self) -> Result<u64, StoreError>;

    /// Remove every record, returning how many were removed
    async fn delete_all(&self) -> Result<u64, StoreError>;

    /// Remove a ticker's records, returning them
    async fn delete_by_ticker(&self, ticker: &str) -> Result<Vec<StockRecord>, StoreError>;
}
