//! Stock Records Ingestion Library
//!
//! Turns delimited stock observation exports into typed [`StockRecord`]s and
//! persists them in batches through a [`RecordStore`].
//!
//! # Pipeline
//!
//! - [`coerce`]: permissive text-to-value conversions (`$1,234.50` -> `1234.50`)
//! - [`header`]: column name resolution with a positional fallback
//! - [`mapper`]: one raw row to one record, or a row-level error
//! - [`ingestor`]: the batched scan that feeds the store
//! - [`summary`]: the bounded upload summary and error reporting
//!
//! # Example
//!
//! ```no_run
//! use stocks_ingest::{BatchIngestor, IngestOptions, MemoryRecordStore, TracingReporter};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let csv = "quarter,stock,date,open\n1,AA,1/7/2011,$15.82\n";
//! let store = MemoryRecordStore::new();
//! let ingestor = BatchIngestor::new(IngestOptions::default());
//! let result = ingestor.upload(csv.as_bytes(), &store, &TracingReporter).await?;
//! assert_eq!(result.count, 1);
//! # Ok(())
//! # }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

mod blank_lines;
pub mod coerce;
pub mod config;
pub mod header;
pub mod ingestor;
pub mod mapper;
pub mod model;
pub mod schema;
pub mod store;
pub mod summary;

pub use config::{IngestOptions, DEFAULT_BATCH_SIZE};
pub use header::{ColumnMap, HeaderMode};
pub use ingestor::{BatchIngestor, IngestError};
pub use mapper::{RowError, RowMapper, StockRowMapper};
pub use model::{Field, ParseResult, StockRecord, UploadResult};
pub use store::{memory::MemoryRecordStore, RecordStore, StoreError};
pub use summary::{summarize, ErrorReporter, TracingReporter, SAMPLE_ID_LIMIT};

#[cfg(feature = "database")]
pub use store::postgres::PgRecordStore;
