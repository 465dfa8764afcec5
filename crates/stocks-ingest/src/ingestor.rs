//! Batched ingestion
//!
//! Reads rows in order, maps each one, and hands full batches to a
//! [`RecordStore`]. Row-level failures are collected and the scan continues;
//! read and store failures abort the call. Batches already flushed before an
//! abort stay persisted.

use crate::blank_lines::{is_blank_line, BlankLineMarker};
use crate::config::IngestOptions;
use crate::header::{ColumnMap, HeaderMode};
use crate::mapper::{RowMapper, StockRowMapper};
use crate::model::{ParseResult, StockRecord, UploadResult};
use crate::store::{RecordStore, StoreError};
use crate::summary::{summarize, ErrorReporter};
use csv::{ByteRecord, ReaderBuilder};
use std::io::Read;
use thiserror::Error;
use tracing::{debug, info, trace};

/// Failures that abort an ingestion call
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Failed to read input: {0}")]
    Stream(#[from] csv::Error),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Batch size must be at least 1")]
    InvalidBatchSize,
}

/// Drives one or more ingestion calls with fixed options
#[derive(Debug, Clone, Default)]
pub struct BatchIngestor<M = StockRowMapper> {
    options: IngestOptions,
    mapper: M,
}

impl BatchIngestor<StockRowMapper> {
    pub fn new(options: IngestOptions) -> Self {
        Self::with_mapper(options, StockRowMapper)
    }
}

impl<M: RowMapper> BatchIngestor<M> {
    pub fn with_mapper(options: IngestOptions, mapper: M) -> Self {
        Self { options, mapper }
    }

    pub fn options(&self) -> &IngestOptions {
        &self.options
    }

    /// Parse comma separated input and persist it through `store`
    ///
    /// Quoted fields follow RFC 4180 and rows may differ in length. Blank
    /// lines outside quoted fields are skipped but counted, so row numbers in
    /// errors match line numbers for input without multi-line fields.
    pub async fn ingest<R, S>(&self, input: R, store: &S) -> Result<ParseResult, IngestError>
    where
        R: Read,
        S: RecordStore + ?Sized,
    {
        let rows = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(BlankLineMarker::new(input))
            .into_byte_records();
        self.ingest_records(rows, store).await
    }

    /// Ingest already tokenized rows
    ///
    /// Data rows are numbered from 1, starting after the header in
    /// [`HeaderMode::Named`]. Rows with no cells and rows holding one empty
    /// cell are blank: they are skipped but still take a number, so error
    /// positions line up with the input. Blank rows before the header are
    /// passed over.
    #[tracing::instrument(skip_all, fields(batch_size = self.options.batch_size, header_mode = %self.options.header_mode))]
    pub async fn ingest_records<I, S>(&self, rows: I, store: &S) -> Result<ParseResult, IngestError>
    where
        I: IntoIterator<Item = csv::Result<ByteRecord>>,
        S: RecordStore + ?Sized,
    {
        let batch_size = self.options.batch_size;
        if batch_size == 0 {
            return Err(IngestError::InvalidBatchSize);
        }

        let mut rows = rows.into_iter();
        let columns = match self.options.header_mode {
            HeaderMode::Named => {
                let header = rows
                    .by_ref()
                    .find(|row| !matches!(row, Ok(r) if is_blank_line(r)));
                match header {
                    Some(header) => ColumnMap::from_header(&header?),
                    None => {
                        debug!("Input is empty");
                        return Ok(ParseResult::default());
                    },
                }
            },
            HeaderMode::Positional => ColumnMap::Positional,
        };

        let mut result = ParseResult::default();
        let mut batch: Vec<StockRecord> = Vec::new();
        let mut row_number = 0usize;

        for row in rows {
            let row = row?;
            row_number += 1;

            if row.is_empty() || is_blank_line(&row) {
                trace!(row = row_number, "Skipping blank row");
                continue;
            }

            match self.mapper.map_row(&row, &columns) {
                Ok(record) => {
                    batch.push(record);
                    if batch.len() >= batch_size {
                        self.flush(&mut batch, store, &mut result.records).await?;
                    }
                },
                Err(e) => {
                    debug!(row = row_number, error = %e, "Row rejected");
                    result.errors.push(format!("row {row_number}: {e}"));
                },
            }
        }

        self.flush(&mut batch, store, &mut result.records).await?;

        info!(
            rows = row_number,
            persisted = result.records.len(),
            rejected = result.errors.len(),
            "Ingestion complete"
        );
        Ok(result)
    }

    /// Ingest, then summarize and report row errors
    pub async fn upload<R, S>(
        &self,
        input: R,
        store: &S,
        reporter: &dyn ErrorReporter,
    ) -> Result<UploadResult, IngestError>
    where
        R: Read,
        S: RecordStore + ?Sized,
    {
        let result = self.ingest(input, store).await?;
        Ok(summarize(&result, reporter))
    }

    async fn flush<S>(
        &self,
        batch: &mut Vec<StockRecord>,
        store: &S,
        persisted: &mut Vec<StockRecord>,
    ) -> Result<(), IngestError>
    where
        S: RecordStore + ?Sized,
    {
        if batch.is_empty() {
            return Ok(());
        }

        let records = std::mem::take(batch);
        debug!(size = records.len(), "Flushing batch");
        let mut saved = store.save_all(records).await?;
        persisted.append(&mut saved);
        Ok(())
    }
}
