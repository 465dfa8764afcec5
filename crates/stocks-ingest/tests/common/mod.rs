//! Shared fixtures for ingestion tests

#![allow(dead_code)]

use async_trait::async_trait;
use csv::ByteRecord;
use std::sync::Mutex;
use stocks_ingest::{
    ColumnMap, ErrorReporter, MemoryRecordStore, RecordStore, RowError, RowMapper, StockRecord,
    StockRowMapper, StoreError,
};

/// Dow Jones index export header
pub const HEADER: &str = "quarter,stock,date,open,high,low,close,volume,percent_change_price,\
percent_change_volume_over_last_wk,previous_weeks_volume,next_weeks_open,next_weeks_close,\
percent_change_next_weeks_price,days_to_next_dividend,percent_return_next_dividend";

/// Header using the camelCase export names
pub const CAMEL_HEADER: &str = "quarter,stock,date,open,high,low,close,volume,percentChangePrice,\
percentChangeVolumeOverLastWk,previousWeeksVolume,nextWeeksOpen,nextWeeksClose,\
percentChangeNextWeeksPrice,daysToNextDividend,percentReturnNextDividend";

pub fn csv_lines(header: &str, rows: &[&str]) -> String {
    let mut out = String::from(header);
    out.push('\n');
    for row in rows {
        out.push_str(row);
        out.push('\n');
    }
    out
}

pub fn record(cells: &[&str]) -> csv::Result<ByteRecord> {
    Ok(ByteRecord::from(cells.to_vec()))
}

/// Memory store that remembers the size of every `save_all` call
#[derive(Default)]
pub struct RecordingStore {
    pub inner: MemoryRecordStore,
    pub batches: Mutex<Vec<usize>>,
    /// `save_all` call (1-based) that fails instead of saving
    pub fail_on_call: Option<usize>,
}

impl RecordingStore {
    pub fn failing_on(call: usize) -> Self {
        Self {
            fail_on_call: Some(call),
            ..Default::default()
        }
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batches.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecordStore for RecordingStore {
    async fn save_all(&self, records: Vec<StockRecord>) -> Result<Vec<StockRecord>, StoreError> {
        let call = {
            let mut batches = self.batches.lock().unwrap();
            batches.push(records.len());
            batches.len()
        };
        if self.fail_on_call == Some(call) {
            return Err(StoreError::Unavailable("connection reset".to_string()));
        }
        self.inner.save_all(records).await
    }

    async fn find_by_ticker(&self, ticker: &str) -> Result<Vec<StockRecord>, StoreError> {
        self.inner.find_by_ticker(ticker).await
    }

    async fn find_by_ticker_and_quarter(
        &self,
        ticker: &str,
        quarter: i32,
    ) -> Result<Vec<StockRecord>, StoreError> {
        self.inner.find_by_ticker_and_quarter(ticker, quarter).await
    }

    async fn count(&self) -> Result<u64, StoreError> {
        self.inner.count().await
    }

    async fn delete_all(&self) -> Result<u64, StoreError> {
        self.inner.delete_all().await
    }

    async fn delete_by_ticker(&self, ticker: &str) -> Result<Vec<StockRecord>, StoreError> {
        self.inner.delete_by_ticker(ticker).await
    }
}

/// Default mapper that refuses any row whose ticker is `FAULT`
pub struct FaultyMapper;

impl RowMapper for FaultyMapper {
    fn map_row(&self, row: &ByteRecord, columns: &ColumnMap) -> Result<StockRecord, RowError> {
        let record = StockRowMapper.map_row(row, columns)?;
        if record.ticker.as_deref() == Some("FAULT") {
            return Err(RowError::Malformed("simulated fault".to_string()));
        }
        Ok(record)
    }
}

/// Reporter that keeps every message
#[derive(Default)]
pub struct CollectingReporter {
    pub messages: Mutex<Vec<String>>,
}

impl CollectingReporter {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl ErrorReporter for CollectingReporter {
    fn report(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}
