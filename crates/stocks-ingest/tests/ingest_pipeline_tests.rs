//! End-to-end tests for the ingestion pipeline
//!
//! These tests drive `BatchIngestor` against in-memory stores and verify:
//! - Records are mapped and persisted in input order
//! - Batches are flushed at the configured size
//! - Row errors are isolated and numbered, read and store errors abort

mod common;

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use csv::ByteRecord;
use std::io::{self, Read};
use std::str::FromStr;
use stocks_ingest::{
    BatchIngestor, Field, HeaderMode, IngestError, IngestOptions, MemoryRecordStore, RecordStore,
    StockRecord, StoreError,
};

use common::{
    csv_lines, record, CollectingReporter, FaultyMapper, RecordingStore, CAMEL_HEADER, HEADER,
};

fn dec(s: &str) -> Option<BigDecimal> {
    Some(BigDecimal::from_str(s).unwrap())
}

fn options(batch_size: usize) -> IngestOptions {
    IngestOptions::default().with_batch_size(batch_size)
}

#[tokio::test]
async fn test_maps_dow_jones_row() {
    let input = csv_lines(
        HEADER,
        &["1,AA,1/7/2011,$15.82,$16.72,$15.78,$16.42,239655616,3.79267,,,$16.71,$15.97,-4.42849,26,0.182704"],
    );
    let store = MemoryRecordStore::new();

    let result = BatchIngestor::new(IngestOptions::default())
        .ingest(input.as_bytes(), &store)
        .await
        .unwrap();

    assert!(result.errors.is_empty());
    assert_eq!(result.records.len(), 1);
    let aa = &result.records[0];
    assert_eq!(aa.id, Some(1));
    assert_eq!(aa.quarter, Some(1));
    assert_eq!(aa.ticker.as_deref(), Some("AA"));
    assert_eq!(aa.date, NaiveDate::from_ymd_opt(2011, 1, 7));
    assert_eq!(aa.open, dec("15.82"));
    assert_eq!(aa.close, dec("16.42"));
    assert_eq!(aa.volume, Some(239_655_616));
    assert_eq!(aa.percent_change_price, dec("3.79267"));
    assert_eq!(aa.percent_change_volume_over_last_wk, None);
    assert_eq!(aa.previous_weeks_volume, None);
    assert_eq!(aa.next_weeks_open, dec("16.71"));
    assert_eq!(aa.percent_change_next_weeks_price, dec("-4.42849"));
    assert_eq!(aa.days_to_next_dividend, Some(26));
    assert_eq!(aa.percent_return_next_dividend, dec("0.182704"));
}

#[tokio::test]
async fn test_invalid_date_is_absent_not_an_error() {
    let input = csv_lines(
        "quarter,stock,date,open,high,low,close,volume",
        &["1,AA,not-a-date,15.82,16.72,15.20,16.42,239655616"],
    );
    let store = MemoryRecordStore::new();

    let result = BatchIngestor::new(IngestOptions::default())
        .ingest(input.as_bytes(), &store)
        .await
        .unwrap();

    assert!(result.errors.is_empty());
    assert_eq!(result.records.len(), 1);
    assert_eq!(result.records[0].date, None);
    assert_eq!(result.records[0].open, dec("15.82"));
    assert_eq!(store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_row_fault_is_isolated_and_numbered() {
    let input = csv_lines("quarter,stock", &["1,AA", "1,MSFT", "1,FAULT", "1,IBM"]);
    let store = MemoryRecordStore::new();

    let result = BatchIngestor::with_mapper(IngestOptions::default(), FaultyMapper)
        .ingest(input.as_bytes(), &store)
        .await
        .unwrap();

    let tickers: Vec<_> = result
        .records
        .iter()
        .map(|r| r.ticker.clone().unwrap())
        .collect();
    assert_eq!(tickers, vec!["AA", "MSFT", "IBM"]);
    assert_eq!(result.errors, vec!["row 3: simulated fault".to_string()]);
}

#[tokio::test]
async fn test_batches_flush_at_batch_size_in_order() {
    let input = csv_lines("stock", &["A", "B", "C", "D", "E"]);
    let store = RecordingStore::default();

    let result = BatchIngestor::new(options(2))
        .ingest(input.as_bytes(), &store)
        .await
        .unwrap();

    assert_eq!(store.batch_sizes(), vec![2, 2, 1]);
    let tickers: Vec<_> = result
        .records
        .iter()
        .map(|r| r.ticker.clone().unwrap())
        .collect();
    assert_eq!(tickers, vec!["A", "B", "C", "D", "E"]);
    let ids: Vec<_> = result.records.iter().map(|r| r.id.unwrap()).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn test_empty_final_batch_is_not_flushed() {
    let input = csv_lines("stock", &["A", "B", "C", "D"]);
    let store = RecordingStore::default();

    BatchIngestor::new(options(2))
        .ingest(input.as_bytes(), &store)
        .await
        .unwrap();

    assert_eq!(store.batch_sizes(), vec![2, 2]);
}

#[tokio::test]
async fn test_empty_input_makes_no_store_calls() {
    let store = RecordingStore::default();

    let result = BatchIngestor::new(IngestOptions::default())
        .ingest("".as_bytes(), &store)
        .await
        .unwrap();

    assert!(result.records.is_empty());
    assert!(result.errors.is_empty());
    assert!(store.batch_sizes().is_empty());
}

#[tokio::test]
async fn test_zero_length_rows_are_skipped_but_counted() {
    let rows = vec![
        record(&["quarter", "stock"]),
        record(&["1", "AA"]),
        Ok(ByteRecord::new()),
        record(&["1", "FAULT"]),
        Ok(ByteRecord::new()),
        record(&["2", "AA"]),
    ];
    let store = MemoryRecordStore::new();

    let result = BatchIngestor::with_mapper(IngestOptions::default(), FaultyMapper)
        .ingest_records(rows, &store)
        .await
        .unwrap();

    assert_eq!(result.records.len(), 2);
    assert_eq!(result.errors, vec!["row 3: simulated fault".to_string()]);
}

#[tokio::test]
async fn test_blank_lines_are_skipped_but_counted() {
    let input = "stock\nAA\n\n\nFAULT\n";
    let store = MemoryRecordStore::new();

    let result = BatchIngestor::with_mapper(IngestOptions::default(), FaultyMapper)
        .ingest(input.as_bytes(), &store)
        .await
        .unwrap();

    assert_eq!(result.records.len(), 1);
    assert_eq!(result.errors, vec!["row 4: simulated fault".to_string()]);
}

#[tokio::test]
async fn test_blank_crlf_lines_are_counted() {
    let input = "stock\r\nAA\r\n\r\nFAULT\r\n";
    let store = MemoryRecordStore::new();

    let result = BatchIngestor::with_mapper(IngestOptions::default(), FaultyMapper)
        .ingest(input.as_bytes(), &store)
        .await
        .unwrap();

    assert_eq!(result.records.len(), 1);
    assert_eq!(result.errors, vec!["row 3: simulated fault".to_string()]);
}

#[tokio::test]
async fn test_blank_lines_inside_quotes_are_data() {
    let input = "stock,date\n\"A\n\nA\",x\nFAULT,y\n";
    let store = MemoryRecordStore::new();

    let result = BatchIngestor::with_mapper(IngestOptions::default(), FaultyMapper)
        .ingest(input.as_bytes(), &store)
        .await
        .unwrap();

    assert_eq!(result.records.len(), 1);
    assert_eq!(result.records[0].ticker.as_deref(), Some("A\n\nA"));
    assert_eq!(result.errors, vec!["row 2: simulated fault".to_string()]);
}

#[tokio::test]
async fn test_error_after_blank_line_names_input_row() {
    let input: &[u8] = b"quarter,stock\n1,AA\n\n1,B\xFF\n";
    let store = MemoryRecordStore::new();

    let result = BatchIngestor::new(IngestOptions::default())
        .ingest(input, &store)
        .await
        .unwrap();

    assert_eq!(result.records.len(), 1);
    assert_eq!(result.errors.len(), 1);
    assert!(
        result.errors[0].starts_with("row 3: column 'stock' is not valid UTF-8"),
        "{}",
        result.errors[0]
    );
}

#[tokio::test]
async fn test_short_rows_leave_fields_absent() {
    let input = csv_lines(CAMEL_HEADER, &["2,KO", "3"]);
    let store = MemoryRecordStore::new();

    let result = BatchIngestor::new(IngestOptions::default())
        .ingest(input.as_bytes(), &store)
        .await
        .unwrap();

    assert_eq!(result.records.len(), 2);
    assert_eq!(result.records[0].ticker.as_deref(), Some("KO"));
    assert_eq!(result.records[0].close, None);
    assert_eq!(result.records[1].quarter, Some(3));
    assert_eq!(result.records[1].ticker, None);
}

#[tokio::test]
async fn test_positional_mode_treats_first_row_as_data() {
    let input = "1,AA,1/7/2011,$15.82\n2,MSFT,4/1/2011,$25.50\n";
    let store = MemoryRecordStore::new();

    let result = BatchIngestor::new(IngestOptions::default().with_header_mode(HeaderMode::Positional))
        .ingest(input.as_bytes(), &store)
        .await
        .unwrap();

    assert_eq!(result.records.len(), 2);
    assert_eq!(result.records[0].ticker.as_deref(), Some("AA"));
    assert_eq!(result.records[1].open, dec("25.50"));
    assert_eq!(result.records[1].date, NaiveDate::from_ymd_opt(2011, 4, 1));
}

#[tokio::test]
async fn test_blank_header_falls_back_to_positional() {
    let input = " , \n1,AA,1/7/2011\n";
    let store = MemoryRecordStore::new();

    let result = BatchIngestor::new(IngestOptions::default())
        .ingest(input.as_bytes(), &store)
        .await
        .unwrap();

    assert_eq!(result.records.len(), 1);
    assert_eq!(result.records[0].quarter, Some(1));
    assert_eq!(result.records[0].ticker.as_deref(), Some("AA"));
}

#[tokio::test]
async fn test_known_record_survives_export_and_ingest() {
    let known = StockRecord {
        id: None,
        quarter: Some(2),
        ticker: Some("DIS".to_string()),
        date: NaiveDate::from_ymd_opt(2011, 6, 24),
        open: dec("41.54"),
        high: dec("42.02"),
        low: dec("38.63"),
        close: dec("38.94"),
        volume: Some(91_488_296),
        percent_change_price: dec("-6.26384"),
        percent_change_volume_over_last_wk: dec("41.8012"),
        previous_weeks_volume: Some(64_518_620),
        next_weeks_open: dec("38.82"),
        next_weeks_close: dec("39.56"),
        percent_change_next_weeks_price: dec("1.90624"),
        days_to_next_dividend: Some(73),
        percent_return_next_dividend: dec("0.770416"),
    };

    let text = |v: &Option<BigDecimal>| format!("${}", v.as_ref().unwrap());
    let cells = [
        known.quarter.unwrap().to_string(),
        known.ticker.clone().unwrap(),
        known.date.unwrap().format("%-m/%-d/%Y").to_string(),
        text(&known.open),
        text(&known.high),
        text(&known.low),
        text(&known.close),
        known.volume.unwrap().to_string(),
        text(&known.percent_change_price),
        text(&known.percent_change_volume_over_last_wk),
        known.previous_weeks_volume.unwrap().to_string(),
        text(&known.next_weeks_open),
        text(&known.next_weeks_close),
        text(&known.percent_change_next_weeks_price),
        known.days_to_next_dividend.unwrap().to_string(),
        text(&known.percent_return_next_dividend),
    ];
    let header: Vec<_> = Field::ALL.iter().map(|f| f.column_name()).collect();
    let row = cells.join(",");
    let input = csv_lines(&header.join(","), &[row.as_str()]);
    let store = MemoryRecordStore::new();

    let result = BatchIngestor::new(IngestOptions::default())
        .ingest(input.as_bytes(), &store)
        .await
        .unwrap();

    let mut mapped = result.records[0].clone();
    assert!(mapped.id.is_some());
    mapped.id = None;
    assert_eq!(mapped, known);
}

#[tokio::test]
async fn test_store_failure_aborts_but_keeps_earlier_batches() {
    let input = csv_lines("stock", &["A", "B", "C", "D", "E"]);
    let store = RecordingStore::failing_on(2);

    let err = BatchIngestor::new(options(2))
        .ingest(input.as_bytes(), &store)
        .await
        .unwrap_err();

    assert!(matches!(err, IngestError::Store(StoreError::Unavailable(_))));
    assert_eq!(store.batch_sizes(), vec![2, 2]);
    assert_eq!(store.count().await.unwrap(), 2);
}

#[tokio::test]
async fn test_huge_exponent_is_refused_by_store() {
    let input = "stock,close\nAA,1e300000000\n";
    let store = MemoryRecordStore::new();

    let err = BatchIngestor::new(IngestOptions::default())
        .ingest(input.as_bytes(), &store)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        IngestError::Store(StoreError::Constraint { column: "close", .. })
    ));
    assert_eq!(store.count().await.unwrap(), 0);
}

struct BrokenReader;

impl Read for BrokenReader {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::Other, "disk unplugged"))
    }
}

#[tokio::test]
async fn test_read_failure_is_a_stream_error() {
    let input = "stock\nAA\n".as_bytes().chain(BrokenReader);
    let store = MemoryRecordStore::new();

    let err = BatchIngestor::new(options(1))
        .ingest(input, &store)
        .await
        .unwrap_err();

    assert!(matches!(err, IngestError::Stream(_)));
    assert!(err.to_string().contains("disk unplugged"));
    assert_eq!(store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_upload_reports_errors_and_bounds_sample() {
    let mut rows: Vec<String> = (0..12).map(|i| format!("1,T{i}")).collect();
    rows.insert(4, "1,FAULT".to_string());
    let row_refs: Vec<&str> = rows.iter().map(String::as_str).collect();
    let input = csv_lines("quarter,stock", &row_refs);
    let store = MemoryRecordStore::new();
    let reporter = CollectingReporter::default();

    let summary = BatchIngestor::with_mapper(options(5), FaultyMapper)
        .upload(input.as_bytes(), &store, &reporter)
        .await
        .unwrap();

    assert_eq!(summary.count, 12);
    assert_eq!(summary.sample_ids, (1..=10).collect::<Vec<i64>>());
    assert_eq!(
        reporter.messages(),
        vec!["CSV parse error: row 5: simulated fault".to_string()]
    );
}

#[tokio::test]
async fn test_deletes_report_counts() {
    let input = csv_lines("stock", &["AA", "MSFT", "AA"]);
    let store = MemoryRecordStore::new();
    BatchIngestor::new(IngestOptions::default())
        .ingest(input.as_bytes(), &store)
        .await
        .unwrap();

    assert!(store.delete_by_ticker("GE").await.unwrap().is_empty());
    assert_eq!(store.delete_by_ticker("AA").await.unwrap().len(), 2);
    let before = store.count().await.unwrap();
    assert_eq!(store.delete_all().await.unwrap(), before);
}
