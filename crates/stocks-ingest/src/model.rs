//! Stock record data model

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One stock observation for a ticker, quarter and week
///
/// Every field except `id` may be absent independently. `id` is assigned by
/// the store on persistence and is ignored when a record is deserialized from
/// client input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct StockRecord {
    #[serde(skip_deserializing)]
    pub id: Option<i64>,
    pub quarter: Option<i32>,
    #[serde(rename = "stock")]
    #[cfg_attr(feature = "database", sqlx(rename = "stock"))]
    pub ticker: Option<String>,
    pub date: Option<NaiveDate>,
    pub open: Option<BigDecimal>,
    pub high: Option<BigDecimal>,
    pub low: Option<BigDecimal>,
    pub close: Option<BigDecimal>,
    pub volume: Option<i64>,
    pub percent_change_price: Option<BigDecimal>,
    pub percent_change_volume_over_last_wk: Option<BigDecimal>,
    pub previous_weeks_volume: Option<i64>,
    pub next_weeks_open: Option<BigDecimal>,
    pub next_weeks_close: Option<BigDecimal>,
    pub percent_change_next_weeks_price: Option<BigDecimal>,
    pub days_to_next_dividend: Option<i32>,
    pub percent_return_next_dividend: Option<BigDecimal>,
}

/// Logical columns of a stock export, in positional-layout order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Quarter,
    Stock,
    Date,
    Open,
    High,
    Low,
    Close,
    Volume,
    PercentChangePrice,
    PercentChangeVolumeOverLastWk,
    PreviousWeeksVolume,
    NextWeeksOpen,
    NextWeeksClose,
    PercentChangeNextWeeksPrice,
    DaysToNextDividend,
    PercentReturnNextDividend,
}

impl Field {
    /// All fields in the fixed positional layout used for headerless input
    pub const ALL: [Field; 16] = [
        Field::Quarter,
        Field::Stock,
        Field::Date,
        Field::Open,
        Field::High,
        Field::Low,
        Field::Close,
        Field::Volume,
        Field::PercentChangePrice,
        Field::PercentChangeVolumeOverLastWk,
        Field::PreviousWeeksVolume,
        Field::NextWeeksOpen,
        Field::NextWeeksClose,
        Field::PercentChangeNextWeeksPrice,
        Field::DaysToNextDividend,
        Field::PercentReturnNextDividend,
    ];

    /// Header name as it appears in exports
    pub fn column_name(self) -> &'static str {
        match self {
            Field::Quarter => "quarter",
            Field::Stock => "stock",
            Field::Date => "date",
            Field::Open => "open",
            Field::High => "high",
            Field::Low => "low",
            Field::Close => "close",
            Field::Volume => "volume",
            Field::PercentChangePrice => "percentChangePrice",
            Field::PercentChangeVolumeOverLastWk => "percentChangeVolumeOverLastWk",
            Field::PreviousWeeksVolume => "previousWeeksVolume",
            Field::NextWeeksOpen => "nextWeeksOpen",
            Field::NextWeeksClose => "nextWeeksClose",
            Field::PercentChangeNextWeeksPrice => "percentChangeNextWeeksPrice",
            Field::DaysToNextDividend => "daysToNextDividend",
            Field::PercentReturnNextDividend => "percentReturnNextDividend",
        }
    }

    /// Zero-based index in the positional layout
    pub fn position(self) -> usize {
        self as usize
    }
}

/// Outcome of one ingestion pass
///
/// `records` are the persisted records in input order; `errors` hold one
/// `"row <n>: <cause>"` line per row that could not be mapped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseResult {
    pub records: Vec<StockRecord>,
    pub errors: Vec<String>,
}

/// Bounded confirmation returned to the uploader
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    pub count: usize,
    pub sample_ids: Vec<i64>,
}
