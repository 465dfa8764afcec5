//! Persisted layout of `stock_records`
//!
//! Stores derive their column lists and value limits from
//! [`STOCK_RECORD_SCHEMA`] rather than from the record type itself, so the
//! parser stays unaware of storage constraints. The shipped migration
//! (`migrations/0001_stock_records.sql`) mirrors this table.

use crate::model::{Field, StockRecord};
use bigdecimal::BigDecimal;

pub const TABLE_NAME: &str = "stock_records";

/// Storage type of a persisted column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    BigSerial,
    Integer,
    BigInt,
    Date,
    Varchar(usize),
    Numeric { precision: u64, scale: i64 },
}

impl ColumnType {
    /// SQL type name as used in DDL
    pub fn sql(&self) -> String {
        match self {
            ColumnType::BigSerial => "BIGSERIAL".to_string(),
            ColumnType::Integer => "INTEGER".to_string(),
            ColumnType::BigInt => "BIGINT".to_string(),
            ColumnType::Date => "DATE".to_string(),
            ColumnType::Varchar(len) => format!("VARCHAR({len})"),
            ColumnType::Numeric { precision, scale } => format!("NUMERIC({precision}, {scale})"),
        }
    }
}

/// One persisted column; `field` is `None` for store-generated columns
#[derive(Debug, Clone, Copy)]
pub struct ColumnDef {
    pub name: &'static str,
    pub column_type: ColumnType,
    pub field: Option<Field>,
}

const PRICE: ColumnType = ColumnType::Numeric {
    precision: 19,
    scale: 6,
};

const fn column(name: &'static str, column_type: ColumnType, field: Field) -> ColumnDef {
    ColumnDef {
        name,
        column_type,
        field: Some(field),
    }
}

pub const STOCK_RECORD_SCHEMA: &[ColumnDef] = &[
    ColumnDef {
        name: "id",
        column_type: ColumnType::BigSerial,
        field: None,
    },
    column("quarter", ColumnType::Integer, Field::Quarter),
    column("stock", ColumnType::Varchar(32), Field::Stock),
    column("date", ColumnType::Date, Field::Date),
    column("open", PRICE, Field::Open),
    column("high", PRICE, Field::High),
    column("low", PRICE, Field::Low),
    column("close", PRICE, Field::Close),
    column("volume", ColumnType::BigInt, Field::Volume),
    column("percent_change_price", PRICE, Field::PercentChangePrice),
    column(
        "percent_change_volume_over_last_wk",
        PRICE,
        Field::PercentChangeVolumeOverLastWk,
    ),
    column("previous_weeks_volume", ColumnType::BigInt, Field::PreviousWeeksVolume),
    column("next_weeks_open", PRICE, Field::NextWeeksOpen),
    column("next_weeks_close", PRICE, Field::NextWeeksClose),
    column(
        "percent_change_next_weeks_price",
        PRICE,
        Field::PercentChangeNextWeeksPrice,
    ),
    column("days_to_next_dividend", ColumnType::Integer, Field::DaysToNextDividend),
    column(
        "percent_return_next_dividend",
        PRICE,
        Field::PercentReturnNextDividend,
    ),
];

/// Columns supplied on insert, in schema order
pub fn insert_columns() -> impl Iterator<Item = &'static ColumnDef> {
    STOCK_RECORD_SCHEMA.iter().filter(|c| c.field.is_some())
}

/// Comma separated list of every column, suitable for `SELECT` and `RETURNING`
pub fn select_list() -> String {
    STOCK_RECORD_SCHEMA
        .iter()
        .map(|c| c.name)
        .collect::<Vec<_>>()
        .join(", ")
}

/// `CREATE TABLE` statement for the schema
pub fn create_table_sql() -> String {
    let columns = STOCK_RECORD_SCHEMA
        .iter()
        .map(|c| {
            if c.field.is_none() {
                format!("    {} {} PRIMARY KEY", c.name, c.column_type.sql())
            } else {
                format!("    {} {}", c.name, c.column_type.sql())
            }
        })
        .collect::<Vec<_>>()
        .join(",\n");
    format!("CREATE TABLE IF NOT EXISTS {TABLE_NAME} (\n{columns}\n)")
}

/// A value that the schema would refuse to store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub column: &'static str,
    pub message: String,
}

/// Check a record against the column limits
///
/// Mirrors what the database enforces: `VARCHAR` length and the number of
/// integer digits a `NUMERIC(p, s)` column can hold.
pub fn check_record(record: &StockRecord) -> Result<(), Violation> {
    for def in insert_columns() {
        let Some(field) = def.field else {
            continue;
        };
        match def.column_type {
            ColumnType::Varchar(max) => {
                if let Some(text) = text_value(record, field) {
                    let len = text.chars().count();
                    if len > max {
                        return Err(Violation {
                            column: def.name,
                            message: format!("value of length {len} exceeds {max}"),
                        });
                    }
                }
            },
            ColumnType::Numeric { precision, scale } => {
                if let Some(value) = decimal_value(record, field) {
                    let allowed = precision.saturating_sub(scale.unsigned_abs());
                    let needed = integer_digits(value);
                    if needed > i128::from(allowed) {
                        return Err(Violation {
                            column: def.name,
                            message: format!(
                                "value needs {needed} integer digits, column allows {allowed}"
                            ),
                        });
                    }
                }
            },
            _ => {},
        }
    }
    Ok(())
}

/// Digits left of the decimal point, zero or less for magnitudes below one
///
/// Read off the unscaled digit count and the exponent, so values like `1e300000000`
/// are never expanded.
fn integer_digits(value: &BigDecimal) -> i128 {
    let (_, scale) = value.as_bigint_and_exponent();
    i128::from(value.digits()) - i128::from(scale)
}

fn text_value(record: &StockRecord, field: Field) -> Option<&str> {
    match field {
        Field::Stock => record.ticker.as_deref(),
        _ => None,
    }
}

fn decimal_value(record: &StockRecord, field: Field) -> Option<&BigDecimal> {
    match field {
        Field::Open => record.open.as_ref(),
        Field::High => record.high.as_ref(),
        Field::Low => record.low.as_ref(),
        Field::Close => record.close.as_ref(),
        Field::PercentChangePrice => record.percent_change_price.as_ref(),
        Field::PercentChangeVolumeOverLastWk => record.percent_change_volume_over_last_wk.as_ref(),
        Field::NextWeeksOpen => record.next_weeks_open.as_ref(),
        Field::NextWeeksClose => record.next_weeks_close.as_ref(),
        Field::PercentChangeNextWeeksPrice => record.percent_change_next_weeks_price.as_ref(),
        Field::PercentReturnNextDividend => record.percent_return_next_dividend.as_ref(),
        _ => None,
    }
}
