//! Row to record mapping

use crate::coerce::{empty_to_absent, to_date, to_decimal, to_integer, to_long};
use crate::header::ColumnMap;
use crate::model::{Field, StockRecord};
use csv::ByteRecord;
use thiserror::Error;

/// A row that cannot become a record
///
/// Unlike a value that fails to coerce (which is simply absent), a row error
/// excludes the whole row from the upload.
#[derive(Error, Debug)]
pub enum RowError {
    #[error("column '{column}' is not valid UTF-8: {source}")]
    InvalidUtf8 {
        column: &'static str,
        #[source]
        source: std::str::Utf8Error,
    },

    #[error("{0}")]
    Malformed(String),
}

/// Turns one raw row into a [`StockRecord`]
pub trait RowMapper: Send + Sync {
    fn map_row(&self, row: &ByteRecord, columns: &ColumnMap) -> Result<StockRecord, RowError>;
}

/// Default mapper for stock exports
///
/// Cells are looked up through the [`ColumnMap`], run through the permissive
/// coercions and assigned as-is; a value that does not parse is absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct StockRowMapper;

impl StockRowMapper {
    fn text<'r>(
        row: &'r ByteRecord,
        columns: &ColumnMap,
        field: Field,
    ) -> Result<&'r str, RowError> {
        std::str::from_utf8(columns.cell(row, field)).map_err(|source| RowError::InvalidUtf8 {
            column: field.column_name(),
            source,
        })
    }
}

impl RowMapper for StockRowMapper {
    fn map_row(&self, row: &ByteRecord, columns: &ColumnMap) -> Result<StockRecord, RowError> {
        let text = |field| Self::text(row, columns, field);

        Ok(StockRecord {
            id: None,
            quarter: to_integer(text(Field::Quarter)?),
            ticker: empty_to_absent(text(Field::Stock)?),
            date: to_date(text(Field::Date)?),
            open: to_decimal(text(Field::Open)?),
            high: to_decimal(text(Field::High)?),
            low: to_decimal(text(Field::Low)?),
            close: to_decimal(text(Field::Close)?),
            volume: to_long(text(Field::Volume)?),
            percent_change_price: to_decimal(text(Field::PercentChangePrice)?),
            percent_change_volume_over_last_wk: to_decimal(text(
                Field::PercentChangeVolumeOverLastWk,
            )?),
            previous_weeks_volume: to_long(text(Field::PreviousWeeksVolume)?),
            next_weeks_open: to_decimal(text(Field::NextWeeksOpen)?),
            next_weeks_close: to_decimal(text(Field::NextWeeksClose)?),
            percent_change_next_weeks_price: to_decimal(text(Field::PercentChangeNextWeeksPrice)?),
            days_to_next_dividend: to_integer(text(Field::DaysToNextDividend)?),
            percent_return_next_dividend: to_decimal(text(Field::PercentReturnNextDividend)?),
        })
    }
}
