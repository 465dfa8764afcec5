//! Permissive cell conversions
//!
//! Every function takes the raw cell text and returns `None` instead of an
//! error when the text cannot be converted. Numeric conversions first pass
//! through [`normalize_number`], which removes currency symbols and
//! thousands separators.

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use std::str::FromStr;

/// Strip `$` and `,` and surrounding whitespace
pub fn normalize_number(text: &str) -> String {
    text.replace(['$', ','], "").trim().to_string()
}

pub fn to_integer(text: &str) -> Option<i32> {
    let normalized = normalize_number(text);
    if normalized.is_empty() {
        return None;
    }
    normalized.parse().ok()
}

/// Parse a count, dropping any fractional part (`"1234.0"` -> `1234`)
pub fn to_long(text: &str) -> Option<i64> {
    let normalized = normalize_number(text);
    let whole = match normalized.find('.') {
        Some(dot) => &normalized[..dot],
        None => normalized.as_str(),
    };
    if whole.is_empty() {
        return None;
    }
    whole.parse().ok()
}

/// Parse an arbitrary precision decimal without rounding
pub fn to_decimal(text: &str) -> Option<BigDecimal> {
    let normalized = normalize_number(text);
    if normalized.is_empty() {
        return None;
    }
    BigDecimal::from_str(&normalized).ok()
}

/// Parse `M/d/yyyy`: one or two digit month and day, four digit year
///
/// No other layout is accepted, and dates that do not exist on the calendar
/// (`2/30/2011`) are absent.
pub fn to_date(text: &str) -> Option<NaiveDate> {
    let mut parts = text.trim().split('/');
    let (month, day, year) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }

    let month = digits(month, 1..=2)?;
    let day = digits(day, 1..=2)?;
    let year = digits(year, 4..=4)?;

    NaiveDate::from_ymd_opt(year as i32, month, day)
}

fn digits(part: &str, width: std::ops::RangeInclusive<usize>) -> Option<u32> {
    if !width.contains(&part.len()) || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

/// Trimmed text, or `None` when the cell is blank
pub fn empty_to_absent(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
