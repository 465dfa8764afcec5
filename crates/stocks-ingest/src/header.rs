//! Column resolution
//!
//! A [`ColumnMap`] answers "which cell holds this field" for every row of one
//! ingestion. It is built once from the header row (or from nothing, in
//! positional mode) and never changes mid-stream.

use crate::model::Field;
use crate::schema::insert_columns;
use csv::ByteRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// How the first row of input is interpreted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderMode {
    /// First row is a header naming the columns
    #[default]
    Named,
    /// No header; columns follow the fixed layout of [`Field::ALL`]
    Positional,
}

impl fmt::Display for HeaderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderMode::Named => write!(f, "named"),
            HeaderMode::Positional => write!(f, "positional"),
        }
    }
}

impl FromStr for HeaderMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "named" | "header" => Ok(HeaderMode::Named),
            "positional" | "none" => Ok(HeaderMode::Positional),
            other => Err(format!("unknown header mode '{other}' (expected named or positional)")),
        }
    }
}

/// Resolved column positions for one ingestion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnMap {
    /// Lowercased, trimmed header name to zero-based index
    Named(HashMap<String, usize>),
    Positional,
}

impl ColumnMap {
    /// Build the map from a header row
    ///
    /// Names are trimmed and lowercased; when a name repeats, the last
    /// occurrence wins. A header with no cells, or only blank cells, carries
    /// no usable names and yields [`ColumnMap::Positional`].
    pub fn from_header(header: &ByteRecord) -> Self {
        let mut names = HashMap::new();
        for (index, cell) in header.iter().enumerate() {
            let cell = if index == 0 {
                cell.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(cell)
            } else {
                cell
            };
            let name = String::from_utf8_lossy(cell).trim().to_lowercase();
            if !name.is_empty() {
                names.insert(name, index);
            }
        }

        if names.is_empty() {
            tracing::debug!("Header row has no usable names, using positional layout");
            ColumnMap::Positional
        } else {
            ColumnMap::Named(names)
        }
    }

    /// Index of `field`, or `None` when the header does not name it
    ///
    /// A field matches its export name (`percentChangePrice`) or its storage
    /// column name (`percent_change_price`), ignoring case.
    pub fn index_of(&self, field: Field) -> Option<usize> {
        match self {
            ColumnMap::Named(names) => names
                .get(&field.column_name().to_lowercase())
                .or_else(|| storage_name(field).and_then(|name| names.get(name)))
                .copied(),
            ColumnMap::Positional => Some(field.position()),
        }
    }

    /// Raw cell for `field`, empty when unmapped or past the end of the row
    pub fn cell<'r>(&self, row: &'r ByteRecord, field: Field) -> &'r [u8] {
        self.index_of(field).and_then(|i| row.get(i)).unwrap_or(b"")
    }

    pub fn is_positional(&self) -> bool {
        matches!(self, ColumnMap::Positional)
    }
}

fn storage_name(field: Field) -> Option<&'static str> {
    insert_columns()
        .find(|c| c.field == Some(field))
        .map(|c| c.name)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> ByteRecord {
        ByteRecord::from(cells.to_vec())
    }

    #[test]
    fn test_header_mode_parse() {
        assert_eq!("named".parse::<HeaderMode>().unwrap(), HeaderMode::Named);
        assert_eq!(" Positional ".parse::<HeaderMode>().unwrap(), HeaderMode::Positional);
        assert!("sideways".parse::<HeaderMode>().is_err());
        assert_eq!(HeaderMode::default(), HeaderMode::Named);
        assert_eq!(HeaderMode::Positional.to_string(), "positional");
    }

    #[test]
    fn test_names_are_case_insensitive_and_trimmed() {
        let map = ColumnMap::from_header(&row(&[" Quarter ", "STOCK", "percentchangeprice"]));
        assert_eq!(map.index_of(Field::Quarter), Some(0));
        assert_eq!(map.index_of(Field::Stock), Some(1));
        assert_eq!(map.index_of(Field::PercentChangePrice), Some(2));
        assert_eq!(map.index_of(Field::Close), None);
    }

    #[test]
    fn test_storage_names_are_accepted() {
        let map = ColumnMap::from_header(&row(&["stock", "Percent_Change_Price", "days_to_next_dividend"]));
        assert_eq!(map.index_of(Field::PercentChangePrice), Some(1));
        assert_eq!(map.index_of(Field::DaysToNextDividend), Some(2));
    }

    #[test]
    fn test_duplicate_name_last_wins() {
        let map = ColumnMap::from_header(&row(&["stock", "open", "stock"]));
        assert_eq!(map.index_of(Field::Stock), Some(2));
    }

    #[test]
    fn test_blank_header_falls_back_to_positional() {
        assert!(ColumnMap::from_header(&row(&["", "  ", ""])).is_positional());
        assert!(ColumnMap::from_header(&ByteRecord::new()).is_positional());
    }

    #[test]
    fn test_byte_order_mark_is_ignored() {
        let header = ByteRecord::from(vec![&b"\xEF\xBB\xBFquarter"[..], &b"stock"[..]]);
        let map = ColumnMap::from_header(&header);
        assert_eq!(map.index_of(Field::Quarter), Some(0));
    }

    #[test]
    fn test_positional_cells() {
        let map = ColumnMap::Positional;
        let data = row(&["1", "AA", "1/7/2011"]);
        assert_eq!(map.cell(&data, Field::Stock), b"AA");
        assert_eq!(map.cell(&data, Field::Open), b"");
    }
}
