pub mod count;
pub mod find_by_ticker;
pub mod find_by_ticker_and_quarter;

pub use count::{CountStockRecordsError, CountStockRecordsQuery, CountStockRecordsResponse};
pub use find_by_ticker::{FindStockRecordsError, FindStockRecordsQuery};
pub use find_by_ticker_and_quarter::{
    FindStockRecordsByQuarterError, FindStockRecordsByQuarterQuery,
};
