pub mod create;
pub mod delete_all;
pub mod delete_by_ticker;
pub mod upload;

pub use create::{CreateStockRecordCommand, CreateStockRecordError};
pub use delete_all::{
    DeleteAllStockRecordsCommand, DeleteAllStockRecordsError, DeleteAllStockRecordsResponse,
};
pub use delete_by_ticker::{
    DeleteStockRecordsCommand, DeleteStockRecordsError, DeleteStockRecordsResponse,
};
pub use upload::{UploadStockCsvCommand, UploadStockCsvError};
