pub mod commands;
pub mod queries;
pub mod routes;

pub use commands::{
    CreateStockRecordCommand, CreateStockRecordError, DeleteAllStockRecordsCommand,
    DeleteAllStockRecordsError, DeleteAllStockRecordsResponse, DeleteStockRecordsCommand,
    DeleteStockRecordsError, DeleteStockRecordsResponse, UploadStockCsvCommand,
    UploadStockCsvError,
};

pub use queries::{
    CountStockRecordsError, CountStockRecordsQuery, CountStockRecordsResponse,
    FindStockRecordsByQuarterError, FindStockRecordsByQuarterQuery, FindStockRecordsError,
    FindStockRecordsQuery,
};

pub use routes::stock_records_routes;
