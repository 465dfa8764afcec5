//! Stock record API routes
//!
//! # Route Structure
//!
//! - `POST /api/stock-data/bulk-insert` - Upload a CSV export (multipart, part `file`)
//! - `POST /api/stock-data` - Add a single record
//! - `GET /api/stock-data` - Count stored records
//! - `GET /api/stock-data/:stock` - Records for a ticker
//! - `GET /api/stock-data/:stock/quarters/:quarter` - Records for a ticker and quarter
//! - `DELETE /api/stock-data/:stock` - Delete a ticker's records
//! - `DELETE /api/stock-data` - Delete every record

use crate::api::response::{ApiResponse, ErrorResponse};
use crate::features::FeatureState;
use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use stocks_ingest::{StockRecord, StoreError};

use super::{
    commands::{
        CreateStockRecordCommand, CreateStockRecordError, DeleteAllStockRecordsCommand,
        DeleteAllStockRecordsError, DeleteStockRecordsCommand, DeleteStockRecordsError,
        UploadStockCsvCommand, UploadStockCsvError,
    },
    queries::{
        CountStockRecordsError, CountStockRecordsQuery, FindStockRecordsByQuarterError,
        FindStockRecordsByQuarterQuery, FindStockRecordsError, FindStockRecordsQuery,
    },
};

const FILE_PART: &str = "file";

// ============================================================================
// Router Configuration
// ============================================================================

/// Creates the stock records router
///
/// `max_upload_bytes` bounds the body of the bulk upload route only.
pub fn stock_records_routes(max_upload_bytes: usize) -> Router<FeatureState> {
    Router::new()
        .route(
            "/bulk-insert",
            post(upload_csv).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route(
            "/",
            post(create_record).get(count_records).delete(delete_all),
        )
        .route("/:stock", get(find_by_ticker).delete(delete_by_ticker))
        .route("/:stock/quarters/:quarter", get(find_by_ticker_and_quarter))
}

// ============================================================================
// Command Handlers (Write Operations)
// ============================================================================

/// Upload a CSV export
///
/// # Response
///
/// - `202 Accepted` - `{count, sampleIds}` for the persisted records
/// - `400 Bad Request` - No `file` part, malformed multipart or unreadable CSV
/// - `413 Payload Too Large` - Body exceeds the configured limit
/// - `500 Internal Server Error` - Store error
#[tracing::instrument(skip(state, multipart))]
async fn upload_csv(
    State(state): State<FeatureState>,
    mut multipart: Multipart,
) -> Result<Response, StockRecordApiError> {
    let mut command = UploadStockCsvCommand::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_PART) {
            continue;
        }
        command.filename = field.file_name().map(str::to_string);
        command.content = Some(field.bytes().await.map_err(multipart_error)?);
    }

    let response =
        super::commands::upload::handle(state.store.as_ref(), state.ingest.clone(), command)
            .await?;

    tracing::info!(count = response.count, "CSV uploaded via API");

    Ok((StatusCode::ACCEPTED, Json(ApiResponse::success(response))).into_response())
}

fn multipart_error(err: MultipartError) -> UploadStockCsvError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        UploadStockCsvError::TooLarge
    } else {
        UploadStockCsvError::Multipart(err.body_text())
    }
}

/// Add a single record
///
/// Any `id` in the body is ignored; the store assigns one.
#[tracing::instrument(skip(state, record))]
async fn create_record(
    State(state): State<FeatureState>,
    Json(record): Json<StockRecord>,
) -> Result<Response, StockRecordApiError> {
    let command = CreateStockRecordCommand { record };
    let response = super::commands::create::handle(state.store.as_ref(), command).await?;

    tracing::info!(id = ?response.id, "Stock record created via API");

    Ok((StatusCode::CREATED, Json(ApiResponse::success(response))).into_response())
}

#[tracing::instrument(skip(state))]
async fn delete_by_ticker(
    State(state): State<FeatureState>,
    Path(stock): Path<String>,
) -> Result<Response, StockRecordApiError> {
    let command = DeleteStockRecordsCommand { stock };
    let response =
        super::commands::delete_by_ticker::handle(state.store.as_ref(), command).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

#[tracing::instrument(skip(state))]
async fn delete_all(State(state): State<FeatureState>) -> Result<Response, StockRecordApiError> {
    let response = super::commands::delete_all::handle(
        state.store.as_ref(),
        DeleteAllStockRecordsCommand,
    )
    .await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

// ============================================================================
// Query Handlers (Read Operations)
// ============================================================================

#[tracing::instrument(skip(state))]
async fn count_records(
    State(state): State<FeatureState>,
) -> Result<Response, StockRecordApiError> {
    let response =
        super::queries::count::handle(state.store.as_ref(), CountStockRecordsQuery).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

#[tracing::instrument(skip(state))]
async fn find_by_ticker(
    State(state): State<FeatureState>,
    Path(stock): Path<String>,
) -> Result<Response, StockRecordApiError> {
    let query = FindStockRecordsQuery { stock };
    let response = super::queries::find_by_ticker::handle(state.store.as_ref(), query).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

#[tracing::instrument(skip(state))]
async fn find_by_ticker_and_quarter(
    State(state): State<FeatureState>,
    Path((stock, quarter)): Path<(String, i32)>,
) -> Result<Response, StockRecordApiError> {
    let query = FindStockRecordsByQuarterQuery { stock, quarter };
    let response =
        super::queries::find_by_ticker_and_quarter::handle(state.store.as_ref(), query).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
enum StockRecordApiError {
    Upload(UploadStockCsvError),
    Create(CreateStockRecordError),
    DeleteByTicker(DeleteStockRecordsError),
    DeleteAll(DeleteAllStockRecordsError),
    Count(CountStockRecordsError),
    Find(FindStockRecordsError),
    FindByQuarter(FindStockRecordsByQuarterError),
}

impl From<UploadStockCsvError> for StockRecordApiError {
    fn from(err: UploadStockCsvError) -> Self {
        Self::Upload(err)
    }
}

impl From<CreateStockRecordError> for StockRecordApiError {
    fn from(err: CreateStockRecordError) -> Self {
        Self::Create(err)
    }
}

impl From<DeleteStockRecordsError> for StockRecordApiError {
    fn from(err: DeleteStockRecordsError) -> Self {
        Self::DeleteByTicker(err)
    }
}

impl From<DeleteAllStockRecordsError> for StockRecordApiError {
    fn from(err: DeleteAllStockRecordsError) -> Self {
        Self::DeleteAll(err)
    }
}

impl From<CountStockRecordsError> for StockRecordApiError {
    fn from(err: CountStockRecordsError) -> Self {
        Self::Count(err)
    }
}

impl From<FindStockRecordsError> for StockRecordApiError {
    fn from(err: FindStockRecordsError) -> Self {
        Self::Find(err)
    }
}

impl From<FindStockRecordsByQuarterError> for StockRecordApiError {
    fn from(err: FindStockRecordsByQuarterError) -> Self {
        Self::FindByQuarter(err)
    }
}

fn validation_error(message: String) -> Response {
    let error = ErrorResponse::new("VALIDATION_ERROR", message);
    (StatusCode::BAD_REQUEST, Json(error)).into_response()
}

fn store_error(err: &StoreError) -> Response {
    match err {
        StoreError::Constraint { .. } => validation_error(err.to_string()),
        _ => {
            tracing::error!("Store error: {}", err);
            let error = ErrorResponse::new("DATABASE_ERROR", "A database error occurred");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
        },
    }
}

impl IntoResponse for StockRecordApiError {
    fn into_response(self) -> Response {
        match self {
            StockRecordApiError::Upload(UploadStockCsvError::TooLarge) => {
                let error = ErrorResponse::new("PAYLOAD_TOO_LARGE", self.to_string());
                (StatusCode::PAYLOAD_TOO_LARGE, Json(error)).into_response()
            },
            StockRecordApiError::Upload(UploadStockCsvError::Store(ref e))
            | StockRecordApiError::Create(CreateStockRecordError::Store(ref e))
            | StockRecordApiError::DeleteByTicker(DeleteStockRecordsError::Store(ref e))
            | StockRecordApiError::DeleteAll(DeleteAllStockRecordsError::Store(ref e))
            | StockRecordApiError::Count(CountStockRecordsError::Store(ref e))
            | StockRecordApiError::Find(FindStockRecordsError::Store(ref e))
            | StockRecordApiError::FindByQuarter(FindStockRecordsByQuarterError::Store(ref e)) => {
                store_error(e)
            },
            StockRecordApiError::Upload(UploadStockCsvError::InvalidBatchSize) => {
                tracing::error!("Misconfigured ingestion: {}", self);
                let error = ErrorResponse::new("INTERNAL_ERROR", self.to_string());
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },
            StockRecordApiError::Upload(_)
            | StockRecordApiError::Create(_)
            | StockRecordApiError::DeleteByTicker(_)
            | StockRecordApiError::Find(_)
            | StockRecordApiError::FindByQuarter(_) => validation_error(self.to_string()),
        }
    }
}

impl std::fmt::Display for StockRecordApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Upload(e) => write!(f, "{}", e),
            Self::Create(e) => write!(f, "{}", e),
            Self::DeleteByTicker(e) => write!(f, "{}", e),
            Self::DeleteAll(e) => write!(f, "{}", e),
            Self::Count(e) => write!(f, "{}", e),
            Self::Find(e) => write!(f, "{}", e),
            Self::FindByQuarter(e) => write!(f, "{}", e),
        }
    }
}
