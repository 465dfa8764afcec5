use axum::body::Bytes;
use stocks_ingest::{
    BatchIngestor, IngestError, IngestOptions, RecordStore, StoreError, TracingReporter,
    UploadResult,
};

/// Bulk CSV upload
#[derive(Debug, Clone, Default)]
pub struct UploadStockCsvCommand {
    pub filename: Option<String>,
    /// Raw bytes of the `file` part, `None` when the part was not sent
    pub content: Option<Bytes>,
}

#[derive(Debug, thiserror::Error)]
pub enum UploadStockCsvError {
    #[error("A CSV file is required in the 'file' form field")]
    FileRequired,
    #[error("Upload exceeds the maximum allowed size")]
    TooLarge,
    #[error("Malformed multipart request: {0}")]
    Multipart(String),
    #[error("Unreadable CSV input: {0}")]
    Unreadable(String),
    #[error("Ingest batch size must be at least 1")]
    InvalidBatchSize,
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl From<IngestError> for UploadStockCsvError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::Stream(e) => Self::Unreadable(e.to_string()),
            IngestError::Store(e) => Self::Store(e),
            IngestError::InvalidBatchSize => Self::InvalidBatchSize,
        }
    }
}

impl UploadStockCsvCommand {
    pub fn validate(&self) -> Result<(), UploadStockCsvError> {
        if self.content.is_none() {
            return Err(UploadStockCsvError::FileRequired);
        }
        Ok(())
    }

    pub fn size(&self) -> usize {
        self.content.as_ref().map_or(0, Bytes::len)
    }
}

/// Parse the uploaded file and persist its records
///
/// Rows that cannot be mapped are reported through the log and left out of
/// the summary; they never fail the upload.
#[tracing::instrument(
    skip(store, options, command),
    fields(filename = ?command.filename, size = command.size())
)]
pub async fn handle(
    store: &dyn RecordStore,
    options: IngestOptions,
    command: UploadStockCsvCommand,
) -> Result<UploadResult, UploadStockCsvError> {
    command.validate()?;
    let content = command.content.unwrap_or_default();

    let ingestor = BatchIngestor::new(options);
    let result = ingestor
        .upload(content.as_ref(), store, &TracingReporter)
        .await?;

    tracing::info!(count = result.count, "CSV upload persisted");
    Ok(result)
}
