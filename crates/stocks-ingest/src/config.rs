//! Ingestion settings

use crate::header::HeaderMode;
use serde::{Deserialize, Serialize};
use stocks_common::{Result, StocksError};

/// Default number of records per store call.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Options fixed for the duration of one ingestion call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestOptions {
    /// Records accumulated before each `save_all`; at least 1
    pub batch_size: usize,
    pub header_mode: HeaderMode,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            header_mode: HeaderMode::Named,
        }
    }
}

impl IngestOptions {
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_header_mode(mut self, header_mode: HeaderMode) -> Self {
        self.header_mode = header_mode;
        self
    }

    /// Read `INGEST_BATCH_SIZE` and `INGEST_HEADER_MODE`, falling back to defaults
    ///
    /// Unlike the server settings, a present but malformed value is an error
    /// rather than silently replaced.
    pub fn from_env() -> Result<Self> {
        let mut options = Self::default();

        if let Ok(value) = std::env::var("INGEST_BATCH_SIZE") {
            options.batch_size = value
                .trim()
                .parse()
                .map_err(|e| StocksError::invalid_env("INGEST_BATCH_SIZE", &value, e))?;
        }
        if let Ok(value) = std::env::var("INGEST_HEADER_MODE") {
            options.header_mode = value
                .parse()
                .map_err(|e: String| StocksError::invalid_env("INGEST_HEADER_MODE", &value, e))?;
        }

        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(StocksError::Config(
                "Ingest batch size must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
