//! Feature modules implementing the stocks API
//!
//! Each feature is a vertical slice following the CQRS (Command Query
//! Responsibility Segregation) pattern:
//! - `commands/` - Write operations (upload, create, delete)
//! - `queries/` - Read operations (find, count)
//! - `routes.rs` - HTTP route definitions
//!
//! # Features
//!
//! - **stock_records**: bulk CSV upload and record lookups

pub mod stock_records;

use axum::Router;
use std::sync::Arc;
use stocks_ingest::{IngestOptions, RecordStore};

use crate::config::DEFAULT_MAX_UPLOAD_BYTES;

/// Shared state for all feature routes
#[derive(Clone)]
pub struct FeatureState {
    /// Where stock records are persisted
    pub store: Arc<dyn RecordStore>,
    /// Options applied to every bulk upload
    pub ingest: IngestOptions,
    /// Largest accepted bulk upload body
    pub max_upload_bytes: usize,
}

impl FeatureState {
    /// State with default ingestion options and upload limit
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            ingest: IngestOptions::default(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// Creates the API router with all feature routes mounted
///
/// - `/stock-data` - Stock record upload and lookup
pub fn router(state: FeatureState) -> Router<()> {
    Router::new().nest(
        "/stock-data",
        stock_records::stock_records_routes(state.max_upload_bytes).with_state(state),
    )
}
