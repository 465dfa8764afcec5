//! Stocks Server Library
//!
//! HTTP API over the stock record ingestion pipeline.
//!
//! # Overview
//!
//! - **Bulk upload**: CSV exports posted as multipart forms are parsed and
//!   persisted in batches through [`stocks_ingest`]
//! - **Lookups**: records by ticker, and by ticker and quarter
//! - **Client identification**: every `/api` request must carry the
//!   configured `X-Client-Id`
//!
//! # Architecture
//!
//! Features are vertical slices following the CQRS (Command Query
//! Responsibility Segregation) pattern:
//!
//! - **Commands** (Write Operations): upload, create, delete
//! - **Queries** (Read Operations): find, count
//!
//! Each slice talks to storage only through [`stocks_ingest::RecordStore`],
//! so the same router runs over PostgreSQL in production and over the
//! in-memory store in tests.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use stocks_ingest::MemoryRecordStore;
//! use stocks_server::{api, config::Config, features::FeatureState};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = Config::load()?;
//! let state = FeatureState::new(Arc::new(MemoryRecordStore::new()));
//! let app = api::create_router(state, &config);
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod features;
pub mod middleware;

pub use error::AppError;
