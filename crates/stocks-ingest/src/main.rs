//! Stocks Ingest - load a stock CSV export from the command line

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use stocks_common::logging::{init_logging, LogConfig, LogLevel};
use stocks_ingest::{
    BatchIngestor, HeaderMode, IngestOptions, MemoryRecordStore, TracingReporter, UploadResult,
    DEFAULT_BATCH_SIZE,
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "stocks-ingest")]
#[command(author, version, about = "Parse a stock CSV export and print the upload summary")]
struct Cli {
    /// CSV file to ingest
    file: PathBuf,

    /// Records per store call
    #[arg(short, long, env = "INGEST_BATCH_SIZE", default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// Input has no header row; columns follow the fixed layout
    #[arg(long)]
    no_header: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Persist into PostgreSQL instead of memory
    #[cfg(feature = "database")]
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Warn
    };

    // Environment variables take precedence over flags
    let log_config = LogConfig::builder()
        .level(log_level)
        .log_file_prefix("stocks-ingest")
        .build()
        .merge_env()?;
    let _guard = init_logging(&log_config)?;

    let header_mode = if cli.no_header {
        HeaderMode::Positional
    } else {
        HeaderMode::Named
    };
    let options = IngestOptions::default()
        .with_batch_size(cli.batch_size)
        .with_header_mode(header_mode);

    let file = File::open(&cli.file)
        .with_context(|| format!("Failed to open {}", cli.file.display()))?;
    let input = BufReader::new(file);

    info!(file = %cli.file.display(), batch_size = options.batch_size, "Ingesting");
    let summary = upload(&cli, BatchIngestor::new(options), input).await?;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

#[cfg(feature = "database")]
async fn upload(
    cli: &Cli,
    ingestor: BatchIngestor,
    input: BufReader<File>,
) -> Result<UploadResult> {
    use sqlx::postgres::PgPoolOptions;
    use stocks_ingest::PgRecordStore;

    let Some(url) = cli.database_url.as_deref() else {
        let store = MemoryRecordStore::new();
        return Ok(ingestor.upload(input, &store, &TracingReporter).await?);
    };

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(url)
        .await
        .context("Failed to connect to database")?;
    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    let store = PgRecordStore::new(pool);
    Ok(ingestor.upload(input, &store, &TracingReporter).await?)
}

#[cfg(not(feature = "database"))]
async fn upload(
    _cli: &Cli,
    ingestor: BatchIngestor,
    input: BufReader<File>,
) -> Result<UploadResult> {
    let store = MemoryRecordStore::new();
    Ok(ingestor.upload(input, &store, &TracingReporter).await?)
}
