//! Upload summary and row error reporting

use crate::model::{ParseResult, UploadResult};
use tracing::warn;

/// Number of persisted identifiers echoed back to the uploader.
pub const SAMPLE_ID_LIMIT: usize = 10;

/// Destination for row-level errors
pub trait ErrorReporter: Send + Sync {
    fn report(&self, message: &str);
}

/// Reports each row error as a `warn!` event
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, message: &str) {
        warn!("{}", message);
    }
}

/// Build the bounded upload summary and report every row error
///
/// Errors are passed to `reporter` as `"CSV parse error: row <n>: <cause>"`
/// and never affect the summary.
pub fn summarize(result: &ParseResult, reporter: &dyn ErrorReporter) -> UploadResult {
    for error in &result.errors {
        reporter.report(&format!("CSV parse error: {error}"));
    }

    UploadResult {
        count: result.records.len(),
        sample_ids: result
            .records
            .iter()
            .filter_map(|r| r.id)
            .take(SAMPLE_ID_LIMIT)
            .collect(),
    }
}
