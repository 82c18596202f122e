//! An explicit `Reporter` value (§9 design note) threaded through the
//! pipeline instead of process-global progress/verbosity state: workers
//! and the collector report through this trait, and the caller decides
//! whether that becomes a terminal spinner, plain log lines, or nothing.

/// Progress/status sink for one analysis run.
pub trait Reporter: Send + Sync {
    fn status(&self, worker_id: usize, msg: &str);
    fn progress(&self, done: usize, total: usize);
}

/// A `Reporter` that discards everything; the default for library callers
/// and tests that don't care about progress output.
#[derive(Debug, Default)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn status(&self, _worker_id: usize, _msg: &str) {}
    fn progress(&self, _done: usize, _total: usize) {}
}

/// Reports every call through `tracing`, at debug level for per-worker
/// status and info level for aggregate progress.
#[derive(Debug, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn status(&self, worker_id: usize, msg: &str) {
        tracing::debug!(worker_id, msg);
    }

    fn progress(&self, done: usize, total: usize) {
        tracing::info!(done, total, "analysis progress");
    }
}
