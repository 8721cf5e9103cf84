//! Lifelog processing orchestration.
//!
//! # Responsibility
//! - Fetch the eligible lifelog set, skip ledgered ids, hand new records to
//!   a pluggable handler and ledger them.
//! - Aggregate run statistics and per-record failures.
//!
//! # Invariants
//! - Records are handled strictly sequentially in fetch order; `new_records`
//!   and `errors` keep that order.
//! - A record is ledgered only after its handler succeeded, so failed records
//!   are retried by the next run.
//! - Fetch failures and a closed ledger abort the run; per-record failures
//!   never do.

use crate::api::{ApiError, LifelogSource};
use crate::model::lifelog::Lifelog;
use crate::repo::ledger_repo::{ProcessedLedger, StorageError, StorageResult};
use crate::service::lifelog_service::{FetchOptions, LifelogService};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use std::time::Instant;

/// Error type returned by handlers.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Extension point invoked once per new lifelog.
pub trait LifelogHandler {
    fn handle(&self, lifelog: &Lifelog) -> Result<(), HandlerError>;
}

impl<F> LifelogHandler for F
where
    F: Fn(&Lifelog) -> Result<(), HandlerError>,
{
    fn handle(&self, lifelog: &Lifelog) -> Result<(), HandlerError> {
        self(lifelog)
    }
}

/// Handler that only logs the record and succeeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHandler;

impl LifelogHandler for NoopHandler {
    fn handle(&self, lifelog: &Lifelog) -> Result<(), HandlerError> {
        debug!(
            "event=lifelog_handle module=processor status=ok lifelog_id={} start={} end={} content_nodes={}",
            lifelog.id,
            lifelog.start_time,
            lifelog.end_time,
            lifelog.content_node_count()
        );
        Ok(())
    }
}

/// Non-fatal failure of one record.
#[derive(Debug, thiserror::Error)]
#[error("{message} ({lifelog_id})")]
pub struct ProcessingError {
    pub lifelog_id: String,
    pub message: String,
    #[source]
    pub cause: Option<HandlerError>,
}

impl ProcessingError {
    pub fn new(
        lifelog_id: impl Into<String>,
        message: impl Into<String>,
        cause: Option<HandlerError>,
    ) -> Self {
        Self {
            lifelog_id: lifelog_id.into(),
            message: message.into(),
            cause,
        }
    }
}

/// Failure that aborts a whole run.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("failed to fetch lifelogs: {0}")]
    Fetch(#[from] ApiError),
    #[error("ledger unavailable: {0}")]
    Storage(#[from] StorageError),
}

/// Outcome of one [`LifelogProcessor::run`].
#[derive(Debug, Default)]
pub struct RunResult {
    pub fetched: usize,
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub new_records: Vec<Lifelog>,
    pub errors: Vec<ProcessingError>,
}

impl RunResult {
    pub fn has_failures(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Human-readable summary: one counts line, then one line per error.
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec![format!(
            "fetched={} processed={} skipped={} failed={}",
            self.fetched, self.processed, self.skipped, self.failed
        )];
        for err in &self.errors {
            match &err.cause {
                Some(cause) => lines.push(format!(
                    "error lifelog_id={}: {}: {cause}",
                    err.lifelog_id, err.message
                )),
                None => lines.push(format!("error lifelog_id={}: {}", err.lifelog_id, err.message)),
            }
        }
        lines
    }
}

/// Ledger statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorStats {
    pub total_processed: u64,
    pub last_processed_at: Option<DateTime<Utc>>,
}

/// Orchestrates fetch, dedup, handle and record.
pub struct LifelogProcessor<S, L, H = NoopHandler>
where
    S: LifelogSource,
    L: ProcessedLedger,
    H: LifelogHandler,
{
    service: LifelogService<S>,
    ledger: L,
    handler: H,
    options: FetchOptions,
}

impl<S, L, H> LifelogProcessor<S, L, H>
where
    S: LifelogSource,
    L: ProcessedLedger,
    H: LifelogHandler,
{
    pub fn new(service: LifelogService<S>, ledger: L, handler: H) -> Self {
        Self {
            service,
            ledger,
            handler,
            options: FetchOptions::default(),
        }
    }

    /// Replaces the filters and caps used by `run`.
    pub fn with_options(mut self, options: FetchOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &FetchOptions {
        &self.options
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Runs one fetch-then-process pass.
    ///
    /// # Errors
    /// - `RunError::Fetch` when any page fails; no partial result exists.
    /// - `RunError::Storage` when the ledger is closed.
    pub fn run(&self) -> Result<RunResult, RunError> {
        let started_at = Instant::now();
        info!("event=run module=processor status=start");

        let fetched = self.service.fetch_all(&self.options).map_err(|err| {
            warn!("event=run module=processor status=error stage=fetch error={err}");
            RunError::Fetch(err)
        })?;

        let mut result = RunResult {
            fetched: fetched.len(),
            ..RunResult::default()
        };

        for lifelog in fetched {
            match self.ledger.is_processed(&lifelog.id) {
                Ok(true) => {
                    debug!(
                        "event=lifelog_skip module=processor lifelog_id={}",
                        lifelog.id
                    );
                    result.skipped += 1;
                    continue;
                }
                Ok(false) => {}
                // A ledger that cannot answer membership is unavailable for the whole run.
                Err(err) => return Err(err.into()),
            }

            if let Err(cause) = self.handler.handle(&lifelog) {
                record_failure(&mut result, &lifelog, cause);
                continue;
            }

            match self.ledger.mark_as_processed(&lifelog) {
                Ok(()) => {
                    result.processed += 1;
                    result.new_records.push(lifelog);
                }
                Err(err) if err.is_closed() => return Err(err.into()),
                Err(err) => record_failure(&mut result, &lifelog, Box::new(err)),
            }
        }

        info!(
            "event=run module=processor status=ok duration_ms={} fetched={} processed={} skipped={} failed={}",
            started_at.elapsed().as_millis(),
            result.fetched,
            result.processed,
            result.skipped,
            result.failed
        );
        Ok(result)
    }

    /// Returns ledger totals. Fails once the ledger is closed.
    pub fn get_stats(&self) -> StorageResult<ProcessorStats> {
        Ok(ProcessorStats {
            total_processed: self.ledger.count()?,
            last_processed_at: self.ledger.last_processed_at()?,
        })
    }

    /// Releases the ledger and its storage.
    pub fn close(&mut self) -> StorageResult<()> {
        self.ledger.close()
    }
}

fn record_failure(result: &mut RunResult, lifelog: &Lifelog, cause: HandlerError) {
    warn!(
        "event=lifelog_handle module=processor status=error lifelog_id={} error={}",
        lifelog.id, cause
    );
    result.failed += 1;
    result.errors.push(ProcessingError::new(
        lifelog.id.as_str(),
        format!("Failed to process lifelog: {}", lifelog.title),
        Some(cause),
    ));
}
