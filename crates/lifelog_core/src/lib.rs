//! Core logic for lifelog sync.
//! Polls the lifelog API, validates records and keeps an idempotent ledger
//! of which records have already been handled.

pub mod api;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use api::{
    ApiError, ApiResult, GetLifelogsParams, LifelogSource, LimitlessClient, SortDirection,
};
pub use config::{AppConfig, ConfigError};
pub use db::{DbError, StorageLocation};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::lifelog::{
    ContentNode, Lifelog, LifelogId, LifelogPage, LifelogsResponse, SpeakerIdentifier,
};
pub use model::validation::{parse_lifelog, parse_lifelogs_response, ValidationError};
pub use repo::ledger_repo::{
    LedgerEntry, ProcessedLedger, SqliteLedger, StorageError, StorageResult,
};
pub use service::lifelog_service::{FetchOptions, LifelogService, API_MAX_PAGE_SIZE};
pub use service::processor::{
    HandlerError, LifelogHandler, LifelogProcessor, NoopHandler, ProcessingError,
    ProcessorStats, RunError, RunResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
