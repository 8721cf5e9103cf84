//! Run-once lifelog sync entry point.
//!
//! # Responsibility
//! - Load configuration, open the ledger and run the processor once.
//! - Print a run summary; exit 1 only for run-aborting failures.

use lifelog_core::{
    default_log_level, init_logging, AppConfig, LifelogProcessor, LifelogService,
    LimitlessClient, LogTarget, NoopHandler, SqliteLedger,
};
use log::error;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("event=cli_run module=cli status=error error={message}");
            eprintln!("lifelog-sync: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), String> {
    let config = AppConfig::from_env().map_err(|err| err.to_string())?;

    let level = config
        .log_level
        .as_deref()
        .unwrap_or(default_log_level());
    let target = LogTarget::from_option(config.log_dir.as_deref())?;
    init_logging(level, target)?;

    let client = LimitlessClient::new(config.base_url.as_str(), config.api_key.as_str())
        .map_err(|err| err.to_string())?;
    let ledger = SqliteLedger::open(&config.storage).map_err(|err| err.to_string())?;
    let mut processor = LifelogProcessor::new(LifelogService::new(client), ledger, NoopHandler)
        .with_options(config.fetch.clone());

    let outcome = processor.run();
    let stats = processor.get_stats();
    if let Err(err) = processor.close() {
        eprintln!("lifelog-sync: failed to close ledger: {err}");
    }

    let result = outcome.map_err(|err| err.to_string())?;
    for line in result.summary_lines() {
        println!("{line}");
    }
    match stats {
        Ok(stats) => {
            println!("ledger_total={}", stats.total_processed);
            if let Some(at) = stats.last_processed_at {
                println!("last_processed_at={}", at.to_rfc3339());
            }
        }
        Err(err) => eprintln!("lifelog-sync: failed to read ledger stats: {err}"),
    }

    Ok(())
}
