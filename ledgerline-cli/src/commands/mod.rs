//! CLI command implementations

pub mod caller;
pub mod config;
pub mod invoke;
pub mod ledger;
pub mod logs;
pub mod peer;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ledgerline_core::{
    EntryPoint, InvocationContext, LedgerlineContext, LogEvent, LoggingService, Operation,
};

/// Environment variable overriding the data directory
const DATA_DIR_ENV: &str = "LEDGERLINE_DIR";

/// Get the data directory from environment or default
pub fn get_data_dir() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let home = dirs::home_dir().context("Could not find home directory")?;
    Ok(home.join(".ledgerline"))
}

fn ensure_data_dir() -> Result<PathBuf> {
    let data_dir = get_data_dir()?;
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
    Ok(data_dir)
}

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger() -> Option<LoggingService> {
    let data_dir = ensure_data_dir().ok()?;
    match LoggingService::new(&data_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION")) {
        Ok(service) => Some(service),
        Err(e) => {
            tracing::debug!("event log unavailable: {:#}", e);
            None
        }
    }
}

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

/// Open the ledger in the data directory
pub fn get_context() -> Result<LedgerlineContext> {
    let data_dir = ensure_data_dir()?;
    LedgerlineContext::new(&data_dir).context("Failed to initialize ledger context")
}

/// Build the invocation context, reading the caller certificate from
/// `cert` or the configured default
pub fn invocation_context(ctx: &LedgerlineContext, cert: Option<&Path>) -> Result<InvocationContext> {
    let path = cert.or(ctx.config.caller_certificate.as_deref());
    let mut invocation = InvocationContext::new();
    if let Some(path) = path {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read caller certificate {}", path.display()))?;
        invocation = invocation.with_caller_certificate(bytes);
    }
    Ok(invocation)
}

/// Run one operation and record its outcome in the event log
pub fn run_logged(
    ctx: &LedgerlineContext,
    operation: Operation,
    args: &[String],
    invocation: &InvocationContext,
    command: &str,
) -> ledgerline_core::Result<Vec<u8>> {
    let result = ctx.run(operation, args, invocation);
    if let Some(logger) = get_logger() {
        let _ = logger.log_outcome(operation.name(), command, &result);
    }
    result
}
