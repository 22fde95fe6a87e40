//! Logging service - invocation event log in DuckDB
//!
//! Records one event per invocation outcome in `logs.duckdb`: the operation,
//! the command that drove it and, on failure, the error kind. Error text is
//! never stored since it embeds account keys, amounts and usernames; it goes
//! to `tracing` instead.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, Result};
use duckdb::Connection;
use serde::{Deserialize, Serialize};

use crate::domain::result::Error;
use crate::log_migrations::LOG_MIGRATIONS;
use crate::services::MigrationService;

/// Counter for generating unique IDs within the same millisecond
static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Unique ID: timestamp in the low 48 bits, counter in the high 16
fn generate_id() -> u64 {
    let counter = ID_COUNTER.fetch_add(1, Ordering::Relaxed) & 0xFFFF;
    ((now_ms() as u64) << 16) | counter
}

/// Current unix timestamp in milliseconds
pub fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

fn detect_platform() -> &'static str {
    if cfg!(target_os = "macos") {
        "macos"
    } else if cfg!(target_os = "windows") {
        "windows"
    } else if cfg!(target_os = "linux") {
        "linux"
    } else {
        "unknown"
    }
}

/// Who drove the invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryPoint {
    Cli,
}

impl EntryPoint {
    fn as_str(&self) -> &'static str {
        match self {
            EntryPoint::Cli => "cli",
        }
    }
}

/// A log event to be recorded
#[derive(Debug, Clone, Serialize)]
pub struct LogEvent {
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<&'static str>,
}

impl LogEvent {
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            operation: None,
            command: None,
            error_kind: None,
        }
    }

    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    /// Record a failure by kind only
    pub fn with_error(mut self, error: &Error) -> Self {
        self.error_kind = Some(error.kind());
        self
    }
}

/// A log entry as stored in the database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: u64,
    pub timestamp: i64,
    pub entry_point: String,
    pub app_version: String,
    pub platform: String,
    pub event: String,
    pub operation: Option<String>,
    pub command: Option<String>,
    pub error_kind: Option<String>,
}

/// Outcome counts for one operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationStats {
    pub operation: String,
    pub succeeded: u64,
    pub failed: u64,
}

/// Which entries `entries` returns
#[derive(Debug, Clone, Default)]
pub struct LogFilter {
    pub operation: Option<String>,
    pub errors_only: bool,
}

impl LogFilter {
    pub fn operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    pub fn errors_only(mut self) -> Self {
        self.errors_only = true;
        self
    }
}

/// Service for structured event logging
pub struct LoggingService {
    conn: Mutex<Connection>,
    db_path: PathBuf,
    entry_point: EntryPoint,
    app_version: String,
    platform: &'static str,
}

impl LoggingService {
    /// Open or create `logs.duckdb` in `data_dir` and run pending migrations
    pub fn new(
        data_dir: &Path,
        entry_point: EntryPoint,
        app_version: impl Into<String>,
    ) -> Result<Self> {
        let db_path = data_dir.join("logs.duckdb");
        let conn = Connection::open(&db_path)?;
        MigrationService::new(&conn, LOG_MIGRATIONS).run_pending()?;

        Ok(Self {
            conn: Mutex::new(conn),
            db_path,
            entry_point,
            app_version: app_version.into(),
            platform: detect_platform(),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| anyhow!("Lock poisoned: {}", e))
    }

    /// Record an event; entry point, version and platform are filled in
    pub fn log(&self, event: LogEvent) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            r#"
            INSERT INTO sys_logs (
                id, timestamp, entry_point, app_version, platform,
                event, operation, command, error_kind
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            duckdb::params![
                generate_id(),
                now_ms(),
                self.entry_point.as_str(),
                &self.app_version,
                self.platform,
                &event.event,
                &event.operation,
                &event.command,
                event.error_kind,
            ],
        )?;
        Ok(())
    }

    /// Record the outcome of one invocation
    pub fn log_outcome<T>(
        &self,
        operation: &str,
        command: &str,
        outcome: &crate::domain::result::Result<T>,
    ) -> Result<()> {
        let event = match outcome {
            Ok(_) => LogEvent::new("operation_succeeded"),
            Err(e) => {
                tracing::debug!(%operation, error = %e, "operation failed");
                LogEvent::new("operation_failed").with_error(e)
            }
        };
        self.log(event.with_operation(operation).with_command(command))
    }

    /// Matching entries, most recent first
    pub fn entries(&self, filter: &LogFilter, limit: usize) -> Result<Vec<LogEntry>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, timestamp, entry_point, app_version, platform,
                    event, operation, command, error_kind
             FROM sys_logs
             WHERE (CAST(? AS VARCHAR) IS NULL OR operation = ?)
               AND (NOT CAST(? AS BOOLEAN) OR error_kind IS NOT NULL)
             ORDER BY timestamp DESC, id DESC
             LIMIT ?",
        )?;
        let operation = filter.operation.as_deref();
        let entries = stmt
            .query_map(
                duckdb::params![operation, operation, filter.errors_only, limit as i64],
                |row| {
                    Ok(LogEntry {
                        id: row.get(0)?,
                        timestamp: row.get(1)?,
                        entry_point: row.get(2)?,
                        app_version: row.get(3)?,
                        platform: row.get(4)?,
                        event: row.get(5)?,
                        operation: row.get(6)?,
                        command: row.get(7)?,
                        error_kind: row.get(8)?,
                    })
                },
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Success and failure counts per operation, by name
    pub fn operation_stats(&self) -> Result<Vec<OperationStats>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT operation,
                    COUNT(CASE WHEN error_kind IS NULL THEN 1 END),
                    COUNT(CASE WHEN error_kind IS NOT NULL THEN 1 END)
             FROM sys_logs
             WHERE operation IS NOT NULL
             GROUP BY operation
             ORDER BY operation",
        )?;
        let stats = stmt
            .query_map([], |row| {
                Ok(OperationStats {
                    operation: row.get(0)?,
                    succeeded: row.get::<_, i64>(1)? as u64,
                    failed: row.get::<_, i64>(2)? as u64,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(stats)
    }

    /// Total number of entries
    pub fn count(&self) -> Result<u64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM sys_logs", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Delete entries older than `timestamp_ms`, returning how many went
    pub fn delete_before(&self, timestamp_ms: i64) -> Result<u64> {
        let conn = self.lock()?;
        let deleted = conn.execute("DELETE FROM sys_logs WHERE timestamp < ?", [timestamp_ms])?;
        Ok(deleted as u64)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}
