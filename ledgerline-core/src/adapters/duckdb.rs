//! DuckDB ledger store implementation

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Result};
use duckdb::{params, Connection};

use crate::domain::result::{Error, Result as DomainResult};
use crate::migrations::MIGRATIONS;
use crate::ports::LedgerStore;
use crate::services::{MigrationResult, MigrationService};

/// Maximum number of attempts when the database file is locked
const MAX_RETRIES: u32 = 5;

/// Initial retry delay in milliseconds (doubles each retry: 50, 100, 200, 400ms)
const INITIAL_RETRY_DELAY_MS: u64 = 50;

/// Check if an error message indicates a file locking issue that should be retried
fn is_retryable_error(err_msg: &str) -> bool {
    let lower = err_msg.to_lowercase();
    // Windows
    lower.contains("being used by another process")
        || lower.contains("cannot access the file")
        // Unix/macOS
        || lower.contains("resource temporarily unavailable")
        || lower.contains("database is locked")
        || lower.contains("file is already open")
        || lower.contains("could not set lock on file")
}

/// Ledger state persisted in a DuckDB file
pub struct DuckDbLedgerStore {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
}

impl DuckDbLedgerStore {
    /// Open (or create) the ledger database at `db_path`
    ///
    /// Another process may hold the file lock briefly (e.g. two CLI
    /// invocations racing), so opening retries with exponential backoff.
    pub fn open(db_path: &Path) -> Result<Self> {
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            match Self::try_open_connection(db_path) {
                Ok(conn) => {
                    return Ok(Self {
                        conn: Mutex::new(conn),
                        db_path: Some(db_path.to_path_buf()),
                    });
                }
                Err(e) => {
                    let err_msg = e.to_string();
                    if is_retryable_error(&err_msg) && attempt < MAX_RETRIES - 1 {
                        let delay =
                            Duration::from_millis(INITIAL_RETRY_DELAY_MS * 2u64.pow(attempt));
                        tracing::warn!(
                            attempt = attempt + 1,
                            max = MAX_RETRIES,
                            delay_ms = delay.as_millis() as u64,
                            "ledger database busy, retrying: {}",
                            err_msg
                        );
                        thread::sleep(delay);
                        last_error = Some(e);
                        continue;
                    }
                    return Err(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| anyhow!("Failed to open database after {} retries", MAX_RETRIES)))
    }

    /// Open a throwaway in-memory ledger
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: Mutex::new(Connection::open_in_memory()?),
            db_path: None,
        })
    }

    fn try_open_connection(db_path: &Path) -> Result<Connection> {
        // Autoloaded extensions are not needed and can fail code signing on macOS
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        Ok(Connection::open_with_flags(db_path, config)?)
    }

    /// Create or upgrade the `ledger_state` table
    pub fn ensure_schema(&self) -> Result<MigrationResult> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| anyhow!("Lock poisoned: {}", e))?;
        MigrationService::new(&conn, MIGRATIONS).run_pending()
    }

    /// Path of the backing file, `None` for in-memory ledgers
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// All keys currently holding a value, sorted
    pub fn keys(&self) -> DomainResult<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT state_key FROM ledger_state ORDER BY state_key")
            .map_err(store_error)?;
        let keys = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(store_error)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(store_error)?;
        Ok(keys)
    }

    fn lock(&self) -> DomainResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| Error::store(format!("Lock poisoned: {}", e)))
    }
}

fn store_error(e: duckdb::Error) -> Error {
    Error::store(e.to_string())
}

impl LedgerStore for DuckDbLedgerStore {
    fn get(&self, key: &str) -> DomainResult<Option<Vec<u8>>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT state_value FROM ledger_state WHERE state_key = ?")
            .map_err(store_error)?;
        let mut rows = stmt.query([key]).map_err(store_error)?;

        match rows.next().map_err(store_error)? {
            Some(row) => Ok(Some(row.get::<_, Vec<u8>>(0).map_err(store_error)?)),
            None => Ok(None),
        }
    }

    fn put(&self, key: &str, value: &[u8]) -> DomainResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO ledger_state (state_key, state_value, updated_at)
             VALUES (?, ?, CURRENT_TIMESTAMP)",
            params![key, value.to_vec()],
        )
        .map_err(store_error)?;
        Ok(())
    }

    fn delete(&self, key: &str) -> DomainResult<()> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM ledger_state WHERE state_key = ?", [key])
            .map_err(store_error)?;
        Ok(())
    }
}
