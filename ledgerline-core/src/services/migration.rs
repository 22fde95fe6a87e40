//! Migration service - manages database schema migrations
//!
//! Migrations are SQL files embedded at compile time. Each applied migration
//! is recorded in `sys_migrations`, so running them again is a no-op. The
//! first entry of every set must be `000_migrations.sql`, which creates that
//! table.

use anyhow::{Context, Result};
use duckdb::Connection;

const BOOTSTRAP: &str = "000_migrations.sql";

/// Result of running migrations
#[derive(Debug)]
pub struct MigrationResult {
    /// Names of newly applied migrations
    pub applied: Vec<String>,
    /// Count of migrations that were already applied
    pub already_applied: usize,
}

/// Applies one embedded migration set to a connection
pub struct MigrationService<'a> {
    conn: &'a Connection,
    migrations: &'static [(&'static str, &'static str)],
}

impl<'a> MigrationService<'a> {
    pub fn new(conn: &'a Connection, migrations: &'static [(&'static str, &'static str)]) -> Self {
        Self { conn, migrations }
    }

    /// Run all pending migrations in order
    pub fn run_pending(&self) -> Result<MigrationResult> {
        let mut applied = Vec::new();

        if !self.migrations_table_exists()? {
            if let Some((name, sql)) = self.migrations.iter().find(|(n, _)| *n == BOOTSTRAP) {
                self.apply(name, sql)?;
                applied.push(name.to_string());
            }
        }

        let recorded = self.get_applied()?;
        let already_applied = recorded.len() - applied.len();

        for (name, sql) in self.migrations.iter() {
            if recorded.iter().any(|r| r == name) {
                continue;
            }
            self.apply(name, sql)?;
            applied.push(name.to_string());
        }

        Ok(MigrationResult {
            applied,
            already_applied,
        })
    }

    /// Names of migrations already recorded
    pub fn get_applied(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT migration_name FROM sys_migrations ORDER BY migration_name")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(names)
    }

    /// Names of migrations not yet recorded
    pub fn get_pending(&self) -> Result<Vec<String>> {
        let applied = if self.migrations_table_exists()? {
            self.get_applied()?
        } else {
            Vec::new()
        };
        Ok(self
            .migrations
            .iter()
            .filter(|(name, _)| !applied.iter().any(|a| a == name))
            .map(|(name, _)| name.to_string())
            .collect())
    }

    fn migrations_table_exists(&self) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM information_schema.tables WHERE table_name = 'sys_migrations'",
            [],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn apply(&self, name: &str, sql: &str) -> Result<()> {
        tracing::debug!(migration = name, "applying migration");
        self.conn
            .execute_batch(sql)
            .with_context(|| format!("Migration {} failed", name))?;
        self.conn.execute(
            "INSERT INTO sys_migrations (migration_name) VALUES (?)",
            [name],
        )?;
        Ok(())
    }
}
