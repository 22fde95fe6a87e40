//! Logs command - inspect the invocation log
//!
//! Entries carry the operation, the driving command and an error kind.
//! `list` narrows by operation (aliases accepted), `stats` breaks outcomes
//! down per operation.

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use super::get_data_dir;
use crate::output;
use ledgerline_core::services::logging::now_ms;
use ledgerline_core::services::{LogEntry, LogFilter, OperationStats};
use ledgerline_core::{EntryPoint, LoggingService, Operation};

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

#[derive(Subcommand)]
pub enum LogsCommands {
    /// Show recent invocations
    List {
        /// Number of entries to show
        #[arg(short, long, default_value = "50")]
        limit: usize,
        /// Only this operation (e.g. transfer, getCallerData)
        #[arg(long)]
        operation: Option<String>,
        /// Show only failures
        #[arg(long)]
        errors: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete old entries
    Clear {
        /// Delete entries older than N days
        #[arg(long, default_value = "30")]
        older_than_days: u64,
        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Success and failure counts per operation
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(command: LogsCommands) -> Result<()> {
    let data_dir = get_data_dir()?;
    std::fs::create_dir_all(&data_dir)?;
    let service = LoggingService::new(&data_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION"))?;

    match command {
        LogsCommands::List { limit, operation, errors, json } => {
            let mut filter = LogFilter::default();
            if let Some(name) = operation {
                filter = filter.operation(name.parse::<Operation>()?.name());
            }
            if errors {
                filter = filter.errors_only();
            }
            list(&service, &filter, limit, json)
        }
        LogsCommands::Clear { older_than_days, force, json } => {
            clear(&service, older_than_days, force, json)
        }
        LogsCommands::Stats { json } => stats(&service, json),
    }
}

fn list(service: &LoggingService, filter: &LogFilter, limit: usize, json: bool) -> Result<()> {
    let entries = service.entries(filter, limit)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }
    if entries.is_empty() {
        output::info("No matching invocations.");
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["Time", "Operation", "Command", "Outcome"]);
    for entry in &entries {
        table.add_row(vec![
            format_timestamp(entry.timestamp),
            entry.operation.clone().unwrap_or_else(|| entry.event.clone()),
            entry.command.clone().unwrap_or_default(),
            outcome_cell(entry),
        ]);
    }
    println!("{}", table);
    Ok(())
}

fn clear(service: &LoggingService, older_than_days: u64, force: bool, json: bool) -> Result<()> {
    if !force && !json {
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(format!("Delete invocations older than {} days?", older_than_days))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let cutoff_ms = now_ms() - (older_than_days as i64).saturating_mul(DAY_MS);
    let deleted = service.delete_before(cutoff_ms)?;

    if json {
        println!("{}", serde_json::json!({ "deleted": deleted }));
    } else {
        output::success(&format!("Deleted {} entries", deleted));
    }
    Ok(())
}

fn stats(service: &LoggingService, json: bool) -> Result<()> {
    let total = service.count()?;
    let per_operation = service.operation_stats()?;
    let db_path = service.db_path();

    if json {
        println!(
            "{}",
            serde_json::json!({
                "total_entries": total,
                "operations": per_operation,
                "database_path": db_path.to_string_lossy(),
            })
        );
        return Ok(());
    }

    println!("{} ({} entries)", "Invocation log".bold(), total);
    if !per_operation.is_empty() {
        let mut table = output::create_table();
        table.set_header(vec!["Operation", "Succeeded", "Failed", "Failure rate"]);
        for stats in &per_operation {
            table.add_row(vec![
                stats.operation.clone(),
                stats.succeeded.to_string(),
                stats.failed.to_string(),
                format!("{:.1}%", failure_rate(stats)),
            ]);
        }
        println!("{}", table);
    }
    println!("Database: {}", db_path.display());
    Ok(())
}

fn outcome_cell(entry: &LogEntry) -> String {
    match &entry.error_kind {
        Some(kind) => kind.red().to_string(),
        None => "ok".green().to_string(),
    }
}

fn failure_rate(stats: &OperationStats) -> f64 {
    let total = stats.succeeded + stats.failed;
    if total == 0 {
        return 0.0;
    }
    stats.failed as f64 * 100.0 / total as f64
}

fn format_timestamp(timestamp_ms: i64) -> String {
    use chrono::{TimeZone, Utc};
    Utc.timestamp_millis_opt(timestamp_ms)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| timestamp_ms.to_string())
}
