//! Ledgerline CLI - value transfer ledger with caller identity

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{caller, config, invoke, ledger, logs, peer};

/// Environment variable controlling diagnostic output
const LOG_ENV: &str = "LEDGERLINE_LOG";

/// Ledgerline - ledger-backed value transfer
#[derive(Parser)]
#[command(name = "ll", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or overwrite two accounts
    Init {
        /// First account key
        key_a: String,
        /// First account balance
        #[arg(allow_hyphen_values = true)]
        amount_a: String,
        /// Second account key
        key_b: String,
        /// Second account balance
        #[arg(allow_hyphen_values = true)]
        amount_b: String,
    },

    /// Move an amount from one account to another
    Transfer {
        /// Source account
        from: String,
        /// Destination account
        to: String,
        /// Amount to move (may be negative)
        #[arg(allow_hyphen_values = true)]
        amount: String,
    },

    /// Remove an account
    Delete {
        /// Account key
        key: String,
    },

    /// Show an account balance
    Query {
        /// Account key
        key: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Resolve the caller's identity through the registrar
    Caller {
        /// Caller certificate (DER or PEM); defaults to the configured one
        #[arg(long)]
        cert: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run an operation by name with raw arguments
    Invoke {
        /// Operation name (initialize, transfer, delete, query, getCallerData)
        operation: String,
        /// Operation arguments
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
        /// Caller certificate for identity operations
        #[arg(long)]
        cert: Option<PathBuf>,
        /// Wrap the outcome as {success, data, error}
        #[arg(long)]
        json: bool,
    },

    /// Manage the registrar peer address
    Peer {
        #[command(subcommand)]
        command: peer::PeerCommands,
    },

    /// Read and edit settings
    Config {
        #[command(subcommand)]
        command: config::ConfigCommands,
    },

    /// View and manage the invocation log
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let result = run(cli);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init { key_a, amount_a, key_b, amount_b } => {
            ledger::init(vec![key_a, amount_a, key_b, amount_b])
        }
        Commands::Transfer { from, to, amount } => ledger::transfer(vec![from, to, amount]),
        Commands::Delete { key } => ledger::delete(key),
        Commands::Query { key, json } => ledger::query(key, json),
        Commands::Caller { cert, json } => caller::run(cert, json),
        Commands::Invoke { operation, args, cert, json } => {
            invoke::run(&operation, args, cert, json)
        }
        Commands::Peer { command } => peer::run(command),
        Commands::Config { command } => config::run(command),
        Commands::Logs { command } => logs::run(command),
    }
}
