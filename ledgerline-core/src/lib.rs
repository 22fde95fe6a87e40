//! Ledgerline Core - ledger-backed value transfer with caller identity
//!
//! This crate implements the core domain logic following hexagonal architecture:
//!
//! - **domain**: balances, transfer requests, certificates and caller identity
//! - **ports**: traits for the ledger store and the registrar service
//! - **services**: the contract operations and the invocation event log
//! - **adapters**: DuckDB and in-memory stores, HTTP registrar client

pub mod adapters;
pub mod config;
pub mod domain;
pub mod log_migrations;
pub mod migrations;
pub mod ports;
pub mod services;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use adapters::{DuckDbLedgerStore, HttpRegistrarClient};
use config::Config;
use ports::{LedgerStore, RegistrarClient};
use services::*;

// Re-export commonly used types at crate root
pub use domain::result::{Error, OperationResult, Result};
pub use domain::{AccountBalance, CallerData, InvocationContext, PEER_ADDRESS_KEY};
pub use services::{EntryPoint, LogEvent, LoggingService, Operation};

/// File name of the ledger database inside the data directory
pub const LEDGER_DB_FILE: &str = "ledger.duckdb";

/// Main context for Ledgerline operations
///
/// Holds the injected ledger store and registrar client plus the services
/// built on them. The services keep no state of their own between calls.
pub struct LedgerlineContext {
    pub config: Config,
    pub store: Arc<dyn LedgerStore>,
    pub account_service: AccountService,
    pub transfer_service: TransferService,
    pub identity_service: IdentityService,
}

impl LedgerlineContext {
    /// Open the DuckDB ledger in `data_dir` and talk to the registrar over HTTP
    pub fn new(data_dir: &Path) -> anyhow::Result<Self> {
        let config = Config::load(data_dir)?;

        let db_path = data_dir.join(LEDGER_DB_FILE);
        let store = DuckDbLedgerStore::open(&db_path)
            .with_context(|| format!("Failed to open ledger {}", db_path.display()))?;
        store.ensure_schema()?;

        let registrar = HttpRegistrarClient::new(config.registrar_timeout())?;

        Ok(Self::from_parts(config, Arc::new(store), Arc::new(registrar)))
    }

    /// Wire the services around explicit dependencies
    pub fn from_parts(
        config: Config,
        store: Arc<dyn LedgerStore>,
        registrar: Arc<dyn RegistrarClient>,
    ) -> Self {
        Self {
            account_service: AccountService::new(Arc::clone(&store)),
            transfer_service: TransferService::new(Arc::clone(&store)),
            identity_service: IdentityService::new(Arc::clone(&store), registrar),
            config,
            store,
        }
    }

    /// Run one operation by name
    ///
    /// Mutations return an empty payload, `query` returns the stored bytes
    /// and `getCallerData` returns `CallerData` as JSON.
    pub fn invoke(
        &self,
        operation: &str,
        args: &[String],
        ctx: &InvocationContext,
    ) -> Result<Vec<u8>> {
        let operation: Operation = operation.parse()?;
        tracing::debug!(%operation, argc = args.len(), mutation = operation.is_mutation(), "invoke");
        self.run(operation, args, ctx)
    }

    /// Run an already parsed operation
    pub fn run(
        &self,
        operation: Operation,
        args: &[String],
        ctx: &InvocationContext,
    ) -> Result<Vec<u8>> {
        match operation {
            Operation::Initialize => self.account_service.initialize(args).map(|()| Vec::new()),
            Operation::Transfer => self.transfer_service.transfer(args).map(|()| Vec::new()),
            Operation::Delete => self.account_service.delete(args).map(|()| Vec::new()),
            Operation::Query => self.account_service.query(args),
            Operation::GetCallerData => {
                self.identity_service.get_caller_data(ctx)?.to_json_bytes()
            }
        }
    }

    /// Point identity resolution at a registrar (`host:port`)
    pub fn set_peer_address(&self, peer_address: &str) -> Result<()> {
        self.store
            .put(PEER_ADDRESS_KEY, peer_address.as_bytes())
            .map_err(|e| Error::WriteFailed {
                key: PEER_ADDRESS_KEY.to_string(),
                reason: e.to_string(),
            })
    }

    /// Currently configured registrar address, if any
    pub fn peer_address(&self) -> Result<Option<String>> {
        let value = self.store.get(PEER_ADDRESS_KEY).map_err(|e| Error::LookupFailed {
            key: PEER_ADDRESS_KEY.to_string(),
            reason: e.to_string(),
        })?;
        Ok(value.map(|v| String::from_utf8_lossy(&v).into_owned()))
    }
}
