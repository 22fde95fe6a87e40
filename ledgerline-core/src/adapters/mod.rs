//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - DuckDB for the LedgerStore port (persistent ledger file)
//! - In-memory map for the LedgerStore port (tests, embedding)
//! - reqwest HTTP client for the RegistrarClient port

pub mod duckdb;
pub mod memory;
pub mod registrar;

#[cfg(test)]
pub mod registrar_mock;

pub use self::duckdb::DuckDbLedgerStore;
pub use memory::MemoryLedgerStore;
pub use registrar::HttpRegistrarClient;
