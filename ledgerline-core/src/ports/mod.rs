//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. The services
//! depend only on these traits, not on concrete implementations.

mod ledger_store;
mod registrar;

pub use ledger_store::LedgerStore;
pub use registrar::RegistrarClient;
