//! Ledger store port - key/value state abstraction

use crate::domain::result::Result;

/// Key/value ledger state
///
/// Keys are strings and values are opaque bytes; the store enforces no
/// schema. Implementations must give read-your-writes consistency within
/// one invocation. Isolation between invocations is left to the caller.
pub trait LedgerStore: Send + Sync {
    /// Read the value stored under `key`
    ///
    /// Returns `Ok(None)` when nothing is stored, which is different from
    /// an empty value.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store `value` under `key`, replacing any previous value
    fn put(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Remove `key`. Removing a missing key is not an error.
    fn delete(&self, key: &str) -> Result<()>;
}
