//! In-memory ledger store
//!
//! Used by tests and by embedders that keep state elsewhere and only need
//! the contract semantics for the duration of one invocation.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use crate::domain::result::{Error, Result};
use crate::ports::LedgerStore;

#[derive(Debug, Default)]
pub struct MemoryLedgerStore {
    state: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populated store
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Vec<u8>>,
    {
        let state = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            state: RwLock::new(state),
        }
    }

    /// Sorted copy of the current state
    pub fn snapshot(&self) -> BTreeMap<String, Vec<u8>> {
        match self.state.read() {
            Ok(state) => state.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            Err(poisoned) => poisoned
                .into_inner()
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }
}

impl LedgerStore for MemoryLedgerStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let state = self
            .state
            .read()
            .map_err(|e| Error::store(format!("Lock poisoned: {}", e)))?;
        Ok(state.get(key).cloned())
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        let mut state = self
            .state
            .write()
            .map_err(|e| Error::store(format!("Lock poisoned: {}", e)))?;
        state.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        let mut state = self
            .state
            .write()
            .map_err(|e| Error::store(format!("Lock poisoned: {}", e)))?;
        state.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_your_writes() {
        let store = MemoryLedgerStore::new();
        assert_eq!(store.get("A").unwrap(), None);

        store.put("A", b"10").unwrap();
        assert_eq!(store.get("A").unwrap(), Some(b"10".to_vec()));

        store.delete("A").unwrap();
        store.delete("A").unwrap();
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn test_with_entries() {
        let store = MemoryLedgerStore::with_entries([("B", "2"), ("A", "1")]);
        let keys: Vec<_> = store.snapshot().into_keys().collect();
        assert_eq!(keys, vec!["A", "B"]);
    }
}
