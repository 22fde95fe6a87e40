//! Account service - initialize, delete and query ledger accounts

use std::sync::Arc;

use crate::domain::result::{Error, Result};
use crate::domain::{AccountBalance, Balance};
use crate::ports::LedgerStore;

/// Account lifecycle operations
pub struct AccountService {
    store: Arc<dyn LedgerStore>,
}

impl AccountService {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// `initialize(A, Aval, B, Bval)`
    ///
    /// Both values are validated before anything is written. The two writes
    /// are not atomic: if the second fails, the first stays.
    pub fn initialize(&self, args: &[String]) -> Result<()> {
        Error::check_args(args, 4)?;

        let (a, b) = (&args[0], &args[2]);
        let a_val = Balance::parse_amount(&args[1])?;
        let b_val = Balance::parse_amount(&args[3])?;
        tracing::debug!(a = %a, a_val = a_val.value(), b = %b, b_val = b_val.value(), "initializing accounts");

        write_balance(self.store.as_ref(), a, a_val)?;
        write_balance(self.store.as_ref(), b, b_val)?;
        Ok(())
    }

    /// `delete(A)`. Deleting an account that does not exist succeeds.
    pub fn delete(&self, args: &[String]) -> Result<()> {
        Error::check_args(args, 1)?;
        let key = &args[0];

        self.store.delete(key).map_err(|e| Error::DeleteFailed {
            key: key.clone(),
            reason: e.to_string(),
        })?;
        tracing::debug!(key = %key, "deleted account");
        Ok(())
    }

    /// `query(A)`: the raw stored value
    pub fn query(&self, args: &[String]) -> Result<Vec<u8>> {
        Error::check_args(args, 1)?;
        read_state(self.store.as_ref(), &args[0])
    }

    /// Structured form of `query`
    pub fn query_balance(&self, key: &str) -> Result<AccountBalance> {
        let value = read_state(self.store.as_ref(), key)?;
        let balance = AccountBalance {
            name: key.to_string(),
            amount: String::from_utf8_lossy(&value).into_owned(),
        };
        tracing::debug!(name = %balance.name, amount = %balance.amount, "query response");
        Ok(balance)
    }
}

/// Read a value that must exist
pub(crate) fn read_state(store: &dyn LedgerStore, key: &str) -> Result<Vec<u8>> {
    store
        .get(key)
        .map_err(|e| Error::LookupFailed {
            key: key.to_string(),
            reason: e.to_string(),
        })?
        .ok_or_else(|| Error::AccountNotFound(key.to_string()))
}

/// Read and decode a balance that must exist
pub(crate) fn read_balance(store: &dyn LedgerStore, key: &str) -> Result<Balance> {
    let bytes = read_state(store, key)?;
    Balance::decode(key, &bytes)
}

pub(crate) fn write_balance(store: &dyn LedgerStore, key: &str, balance: Balance) -> Result<()> {
    store
        .put(key, &balance.encode())
        .map_err(|e| Error::WriteFailed {
            key: key.to_string(),
            reason: e.to_string(),
        })
}
