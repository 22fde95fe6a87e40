//! Test doubles shared by the service tests

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::adapters::MemoryLedgerStore;
use crate::domain::result::{Error, Result};
use crate::ports::{LedgerStore, RegistrarClient};

pub fn args(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

/// Memory store that fails on selected operations
#[derive(Default)]
pub struct FailingStore {
    pub inner: MemoryLedgerStore,
    fail_get: HashSet<String>,
    fail_put: HashSet<String>,
    fail_delete: bool,
    pub puts: AtomicUsize,
}

impl FailingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_get_on(mut self, key: &str) -> Self {
        self.fail_get.insert(key.to_string());
        self
    }

    pub fn fail_put_on(mut self, key: &str) -> Self {
        self.fail_put.insert(key.to_string());
        self
    }

    pub fn fail_delete(mut self) -> Self {
        self.fail_delete = true;
        self
    }
}

impl LedgerStore for FailingStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        if self.fail_get.contains(key) {
            return Err(Error::store("injected read failure"));
        }
        self.inner.get(key)
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if self.fail_put.contains(key) {
            return Err(Error::store("injected write failure"));
        }
        self.inner.put(key, value)
    }

    fn delete(&self, key: &str) -> Result<()> {
        if self.fail_delete {
            return Err(Error::store("injected delete failure"));
        }
        self.inner.delete(key)
    }
}

/// Registrar returning a fixed body and recording who was asked for
#[derive(Default)]
pub struct FakeRegistrar {
    body: Vec<u8>,
    pub calls: Mutex<Vec<(String, String)>>,
}

impl FakeRegistrar {
    pub fn returning(body: impl Into<Vec<u8>>) -> Self {
        Self {
            body: body.into(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or_default()
    }
}

impl RegistrarClient for FakeRegistrar {
    fn fetch_ecert(&self, peer_address: &str, username: &str) -> Result<Vec<u8>> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((peer_address.to_string(), username.to_string()));
        }
        Ok(self.body.clone())
    }
}
