//! Shared test doubles.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use access_guard::{BackendFault, InMemoryBackend, SecretBackend, SecretData};

/// Backend double that counts every call and can be told to fail.
#[derive(Default)]
pub struct CountingBackend {
    inner: InMemoryBackend,
    reject_auth: bool,
    fail_with: Mutex<Option<BackendFault>>,
    pub auth_calls: AtomicUsize,
    pub reads: AtomicUsize,
    pub writes: AtomicUsize,
    pub deletes: AtomicUsize,
}

impl CountingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting_auth() -> Self {
        Self {
            reject_auth: true,
            ..Self::default()
        }
    }

    pub fn failing(fault: BackendFault) -> Self {
        Self {
            fail_with: Mutex::new(Some(fault)),
            ..Self::default()
        }
    }

    pub fn primitive_calls(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
            + self.writes.load(Ordering::SeqCst)
            + self.deletes.load(Ordering::SeqCst)
    }

    fn injected(&self) -> Result<(), BackendFault> {
        match self.fail_with.lock().unwrap().clone() {
            Some(fault) => Err(fault),
            None => Ok(()),
        }
    }
}

impl SecretBackend for CountingBackend {
    fn authenticate(&self) -> Result<(), BackendFault> {
        self.auth_calls.fetch_add(1, Ordering::SeqCst);
        if self.reject_auth {
            Err(BackendFault::Unauthorized)
        } else {
            Ok(())
        }
    }

    fn read_secret(&self, path: &str) -> Result<SecretData, BackendFault> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.injected()?;
        self.inner.read_secret(path)
    }

    fn write_secret(&self, path: &str, data: &SecretData) -> Result<(), BackendFault> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.injected()?;
        self.inner.write_secret(path, data)
    }

    fn delete_secret(&self, path: &str) -> Result<(), BackendFault> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.injected()?;
        self.inner.delete_secret(path)
    }
}

/// Secret payload shaped like the API-key example.
pub fn api_key(value: &str) -> SecretData {
    SecretData::from([("api_key".to_string(), value.to_string())])
}
