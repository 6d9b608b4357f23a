//! Shared-secret provisioning for token generation and validation.
//!
//! # Responsibilities
//! - Front the persisted configuration record with a fast in-process cache
//! - Create the 16-byte key lazily, exactly once, via an atomic
//!   create-if-absent against the store
//!
//! # Design Decisions
//! - The persisted store is the single source of truth: a caller that
//!   loses the first-access race must adopt the winner's key, never its
//!   own candidate
//! - Store unavailability propagates; operating without an authoritative
//!   key would silently break all token validation
//! - No rotation: validation always uses the single current key

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use dashmap::DashMap;
use rand::rngs::OsRng;
use rand::RngCore;
use thiserror::Error;

/// Cache and store entry name for the XSRF key.
pub const XSRF_KEY_NAME: &str = "xsrf_key";

/// Length of the generated secret key in bytes.
pub const KEY_LEN: usize = 16;

/// Failure while resolving the shared secret.
#[derive(Debug, Error)]
pub enum KeyStoreError {
    /// The persisted configuration store could not be reached.
    #[error("key store unavailable: {0}")]
    Unavailable(String),
}

/// Persisted configuration record holding named secrets.
///
/// `create_if_absent` must be atomic: when two callers race on first
/// access, exactly one candidate is persisted and both callers observe
/// the same returned bytes.
#[async_trait]
pub trait KeyStore: Send + Sync {
    /// Store `candidate` under `name` unless an entry already exists,
    /// returning the authoritative value either way.
    async fn create_if_absent(&self, name: &str, candidate: &[u8]) -> Result<Vec<u8>, KeyStoreError>;
}

/// In-process [`KeyStore`] for tests and single-node deployments.
#[derive(Default)]
pub struct MemoryKeyStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyStore for MemoryKeyStore {
    async fn create_if_absent(&self, name: &str, candidate: &[u8]) -> Result<Vec<u8>, KeyStoreError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| KeyStoreError::Unavailable("store mutex poisoned".to_string()))?;
        Ok(entries
            .entry(name.to_string())
            .or_insert_with(|| candidate.to_vec())
            .clone())
    }
}

/// Cached provider of the application-wide XSRF key.
pub struct KeyProvider {
    store: Arc<dyn KeyStore>,
    cache: DashMap<&'static str, Vec<u8>>,
}

impl KeyProvider {
    pub fn new(store: Arc<dyn KeyStore>) -> Self {
        Self {
            store,
            cache: DashMap::new(),
        }
    }

    /// Return the shared secret, reading through to the store on a cache
    /// miss and creating the key on first-ever access.
    pub async fn key(&self) -> Result<Vec<u8>, KeyStoreError> {
        if let Some(key) = self.cache.get(XSRF_KEY_NAME) {
            return Ok(key.clone());
        }

        let mut candidate = [0u8; KEY_LEN];
        OsRng.fill_bytes(&mut candidate);
        let key = self.store.create_if_absent(XSRF_KEY_NAME, &candidate).await?;
        tracing::debug!(entry = XSRF_KEY_NAME, "XSRF key cache repopulated from store");
        self.cache.insert(XSRF_KEY_NAME, key.clone());
        Ok(key)
    }

    /// Drop the cached copy; the next access reads back from the store.
    pub fn evict(&self) {
        self.cache.remove(XSRF_KEY_NAME);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingStore;

    #[async_trait]
    impl KeyStore for FailingStore {
        async fn create_if_absent(&self, _: &str, _: &[u8]) -> Result<Vec<u8>, KeyStoreError> {
            Err(KeyStoreError::Unavailable("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_key_created_once_and_cached() {
        let store = Arc::new(MemoryKeyStore::new());
        let provider = KeyProvider::new(store.clone());

        let first = provider.key().await.unwrap();
        assert_eq!(first.len(), KEY_LEN);

        // Cached copy is stable across calls.
        let second = provider.key().await.unwrap();
        assert_eq!(first, second);

        // Eviction repopulates from the store with the same key.
        provider.evict();
        let third = provider.key().await.unwrap();
        assert_eq!(first, third);
    }

    #[tokio::test]
    async fn test_race_losers_adopt_winner_key() {
        let store = Arc::new(MemoryKeyStore::new());
        // Two providers with independent caches simulate two processes
        // racing on first access against one store.
        let a = KeyProvider::new(store.clone());
        let b = KeyProvider::new(store.clone());

        let key_a = a.key().await.unwrap();
        let key_b = b.key().await.unwrap();
        assert_eq!(key_a, key_b);
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let provider = KeyProvider::new(Arc::new(FailingStore));
        assert!(provider.key().await.is_err());
    }
}
