// # Memory Store
//
// In-memory implementation of Store for `mem://` URIs.
//
// ## Purpose
//
// Keeps blobs in a process-local map. Nothing survives a restart. Useful
// for tests and for runs that only need to convert or validate records.
//
// Clones share the same map, so a test can hand one clone to a registry and
// inspect the other.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use url::Url;

use crate::Error;
use crate::traits::Store;

const SCHEME: &str = "mem";

/// In-memory store implementation
///
/// Blobs are keyed by the full URI without its fragment.
///
/// # Example
///
/// ```rust,no_run
/// use adadmin_core::store::MemoryStore;
/// use adadmin_core::traits::Store;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = MemoryStore::new();
///     let uri = url::Url::parse("mem://features/auth.json")?;
///
///     store.save(&uri, b"{}").await?;
///     assert_eq!(store.load(&uri).await?, b"{}");
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryStore {
    /// Create a new empty memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of blobs in the store
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Check if the store is empty
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// List the keys of every stored blob
    pub async fn keys(&self) -> Vec<String> {
        self.inner.read().await.keys().cloned().collect()
    }

    fn key(uri: &Url) -> String {
        let mut uri = uri.clone();
        uri.set_fragment(None);
        uri.into()
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn scheme_name(&self) -> &str {
        SCHEME
    }

    async fn load(&self, uri: &Url) -> Result<Vec<u8>, Error> {
        let key = Self::key(uri);
        let guard = self.inner.read().await;
        guard
            .get(&key)
            .cloned()
            .ok_or_else(|| Error::store(SCHEME, format!("no blob at {}", key)))
    }

    async fn save(&self, uri: &Url, data: &[u8]) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        guard.insert(Self::key(uri), data.to_vec());
        Ok(())
    }
}
