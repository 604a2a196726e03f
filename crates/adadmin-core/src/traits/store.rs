// # Store Trait
//
// Defines the byte-level persistence contract behind an entity URI.
//
// ## Purpose
//
// A store maps a URI to a whole-file blob. There are no partial updates and
// no indexing: one blob equals one entity snapshot.
//
// ## Implementations
//
// - `file://`: filesystem-backed (`FileStore`)
// - `mem://`: process-local map (`MemoryStore`)
//
// ## Usage
//
// ```rust,ignore
// let uri = url::Url::parse("file:///var/lib/adadmin/users/jdoe.json")?;
// store.save(&uri, b"{}").await?;
// let raw = store.load(&uri).await?;
// ```

use async_trait::async_trait;
use url::Url;

/// Trait for store implementations
///
/// Stores are registered under their lower-cased scheme name and shared by
/// every entity using the registry, so implementations must be safe to call
/// concurrently.
///
/// Retries and cancellation are not handled here. A store that needs a
/// retry policy owns it; callers bound the overall duration with their own
/// timeout.
#[async_trait]
pub trait Store: Send + Sync {
    /// URI scheme this store serves (e.g., "file")
    fn scheme_name(&self) -> &str;

    /// Read the whole blob at `uri`
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<u8>)`: The stored bytes
    /// - `Err(Error)`: The blob is absent or unreadable
    async fn load(&self, uri: &Url) -> Result<Vec<u8>, crate::Error>;

    /// Replace the whole blob at `uri`
    ///
    /// # Returns
    ///
    /// - `Ok(())`: The blob was written
    /// - `Err(Error)`: The store could not be reached or written
    async fn save(&self, uri: &Url, data: &[u8]) -> Result<(), crate::Error>;
}
