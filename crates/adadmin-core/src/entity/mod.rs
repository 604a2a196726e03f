//! Entity base and lifecycle
//!
//! Every domain entity owns an [`EntityBase`] and exposes it through the
//! [`Entity`] trait. The base gives the entity access to the shared
//! registries and holds its sticky error slot.
//!
//! ## Lifecycle
//!
//! ```text
//! Fresh ──validate──▶ Valid ──save/load──▶ Persisted
//!   │                   │                     │
//!   └───────────────────┴───── any failure ───┴──▶ Failed (terminal)
//! ```
//!
//! Once an entity is `Failed` its first error is frozen and every further
//! operation is an identity no-op.

pub mod ops;

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use url::Url;

use crate::error::{Error, ErrorKind, ErrorRecord, Fields, Result};
use crate::registry::Registries;
use crate::traits::{Codec, Store};

pub use ops::format_from_uri;

/// Lifecycle state of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    /// Constructed, not yet validated
    Fresh,
    /// Validation passed
    Valid,
    /// Successfully saved or loaded
    Persisted,
    /// Sticky error set; terminal
    Failed,
}

#[derive(Debug)]
struct Slot {
    state: Lifecycle,
    error: Option<ErrorRecord>,
}

/// Shared state embedded in every domain entity
///
/// The registries are shared and read-only. The error slot belongs to this
/// entity alone and is guarded by a lock so the "set only if empty" check
/// is atomic even when the same entity is driven from several threads.
pub struct EntityBase {
    registries: Arc<Registries>,
    slot: RwLock<Slot>,
}

impl EntityBase {
    /// Create a fresh base on top of shared registries
    pub fn new(registries: Arc<Registries>) -> Self {
        Self {
            registries,
            slot: RwLock::new(Slot {
                state: Lifecycle::Fresh,
                error: None,
            }),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Slot> {
        self.slot.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Slot> {
        self.slot.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the sticky error
    pub fn error(&self) -> Option<ErrorRecord> {
        self.read().error.clone()
    }

    /// Whether the sticky error is set
    pub fn is_failed(&self) -> bool {
        self.read().error.is_some()
    }

    /// Current lifecycle state
    pub fn state(&self) -> Lifecycle {
        self.read().state
    }

    /// Freeze the first failure
    ///
    /// Does nothing when `cause` is `None` or when an error is already
    /// stored.
    pub fn set_error(
        &self,
        operation: impl Into<String>,
        kind: ErrorKind,
        cause: Option<Error>,
        fields: Fields,
    ) {
        let Some(record) = ErrorRecord::new(operation, kind, cause, fields) else {
            return;
        };

        let mut slot = self.write();
        if slot.error.is_some() {
            tracing::trace!("Ignoring follow-up failure: {}", record);
            return;
        }
        tracing::debug!("Entity failed: {}", record);
        slot.error = Some(record);
        slot.state = Lifecycle::Failed;
    }

    /// Move to `state` unless the entity already failed
    pub(crate) fn advance(&self, state: Lifecycle) {
        let mut slot = self.write();
        if slot.state != Lifecycle::Failed {
            slot.state = state;
        }
    }

    /// The shared registries
    pub fn registries(&self) -> &Arc<Registries> {
        &self.registries
    }

    /// Resolve a codec; an empty format falls back to the default
    pub fn resolve_codec(&self, format: &str) -> Result<Arc<dyn Codec>> {
        self.registries.codecs().resolve(format)
    }

    /// Resolve the store for a URI's scheme
    pub fn resolve_store(&self, uri: &str) -> Result<(Arc<dyn Store>, Url)> {
        self.registries.stores().resolve(uri)
    }
}

/// An empty base: no codecs, no stores, no default format
///
/// Used as the placeholder for the skipped `base` field while decoding.
impl Default for EntityBase {
    fn default() -> Self {
        Self::new(Arc::new(Registries::default()))
    }
}

impl fmt::Debug for EntityBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = self.read();
        f.debug_struct("EntityBase")
            .field("state", &slot.state)
            .field("error", &slot.error.as_ref().map(ToString::to_string))
            .field("registries", &self.registries)
            .finish()
    }
}

/// Capability shared by every domain entity
///
/// Implementors only provide access to their base and their field rules;
/// the chained operations live in [`ops`] and each entity forwards to them.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync {
    /// Prefix of operation names (e.g., "lease" → "lease.save")
    const NAME: &'static str;

    /// The embedded base
    fn base(&self) -> &EntityBase;

    /// The embedded base, mutably
    fn base_mut(&mut self) -> &mut EntityBase;

    /// Run field rules, reporting the first violation
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Every rule holds
    /// - `Err(Error::Invalid)`: The first rule that failed
    fn check(&self) -> Result<()>;
}
