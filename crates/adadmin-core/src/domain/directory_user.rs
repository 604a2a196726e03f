//! Directory user record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

use super::rules;
use crate::entity::{Entity, EntityBase, Lifecycle, ops};
use crate::error::{Error, ErrorRecord, Result};
use crate::registry::Registries;

/// A directory user account
///
/// # Example
///
/// ```rust,no_run
/// use adadmin_core::{DirectoryUser, Registries};
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() {
///     let registries = Arc::new(Registries::builtin("json"));
///
///     let mut user = DirectoryUser::new(registries);
///     user.sam = "jdoe".to_string();
///     user.upn = "jdoe@EXAMPLE.LAN".to_string();
///
///     user.save("file:///var/lib/adadmin/users/jdoe.json", "json").await;
///     if let Some(err) = user.error() {
///         eprintln!("{} ({})", err, err.kind().http_status());
///     }
/// }
/// ```
#[derive(Debug, Serialize, Deserialize)]
pub struct DirectoryUser {
    #[serde(skip)]
    base: EntityBase,

    /// Record kind, always "ADUser" for records created here
    pub kind: String,

    /// Schema version
    pub version: String,

    /// sAMAccountName
    pub sam: String,

    /// userPrincipalName (`user@realm`)
    pub upn: String,

    /// Display name
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub display: String,

    /// Mail address
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub mail: String,

    /// Whether the account is enabled
    pub enabled: bool,

    /// Account expiry
    #[serde(rename = "expiresAt", default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,

    /// Free-form metadata
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub meta: Map<String, Value>,
}

impl DirectoryUser {
    /// Create an enabled user with empty identifiers
    pub fn new(registries: Arc<Registries>) -> Self {
        Self {
            base: EntityBase::new(registries),
            kind: "ADUser".to_string(),
            version: "v1".to_string(),
            sam: String::new(),
            upn: String::new(),
            display: String::new(),
            mail: String::new(),
            enabled: true,
            expires_at: None,
            meta: Map::new(),
        }
    }

    /// Snapshot of the sticky error, if any operation failed
    pub fn error(&self) -> Option<ErrorRecord> {
        self.base.error()
    }

    /// Current lifecycle state
    pub fn state(&self) -> Lifecycle {
        self.base.state()
    }

    /// Check the field rules, freezing the first violation
    pub fn validate(&mut self) -> &mut Self {
        ops::validate(self);
        self
    }

    /// Load from `uri`, inferring the format from its suffix
    pub async fn load(&mut self, uri: &str) -> &mut Self {
        ops::load(self, uri, "").await;
        self
    }

    /// Load from `uri` using an explicit format
    pub async fn load_as(&mut self, uri: &str, format: &str) -> &mut Self {
        ops::load(self, uri, format).await;
        self
    }

    /// Validate and write to `uri`; an empty format uses the registry default
    pub async fn save(&mut self, uri: &str, format: &str) -> &mut Self {
        ops::save(self, uri, format).await;
        self
    }

    /// Encode the current fields without touching the sticky error
    pub fn serialize(&self, format: &str) -> Result<Vec<u8>> {
        ops::serialize(self, format)
    }

    /// Overlay a decoded document onto the fields, then validate
    pub fn deserialize(&mut self, format: &str, data: &[u8]) -> &mut Self {
        ops::deserialize(self, format, data);
        self
    }
}

impl Entity for DirectoryUser {
    const NAME: &'static str = "directory_user";

    fn base(&self) -> &EntityBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EntityBase {
        &mut self.base
    }

    fn check(&self) -> Result<()> {
        if self.sam.trim().is_empty() || !rules::is_identifier(&self.sam) {
            return Err(Error::invalid("sam", "must be 1..64 chars [A-Za-z0-9._-]"));
        }
        if !rules::has_realm(&self.upn) {
            return Err(Error::invalid("upn", "must contain @realm"));
        }
        Ok(())
    }
}
