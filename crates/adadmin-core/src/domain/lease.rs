//! DHCP lease record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::rules;
use crate::entity::{Entity, EntityBase, Lifecycle, ops};
use crate::error::{Error, ErrorRecord, Result};
use crate::registry::Registries;

/// A DHCP lease: hardware address, IPv4 address, host name and validity window
#[derive(Debug, Serialize, Deserialize)]
pub struct LeaseRecord {
    #[serde(skip)]
    base: EntityBase,

    /// Record kind, always "DHCPLease" for records created here
    pub kind: String,

    /// Schema version
    pub version: String,

    /// Hardware address
    pub mac: String,

    /// Leased IPv4 address
    pub ip: String,

    /// Host name (single label)
    pub host: String,

    /// Start of the lease, strictly before `end`
    pub start: DateTime<Utc>,

    /// End of the lease
    pub end: DateTime<Utc>,
}

impl LeaseRecord {
    /// Create a lease with empty addresses and an empty validity window
    pub fn new(registries: Arc<Registries>) -> Self {
        Self {
            base: EntityBase::new(registries),
            kind: "DHCPLease".to_string(),
            version: "v1".to_string(),
            mac: String::new(),
            ip: String::new(),
            host: String::new(),
            start: DateTime::<Utc>::default(),
            end: DateTime::<Utc>::default(),
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

impl Entity for LeaseRecord {
    const NAME: &'static str = "lease";

    fn base(&self) -> &EntityBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EntityBase {
        &mut self.base
    }

    fn check(&self) -> Result<()> {
        if !rules::is_mac_address(&self.mac) {
            return Err(Error::invalid("mac", format!("invalid hardware address {:?}", self.mac)));
        }
        if !rules::is_ipv4(&self.ip) {
            return Err(Error::invalid("ip", "must be IPv4"));
        }
        if !rules::is_hostname(&self.host) {
            return Err(Error::invalid("host", "RFC-952/1123 invalid"));
        }
        if self.start >= self.end {
            return Err(Error::invalid("start", "must be before end"));
        }
        Ok(())
    }
}
