//! Generic feature specification record

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

use super::rules;
use crate::entity::{Entity, EntityBase, Lifecycle, ops};
use crate::error::{Error, ErrorRecord, Result};
use crate::registry::Registries;

/// A free-form feature description: string metadata plus arbitrary data
#[derive(Debug, Serialize, Deserialize)]
pub struct FeatureSpec {
    #[serde(skip)]
    base: EntityBase,

    pub kind: String,

    pub version: String,

    /// Identifier-keyed string metadata
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub meta: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub data: Map<String, Value>,
}

impl FeatureSpec {
    /// Create an empty feature specification
    pub fn new(registries: Arc<Registries>) -> Self {
        Self {
            base: EntityBase::new(registries),
            kind: "FeatureSpec".to_string(),
            version: "v1".to_string(),
            meta: BTreeMap::new(),
            data: Map::new(),
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

impl Entity for FeatureSpec {
    const NAME: &'static str = "feature";

    fn base(&self) -> &EntityBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EntityBase {
        &mut self.base
    }

    fn check(&self) -> Result<()> {
        if self.version.trim().is_empty() {
            return Err(Error::invalid("version", "must not be empty"));
        }
        if let Some(key) = self.meta.keys().find(|key| !rules::is_identifier(key)) {
            return Err(Error::invalid("meta", format!("key {:?} is not an identifier", key)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, is_kind};
    use serde_json::json;

    fn feature() -> FeatureSpec {
        FeatureSpec::new(Arc::new(Registries::builtin("yaml")))
    }

    #[test]
    fn test_meta_keys_must_be_identifiers() {
        let mut spec = feature();
        spec.meta.insert("module name".to_string(), "auth".to_string());

        let err = spec.validate().error().unwrap();
        assert!(is_kind(&err, ErrorKind::InvalidInput));
        assert_eq!(err.field("field").unwrap(), "meta");
    }

    #[test]
    fn test_deserialize_malformed_yaml() {
        let mut spec = feature();
        spec.deserialize("yaml", b"kind: \"FeatureSpec\nmeta:\n  module: auth\n");

        let err = spec.error().unwrap();
        assert!(is_kind(&err, ErrorKind::InvalidInput));
        assert_eq!(err.operation(), "feature.deserialize");
        assert_eq!(spec.meta.len(), 0);
    }

    #[test]
    fn test_deserialize_rejects_non_mapping() {
        let mut spec = feature();
        spec.deserialize("yaml", b"- just\n- a list\n");

        let err = spec.error().unwrap();
        assert!(is_kind(&err, ErrorKind::InvalidInput));
    }

    #[test]
    fn test_deserialize_empty_document_keeps_fields() {
        let mut spec = feature();
        spec.meta.insert("module".to_string(), "auth".to_string());
        spec.deserialize("yaml", b"");

        assert!(spec.error().is_none());
        assert_eq!(spec.meta["module"], "auth");
    }

    #[test]
    fn test_serialize_unknown_format() {
        let spec = feature();
        let err = spec.serialize("toml").err().unwrap();
        assert!(is_kind(&err, ErrorKind::InvalidInput));
        // Serialization never touches the entity's own state.
        assert!(spec.error().is_none());
        assert_eq!(spec.state(), Lifecycle::Fresh);
    }

    #[test]
    fn test_data_round_trip() {
        let mut spec = feature();
        spec.data.insert("steps".to_string(), json!(["login", "logout"]));
        let raw = spec.serialize("json").unwrap();

        let mut copy = feature();
        copy.deserialize("json", &raw);

        assert!(copy.error().is_none());
        assert_eq!(copy.data["steps"], json!(["login", "logout"]));
    }
}
