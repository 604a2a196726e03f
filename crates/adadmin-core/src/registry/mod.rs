//! Codec and store registries
//!
//! Registries map a lower-cased format name to a [`Codec`] and a lower-cased
//! URI scheme to a [`Store`]. They are built once from an ordered list of
//! implementations and are read-only afterwards, so a single
//! `Arc<Registries>` can be shared by every entity and every request
//! handler without locking.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use adadmin_core::registry::Registries;
//! use std::sync::Arc;
//!
//! let registries = Arc::new(Registries::builtin("json"));
//!
//! let codec = registries.codecs().resolve("")?;        // falls back to "json"
//! let (store, uri) = registries.stores().resolve("file:///tmp/u.json")?;
//! ```
//!
//! ## Registration order
//!
//! When two implementations report the same key, the one registered last
//! wins.

use crate::codec::{JsonCodec, YamlCodec};
use crate::config::{CodecConfig, PersistenceConfig, StoreConfig};
use crate::error::{Error, ErrorKind, Result, wrap};
use crate::store::{FileStore, MemoryStore};
use crate::traits::{Codec, Store};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use url::Url;

/// Format name → codec
#[derive(Default)]
pub struct CodecRegistry {
    /// Lower-cased format used when a caller passes an empty format
    default_format: String,

    /// Registered codecs
    codecs: HashMap<String, Arc<dyn Codec>>,
}

impl CodecRegistry {
    /// Build a registry from an ordered list of codecs
    ///
    /// # Parameters
    ///
    /// - `default_format`: Format used when a caller does not name one
    /// - `codecs`: Implementations, later entries overwrite earlier ones
    ///   with the same format name
    pub fn new(default_format: &str, codecs: impl IntoIterator<Item = Arc<dyn Codec>>) -> Self {
        let codecs = codecs
            .into_iter()
            .map(|codec| (codec.format_name().to_lowercase(), codec))
            .collect();

        Self {
            default_format: default_format.trim().to_lowercase(),
            codecs,
        }
    }

    /// Find the codec for `requested`, or for the default format when empty
    ///
    /// # Returns
    ///
    /// - `Ok(Arc<dyn Codec>)`: The registered codec
    /// - `Err(Error)`: An `InvalidInput` record when no format can be
    ///   determined or nothing is registered for it
    pub fn resolve(&self, requested: &str) -> Result<Arc<dyn Codec>> {
        let mut format = requested.trim().to_lowercase();
        if format.is_empty() {
            format.clone_from(&self.default_format);
        }
        if format.is_empty() {
            return Err(wrap("codec.resolve", Error::MissingFormat, ErrorKind::InvalidInput));
        }

        tracing::trace!("Resolving codec for format {}", format);
        self.codecs.get(&format).cloned().ok_or_else(|| {
            wrap(
                "codec.resolve",
                Error::UnknownFormat(format),
                ErrorKind::InvalidInput,
            )
        })
    }

    /// The configured default format (lower-cased, may be empty)
    pub fn default_format(&self) -> &str {
        &self.default_format
    }

    /// List all registered format names
    pub fn list_formats(&self) -> Vec<String> {
        self.codecs.keys().cloned().collect()
    }

    /// Check if a format is registered
    pub fn has_format(&self, name: &str) -> bool {
        self.codecs.contains_key(&name.to_lowercase())
    }
}

/// URI scheme → store
#[derive(Default)]
pub struct StoreRegistry {
    /// Registered stores
    stores: HashMap<String, Arc<dyn Store>>,
}

impl StoreRegistry {
    /// Build a registry from an ordered list of stores
    ///
    /// Later entries overwrite earlier ones with the same scheme.
    pub fn new(stores: impl IntoIterator<Item = Arc<dyn Store>>) -> Self {
        let stores = stores
            .into_iter()
            .map(|store| (store.scheme_name().to_lowercase(), store))
            .collect();

        Self { stores }
    }

    /// Find the store serving the scheme of `uri`
    ///
    /// # Returns
    ///
    /// - `Ok((Arc<dyn Store>, Url))`: The store and the parsed URI
    /// - `Err(Error)`: An `InvalidInput` record when the URI does not parse
    ///   or no store serves its scheme
    pub fn resolve(&self, uri: &str) -> Result<(Arc<dyn Store>, Url)> {
        let parsed = Url::parse(uri).map_err(|e| wrap("store.resolve", e, ErrorKind::InvalidInput))?;

        // Url already lower-cases the scheme.
        tracing::trace!("Resolving store for scheme {}", parsed.scheme());
        let store = self.stores.get(parsed.scheme()).cloned().ok_or_else(|| {
            wrap(
                "store.resolve",
                Error::UnknownScheme(parsed.scheme().to_string()),
                ErrorKind::InvalidInput,
            )
        })?;

        Ok((store, parsed))
    }

    /// List all registered schemes
    pub fn list_schemes(&self) -> Vec<String> {
        self.stores.keys().cloned().collect()
    }

    /// Check if a scheme is registered
    pub fn has_scheme(&self, name: &str) -> bool {
        self.stores.contains_key(&name.to_lowercase())
    }
}

/// Both registries, shared read-only by every entity
#[derive(Default)]
pub struct Registries {
    codecs: CodecRegistry,
    stores: StoreRegistry,
}

impl Registries {
    /// Create registries from explicit codec and store lists
    pub fn new(
        default_format: &str,
        codecs: impl IntoIterator<Item = Arc<dyn Codec>>,
        stores: impl IntoIterator<Item = Arc<dyn Store>>,
    ) -> Self {
        Self {
            codecs: CodecRegistry::new(default_format, codecs),
            stores: StoreRegistry::new(stores),
        }
    }

    /// Create registries holding every built-in codec and store
    pub fn builtin(default_format: &str) -> Self {
        Self::new(
            default_format,
            [
                Arc::new(JsonCodec) as Arc<dyn Codec>,
                Arc::new(YamlCodec) as Arc<dyn Codec>,
            ],
            [
                Arc::new(FileStore) as Arc<dyn Store>,
                Arc::new(MemoryStore::new()) as Arc<dyn Store>,
            ],
        )
    }

    /// Create registries from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Registries)`: Registries with the configured codecs and stores
    /// - `Err(Error)`: If the configuration does not validate
    pub fn from_config(config: &PersistenceConfig) -> Result<Self> {
        config.validate()?;

        let codecs = config.codecs.iter().map(|codec| match codec {
            CodecConfig::Json => Arc::new(JsonCodec) as Arc<dyn Codec>,
            CodecConfig::Yaml => Arc::new(YamlCodec) as Arc<dyn Codec>,
        });
        let stores = config.stores.iter().map(|store| match store {
            StoreConfig::File => Arc::new(FileStore) as Arc<dyn Store>,
            StoreConfig::Memory => Arc::new(MemoryStore::new()) as Arc<dyn Store>,
        });

        Ok(Self::new(&config.default_format, codecs, stores))
    }

    /// The codec registry
    pub fn codecs(&self) -> &CodecRegistry {
        &self.codecs
    }

    /// The store registry
    pub fn stores(&self) -> &StoreRegistry {
        &self.stores
    }
}

impl fmt::Debug for Registries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut formats = self.codecs.list_formats();
        formats.sort();
        let mut schemes = self.stores.list_schemes();
        schemes.sort();

        f.debug_struct("Registries")
            .field("default_format", &self.codecs.default_format)
            .field("formats", &formats)
            .field("schemes", &schemes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::is_kind;
    use serde_json::Value;

    struct NamedCodec(&'static str, &'static [u8]);

    impl Codec for NamedCodec {
        fn format_name(&self) -> &str {
            self.0
        }

        fn marshal(&self, _value: &Value) -> Result<Vec<u8>> {
            Ok(self.1.to_vec())
        }

        fn unmarshal(&self, _bytes: &[u8]) -> Result<Value> {
            Ok(Value::Null)
        }
    }

    #[test]
    fn test_codec_registration_is_case_insensitive() {
        let registry = CodecRegistry::new("JSON", [Arc::new(JsonCodec) as Arc<dyn Codec>]);

        assert!(registry.has_format("Json"));
        assert_eq!(registry.default_format(), "json");
        assert!(registry.resolve(" JSON ").is_ok());
    }

    #[test]
    fn test_codec_last_registration_wins() {
        let registry = CodecRegistry::new(
            "x",
            [
                Arc::new(NamedCodec("X", b"first")) as Arc<dyn Codec>,
                Arc::new(NamedCodec("x", b"second")) as Arc<dyn Codec>,
            ],
        );

        assert_eq!(registry.list_formats().len(), 1);
        let codec = registry.resolve("").unwrap();
        assert_eq!(codec.marshal(&Value::Null).unwrap(), b"second");
    }

    #[test]
    fn test_codec_without_any_format() {
        let registry = CodecRegistry::new("", [Arc::new(JsonCodec) as Arc<dyn Codec>]);

        let err = registry.resolve("").err().unwrap();
        assert!(is_kind(&err, ErrorKind::InvalidInput));
        assert!(matches!(err.as_record().unwrap().cause(), Error::MissingFormat));
    }

    #[test]
    fn test_store_resolution() {
        let registries = Registries::builtin("json");

        let (store, uri) = registries.stores().resolve("FILE:///tmp/x/lease.yaml").unwrap();
        assert_eq!(store.scheme_name(), "file");
        assert_eq!(uri.path(), "/tmp/x/lease.yaml");

        let err = registries.stores().resolve("s3://bucket/key").err().unwrap();
        assert!(is_kind(&err, ErrorKind::InvalidInput));
    }

    #[test]
    fn test_registries_from_config() {
        let config = PersistenceConfig {
            default_format: "yaml".to_string(),
            codecs: vec![CodecConfig::Yaml],
            stores: vec![StoreConfig::Memory],
        };

        let registries = Registries::from_config(&config).unwrap();
        assert!(registries.codecs().has_format("yaml"));
        assert!(!registries.codecs().has_format("json"));
        assert!(registries.stores().has_scheme("mem"));
        assert!(!registries.stores().has_scheme("file"));
    }
}
