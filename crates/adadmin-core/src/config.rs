//! Configuration types for the persistence layer
//!
//! This module defines which codecs and stores get registered and which
//! format entities fall back to when a caller does not name one.

use serde::{Deserialize, Serialize};
use std::env;

/// Environment variable overriding the default format
pub const DEFAULT_FORMAT_ENV: &str = "ADADMIN_DEFAULT_FORMAT";

/// Persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Format used when an operation does not name one
    #[serde(default = "default_format")]
    pub default_format: String,

    /// Codecs to register, in registration order
    #[serde(default = "default_codecs")]
    pub codecs: Vec<CodecConfig>,

    /// Stores to register, in registration order
    #[serde(default = "default_stores")]
    pub stores: Vec<StoreConfig>,
}

impl PersistenceConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self {
            default_format: default_format(),
            codecs: default_codecs(),
            stores: default_stores(),
        }
    }

    /// Load configuration from environment variables
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> Self {
        let mut config = Self::new();
        if let Ok(format) = env::var(DEFAULT_FORMAT_ENV) {
            config.default_format = format.trim().to_lowercase();
        }
        config
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        let format = self.default_format.trim().to_lowercase();
        if format.is_empty() {
            return Err(crate::Error::config("default format cannot be empty"));
        }

        if !self.codecs.iter().any(|codec| codec.format_name() == format) {
            return Err(crate::Error::config(format!(
                "default format {:?} has no configured codec",
                format
            )));
        }

        if self.stores.is_empty() {
            return Err(crate::Error::config("at least one store must be configured"));
        }

        Ok(())
    }
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Built-in codec selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodecConfig {
    /// Pretty-printed JSON
    Json,
    /// YAML
    Yaml,
}

impl CodecConfig {
    /// Format name the codec registers under
    pub fn format_name(&self) -> &'static str {
        match self {
            CodecConfig::Json => "json",
            CodecConfig::Yaml => "yaml",
        }
    }
}

/// Built-in store selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreConfig {
    /// Filesystem store for `file://` URIs
    File,

    /// Process-local store for `mem://` URIs (not persistent)
    Memory,
}

fn default_format() -> String {
    "json".to_string()
}

fn default_codecs() -> Vec<CodecConfig> {
    vec![CodecConfig::Json, CodecConfig::Yaml]
}

fn default_stores() -> Vec<StoreConfig> {
    vec![StoreConfig::File, StoreConfig::Memory]
}
