//! Test doubles and common fixtures for the persistence contract tests
//!
//! The doubles fail on purpose so each step of the save/load chain can be
//! broken in isolation.

#![allow(dead_code)]

use adadmin_core::codec::{JsonCodec, YamlCodec};
use adadmin_core::error::{Error, Result};
use adadmin_core::store::{FileStore, MemoryStore};
use adadmin_core::traits::{Codec, Store};
use adadmin_core::{DirectoryUser, LeaseRecord, Registries};
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use url::Url;

/// A codec whose marshal always fails (format "broken")
pub struct BrokenCodec;

impl Codec for BrokenCodec {
    fn format_name(&self) -> &str {
        "broken"
    }

    fn marshal(&self, _value: &Value) -> Result<Vec<u8>> {
        Err(Error::codec("marshal refused"))
    }

    fn unmarshal(&self, _bytes: &[u8]) -> Result<Value> {
        Err(Error::codec("unmarshal refused"))
    }
}

/// A store that refuses every write and counts calls (scheme "readonly")
#[derive(Default)]
pub struct ReadOnlyStore {
    save_calls: AtomicUsize,
    load_calls: AtomicUsize,
}

impl ReadOnlyStore {
    pub fn save_calls(&self) -> usize {
        self.save_calls.load(Ordering::SeqCst)
    }

    pub fn load_calls(&self) -> usize {
        self.load_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Store for ReadOnlyStore {
    fn scheme_name(&self) -> &str {
        "readonly"
    }

    async fn load(&self, _uri: &Url) -> Result<Vec<u8>> {
        self.load_calls.fetch_add(1, Ordering::SeqCst);
        Ok(br#"{"sam": "rwerum", "upn": "rwerum@WERUMINGER.LAN"}"#.to_vec())
    }

    async fn save(&self, uri: &Url, _data: &[u8]) -> Result<()> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        Err(Error::store("readonly", format!("write refused for {}", uri)))
    }
}

/// Registries with every built-in plus the failing doubles
pub fn registries_with_doubles(default_format: &str, store: Arc<ReadOnlyStore>) -> Arc<Registries> {
    Arc::new(Registries::new(
        default_format,
        [
            Arc::new(JsonCodec) as Arc<dyn Codec>,
            Arc::new(YamlCodec) as Arc<dyn Codec>,
            Arc::new(BrokenCodec) as Arc<dyn Codec>,
        ],
        [
            Arc::new(FileStore) as Arc<dyn Store>,
            Arc::new(MemoryStore::new()) as Arc<dyn Store>,
            store as Arc<dyn Store>,
        ],
    ))
}

/// `file://` URI for a path
pub fn file_uri(path: &Path) -> String {
    Url::from_file_path(path)
        .expect("absolute path")
        .to_string()
}

/// Second-precision timestamp, so YAML and JSON round trips compare equal
pub fn now() -> DateTime<Utc> {
    DateTime::from_timestamp(Utc::now().timestamp(), 0).expect("timestamp in range")
}

/// A lease that passes validation
pub fn valid_lease(registries: Arc<Registries>) -> LeaseRecord {
    let start = now();
    let mut lease = LeaseRecord::new(registries);
    lease.mac = "bc:24:11:9d:ca:fa".to_string();
    lease.ip = "10.0.10.6".to_string();
    lease.host = "dc1".to_string();
    lease.start = start;
    lease.end = start + Duration::hours(2);
    lease
}

/// A user that passes validation
pub fn valid_user(registries: Arc<Registries>) -> DirectoryUser {
    let mut user = DirectoryUser::new(registries);
    user.sam = "rwerum".to_string();
    user.upn = "rwerum@WERUMINGER.LAN".to_string();
    user.expires_at = Some(now() + Duration::hours(24));
    user
}
