//! Contract Test: Persistence Round Trips
//!
//! This test verifies that validated entities survive save → load and
//! serialize → deserialize unchanged.
//!
//! Constraints verified:
//! - One file per entity snapshot, format inferred from the suffix on load
//! - Field values (timestamps included) are reproduced exactly
//! - Successful chains end in the Persisted state
//! - Concurrent saves of one URI never leave a torn file behind

mod common;

use adadmin_core::store::MemoryStore;
use adadmin_core::traits::{Codec, Store};
use adadmin_core::codec::JsonCodec;
use adadmin_core::{DirectoryUser, FeatureSpec, LeaseRecord, Lifecycle, Registries};
use common::*;
use std::sync::Arc;
use tempfile::tempdir;
use tokio_test::{assert_err, assert_ok};

#[tokio::test]
async fn lease_yaml_save_then_load() {
    let dir = tempdir().unwrap();
    let registries = Arc::new(Registries::builtin("yaml"));
    let uri = file_uri(&dir.path().join("x/lease.yaml"));

    let mut saved = valid_lease(Arc::clone(&registries));
    saved.save(&uri, "yaml").await;
    assert!(saved.error().is_none(), "save err: {:?}", saved.error());
    assert_eq!(saved.state(), Lifecycle::Persisted);

    let on_disk = std::fs::read_to_string(dir.path().join("x/lease.yaml")).unwrap();
    assert!(on_disk.contains("host: dc1"));

    let mut loaded = LeaseRecord::new(registries);
    loaded.load(&uri).await;
    assert!(loaded.error().is_none(), "load err: {:?}", loaded.error());
    assert_eq!(loaded.mac, saved.mac);
    assert_eq!(loaded.ip, saved.ip);
    assert_eq!(loaded.host, saved.host);
    assert_eq!(loaded.start, saved.start);
    assert_eq!(loaded.end, saved.end);
    assert_eq!(loaded.state(), Lifecycle::Persisted);
}

#[tokio::test]
async fn user_json_save_then_load() {
    let dir = tempdir().unwrap();
    let registries = Arc::new(Registries::builtin("json"));
    let uri = file_uri(&dir.path().join("user.json"));

    let mut saved = valid_user(Arc::clone(&registries));
    saved.meta.insert("ou".to_string(), serde_json::json!("staff"));
    saved.save(&uri, "json").await;
    assert!(saved.error().is_none(), "save err: {:?}", saved.error());

    let mut loaded = DirectoryUser::new(registries);
    loaded.load(&uri).await;
    assert!(loaded.error().is_none(), "load err: {:?}", loaded.error());
    assert_eq!(loaded.sam, saved.sam);
    assert_eq!(loaded.upn, saved.upn);
    assert_eq!(loaded.expires_at, saved.expires_at);
    assert_eq!(loaded.meta, saved.meta);
}

#[tokio::test]
async fn explicit_format_overrides_suffix() {
    let store = MemoryStore::new();
    let registries = Arc::new(Registries::new(
        "json",
        [Arc::new(JsonCodec) as Arc<dyn Codec>],
        [Arc::new(store.clone()) as Arc<dyn Store>],
    ));

    let mut saved = FeatureSpec::new(Arc::clone(&registries));
    saved.meta.insert("module".to_string(), "auth".to_string());
    saved.save("mem://features/auth.yaml", "").await;
    assert!(saved.error().is_none());
    assert_eq!(store.len().await, 1);

    // The suffix says yaml, but only json is registered.
    let mut inferred = FeatureSpec::new(Arc::clone(&registries));
    inferred.load("mem://features/auth.yaml").await;
    assert!(inferred.error().is_some());

    let mut explicit = FeatureSpec::new(registries);
    explicit.load_as("mem://features/auth.yaml", "json").await;
    assert!(explicit.error().is_none());
    assert_eq!(explicit.meta["module"], "auth");
}

#[test]
fn serialize_deserialize_round_trip() {
    let registries = Arc::new(Registries::builtin("json"));

    for format in ["json", "yaml"] {
        let original = valid_lease(Arc::clone(&registries));
        let raw = assert_ok!(original.serialize(format));

        let mut copy = LeaseRecord::new(Arc::clone(&registries));
        copy.deserialize(format, &raw);

        assert!(copy.error().is_none(), "{}: {:?}", format, copy.error());
        assert_eq!(copy.kind, original.kind);
        assert_eq!(copy.version, original.version);
        assert_eq!(copy.mac, original.mac);
        assert_eq!(copy.ip, original.ip);
        assert_eq!(copy.host, original.host);
        assert_eq!(copy.start, original.start);
        assert_eq!(copy.end, original.end);
    }
}

#[test]
fn serialize_with_default_format() {
    let registries = Arc::new(Registries::builtin("yaml"));
    let user = valid_user(registries);

    let raw = assert_ok!(user.serialize(""));
    let text = String::from_utf8(raw).unwrap();
    assert!(text.contains("sam: rwerum"));

    assert_err!(user.serialize("bogus"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_feature_saves_leave_a_whole_snapshot() {
    let dir = tempdir().unwrap();
    let registries = Arc::new(Registries::builtin("json"));
    let uri = file_uri(&dir.path().join("features/f.json"));

    for _ in 0..20 {
        let mut handles = Vec::new();
        for i in 0..8 {
            let registries = Arc::clone(&registries);
            let uri = uri.clone();
            handles.push(tokio::spawn(async move {
                let mut spec = FeatureSpec::new(registries);
                let value = if i % 2 == 0 { "a".repeat(2000) } else { "b".to_string() };
                spec.meta.insert("payload".to_string(), value);
                spec.save(&uri, "json").await;
                spec.error()
            }));
        }
        for handle in handles {
            let err = handle.await.unwrap();
            assert!(err.is_none(), "save err: {:?}", err);
        }

        let mut loaded = FeatureSpec::new(Arc::clone(&registries));
        loaded.load(&uri).await;
        assert!(loaded.error().is_none(), "torn snapshot: {:?}", loaded.error());
        let payload = &loaded.meta["payload"];
        assert!(payload.len() == 2000 || payload == "b");
    }

    let entries = std::fs::read_dir(dir.path().join("features")).unwrap().count();
    assert_eq!(entries, 1);
}
