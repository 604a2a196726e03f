// # adadmin-core
//
// Entity persistence core for the AD admin front-end.
//
// ## Architecture Overview
//
// Typed domain records are validated, encoded with a pluggable codec and
// stored through a pluggable store. Any failure is captured once on the
// entity and short-circuits the rest of the chain.
//
// - **Codec**: Trait for byte encodings (JSON, YAML)
// - **Store**: Trait for URI-addressed blob storage (file://, mem://)
// - **Registries**: Read-only format → codec and scheme → store maps
// - **EntityBase**: Per-entity sticky error slot plus registry access
// - **Domain entities**: DirectoryUser, LeaseRecord, FeatureSpec
//
// ## Error Model
//
// Every failure is an `ErrorRecord` carrying the operation name, an
// `ErrorKind`, the cause and structured fields. Boundary layers map the
// kind to a status with `ErrorKind::http_status` and never parse messages.

pub mod codec;
pub mod config;
pub mod domain;
pub mod entity;
pub mod error;
pub mod registry;
pub mod store;
pub mod traits;

// Re-export core types for convenience
pub use config::{CodecConfig, PersistenceConfig, StoreConfig};
pub use domain::{DirectoryUser, FeatureSpec, LeaseRecord};
pub use entity::{Entity, EntityBase, Lifecycle};
pub use error::{Error, ErrorKind, ErrorRecord, Fields, Result, is_kind, wrap};
pub use registry::{CodecRegistry, Registries, StoreRegistry};
pub use traits::{Codec, Store};
