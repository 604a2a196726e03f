//! Core traits for the persistence layer
//!
//! This module defines the capabilities that registries dispatch to.
//!
//! - [`Codec`]: Convert records to and from a byte encoding
//! - [`Store`]: Load and save whole blobs behind a URI

pub mod codec;
pub mod store;

pub use codec::Codec;
pub use store::Store;
