// # Codec Trait
//
// Converts between an in-memory record and a byte encoding.
//
// ## Contract
//
// Codecs work on the generic `serde_json::Value` tree so that they stay
// object-safe and can be registered behind `Arc<dyn Codec>`. Entities turn
// themselves into a value before marshalling and overlay the decoded value
// onto their fields after unmarshalling.
//
// Codecs are stateless: the same instance is shared by every entity that
// uses a given registry.

use serde_json::Value;

/// Byte encoding capability, registered under its lower-cased format name
pub trait Codec: Send + Sync {
    /// Format name used as the registry key (e.g., "json", "yaml")
    fn format_name(&self) -> &str;

    /// Encode a value into bytes
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<u8>)`: The encoded document
    /// - `Err(Error)`: The value cannot be represented in this format
    fn marshal(&self, value: &Value) -> Result<Vec<u8>, crate::Error>;

    /// Decode bytes into a value
    ///
    /// # Returns
    ///
    /// - `Ok(Value)`: The decoded document (`Value::Null` for an empty one)
    /// - `Err(Error)`: The payload is malformed
    fn unmarshal(&self, bytes: &[u8]) -> Result<Value, crate::Error>;
}
