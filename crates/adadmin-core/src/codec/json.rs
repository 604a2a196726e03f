// # JSON Codec
//
// Pretty-printed JSON with two-space indentation. Field order follows the
// declaration order of the record.

use serde_json::Value;

use crate::Error;
use crate::traits::Codec;

/// JSON codec, registered as "json"
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn format_name(&self) -> &str {
        "json"
    }

    fn marshal(&self, value: &Value) -> Result<Vec<u8>, Error> {
        Ok(serde_json::to_vec_pretty(value)?)
    }

    fn unmarshal(&self, bytes: &[u8]) -> Result<Value, Error> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
