// # YAML Codec

use serde_json::Value;

use crate::Error;
use crate::traits::Codec;

/// YAML codec, registered as "yaml"
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlCodec;

impl Codec for YamlCodec {
    fn format_name(&self) -> &str {
        "yaml"
    }

    fn marshal(&self, value: &Value) -> Result<Vec<u8>, Error> {
        Ok(serde_yaml::to_string(value)?.into_bytes())
    }

    fn unmarshal(&self, bytes: &[u8]) -> Result<Value, Error> {
        // An empty document decodes to null rather than failing.
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        Ok(serde_yaml::from_slice(bytes)?)
    }
}
