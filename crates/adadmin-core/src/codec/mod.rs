// # Codec Implementations
//
// Built-in implementations of the Codec trait.

pub mod json;
pub mod yaml;

pub use json::JsonCodec;
pub use yaml::YamlCodec;
