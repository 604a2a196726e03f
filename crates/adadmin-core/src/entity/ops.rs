//! Chained entity operations
//!
//! Every operation first checks the sticky slot and returns immediately if
//! the entity already failed. On failure it freezes the error with the kind
//! matching the step that broke:
//!
//! | step                         | kind           |
//! |------------------------------|----------------|
//! | field rules                  | `InvalidInput` |
//! | codec or store resolution    | `InvalidInput` |
//! | store read                   | `NotFound`     |
//! | unmarshal / decode           | `InvalidInput` |
//! | marshal                      | `Internal`     |
//! | store write                  | `Unavailable`  |

use serde_json::Value;

use super::{Entity, Lifecycle};
use crate::error::{self, Error, ErrorKind, Fields, Result, wrap};

fn operation<E: Entity>(step: &str) -> String {
    format!("{}.{}", E::NAME, step)
}

/// Infer a format from a URI's file suffix
///
/// `.yaml`/`.yml` map to "yaml"; `.json` and anything else map to "json".
pub fn format_from_uri(uri: &str) -> &'static str {
    let path = uri.split(['?', '#']).next().unwrap_or_default().to_lowercase();
    if path.ends_with(".yaml") || path.ends_with(".yml") {
        "yaml"
    } else {
        "json"
    }
}

/// Run the entity's field rules
pub fn validate<E: Entity>(entity: &E) {
    if entity.base().is_failed() {
        return;
    }

    match entity.check() {
        Ok(()) => entity.base().advance(Lifecycle::Valid),
        Err(err) => {
            let fields = match &err {
                Error::Invalid { field, .. } => error::field("field", field.as_str()),
                _ => Fields::new(),
            };
            entity.base().set_error(
                operation::<E>("validate"),
                ErrorKind::InvalidInput,
                Some(err),
                fields,
            );
        }
    }
}

/// Read the entity from `uri`, decode it and validate it
///
/// An empty `format` is inferred from the URI suffix.
pub async fn load<E: Entity>(entity: &mut E, uri: &str, format: &str) {
    if entity.base().is_failed() {
        return;
    }
    let op = operation::<E>("load");

    let (store, parsed) = match entity.base().resolve_store(uri) {
        Ok(resolved) => resolved,
        Err(err) => {
            let fields = error::field("uri", uri);
            entity.base().set_error(op, ErrorKind::InvalidInput, Some(err), fields);
            return;
        }
    };

    let raw = match store.load(&parsed).await {
        Ok(raw) => raw,
        Err(err) => {
            let fields = error::field("uri", uri);
            entity.base().set_error(op, ErrorKind::NotFound, Some(err), fields);
            return;
        }
    };

    let format = match format.trim() {
        "" => format_from_uri(uri),
        explicit => explicit,
    };
    if let Err((err, fields)) = decode_into(entity, format, &raw) {
        entity.base().set_error(op, ErrorKind::InvalidInput, Some(err), fields);
        return;
    }

    validate(entity);
    if !entity.base().is_failed() {
        entity.base().advance(Lifecycle::Persisted);
        tracing::debug!("Loaded {} from {}", E::NAME, uri);
    }
}

/// Validate the entity, encode it and write it to `uri`
///
/// An empty `format` falls back to the registry default.
pub async fn save<E: Entity>(entity: &E, uri: &str, format: &str) {
    if entity.base().is_failed() {
        return;
    }
    validate(entity);
    if entity.base().is_failed() {
        return;
    }
    let op = operation::<E>("save");

    let codec = match entity.base().resolve_codec(format) {
        Ok(codec) => codec,
        Err(err) => {
            let fields = error::field("format", format);
            entity.base().set_error(op, ErrorKind::InvalidInput, Some(err), fields);
            return;
        }
    };

    let raw = match serde_json::to_value(entity)
        .map_err(Error::from)
        .and_then(|value| codec.marshal(&value))
    {
        Ok(raw) => raw,
        Err(err) => {
            let fields = error::field("format", codec.format_name());
            entity.base().set_error(op, ErrorKind::Internal, Some(err), fields);
            return;
        }
    };

    let (store, parsed) = match entity.base().resolve_store(uri) {
        Ok(resolved) => resolved,
        Err(err) => {
            let fields = error::field("uri", uri);
            entity.base().set_error(op, ErrorKind::InvalidInput, Some(err), fields);
            return;
        }
    };

    if let Err(err) = store.save(&parsed, &raw).await {
        let fields = error::field("uri", uri);
        entity.base().set_error(op, ErrorKind::Unavailable, Some(err), fields);
        return;
    }

    entity.base().advance(Lifecycle::Persisted);
    tracing::debug!("Saved {} to {} as {}", E::NAME, uri, codec.format_name());
}

/// Encode the entity's fields without touching its state
pub fn serialize<E: Entity>(entity: &E, format: &str) -> Result<Vec<u8>> {
    let op = operation::<E>("serialize");
    let codec = entity
        .base()
        .resolve_codec(format)
        .map_err(|err| wrap(op.as_str(), err, ErrorKind::InvalidInput))?;

    serde_json::to_value(entity)
        .map_err(Error::from)
        .and_then(|value| codec.marshal(&value))
        .map_err(|err| wrap(op.as_str(), err, ErrorKind::Internal))
}

/// Decode `data` into the entity and validate it
pub fn deserialize<E: Entity>(entity: &mut E, format: &str, data: &[u8]) {
    if entity.base().is_failed() {
        return;
    }

    if let Err((err, fields)) = decode_into(entity, format, data) {
        entity.base().set_error(
            operation::<E>("deserialize"),
            ErrorKind::InvalidInput,
            Some(err),
            fields,
        );
        return;
    }

    validate(entity);
}

/// Resolve a codec, unmarshal `data` and overlay it onto the entity
fn decode_into<E: Entity>(
    entity: &mut E,
    format: &str,
    data: &[u8],
) -> std::result::Result<(), (Error, Fields)> {
    let codec = entity
        .base()
        .resolve_codec(format)
        .map_err(|err| (err, error::field("format", format)))?;

    let format_fields = || error::field("format", codec.format_name());
    let decoded = codec.unmarshal(data).map_err(|err| (err, format_fields()))?;
    absorb(entity, decoded).map_err(|err| (err, format_fields()))
}

/// Overlay the top-level keys of `incoming` onto the entity's fields
///
/// Keys missing from `incoming` keep their current values. The entity keeps
/// its own base.
fn absorb<E: Entity>(entity: &mut E, incoming: Value) -> Result<()> {
    let mut current = serde_json::to_value(&*entity)?;

    match (&mut current, incoming) {
        (_, Value::Null) => return Ok(()),
        (Value::Object(fields), Value::Object(overlay)) => {
            for (key, value) in overlay {
                fields.insert(key, value);
            }
        }
        (_, other) => {
            return Err(Error::codec(format!(
                "expected a mapping at document root, found {}",
                json_type(&other)
            )));
        }
    }

    let mut decoded: E = serde_json::from_value(current)?;
    std::mem::swap(decoded.base_mut(), entity.base_mut());
    *entity = decoded;
    Ok(())
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}
