//! Error types for the entity persistence core
//!
//! Two layers live here:
//!
//! - [`Error`]: the low-level cause raised by codecs, stores and registries.
//! - [`ErrorRecord`]: a tagged wrapper carrying an operation name, an
//!   [`ErrorKind`], the underlying cause and structured fields. Boundary
//!   layers map the kind to a status without looking at message text.

use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Structured key/value context attached to an [`ErrorRecord`]
pub type Fields = serde_json::Map<String, serde_json::Value>;

/// Build a single-entry [`Fields`] map
pub fn field(key: impl Into<String>, value: impl Into<serde_json::Value>) -> Fields {
    let mut fields = Fields::new();
    fields.insert(key.into(), value.into());
    fields
}

/// Core error type for the persistence layer
#[derive(Error, Debug)]
pub enum Error {
    /// Filesystem and other I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// URI could not be parsed
    #[error("invalid URI: {0}")]
    Url(#[from] url::ParseError),

    /// Neither an explicit nor a default format was available
    #[error("no format specified")]
    MissingFormat,

    /// No codec registered under the requested format
    #[error("unknown format {0:?}")]
    UnknownFormat(String),

    /// No store registered for the URI scheme
    #[error("no store for scheme {0:?}")]
    UnknownScheme(String),

    /// Store-specific failure
    #[error("store error ({scheme}): {message}")]
    Store {
        /// Scheme of the failing store
        scheme: String,
        /// Error message
        message: String,
    },

    /// Codec-specific failure
    #[error("codec error: {0}")]
    Codec(String),

    /// Field-level validation failure
    #[error("{field}: {message}")]
    Invalid {
        /// Offending field
        field: String,
        /// What the field must satisfy
        message: String,
    },

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// A tagged error record
    #[error(transparent)]
    Record(Box<ErrorRecord>),
}

impl Error {
    /// Create a store error
    pub fn store(scheme: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Store {
            scheme: scheme.into(),
            message: message.into(),
        }
    }

    /// Create a codec error
    pub fn codec(msg: impl Into<String>) -> Self {
        Self::Codec(msg.into())
    }

    /// Create a field validation error
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Kind of the outermost record, if this error is one
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Record(record) => Some(record.kind),
            _ => None,
        }
    }

    /// The outermost record, if this error is one
    pub fn as_record(&self) -> Option<&ErrorRecord> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }
}

impl From<ErrorRecord> for Error {
    fn from(record: ErrorRecord) -> Self {
        Self::Record(Box::new(record))
    }
}

/// Closed set of error categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Malformed request, record, URI or format
    InvalidInput,
    /// Resource absent at load time
    NotFound,
    /// Reserved for collaborators
    Unauthorized,
    /// Reserved for collaborators
    Forbidden,
    /// Reserved for collaborators
    Conflict,
    /// Marshal or invariant failure on already-validated data
    Internal,
    /// Store-side write failure
    Unavailable,
    /// Reserved, propagated from collaborators
    Timeout,
}

impl ErrorKind {
    /// Stable wire code for the kind
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "INVALID_INPUT",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Unauthorized => "UNAUTHORIZED",
            ErrorKind::Forbidden => "FORBIDDEN",
            ErrorKind::Conflict => "CONFLICT",
            ErrorKind::Internal => "INTERNAL",
            ErrorKind::Unavailable => "UNAVAILABLE",
            ErrorKind::Timeout => "TIMEOUT",
        }
    }

    /// HTTP status a transport adapter should answer with
    pub fn http_status(&self) -> u16 {
        match self {
            ErrorKind::InvalidInput => 422,
            ErrorKind::NotFound => 404,
            ErrorKind::Unauthorized => 401,
            ErrorKind::Forbidden => 403,
            ErrorKind::Conflict => 409,
            ErrorKind::Unavailable | ErrorKind::Timeout => 503,
            ErrorKind::Internal => 500,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error tagged with the operation that produced it and its kind
///
/// Records are cheap to clone: the cause is shared.
#[derive(Debug, Clone)]
pub struct ErrorRecord {
    operation: String,
    kind: ErrorKind,
    cause: Arc<Error>,
    fields: Fields,
}

impl ErrorRecord {
    /// Create a record, or `None` when there is no cause to wrap
    pub fn new(
        operation: impl Into<String>,
        kind: ErrorKind,
        cause: Option<Error>,
        fields: Fields,
    ) -> Option<Self> {
        let cause = cause?;
        Some(Self {
            operation: operation.into(),
            kind,
            cause: Arc::new(cause),
            fields,
        })
    }

    /// Name of the operation that failed (may be empty)
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Error category
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Underlying cause
    pub fn cause(&self) -> &Error {
        &self.cause
    }

    /// Structured context
    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Look up one structured field
    pub fn field(&self, key: &str) -> Option<&serde_json::Value> {
        self.fields.get(key)
    }
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.operation.is_empty() {
            write!(f, "{}: {}", self.kind, self.cause)
        } else {
            write!(f, "{} {}: {}", self.operation, self.kind, self.cause)
        }
    }
}

impl StdError for ErrorRecord {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(self.cause.as_ref())
    }
}

/// Tag `cause` with an operation name
///
/// A cause that already is a record keeps its kind and fields; its
/// operation is only filled in when empty. Anything else becomes a new
/// record of `default_kind`.
pub fn wrap(operation: impl Into<String>, cause: impl Into<Error>, default_kind: ErrorKind) -> Error {
    match cause.into() {
        Error::Record(mut record) => {
            if record.operation.is_empty() {
                record.operation = operation.into();
            }
            Error::Record(record)
        }
        other => Error::Record(Box::new(ErrorRecord {
            operation: operation.into(),
            kind: default_kind,
            cause: Arc::new(other),
            fields: Fields::new(),
        })),
    }
}

/// Test whether the first record found in the error chain has `kind`
pub fn is_kind(err: &(dyn StdError + 'static), kind: ErrorKind) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(record) = e.downcast_ref::<ErrorRecord>() {
            return record.kind == kind;
        }
        if let Some(Error::Record(record)) = e.downcast_ref::<Error>() {
            return record.kind == kind;
        }
        current = e.source();
    }
    false
}
