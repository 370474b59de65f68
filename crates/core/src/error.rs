use thiserror::Error;

/// Errors raised by the record <-> row conversion layer.
///
/// All variants propagate immediately to the caller; nothing is retried
/// or silently defaulted beyond the documented created/updated stamps.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// A required field is missing or has the wrong shape.
    #[error("validation error: {0}")]
    Validation(String),

    /// A mandatory properties entry was absent when indexed-field or
    /// timestamp processing needed it.
    #[error("missing required properties field: {0}")]
    MissingField(String),

    /// Output failed the JSON-compatibility check before row construction.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Geometry could not be decoded from or encoded to its storage form.
    #[error("geometry error: {0}")]
    Geometry(String),

    /// A datetime string was not valid RFC 3339.
    #[error("timestamp parse error: {0}")]
    Timestamp(#[from] chrono::ParseError),

    /// A link href could not be resolved against the base URL.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}
