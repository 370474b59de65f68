use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::ConvertError;

/// Parse an RFC 3339 string into a UTC instant.
pub fn parse(value: &str) -> Result<DateTime<Utc>, ConvertError> {
    let parsed = DateTime::parse_from_rfc3339(value)?;
    Ok(parsed.with_timezone(&Utc))
}

/// Format a UTC instant as an RFC 3339 string with a `Z` suffix.
pub fn format(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Current instant.
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Current instant, RFC 3339 formatted.
pub fn now_str() -> String {
    format(&now())
}
