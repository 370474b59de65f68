use std::env;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// STAC version stamped onto records that arrive without one.
pub const DEFAULT_STAC_VERSION: &str = "1.0.0";

/// Conversion-layer settings.
///
/// Loaded once at process start and handed to each converter at
/// construction. Converters never reach for the environment themselves,
/// so conversions stay pure functions of their arguments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// STAC version tag stamped onto records lacking one.
    pub stac_version: String,
    /// Property paths promoted out of the properties blob into
    /// first-class storage columns (e.g. "datetime", "eo:cloud_cover").
    pub indexed_fields: Vec<String>,
}

impl Settings {
    /// Build settings from environment variables (call `load_dotenv()` first).
    ///
    /// `STAC_INDEXED_FIELDS` is a comma-separated list of property paths;
    /// entries are trimmed and empty entries dropped. The "datetime" field
    /// is always promoted regardless of the variable's contents, since the
    /// datetime column is not optional in storage.
    pub fn from_env() -> Self {
        let raw = env_or("STAC_INDEXED_FIELDS", "datetime");
        let mut indexed_fields: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if !indexed_fields.iter().any(|f| f == "datetime") {
            indexed_fields.insert(0, "datetime".to_string());
        }

        Self {
            stac_version: env_opt("STAC_API_VERSION")
                .unwrap_or_else(|| DEFAULT_STAC_VERSION.to_string()),
            indexed_fields,
        }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Settings loaded:");
        tracing::info!("  stac_version:   {}", self.stac_version);
        tracing::info!("  indexed_fields: {}", self.indexed_fields.join(", "));
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            stac_version: DEFAULT_STAC_VERSION.to_string(),
            indexed_fields: vec!["datetime".to_string()],
        }
    }
}
