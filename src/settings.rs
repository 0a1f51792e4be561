use std::env;

use serde::{Deserialize, Serialize};

pub const DEFAULT_BUCKET: &str = "/default-bucket";
pub const DEFAULT_BASE_URL: &str = "https://storage.googleapis.com/default-bucket";
pub const DEFAULT_CACHE_CONTROL: &str = "public, max-age=3600";
pub const DEFAULT_SDK_HOST: &str = "localhost:8000";

/// Values the host application hands to `CloudStorage`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Location used when none is given, `/<bucket>[/<prefix>]`.
    pub bucket: String,

    /// Base for public URLs.
    pub base_url: String,

    /// Cache-Control value attached to every write.
    pub default_cache_control: String,

    pub logging_enabled: bool,

    /// Local development server mode.
    pub debug: bool,

    /// host:port of the local development server.
    pub sdk_host: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            bucket: DEFAULT_BUCKET.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            default_cache_control: DEFAULT_CACHE_CONTROL.to_string(),
            logging_enabled: false,
            debug: false,
            sdk_host: DEFAULT_SDK_HOST.to_string(),
        }
    }
}

impl StorageSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            bucket: lookup("GOOGLE_CLOUD_STORAGE_BUCKET").unwrap_or(defaults.bucket),
            base_url: lookup("GOOGLE_CLOUD_STORAGE_URL").unwrap_or(defaults.base_url),
            default_cache_control: lookup("GOOGLE_CLOUD_STORAGE_DEFAULT_CACHE_CONTROL")
                .unwrap_or(defaults.default_cache_control),
            logging_enabled: lookup("GOOGLE_CLOUD_STORAGE_LOGGING")
                .map(|v| parse_flag(&v))
                .unwrap_or(defaults.logging_enabled),
            debug: lookup("GOOGLE_CLOUD_STORAGE_DEBUG")
                .map(|v| parse_flag(&v))
                .unwrap_or(defaults.debug),
            sdk_host: lookup("GOOGLE_CLOUD_STORAGE_SDK_HOST").unwrap_or(defaults.sdk_host),
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
