use crate::error::FcError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_DISCORD_CDN_BASE: &str = "https://cdn.discordapp.com/emojis";
pub const DEFAULT_TWEMOJI_BASE: &str =
    "https://cdn.jsdelivr.net/gh/jdecked/twemoji@15.1.0/assets/72x72";

/// Settings for emoji URL derivation, fetching, and caching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Base URL for custom emoji, `{base}/{id}.{gif|png}`.
    pub discord_cdn_base: String,
    /// Base URL for Unicode emoji, `{base}/{codepoints}.png`.
    pub twemoji_base: String,
    /// When false, every fetch fails and emoji are drawn as text.
    pub allow_http_access: bool,
    /// Send a HEAD request before downloading.
    pub probe_with_head: bool,
    pub request_timeout_ms: u64,
    /// Retries on network errors, 5xx, and 429 responses.
    pub max_retries: usize,
    /// Byte budget of the decoded image cache.
    pub cache_max_bytes: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            discord_cdn_base: DEFAULT_DISCORD_CDN_BASE.to_string(),
            twemoji_base: DEFAULT_TWEMOJI_BASE.to_string(),
            allow_http_access: true,
            probe_with_head: false,
            request_timeout_ms: 10_000,
            max_retries: 2,
            cache_max_bytes: 64 * 1024 * 1024,
        }
    }
}

impl ResolverConfig {
    pub fn from_json_str(json: &str) -> Result<Self, FcError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, FcError> {
        let json = std::fs::read_to_string(path).map_err(|err| {
            FcError::Config(serde_json::Error::io(err))
        })?;
        Self::from_json_str(&json)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config =
            ResolverConfig::from_json_str(r#"{"allow_http_access": false, "max_retries": 0}"#)
                .unwrap();
        assert!(!config.allow_http_access);
        assert_eq!(config.max_retries, 0);
        assert_eq!(config.discord_cdn_base, DEFAULT_DISCORD_CDN_BASE);
        assert_eq!(config.cache_max_bytes, 64 * 1024 * 1024);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            ResolverConfig::from_json_str("{not json"),
            Err(FcError::Config(_))
        ));
    }

    #[test]
    fn test_request_timeout() {
        assert_eq!(
            ResolverConfig::default().request_timeout(),
            Duration::from_secs(10)
        );
    }
}
