//! Application configuration loaded from environment variables.

use std::env;

use selah_infra::RateLimitConfig;

/// Endpoint identifiers guarded by default, one per LLM route.
pub const DEFAULT_ENDPOINTS: [&str; 5] = [
    "bible_character_chat",
    "bible_verse_explain",
    "feeling_process",
    "feeling_get",
    "prayer_petition",
];

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Expected `X-API-Key` value. `None` disables the check.
    pub api_key: Option<String>,
    /// Identify clients by `X-Forwarded-For`/`Forwarded` instead of the peer address.
    pub trust_proxy_headers: bool,
    pub endpoints: Vec<String>,
    pub rate_limit: RateLimitConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            api_key: None,
            trust_proxy_headers: false,
            endpoints: DEFAULT_ENDPOINTS.iter().map(|e| e.to_string()).collect(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            api_key: env::var("API_KEY").ok().filter(|k| !k.is_empty()),
            trust_proxy_headers: env::var("TRUST_PROXY_HEADERS")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            endpoints: env::var("RATE_LIMITED_ENDPOINTS")
                .map(|v| Self::parse_endpoints(&v))
                .unwrap_or(defaults.endpoints),
            rate_limit: RateLimitConfig::from_env(),
        }
    }

    /// Parse a comma-separated endpoint list.
    /// Identifiers may only contain ASCII letters, digits, `_` and `-`;
    /// anything else is skipped with a warning.
    fn parse_endpoints(raw: &str) -> Vec<String> {
        let mut endpoints: Vec<String> = Vec::new();

        for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let valid = name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
            if !valid {
                tracing::warn!(endpoint = %name, "Ignoring invalid endpoint identifier");
                continue;
            }
            if !endpoints.iter().any(|e| e == name) {
                endpoints.push(name.to_string());
            }
        }

        endpoints
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_endpoints() {
        let endpoints = AppConfig::parse_endpoints(" feeling_get, bad/name ,feeling_get,,prayer-petition ");
        assert_eq!(endpoints, vec!["feeling_get", "prayer-petition"]);
    }

    #[test]
    fn test_defaults_cover_every_route() {
        let config = AppConfig::default();
        assert_eq!(config.endpoints.len(), DEFAULT_ENDPOINTS.len());
        assert_eq!(config.rate_limit.requests_per_window, 5);
        assert!(config.api_key.is_none());
    }
}
