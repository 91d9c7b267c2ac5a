//! Application state - shared across all handlers.

use std::sync::Arc;

use selah_core::DomainError;
use selah_core::ports::RateLimiter;
use selah_infra::WindowedRateLimiter;

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub rate_limiter: Arc<dyn RateLimiter>,
    pub endpoints: Arc<[String]>,
    pub api_key: Option<Arc<str>>,
    pub trust_proxy_headers: bool,
}

impl AppState {
    /// Build the application state with the file-backed rate limiter.
    pub async fn new(config: &AppConfig) -> Result<Self, DomainError> {
        let limiter = WindowedRateLimiter::from_config(&config.rate_limit).await?;

        if config.api_key.is_none() {
            tracing::warn!("API_KEY not set. Requests are accepted without an API key.");
        }

        let state = Self::with_limiter(Arc::new(limiter), config);
        tracing::info!(endpoints = ?state.endpoints, "Application state initialized");
        Ok(state)
    }

    pub fn with_limiter(rate_limiter: Arc<dyn RateLimiter>, config: &AppConfig) -> Self {
        Self {
            rate_limiter,
            endpoints: config.endpoints.iter().cloned().collect(),
            api_key: config.api_key.as_deref().map(Arc::from),
            trust_proxy_headers: config.trust_proxy_headers,
        }
    }

    pub fn is_known_endpoint(&self, endpoint: &str) -> bool {
        self.endpoints.iter().any(|e| e == endpoint)
    }
}
