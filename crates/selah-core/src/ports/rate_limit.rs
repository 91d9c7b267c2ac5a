//! Rate limiting port.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::RateLimitPolicy;

/// Rate limiter trait - per (endpoint, client) quota over a rolling window.
///
/// Storage failures never surface here; implementations log them and keep
/// deciding from memory.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Record a request and report the decision together with the quota
    /// state it left behind.
    async fn check(&self, endpoint: &str, client: &str) -> Result<QuotaDecision, RateLimitError>;

    /// Record a request and report whether it must be rejected.
    /// Returns Ok(false) if admitted, Ok(true) if rate limited.
    async fn is_rate_limited(&self, endpoint: &str, client: &str) -> Result<bool, RateLimitError> {
        Ok(self.check(endpoint, client).await?.limited)
    }

    /// Requests left in the client's current window. Read-only.
    async fn remaining_requests(&self, endpoint: &str, client: &str)
    -> Result<u32, RateLimitError>;

    /// When the client's window resets. Read-only.
    async fn reset_time(&self, endpoint: &str, client: &str)
    -> Result<DateTime<Utc>, RateLimitError>;

    fn policy(&self) -> &RateLimitPolicy;
}

/// Result of one check, read under the same lock that recorded it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaDecision {
    pub limited: bool,
    pub remaining: u32,
    pub reset_at: DateTime<Utc>,
    /// Limiter time the decision was made at.
    pub checked_at: DateTime<Utc>,
}

/// Rate limit errors.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum RateLimitError {
    #[error("Invalid {field}: identifier must not be empty")]
    InvalidIdentifier { field: &'static str },
}

/// Reject blank endpoint or client identifiers.
pub fn validate_identifiers(endpoint: &str, client: &str) -> Result<(), RateLimitError> {
    if endpoint.trim().is_empty() {
        return Err(RateLimitError::InvalidIdentifier { field: "endpoint" });
    }
    if client.trim().is_empty() {
        return Err(RateLimitError::InvalidIdentifier { field: "client" });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_identifiers() {
        assert!(validate_identifiers("feeling_get", "1.2.3.4").is_ok());
        assert_eq!(
            validate_identifiers(" ", "1.2.3.4"),
            Err(RateLimitError::InvalidIdentifier { field: "endpoint" })
        );
        assert_eq!(
            validate_identifiers("feeling_get", ""),
            Err(RateLimitError::InvalidIdentifier { field: "client" })
        );
    }
}
