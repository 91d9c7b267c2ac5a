//! Data Transfer Objects - request/response types for the API.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::response::ErrorResponse;

/// Quota status for one caller on one endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaResponse {
    pub endpoint: String,
    pub limit: u32,
    pub remaining: u32,
    pub reset_at: String,
    pub limit_description: String,
}

/// Body of an admitted pre-flight check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResponse {
    pub endpoint: String,
    pub allowed: bool,
}

/// 429 body: an RFC 7807 problem with retry guidance as extension members.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitExceeded {
    #[serde(flatten)]
    pub problem: ErrorResponse,
    pub endpoint: String,
    pub retry_after_hours: i64,
    pub retry_after_minutes: i64,
    pub reset_at: String,
    pub limit_description: String,
}

impl RateLimitExceeded {
    /// `limit_description` is the policy description, e.g. `"5 requests per 24 hours"`.
    /// The wait is rounded up to the next whole minute.
    pub fn new(
        endpoint: impl Into<String>,
        reset_at: DateTime<Utc>,
        now: DateTime<Utc>,
        limit_description: impl Into<String>,
    ) -> Self {
        let endpoint = endpoint.into();
        let limit_description = limit_description.into();

        let wait = (reset_at - now).max(TimeDelta::zero());
        let total_minutes = (wait.num_seconds() + 59) / 60;
        let hours = total_minutes / 60;
        let minutes = total_minutes % 60;

        let detail = format!(
            "Rate limit exceeded for endpoint '{}'. Limit is {}. Try again in {} hours and {} minutes.",
            endpoint, limit_description, hours, minutes
        );

        Self {
            problem: ErrorResponse::too_many_requests(detail),
            endpoint,
            retry_after_hours: hours,
            retry_after_minutes: minutes,
            reset_at: reset_at.to_rfc3339(),
            limit_description,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_exceeded_breaks_wait_into_hours_and_minutes() {
        let now = Utc.with_ymd_and_hms(2026, 10, 15, 9, 0, 0).unwrap();
        let reset_at = now + TimeDelta::hours(3) + TimeDelta::minutes(11) + TimeDelta::seconds(20);

        let body = RateLimitExceeded::new("feeling_process", reset_at, now, "5 requests per 24 hours");

        assert_eq!(body.retry_after_hours, 3);
        assert_eq!(body.retry_after_minutes, 12);
        assert_eq!(body.problem.status, 429);
        let detail = body.problem.detail.as_deref().unwrap();
        assert!(detail.contains("'feeling_process'"));
        assert!(detail.contains("5 requests per 24 hours"));
    }

    #[test]
    fn test_exceeded_serializes_flat() {
        let now = Utc.with_ymd_and_hms(2026, 10, 15, 9, 0, 0).unwrap();
        let body = RateLimitExceeded::new("feeling_get", now, now, "5 requests per 24 hours");

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["status"], 429);
        assert_eq!(json["title"], "Too Many Requests");
        assert_eq!(json["endpoint"], "feeling_get");
        assert_eq!(json["retry_after_hours"], 0);
        assert_eq!(json["reset_at"], "2026-10-15T09:00:00+00:00");
        assert_eq!(json["limit_description"], "5 requests per 24 hours");
        assert!(json.get("limit").is_none());
    }
}
