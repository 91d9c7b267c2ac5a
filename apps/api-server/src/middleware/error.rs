//! Error handling middleware - RFC 7807 compliant responses.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use selah_core::ports::RateLimitError;
use selah_shared::{ErrorResponse, RateLimitExceeded};
use std::fmt;

/// Application-level error type that converts to RFC 7807 responses.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    Unauthorized,
    Forbidden,
    TooManyRequests(Box<RateLimitExceeded>),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Unauthorized => write!(f, "Unauthorized"),
            AppError::Forbidden => write!(f, "Forbidden"),
            AppError::TooManyRequests(body) => {
                write!(f, "Rate limit exceeded for endpoint {}", body.endpoint)
            }
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error = match self {
            AppError::NotFound(detail) => ErrorResponse::not_found(detail),
            AppError::Unauthorized => ErrorResponse::unauthorized()
                .with_detail("Please provide an API key in the X-API-Key header."),
            AppError::Forbidden => ErrorResponse::forbidden().with_detail("Invalid API key"),
            AppError::TooManyRequests(body) => {
                let retry_after = body.retry_after_hours * 3600 + body.retry_after_minutes * 60;
                return HttpResponse::TooManyRequests()
                    .insert_header(("X-RateLimit-Remaining", "0"))
                    .insert_header(("X-RateLimit-Reset", body.reset_at.as_str()))
                    .insert_header(("X-RateLimit-Endpoint", body.endpoint.as_str()))
                    .insert_header(("Retry-After", retry_after.to_string()))
                    .json(body);
            }
            AppError::Internal(detail) => {
                // Log internal errors
                tracing::error!("Internal error: {}", detail);
                ErrorResponse::internal_error()
            }
        };

        HttpResponse::build(self.status_code()).json(error)
    }
}

impl From<RateLimitError> for AppError {
    fn from(err: RateLimitError) -> Self {
        AppError::Internal(err.to_string())
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use chrono::{TimeDelta, Utc};

    #[actix_web::test]
    async fn test_too_many_requests_response() {
        let now = Utc::now();
        let body = RateLimitExceeded::new(
            "prayer_petition",
            now + TimeDelta::hours(2),
            now,
            "5 requests per 24 hours",
        );

        let response = AppError::TooManyRequests(Box::new(body)).error_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers().get("Retry-After").unwrap(), "7200");
        assert_eq!(
            response.headers().get("X-RateLimit-Endpoint").unwrap(),
            "prayer_petition"
        );

        let bytes = to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["status"], 429);
        assert_eq!(json["retry_after_hours"], 2);
        assert_eq!(json["limit_description"], "5 requests per 24 hours");
    }

    #[test]
    fn test_invalid_identifier_is_internal() {
        let err = AppError::from(RateLimitError::InvalidIdentifier { field: "client" });
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
