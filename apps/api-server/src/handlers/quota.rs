//! Read-only quota status.

use actix_web::{HttpRequest, HttpResponse, web};
use selah_shared::{ApiResponse, QuotaResponse};

use crate::middleware::error::{AppError, AppResult};
use crate::middleware::rate_limit::client_identifier;
use crate::state::AppState;

/// GET /api/quota/{endpoint}
///
/// Reports the caller's remaining requests without consuming one.
pub async fn quota_status(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let endpoint = path.into_inner();
    if !state.is_known_endpoint(&endpoint) {
        return Err(AppError::NotFound(format!(
            "No rate-limited endpoint named '{}'",
            endpoint
        )));
    }

    let client = client_identifier(&req, state.trust_proxy_headers);
    let limiter = &state.rate_limiter;

    let quota = QuotaResponse {
        limit: limiter.policy().requests_per_window(),
        remaining: limiter.remaining_requests(&endpoint, &client).await?,
        reset_at: limiter.reset_time(&endpoint, &client).await?.to_rfc3339(),
        limit_description: limiter.policy().describe(),
        endpoint,
    };

    Ok(HttpResponse::Ok().json(ApiResponse::ok(quota)))
}
