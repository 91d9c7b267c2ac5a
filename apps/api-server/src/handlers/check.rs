//! Pre-flight quota check for the LLM routes.

use actix_web::{HttpResponse, web};
use selah_shared::CheckResponse;

/// POST /api/check/{endpoint}
///
/// Only reached once `RateLimitMiddleware` admitted the request, so the
/// response already carries the quota headers.
pub async fn admitted(path: web::Path<String>) -> HttpResponse {
    HttpResponse::Ok().json(CheckResponse {
        endpoint: path.into_inner(),
        allowed: true,
    })
}
