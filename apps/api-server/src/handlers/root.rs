use actix_web::HttpResponse;
use serde_json::json;

/// GET /
pub async fn welcome() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "message": "Welcome to Selah API" }))
}

/// GET /api/test
pub async fn smoke_test() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}
