//! HTTP handlers and route configuration.

mod check;
mod health;
mod quota;
mod root;

use actix_web::web;

use crate::middleware::api_key::ApiKeyMiddleware;
use crate::middleware::rate_limit::RateLimitMiddleware;
use crate::state::AppState;

/// Configure all application routes.
///
/// Every configured endpoint identifier gets its own
/// `POST /api/check/{endpoint}` resource behind its own rate limit.
pub fn configure_routes(cfg: &mut web::ServiceConfig, state: &AppState) {
    cfg.route("/api/health", web::get().to(health::health_check))
        .service(
            web::resource("/")
                .wrap(ApiKeyMiddleware::new(state.api_key.clone()))
                .route(web::get().to(root::welcome)),
        )
        .service(
            web::scope("/api")
                .wrap(ApiKeyMiddleware::new(state.api_key.clone()))
                .route("/test", web::get().to(root::smoke_test))
                .route("/quota/{endpoint}", web::get().to(quota::quota_status))
                .configure(|scope| {
                    for endpoint in state.endpoints.iter() {
                        scope.service(
                            web::resource(format!("/check/{{endpoint:{}}}", endpoint))
                                .wrap(RateLimitMiddleware::new(
                                    state.rate_limiter.clone(),
                                    endpoint.as_str(),
                                    state.trust_proxy_headers,
                                ))
                                .route(web::post().to(check::admitted)),
                        );
                    }
                }),
        );
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, http::StatusCode, test};

    use crate::state::test_support::test_state;

    fn peer() -> std::net::SocketAddr {
        "203.0.113.5:41000".parse().unwrap()
    }

    macro_rules! app {
        ($state:expr) => {{
            let state = $state;
            test::init_service(
                App::new()
                    .app_data(web::Data::new(state.clone()))
                    .configure(|cfg| configure_routes(cfg, &state)),
            )
            .await
        }};
    }

    #[actix_web::test]
    async fn test_health_needs_no_key() {
        let app = app!(test_state(Some("secret")).await);

        let req = test::TestRequest::get().uri("/api/health").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);

        let req = test::TestRequest::get().uri("/api/test").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_check_consumes_and_quota_reports() {
        let app = app!(test_state(None).await);

        for _ in 0..2 {
            let req = test::TestRequest::post()
                .uri("/api/check/prayer_petition")
                .peer_addr(peer())
                .to_request();
            let res = test::call_service(&app, req).await;
            assert_eq!(res.status(), StatusCode::OK);
        }

        // Reading the quota twice must not consume anything.
        for _ in 0..2 {
            let req = test::TestRequest::get()
                .uri("/api/quota/prayer_petition")
                .peer_addr(peer())
                .to_request();
            let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

            assert_eq!(body["success"], true);
            assert_eq!(body["data"]["remaining"], 3);
            assert_eq!(body["data"]["limit"], 5);
            assert_eq!(body["data"]["limit_description"], "5 requests per 24 hours");
        }
    }

    #[actix_web::test]
    async fn test_check_limits_after_quota() {
        let app = app!(test_state(None).await);

        for _ in 0..5 {
            let req = test::TestRequest::post()
                .uri("/api/check/feeling_get")
                .peer_addr(peer())
                .to_request();
            let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
            assert_eq!(body["allowed"], true);
            assert_eq!(body["endpoint"], "feeling_get");
        }

        let req = test::TestRequest::post()
            .uri("/api/check/feeling_get")
            .peer_addr(peer())
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);

        // Other endpoints keep their own budget.
        let req = test::TestRequest::post()
            .uri("/api/check/feeling_process")
            .peer_addr(peer())
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_unknown_endpoints_are_not_found() {
        let app = app!(test_state(None).await);

        let req = test::TestRequest::post()
            .uri("/api/check/made_up")
            .peer_addr(peer())
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::get()
            .uri("/api/quota/made_up")
            .peer_addr(peer())
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_welcome_route() {
        let app = app!(test_state(None).await);

        let req = test::TestRequest::get().uri("/").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["message"], "Welcome to Selah API");
    }
}
