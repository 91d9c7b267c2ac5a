//! API key middleware - checks the `X-API-Key` header.

use actix_web::{
    Error,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures::future::LocalBoxFuture;
use std::future::{Ready, ready};
use std::sync::Arc;

use super::error::AppError;
use super::reject;

/// Header carrying the client's API key.
pub static API_KEY_HEADER: &str = "X-API-Key";

/// API key middleware factory. With no expected key every request passes.
pub struct ApiKeyMiddleware {
    expected: Option<Arc<str>>,
}

impl ApiKeyMiddleware {
    pub fn new(expected: Option<Arc<str>>) -> Self {
        Self { expected }
    }
}

impl<S, B> Transform<S, ServiceRequest> for ApiKeyMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = ApiKeyMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ApiKeyMiddlewareService {
            service,
            expected: self.expected.clone(),
        }))
    }
}

pub struct ApiKeyMiddlewareService<S> {
    service: S,
    expected: Option<Arc<str>>,
}

impl<S> ApiKeyMiddlewareService<S> {
    fn verify(&self, req: &ServiceRequest) -> Result<(), AppError> {
        let Some(expected) = self.expected.as_deref() else {
            return Ok(());
        };

        let provided = req
            .headers()
            .get(API_KEY_HEADER)
            .ok_or(AppError::Unauthorized)?
            .to_str()
            .map_err(|_| AppError::Forbidden)?;

        if provided != expected {
            tracing::warn!(path = %req.path(), "Rejected request with invalid API key");
            return Err(AppError::Forbidden);
        }

        Ok(())
    }
}

impl<S, B> Service<ServiceRequest> for ApiKeyMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if let Err(error) = self.verify(&req) {
            let response = reject(req, error);
            return Box::pin(async move { Ok(response) });
        }

        let fut = self.service.call(req);
        Box::pin(async move {
            let res = fut.await?;
            Ok(res.map_into_left_body())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, HttpResponse, http::StatusCode, test, web};

    async fn status_with(expected: Option<&str>, provided: Option<&str>) -> StatusCode {
        let app = test::init_service(
            App::new().service(
                web::resource("/")
                    .wrap(ApiKeyMiddleware::new(expected.map(Arc::from)))
                    .route(web::get().to(|| async { HttpResponse::Ok().finish() })),
            ),
        )
        .await;

        let mut req = test::TestRequest::get().uri("/");
        if let Some(key) = provided {
            req = req.insert_header((API_KEY_HEADER, key));
        }
        test::call_service(&app, req.to_request()).await.status()
    }

    #[actix_web::test]
    async fn test_api_key_gate() {
        assert_eq!(status_with(Some("secret"), Some("secret")).await, StatusCode::OK);
        assert_eq!(status_with(Some("secret"), Some("guess")).await, StatusCode::FORBIDDEN);
        assert_eq!(status_with(Some("secret"), None).await, StatusCode::UNAUTHORIZED);
        assert_eq!(status_with(None, None).await, StatusCode::OK);
    }
}
