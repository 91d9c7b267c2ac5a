//! Rate limiting middleware.

use actix_web::{
    Error, HttpRequest,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::header::{HeaderMap, HeaderName, HeaderValue},
};
use chrono::{DateTime, Utc};
use futures::future::LocalBoxFuture;
use selah_core::ports::RateLimiter;
use selah_shared::RateLimitExceeded;
use std::future::{Ready, ready};
use std::rc::Rc;
use std::sync::Arc;

use super::error::AppError;
use super::reject;

/// Quota metadata attached to admitted responses.
#[derive(Debug, Clone)]
pub struct QuotaHeaders {
    pub endpoint: String,
    pub limit: u32,
    pub remaining: u32,
    pub reset_at: DateTime<Utc>,
}

impl QuotaHeaders {
    pub fn apply(&self, headers: &mut HeaderMap) {
        headers.insert(
            HeaderName::from_static("x-ratelimit-limit"),
            HeaderValue::from(self.limit),
        );
        headers.insert(
            HeaderName::from_static("x-ratelimit-remaining"),
            HeaderValue::from(self.remaining),
        );
        if let Ok(reset) = HeaderValue::from_str(&self.reset_at.to_rfc3339()) {
            headers.insert(HeaderName::from_static("x-ratelimit-reset"), reset);
        }
        if let Ok(endpoint) = HeaderValue::from_str(&self.endpoint) {
            headers.insert(HeaderName::from_static("x-ratelimit-endpoint"), endpoint);
        }
    }
}

/// Client identifier used for quota accounting: the peer IP, or the
/// proxy-reported address when proxy headers are trusted.
pub fn client_identifier(req: &HttpRequest, trust_proxy_headers: bool) -> String {
    let client = if trust_proxy_headers {
        req.connection_info().realip_remote_addr().map(str::to_string)
    } else {
        req.peer_addr().map(|addr| addr.ip().to_string())
    };

    client.unwrap_or_else(|| "unknown".to_string())
}

/// Count one request against `endpoint` for `client`.
///
/// Returns the quota headers when admitted, `AppError::TooManyRequests`
/// when the window is full.
pub async fn enforce(
    limiter: &dyn RateLimiter,
    endpoint: &str,
    client: &str,
) -> Result<QuotaHeaders, AppError> {
    let decision = limiter.check(endpoint, client).await?;

    if decision.limited {
        tracing::warn!(endpoint, client, reset_at = %decision.reset_at, "Rate limit exceeded");
        let body = RateLimitExceeded::new(
            endpoint,
            decision.reset_at,
            decision.checked_at,
            limiter.policy().describe(),
        );
        return Err(AppError::TooManyRequests(Box::new(body)));
    }

    Ok(QuotaHeaders {
        endpoint: endpoint.to_string(),
        limit: limiter.policy().requests_per_window(),
        remaining: decision.remaining,
        reset_at: decision.reset_at,
    })
}

/// Rate limiting middleware factory for one endpoint identifier.
pub struct RateLimitMiddleware {
    limiter: Arc<dyn RateLimiter>,
    endpoint: Rc<str>,
    trust_proxy_headers: bool,
}

impl RateLimitMiddleware {
    pub fn new(
        limiter: Arc<dyn RateLimiter>,
        endpoint: impl Into<String>,
        trust_proxy_headers: bool,
    ) -> Self {
        Self {
            limiter,
            endpoint: Rc::from(endpoint.into()),
            trust_proxy_headers,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimitMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RateLimitMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddlewareService {
            service: Rc::new(service),
            limiter: self.limiter.clone(),
            endpoint: self.endpoint.clone(),
            trust_proxy_headers: self.trust_proxy_headers,
        }))
    }
}

pub struct RateLimitMiddlewareService<S> {
    service: Rc<S>,
    limiter: Arc<dyn RateLimiter>,
    endpoint: Rc<str>,
    trust_proxy_headers: bool,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let limiter = self.limiter.clone();
        let endpoint = self.endpoint.clone();
        let client = client_identifier(req.request(), self.trust_proxy_headers);

        Box::pin(async move {
            // The check completes before the downstream handler starts.
            let quota = match enforce(limiter.as_ref(), &endpoint, &client).await {
                Ok(quota) => quota,
                Err(error) => return Ok(reject(req, error)),
            };

            let mut res = service.call(req).await?;
            quota.apply(res.headers_mut());
            Ok(res.map_into_left_body())
        })
    }
}
