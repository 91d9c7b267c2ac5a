//! Middleware modules.

pub mod api_key;
pub mod error;
pub mod rate_limit;

use actix_web::{
    ResponseError,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
};

use error::AppError;

/// Short-circuit a request with the error's RFC 7807 response.
fn reject<B>(req: ServiceRequest, error: AppError) -> ServiceResponse<EitherBody<B>> {
    let response = error.error_response();
    let (http_req, _payload) = req.into_parts();
    ServiceResponse::new(http_req, response).map_into_right_body()
}
