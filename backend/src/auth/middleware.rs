//! Middleware for protecting authenticated routes.
//!
//! Validates the access token in the `Authorization` header and makes its
//! claims available to the handlers behind it.

use crate::api::common::{
    HttpError, INTERNAL_SERVER_ERROR_MESSAGE, http_error, service_error_to_http,
};
use crate::auth::service::AuthService;
use axum::{
    extract::Request,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};

/// Returns the token of an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// JWT authentication middleware
pub async fn jwt_auth(mut request: Request, next: Next) -> Result<Response, HttpError> {
    let auth = request
        .extensions()
        .get::<AuthService>()
        .cloned()
        .ok_or_else(|| {
            tracing::error!("AuthService extension missing from router");
            http_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                INTERNAL_SERVER_ERROR_MESSAGE,
            )
        })?;

    let token = bearer_token(request.headers())
        .ok_or_else(|| http_error(StatusCode::UNAUTHORIZED, "missing_token", "no token found"))?;

    let claims = auth.authorize(token).map_err(service_error_to_http)?;

    // Add claims to request extensions for use in handlers
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}
