//! Handler functions for authentication-related API endpoints.
//!
//! These functions parse incoming HTTP requests for signup, login, token
//! refresh and logout, delegate to `auth::service`, and translate the outcome
//! into the standard response envelope and refresh cookie.

use crate::api::common::{
    ApiResponse, HttpError, INTERNAL_SERVER_ERROR_MESSAGE, http_error, service_error_to_http,
};
use crate::auth::cookie::RefreshCookie;
use crate::auth::middleware::bearer_token;
use crate::auth::models::*;
use crate::auth::service::AuthService;
use crate::utils::jwt::Claims;
use axum::{
    extract::{Extension, Json, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::Json as ResponseJson,
};

type SessionReply = (HeaderMap, ResponseJson<ApiResponse<TokenResponse>>);

/// Handle account registration request
#[axum::debug_handler]
pub async fn signup(
    Extension(auth): Extension<AuthService>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<ResponseJson<ApiResponse<SignupResponse>>, HttpError> {
    let payload = request_body(payload)?;
    let username = payload.username.clone();

    auth.signup(payload).await.map_err(service_error_to_http)?;

    Ok(ResponseJson(ApiResponse::ok(SignupResponse { username })))
}

/// Handle user login request
#[axum::debug_handler]
pub async fn login(
    Extension(auth): Extension<AuthService>,
    Extension(cookie): Extension<RefreshCookie>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<SessionReply, HttpError> {
    let payload = request_body(payload)?;
    let session = auth.login(payload).await.map_err(service_error_to_http)?;

    session_reply(&cookie, session)
}

/// Handle token refresh request
#[axum::debug_handler]
pub async fn refresh_token(
    Extension(auth): Extension<AuthService>,
    Extension(cookie): Extension<RefreshCookie>,
    headers: HeaderMap,
) -> Result<SessionReply, HttpError> {
    let presented = presented_refresh_token(&cookie, &headers)?;

    let session = auth
        .refresh_token(&presented)
        .await
        .map_err(service_error_to_http)?;

    session_reply(&cookie, session)
}

/// Handle logout request by revoking the refresh session
#[axum::debug_handler]
pub async fn logout(
    Extension(auth): Extension<AuthService>,
    Extension(cookie): Extension<RefreshCookie>,
    headers: HeaderMap,
) -> Result<(HeaderMap, ResponseJson<ApiResponse<()>>), HttpError> {
    let presented = presented_refresh_token(&cookie, &headers)?;

    auth.logout(&presented).await.map_err(service_error_to_http)?;

    let response_headers = cookie.clear_headers().unwrap_or_default();
    let body = ApiResponse {
        success: true,
        data: None,
        message: "Logged out successfully".to_string(),
        error: None,
        timestamp: chrono::Utc::now().to_rfc3339(),
    };

    Ok((response_headers, ResponseJson(body)))
}

/// List every registered username (requires an access token)
#[axum::debug_handler]
pub async fn list_usernames(
    Extension(auth): Extension<AuthService>,
    Extension(claims): Extension<Claims>,
) -> Result<ResponseJson<ApiResponse<UsernamesResponse>>, HttpError> {
    tracing::debug!("Username listing requested by {}", claims.username);

    let usernames = auth.list_usernames().await.map_err(service_error_to_http)?;

    Ok(ResponseJson(ApiResponse::ok(UsernamesResponse { usernames })))
}

/// Unwraps a JSON body, answering malformed input with the standard envelope.
fn request_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, HttpError> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        tracing::debug!("Rejected request body: {}", rejection.body_text());
        http_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "invalid request json format",
        )
    })
}

/// Refresh token from the cookie, falling back to a bearer header.
fn presented_refresh_token(cookie: &RefreshCookie, headers: &HeaderMap) -> Result<String, HttpError> {
    cookie
        .extract(headers)
        .or_else(|| bearer_token(headers).map(str::to_string))
        .ok_or_else(|| http_error(StatusCode::UNAUTHORIZED, "missing_token", "no token found"))
}

fn session_reply(cookie: &RefreshCookie, session: AuthSession) -> Result<SessionReply, HttpError> {
    let headers = cookie.set_headers(&session.refresh_token).ok_or_else(|| {
        tracing::error!("Refresh token is not a valid cookie value");
        http_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            INTERNAL_SERVER_ERROR_MESSAGE,
        )
    })?;

    let body = session.into_response(cookie.include_in_body);
    Ok((headers, ResponseJson(ApiResponse::ok(body))))
}
