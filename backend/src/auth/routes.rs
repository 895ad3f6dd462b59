//! Defines the HTTP routes specifically for authentication.
//!
//! These routes handle signup, login, token refresh, logout, and the protected
//! username listing. They are designed to be merged into the main Axum router.

use crate::auth::cookie::RefreshCookie;
use crate::auth::handlers::*;
use crate::auth::middleware::jwt_auth;
use crate::auth::service::AuthService;
use axum::{
    Extension, Router, middleware,
    routing::{get, post},
};

/// Creates the authentication router with all auth-related routes
pub fn auth_router() -> Router {
    Router::new()
        .route("/user/signup", post(signup))
        .route("/user/login", post(login))
        .route("/user/refresh", get(refresh_token))
        .route("/user/logout", post(logout))
        .route(
            "/users",
            get(list_usernames).layer(middleware::from_fn(jwt_auth)),
        )
}

/// Auth routes with the service and cookie settings attached.
pub fn app(auth: AuthService, cookie: RefreshCookie) -> Router {
    auth_router()
        .layer(Extension(auth))
        .layer(Extension(cookie))
}
