//! Main entry point for the cust-info backend.
//!
//! This file initializes the Axum web server, sets up the database connection,
//! wires the credential, session and token components into the auth service,
//! and registers the API routes.

mod api;
mod auth;
mod config;
mod database;
mod errors;
mod repositories;
mod services;
mod utils;

use crate::api::common::ApiResponse;
use crate::auth::cookie::RefreshCookie;
use crate::auth::service::{AuthService, TokenSettings};
use crate::repositories::credential_repository::CredentialRepository;
use crate::repositories::role_repository::RoleRepository;
use crate::services::session_cache::MokaSessionCache;
use crate::services::user_service::UserService;
use crate::utils::jwt::JwtUtils;
use crate::utils::password::PasswordHasher;
use anyhow::Result;
use axum::{Router, response::Json, routing::get};
use config::Config;
use database::Database;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::fmt::init;

#[tokio::main]
async fn main() -> Result<()> {
    init();

    let config = Config::from_env()?;
    let db = Database::new(&config).await?;
    db.migrate().await?;

    let users = UserService::new(
        Arc::new(CredentialRepository::new(db.pool().clone())),
        PasswordHasher::new(config.bcrypt_cost),
    );
    let auth = AuthService::new(
        users,
        Arc::new(RoleRepository::new(db.pool().clone())),
        Arc::new(MokaSessionCache::new(config.session_cache_capacity)),
        Arc::new(JwtUtils::new(&config.jwt_secret)),
        TokenSettings {
            access_ttl: config.access_ttl(),
            refresh_ttl: config.refresh_ttl(),
        },
    );

    let app = Router::new()
        .route("/", get(root_handler))
        .merge(auth::routes::app(auth, RefreshCookie::from_config(&config)));

    let bind_address = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;

    info!("Starting cust-info server on port {}", config.server_port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

async fn root_handler() -> Json<ApiResponse<serde_json::Value>> {
    Json(ApiResponse::success(
        serde_json::json!({
            "service": "cust-info",
            "version": env!("CARGO_PKG_VERSION")
        }),
        "Welcome to the cust-info API",
    ))
}
