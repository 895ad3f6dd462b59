//! Core business logic for the authentication system.
//!
//! A user is anonymous until a login stores a refresh token in the session
//! cache. While that entry lives, the refresh token can be exchanged for new
//! access tokens. A later login replaces the entry, and when its TTL elapses
//! the user is anonymous again.

use crate::auth::models::*;
use crate::errors::{CacheError, ServiceError, ServiceResult, TokenError};
use crate::repositories::role_repository::RoleResolver;
use crate::services::session_cache::SessionCache;
use crate::services::user_service::UserService;
use crate::utils::jwt::{Claims, TokenKind, TokenSigner};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use validator::Validate;

/// Lifetimes of the two token kinds.
#[derive(Debug, Clone, Copy)]
pub struct TokenSettings {
    pub access_ttl: Duration,
    /// Also the lifetime of the session cache entry
    pub refresh_ttl: Duration,
}

/// Authentication service for handling signup, login and token refresh
#[derive(Clone)]
pub struct AuthService {
    users: UserService,
    roles: Arc<dyn RoleResolver>,
    sessions: Arc<dyn SessionCache>,
    tokens: Arc<dyn TokenSigner>,
    settings: TokenSettings,
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(
        users: UserService,
        roles: Arc<dyn RoleResolver>,
        sessions: Arc<dyn SessionCache>,
        tokens: Arc<dyn TokenSigner>,
        settings: TokenSettings,
    ) -> Self {
        AuthService {
            users,
            roles,
            sessions,
            tokens,
            settings,
        }
    }

    /// Register a new account
    pub async fn signup(&self, request: SignupRequest) -> ServiceResult<()> {
        if let Err(validation_errors) = request.validate() {
            return Err(ServiceError::from_validation(&validation_errors));
        }

        self.users
            .signup(&request.username, &request.password, &request.email)
            .await
    }

    /// Authenticate user, issue both tokens and open a session
    pub async fn login(&self, request: LoginRequest) -> ServiceResult<AuthSession> {
        if let Err(validation_errors) = request.validate() {
            return Err(ServiceError::from_validation(&validation_errors));
        }

        let username = request.username;
        self.users
            .authenticate_user(&username, &request.password)
            .await?;

        let roles = self.active_roles(&username).await?;

        let access_token = self.issue(&username, TokenKind::Access, self.settings.access_ttl)?;
        let refresh_token = self.issue(&username, TokenKind::Refresh, self.settings.refresh_ttl)?;

        // No token leaves the service unless the session was recorded.
        self.sessions
            .put(&username, &refresh_token, self.settings.refresh_ttl)
            .await
            .map_err(|e| {
                error!("Failed to store session for {}: {}", username, e);
                ServiceError::from(e)
            })?;

        info!("User {} logged in", username);

        Ok(AuthSession {
            username,
            roles,
            access_token,
            refresh_token,
        })
    }

    /// Exchange a live refresh token for a new access token.
    ///
    /// The refresh token is not rotated; the returned session carries the
    /// presented value back.
    pub async fn refresh_token(&self, presented: &str) -> ServiceResult<AuthSession> {
        let claims = self.verify_refresh_token(presented)?;
        let username = claims.username;

        match self.sessions.get(&username).await {
            Ok(stored) if stored == presented => {}
            Ok(_) => {
                warn!("Refresh rejected for {}: session superseded", username);
                return Err(ServiceError::unauthorized("session is no longer active"));
            }
            Err(CacheError::NotFound) => {
                warn!("Refresh rejected for {}: no active session", username);
                return Err(ServiceError::unauthorized("no active session"));
            }
            Err(e) => {
                error!("Session lookup failed for {}: {}", username, e);
                return Err(e.into());
            }
        }

        let roles = self.active_roles(&username).await?;
        let access_token = self.issue(&username, TokenKind::Access, self.settings.access_ttl)?;

        info!("Access token refreshed for {}", username);

        Ok(AuthSession {
            username,
            roles,
            access_token,
            refresh_token: presented.to_string(),
        })
    }

    /// Revoke the session behind a refresh token.
    ///
    /// Expired tokens and sessions that were already replaced are no-ops.
    pub async fn logout(&self, presented: &str) -> ServiceResult<()> {
        let claims = match self.verify_refresh_token(presented) {
            Ok(claims) => claims,
            Err(ServiceError::Unauthorized { .. }) => return Ok(()),
            Err(e) => return Err(e),
        };

        match self.sessions.get(&claims.username).await {
            Ok(stored) if stored == presented => {
                self.sessions.remove(&claims.username).await.map_err(|e| {
                    error!("Failed to remove session for {}: {}", claims.username, e);
                    ServiceError::from(e)
                })?;
                info!("User {} logged out", claims.username);
            }
            Ok(_) | Err(CacheError::NotFound) => {}
            Err(e) => {
                error!("Session lookup failed for {}: {}", claims.username, e);
                return Err(e.into());
            }
        }

        Ok(())
    }

    /// Validate an access token presented on a protected route
    pub fn authorize(&self, token: &str) -> ServiceResult<Claims> {
        let claims = self
            .tokens
            .verify(token)
            .map_err(|e| {
                debug!("Access token rejected: {}", e);
                ServiceError::unauthorized("invalid or expired access token")
            })?;

        if claims.kind != TokenKind::Access {
            return Err(ServiceError::unauthorized("access token required"));
        }

        Ok(claims)
    }

    /// All registered usernames
    pub async fn list_usernames(&self) -> ServiceResult<Vec<String>> {
        self.users.list_usernames().await
    }

    fn verify_refresh_token(&self, presented: &str) -> ServiceResult<Claims> {
        let claims = self.tokens.verify(presented).map_err(|e| match e {
            TokenError::Expired => ServiceError::unauthorized("session expired"),
            other => ServiceError::invalid_token(other.to_string()),
        })?;

        if claims.kind != TokenKind::Refresh {
            return Err(ServiceError::invalid_token("not a refresh token"));
        }

        Ok(claims)
    }

    fn issue(&self, username: &str, kind: TokenKind, ttl: Duration) -> ServiceResult<String> {
        self.tokens.issue(username, kind, ttl).map_err(|e| {
            error!("Token generation failed for {}: {}", username, e);
            ServiceError::internal_error(e.to_string())
        })
    }

    /// Helper method to get the user's active role ids
    async fn active_roles(&self, username: &str) -> ServiceResult<Vec<i64>> {
        self.roles.get_active_roles(username).await.map_err(|e| {
            error!("Role lookup failed for {}: {}", username, e);
            ServiceError::from(e)
        })
    }
}
