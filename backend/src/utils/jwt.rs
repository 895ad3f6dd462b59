//! JWT token utilities for authentication.
//!
//! Provides HS256 token creation and validation for access and refresh
//! tokens. Both kinds carry the username and an expiry; the `kind` claim keeps
//! one from being accepted where the other is expected.

use chrono::Utc;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use crate::errors::TokenError;

/// Which half of a login a token belongs to.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Authenticated username
    pub username: String,
    /// Access or refresh
    pub kind: TokenKind,
    /// Unique token id, so two tokens issued in the same second still differ
    pub jti: String,
    /// Token expiration timestamp
    pub exp: usize,
    /// Token issued at timestamp
    pub iat: usize,
}

impl Claims {
    pub fn new(username: impl Into<String>, kind: TokenKind, ttl: Duration) -> Self {
        let now = Utc::now().timestamp().max(0) as usize;

        Self {
            username: username.into(),
            kind,
            jti: Uuid::now_v7().to_string(),
            exp: now.saturating_add(ttl.as_secs() as usize),
            iat: now,
        }
    }

    /// Check if token has expired
    pub fn is_expired(&self) -> bool {
        let now = Utc::now().timestamp().max(0) as usize;
        now > self.exp
    }
}

/// Signing and verification capability for session tokens.
pub trait TokenSigner: Send + Sync {
    /// Issues a signed token for `username` valid for `ttl`.
    fn issue(&self, username: &str, kind: TokenKind, ttl: Duration) -> Result<String, TokenError>;

    /// Verifies signature and expiry and returns the embedded claims.
    fn verify(&self, token: &str) -> Result<Claims, TokenError>;
}

/// HS256 JWT signer using a shared secret
pub struct JwtUtils {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtUtils {
    /// Create a new JwtUtils instance from the signing secret
    pub fn new(secret: &str) -> Self {
        let encoding_key = EncodingKey::from_secret(secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        JwtUtils {
            encoding_key,
            decoding_key,
            validation,
        }
    }

    /// Signs an arbitrary set of claims.
    pub fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }
}

impl TokenSigner for JwtUtils {
    fn issue(&self, username: &str, kind: TokenKind, ttl: Duration) -> Result<String, TokenError> {
        self.sign(&Claims::new(username, kind, ttl))
    }

    fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|token_data| token_data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            })?;

        if claims.is_expired() {
            return Err(TokenError::Expired);
        }
        if claims.username.is_empty() {
            return Err(TokenError::Invalid("missing username claim".to_string()));
        }

        Ok(claims)
    }
}
