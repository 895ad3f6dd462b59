//! Central module for application-wide configuration settings.
//!
//! This module handles loading and managing configuration parameters such as
//! the database URL, server port, token lifetimes and refresh-cookie policy.

use anyhow::{Context, Result, bail};
use std::env;
use std::str::FromStr;
use std::time::Duration;

const MIN_BCRYPT_COST: u32 = 4;
const MAX_BCRYPT_COST: u32 = 31;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub acquire_timeout_seconds: u64,
    pub jwt_secret: String,
    pub jwt_expires_in_seconds: u64,
    pub jwt_refresh_expires_in_seconds: u64,
    pub bcrypt_cost: u32,
    pub session_cache_capacity: u64,
    pub refresh_cookie_name: String,
    pub refresh_cookie_secure: bool,
    pub refresh_token_in_body: bool,
    pub server_port: u16,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL not set")?;

        let jwt_secret = lookup("JWT_SECRET").context("JWT_SECRET not set")?;
        if jwt_secret.trim().is_empty() {
            bail!("JWT_SECRET must not be empty");
        }

        let max_connections = parse_or(&lookup, "DB_MAX_CONNECTIONS", 5u32)?;
        let acquire_timeout_seconds = parse_or(&lookup, "DB_ACQUIRE_TIMEOUT_SECONDS", 3u64)?;
        let jwt_expires_in_seconds = parse_or(&lookup, "JWT_EXPIRES_IN_SECONDS", 900u64)?;
        let jwt_refresh_expires_in_seconds =
            parse_or(&lookup, "JWT_REFRESH_EXPIRES_IN_SECONDS", 86400u64)?;
        let bcrypt_cost = parse_or(&lookup, "BCRYPT_COST", bcrypt::DEFAULT_COST)?;
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&bcrypt_cost) {
            bail!(
                "BCRYPT_COST must be between {} and {}, got {}",
                MIN_BCRYPT_COST,
                MAX_BCRYPT_COST,
                bcrypt_cost
            );
        }
        let session_cache_capacity = parse_or(&lookup, "SESSION_CACHE_CAPACITY", 10_000u64)?;
        let refresh_cookie_secure = parse_or(&lookup, "REFRESH_COOKIE_SECURE", false)?;
        let refresh_token_in_body = parse_or(&lookup, "REFRESH_TOKEN_IN_BODY", false)?;
        let server_port = parse_or(&lookup, "SERVER_PORT", 3000u16)?;

        let refresh_cookie_name =
            lookup("REFRESH_COOKIE_NAME").unwrap_or_else(|| "token".to_string());
        if !is_cookie_name(&refresh_cookie_name) {
            bail!(
                "REFRESH_COOKIE_NAME is not a valid cookie name: {:?}",
                refresh_cookie_name
            );
        }

        Ok(Config {
            database_url,
            max_connections,
            acquire_timeout_seconds,
            jwt_secret,
            jwt_expires_in_seconds,
            jwt_refresh_expires_in_seconds,
            bcrypt_cost,
            session_cache_capacity,
            refresh_cookie_name,
            refresh_cookie_secure,
            refresh_token_in_body,
            server_port,
        })
    }

    /// Lifetime of an access token.
    pub fn access_ttl(&self) -> Duration {
        Duration::from_secs(self.jwt_expires_in_seconds)
    }

    /// Lifetime of a refresh token and of the session entry backing it.
    pub fn refresh_ttl(&self) -> Duration {
        Duration::from_secs(self.jwt_refresh_expires_in_seconds)
    }
}

/// RFC 6265 cookie-name token: visible ASCII without separators.
fn is_cookie_name(name: &str) -> bool {
    !name.is_empty()
        && name.bytes().all(|b| {
            b.is_ascii_graphic() && !b"()<>@,;:\\\"/[]?={}".contains(&b)
        })
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .ok()
            .with_context(|| format!("{} has an invalid value: {}", key, raw)),
        None => Ok(default),
    }
}
