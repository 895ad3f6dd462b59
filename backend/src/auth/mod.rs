//! Authentication module for user accounts, sessions, and access control.
//!
//! This module provides signup, login, refresh-token sessions, logout, and the
//! middleware guarding routes that require an access token.

pub mod cookie;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod service;
