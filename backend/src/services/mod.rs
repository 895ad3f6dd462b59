//! Module for core business logic services.
//!
//! This module encapsulates services that perform specific business operations,
//! such as managing user credentials or holding refresh-token sessions.

pub mod session_cache;
pub mod user_service;
