//! Persistence for credentials and role assignments.

pub mod credential_repository;
pub mod role_repository;
