//! Collection of general utility functions.
//!
//! Password hashing and token signing helpers shared by the services.

pub mod jwt;
pub mod password;
