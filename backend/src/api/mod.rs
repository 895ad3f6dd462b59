//! Shared pieces of the HTTP API.
//!
//! Route handlers live next to the domain they serve (see `auth`); this module
//! holds the response envelope and error translation they all use.

pub mod common;
