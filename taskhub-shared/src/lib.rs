//! # TaskHub Shared Library
//!
//! Shared types and business logic used by the TaskHub API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models (users, sessions, tasks)
//! - `auth`: Password hashing, token signing, and the session-backed
//!   credential service
//! - `db`: Connection pooling and migrations

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the TaskHub shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
