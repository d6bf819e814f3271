//! # TaskHub API Server Library
//!
//! This library provides the core functionality for the TaskHub API server.
//!
//! ## Modules
//!
//! - `app`: Application state, bearer-token middleware, and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `mailer`: Fire-and-forget account notification emails
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod mailer;
pub mod routes;
