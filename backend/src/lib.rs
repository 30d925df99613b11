//! Backend for the budget tracker: a REST API over a SQLite store.
//!
//! The crate is layered the same way a request travels through it:
//! - [`rest`]: axum router, handlers, CORS
//! - [`domain`]: business rules and error classification
//! - [`db`]: connection pool, schema, queries
//!
//! with [`config`] supplying runtime settings and [`error`] defining the
//! error-to-response mapping shared by every handler.

pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod rest;
