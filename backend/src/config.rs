use std::env;
use std::net::SocketAddr;

use anyhow::{Context, Result};

/// Runtime settings, read from the environment with defaults that suit
/// local development.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite connection string (`DATABASE_URL`).
    pub database_url: String,
    /// Address the HTTP server binds to (`BIND_ADDR`).
    pub bind_addr: SocketAddr,
    /// Origin the CORS layer allows (`CORS_ORIGIN`), normally the dev
    /// server of the browser frontend.
    pub cors_origin: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:budget.db".to_string());

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:3001".to_string())
            .parse()
            .context("BIND_ADDR must be a socket address like 127.0.0.1:3001")?;

        let cors_origin =
            env::var("CORS_ORIGIN").unwrap_or_else(|_| "http://localhost:5173".to_string());

        Ok(Self {
            database_url,
            bind_addr,
            cors_origin,
        })
    }
}
