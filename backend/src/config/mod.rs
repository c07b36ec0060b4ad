//! Central module for application-wide configuration settings.
//!
//! Configuration is loaded once at startup into an explicit `Config` value
//! and handed to the components that need it (token codec, database pool).
//! Nothing in the codebase reads the environment after bootstrap.

use anyhow::{Context, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub acquire_timeout_seconds: u64,
    pub server_port: u16,
    /// Secret for signing access tokens. Distinct from the refresh secret
    /// so a leaked access token can never be replayed as a refresh token.
    pub access_token_secret: String,
    pub refresh_token_secret: String,
    pub access_token_ttl_seconds: u64,
    pub refresh_token_ttl_seconds: u64,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL not set")?;

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u32>()
            .context("DB_MAX_CONNECTIONS must be a valid number")?;

        let acquire_timeout_seconds = env::var("DB_ACQUIRE_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "3".to_string())
            .parse::<u64>()
            .context("DB_ACQUIRE_TIMEOUT_SECONDS must be a valid number")?;

        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8989".to_string())
            .parse::<u16>()
            .context("SERVER_PORT must be a valid number")?;

        let access_token_secret =
            env::var("JWT_ACCESS_SECRET").context("JWT_ACCESS_SECRET not set")?;

        let refresh_token_secret =
            env::var("JWT_REFRESH_SECRET").context("JWT_REFRESH_SECRET not set")?;

        // Access tokens default to 3 days, refresh tokens to 7 days.
        let access_token_ttl_seconds = env::var("JWT_ACCESS_EXPIRES_IN_SECONDS")
            .unwrap_or_else(|_| "259200".to_string())
            .parse::<u64>()
            .context("JWT_ACCESS_EXPIRES_IN_SECONDS must be a valid number")?;

        let refresh_token_ttl_seconds = env::var("JWT_REFRESH_EXPIRES_IN_SECONDS")
            .unwrap_or_else(|_| "604800".to_string())
            .parse::<u64>()
            .context("JWT_REFRESH_EXPIRES_IN_SECONDS must be a valid number")?;

        Ok(Config {
            database_url,
            max_connections,
            acquire_timeout_seconds,
            server_port,
            access_token_secret,
            refresh_token_secret,
            access_token_ttl_seconds,
            refresh_token_ttl_seconds,
        })
    }
}
