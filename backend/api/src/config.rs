//! Application configuration loaded from environment variables.

use crate::errors::{ApiError, Result};

#[derive(Debug, Clone)]
pub struct Config {
    /// Principal granted Admin and Minter when a fresh ledger is
    /// initialised (ignored once a snapshot exists)
    pub admin_principal: String,
    /// Path to the SQLite database file
    pub database_url: String,
    /// Port for the REST API server
    pub api_port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let admin_principal = env_var("ADMIN_PRINCIPAL").map_err(|_| {
            ApiError::Config("ADMIN_PRINCIPAL environment variable is required".to_string())
        })?;
        // The empty string is the null principal, which every command
        // rejects; bootstrapping roles onto it would brick the ledger.
        if admin_principal.is_empty() {
            return Err(ApiError::Config(
                "ADMIN_PRINCIPAL must not be empty".to_string(),
            ));
        }
        Ok(Config {
            admin_principal,
            database_url: env_var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:./volunteer_ledger.db".to_string()),
            api_port: env_var("API_PORT")
                .unwrap_or_else(|_| "3001".to_string())
                .parse()
                .map_err(|_| ApiError::Config("Invalid API_PORT".to_string()))?,
        })
    }
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| ApiError::Config(format!("Missing env var: {key}")))
}
