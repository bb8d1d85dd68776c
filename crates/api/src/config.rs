//! # API Configuration Module
//!
//! Configuration for the SlotBook server, read from environment variables
//! with defaults where appropriate.
//!
//! ## Environment Variables
//!
//! - `API_HOST`: The host address to bind the server to (default: "0.0.0.0")
//! - `API_PORT`: The port to listen on (default: 3000)
//! - `DATABASE_URL`: PostgreSQL connection string; without it appointments
//!   live in memory
//! - `LOG_LEVEL`: Logging level (default: "info")
//! - `API_CORS_ORIGINS`: Comma-separated list of allowed CORS origins
//! - `ADMIN_PASSWORD_HASH`: Argon2 PHC hash of the admin password; admin
//!   endpoints are disabled without it
//! - `API_REQUEST_TIMEOUT_SECONDS`: Request timeout (default: 30)
//! - `CLINIC_UTC_OFFSET_HOURS`: Clinic timezone offset used to decide which
//!   dates are in the past (default: 0)

use std::env;

use eyre::{Result, WrapErr, eyre};
use tracing::Level;

/// Configuration for the SlotBook API server
///
/// # Example
///
/// ```
/// use eyre::Result;
/// use slotbook_api::config::ApiConfig;
///
/// fn example() -> Result<()> {
///     let config = ApiConfig::from_env()?;
///     println!("Starting server on {}:{}", config.host, config.port);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host address for the API server (e.g., "127.0.0.1", "0.0.0.0")
    pub host: String,

    /// Port for the API server to listen on
    pub port: u16,

    /// PostgreSQL database connection string
    pub database_url: Option<String>,

    /// Log level for the application
    pub log_level: Level,

    /// CORS allowed origins (optional)
    pub cors_origins: Option<Vec<String>>,

    /// Argon2 hash of the admin password
    pub admin_password_hash: Option<String>,

    /// Request timeout in seconds
    pub request_timeout: u64,

    pub utc_offset_hours: i32,
}

impl ApiConfig {
    /// Creates a new ApiConfig from environment variables
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The API_PORT value cannot be parsed as a u16
    /// - CLINIC_UTC_OFFSET_HOURS is not a whole number of hours between -23
    ///   and 23
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`ApiConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        // Network settings
        let host = var("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = var("API_PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .wrap_err("Invalid API_PORT value")?;

        // Database settings
        let database_url = var("DATABASE_URL");

        // Logging settings
        let log_level = match var("LOG_LEVEL")
            .unwrap_or_else(|| "info".to_string())
            .to_lowercase()
            .as_str()
        {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };

        // CORS settings
        let cors_origins = var("API_CORS_ORIGINS")
            .map(|origins| origins.split(',').map(|s| s.trim().to_string()).collect());

        // Security settings
        let admin_password_hash = var("ADMIN_PASSWORD_HASH");

        // Performance settings
        let request_timeout = var("API_REQUEST_TIMEOUT_SECONDS")
            .and_then(|value| value.parse().ok())
            .unwrap_or(30);

        let utc_offset_hours: i32 = var("CLINIC_UTC_OFFSET_HOURS")
            .unwrap_or_else(|| "0".to_string())
            .parse()
            .wrap_err("Invalid CLINIC_UTC_OFFSET_HOURS value")?;
        if !(-23..=23).contains(&utc_offset_hours) {
            return Err(eyre!(
                "CLINIC_UTC_OFFSET_HOURS must be between -23 and 23, got {}",
                utc_offset_hours
            ));
        }

        Ok(Self {
            host,
            port,
            database_url,
            log_level,
            cors_origins,
            admin_password_hash,
            request_timeout,
            utc_offset_hours,
        })
    }

    /// Returns the server address as a string (e.g., "127.0.0.1:8080")
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
