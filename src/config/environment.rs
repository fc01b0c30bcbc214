// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Handles environment variables, deployment modes, and runtime configuration parsing
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Environment-based configuration management for production deployment

use crate::constants::env_config;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use tracing::{info, warn};

/// Strongly typed log level configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Convert to `tracing::Level`
    #[must_use]
    pub const fn to_tracing_level(&self) -> tracing::Level {
        match self {
            Self::Error => tracing::Level::ERROR,
            Self::Warn => tracing::Level::WARN,
            Self::Info => tracing::Level::INFO,
            Self::Debug => tracing::Level::DEBUG,
            Self::Trace => tracing::Level::TRACE,
        }
    }

    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "error" => Self::Error,
            "warn" => Self::Warn,
            "debug" => Self::Debug,
            "trace" => Self::Trace,
            _ => Self::Info, // Default fallback
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warn => write!(f, "warn"),
            Self::Info => write!(f, "info"),
            Self::Debug => write!(f, "debug"),
            Self::Trace => write!(f, "trace"),
        }
    }
}

/// Type-safe database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DatabaseUrl {
    /// SQLite database with file path
    SQLite { path: PathBuf },
    /// In-memory SQLite (for testing)
    Memory,
}

impl DatabaseUrl {
    /// Parse from string with validation
    #[must_use]
    pub fn parse_url(s: &str) -> Self {
        if let Some(path_str) = s.strip_prefix("sqlite:") {
            if path_str == ":memory:" {
                Self::Memory
            } else {
                Self::SQLite {
                    path: PathBuf::from(path_str),
                }
            }
        } else {
            // Fallback: treat as SQLite file path
            Self::SQLite {
                path: PathBuf::from(s),
            }
        }
    }

    /// Convert to connection string
    #[must_use]
    pub fn to_connection_string(&self) -> String {
        match self {
            Self::SQLite { path } => format!("sqlite:{}", path.display()),
            Self::Memory => "sqlite::memory:".to_string(),
        }
    }

    /// Check if this is an in-memory database
    #[must_use]
    pub const fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }
}

impl Default for DatabaseUrl {
    fn default() -> Self {
        Self::SQLite {
            path: PathBuf::from("./data/eventra.db"),
        }
    }
}

impl std::fmt::Display for DatabaseUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_connection_string())
    }
}

/// Top-level server configuration assembled from the environment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP API port
    pub http_port: u16,
    /// Log level
    pub log_level: LogLevel,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Authentication configuration
    pub auth: AuthConfig,
    /// Booking behavior settings
    pub booking: BookingConfig,
    /// Broadcast request settings
    pub broadcast: BroadcastConfig,
    /// CORS settings
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL (SQLite path or `:memory:`)
    pub url: DatabaseUrl,
    /// Enable database migrations on startup
    pub auto_migrate: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// JWT expiry time in hours
    pub jwt_expiry_hours: i64,
}

/// Booking behavior settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingConfig {
    /// Compatibility mode: confirming a booking marks every slot of the day
    /// as booked instead of only the slot matching the booking time
    pub mark_whole_day_on_confirm: bool,
}

/// Broadcast request settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastConfig {
    /// Lifetime of an open request before it expires, in days
    pub request_ttl_days: i64,
    /// Sweep interval of the expiry reaper, in seconds
    pub reaper_interval_secs: u64,
    /// Days an expired record is retained before the reaper deletes it
    pub expired_retention_days: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// CORS allowed origins; `["*"]` allows any origin
    pub allowed_origins: Vec<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if an environment variable holds an unparsable value
    /// or validation fails
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        // Load .env file if it exists
        if let Err(e) = dotenvy::dotenv() {
            warn!("No .env file found or failed to load: {}", e);
        }

        let config = Self {
            http_port: env_config::http_port(),
            log_level: LogLevel::from_str_or_default(&env_config::log_level()),

            database: DatabaseConfig {
                url: DatabaseUrl::parse_url(&env_config::database_url()),
                auto_migrate: env_var_or("AUTO_MIGRATE", "true")?
                    .parse()
                    .context("Invalid AUTO_MIGRATE value")?,
            },

            auth: AuthConfig {
                jwt_expiry_hours: env_config::jwt_expiry_hours(),
            },

            booking: BookingConfig {
                mark_whole_day_on_confirm: env_config::mark_whole_day_on_confirm(),
            },

            broadcast: BroadcastConfig {
                request_ttl_days: env_config::broadcast_ttl_days(),
                reaper_interval_secs: env_config::reaper_interval_secs(),
                expired_retention_days: env_config::expired_retention_days(),
            },

            cors: CorsConfig {
                allowed_origins: parse_origins(&env_var_or("CORS_ORIGINS", "*")?),
            },
        };

        config.validate()?;
        info!("Configuration loaded successfully");
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns an error when a value is outside its legal range
    pub fn validate(&self) -> Result<()> {
        if self.http_port == 0 {
            return Err(anyhow::anyhow!("HTTP_PORT cannot be 0"));
        }

        if self.auth.jwt_expiry_hours < 1 {
            return Err(anyhow::anyhow!("JWT_EXPIRY_HOURS must be at least 1"));
        }

        if self.broadcast.request_ttl_days < 1 {
            return Err(anyhow::anyhow!("BROADCAST_TTL_DAYS must be at least 1"));
        }

        if self.broadcast.reaper_interval_secs == 0 {
            return Err(anyhow::anyhow!("REAPER_INTERVAL_SECS cannot be 0"));
        }

        if self.broadcast.expired_retention_days < 0 {
            return Err(anyhow::anyhow!("EXPIRED_RETENTION_DAYS cannot be negative"));
        }

        Ok(())
    }

    /// Get a summary of the configuration for logging (without secrets)
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Eventra Server Configuration:\n\
             - HTTP Port: {}\n\
             - Log Level: {}\n\
             - Database: {}\n\
             - Auto Migrate: {}\n\
             - JWT Expiry: {}h\n\
             - Broadcast TTL: {}d\n\
             - Reaper Interval: {}s\n\
             - Whole-day Confirm Compat: {}\n\
             - CORS Origins: {}",
            self.http_port,
            self.log_level,
            if self.database.url.is_memory() {
                "SQLite (memory)"
            } else {
                "SQLite (file)"
            },
            self.database.auto_migrate,
            self.auth.jwt_expiry_hours,
            self.broadcast.request_ttl_days,
            self.broadcast.reaper_interval_secs,
            self.booking.mark_whole_day_on_confirm,
            self.cors.allowed_origins.join(", "),
        )
    }
}

/// Get environment variable or default value
fn env_var_or(key: &str, default: &str) -> Result<String> {
    Ok(env::var(key).unwrap_or_else(|_| default.to_string()))
}

/// Parse comma-separated CORS origins
fn parse_origins(origins_str: &str) -> Vec<String> {
    if origins_str == "*" {
        vec!["*".to_string()]
    } else {
        origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_parse_origins() {
        assert_eq!(parse_origins("*"), vec!["*"]);
        assert_eq!(
            parse_origins("http://localhost:3000,https://app.example.com"),
            vec!["http://localhost:3000", "https://app.example.com"]
        );
        assert_eq!(parse_origins(""), Vec::<String>::new());
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(LogLevel::from_str_or_default("error"), LogLevel::Error);
        assert_eq!(LogLevel::from_str_or_default("WARN"), LogLevel::Warn);
        assert_eq!(LogLevel::from_str_or_default("info"), LogLevel::Info);
        assert_eq!(LogLevel::from_str_or_default("Debug"), LogLevel::Debug);
        assert_eq!(LogLevel::from_str_or_default("trace"), LogLevel::Trace);
        assert_eq!(LogLevel::from_str_or_default("invalid"), LogLevel::Info); // Default fallback
    }

    #[test]
    fn test_database_url_parsing() {
        assert!(DatabaseUrl::parse_url("sqlite::memory:").is_memory());
        assert_eq!(
            DatabaseUrl::parse_url("sqlite:./data/eventra.db").to_connection_string(),
            "sqlite:./data/eventra.db"
        );
        // Bare paths fall back to SQLite files
        assert_eq!(
            DatabaseUrl::parse_url("/var/lib/eventra.db").to_connection_string(),
            "sqlite:/var/lib/eventra.db"
        );
    }

    #[test]
    #[serial]
    fn test_from_env_with_overrides() {
        env::set_var("HTTP_PORT", "9123");
        env::set_var("BROADCAST_TTL_DAYS", "3");
        env::set_var("EVENTRA_MARK_WHOLE_DAY_ON_CONFIRM", "true");

        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.http_port, 9123);
        assert_eq!(config.broadcast.request_ttl_days, 3);
        assert!(config.booking.mark_whole_day_on_confirm);

        env::remove_var("HTTP_PORT");
        env::remove_var("BROADCAST_TTL_DAYS");
        env::remove_var("EVENTRA_MARK_WHOLE_DAY_ON_CONFIRM");
    }

    #[test]
    #[serial]
    fn test_validate_rejects_zero_reaper_interval() {
        env::set_var("REAPER_INTERVAL_SECS", "0");
        assert!(ServerConfig::from_env().is_err());
        env::remove_var("REAPER_INTERVAL_SECS");
    }
}
