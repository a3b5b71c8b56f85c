//! Configuration management
//!
//! Configuration is loaded from a `config.yml` file, with environment
//! variables overriding file settings. Missing optional values fall back
//! to defaults; the credential secret is the one value that has no
//! default and must be supplied before the server starts.

use anyhow::Result;
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Authentication configuration
    #[serde(default)]
    pub auth: AuthConfig,
    /// Scheduling configuration
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origin (for cookie-based auth)
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "http://localhost:3000".to_string()
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database driver (sqlite or mysql)
    #[serde(default)]
    pub driver: DatabaseDriver,
    /// Database connection URL
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            driver: DatabaseDriver::default(),
            url: default_database_url(),
        }
    }
}

fn default_database_url() -> String {
    "data/agendo.db".to_string()
}

/// Database driver type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseDriver {
    /// SQLite (default)
    #[default]
    Sqlite,
    /// MySQL
    Mysql,
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for credential signing. Required at startup; there is
    /// no default value.
    #[serde(default)]
    pub secret: Option<String>,
    /// Credential validity window in days
    #[serde(default = "default_token_ttl_days")]
    pub token_ttl_days: i64,
    /// Username for the admin account seeded when the user table is empty
    #[serde(default)]
    pub admin_username: Option<String>,
    /// Password for the seeded admin account
    #[serde(default)]
    pub admin_password: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: None,
            token_ttl_days: default_token_ttl_days(),
            admin_username: None,
            admin_password: None,
        }
    }
}

fn default_token_ttl_days() -> i64 {
    7
}

/// Scheduling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Canonical civil timezone for the whole deployment, as a fixed UTC
    /// offset in hours. Every instance must agree on "today" and "now",
    /// independent of host locale. Defaults to -3 (São Paulo standard time).
    #[serde(default = "default_utc_offset_hours")]
    pub utc_offset_hours: i32,
    /// How many upcoming occurrences to return when the caller gives no limit
    #[serde(default = "default_upcoming_limit")]
    pub default_upcoming_limit: usize,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            utc_offset_hours: default_utc_offset_hours(),
            default_upcoming_limit: default_upcoming_limit(),
        }
    }
}

fn default_utc_offset_hours() -> i32 {
    -3
}

fn default_upcoming_limit() -> usize {
    10
}

impl ScheduleConfig {
    /// The canonical timezone as a chrono offset.
    ///
    /// Fails on offsets outside ±23 hours rather than silently wrapping.
    pub fn timezone(&self) -> Result<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_hours * 3600).ok_or_else(|| {
            anyhow::anyhow!("Invalid UTC offset in configuration: {}", self.utc_offset_hours)
        })
    }
}

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {message}")]
    ParseError { path: String, message: String },
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

impl Config {
    /// Load configuration from file.
    ///
    /// A missing or empty file yields the defaults; a file with invalid
    /// YAML is an error.
    pub fn load(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from file with environment variable overrides.
    ///
    /// Recognized variables:
    /// - `AGENDO_SERVER_HOST`, `AGENDO_SERVER_PORT`, `AGENDO_SERVER_CORS_ORIGIN`
    /// - `AGENDO_DATABASE_DRIVER`, `AGENDO_DATABASE_URL`
    /// - `AGENDO_AUTH_SECRET`, `AGENDO_AUTH_TOKEN_TTL_DAYS`
    /// - `AGENDO_AUTH_ADMIN_USERNAME`, `AGENDO_AUTH_ADMIN_PASSWORD`
    /// - `AGENDO_SCHEDULE_UTC_OFFSET_HOURS`, `AGENDO_SCHEDULE_UPCOMING_LIMIT`
    pub fn load_with_env(path: &std::path::Path) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("AGENDO_SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("AGENDO_SERVER_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                self.server.port = port;
            }
        }
        if let Ok(cors_origin) = std::env::var("AGENDO_SERVER_CORS_ORIGIN") {
            self.server.cors_origin = cors_origin;
        }

        if let Ok(driver) = std::env::var("AGENDO_DATABASE_DRIVER") {
            match driver.to_lowercase().as_str() {
                "sqlite" => self.database.driver = DatabaseDriver::Sqlite,
                "mysql" => self.database.driver = DatabaseDriver::Mysql,
                _ => {} // Ignore invalid values
            }
        }
        if let Ok(url) = std::env::var("AGENDO_DATABASE_URL") {
            self.database.url = url;
        }

        if let Ok(secret) = std::env::var("AGENDO_AUTH_SECRET") {
            self.auth.secret = Some(secret);
        }
        if let Ok(ttl) = std::env::var("AGENDO_AUTH_TOKEN_TTL_DAYS") {
            if let Ok(ttl) = ttl.parse::<i64>() {
                self.auth.token_ttl_days = ttl;
            }
        }
        if let Ok(username) = std::env::var("AGENDO_AUTH_ADMIN_USERNAME") {
            self.auth.admin_username = Some(username);
        }
        if let Ok(password) = std::env::var("AGENDO_AUTH_ADMIN_PASSWORD") {
            self.auth.admin_password = Some(password);
        }

        if let Ok(offset) = std::env::var("AGENDO_SCHEDULE_UTC_OFFSET_HOURS") {
            if let Ok(offset) = offset.parse::<i32>() {
                self.schedule.utc_offset_hours = offset;
            }
        }
        if let Ok(limit) = std::env::var("AGENDO_SCHEDULE_UPCOMING_LIMIT") {
            if let Ok(limit) = limit.parse::<usize>() {
                self.schedule.default_upcoming_limit = limit;
            }
        }
    }

    /// Validate settings that only matter for a real server process.
    ///
    /// Returns the credential secret or fails if none is configured.
    pub fn require_secret(&self) -> Result<String, ConfigError> {
        match self.auth.secret.as_deref() {
            Some(secret) if !secret.trim().is_empty() => Ok(secret.to_string()),
            _ => Err(ConfigError::ValidationError(
                "auth.secret is not set; configure it in config.yml or AGENDO_AUTH_SECRET".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.driver, DatabaseDriver::Sqlite);
        assert_eq!(config.auth.token_ttl_days, 7);
        assert_eq!(config.schedule.utc_offset_hours, -3);
        assert_eq!(config.schedule.default_upcoming_limit, 10);
        assert!(config.auth.secret.is_none());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = Config::load(std::path::Path::new("does-not-exist.yml")).unwrap();
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "server:\n  port: 9000\nschedule:\n  utc_offset_hours: 0\nauth:\n  secret: test-secret"
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.schedule.utc_offset_hours, 0);
        assert_eq!(config.auth.secret.as_deref(), Some("test-secret"));
        // Untouched sections keep their defaults
        assert_eq!(config.database.driver, DatabaseDriver::Sqlite);
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "server: [not, a, mapping").unwrap();
        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn test_timezone_from_offset() {
        let schedule = ScheduleConfig {
            utc_offset_hours: -3,
            ..ScheduleConfig::default()
        };
        let tz = schedule.timezone().unwrap();
        assert_eq!(tz.local_minus_utc(), -3 * 3600);

        let bad = ScheduleConfig {
            utc_offset_hours: 48,
            ..ScheduleConfig::default()
        };
        assert!(bad.timezone().is_err());
    }

    #[test]
    fn test_require_secret() {
        let mut config = Config::default();
        assert!(config.require_secret().is_err());

        config.auth.secret = Some("  ".to_string());
        assert!(config.require_secret().is_err());

        config.auth.secret = Some("super-secret".to_string());
        assert_eq!(config.require_secret().unwrap(), "super-secret");
    }
}
