//! Application configuration loading from config.toml
//!
//! Every section of the file is optional and falls back to defaults, so a fresh
//! checkout runs without any configuration. A handful of environment variables
//! override the file; the admin token is only ever read from the environment.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info, warn};

use super::database::DEFAULT_DATABASE_URL;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP listener settings
    pub server: ServerConfig,
    /// Storage settings
    pub database: DatabaseConfig,
    /// Local image store settings
    pub images: ImageConfig,
    /// Order settlement settings
    pub orders: OrderConfig,
    /// Secret compared against the `aToken` header; taken from `ADMIN_TOKEN`
    #[serde(skip)]
    pub admin_token: Option<String>,
}

/// HTTP listener settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,
    /// Port to bind
    pub port: u16,
    /// Whether browsers from any origin may call the API
    pub cors_allow_any_origin: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 4000,
            cors_allow_any_origin: true,
        }
    }
}

/// Storage settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// sea-orm connection URL
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.to_string(),
        }
    }
}

/// Local image store settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    /// Directory uploaded images are written to
    pub directory: String,
    /// URL prefix under which the directory is served
    pub public_base_url: String,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            directory: "data/images".to_string(),
            public_base_url: "http://localhost:4000/images".to_string(),
        }
    }
}

/// Order settlement settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OrderConfig {
    /// Largest accepted difference between the declared and the recomputed amount
    pub amount_tolerance: f64,
    /// Whether placing an order empties the cart in the same transaction
    pub clear_cart_on_settle: bool,
}

impl Default for OrderConfig {
    fn default() -> Self {
        Self {
            amount_tolerance: 0.01,
            clear_cart_on_settle: true,
        }
    }
}

/// Parses configuration from TOML text.
///
/// # Errors
/// Returns an error if the TOML syntax is invalid or a value has the wrong type.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let config: AppConfig = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;

    if !config.orders.amount_tolerance.is_finite() || config.orders.amount_tolerance < 0.0 {
        return Err(Error::Config {
            message: format!(
                "orders.amount_tolerance must be a non-negative number, got {}",
                config.orders.amount_tolerance
            ),
        });
    }

    Ok(config)
}

/// Loads configuration from a TOML file, using defaults when the file does not exist.
///
/// # Errors
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path = path.as_ref();
    if !path.exists() {
        info!("No configuration file at {:?}, using defaults", path);
        return Ok(AppConfig::default());
    }

    debug!("Loading configuration from {:?}", path);
    let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read config file {path:?}: {e}"),
    })?;
    parse_config(&contents)
}

/// Loads the full application configuration.
///
/// Reads the file named by `CONFIG_PATH` (default `./config.toml`), then applies the
/// `DATABASE_URL`, `PORT` and `ADMIN_TOKEN` environment variables.
///
/// # Errors
/// Returns an error if the file cannot be parsed or `PORT` is not a valid port number.
pub fn load_app_config() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    let mut config = load_config(&path)?;

    if let Ok(url) = std::env::var("DATABASE_URL") {
        config.database.url = url;
    }

    if let Ok(port) = std::env::var("PORT") {
        config.server.port = port.parse().map_err(|e| Error::Config {
            message: format!("Invalid PORT value {port:?}: {e}"),
        })?;
    }

    config.admin_token = std::env::var("ADMIN_TOKEN")
        .ok()
        .filter(|token| !token.trim().is_empty());
    if config.admin_token.is_none() {
        warn!("ADMIN_TOKEN not set, admin routes will reject every request");
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
            [server]
            host = "127.0.0.1"
            port = 8080
            cors_allow_any_origin = false

            [database]
            url = "sqlite::memory:"

            [images]
            directory = "/srv/images"
            public_base_url = "https://cdn.example.com/images"

            [orders]
            amount_tolerance = 0.05
            clear_cart_on_settle = false
        "#;

        let config = parse_config(toml_str).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert!(!config.server.cors_allow_any_origin);
        assert_eq!(config.database.url, "sqlite::memory:");
        assert_eq!(config.images.directory, "/srv/images");
        assert_eq!(config.orders.amount_tolerance, 0.05);
        assert!(!config.orders.clear_cart_on_settle);
        assert!(config.admin_token.is_none());
    }

    #[test]
    fn test_parse_partial_config_uses_defaults() {
        let config = parse_config("[server]\nport = 5000\n").unwrap();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.database.url, DEFAULT_DATABASE_URL);
        assert_eq!(config.orders.amount_tolerance, 0.01);
        assert!(config.orders.clear_cart_on_settle);
    }

    #[test]
    fn test_parse_rejects_negative_tolerance() {
        let result = parse_config("[orders]\namount_tolerance = -1.0\n");
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_parse_rejects_bad_types() {
        let result = parse_config("[server]\nport = \"not a number\"\n");
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config = load_config("definitely/not/here/config.toml").unwrap();
        assert_eq!(config.server.port, 4000);
    }
}
