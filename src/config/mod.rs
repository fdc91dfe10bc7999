//! Configuration module - environment variable parsing

use std::env;
use std::net::SocketAddr;

/// Deployment environment, controls the allowed client origin
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Server binding address
    pub server_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Development accepts any origin, production only `public_base_url`
    pub environment: Environment,
    /// Public base URL of the web client, the sole allowed origin in production
    pub public_base_url: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Hosting platforms provide PORT, fall back to SERVER_ADDR or default
        let server_addr = match lookup("PORT") {
            Some(port) => format!("0.0.0.0:{}", port.trim()),
            None => lookup("SERVER_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
        };

        let environment = match lookup("APP_ENV").as_deref().map(str::trim) {
            None | Some("") | Some("development") => Environment::Development,
            Some("production") => Environment::Production,
            Some(other) => return Err(ConfigError::InvalidEnvironment(other.to_string())),
        };

        let public_base_url = lookup("PUBLIC_BASE_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());

        Ok(Self {
            server_addr: server_addr
                .parse()
                .map_err(|_| ConfigError::InvalidAddress)?,
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            environment,
            public_base_url,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid server address format")]
    InvalidAddress,

    #[error("Invalid APP_ENV value: {0} (expected development or production)")]
    InvalidEnvironment(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tokio_test::{assert_err, assert_ok};

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_to_development_on_port_3000() {
        let config = assert_ok!(config_from(&[]));
        assert_eq!(config.server_addr, "0.0.0.0:3000".parse().unwrap());
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.log_level, "info");
        assert!(config.public_base_url.is_none());
    }

    #[test]
    fn port_takes_precedence_over_server_addr() {
        let config = assert_ok!(config_from(&[
            ("PORT", "4100"),
            ("SERVER_ADDR", "127.0.0.1:9000"),
        ]));
        assert_eq!(config.server_addr, "0.0.0.0:4100".parse().unwrap());
    }

    #[test]
    fn production_trims_base_url() {
        let config = assert_ok!(config_from(&[
            ("APP_ENV", "production"),
            ("PUBLIC_BASE_URL", "https://arena.example.com/"),
        ]));
        assert!(config.is_production());
        assert_eq!(
            config.public_base_url.as_deref(),
            Some("https://arena.example.com")
        );
    }

    #[test]
    fn rejects_unknown_environment_and_bad_address() {
        assert!(matches!(
            config_from(&[("APP_ENV", "staging")]),
            Err(ConfigError::InvalidEnvironment(_))
        ));
        assert_err!(config_from(&[("SERVER_ADDR", "not-an-address")]));
    }
}
