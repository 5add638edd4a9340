//! Connection configuration for the Typesense client.

use std::env;
use std::time::Duration;

use crate::errors::SearchError;

/// Default Typesense host.
pub const DEFAULT_HOST: &str = "localhost";

/// Default Typesense port.
pub const DEFAULT_PORT: u16 = 8108;

/// Development API key used when none is configured.
pub const DEFAULT_API_KEY: &str = "govbrnews_api_key_change_in_production";

/// Connection parameters for the Typesense server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypesenseConfig {
    pub host: String,
    pub port: u16,
    pub protocol: String,
    pub api_key: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for TypesenseConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            protocol: "http".to_string(),
            api_key: DEFAULT_API_KEY.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl TypesenseConfig {
    /// Read the configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `TYPESENSE_HOST`: server host (default: localhost)
    /// - `TYPESENSE_PORT`: server port (default: 8108)
    /// - `TYPESENSE_PROTOCOL`: http or https (default: http)
    /// - `TYPESENSE_API_KEY`: API key (default: development key)
    /// - `TYPESENSE_TIMEOUT`: request timeout in seconds (default: 10)
    pub fn from_env() -> Result<Self, SearchError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SearchError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup("TYPESENSE_PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| SearchError::config(format!("invalid TYPESENSE_PORT '{}'", raw)))?,
            None => defaults.port,
        };

        let timeout = match lookup("TYPESENSE_TIMEOUT") {
            Some(raw) => Duration::from_secs(raw.trim().parse().map_err(|_| {
                SearchError::config(format!("invalid TYPESENSE_TIMEOUT '{}'", raw))
            })?),
            None => defaults.timeout,
        };

        let config = Self {
            host: lookup("TYPESENSE_HOST").unwrap_or(defaults.host),
            port,
            protocol: lookup("TYPESENSE_PROTOCOL").unwrap_or(defaults.protocol),
            api_key: lookup("TYPESENSE_API_KEY").unwrap_or(defaults.api_key),
            timeout,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration can be used to build a client.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.api_key.trim().is_empty() {
            return Err(SearchError::config("TYPESENSE_API_KEY must be set"));
        }
        if self.protocol != "http" && self.protocol != "https" {
            return Err(SearchError::config(format!(
                "unsupported protocol '{}'",
                self.protocol
            )));
        }
        Ok(())
    }

    /// Base URL of the server, e.g. `http://localhost:8108/`.
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}/", self.protocol, self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = TypesenseConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, TypesenseConfig::default());
        assert_eq!(config.base_url(), "http://localhost:8108/");
    }

    #[test]
    fn test_overrides() {
        let config = TypesenseConfig::from_lookup(lookup(&[
            ("TYPESENSE_HOST", "search.internal"),
            ("TYPESENSE_PORT", "443"),
            ("TYPESENSE_PROTOCOL", "https"),
            ("TYPESENSE_API_KEY", "secret"),
            ("TYPESENSE_TIMEOUT", "30"),
        ]))
        .unwrap();

        assert_eq!(config.base_url(), "https://search.internal:443/");
        assert_eq!(config.api_key, "secret");
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_empty_api_key_is_rejected() {
        let result = TypesenseConfig::from_lookup(lookup(&[("TYPESENSE_API_KEY", "")]));
        assert!(matches!(result, Err(SearchError::ConfigError(_))));
    }

    #[test]
    fn test_invalid_port() {
        let result = TypesenseConfig::from_lookup(lookup(&[("TYPESENSE_PORT", "http")]));
        assert!(result.is_err());
    }
}
