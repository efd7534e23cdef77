//! Service configuration read from the environment.

use prontuario_compiler::RegistryConfig;

/// Environment variable holding the bind address.
pub const HOST_ENV: &str = "PRONTUARIO_HOST";

/// Environment variable holding the bind port.
pub const PORT_ENV: &str = "PRONTUARIO_PORT";

/// Environment variable holding the comma-separated CORS origins.
pub const CORS_ORIGINS_ENV: &str = "PRONTUARIO_CORS_ORIGINS";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";

/// Settings for one service process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Remote medication directory; `None` resolves against the local one.
    pub registry: Option<RegistryConfig>,
    /// Origins allowed by the CORS layer.
    pub cors_origins: Vec<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            registry: None,
            cors_origins: split_origins(DEFAULT_CORS_ORIGINS),
        }
    }
}

impl ServiceConfig {
    /// Reads the config from the process environment.
    pub fn from_env() -> Self {
        Self::from_source(|key| std::env::var(key).ok())
    }

    /// Reads the config through `lookup`, falling back to defaults for
    /// missing or unparsable values.
    pub fn from_source<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let host = lookup(HOST_ENV).unwrap_or(defaults.host);
        let port = lookup(PORT_ENV)
            .and_then(|p| p.parse().ok())
            .unwrap_or(defaults.port);

        let registry = RegistryConfig::from_source(&lookup);

        let cors_origins = lookup(CORS_ORIGINS_ENV)
            .map(|s| split_origins(&s))
            .unwrap_or(defaults.cors_origins);

        Self {
            host,
            port,
            registry,
            cors_origins,
        }
    }

    /// Returns the `host:port` bind address.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn split_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use prontuario_compiler::{REGISTRY_TIMEOUT_ENV, REGISTRY_URL_ENV};

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> ServiceConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServiceConfig::from_source(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.bind_addr(), "0.0.0.0:8000");
        assert!(config.registry.is_none());
        assert_eq!(
            config.cors_origins,
            vec!["http://localhost:3000", "http://localhost:5173"]
        );
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            (HOST_ENV, "127.0.0.1"),
            (PORT_ENV, "9100"),
            (REGISTRY_URL_ENV, "http://directory:8000"),
            (REGISTRY_TIMEOUT_ENV, "2"),
            (CORS_ORIGINS_ENV, "https://a.example, https://b.example,"),
        ]);

        assert_eq!(config.bind_addr(), "127.0.0.1:9100");
        let registry = config.registry.unwrap();
        assert_eq!(registry.base_url, "http://directory:8000");
        assert_eq!(registry.timeout_secs(), 2);
        assert_eq!(
            config.cors_origins,
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn test_unparsable_values_fall_back() {
        let config = config_from(&[
            (PORT_ENV, "http"),
            (REGISTRY_URL_ENV, "http://directory:8000"),
            (REGISTRY_TIMEOUT_ENV, "soon"),
        ]);
        assert_eq!(config.port, 8000);
        assert_eq!(config.registry.unwrap().timeout_secs(), 5);
    }

    #[test]
    fn test_zero_registry_timeout_falls_back() {
        let config = config_from(&[
            (REGISTRY_URL_ENV, "http://directory:8000"),
            (REGISTRY_TIMEOUT_ENV, "0"),
        ]);
        assert_eq!(config.registry.unwrap().timeout_secs(), 5);
    }

    #[test]
    fn test_blank_registry_url_means_local() {
        let config = config_from(&[(REGISTRY_URL_ENV, "  ")]);
        assert!(config.registry.is_none());
    }
}
