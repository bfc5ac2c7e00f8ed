//! Service configuration.
//!
//! Settings come from an optional TOML file named by `SCAFFOLD_CONFIG`, then
//! individual environment variables override single fields:
//!
//! | variable | field |
//! |---|---|
//! | `HOST` | `host` |
//! | `PORT` | `port` |
//! | `WAITLIST_PATH` | `waitlist_path` (empty keeps signups in memory) |
//! | `CATALOG_PATH` | `catalog_path` |
//!
//! ```toml
//! host = "127.0.0.1"
//! port = 8080
//! waitlist_path = "/var/lib/scaffoldpro/waitlist.json"
//! log_filter = "scaffold_web=info,tower_http=info"
//!
//! [sizing]
//! frame_convention = "per_level"
//! top_level_only = false
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use scaffold_core::calculations::SizingOptions;

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "SCAFFOLD_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value for {var}: '{value}'")]
    Env { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,

    /// Waitlist document; `None` keeps signups in memory
    pub waitlist_path: Option<PathBuf>,

    /// Catalog TOML; `None` uses the built-in catalog
    pub catalog_path: Option<PathBuf>,

    /// Sizing options used when a request does not send its own
    pub sizing: SizingOptions,

    /// Default tracing filter when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 8080,
            waitlist_path: Some(PathBuf::from("data/waitlist.json")),
            catalog_path: None,
            sizing: SizingOptions::default(),
            log_filter: "scaffold_web=info,scaffold_core=info,tower_http=info".to_string(),
        }
    }
}

impl ServerConfig {
    /// Load from `SCAFFOLD_CONFIG` (if set) and the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base = match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };
        base.with_overrides(|var| std::env::var(var).ok())
    }

    /// Parse a TOML config file; missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply environment overrides through `lookup`.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::Env { var: "PORT", value: port })?;
        }
        if let Some(path) = lookup("WAITLIST_PATH") {
            self.waitlist_path = (!path.trim().is_empty()).then(|| PathBuf::from(path));
        }
        if let Some(path) = lookup("CATALOG_PATH") {
            self.catalog_path = (!path.trim().is_empty()).then(|| PathBuf::from(path));
        }
        Ok(self)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
        assert!(config.catalog_path.is_none());
        assert_eq!(config.sizing, SizingOptions::default());
    }

    #[test]
    fn test_partial_toml() {
        let config: ServerConfig = toml::from_str(
            r#"
            port = 9000
            [sizing]
            top_level_only = true
            "#,
        )
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.host, "0.0.0.0");
        assert!(config.sizing.top_level_only);
    }

    #[test]
    fn test_env_overrides() {
        let config = ServerConfig::default()
            .with_overrides(env(&[
                ("HOST", "127.0.0.1"),
                ("PORT", "3000"),
                ("WAITLIST_PATH", ""),
                ("CATALOG_PATH", "/etc/scaffold/catalog.toml"),
            ]))
            .unwrap();
        assert_eq!(config.bind_addr(), "127.0.0.1:3000");
        assert!(config.waitlist_path.is_none());
        assert_eq!(config.catalog_path, Some(PathBuf::from("/etc/scaffold/catalog.toml")));
    }

    #[test]
    fn test_bad_port() {
        let err = ServerConfig::default()
            .with_overrides(env(&[("PORT", "eighty")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Env { var: "PORT", .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = ServerConfig::from_file(Path::new("/nonexistent/scaffold.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
