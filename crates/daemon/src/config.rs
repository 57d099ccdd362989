//! Optional TOML configuration file for `docsvc serve`.
//!
//! ```toml
//! [server]
//! port = 8000
//! gzip = true
//! request_timeout_secs = 90
//! max_upload_mb = 64
//!
//! [storage]
//! data_dir = "data"
//! reconcile_on_startup = false
//!
//! [log]
//! debug = false
//! ```

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::service_config::{
    Config as ServiceConfig, DEFAULT_DATA_DIR, DEFAULT_MAX_UPLOAD_SIZE, DEFAULT_PORT,
    DEFAULT_REQUEST_TIMEOUT,
};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Top-level configuration, loaded from a TOML file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    pub gzip: bool,
    pub request_timeout_secs: u64,
    pub max_upload_mb: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            gzip: false,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT.as_secs(),
            max_upload_mb: DEFAULT_MAX_UPLOAD_SIZE / (1024 * 1024),
        }
    }
}

/// Where documents and metadata live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub reconcile_on_startup: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            reconcile_on_startup: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub debug: bool,
}

impl AppConfig {
    /// Load `path`, falling back to defaults when no path is given or the
    /// file does not exist.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        if !path.exists() {
            tracing::warn!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Resolve into daemon runtime settings.
    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], self.server.port)),
            data_dir: self.storage.data_dir.clone(),
            log_level: if self.log.debug {
                tracing::Level::DEBUG
            } else {
                tracing::Level::INFO
            },
            gzip: self.server.gzip,
            request_timeout: Duration::from_secs(self.server.request_timeout_secs),
            max_upload_size: self.server.max_upload_mb.saturating_mul(1024 * 1024),
            reconcile_on_startup: self.storage.reconcile_on_startup,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_default() {
        let config = AppConfig::parse("").unwrap();
        assert_eq!(config, AppConfig::default());

        let service = config.service_config();
        assert_eq!(service.listen_addr.port(), 8000);
        assert_eq!(service.data_dir, PathBuf::from("data"));
        assert_eq!(service.request_timeout, Duration::from_secs(90));
        assert_eq!(service.max_upload_size, 64 * 1024 * 1024);
        assert!(!service.gzip);
    }

    #[test]
    fn test_partial_sections() {
        let config = AppConfig::parse(
            r#"
            [server]
            port = 9100
            gzip = true

            [storage]
            data_dir = "/var/lib/docsvc"

            [log]
            debug = true
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9100);
        assert!(config.server.gzip);
        assert_eq!(config.server.request_timeout_secs, 90);
        assert_eq!(config.storage.data_dir, PathBuf::from("/var/lib/docsvc"));
        assert!(!config.storage.reconcile_on_startup);
        assert_eq!(config.service_config().log_level, tracing::Level::DEBUG);
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = AppConfig::load(Some(&dir.path().join("nope.toml"))).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_invalid_file_is_parse_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("docsvc.toml");
        std::fs::write(&path, "[server]\nport = \"eighty\"\n").unwrap();

        let err = AppConfig::load(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
