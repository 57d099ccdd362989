use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(90);
pub const DEFAULT_MAX_UPLOAD_SIZE: usize = 64 * 1024 * 1024;

/// Fully resolved runtime settings for one daemon instance.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP API binds to
    pub listen_addr: SocketAddr,
    /// Holds `documents/` and `metadata.db`
    pub data_dir: PathBuf,
    pub log_level: tracing::Level,
    /// Gzip-compress responses
    pub gzip: bool,
    pub request_timeout: Duration,
    /// Largest accepted upload, in bytes
    pub max_upload_size: usize,
    /// Repair orphans found by the startup scan
    pub reconcile_on_startup: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            log_level: tracing::Level::INFO,
            gzip: false,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
            reconcile_on_startup: false,
        }
    }
}
