// Service modules (daemon functionality)
pub mod config;
pub mod http_server;
pub mod process;
pub mod service_config;
pub mod service_state;

// Re-exports for the CLI and tests
pub use config::{AppConfig, ConfigError};
pub use process::{spawn_service, start_service, ServiceError, ShutdownHandle};
pub use service_config::Config as ServiceConfig;
pub use service_state::{State as ServiceState, StateSetupError};

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Name and version of the running build, served on `/_status/version`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildInfo {
    pub name: String,
    pub version: String,
}

impl std::fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.name, self.version)
    }
}

pub fn build_info() -> BuildInfo {
    BuildInfo {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }
}

/// Install the global fmt subscriber. `RUST_LOG` wins over `default_filter`.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Default filter for the daemon: our crates at `info` (or `debug`), the rest at `warn`.
pub fn daemon_filter(debug: bool) -> String {
    let level = if debug { "debug" } else { "info" };
    format!("docsvc={level},docsvc_daemon={level},store={level},tower_http={level},warn")
}
