use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Args;

use docsvc_daemon::{
    daemon_filter, init_tracing, spawn_service, AppConfig, ConfigError, ServiceError,
};

#[derive(Args, Debug, Clone)]
pub struct Serve {
    /// Directory holding documents/ and metadata.db [default: data]
    #[arg(long, env = "DOCSVC_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Verbose logging
    #[arg(long)]
    pub debug: bool,

    /// Gzip-compress responses
    #[arg(long)]
    pub gzip: bool,

    /// Remove orphaned halves found at startup
    #[arg(long)]
    pub reconcile: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("daemon failed: {0}")]
    Service(#[from] ServiceError),
}

impl Serve {
    /// File values first, then flags on top.
    fn resolve(&self, file: &AppConfig, port: Option<u16>) -> docsvc_daemon::ServiceConfig {
        let mut config = file.service_config();
        if let Some(port) = port {
            config.listen_addr = SocketAddr::from(([0, 0, 0, 0], port));
        }
        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }
        if self.debug {
            config.log_level = tracing::Level::DEBUG;
        }
        config.gzip |= self.gzip;
        config.reconcile_on_startup |= self.reconcile;
        config
    }
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Serve {
    type Error = ServeError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let file = AppConfig::load(ctx.config_path.as_deref())?;
        let config = self.resolve(&file, ctx.port);

        init_tracing(&daemon_filter(config.log_level == tracing::Level::DEBUG));
        tracing::debug!(?config, "resolved service config");

        spawn_service(&config).await?;
        Ok("daemon stopped".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn serve() -> Serve {
        Serve {
            data_dir: None,
            debug: false,
            gzip: false,
            reconcile: false,
        }
    }

    #[test]
    fn test_flags_override_file() {
        let file =
            AppConfig::parse("[server]\nport = 9100\n[storage]\ndata_dir = \"/srv/docs\"\n")
                .unwrap();

        let config = serve().resolve(&file, None);
        assert_eq!(config.listen_addr.port(), 9100);
        assert_eq!(config.data_dir, PathBuf::from("/srv/docs"));

        let flags = Serve {
            data_dir: Some(PathBuf::from("local")),
            gzip: true,
            ..serve()
        };
        let config = flags.resolve(&file, Some(8001));
        assert_eq!(config.listen_addr.port(), 8001);
        assert_eq!(config.data_dir, PathBuf::from("local"));
        assert!(config.gzip);
    }
}
