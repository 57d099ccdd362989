use std::path::PathBuf;

use clap::Parser;
use url::Url;

pub mod op;
pub mod ops;

use docsvc_daemon::service_config::DEFAULT_PORT;
use ops::{Delete, Get, Health, Post, Reconcile, Serve, Version};

#[derive(Parser, Debug)]
#[command(
    name = "docsvc",
    version,
    about = "Document storage service and client"
)]
pub struct Args {
    /// Daemon host for client commands
    #[arg(long, global = true, env = "DOCSVC_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Daemon port; `serve` listens on it, client commands connect to it
    #[arg(long, global = true, env = "DOCSVC_PORT")]
    pub port: Option<u16>,

    /// Full daemon URL, overrides --host and --port for client commands
    #[arg(long, global = true, env = "DOCSVC_REMOTE")]
    pub remote: Option<Url>,

    /// TOML config file for `serve` and `reconcile`
    #[arg(long, global = true, env = "DOCSVC_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    pub fn remote_url(&self) -> Result<Url, url::ParseError> {
        match &self.remote {
            Some(remote) => Ok(remote.clone()),
            None => Url::parse(&format!(
                "http://{}:{}",
                self.host,
                self.port.unwrap_or(DEFAULT_PORT)
            )),
        }
    }
}

crate::command_enum! {
    (Serve, Serve),
    (Get, Get),
    (Post, Post),
    (Delete, Delete),
    (Health, Health),
    (Version, Version),
    (Reconcile, Reconcile),
}
