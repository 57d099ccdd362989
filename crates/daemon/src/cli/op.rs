use std::path::PathBuf;

use docsvc_daemon::http_server::api::client::{ApiClient, ApiError};
use url::Url;

/// One CLI subcommand.
#[async_trait::async_trait]
pub trait Op: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;
    type Output: std::fmt::Display;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error>;
}

/// What every op gets: a client for the daemon plus the global flags.
#[derive(Debug, Clone)]
pub struct OpContext {
    pub client: ApiClient,
    /// `--config` TOML file, if given
    pub config_path: Option<PathBuf>,
    /// `--port` as given; `serve` binds it, clients connect to it
    pub port: Option<u16>,
}

impl OpContext {
    pub fn new(
        remote: &Url,
        config_path: Option<PathBuf>,
        port: Option<u16>,
    ) -> Result<Self, ApiError> {
        Ok(Self {
            client: ApiClient::new(remote)?,
            config_path,
            port,
        })
    }
}

/// Declares the `Command` subcommand enum, its combined error type and the
/// dispatch from variant to [`Op::execute`].
#[macro_export]
macro_rules! command_enum {
    ($(($variant:ident, $op:ty)),* $(,)?) => {
        #[derive(clap::Subcommand, Debug, Clone)]
        pub enum Command {
            $($variant($op),)*
        }

        #[derive(Debug, thiserror::Error)]
        pub enum CommandError {
            $(
                #[error(transparent)]
                $variant(<$op as $crate::cli::op::Op>::Error),
            )*
        }

        impl Command {
            pub async fn execute(
                &self,
                ctx: &$crate::cli::op::OpContext,
            ) -> Result<String, CommandError> {
                match self {
                    $(
                        Command::$variant(op) => {
                            $crate::cli::op::Op::execute(op, ctx)
                                .await
                                .map(|output| output.to_string())
                                .map_err(CommandError::$variant)
                        }
                    )*
                }
            }
        }
    };
}
