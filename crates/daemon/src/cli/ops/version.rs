use std::convert::Infallible;
use std::fmt;

use clap::Args;
use owo_colors::OwoColorize;

use docsvc_daemon::http_server::health::version::VersionRequest;
use docsvc_daemon::{build_info, BuildInfo};

#[derive(Args, Debug, Clone)]
pub struct Version;

#[derive(Debug)]
pub struct VersionOutput {
    pub local: BuildInfo,
    /// None when the daemon could not be reached
    pub remote: Option<BuildInfo>,
}

impl fmt::Display for VersionOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {}", "client:".dimmed(), self.local)?;
        match &self.remote {
            Some(remote) => write!(f, "{} {}", "daemon:".dimmed(), remote),
            None => write!(f, "{} {}", "daemon:".dimmed(), "NOT REACHABLE".red()),
        }
    }
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Version {
    type Error = Infallible;
    type Output = VersionOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut client = ctx.client.clone();
        let remote = match client.call(VersionRequest {}).await {
            Ok(info) => Some(info),
            Err(e) => {
                tracing::debug!(error = %e, "version request failed");
                None
            }
        };

        Ok(VersionOutput {
            local: build_info(),
            remote,
        })
    }
}
