use std::convert::Infallible;
use std::fmt;
use std::path::PathBuf;

use clap::Args;
use owo_colors::OwoColorize;

use docsvc_daemon::http_server::api::client::ApiError;
use docsvc_daemon::http_server::health::liveness::LivezRequest;
use docsvc_daemon::http_server::health::readiness::ReadyzRequest;
use docsvc_daemon::AppConfig;

/// Show the resolved local config and probe the daemon's status endpoints.
#[derive(Args, Debug, Clone)]
pub struct Health;

#[derive(Debug)]
pub struct LocalSettings {
    pub data_dir: PathBuf,
    pub port: u16,
}

/// Outcome of one probe.
#[derive(Debug, PartialEq, Eq)]
pub enum Probe {
    Up,
    /// Answered with a non-success status
    Failing(String),
    Unreachable,
}

impl From<Result<(), ApiError>> for Probe {
    fn from(result: Result<(), ApiError>) -> Self {
        match result {
            Ok(()) => Probe::Up,
            Err(e) => match e.status() {
                Some(status) => Probe::Failing(status.to_string()),
                None => Probe::Unreachable,
            },
        }
    }
}

impl fmt::Display for Probe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Probe::Up => write!(f, "{}", "up".green()),
            Probe::Failing(status) => write!(f, "{} ({status})", "failing".red()),
            Probe::Unreachable => write!(f, "{}", "unreachable".red()),
        }
    }
}

#[derive(Debug)]
pub struct HealthOutput {
    pub settings: Result<LocalSettings, String>,
    pub remote: String,
    pub livez: Probe,
    pub readyz: Probe,
}

impl fmt::Display for HealthOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", "local".bold())?;
        match &self.settings {
            Ok(settings) => {
                writeln!(
                    f,
                    "  {:<9}{}",
                    "data dir".dimmed(),
                    settings.data_dir.display()
                )?;
                writeln!(f, "  {:<9}{}", "port".dimmed(), settings.port)?;
            }
            Err(err) => writeln!(f, "  {:<9}{err}", "config".red())?,
        }

        writeln!(f, "{} {}", "daemon".bold(), self.remote)?;
        writeln!(f, "  {:<9}{}", "livez".dimmed(), self.livez)?;
        write!(f, "  {:<9}{}", "readyz".dimmed(), self.readyz)
    }
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Health {
    type Error = Infallible;
    type Output = HealthOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let settings = AppConfig::load(ctx.config_path.as_deref())
            .map(|file| LocalSettings {
                data_dir: file.storage.data_dir,
                port: ctx.port.unwrap_or(file.server.port),
            })
            .map_err(|e| e.to_string());

        let mut client = ctx.client.clone();
        let livez = Probe::from(client.call(LivezRequest {}).await.map(|_| ()));
        let readyz = Probe::from(client.call(ReadyzRequest {}).await.map(|_| ()));

        Ok(HealthOutput {
            settings,
            remote: client.base_url().to_string(),
            livez,
            readyz,
        })
    }
}
