use std::fmt;
use std::path::PathBuf;

use clap::Args;
use owo_colors::OwoColorize;

use docsvc_daemon::{AppConfig, ConfigError};
use store::{DocumentError, DocumentStore, OpenError, OrphanReport, RepairStats};

/// Offline orphan scan. The daemon must not be running on the same data
/// directory, sled holds an exclusive lock on the database.
#[derive(Args, Debug, Clone)]
pub struct Reconcile {
    /// Remove the orphaned halves instead of only reporting them
    #[arg(long)]
    pub repair: bool,

    /// Directory holding documents/ and metadata.db [default: data]
    #[arg(long, env = "DOCSVC_DATA_DIR")]
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug)]
pub struct ReconcileOutput {
    pub data_dir: PathBuf,
    pub report: OrphanReport,
    pub stats: Option<RepairStats>,
}

impl fmt::Display for ReconcileOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({}):", "Store".bold(), self.data_dir.display())?;
        if self.report.is_clean() {
            return write!(f, "  {}", "clean".green());
        }

        let sections = [
            ("blob orphans:", &self.report.blob_orphans),
            ("metadata orphans:", &self.report.metadata_orphans),
            ("empty blobs:", &self.report.empty_blobs),
        ];
        for (label, keys) in sections {
            writeln!(f, "  {} {}", label.dimmed(), keys.len())?;
            for key in keys {
                writeln!(f, "    {}", key)?;
            }
        }

        match &self.stats {
            Some(stats) => write!(
                f,
                "{} {} blobs, {} metadata records, {} empty files removed; {} skipped, {} errors",
                "repaired:".bold(),
                stats.blobs_removed,
                stats.metadata_removed,
                stats.empty_discarded,
                stats.skipped,
                if stats.errors > 0 {
                    stats.errors.red().to_string()
                } else {
                    stats.errors.to_string()
                }
            ),
            None => write!(f, "{}", "run with --repair to remove them".yellow()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Open(#[from] OpenError),

    #[error("scan failed: {0}")]
    Scan(#[from] DocumentError),

    #[error("reconcile task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Reconcile {
    type Error = ReconcileError;
    type Output = ReconcileOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let file = AppConfig::load(ctx.config_path.as_deref())?;
        let data_dir = self.data_dir.clone().unwrap_or(file.storage.data_dir);
        let repair = self.repair;

        let dir = data_dir.clone();
        let (report, stats) = tokio::task::spawn_blocking(move || -> Result<_, ReconcileError> {
            let documents = DocumentStore::open(&dir)?;
            let report = documents.scan()?;
            let stats = if repair && !report.is_clean() {
                Some(documents.repair(&report))
            } else {
                None
            };
            Ok((report, stats))
        })
        .await??;

        Ok(ReconcileOutput {
            data_dir,
            report,
            stats,
        })
    }
}
