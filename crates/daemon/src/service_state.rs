use std::path::PathBuf;

use store::{DocumentStore, OpenError};

use super::service_config::Config;

/// Main service state, shared by every request handler.
#[derive(Debug, Clone)]
pub struct State {
    documents: DocumentStore,
}

impl State {
    /// Open the document store under the configured data directory and run
    /// the startup orphan scan. Blocking; call from a blocking context.
    pub fn from_config(config: &Config) -> Result<Self, StateSetupError> {
        std::fs::create_dir_all(&config.data_dir).map_err(|source| {
            StateSetupError::DataDirectory {
                path: config.data_dir.clone(),
                source,
            }
        })?;
        tracing::info!(data_dir = %config.data_dir.display(), "opening document store");

        let documents = DocumentStore::open(&config.data_dir)?;
        let state = Self::from_store(documents);
        state.reconcile(config.reconcile_on_startup);
        Ok(state)
    }

    pub fn from_store(documents: DocumentStore) -> Self {
        Self { documents }
    }

    pub fn documents(&self) -> &DocumentStore {
        &self.documents
    }

    /// Report orphans left by earlier runs, and remove them when `repair` is set.
    /// A failed scan is logged and does not stop startup.
    fn reconcile(&self, repair: bool) {
        let report = match self.documents.scan() {
            Ok(report) => report,
            Err(e) => {
                tracing::warn!(error = %e, "startup orphan scan failed");
                return;
            }
        };

        if report.is_clean() {
            tracing::debug!("startup orphan scan found nothing");
            return;
        }

        tracing::warn!(
            blob_orphans = report.blob_orphans.len(),
            metadata_orphans = report.metadata_orphans.len(),
            empty_blobs = report.empty_blobs.len(),
            "store contains orphaned documents"
        );

        if repair {
            let stats = self.documents.repair(&report);
            tracing::info!(
                blobs_removed = stats.blobs_removed,
                metadata_removed = stats.metadata_removed,
                empty_discarded = stats.empty_discarded,
                skipped = stats.skipped,
                errors = stats.errors,
                "startup repair finished"
            );
        } else {
            tracing::warn!("run `docsvc reconcile --repair` or start with --reconcile to clean up");
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateSetupError {
    #[error("failed to create data directory {path}: {source}")]
    DataDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open document store: {0}")]
    Store(#[from] OpenError),
}
