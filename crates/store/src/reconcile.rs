//! Offline orphan reconciliation.
//!
//! The document store never rolls back across its two substrates, so a crash
//! or a failed metadata write can leave one half of a document behind. A scan
//! compares both sides; a repair removes whichever half is left over.

use std::collections::BTreeSet;

use tracing::{info, warn};

use crate::document::{DocumentState, DocumentStore};
use crate::error::DocumentError;

/// Keys found in an inconsistent state by [`DocumentStore::scan`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrphanReport {
    /// Non-empty blob, no metadata record
    pub blob_orphans: Vec<String>,
    /// Metadata record, no non-empty blob
    pub metadata_orphans: Vec<String>,
    /// Zero-size blob files left by empty or aborted uploads
    pub empty_blobs: Vec<String>,
}

impl OrphanReport {
    pub fn is_clean(&self) -> bool {
        self.blob_orphans.is_empty()
            && self.metadata_orphans.is_empty()
            && self.empty_blobs.is_empty()
    }

    pub fn total(&self) -> usize {
        self.blob_orphans.len() + self.metadata_orphans.len() + self.empty_blobs.len()
    }
}

/// Outcome of [`DocumentStore::repair`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepairStats {
    pub blobs_removed: usize,
    pub metadata_removed: usize,
    pub empty_discarded: usize,
    /// Keys whose state changed since the scan and were left alone
    pub skipped: usize,
    pub errors: usize,
}

impl DocumentStore {
    /// Compare the blob directory against the metadata tree.
    pub fn scan(&self) -> Result<OrphanReport, DocumentError> {
        let blob_keys: BTreeSet<String> = self.blobs().keys()?.into_iter().collect();
        let metadata_keys: BTreeSet<String> = self
            .metadata()
            .keys()
            .map_err(DocumentError::MetadataStore)?
            .into_iter()
            .collect();

        Ok(OrphanReport {
            blob_orphans: blob_keys.difference(&metadata_keys).cloned().collect(),
            metadata_orphans: metadata_keys.difference(&blob_keys).cloned().collect(),
            empty_blobs: self.blobs().empty_keys()?,
        })
    }

    /// Remove the leftover half of every key in `report`.
    ///
    /// Each key is locked and re-checked first, so a document completed or
    /// removed after the scan is skipped rather than damaged. Failures are
    /// logged and counted; the remaining keys are still processed.
    pub fn repair(&self, report: &OrphanReport) -> RepairStats {
        let mut stats = RepairStats::default();

        for key in &report.blob_orphans {
            let _guard = self.locks().lock(key);
            match self.state(key) {
                Ok(DocumentState::BlobOrphan) => match self.blobs().delete(key) {
                    Ok(()) => {
                        info!(key = %key, "removed orphaned blob");
                        stats.blobs_removed += 1;
                    }
                    Err(e) => {
                        warn!(key = %key, error = %e, "failed to remove orphaned blob");
                        stats.errors += 1;
                    }
                },
                Ok(_) => stats.skipped += 1,
                Err(e) => {
                    warn!(key = %key, error = %e, "failed to check key state");
                    stats.errors += 1;
                }
            }
        }

        for key in &report.metadata_orphans {
            let _guard = self.locks().lock(key);
            match self.state(key) {
                Ok(DocumentState::MetadataOrphan) => match self.metadata().delete(key) {
                    Ok(()) => {
                        info!(key = %key, "removed orphaned metadata");
                        stats.metadata_removed += 1;
                    }
                    Err(e) => {
                        warn!(key = %key, error = %e, "failed to remove orphaned metadata");
                        stats.errors += 1;
                    }
                },
                Ok(_) => stats.skipped += 1,
                Err(e) => {
                    warn!(key = %key, error = %e, "failed to check key state");
                    stats.errors += 1;
                }
            }
        }

        for key in &report.empty_blobs {
            let _guard = self.locks().lock(key);
            // a retried upload may have filled it in since the scan
            if self.blobs().exists(key) {
                stats.skipped += 1;
                continue;
            }
            match self.blobs().discard(key) {
                Ok(()) => {
                    info!(key = %key, "discarded empty blob");
                    stats.empty_discarded += 1;
                }
                Err(e) => {
                    warn!(key = %key, error = %e, "failed to discard empty blob");
                    stats.errors += 1;
                }
            }
        }

        stats
    }
}
