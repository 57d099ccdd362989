//! The orchestrator: one logical document over a blob and a metadata record.

use std::fmt;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use crate::blob::BlobStore;
use crate::error::{DocumentError, MetadataError, OpenError};
use crate::key::{validate_key, KeyAllocator, UuidKeys};
use crate::locks::KeyLocks;
use crate::metadata::{Metadata, MetadataStore};
use crate::{DOCUMENTS_DIR_NAME, METADATA_DB_NAME};

type Result<T> = std::result::Result<T, DocumentError>;

/// Descriptive fields for a document about to be created.
///
/// An empty `key` asks the store to allocate one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewDocument {
    pub key: String,
    pub content_type: String,
    pub name: String,
    pub extractor: String,
    pub title: String,
    pub creation_date: String,
    pub modification_date: String,
}

impl NewDocument {
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn extractor(mut self, extractor: impl Into<String>) -> Self {
        self.extractor = extractor.into();
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn creation_date(mut self, date: impl Into<String>) -> Self {
        self.creation_date = date.into();
        self
    }

    pub fn modification_date(mut self, date: impl Into<String>) -> Self {
        self.modification_date = date.into();
        self
    }

    fn into_metadata(self, timestamp: i64) -> Metadata {
        Metadata {
            timestamp,
            name: self.name,
            content_type: self.content_type,
            extractor: self.extractor,
            title: self.title,
            creation_date: self.creation_date,
            modification_date: self.modification_date,
        }
    }
}

/// Result of a successful create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Created {
    pub key: String,
    pub size: u64,
}

/// A complete document: blob bytes merged with their metadata record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub key: String,
    pub content: Vec<u8>,
    pub metadata: Metadata,
}

/// Which halves of a document exist for a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentState {
    Absent,
    Complete,
    /// Non-empty blob without a metadata record
    BlobOrphan,
    /// Metadata record without a non-empty blob
    MetadataOrphan,
}

/// Coordinates a [`BlobStore`] and a [`MetadataStore`].
///
/// Create and remove on the same key are serialized by a per-key lock, so
/// the existence check and the write it guards cannot interleave with
/// another writer. Nothing is rolled back across the two stores; a failure
/// after the blob step is reported as an orphan-producing error.
#[derive(Clone)]
pub struct DocumentStore {
    blobs: BlobStore,
    metadata: MetadataStore,
    keys: Arc<dyn KeyAllocator>,
    locks: KeyLocks,
}

impl fmt::Debug for DocumentStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentStore")
            .field("blobs", &self.blobs)
            .field("metadata", &self.metadata)
            .field("locks", &self.locks)
            .finish_non_exhaustive()
    }
}

impl DocumentStore {
    /// Open the default layout under `data_dir` with random UUID keys.
    pub fn open(data_dir: &Path) -> std::result::Result<Self, OpenError> {
        let root = data_dir.join(DOCUMENTS_DIR_NAME);
        let blobs = BlobStore::open(&root).map_err(|source| OpenError::Blobs {
            path: root.clone(),
            source,
        })?;

        let db_path = data_dir.join(METADATA_DB_NAME);
        let metadata = MetadataStore::open(&db_path).map_err(|source| OpenError::Metadata {
            path: db_path.clone(),
            source,
        })?;

        Ok(Self::new(blobs, metadata, Arc::new(UuidKeys)))
    }

    pub fn new(blobs: BlobStore, metadata: MetadataStore, keys: Arc<dyn KeyAllocator>) -> Self {
        Self {
            blobs,
            metadata,
            keys,
            locks: KeyLocks::new(),
        }
    }

    pub fn blobs(&self) -> &BlobStore {
        &self.blobs
    }

    pub fn metadata(&self) -> &MetadataStore {
        &self.metadata
    }

    pub(crate) fn locks(&self) -> &KeyLocks {
        &self.locks
    }

    /// Store a new document from `reader`.
    ///
    /// Fails with `Conflict` if a non-empty blob already exists for the key,
    /// `EmptyInput` if the reader yields nothing (no metadata is written), and
    /// `MetadataWrite` if the blob was stored but its record was not, which
    /// leaves a blob orphan.
    pub fn create<R: Read>(&self, mut doc: NewDocument, reader: R) -> Result<Created> {
        let key = if doc.key.is_empty() {
            self.keys.allocate()
        } else {
            std::mem::take(&mut doc.key)
        };
        if !validate_key(&key) {
            return Err(DocumentError::InvalidKey(key));
        }

        let _guard = self.locks.lock(&key);
        if self.blobs.exists(&key) {
            return Err(DocumentError::Conflict(key));
        }

        let size = self.blobs.create(&key, reader)?;

        let record = doc.into_metadata(Utc::now().timestamp());
        if let Err(source) = self.metadata.put(&key, &record) {
            return Err(DocumentError::MetadataWrite { key, source });
        }

        debug!(key = %key, size, "document created");
        Ok(Created { key, size })
    }

    /// Read a document's bytes and its metadata record.
    ///
    /// A missing blob is `NotFound`; a readable blob whose record is missing
    /// or unreadable is a `Metadata` error.
    pub fn fetch(&self, key: &str) -> Result<Document> {
        let content = self.blobs.read(key)?;
        let metadata = self
            .metadata
            .get(key)
            .map_err(|source| DocumentError::Metadata {
                key: key.to_string(),
                source,
            })?;

        Ok(Document {
            key: key.to_string(),
            content,
            metadata,
        })
    }

    /// Delete the blob, then the metadata record.
    ///
    /// A missing record is fine: removing a blob orphan leaves the key absent.
    /// If the blob is gone but an existing record could not be removed the key
    /// is left as a metadata orphan and `MetadataDelete` is returned.
    pub fn remove(&self, key: &str) -> Result<()> {
        if !validate_key(key) {
            return Err(DocumentError::InvalidKey(key.to_string()));
        }

        let _guard = self.locks.lock(key);
        self.blobs.delete(key)?;
        match self.metadata.delete(key) {
            // a blob orphan: nothing left to remove
            Ok(()) | Err(MetadataError::NotFound(_)) => {}
            Err(source) => {
                return Err(DocumentError::MetadataDelete {
                    key: key.to_string(),
                    source,
                });
            }
        }

        debug!(key = %key, "document removed");
        Ok(())
    }

    /// Which halves exist for `key` right now. Takes no lock.
    pub fn state(&self, key: &str) -> Result<DocumentState> {
        if !validate_key(key) {
            return Err(DocumentError::InvalidKey(key.to_string()));
        }

        let has_blob = self.blobs.exists(key);
        let has_metadata =
            self.metadata
                .contains(key)
                .map_err(|source| DocumentError::Metadata {
                    key: key.to_string(),
                    source,
                })?;

        Ok(match (has_blob, has_metadata) {
            (false, false) => DocumentState::Absent,
            (true, true) => DocumentState::Complete,
            (true, false) => DocumentState::BlobOrphan,
            (false, true) => DocumentState::MetadataOrphan,
        })
    }
}
