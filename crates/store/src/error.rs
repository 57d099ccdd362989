//! Error types for the document store.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from the file-backed blob store.
#[derive(Debug, Error)]
pub enum BlobError {
    #[error("blob not found for key {0}")]
    NotFound(String),

    #[error("file already exists for key {0}")]
    Conflict(String),

    #[error("no data uploaded for key {0}")]
    EmptyInput(String),

    #[error("invalid key: {0:?}")]
    InvalidKey(String),

    /// The blob file could not be opened for writing; nothing was written.
    #[error("failed to create file for key {key}: {source}")]
    Create {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// Streaming into the blob file failed; written bytes stay on disk.
    #[error("failed to write file for key {key}: {source}")]
    Write {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the sled-backed metadata store.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("metadata not found for key {0}")]
    NotFound(String),

    #[error("database error: {0}")]
    Database(#[from] sled::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] bincode::Error),
}

/// Errors from the compound document operations.
///
/// `MetadataWrite` and `MetadataDelete` mean the blob half of the operation
/// succeeded and the key is now an orphan. `BlobWrite` means a partial blob
/// without metadata was left behind.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("document not found for key {0}")]
    NotFound(String),

    #[error("document already exists for key {0}")]
    Conflict(String),

    #[error("no data uploaded")]
    EmptyInput,

    #[error("invalid key: {0:?}")]
    InvalidKey(String),

    #[error("error creating document file for key {key}: {source}")]
    BlobCreate {
        key: String,
        #[source]
        source: BlobError,
    },

    #[error("error writing document file for key {key}: {source}")]
    BlobWrite {
        key: String,
        #[source]
        source: BlobError,
    },

    #[error("blob store error: {0}")]
    Blob(#[source] BlobError),

    #[error("metadata error for key {key}: {source}")]
    Metadata {
        key: String,
        #[source]
        source: MetadataError,
    },

    #[error("error saving metadata for key {key}: {source}")]
    MetadataWrite {
        key: String,
        #[source]
        source: MetadataError,
    },

    #[error("error removing metadata for key {key}: {source}")]
    MetadataDelete {
        key: String,
        #[source]
        source: MetadataError,
    },

    #[error("metadata store error: {0}")]
    MetadataStore(#[source] MetadataError),
}

/// Errors opening the on-disk layout of a document store.
#[derive(Debug, Error)]
pub enum OpenError {
    #[error("failed to open document root {path}: {source}")]
    Blobs {
        path: PathBuf,
        #[source]
        source: BlobError,
    },

    #[error("failed to open metadata database {path}: {source}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: MetadataError,
    },
}

impl From<BlobError> for DocumentError {
    fn from(err: BlobError) -> Self {
        match err {
            BlobError::NotFound(key) => DocumentError::NotFound(key),
            BlobError::Conflict(key) => DocumentError::Conflict(key),
            BlobError::EmptyInput(_) => DocumentError::EmptyInput,
            BlobError::InvalidKey(key) => DocumentError::InvalidKey(key),
            BlobError::Create { key, source } => DocumentError::BlobCreate {
                key: key.clone(),
                source: BlobError::Create { key, source },
            },
            BlobError::Write { key, source } => DocumentError::BlobWrite {
                key: key.clone(),
                source: BlobError::Write { key, source },
            },
            err @ BlobError::Io(_) => DocumentError::Blob(err),
        }
    }
}

impl DocumentError {
    /// True when the key was already bound to a non-empty document.
    pub fn is_conflict(&self) -> bool {
        matches!(self, DocumentError::Conflict(_))
    }

    /// True when the requested key has no usable blob.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DocumentError::NotFound(_))
    }

    /// The document key the failure is about, when the error carries one.
    pub fn key(&self) -> Option<&str> {
        match self {
            DocumentError::NotFound(key)
            | DocumentError::Conflict(key)
            | DocumentError::InvalidKey(key)
            | DocumentError::BlobCreate { key, .. }
            | DocumentError::BlobWrite { key, .. }
            | DocumentError::Metadata { key, .. }
            | DocumentError::MetadataWrite { key, .. }
            | DocumentError::MetadataDelete { key, .. } => Some(key),
            DocumentError::EmptyInput
            | DocumentError::Blob(_)
            | DocumentError::MetadataStore(_) => None,
        }
    }

    /// True when the failure left exactly one half of the document behind.
    pub fn leaves_orphan(&self) -> bool {
        matches!(
            self,
            DocumentError::BlobWrite { .. }
                | DocumentError::MetadataWrite { .. }
                | DocumentError::MetadataDelete { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blob_errors_map_to_document_errors() {
        let err: DocumentError = BlobError::NotFound("a".into()).into();
        assert!(err.is_not_found());

        let err: DocumentError = BlobError::Conflict("a".into()).into();
        assert!(err.is_conflict());

        let err: DocumentError = BlobError::EmptyInput("a".into()).into();
        assert!(matches!(err, DocumentError::EmptyInput));
        assert_eq!(err.key(), None);

        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let err: DocumentError = BlobError::Io(io).into();
        assert!(matches!(err, DocumentError::Blob(BlobError::Io(_))));
        assert!(!err.leaves_orphan());
    }

    #[test]
    fn test_blob_write_failures_keep_key() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err: DocumentError = BlobError::Create {
            key: "a".into(),
            source: io,
        }
        .into();
        assert!(matches!(err, DocumentError::BlobCreate { .. }));
        assert_eq!(err.key(), Some("a"));
        assert!(!err.leaves_orphan());

        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "gone");
        let err: DocumentError = BlobError::Write {
            key: "b".into(),
            source: io,
        }
        .into();
        assert!(matches!(err, DocumentError::BlobWrite { .. }));
        assert_eq!(err.key(), Some("b"));
        assert!(err.leaves_orphan());
    }

    #[test]
    fn test_orphan_errors() {
        let err = DocumentError::MetadataWrite {
            key: "k".into(),
            source: MetadataError::NotFound("k".into()),
        };
        assert!(err.leaves_orphan());
        assert_eq!(err.key(), Some("k"));
        assert_eq!(
            err.to_string(),
            "error saving metadata for key k: metadata not found for key k"
        );
    }
}
