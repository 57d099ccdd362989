//! Document store
//!
//! This crate pairs two independently failing substrates into one logical
//! document:
//!
//! - a file hierarchy holding the raw bytes of each document (one file per key)
//! - a sled database holding a small metadata record per key in the
//!   `DocMetadata` tree
//!
//! [`DocumentStore`] drives both in a fixed order and reports partial failures
//! as typed errors instead of hiding them. A key for which only one half
//! exists is an *orphan*; orphans are surfaced to the caller and can be
//! cleaned up by the reconciler ([`DocumentStore::scan`] /
//! [`DocumentStore::repair`]).
//!
//! # Example
//!
//! ```rust,no_run
//! use store::{DocumentStore, NewDocument};
//! use std::path::Path;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let docs = DocumentStore::open(Path::new("/tmp/docsvc"))?;
//!
//! let created = docs.create(
//!     NewDocument::default().content_type("text/plain"),
//!     &b"hello world"[..],
//! )?;
//! println!("stored {} bytes under {}", created.size, created.key);
//!
//! let doc = docs.fetch(&created.key)?;
//! assert_eq!(doc.content, b"hello world");
//!
//! docs.remove(&created.key)?;
//! # Ok(())
//! # }
//! ```

mod blob;
mod document;
mod error;
mod key;
mod locks;
mod metadata;
mod reconcile;

pub use blob::BlobStore;
pub use document::{Created, Document, DocumentState, DocumentStore, NewDocument};
pub use error::{BlobError, DocumentError, MetadataError, OpenError};
pub use key::{validate_key, KeyAllocator, SequentialKeys, UuidKeys};
pub use locks::{KeyGuard, KeyLocks};
pub use metadata::{Metadata, MetadataStore, METADATA_TREE};
pub use reconcile::{OrphanReport, RepairStats};

/// Directory under the data dir that holds one blob file per document key.
pub const DOCUMENTS_DIR_NAME: &str = "documents";

/// Sled database path under the data dir.
pub const METADATA_DB_NAME: &str = "metadata.db";
