//! Metadata records kept in a single sled tree, keyed by document key.

use std::convert::Infallible;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sled::transaction::{ConflictableTransactionError, TransactionError};
use sled::{Db, Tree};
use tracing::debug;

use crate::error::MetadataError;

type Result<T> = std::result::Result<T, MetadataError>;

/// Name of the sled tree holding metadata records.
pub const METADATA_TREE: &str = "DocMetadata";

/// Descriptive metadata stored next to each document.
///
/// Everything except `timestamp` may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Creation time, seconds since the Unix epoch
    pub timestamp: i64,
    /// Display name
    pub name: String,
    pub content_type: String,
    /// Tag of the extractor that produced the document
    pub extractor: String,
    pub title: String,
    /// Creation date as supplied by the client (free-form)
    pub creation_date: String,
    /// Modification date as supplied by the client (free-form)
    pub modification_date: String,
}

impl Metadata {
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }
}

/// Transactional metadata store backed by sled.
///
/// Each operation touches one key and is atomic on its own; sled serializes
/// writers and readers never see a partial record.
#[derive(Debug, Clone)]
pub struct MetadataStore {
    db: Db,
    tree: Tree,
}

impl MetadataStore {
    /// Open (or create) the sled database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let db = sled::open(path)?;
        if db.was_recovered() {
            debug!(path = %path.display(), "metadata database recovered");
        }
        Self::from_db(db)
    }

    /// Open a throwaway database that is deleted on drop.
    pub fn temporary() -> Result<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db)
    }

    /// Build on an already opened database.
    pub fn from_db(db: Db) -> Result<Self> {
        let tree = db.open_tree(METADATA_TREE)?;
        Ok(Self { db, tree })
    }

    /// Store `record` under `key`, replacing any previous record.
    pub fn put(&self, key: &str, record: &Metadata) -> Result<()> {
        let encoded = record.encode()?;

        let result = self.tree.transaction(|tx| {
            tx.insert(key.as_bytes(), encoded.as_slice())?;
            Ok::<_, ConflictableTransactionError<Infallible>>(())
        });
        match result {
            Ok(()) => {}
            Err(TransactionError::Abort(never)) => match never {},
            Err(TransactionError::Storage(e)) => return Err(e.into()),
        }
        self.db.flush()?;

        debug!(key = %key, "metadata stored");
        Ok(())
    }

    /// Load the record for `key`.
    pub fn get(&self, key: &str) -> Result<Metadata> {
        match self.tree.get(key.as_bytes())? {
            Some(bytes) => Metadata::decode(&bytes),
            None => Err(MetadataError::NotFound(key.to_string())),
        }
    }

    pub fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.tree.contains_key(key.as_bytes())?)
    }

    /// Remove the record for `key`.
    pub fn delete(&self, key: &str) -> Result<()> {
        let result = self.tree.transaction(|tx| match tx.remove(key.as_bytes())? {
            Some(_) => Ok(()),
            None => Err(ConflictableTransactionError::Abort(())),
        });
        match result {
            Ok(()) => {}
            Err(TransactionError::Abort(())) => {
                return Err(MetadataError::NotFound(key.to_string()));
            }
            Err(TransactionError::Storage(e)) => return Err(e.into()),
        }
        self.db.flush()?;

        debug!(key = %key, "metadata deleted");
        Ok(())
    }

    /// All keys with a metadata record, in key order.
    pub fn keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for key in self.tree.iter().keys() {
            let key = key?;
            keys.push(String::from_utf8_lossy(&key).into_owned());
        }
        Ok(keys)
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Cheap probe that the database still answers, used for readiness.
    pub fn check(&self) -> Result<()> {
        self.db.size_on_disk()?;
        Ok(())
    }
}
