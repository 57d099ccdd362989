//! File-backed blob storage: one regular file per document key.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::BlobError;
use crate::key::validate_key;

type Result<T> = std::result::Result<T, BlobError>;

/// Raw document bytes stored under a root directory, named exactly by key.
///
/// A zero-size file counts as absent: it is what an empty or interrupted
/// upload leaves behind.
#[derive(Debug, Clone)]
pub struct BlobStore {
    root: PathBuf,
}

impl BlobStore {
    /// Open a blob store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        debug!(root = %root.display(), "blob store opened");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// True iff a non-empty blob exists for `key`.
    pub fn exists(&self, key: &str) -> bool {
        match self.path(key) {
            Ok(path) => file_len(&path).map(|len| len > 0).unwrap_or(false),
            Err(_) => false,
        }
    }

    /// Stream `reader` into a new blob for `key`, returning the byte count.
    ///
    /// A zero-size leftover from an earlier attempt is truncated and reused.
    /// On `EmptyInput` the empty file stays on disk; on `Write` the bytes
    /// written so far stay on disk.
    pub fn create<R: Read>(&self, key: &str, mut reader: R) -> Result<u64> {
        let path = self.path(key)?;
        if self.exists(key) {
            return Err(BlobError::Conflict(key.to_string()));
        }

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .map_err(|source| BlobError::Create {
                key: key.to_string(),
                source,
            })?;

        let write_failed = |source| BlobError::Write {
            key: key.to_string(),
            source,
        };
        let size = io::copy(&mut reader, &mut file).map_err(write_failed)?;
        if size == 0 {
            debug!(key = %key, "empty upload, leaving zero-size blob");
            return Err(BlobError::EmptyInput(key.to_string()));
        }
        file.sync_all().map_err(write_failed)?;

        debug!(key = %key, size, "blob written");
        Ok(size)
    }

    /// Read the whole blob for `key`.
    pub fn read(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.path(key)?;
        if !self.exists(key) {
            return Err(BlobError::NotFound(key.to_string()));
        }

        let mut file = File::open(&path).map_err(|e| not_found_or_io(key, e))?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        Ok(data)
    }

    /// Permanently remove the blob for `key`.
    ///
    /// A zero-size leftover counts as absent and is left for [`discard`].
    ///
    /// [`discard`]: BlobStore::discard
    pub fn delete(&self, key: &str) -> Result<()> {
        let path = self.path(key)?;
        if !self.exists(key) {
            return Err(BlobError::NotFound(key.to_string()));
        }
        fs::remove_file(&path).map_err(|e| not_found_or_io(key, e))?;
        debug!(key = %key, "blob deleted");
        Ok(())
    }

    /// Remove whatever file sits at `key`, ignoring a missing file.
    pub fn discard(&self, key: &str) -> Result<()> {
        let path = self.path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Keys of all non-empty blobs, sorted.
    pub fn keys(&self) -> Result<Vec<String>> {
        self.scan(|len| len > 0)
    }

    /// Keys of zero-size leftovers, sorted.
    pub fn empty_keys(&self) -> Result<Vec<String>> {
        self.scan(|len| len == 0)
    }

    fn scan(&self, keep: impl Fn(u64) -> bool) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let meta = entry.metadata()?;
            if !meta.is_file() || !keep(meta.len()) {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => keys.push(name),
                Err(name) => debug!(name = ?name, "skipping non UTF-8 blob file name"),
            }
        }
        keys.sort();
        Ok(keys)
    }

    fn path(&self, key: &str) -> Result<PathBuf> {
        if !validate_key(key) {
            return Err(BlobError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(key))
    }
}

fn file_len(path: &Path) -> io::Result<u64> {
    let meta = fs::metadata(path)?;
    Ok(meta.len())
}

fn not_found_or_io(key: &str, err: io::Error) -> BlobError {
    if err.kind() == io::ErrorKind::NotFound {
        BlobError::NotFound(key.to_string())
    } else {
        BlobError::Io(err)
    }
}
