//! Persistent index store — an ordered/hashed key→value mapping on disk.
//!
//! `sled` supplies the embedded-KV contract §4.2 leaves abstract: ordered
//! iteration, crash-safe writes, and a single-file-on-disk artifact. Reserved
//! meta-keys (`__codec__`, `__file_<n>__`, `__sentinel__`) share the same
//! keyspace as record ids — not collidable with record ids in typical
//! corpora, and this crate does not guard against it.

use std::path::{Path, PathBuf};

use crate::error::StoreError;

pub const META_CODEC: &[u8] = b"__codec__";
pub const META_SENTINEL: &[u8] = b"__sentinel__";
pub const SENTINEL_IN_PROGRESS: &[u8] = b"in_progress";

pub fn meta_file_key(file_no: u8) -> Vec<u8> {
    format!("__file_{file_no}__").into_bytes()
}

/// Open mode for [`IndexStore::open`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    Read,
    CreateRw,
}

/// The contract §4.2 names: an opaque byte-string → byte-string mapping,
/// reopenable by an independent process.
pub trait IndexStore: Sized {
    fn open(path: &Path, mode: OpenMode) -> Result<Self, StoreError>;
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;
    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError>;
    fn remove(&self, key: &[u8]) -> Result<(), StoreError>;
    fn iterate_keys(&self) -> Result<Vec<Vec<u8>>, StoreError>;
    fn close(self) -> Result<(), StoreError>;
}

/// `sled`-backed implementation of [`IndexStore`].
pub struct SledStore {
    path: PathBuf,
    db: sled::Db,
}

impl IndexStore for SledStore {
    fn open(path: &Path, mode: OpenMode) -> Result<Self, StoreError> {
        Self::open_with_cache_capacity(path, mode, None)
    }

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.db.get(key)?.map(|v| v.to_vec()))
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.db.insert(key, value)?;
        Ok(())
    }

    fn remove(&self, key: &[u8]) -> Result<(), StoreError> {
        self.db.remove(key)?;
        Ok(())
    }

    fn iterate_keys(&self) -> Result<Vec<Vec<u8>>, StoreError> {
        let mut keys = Vec::new();
        for kv in self.db.iter() {
            let (k, _) = kv?;
            keys.push(k.to_vec());
        }
        Ok(keys)
    }

    fn close(self) -> Result<(), StoreError> {
        self.db.flush()?;
        Ok(())
    }
}

impl SledStore {
    /// Open with an optional `sled` page-cache budget (§6's `store_args`
    /// passthrough). `None` keeps `sled`'s own default.
    pub fn open_with_cache_capacity(path: &Path, mode: OpenMode, cache_capacity: Option<u64>) -> Result<Self, StoreError> {
        if mode == OpenMode::Read && !path.exists() {
            return Err(StoreError::Unavailable {
                path: path.to_path_buf(),
                reason: "index does not exist".to_owned(),
            });
        }
        let mut config = sled::Config::new().path(path);
        if let Some(bytes) = cache_capacity {
            config = config.cache_capacity(bytes);
        }
        let db = config.open().map_err(|e| StoreError::Unavailable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(Self { path: path.to_path_buf(), db })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Permanently destroy the on-disk store. Called after an aborted
    /// indexing pass, and from [`crate::config::IndexOptions::clean`].
    pub fn unlink(path: &Path) -> std::io::Result<()> {
        if path.is_dir() {
            std::fs::remove_dir_all(path)
        } else if path.exists() {
            std::fs::remove_file(path)
        } else {
            Ok(())
        }
    }
}

impl From<sled::Error> for StoreError {
    fn from(e: sled::Error) -> Self {
        StoreError::Io(std::io::Error::new(std::io::ErrorKind::Other, e))
    }
}
