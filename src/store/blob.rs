//! Key-value blob persistence backends.
//!
//! The content store only needs `put`/`get`; hosts supply their own
//! backend (object storage, a database column, ...) by implementing
//! [`BlobStore`]. Two reference backends ship with the crate: an
//! in-memory map and a one-file-per-key filesystem store.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::RwLock;

/// Abstract key-value blob persistence.
///
/// `put` must be safe under concurrent writers of the same key with
/// identical bytes: content-addressed keys make a duplicate write a
/// harmless overwrite, so no caller-side locking is required.
pub trait BlobStore: Send + Sync {
    fn put(&self, key: &str, bytes: &[u8]) -> io::Result<()>;
    fn get(&self, key: &str) -> io::Result<Option<Vec<u8>>>;
    fn contains(&self, key: &str) -> io::Result<bool> {
        Ok(self.get(key)?.is_some())
    }
}

impl<T: BlobStore + ?Sized> BlobStore for std::sync::Arc<T> {
    fn put(&self, key: &str, bytes: &[u8]) -> io::Result<()> {
        (**self).put(key, bytes)
    }

    fn get(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
        (**self).get(key)
    }
}

/// In-memory backend, the default for tests and embedded use.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blobs.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl BlobStore for MemoryBlobStore {
    fn put(&self, key: &str, bytes: &[u8]) -> io::Result<()> {
        let mut map = self
            .blobs
            .write()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "blob map poisoned"))?;
        map.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    fn get(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
        let map = self
            .blobs
            .read()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "blob map poisoned"))?;
        Ok(map.get(key).cloned())
    }
}

/// Filesystem backend: one file per key under a root directory.
///
/// Writes go to a uniquely named temp file first and are then renamed
/// into place, so readers never observe a partially written blob and
/// concurrent writers of the same key converge on complete bytes.
#[derive(Debug)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn open(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // Keys are prefix:hexdigest, safe as file names on any platform
        // that allows ':'; swap it for '_' to stay portable.
        self.root.join(key.replace(':', "_"))
    }
}

impl BlobStore for FsBlobStore {
    fn put(&self, key: &str, bytes: &[u8]) -> io::Result<()> {
        let path = self.path_for(key);
        let tmp = path.with_extension(format!("tmp.{}", uuid::Uuid::new_v4().simple()));

        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &path)?;

        tracing::trace!(key, len = bytes.len(), "blob written");
        Ok(())
    }

    fn get(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
        match fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}
