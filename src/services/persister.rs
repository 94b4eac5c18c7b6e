//! Durable slot backends for the conversation store.
//!
//! A persister holds one opaque byte blob. The store reads it once at
//! startup and overwrites it after every mutation.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::PersistError;
use crate::services::database::Database;

pub trait Persister: Send {
    /// Current slot contents, or `None` if nothing was ever written.
    fn load(&self) -> Result<Option<Vec<u8>>, PersistError>;

    fn save(&self, bytes: &[u8]) -> Result<(), PersistError>;
}

impl<P: Persister + ?Sized> Persister for Box<P> {
    fn load(&self) -> Result<Option<Vec<u8>>, PersistError> {
        (**self).load()
    }

    fn save(&self, bytes: &[u8]) -> Result<(), PersistError> {
        (**self).save(bytes)
    }
}

/// In-process slot. Clones share the same storage, so a test can keep a
/// handle and inspect what the store wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryPersister {
    slot: Arc<Mutex<Option<Vec<u8>>>>,
    quota: Option<usize>,
}

impl MemoryPersister {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(bytes.into()))),
            quota: None,
        }
    }

    /// Reject writes larger than `limit` bytes, like a browser storage quota.
    pub fn with_quota(mut self, limit: usize) -> Self {
        self.quota = Some(limit);
        self
    }

    pub fn contents(&self) -> Option<Vec<u8>> {
        self.slot.lock().ok().and_then(|slot| slot.clone())
    }
}

impl Persister for MemoryPersister {
    fn load(&self) -> Result<Option<Vec<u8>>, PersistError> {
        let slot = self.slot.lock().map_err(|_| PersistError::LockPoisoned)?;
        Ok(slot.clone())
    }

    fn save(&self, bytes: &[u8]) -> Result<(), PersistError> {
        if let Some(limit) = self.quota {
            if bytes.len() > limit {
                return Err(PersistError::QuotaExceeded {
                    size: bytes.len(),
                    limit,
                });
            }
        }
        let mut slot = self.slot.lock().map_err(|_| PersistError::LockPoisoned)?;
        *slot = Some(bytes.to_vec());
        Ok(())
    }
}

/// Slot stored as a single file. Writes go to a sibling temp file first and
/// are renamed into place.
#[derive(Debug, Clone)]
pub struct FilePersister {
    path: PathBuf,
}

impl FilePersister {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Persister for FilePersister {
    fn load(&self) -> Result<Option<Vec<u8>>, PersistError> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, bytes: &[u8]) -> Result<(), PersistError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Slot stored as one row of the `slots` table.
#[derive(Debug, Clone)]
pub struct SqlitePersister {
    db: Database,
    key: String,
}

impl SqlitePersister {
    pub fn new(db: Database, key: impl Into<String>) -> Self {
        Self {
            db,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Persister for SqlitePersister {
    fn load(&self) -> Result<Option<Vec<u8>>, PersistError> {
        Ok(self.db.get_slot(&self.key)?)
    }

    fn save(&self, bytes: &[u8]) -> Result<(), PersistError> {
        Ok(self.db.put_slot(&self.key, bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_persister_shares_slot() {
        let persister = MemoryPersister::new();
        let handle = persister.clone();

        assert!(persister.load().unwrap().is_none());
        persister.save(b"[]").unwrap();
        assert_eq!(handle.contents().as_deref(), Some(&b"[]"[..]));
    }

    #[test]
    fn test_memory_persister_quota() {
        let persister = MemoryPersister::with_contents("[]").with_quota(4);
        let err = persister.save(b"[1,2,3]").unwrap_err();
        assert!(matches!(err, PersistError::QuotaExceeded { size: 7, limit: 4 }));
        assert_eq!(persister.contents().as_deref(), Some(&b"[]"[..]));
    }

    #[test]
    fn test_file_persister() {
        let dir = tempfile::tempdir().unwrap();
        let persister = FilePersister::new(dir.path().join("sub").join("history.json"));

        assert!(persister.load().unwrap().is_none());
        persister.save(b"[]").unwrap();
        persister.save(b"[{}]").unwrap();
        assert_eq!(persister.load().unwrap().as_deref(), Some(&b"[{}]"[..]));
        assert!(!persister.path().with_extension("tmp").exists());
    }

    #[test]
    fn test_sqlite_persister_keys_are_independent() {
        let db = Database::new_in_memory().unwrap();
        let a = SqlitePersister::new(db.clone(), "a");
        let b = SqlitePersister::new(db, "b");

        a.save(b"[1]").unwrap();
        assert!(b.load().unwrap().is_none());
        assert_eq!(a.load().unwrap().as_deref(), Some(&b"[1]"[..]));
    }
}
