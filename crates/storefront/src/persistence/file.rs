//! Directory-backed storage: one `<key>.json` file per key.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{Storage, StorageError, StorageKey};

/// Stores each document as `<dir>/<key>.json`.
///
/// Writes go to a temporary sibling file that is renamed over the target, so
/// a crash never leaves a half-written document behind.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Open (creating if needed) a storage directory.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Open` if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        if let Err(source) = fs::create_dir_all(&dir) {
            return Err(StorageError::Open { dir, source });
        }
        debug!(dir = %dir.display(), "Opened file storage");
        Ok(Self { dir })
    }

    /// The storage directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: StorageKey) -> PathBuf {
        self.dir.join(format!("{}.json", key.as_str()))
    }
}

impl Storage for FileStorage {
    fn read(&self, key: StorageKey) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { key, source }),
        }
    }

    fn write(&self, key: StorageKey, value: &str) -> Result<(), StorageError> {
        let target = self.path_for(key);
        let staging = self.dir.join(format!(".{}.json.tmp", key.as_str()));
        fs::write(&staging, value)
            .and_then(|()| fs::rename(&staging, &target))
            .map_err(|source| StorageError::Io { key, source })
    }

    fn remove(&self, key: StorageKey) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io { key, source }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_write_read_remove() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();

        assert_eq!(storage.read(StorageKey::Coupons).unwrap(), None);
        storage.write(StorageKey::Coupons, "[]").unwrap();
        assert_eq!(
            storage.read(StorageKey::Coupons).unwrap().as_deref(),
            Some("[]")
        );
        assert!(dir.path().join("coupons.json").exists());

        storage.remove(StorageKey::Coupons).unwrap();
        storage.remove(StorageKey::Coupons).unwrap();
        assert_eq!(storage.read(StorageKey::Coupons).unwrap(), None);
    }

    #[test]
    fn test_open_creates_nested_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b");
        let storage = FileStorage::open(&nested).unwrap();
        storage.write(StorageKey::Settings, "{}").unwrap();
        assert!(nested.join("settings.json").exists());
        assert_eq!(storage.dir(), nested.as_path());
    }

    #[test]
    fn test_overwrite_leaves_no_staging_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();
        storage.write(StorageKey::CartState, "[1]").unwrap();
        storage.write(StorageKey::CartState, "[2]").unwrap();
        assert_eq!(
            storage.read(StorageKey::CartState).unwrap().as_deref(),
            Some("[2]")
        );
        let entries = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }
}
