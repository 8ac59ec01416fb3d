//! In-process storage, used by tests and ephemeral sessions.

use std::collections::HashMap;
use std::sync::RwLock;

use super::{Storage, StorageError, StorageKey};

/// Documents held in a map for the life of the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    documents: RwLock<HashMap<StorageKey, String>>,
}

impl Storage for MemoryStorage {
    fn read(&self, key: StorageKey) -> Result<Option<String>, StorageError> {
        let documents = self.documents.read().map_err(|_| StorageError::Poisoned)?;
        Ok(documents.get(&key).cloned())
    }

    fn write(&self, key: StorageKey, value: &str) -> Result<(), StorageError> {
        let mut documents = self.documents.write().map_err(|_| StorageError::Poisoned)?;
        documents.insert(key, value.to_string());
        Ok(())
    }

    fn remove(&self, key: StorageKey) -> Result<(), StorageError> {
        let mut documents = self.documents.write().map_err(|_| StorageError::Poisoned)?;
        documents.remove(&key);
        Ok(())
    }
}
