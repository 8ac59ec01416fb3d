//! Seed data for first-run catalog collections.
//!
//! A collection is seeded only when nothing valid is stored under its key.
//! Seed documents are validated as a whole; a single bad record rejects the
//! entire document and the collection starts empty.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::warn;
use vitrina_core::{Validate, ValidationErrors, parse_validated};

use crate::persistence::StorageKey;

/// Errors raised while fetching or validating seed data.
#[derive(Debug, Error)]
pub enum SeedError {
    /// The seed document exists but could not be read.
    #[error("Failed to read seed file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The seed document failed validation.
    #[error("Seed '{key}' rejected: {errors}")]
    Invalid {
        key: StorageKey,
        errors: ValidationErrors,
    },
}

/// Somewhere seed documents come from.
pub trait SeedSource: Send + Sync {
    /// Raw JSON seed for `key`, `None` when there is none.
    ///
    /// # Errors
    ///
    /// Returns `SeedError::Io` when a seed exists but cannot be read.
    fn fetch(&self, key: StorageKey) -> Result<Option<String>, SeedError>;
}

/// Seed files named `<key>.json` in a directory.
#[derive(Debug, Clone)]
pub struct DirectorySeed {
    dir: PathBuf,
}

impl DirectorySeed {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl SeedSource for DirectorySeed {
    fn fetch(&self, key: StorageKey) -> Result<Option<String>, SeedError> {
        let path = self.dir.join(format!("{}.json", key.as_str()));
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(path = %path.display(), "Seed file missing, treating as empty");
                Ok(None)
            }
            Err(source) => Err(SeedError::Io { path, source }),
        }
    }
}

/// Seed documents held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticSeed {
    documents: HashMap<StorageKey, String>,
}

impl StaticSeed {
    /// Add the raw document for `key`.
    #[must_use]
    pub fn with(mut self, key: StorageKey, raw: impl Into<String>) -> Self {
        self.documents.insert(key, raw.into());
        self
    }
}

impl SeedSource for StaticSeed {
    fn fetch(&self, key: StorageKey) -> Result<Option<String>, SeedError> {
        Ok(self.documents.get(&key).cloned())
    }
}

/// No seed data at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSeed;

impl SeedSource for NoSeed {
    fn fetch(&self, _key: StorageKey) -> Result<Option<String>, SeedError> {
        Ok(None)
    }
}

/// Fetch and validate the seed document for `key`.
///
/// # Errors
///
/// Returns `SeedError` if the seed cannot be read or fails validation.
pub fn load_seed<T>(source: &dyn SeedSource, key: StorageKey) -> Result<Option<T>, SeedError>
where
    T: DeserializeOwned + Validate,
{
    let Some(raw) = source.fetch(key)? else {
        return Ok(None);
    };
    parse_validated(&raw)
        .map(Some)
        .map_err(|errors| SeedError::Invalid { key, errors })
}
