//! Durable key/value persistence shared by the storefront stores.
//!
//! Every collection lives under one [`StorageKey`] as a JSON document. A
//! [`Persistence`] handle wraps a [`Storage`] backend and a change bus: a
//! write through one handle is announced to every *other* handle connected to
//! the same bus, which is how concurrent sessions observe each other's order
//! book.
//!
//! Persistence never fails a caller. Unavailable storage, unreadable files
//! and documents that fail validation are logged and reported as "absent",
//! so stores fall back to their seed or default data.

mod file;
mod memory;

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, instrument, warn};
use vitrina_core::{Validate, ValidationErrors, parse_validated};

pub use file::FileStorage;
pub use memory::MemoryStorage;

/// Capacity of the change bus. Slow subscribers skip to the newest events.
const BUS_CAPACITY: usize = 64;

/// Keys of the persisted documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StorageKey {
    Products,
    Categories,
    Banners,
    QuickCategories,
    Coupons,
    SiteContent,
    CartState,
    AllOrders,
    Settings,
    UserSession,
    AdminSession,
}

impl StorageKey {
    /// Every key, in a stable order.
    pub const ALL: [Self; 11] = [
        Self::Products,
        Self::Categories,
        Self::Banners,
        Self::QuickCategories,
        Self::Coupons,
        Self::SiteContent,
        Self::CartState,
        Self::AllOrders,
        Self::Settings,
        Self::UserSession,
        Self::AdminSession,
    ];

    /// Stable name used as the document key on disk.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Categories => "categories",
            Self::Banners => "banners",
            Self::QuickCategories => "quick-categories",
            Self::Coupons => "coupons",
            Self::SiteContent => "site-content",
            Self::CartState => "cart-state",
            Self::AllOrders => "all-orders",
            Self::Settings => "settings",
            Self::UserSession => "user-session",
            Self::AdminSession => "admin-session",
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StorageKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| format!("unknown storage key: {s}"))
    }
}

/// Errors raised by storage backends.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The storage directory could not be created.
    #[error("Cannot open storage directory {}: {source}", dir.display())]
    Open {
        dir: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backend could not read or write a document.
    #[error("I/O error on '{key}': {source}")]
    Io {
        key: StorageKey,
        #[source]
        source: std::io::Error,
    },

    /// A value could not be encoded as JSON.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored document failed validation.
    #[error("Invalid document under '{key}': {errors}")]
    Invalid {
        key: StorageKey,
        errors: ValidationErrors,
    },

    /// A lock guarding in-memory state was poisoned.
    #[error("Storage lock poisoned")]
    Poisoned,
}

/// A key/value backend holding raw JSON documents.
pub trait Storage: Send + Sync {
    /// Read the document under `key`, `None` when absent.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    fn read(&self, key: StorageKey) -> Result<Option<String>, StorageError>;

    /// Replace the document under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    fn write(&self, key: StorageKey, value: &str) -> Result<(), StorageError>;

    /// Delete the document under `key`. Deleting an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    fn remove(&self, key: StorageKey) -> Result<(), StorageError>;
}

/// A change made through another handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    pub key: StorageKey,
    /// New raw document, `None` when the key was removed.
    pub value: Option<String>,
}

#[derive(Debug, Clone)]
struct BusMessage {
    origin: u64,
    event: StorageEvent,
}

static NEXT_ORIGIN: AtomicU64 = AtomicU64::new(1);

fn next_origin() -> u64 {
    NEXT_ORIGIN.fetch_add(1, Ordering::Relaxed)
}

/// A handle onto a storage backend and its change bus.
///
/// Clones share the same origin and therefore do not see each other's
/// writes; use [`Persistence::connect`] to open a new session.
#[derive(Clone)]
pub struct Persistence {
    backend: Option<Arc<dyn Storage>>,
    bus: broadcast::Sender<BusMessage>,
    origin: u64,
}

impl fmt::Debug for Persistence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Persistence")
            .field("enabled", &self.is_enabled())
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}

impl Persistence {
    /// Open a handle over `backend` with a fresh change bus.
    #[must_use]
    pub fn new(backend: Arc<dyn Storage>) -> Self {
        let (bus, _) = broadcast::channel(BUS_CAPACITY);
        Self {
            backend: Some(backend),
            bus,
            origin: next_origin(),
        }
    }

    /// A handle over in-memory storage.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::default()))
    }

    /// A handle that stores nothing. Loads report absent, saves are no-ops.
    #[must_use]
    pub fn disabled() -> Self {
        let (bus, _) = broadcast::channel(BUS_CAPACITY);
        Self {
            backend: None,
            bus,
            origin: next_origin(),
        }
    }

    /// Open another session on the same backend and bus.
    #[must_use]
    pub fn connect(&self) -> Self {
        Self {
            backend: self.backend.clone(),
            bus: self.bus.clone(),
            origin: next_origin(),
        }
    }

    /// Whether a backend is attached.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    /// Read and parse the document under `key`.
    ///
    /// Returns `None` when storage is disabled, the key is absent, or the
    /// document cannot be read or parsed. Failures are logged.
    #[instrument(skip(self), fields(key = %key))]
    pub fn load<T: DeserializeOwned>(&self, key: StorageKey) -> Option<T> {
        let raw = self.read_raw(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key = %key, error = %e, "Discarding unparseable stored document");
                None
            }
        }
    }

    /// Read, parse and validate the document under `key`.
    ///
    /// A document that fails validation is discarded as a whole.
    #[instrument(skip(self), fields(key = %key))]
    pub fn load_validated<T>(&self, key: StorageKey) -> Option<T>
    where
        T: DeserializeOwned + Validate,
    {
        let raw = self.read_raw(key)?;
        match parse_validated(&raw) {
            Ok(value) => Some(value),
            Err(errors) => {
                let err = StorageError::Invalid { key, errors };
                warn!(error = %err, "Discarding invalid stored document");
                None
            }
        }
    }

    /// Serialize `value` and write it under `key`, announcing the change to
    /// other sessions. Failures are logged.
    #[instrument(skip(self, value), fields(key = %key))]
    pub fn save<T: Serialize + ?Sized>(&self, key: StorageKey, value: &T) {
        let Some(backend) = &self.backend else {
            return;
        };
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %StorageError::from(e), "Failed to encode document");
                return;
            }
        };
        if let Err(e) = backend.write(key, &raw) {
            warn!(error = %e, "Failed to persist document");
            return;
        }
        debug!(bytes = raw.len(), "Persisted document");
        self.announce(key, Some(raw));
    }

    /// Delete the document under `key`, announcing the change.
    #[instrument(skip(self), fields(key = %key))]
    pub fn remove(&self, key: StorageKey) {
        let Some(backend) = &self.backend else {
            return;
        };
        if let Err(e) = backend.remove(key) {
            warn!(error = %e, "Failed to remove document");
            return;
        }
        self.announce(key, None);
    }

    /// Subscribe to changes made through other sessions.
    #[must_use]
    pub fn subscribe(&self) -> StorageSubscription {
        StorageSubscription {
            receiver: self.bus.subscribe(),
            origin: self.origin,
        }
    }

    fn read_raw(&self, key: StorageKey) -> Option<String> {
        let backend = self.backend.as_ref()?;
        match backend.read(key) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "Storage unavailable, treating document as absent");
                None
            }
        }
    }

    fn announce(&self, key: StorageKey, value: Option<String>) {
        // No subscribers is not an error.
        let _ = self.bus.send(BusMessage {
            origin: self.origin,
            event: StorageEvent { key, value },
        });
    }
}

/// Receives changes written by other sessions.
pub struct StorageSubscription {
    receiver: broadcast::Receiver<BusMessage>,
    origin: u64,
}

impl fmt::Debug for StorageSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageSubscription")
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}

impl StorageSubscription {
    /// Take every pending change from other sessions, oldest first.
    pub fn drain(&mut self) -> Vec<StorageEvent> {
        let mut events = Vec::new();
        loop {
            match self.receiver.try_recv() {
                Ok(message) if message.origin != self.origin => events.push(message.event),
                Ok(_) => {}
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "Storage change bus lagged");
                }
                Err(
                    broadcast::error::TryRecvError::Empty | broadcast::error::TryRecvError::Closed,
                ) => break,
            }
        }
        events
    }

    /// Wait for the next change from another session.
    ///
    /// Returns `None` once every handle on the bus has been dropped.
    pub async fn recv(&mut self) -> Option<StorageEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(message) if message.origin != self.origin => return Some(message.event),
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Storage change bus lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde::Deserialize;
    use vitrina_core::FieldError;

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Counter {
        value: i32,
    }

    impl Validate for Counter {
        fn validate_into(&self, path: &str, errors: &mut Vec<FieldError>) {
            if self.value < 0 {
                errors.push(FieldError::new(format!("{path}.value"), "must be positive"));
            }
        }
    }

    #[test]
    fn test_key_names() {
        assert_eq!(StorageKey::QuickCategories.as_str(), "quick-categories");
        assert_eq!(StorageKey::AllOrders.to_string(), "all-orders");
        assert_eq!(
            "cart-state".parse::<StorageKey>().unwrap(),
            StorageKey::CartState
        );
        assert!("orders".parse::<StorageKey>().is_err());
    }

    #[test]
    fn test_save_then_load() {
        let persistence = Persistence::in_memory();
        persistence.save(StorageKey::Settings, &Counter { value: 3 });
        let loaded: Option<Counter> = persistence.load(StorageKey::Settings);
        assert_eq!(loaded, Some(Counter { value: 3 }));
    }

    #[test]
    fn test_absent_key_loads_none() {
        let persistence = Persistence::in_memory();
        assert!(persistence.load::<Counter>(StorageKey::Products).is_none());
    }

    #[test]
    fn test_invalid_document_is_discarded() {
        let persistence = Persistence::in_memory();
        persistence.save(StorageKey::Settings, &Counter { value: -1 });
        assert!(
            persistence
                .load_validated::<Counter>(StorageKey::Settings)
                .is_none()
        );
        assert!(persistence.load::<Counter>(StorageKey::Settings).is_some());
    }

    #[test]
    fn test_disabled_storage() {
        let persistence = Persistence::disabled();
        persistence.save(StorageKey::Settings, &Counter { value: 1 });
        assert!(!persistence.is_enabled());
        assert!(persistence.load::<Counter>(StorageKey::Settings).is_none());
    }

    #[test]
    fn test_changes_reach_other_sessions_only() {
        let first = Persistence::in_memory();
        let second = first.connect();
        let mut first_events = first.subscribe();
        let mut second_events = second.subscribe();

        first.save(StorageKey::AllOrders, &Counter { value: 7 });

        assert!(first_events.drain().is_empty());
        let events = second_events.drain();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].key, StorageKey::AllOrders);
        assert_eq!(events[0].value.as_deref(), Some(r#"{"value":7}"#));
    }

    #[test]
    fn test_remove_is_announced() {
        let first = Persistence::in_memory();
        let second = first.connect();
        let mut events = second.subscribe();
        first.save(StorageKey::CartState, &Counter { value: 1 });
        first.remove(StorageKey::CartState);

        let drained = events.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[1].value, None);
        assert!(second.load::<Counter>(StorageKey::CartState).is_none());
    }
}
