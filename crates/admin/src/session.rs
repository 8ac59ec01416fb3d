//! The signed-in operator.

use chrono::{DateTime, Utc};
use tracing::{info, instrument};
use vitrina_core::AdminSession;
use vitrina_storefront::persistence::{Persistence, StorageKey};

use crate::error::{AdminError, Result};

/// Holds the operator session persisted under `admin-session`.
#[derive(Debug)]
pub struct AdminSessionStore {
    persistence: Persistence,
    current: Option<AdminSession>,
}

impl AdminSessionStore {
    #[must_use]
    pub fn load(persistence: Persistence) -> Self {
        let current = persistence.load::<AdminSession>(StorageKey::AdminSession);
        Self {
            persistence,
            current,
        }
    }

    #[must_use]
    pub const fn current(&self) -> Option<&AdminSession> {
        self.current.as_ref()
    }

    /// The active session, required by console operations.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::NotSignedIn` when nobody is signed in.
    pub fn require(&self) -> Result<&AdminSession> {
        self.current.as_ref().ok_or(AdminError::NotSignedIn)
    }

    /// Start a session for `username`.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::NotSignedIn` for a blank username, leaving the
    /// store signed out.
    #[instrument(skip(self, now))]
    pub fn sign_in(&mut self, username: &str, now: DateTime<Utc>) -> Result<&AdminSession> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AdminError::NotSignedIn);
        }
        let session = AdminSession {
            username: username.to_string(),
            started_at: now,
        };
        self.persistence.save(StorageKey::AdminSession, &session);
        info!("Operator signed in");
        Ok(self.current.insert(session))
    }

    pub fn sign_out(&mut self) {
        if let Some(session) = self.current.take() {
            self.persistence.remove(StorageKey::AdminSession);
            info!(username = %session.username, "Operator signed out");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::analytics::tests::at;

    #[test]
    fn test_session_round_trip() {
        let persistence = Persistence::in_memory();
        let mut store = AdminSessionStore::load(persistence.clone());
        assert!(matches!(store.require(), Err(AdminError::NotSignedIn)));

        store.sign_in("  ops ", at(3, 1)).unwrap();
        let reloaded = AdminSessionStore::load(persistence.clone());
        let session = reloaded.require().unwrap();
        assert_eq!(session.username, "ops");
        assert_eq!(session.started_at, at(3, 1));

        store.sign_out();
        assert!(AdminSessionStore::load(persistence).current().is_none());
    }

    #[test]
    fn test_blank_username_rejected() {
        let mut store = AdminSessionStore::load(Persistence::in_memory());
        assert!(store.sign_in("   ", at(3, 1)).is_err());
        assert!(store.current().is_none());
    }
}
