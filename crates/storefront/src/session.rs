//! The signed-in customer.

use tracing::{info, instrument};
use vitrina_core::{Email, UserSession};

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::persistence::{Persistence, StorageKey};

/// Holds the customer session persisted under `user-session`.
#[derive(Debug)]
pub struct SessionStore {
    persistence: Persistence,
    current: Option<UserSession>,
}

impl SessionStore {
    /// Restore the stored session, if any.
    #[must_use]
    pub fn load(persistence: Persistence) -> Self {
        let current = persistence.load::<UserSession>(StorageKey::UserSession);
        if let Some(session) = &current {
            set_sentry_user(&session.email, Some(session.email.as_str()));
        }
        Self {
            persistence,
            current,
        }
    }

    #[must_use]
    pub const fn current(&self) -> Option<&UserSession> {
        self.current.as_ref()
    }

    #[must_use]
    pub fn email(&self) -> Option<&Email> {
        self.current.as_ref().map(|s| &s.email)
    }

    #[instrument(skip(self, name), fields(email = %email))]
    pub fn sign_in(&mut self, email: Email, name: impl Into<String>) {
        let session = UserSession {
            email,
            name: name.into(),
        };
        self.persistence.save(StorageKey::UserSession, &session);
        set_sentry_user(&session.email, Some(session.email.as_str()));
        info!("Customer signed in");
        self.current = Some(session);
    }

    pub fn sign_out(&mut self) {
        if self.current.take().is_some() {
            self.persistence.remove(StorageKey::UserSession);
            clear_sentry_user();
            info!("Customer signed out");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_session_survives_reload() {
        let persistence = Persistence::in_memory();
        let mut store = SessionStore::load(persistence.clone());
        assert!(store.current().is_none());

        store.sign_in(Email::parse("ana@example.com").unwrap(), "Ana");
        let reloaded = SessionStore::load(persistence.clone());
        assert_eq!(reloaded.current().unwrap().name, "Ana");

        store.sign_out();
        assert!(SessionStore::load(persistence).current().is_none());
    }
}
