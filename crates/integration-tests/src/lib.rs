//! Integration tests for Vitrina.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p vitrina-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `checkout_flow` - Cart to placed order, stock and alerts
//! - `order_sync` - Two sessions sharing one data directory
//! - `file_persistence` - Everything survives a restart
//! - `bulk_import` - Sheet upload screening
//! - `dashboard` - Back-office KPIs over real placed orders
//! - `backend` - HTTP client against a local stub server
//! - `workspace_manifests` - Package metadata
//!
//! Every test gets its own temporary data directory and the bundled seed
//! catalog.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use tempfile::TempDir;
use vitrina_core::{DeliveryMethod, PaymentMethod};
use vitrina_storefront::catalog::DirectorySeed;
use vitrina_storefront::config::StorefrontConfig;
use vitrina_storefront::error::Result;
use vitrina_storefront::persistence::{FileStorage, Persistence, StorageError};
use vitrina_storefront::state::AppState;

/// The seed catalog shipped with the storefront crate.
#[must_use]
pub fn seed_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../storefront/seed")
}

/// A fixed instant, a Wednesday.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 17, 15, 30, 0)
        .single()
        .unwrap_or_default()
}

/// A temporary data directory and the configuration pointing at it.
pub struct TestContext {
    pub dir: TempDir,
    pub config: StorefrontConfig,
}

impl TestContext {
    /// Fresh data directory with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary directory cannot be created.
    pub fn new() -> std::io::Result<Self> {
        let dir = tempfile::tempdir()?;
        let config = StorefrontConfig {
            data_dir: Some(dir.path().to_path_buf()),
            seed_dir: seed_dir(),
            ..StorefrontConfig::default()
        };
        Ok(Self { dir, config })
    }

    /// Open a session over the shared data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be opened.
    pub fn open(&self) -> Result<AppState> {
        AppState::new(self.config.clone())
    }

    /// A storage handle over the data directory. Sessions opened with
    /// [`TestContext::open_session`] on the same handle see each other's
    /// writes.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be opened.
    pub fn storage(&self) -> std::result::Result<Persistence, StorageError> {
        Ok(Persistence::new(Arc::new(FileStorage::open(self.dir.path())?)))
    }

    /// Open another session on `storage`.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be built.
    pub fn open_session(&self, storage: &Persistence) -> Result<AppState> {
        AppState::with_parts(
            self.config.clone(),
            storage.connect(),
            &DirectorySeed::new(seed_dir()),
        )
    }
}

/// Fill the checkout form for a pickup order paid with Zelle.
pub fn fill_pickup_form(state: &mut AppState, name: &str, email: &str) {
    let form = state.checkout_mut();
    form.set_customer_name(name);
    form.set_customer_email(email);
    form.set_customer_phone("04141234567");
    form.set_delivery_method(Some(DeliveryMethod::Pickup));
    form.set_pickup_point(Some("Centro Comercial Sambil".to_string()));
    let _ = form.set_payment_method(Some(PaymentMethod::Zelle));
}
