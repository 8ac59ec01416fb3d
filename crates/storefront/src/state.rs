//! Application state for one storefront session.
//!
//! Owns every store and the session-level UI state (checkout form, catalog
//! filters, comparison selection, toasts). Operations that span several
//! stores live here.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use tracing::{debug, info, instrument, warn};
use vitrina_core::{
    Banner, Category, Coupon, Email, Order, Product, ProductId, QuickCategory, SiteContent,
    Settings, UserSession,
};

use crate::backend::{BackendClient, BackendError, Redirect};
use crate::cart::CartLedger;
use crate::catalog::{Catalog, DirectorySeed, EntityKind, SeedSource, StockLevel, load_seed};
use crate::checkout::CheckoutForm;
use crate::config::StorefrontConfig;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::notifications::{ToastLevel, ToastQueue};
use crate::orders::OrderStore;
use crate::persistence::{FileStorage, Persistence, StorageKey};
use crate::session::SessionStore;
use crate::views::{CatalogFilters, ComparisonSelection, MAX_COMPARED, ToggleOutcome};

/// An order that was just placed.
#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub order: Order,
    /// Ordered products now at or below the low-stock threshold.
    pub low_stock: Vec<StockLevel>,
}

/// Everything one storefront session holds.
#[derive(Debug)]
pub struct AppState {
    config: StorefrontConfig,
    persistence: Persistence,
    catalog: Catalog,
    cart: CartLedger,
    checkout: CheckoutForm,
    orders: OrderStore,
    filters: CatalogFilters,
    comparison: ComparisonSelection,
    session: SessionStore,
    backend: Option<BackendClient>,
    toasts: ToastQueue,
}

impl AppState {
    /// Open the configured data directory and load every store.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be opened or the
    /// backend client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self> {
        let persistence = match &config.data_dir {
            Some(dir) => Persistence::new(Arc::new(FileStorage::open(dir)?)),
            None => {
                info!("Persistence disabled, state lives in memory only");
                Persistence::disabled()
            }
        };
        let seed = DirectorySeed::new(config.seed_dir.clone());
        Self::with_parts(config, persistence, &seed)
    }

    /// Build the state over an explicit persistence handle and seed source.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend client cannot be built.
    pub fn with_parts(
        config: StorefrontConfig,
        persistence: Persistence,
        seed: &dyn SeedSource,
    ) -> Result<Self> {
        let backend = config
            .backend
            .as_ref()
            .map(BackendClient::new)
            .transpose()?;

        Ok(Self {
            catalog: Catalog::load(persistence.clone(), seed),
            cart: CartLedger::load(persistence.clone()),
            orders: OrderStore::load(persistence.clone()),
            session: SessionStore::load(persistence.clone()),
            checkout: CheckoutForm::default(),
            filters: CatalogFilters::default(),
            comparison: ComparisonSelection::default(),
            toasts: ToastQueue::default(),
            backend,
            persistence,
            config,
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[must_use]
    pub const fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    #[must_use]
    pub const fn persistence(&self) -> &Persistence {
        &self.persistence
    }

    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub const fn catalog_mut(&mut self) -> &mut Catalog {
        &mut self.catalog
    }

    #[must_use]
    pub const fn cart(&self) -> &CartLedger {
        &self.cart
    }

    pub const fn cart_mut(&mut self) -> &mut CartLedger {
        &mut self.cart
    }

    #[must_use]
    pub const fn checkout(&self) -> &CheckoutForm {
        &self.checkout
    }

    pub const fn checkout_mut(&mut self) -> &mut CheckoutForm {
        &mut self.checkout
    }

    #[must_use]
    pub const fn orders(&self) -> &OrderStore {
        &self.orders
    }

    pub const fn orders_mut(&mut self) -> &mut OrderStore {
        &mut self.orders
    }

    #[must_use]
    pub const fn filters(&self) -> &CatalogFilters {
        &self.filters
    }

    pub const fn filters_mut(&mut self) -> &mut CatalogFilters {
        &mut self.filters
    }

    #[must_use]
    pub const fn comparison(&self) -> &ComparisonSelection {
        &self.comparison
    }

    #[must_use]
    pub const fn session(&self) -> &SessionStore {
        &self.session
    }

    #[must_use]
    pub const fn backend(&self) -> Option<&BackendClient> {
        self.backend.as_ref()
    }

    #[must_use]
    pub const fn toasts(&self) -> &ToastQueue {
        &self.toasts
    }

    pub const fn toasts_mut(&mut self) -> &mut ToastQueue {
        &mut self.toasts
    }

    // =========================================================================
    // Cart and comparison
    // =========================================================================

    /// Add a catalog product to the cart and confirm with a toast.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the product is not in the catalog.
    #[instrument(skip(self, now), fields(product_id = %id))]
    pub fn add_to_cart(&mut self, id: &ProductId, quantity: u32, now: DateTime<Utc>) -> Result<()> {
        let product = self
            .catalog
            .product(id)
            .ok_or_else(|| AppError::NotFound(format!("product '{id}'")))?;
        self.cart.add_to_cart(product, quantity);
        add_breadcrumb("cart", "Added to cart", Some(&[("product_id", id.as_str())]));
        self.toasts.push(
            ToastLevel::Success,
            "Added to cart",
            format!("{quantity} x {}", product.name),
            now,
        );
        Ok(())
    }

    /// Toggle a product in the comparison selection. A full selection is
    /// reported with a warning toast.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the product is not in the catalog.
    pub fn toggle_compare(&mut self, id: &ProductId, now: DateTime<Utc>) -> Result<ToggleOutcome> {
        if self.catalog.product(id).is_none() {
            return Err(AppError::NotFound(format!("product '{id}'")));
        }
        let outcome = self.comparison.toggle(id.clone());
        if outcome == ToggleOutcome::Full {
            self.toasts.push(
                ToastLevel::Warning,
                "Comparison full",
                format!("You can compare up to {MAX_COMPARED} products"),
                now,
            );
        }
        Ok(outcome)
    }

    /// Apply a coupon code to the checkout form.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Checkout` if no active, unexpired coupon has that
    /// code.
    pub fn apply_coupon(&mut self, code: &str, now: DateTime<Utc>) -> Result<()> {
        self.checkout.apply_coupon(code, &self.catalog, now)?;
        add_breadcrumb("checkout", "Coupon applied", Some(&[("code", code)]));
        Ok(())
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Place the order described by the checkout form.
    ///
    /// On success the cart is empty, stock is decremented for every ordered
    /// product and the form is reset.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Checkout` if the form is incomplete, the cart is
    /// empty or the order book rejects the order. Nothing changes then.
    #[instrument(skip_all)]
    pub fn place_order(&mut self, now: DateTime<Utc>) -> Result<PlacedOrder> {
        let order = self.checkout.submit(
            &mut self.cart,
            &mut self.orders,
            &self.catalog,
            &self.config.order_prefix,
            now,
        )?;

        let deltas: Vec<(ProductId, i64)> = order
            .items
            .iter()
            .map(|item| (item.product_id.clone(), -i64::from(item.quantity)))
            .collect();
        let threshold = self.config.low_stock_threshold;
        let low_stock: Vec<StockLevel> = self
            .catalog
            .adjust_stocks(&deltas)
            .into_iter()
            .filter(|level| level.stock <= threshold)
            .collect();
        for level in &low_stock {
            warn!(product_id = %level.product_id, stock = level.stock, "Low stock");
        }

        self.checkout.reset();
        self.toasts.push(
            ToastLevel::Success,
            "Order placed",
            format!("Order {} is being processed", order.id),
            now,
        );
        Ok(PlacedOrder { order, low_stock })
    }

    /// Tell the backend about a new order. Failures are logged and
    /// otherwise ignored.
    pub async fn announce_order(&self, order: &Order) {
        let Some(backend) = &self.backend else {
            debug!(order_id = %order.id, "No backend configured, order not announced");
            return;
        };
        if let Err(e) = backend.notify_order_created(order).await {
            AppError::from(e).report();
        }
    }

    /// The signed-in customer's orders, newest first.
    #[must_use]
    pub fn my_orders(&self) -> Vec<&Order> {
        self.session
            .email()
            .map(|email| self.orders.history_for(email))
            .unwrap_or_default()
    }

    /// Pick up order changes written by other sessions.
    pub fn sync_orders(&mut self) -> bool {
        self.orders.sync_external()
    }

    // =========================================================================
    // Account
    // =========================================================================

    /// Sign in through the backend and remember the session.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` when no backend is configured, or the
    /// backend error. Login failures never raise a toast.
    pub async fn login(&mut self, email: &Email, password: &SecretString) -> Result<UserSession> {
        let backend = self
            .backend
            .as_ref()
            .ok_or_else(|| AppError::BadRequest("no backend configured".to_string()))?;
        let user = backend.login(email, password).await?;
        self.session.sign_in(user.email.clone(), user.name.clone());
        Ok(user)
    }

    /// Sign out locally, and at the backend when one is configured.
    pub async fn logout(&mut self, now: DateTime<Utc>) {
        let result = match &self.backend {
            Some(backend) => backend.logout().await,
            None => Ok(()),
        };
        if let Err(e) = result {
            self.backend_failed(e, now);
        }
        self.session.sign_out();
    }

    /// Surface a failed backend call: report it, queue its toast, and return
    /// where the user should be sent.
    pub fn backend_failed(&mut self, error: BackendError, now: DateTime<Utc>) -> Option<Redirect> {
        if let Some(toast) = error.toast(now, self.toasts.ttl()) {
            self.toasts.push_toast(toast);
        }
        let redirect = error.redirect();
        AppError::from(error).report();
        redirect
    }

    // =========================================================================
    // Seeding
    // =========================================================================

    /// Replace every catalog collection with the seed documents.
    ///
    /// Seeds are validated before anything is touched.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Seed` if any seed document cannot be read or is
    /// invalid. The catalog is unchanged then.
    #[instrument(skip_all)]
    pub fn reseed(&mut self, seed: &dyn SeedSource) -> Result<()> {
        load_seed::<Vec<Product>>(seed, StorageKey::Products)?;
        load_seed::<Vec<Category>>(seed, StorageKey::Categories)?;
        load_seed::<Vec<Banner>>(seed, StorageKey::Banners)?;
        load_seed::<Vec<QuickCategory>>(seed, StorageKey::QuickCategories)?;
        load_seed::<Vec<Coupon>>(seed, StorageKey::Coupons)?;
        load_seed::<SiteContent>(seed, StorageKey::SiteContent)?;
        load_seed::<Settings>(seed, StorageKey::Settings)?;

        for kind in EntityKind::ALL {
            self.persistence.remove(kind.storage_key());
        }
        self.catalog = Catalog::load(self.persistence.clone(), seed);
        self.comparison.clear();
        info!(products = self.catalog.products().len(), "Catalog reseeded");
        Ok(())
    }
}
