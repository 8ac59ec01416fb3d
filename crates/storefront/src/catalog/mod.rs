//! The catalog store: products, categories, banners, quick categories,
//! coupons, site content and operator settings.
//!
//! Every collection is held as an `Arc<Vec<_>>` that is replaced whole on
//! each write, so readers holding a snapshot never observe a partial update.
//! Each accepted write persists the collection, bumps the catalog revision
//! and broadcasts a [`CatalogEvent`].
//!
//! At most one product carries the deal-of-the-day flag. Any write that sets
//! the flag clears it on every other product in the same swap.

mod import;
mod seed;

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc, Weekday};
use rust_decimal::Decimal;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, error, info, instrument, warn};
use vitrina_core::{
    Banner, BannerId, BannerUpdate, Category, CategoryId, CategoryUpdate, Coupon, CouponId,
    CouponUpdate, Product, ProductId, ProductUpdate, QuickCategory, QuickCategoryId,
    QuickCategoryUpdate, Settings, SiteContent, Validate, ValidationErrors,
};

pub use import::{ImportReport, ProductUpload};
pub use seed::{DirectorySeed, NoSeed, SeedError, SeedSource, StaticSeed, load_seed};

use crate::persistence::{Persistence, StorageKey};

const EVENT_CAPACITY: usize = 32;

/// The catalog collections that can change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Products,
    Categories,
    Banners,
    QuickCategories,
    Coupons,
    SiteContent,
    Settings,
}

impl EntityKind {
    pub const ALL: [Self; 7] = [
        Self::Products,
        Self::Categories,
        Self::Banners,
        Self::QuickCategories,
        Self::Coupons,
        Self::SiteContent,
        Self::Settings,
    ];

    /// Storage key the collection is persisted under.
    #[must_use]
    pub const fn storage_key(self) -> StorageKey {
        match self {
            Self::Products => StorageKey::Products,
            Self::Categories => StorageKey::Categories,
            Self::Banners => StorageKey::Banners,
            Self::QuickCategories => StorageKey::QuickCategories,
            Self::Coupons => StorageKey::Coupons,
            Self::SiteContent => StorageKey::SiteContent,
            Self::Settings => StorageKey::Settings,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.storage_key().as_str())
    }
}

/// Broadcast after every accepted catalog write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEvent {
    pub kind: EntityKind,
    /// Catalog revision after the write.
    pub revision: u64,
}

/// Errors raised by catalog writes.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A unique key (id, sku, slug, code) is already taken.
    #[error("Duplicate {field} '{value}'")]
    Conflict { field: &'static str, value: String },

    /// The record failed validation.
    #[error("Invalid record: {0}")]
    Invalid(#[from] ValidationErrors),
}

/// Current stock of a product after an adjustment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockLevel {
    pub product_id: ProductId,
    pub name: String,
    pub stock: u32,
}

/// The in-memory catalog.
pub struct Catalog {
    persistence: Persistence,
    products: Arc<Vec<Product>>,
    categories: Arc<Vec<Category>>,
    banners: Arc<Vec<Banner>>,
    quick_categories: Arc<Vec<QuickCategory>>,
    coupons: Arc<Vec<Coupon>>,
    site_content: Option<Arc<SiteContent>>,
    settings: Arc<Settings>,
    revision: u64,
    events: broadcast::Sender<CatalogEvent>,
}

impl fmt::Debug for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Catalog")
            .field("products", &self.products.len())
            .field("categories", &self.categories.len())
            .field("banners", &self.banners.len())
            .field("coupons", &self.coupons.len())
            .field("revision", &self.revision)
            .finish_non_exhaustive()
    }
}

impl Catalog {
    /// An empty catalog writing through `persistence`.
    #[must_use]
    pub fn empty(persistence: Persistence) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            persistence,
            products: Arc::default(),
            categories: Arc::default(),
            banners: Arc::default(),
            quick_categories: Arc::default(),
            coupons: Arc::default(),
            site_content: None,
            settings: Arc::default(),
            revision: 0,
            events,
        }
    }

    /// Load every collection from storage, seeding the ones that are empty.
    #[instrument(skip_all)]
    pub fn load(persistence: Persistence, seed: &dyn SeedSource) -> Self {
        let mut catalog = Self::empty(persistence);

        let mut products: Vec<Product> = catalog.load_collection(StorageKey::Products, seed);
        if products.iter().filter(|p| p.is_deal_of_the_day).count() > 1 {
            warn!("Stored catalog has several deals of the day, keeping the first");
            let first = products
                .iter()
                .position(|p| p.is_deal_of_the_day)
                .unwrap_or_default();
            clear_other_deals(&mut products, first);
            catalog.persistence.save(StorageKey::Products, &products);
        }
        catalog.products = Arc::new(products);
        catalog.categories = Arc::new(catalog.load_collection(StorageKey::Categories, seed));
        catalog.banners = Arc::new(catalog.load_collection(StorageKey::Banners, seed));
        catalog.quick_categories =
            Arc::new(catalog.load_collection(StorageKey::QuickCategories, seed));
        catalog.coupons = Arc::new(catalog.load_collection(StorageKey::Coupons, seed));
        catalog.site_content = catalog
            .load_document::<SiteContent>(StorageKey::SiteContent, seed)
            .map(Arc::new);
        catalog.settings = Arc::new(
            catalog
                .load_document::<Settings>(StorageKey::Settings, seed)
                .unwrap_or_default(),
        );

        info!(
            products = catalog.products.len(),
            categories = catalog.categories.len(),
            banners = catalog.banners.len(),
            coupons = catalog.coupons.len(),
            "Catalog loaded"
        );
        catalog
    }

    fn load_collection<T>(&self, key: StorageKey, seed: &dyn SeedSource) -> Vec<T>
    where
        T: DeserializeOwned + Serialize + Validate,
    {
        if let Some(stored) = self
            .persistence
            .load_validated::<Vec<T>>(key)
            .filter(|items| !items.is_empty())
        {
            return stored;
        }
        match load_seed::<Vec<T>>(seed, key) {
            Ok(Some(items)) => {
                info!(key = %key, count = items.len(), "Seeded collection");
                self.persistence.save(key, &items);
                items
            }
            Ok(None) => Vec::new(),
            Err(e) => {
                error!(error = %e, "Seed rejected, collection starts empty");
                Vec::new()
            }
        }
    }

    fn load_document<T>(&self, key: StorageKey, seed: &dyn SeedSource) -> Option<T>
    where
        T: DeserializeOwned + Serialize + Validate,
    {
        if let Some(stored) = self.persistence.load_validated::<T>(key) {
            return Some(stored);
        }
        match load_seed::<T>(seed, key) {
            Ok(Some(document)) => {
                self.persistence.save(key, &document);
                Some(document)
            }
            Ok(None) => None,
            Err(e) => {
                error!(error = %e, "Seed rejected, document left unset");
                None
            }
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Current catalog revision. Increases on every accepted write.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Subscribe to catalog change notifications.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CatalogEvent> {
        self.events.subscribe()
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// A snapshot of the product collection that outlives later writes.
    #[must_use]
    pub fn products_snapshot(&self) -> Arc<Vec<Product>> {
        Arc::clone(&self.products)
    }

    #[must_use]
    pub fn product(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == id)
    }

    #[must_use]
    pub fn product_by_slug(&self, slug: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.slug == slug)
    }

    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    #[must_use]
    pub fn category_by_slug(&self, slug: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.slug == slug)
    }

    #[must_use]
    pub fn banners(&self) -> &[Banner] {
        &self.banners
    }

    #[must_use]
    pub fn quick_categories(&self) -> &[QuickCategory] {
        &self.quick_categories
    }

    #[must_use]
    pub fn coupons(&self) -> &[Coupon] {
        &self.coupons
    }

    #[must_use]
    pub fn site_content(&self) -> Option<&SiteContent> {
        self.site_content.as_deref()
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Find a coupon by code (case-insensitive) that is redeemable at `now`.
    #[must_use]
    pub fn find_coupon(&self, code: &str, now: DateTime<Utc>) -> Option<&Coupon> {
        let code = code.trim().to_uppercase();
        self.coupons
            .iter()
            .find(|c| c.code == code && c.is_redeemable(now))
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Add a product. Setting its deal flag clears the flag elsewhere.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the product is invalid or its id, sku or
    /// slug is taken.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub fn add_product(&mut self, product: Product) -> Result<(), CatalogError> {
        let is_deal = product.is_deal_of_the_day;
        let mut next = with_added(&self.products, product)?;
        if is_deal {
            let last = next.len() - 1;
            clear_other_deals(&mut next, last);
        }
        self.commit_products(next);
        Ok(())
    }

    /// Apply a partial update. Returns `false` when the id is unknown.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the result is invalid or collides with
    /// another product's sku or slug.
    #[instrument(skip(self, update), fields(product_id = %id))]
    pub fn update_product(
        &mut self,
        id: &ProductId,
        update: ProductUpdate,
    ) -> Result<bool, CatalogError> {
        let Some(index) = self.products.iter().position(|p| &p.id == id) else {
            return Ok(false);
        };
        let mut next = with_updated(&self.products, index, |p| update.apply(p))?;
        if next.get(index).is_some_and(|p| p.is_deal_of_the_day) {
            clear_other_deals(&mut next, index);
        }
        self.commit_products(next);
        Ok(true)
    }

    /// Remove a product. Returns `false` when the id is unknown.
    #[instrument(skip(self), fields(product_id = %id))]
    pub fn delete_product(&mut self, id: &ProductId) -> bool {
        match without(&self.products, |p| &p.id == id) {
            Some(next) => {
                self.commit_products(next);
                true
            }
            None => false,
        }
    }

    /// Make `id` the deal of the day, clearing the flag elsewhere.
    ///
    /// # Errors
    ///
    /// Same as [`Catalog::update_product`].
    pub fn set_deal_of_the_day(&mut self, id: &ProductId) -> Result<bool, CatalogError> {
        self.update_product(
            id,
            ProductUpdate {
                is_deal_of_the_day: Some(true),
                ..ProductUpdate::default()
            },
        )
    }

    /// Change one product's stock by `delta`, clamping at zero.
    pub fn adjust_stock(&mut self, id: &ProductId, delta: i64) -> Option<u32> {
        self.adjust_stocks(&[(id.clone(), delta)])
            .into_iter()
            .next()
            .map(|level| level.stock)
    }

    /// Apply several stock changes in a single write, clamping at zero.
    ///
    /// Unknown ids are skipped. Returns the new level of every adjusted
    /// product.
    #[instrument(skip_all, fields(count = deltas.len()))]
    pub fn adjust_stocks(&mut self, deltas: &[(ProductId, i64)]) -> Vec<StockLevel> {
        let mut next = self.products.as_ref().clone();
        let mut levels = Vec::new();
        for (id, delta) in deltas {
            let Some(product) = next.iter_mut().find(|p| &p.id == id) else {
                warn!(product_id = %id, "Stock adjustment for unknown product");
                continue;
            };
            let adjusted = (i64::from(product.stock) + delta).max(0);
            product.stock = u32::try_from(adjusted).unwrap_or(u32::MAX);
            levels.push(StockLevel {
                product_id: product.id.clone(),
                name: product.name.clone(),
                stock: product.stock,
            });
        }
        if !levels.is_empty() {
            self.commit_products(next);
        }
        levels
    }

    fn commit_products(&mut self, next: Vec<Product>) {
        self.products = Arc::new(next);
        self.persistence.save(StorageKey::Products, self.products.as_ref());
        self.bump(EntityKind::Products);
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// # Errors
    ///
    /// Returns `CatalogError` if the category is invalid or its id or slug
    /// is taken.
    pub fn add_category(&mut self, category: Category) -> Result<(), CatalogError> {
        let next = with_added(&self.categories, category)?;
        swap(&mut self.categories, next, &self.persistence, StorageKey::Categories);
        self.bump(EntityKind::Categories);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `CatalogError` if the result is invalid or its slug is taken.
    pub fn update_category(
        &mut self,
        id: &CategoryId,
        update: CategoryUpdate,
    ) -> Result<bool, CatalogError> {
        let Some(index) = self.categories.iter().position(|c| &c.id == id) else {
            return Ok(false);
        };
        let next = with_updated(&self.categories, index, |c| update.apply(c))?;
        swap(&mut self.categories, next, &self.persistence, StorageKey::Categories);
        self.bump(EntityKind::Categories);
        Ok(true)
    }

    /// Remove a category. Products referencing it keep their slug.
    pub fn delete_category(&mut self, id: &CategoryId) -> bool {
        let Some(next) = without(&self.categories, |c| &c.id == id) else {
            return false;
        };
        swap(&mut self.categories, next, &self.persistence, StorageKey::Categories);
        self.bump(EntityKind::Categories);
        true
    }

    // =========================================================================
    // Banners
    // =========================================================================

    /// # Errors
    ///
    /// Returns `CatalogError` if the banner is invalid or its id is taken.
    pub fn add_banner(&mut self, banner: Banner) -> Result<(), CatalogError> {
        let next = with_added(&self.banners, banner)?;
        swap(&mut self.banners, next, &self.persistence, StorageKey::Banners);
        self.bump(EntityKind::Banners);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `CatalogError` if the result is invalid.
    pub fn update_banner(
        &mut self,
        id: &BannerId,
        update: BannerUpdate,
    ) -> Result<bool, CatalogError> {
        let Some(index) = self.banners.iter().position(|b| &b.id == id) else {
            return Ok(false);
        };
        let next = with_updated(&self.banners, index, |b| update.apply(b))?;
        swap(&mut self.banners, next, &self.persistence, StorageKey::Banners);
        self.bump(EntityKind::Banners);
        Ok(true)
    }

    pub fn delete_banner(&mut self, id: &BannerId) -> bool {
        let Some(next) = without(&self.banners, |b| &b.id == id) else {
            return false;
        };
        swap(&mut self.banners, next, &self.persistence, StorageKey::Banners);
        self.bump(EntityKind::Banners);
        true
    }

    // =========================================================================
    // Quick categories
    // =========================================================================

    /// # Errors
    ///
    /// Returns `CatalogError` if the tile is invalid or its id is taken.
    pub fn add_quick_category(&mut self, quick: QuickCategory) -> Result<(), CatalogError> {
        let next = with_added(&self.quick_categories, quick)?;
        swap(
            &mut self.quick_categories,
            next,
            &self.persistence,
            StorageKey::QuickCategories,
        );
        self.bump(EntityKind::QuickCategories);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `CatalogError` if the result is invalid.
    pub fn update_quick_category(
        &mut self,
        id: &QuickCategoryId,
        update: QuickCategoryUpdate,
    ) -> Result<bool, CatalogError> {
        let Some(index) = self.quick_categories.iter().position(|q| &q.id == id) else {
            return Ok(false);
        };
        let next = with_updated(&self.quick_categories, index, |q| update.apply(q))?;
        swap(
            &mut self.quick_categories,
            next,
            &self.persistence,
            StorageKey::QuickCategories,
        );
        self.bump(EntityKind::QuickCategories);
        Ok(true)
    }

    pub fn delete_quick_category(&mut self, id: &QuickCategoryId) -> bool {
        let Some(next) = without(&self.quick_categories, |q| &q.id == id) else {
            return false;
        };
        swap(
            &mut self.quick_categories,
            next,
            &self.persistence,
            StorageKey::QuickCategories,
        );
        self.bump(EntityKind::QuickCategories);
        true
    }

    // =========================================================================
    // Coupons
    // =========================================================================

    /// Add a coupon. The code is uppercased before it is checked.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the coupon is invalid or its id or code is
    /// taken.
    pub fn add_coupon(&mut self, mut coupon: Coupon) -> Result<(), CatalogError> {
        coupon.code = coupon.code.trim().to_uppercase();
        let next = with_added(&self.coupons, coupon)?;
        swap(&mut self.coupons, next, &self.persistence, StorageKey::Coupons);
        self.bump(EntityKind::Coupons);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `CatalogError` if the result is invalid or its code is taken.
    pub fn update_coupon(
        &mut self,
        id: &CouponId,
        mut update: CouponUpdate,
    ) -> Result<bool, CatalogError> {
        let Some(index) = self.coupons.iter().position(|c| &c.id == id) else {
            return Ok(false);
        };
        update.code = update.code.map(|code| code.trim().to_uppercase());
        let next = with_updated(&self.coupons, index, |c| update.apply(c))?;
        swap(&mut self.coupons, next, &self.persistence, StorageKey::Coupons);
        self.bump(EntityKind::Coupons);
        Ok(true)
    }

    pub fn delete_coupon(&mut self, id: &CouponId) -> bool {
        let Some(next) = without(&self.coupons, |c| &c.id == id) else {
            return false;
        };
        swap(&mut self.coupons, next, &self.persistence, StorageKey::Coupons);
        self.bump(EntityKind::Coupons);
        true
    }

    // =========================================================================
    // Site content and settings
    // =========================================================================

    /// Replace the home page content.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Invalid` if the content fails validation.
    pub fn set_site_content(&mut self, content: SiteContent) -> Result<(), CatalogError> {
        content.validate()?;
        self.persistence.save(StorageKey::SiteContent, &content);
        self.site_content = Some(Arc::new(content));
        self.bump(EntityKind::SiteContent);
        Ok(())
    }

    /// Replace the operator settings.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Invalid` if the settings fail validation.
    pub fn update_settings(&mut self, settings: Settings) -> Result<(), CatalogError> {
        settings.validate()?;
        self.persistence.save(StorageKey::Settings, &settings);
        self.settings = Arc::new(settings);
        self.bump(EntityKind::Settings);
        Ok(())
    }

    /// Set the sales quota for one weekday.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Invalid` if `goal` is negative.
    pub fn set_daily_goal(&mut self, weekday: Weekday, goal: Decimal) -> Result<(), CatalogError> {
        let mut settings = self.settings.as_ref().clone();
        settings.set_goal(weekday, goal);
        self.update_settings(settings)
    }

    fn bump(&mut self, kind: EntityKind) {
        self.revision += 1;
        debug!(kind = %kind, revision = self.revision, "Catalog changed");
        // No subscribers is not an error.
        let _ = self.events.send(CatalogEvent {
            kind,
            revision: self.revision,
        });
    }
}

// =============================================================================
// Collection helpers
// =============================================================================

fn swap<T: Serialize>(
    slot: &mut Arc<Vec<T>>,
    next: Vec<T>,
    persistence: &Persistence,
    key: StorageKey,
) {
    *slot = Arc::new(next);
    persistence.save(key, slot.as_ref());
}

fn check_conflicts<'a, T: Validate + 'a>(
    others: impl IntoIterator<Item = &'a T>,
    candidate: &T,
) -> Result<(), CatalogError> {
    let keys = candidate.unique_keys();
    for other in others {
        if let Some((field, value)) = other.unique_keys().into_iter().find(|k| keys.contains(k)) {
            return Err(CatalogError::Conflict { field, value });
        }
    }
    Ok(())
}

fn with_added<T: Validate + Clone>(current: &[T], item: T) -> Result<Vec<T>, CatalogError> {
    item.validate()?;
    check_conflicts(current, &item)?;
    let mut next = current.to_vec();
    next.push(item);
    Ok(next)
}

fn with_updated<T: Validate + Clone>(
    current: &[T],
    index: usize,
    edit: impl FnOnce(&mut T),
) -> Result<Vec<T>, CatalogError> {
    let mut next = current.to_vec();
    let Some(slot) = next.get_mut(index) else {
        return Ok(next);
    };
    edit(slot);
    let updated = slot.clone();
    updated.validate()?;
    check_conflicts(
        next.iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, item)| item),
        &updated,
    )?;
    Ok(next)
}

fn without<T: Clone>(current: &[T], matches: impl Fn(&T) -> bool) -> Option<Vec<T>> {
    if !current.iter().any(&matches) {
        return None;
    }
    Some(current.iter().filter(|item| !matches(item)).cloned().collect())
}

fn clear_other_deals(products: &mut [Product], keep: usize) {
    for (i, product) in products.iter_mut().enumerate() {
        if i != keep {
            product.is_deal_of_the_day = false;
        }
    }
}
