//! The shopper's cart.
//!
//! Lines hold a snapshot of the product taken when it was first added. The
//! cart total prices every line at the product's *current* catalog price,
//! falling back to the snapshot when the product has left the catalog.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, instrument};
use vitrina_core::{FieldError, Product, ProductId, Validate};

use crate::catalog::Catalog;
use crate::persistence::{Persistence, StorageKey};

const EVENT_CAPACITY: usize = 32;

/// One cart line. `quantity` is always positive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub product: Product,
    pub quantity: u32,
}

impl CartLine {
    /// Unit price at read time.
    #[must_use]
    pub fn unit_price(&self, catalog: &Catalog) -> Decimal {
        catalog
            .product(&self.product.id)
            .map_or(self.product.price, |current| current.price)
    }

    #[must_use]
    pub fn line_total(&self, catalog: &Catalog) -> Decimal {
        self.unit_price(catalog) * Decimal::from(self.quantity)
    }
}

impl Validate for CartLine {
    fn validate_into(&self, path: &str, errors: &mut Vec<FieldError>) {
        self.product.validate_into(&format!("{path}.product"), errors);
        if self.quantity == 0 {
            errors.push(FieldError::new(format!("{path}.quantity"), "must be positive"));
        }
    }

    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        vec![("product", self.product.id.to_string())]
    }
}

/// Cart notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartEvent {
    /// Units of a product were added.
    Added {
        product_id: ProductId,
        product_name: String,
        quantity: u32,
    },
    /// The cart was emptied.
    Cleared,
    /// Any change to the lines.
    Changed,
}

/// The cart, persisted under `cart-state` on every change.
pub struct CartLedger {
    persistence: Persistence,
    lines: Arc<Vec<CartLine>>,
    events: broadcast::Sender<CartEvent>,
}

impl std::fmt::Debug for CartLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartLedger")
            .field("lines", &self.lines)
            .finish_non_exhaustive()
    }
}

impl CartLedger {
    /// Restore the cart from storage, empty when nothing valid is stored.
    #[must_use]
    pub fn load(persistence: Persistence) -> Self {
        let lines = persistence
            .load_validated::<Vec<CartLine>>(StorageKey::CartState)
            .unwrap_or_default();
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            persistence,
            lines: Arc::new(lines),
            events,
        }
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total units in the cart.
    #[must_use]
    pub fn cart_count(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    /// Sum of line totals at current catalog prices.
    #[must_use]
    pub fn total_price(&self, catalog: &Catalog) -> Decimal {
        self.lines.iter().map(|line| line.line_total(catalog)).sum()
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CartEvent> {
        self.events.subscribe()
    }

    /// Add `quantity` units, merging into an existing line. Zero is a no-op.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub fn add_to_cart(&mut self, product: &Product, quantity: u32) {
        if quantity == 0 {
            return;
        }
        let mut next = self.lines.as_ref().clone();
        match next.iter_mut().find(|line| line.product.id == product.id) {
            Some(line) => line.quantity = line.quantity.saturating_add(quantity),
            None => next.push(CartLine {
                product: product.clone(),
                quantity,
            }),
        }
        self.commit(next);
        self.emit(CartEvent::Added {
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            quantity,
        });
    }

    /// Change a line's quantity by `delta`. At zero or below the line is
    /// removed. Unknown products are ignored.
    #[instrument(skip(self), fields(product_id = %id))]
    pub fn update_quantity(&mut self, id: &ProductId, delta: i64) {
        let Some(index) = self.lines.iter().position(|line| &line.product.id == id) else {
            return;
        };
        let mut next = self.lines.as_ref().clone();
        let Some(line) = next.get_mut(index) else {
            return;
        };
        let updated = i64::from(line.quantity) + delta;
        if updated <= 0 {
            next.remove(index);
        } else {
            line.quantity = u32::try_from(updated).unwrap_or(u32::MAX);
        }
        self.commit(next);
    }

    /// Remove a product's line. Removing an absent line changes nothing.
    #[instrument(skip(self), fields(product_id = %id))]
    pub fn remove_from_cart(&mut self, id: &ProductId) {
        if !self.lines.iter().any(|line| &line.product.id == id) {
            return;
        }
        let next = self
            .lines
            .iter()
            .filter(|line| &line.product.id != id)
            .cloned()
            .collect();
        self.commit(next);
    }

    /// Empty the cart.
    #[instrument(skip(self))]
    pub fn clear_cart(&mut self) {
        self.commit(Vec::new());
        self.emit(CartEvent::Cleared);
    }

    fn commit(&mut self, next: Vec<CartLine>) {
        self.lines = Arc::new(next);
        self.persistence
            .save(StorageKey::CartState, self.lines.as_ref());
        debug!(lines = self.lines.len(), "Cart changed");
        self.emit(CartEvent::Changed);
    }

    fn emit(&self, event: CartEvent) {
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use vitrina_core::ProductUpdate;

    use super::*;
    use crate::catalog::tests::product;

    fn catalog_with(products: &[Product]) -> Catalog {
        let mut catalog = Catalog::empty(Persistence::disabled());
        for p in products {
            catalog.add_product(p.clone()).unwrap();
        }
        catalog
    }

    #[test]
    fn test_add_merges_lines() {
        let mut cart = CartLedger::load(Persistence::in_memory());
        let p = product("a", 10);
        cart.add_to_cart(&p, 1);
        cart.add_to_cart(&p, 2);
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.cart_count(), 3);
    }

    #[test]
    fn test_update_to_zero_removes() {
        let mut cart = CartLedger::load(Persistence::in_memory());
        let p = product("a", 10);
        cart.add_to_cart(&p, 2);
        cart.update_quantity(&p.id, -2);
        assert!(cart.is_empty());
        cart.update_quantity(&p.id, -1);
        cart.remove_from_cart(&p.id);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_total_uses_current_price() {
        let a = product("a", 10);
        let b = product("b", 4);
        let mut catalog = catalog_with(&[a.clone(), b.clone()]);
        let mut cart = CartLedger::load(Persistence::in_memory());
        cart.add_to_cart(&a, 2);
        cart.add_to_cart(&b, 1);
        assert_eq!(cart.total_price(&catalog), Decimal::from(24));

        catalog
            .update_product(
                &a.id,
                ProductUpdate {
                    price: Some(Decimal::from(12)),
                    ..ProductUpdate::default()
                },
            )
            .unwrap();
        assert_eq!(cart.total_price(&catalog), Decimal::from(28));

        catalog.delete_product(&a.id);
        assert_eq!(cart.total_price(&catalog), Decimal::from(24));
    }

    #[test]
    fn test_events() {
        let mut cart = CartLedger::load(Persistence::in_memory());
        let mut events = cart.subscribe();
        let p = product("a", 10);
        cart.add_to_cart(&p, 1);
        cart.clear_cart();

        assert_eq!(events.try_recv().unwrap(), CartEvent::Changed);
        assert!(matches!(
            events.try_recv().unwrap(),
            CartEvent::Added { quantity: 1, .. }
        ));
        assert_eq!(events.try_recv().unwrap(), CartEvent::Changed);
        assert_eq!(events.try_recv().unwrap(), CartEvent::Cleared);
    }

    #[test]
    fn test_cart_survives_reload() {
        let persistence = Persistence::in_memory();
        let mut cart = CartLedger::load(persistence.clone());
        cart.add_to_cart(&product("a", 10), 3);
        let reloaded = CartLedger::load(persistence);
        assert_eq!(reloaded.lines(), cart.lines());
    }
}
