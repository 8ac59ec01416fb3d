//! Best and worst sellers.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use vitrina_core::{Order, Product, ProductId};

/// Length of the hot products list.
pub const HOT_PRODUCT_LIMIT: usize = 5;

/// A product counts as cold after this many days without a sale.
pub const COLD_WINDOW_DAYS: i64 = 60;

/// Units sold of one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSales {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: u64,
}

/// Units sold per product, in order of first sale.
fn units_sold<'a>(orders: impl IntoIterator<Item = &'a Order>) -> Vec<ProductSales> {
    let mut sales: Vec<ProductSales> = Vec::new();
    for item in orders.into_iter().flat_map(|o| &o.items) {
        match sales.iter_mut().find(|s| s.product_id == item.product_id) {
            Some(entry) => entry.quantity += u64::from(item.quantity),
            None => sales.push(ProductSales {
                product_id: item.product_id.clone(),
                name: item.name.clone(),
                quantity: u64::from(item.quantity),
            }),
        }
    }
    sales
}

/// The five products with the most units sold, best first. Ties keep the
/// order of first sale.
#[must_use]
pub fn hot_products(orders: &[Order]) -> Vec<ProductSales> {
    let mut sales = units_sold(orders);
    sales.sort_by(|a, b| b.quantity.cmp(&a.quantity));
    sales.truncate(HOT_PRODUCT_LIMIT);
    sales
}

/// Catalog products with no units sold in the last sixty days, in catalog
/// order.
#[must_use]
pub fn cold_products(products: &[Product], orders: &[Order], now: DateTime<Utc>) -> Vec<ProductSales> {
    let since = now - Duration::days(COLD_WINDOW_DAYS);
    let recent = units_sold(
        orders
            .iter()
            .filter(|o| o.created_at >= since && o.created_at <= now),
    );
    products
        .iter()
        .filter(|p| {
            !recent
                .iter()
                .any(|s| s.product_id == p.id && s.quantity > 0)
        })
        .map(|p| ProductSales {
            product_id: p.id.clone(),
            name: p.name.clone(),
            quantity: 0,
        })
        .collect()
}
