//! The order console: listing, filtering and status changes.

use serde::Serialize;
use tracing::{info, instrument};
use vitrina_core::{Order, OrderId, OrderStatus, format_price};
use vitrina_storefront::orders::{OrderStore, TimelineStep, timeline};

use crate::error::{AdminError, Result};

/// Console list filters. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    /// Case-insensitive match on order id, customer name or email.
    pub query: Option<String>,
}

impl OrderFilter {
    #[must_use]
    pub fn matches(&self, order: &Order) -> bool {
        if self.status.is_some_and(|status| status != order.status) {
            return false;
        }
        let Some(query) = self
            .query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
        else {
            return true;
        };
        let query = query.to_lowercase();
        order.id.as_str().to_lowercase().contains(&query)
            || order.customer_name.to_lowercase().contains(&query)
            || order.customer_email.as_str().contains(&query)
    }
}

/// Orders matching `filter`, newest first.
#[must_use]
pub fn list_orders<'a>(orders: &'a [Order], filter: &OrderFilter) -> Vec<&'a Order> {
    let mut listed: Vec<&Order> = orders.iter().filter(|o| filter.matches(o)).collect();
    listed.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    listed
}

/// One row of the console table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRow {
    pub id: String,
    pub customer_name: String,
    pub customer_email: String,
    pub total: String,
    pub status: OrderStatus,
    pub created_at: String,
    pub item_count: u32,
}

impl From<&Order> for OrderRow {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.to_string(),
            customer_name: order.customer_name.clone(),
            customer_email: order.customer_email.to_string(),
            total: format_price(order.total()),
            status: order.status,
            created_at: order.created_at.format("%Y-%m-%d %H:%M").to_string(),
            item_count: order.item_count(),
        }
    }
}

/// Number of orders in each status, in lifecycle order.
#[must_use]
pub fn status_counts(orders: &[Order]) -> Vec<(OrderStatus, usize)> {
    OrderStatus::ALL
        .iter()
        .map(|status| (*status, orders.iter().filter(|o| o.status == *status).count()))
        .collect()
}

/// Change an order's status from the console.
///
/// Any status may follow any other.
///
/// # Errors
///
/// Returns `AdminError::OrderNotFound` if no order has this id.
#[instrument(skip(store), fields(order_id = %id, status = %status))]
pub fn set_order_status(store: &mut OrderStore, id: &OrderId, status: OrderStatus) -> Result<()> {
    if !store.update_status(id, status) {
        return Err(AdminError::OrderNotFound(id.clone()));
    }
    info!("Order status updated");
    Ok(())
}

/// Display steps for one order.
///
/// # Errors
///
/// Returns `AdminError::OrderNotFound` if no order has this id.
pub fn order_timeline(store: &OrderStore, id: &OrderId) -> Result<Vec<TimelineStep>> {
    store
        .get(id)
        .map(|order| timeline(order.status))
        .ok_or_else(|| AdminError::OrderNotFound(id.clone()))
}
