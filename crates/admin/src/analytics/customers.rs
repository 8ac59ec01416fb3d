//! Per-customer roll-up of the order book.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use vitrina_core::{Email, Order};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSummary {
    pub email: Email,
    /// Name given on the customer's most recent order.
    pub name: String,
    pub order_count: usize,
    pub total_spent: Decimal,
    pub first_order: DateTime<Utc>,
    pub last_order: DateTime<Utc>,
}

/// One summary per customer email, biggest spenders first. Ties keep the
/// order in which customers first appear.
#[must_use]
pub fn customer_summaries(orders: &[Order]) -> Vec<CustomerSummary> {
    let mut index: HashMap<&Email, usize> = HashMap::new();
    let mut summaries: Vec<CustomerSummary> = Vec::new();

    for order in orders {
        let slot = *index.entry(&order.customer_email).or_insert_with(|| {
            summaries.push(CustomerSummary {
                email: order.customer_email.clone(),
                name: order.customer_name.clone(),
                order_count: 0,
                total_spent: Decimal::ZERO,
                first_order: order.created_at,
                last_order: order.created_at,
            });
            summaries.len() - 1
        });
        let Some(summary) = summaries.get_mut(slot) else {
            continue;
        };
        summary.order_count += 1;
        summary.total_spent += order.total();
        if order.created_at < summary.first_order {
            summary.first_order = order.created_at;
        }
        if order.created_at >= summary.last_order {
            summary.last_order = order.created_at;
            summary.name.clone_from(&order.customer_name);
        }
    }

    summaries.sort_by(|a, b| b.total_spent.cmp(&a.total_spent));
    summaries
}
