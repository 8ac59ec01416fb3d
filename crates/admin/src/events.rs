//! Operator alerts.
//!
//! Events arrive as JSON objects tagged by `type` and only ever produce a
//! transient toast. Nothing else reacts to them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;
use vitrina_core::{OrderId, format_price};
use vitrina_storefront::notifications::{Toast, ToastLevel, ToastQueue};
use vitrina_storefront::state::PlacedOrder;

use crate::error::AdminError;

/// Something the operator should notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum AdminEvent {
    NewOrder {
        order_id: OrderId,
        customer_name: String,
        total: Decimal,
    },
    LowStock {
        product_name: String,
        new_stock: u32,
    },
    NewCustomer {
        full_name: String,
    },
}

impl AdminEvent {
    /// Parse one JSON event.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::InvalidEvent` if the JSON is malformed or the
    /// type is unknown.
    pub fn parse(raw: &str) -> Result<Self, AdminError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// The events a freshly placed order raises.
    #[must_use]
    pub fn from_placed_order(placed: &PlacedOrder) -> Vec<Self> {
        let order = &placed.order;
        let mut events = vec![Self::NewOrder {
            order_id: order.id.clone(),
            customer_name: order.customer_name.clone(),
            total: order.total(),
        }];
        events.extend(placed.low_stock.iter().map(|level| Self::LowStock {
            product_name: level.name.clone(),
            new_stock: level.stock,
        }));
        events
    }

    /// The toast shown for this event, expiring at `expires_at`.
    #[must_use]
    pub fn toast(&self, expires_at: DateTime<Utc>) -> Toast {
        match self {
            Self::NewOrder {
                order_id,
                customer_name,
                total,
            } => Toast::new(
                ToastLevel::Info,
                "New order",
                format!("{order_id} from {customer_name}: {}", format_price(*total)),
                expires_at,
            ),
            Self::LowStock {
                product_name,
                new_stock,
            } => Toast::new(
                ToastLevel::Warning,
                "Low stock",
                format!("{product_name}: {new_stock} left"),
                expires_at,
            ),
            Self::NewCustomer { full_name } => Toast::new(
                ToastLevel::Success,
                "New customer",
                format!("{full_name} just signed up"),
                expires_at,
            ),
        }
    }
}

/// Turns incoming events into queued toasts.
#[derive(Debug, Default)]
pub struct AlertFeed {
    toasts: ToastQueue,
}

impl AlertFeed {
    #[must_use]
    pub const fn new(toasts: ToastQueue) -> Self {
        Self { toasts }
    }

    #[must_use]
    pub const fn toasts(&self) -> &ToastQueue {
        &self.toasts
    }

    /// Drop expired toasts, returning how many were removed.
    pub fn prune(&mut self, now: DateTime<Utc>) -> usize {
        self.toasts.prune(now)
    }

    /// Queue the toast for `event` and return it.
    pub fn push(&mut self, event: &AdminEvent, now: DateTime<Utc>) -> Toast {
        let toast = event.toast(now + self.toasts.ttl());
        self.toasts.push_toast(toast.clone());
        toast
    }

    /// Handle one line of an event stream. Blank lines yield `None`.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::InvalidEvent` if the line is not a valid event.
    pub fn handle_line(&mut self, line: &str, now: DateTime<Utc>) -> Result<Option<Toast>, AdminError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let event = AdminEvent::parse(line)?;
        debug!(?event, "Operator event received");
        Ok(Some(self.push(&event, now)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 1, 18, 30, 0).unwrap()
    }

    #[test]
    fn test_parse_tagged_events() {
        let event = AdminEvent::parse(
            r#"{"type":"new_order","orderId":"ORD-1","customerName":"Ana","total":"45.50"}"#,
        )
        .unwrap();
        assert_eq!(
            event,
            AdminEvent::NewOrder {
                order_id: OrderId::new("ORD-1"),
                customer_name: "Ana".to_string(),
                total: Decimal::new(4550, 2),
            }
        );

        let event =
            AdminEvent::parse(r#"{"type":"low_stock","productName":"Mouse","newStock":2}"#).unwrap();
        assert_eq!(event.toast(now()).message, "Mouse: 2 left");

        let event = AdminEvent::parse(r#"{"type":"new_customer","fullName":"Luis Díaz"}"#).unwrap();
        assert_eq!(event.toast(now()).level, ToastLevel::Success);
    }

    #[test]
    fn test_unknown_type_rejected() {
        let err = AdminEvent::parse(r#"{"type":"refund","orderId":"ORD-1"}"#).unwrap_err();
        assert!(matches!(err, AdminError::InvalidEvent(_)));
    }

    #[test]
    fn test_feed_queues_toasts_with_ttl() {
        let mut feed = AlertFeed::new(ToastQueue::new(Duration::seconds(4)));
        assert!(feed.handle_line("   ", now()).unwrap().is_none());

        let toast = feed
            .handle_line(r#"{"type":"new_customer","fullName":"Ana"}"#, now())
            .unwrap()
            .unwrap();
        assert_eq!(toast.expires_at, now() + Duration::seconds(4));
        assert_eq!(feed.toasts().active(now()).len(), 1);
        assert!(feed.toasts().active(now() + Duration::seconds(4)).is_empty());
        assert_eq!(feed.prune(now() + Duration::seconds(4)), 1);
    }

    #[test]
    fn test_new_order_message() {
        let event = AdminEvent::NewOrder {
            order_id: OrderId::new("ORD-7"),
            customer_name: "Ana".to_string(),
            total: Decimal::new(1250, 2),
        };
        assert_eq!(event.toast(now()).message, "ORD-7 from Ana: $12.50");
    }
}
