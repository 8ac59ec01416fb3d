//! The order book: every placed order, shared by the customer's order
//! history and the operator console.
//!
//! Orders are append-only. After creation only the status changes, and any
//! status may follow any other. The customer history is a filtered view of
//! the same collection, so a status change shows up there with no copy to
//! keep in sync.
//!
//! Another session writing `all-orders` replaces this session's collection
//! wholesale on the next [`OrderStore::sync_external`]. Concurrent writers
//! are last-write-wins.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};
use vitrina_core::{Email, Order, OrderId, OrderStatus, Validate, ValidationErrors, parse_validated};

use crate::persistence::{Persistence, StorageKey, StorageSubscription};

const EVENT_CAPACITY: usize = 32;

/// Errors raised when recording an order.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Order '{0}' already exists")]
    Duplicate(OrderId),

    #[error("Invalid order: {0}")]
    Invalid(#[from] ValidationErrors),
}

/// Order book notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderEvent {
    Created(OrderId),
    StatusChanged { id: OrderId, status: OrderStatus },
    /// The collection was replaced by another session's write.
    Replaced { count: usize },
}

/// The order book.
pub struct OrderStore {
    persistence: Persistence,
    orders: Arc<Vec<Order>>,
    external: StorageSubscription,
    events: broadcast::Sender<OrderEvent>,
}

impl std::fmt::Debug for OrderStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderStore")
            .field("orders", &self.orders.len())
            .finish_non_exhaustive()
    }
}

impl OrderStore {
    /// Restore the order book, empty when nothing valid is stored.
    #[must_use]
    pub fn load(persistence: Persistence) -> Self {
        let orders = persistence
            .load_validated::<Vec<Order>>(StorageKey::AllOrders)
            .unwrap_or_default();
        let external = persistence.subscribe();
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            persistence,
            orders: Arc::new(orders),
            external,
            events,
        }
    }

    /// Every order, oldest first.
    #[must_use]
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// A snapshot that outlives later writes.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Vec<Order>> {
        Arc::clone(&self.orders)
    }

    #[must_use]
    pub fn get(&self, id: &OrderId) -> Option<&Order> {
        self.orders.iter().find(|o| &o.id == id)
    }

    /// A customer's orders, newest first.
    #[must_use]
    pub fn history_for(&self, email: &Email) -> Vec<&Order> {
        let mut history: Vec<&Order> = self
            .orders
            .iter()
            .filter(|o| &o.customer_email == email)
            .collect();
        history.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        history
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<OrderEvent> {
        self.events.subscribe()
    }

    /// Append a new order.
    ///
    /// # Errors
    ///
    /// Returns `OrderError` if the order is invalid or its id is taken.
    #[instrument(skip(self, order), fields(order_id = %order.id))]
    pub fn create(&mut self, order: Order) -> Result<(), OrderError> {
        order.validate()?;
        if self.get(&order.id).is_some() {
            return Err(OrderError::Duplicate(order.id));
        }
        let id = order.id.clone();
        let mut next = self.orders.as_ref().clone();
        next.push(order);
        self.commit(next);
        info!(order_id = %id, "Order recorded");
        self.emit(OrderEvent::Created(id));
        Ok(())
    }

    /// Set an order's status. Returns `false` when the id is unknown.
    #[instrument(skip(self), fields(order_id = %id, status = %status))]
    pub fn update_status(&mut self, id: &OrderId, status: OrderStatus) -> bool {
        let mut next = self.orders.as_ref().clone();
        let Some(order) = next.iter_mut().find(|o| &o.id == id) else {
            return false;
        };
        order.status = status;
        self.commit(next);
        self.emit(OrderEvent::StatusChanged {
            id: id.clone(),
            status,
        });
        true
    }

    /// Apply every pending `all-orders` change written by other sessions.
    ///
    /// Returns whether the collection was replaced.
    pub fn sync_external(&mut self) -> bool {
        let latest = self
            .external
            .drain()
            .into_iter()
            .rev()
            .find(|event| event.key == StorageKey::AllOrders);
        latest.is_some_and(|event| self.apply_external(event.value.as_deref()))
    }

    /// Replace the collection with a raw `all-orders` document from another
    /// session. `None` means the key was removed. Invalid documents are
    /// ignored.
    #[instrument(skip_all)]
    pub fn apply_external(&mut self, raw: Option<&str>) -> bool {
        let orders = match raw {
            None => Vec::new(),
            Some(raw) => match parse_validated::<Vec<Order>>(raw) {
                Ok(orders) => orders,
                Err(errors) => {
                    warn!(%errors, "Ignoring invalid order book from another session");
                    return false;
                }
            },
        };
        let count = orders.len();
        self.orders = Arc::new(orders);
        debug!(count, "Order book replaced by another session");
        self.emit(OrderEvent::Replaced { count });
        true
    }

    fn commit(&mut self, next: Vec<Order>) {
        self.orders = Arc::new(next);
        self.persistence
            .save(StorageKey::AllOrders, self.orders.as_ref());
    }

    fn emit(&self, event: OrderEvent) {
        let _ = self.events.send(event);
    }
}

// =============================================================================
// Timeline
// =============================================================================

/// Progress of one timeline step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    Complete,
    Current,
    Upcoming,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineStep {
    pub status: OrderStatus,
    pub state: StepState,
}

/// Display steps for an order in `status`.
///
/// Fulfillment runs Processing, Shipped, Delivered. A cancelled order shows
/// Processing followed by a terminal Cancelled step.
#[must_use]
pub fn timeline(status: OrderStatus) -> Vec<TimelineStep> {
    if status == OrderStatus::Cancelled {
        return vec![
            TimelineStep {
                status: OrderStatus::Processing,
                state: StepState::Complete,
            },
            TimelineStep {
                status: OrderStatus::Cancelled,
                state: StepState::Current,
            },
        ];
    }
    let reached = OrderStatus::FULFILLMENT_STEPS
        .iter()
        .position(|step| *step == status)
        .unwrap_or_default();
    OrderStatus::FULFILLMENT_STEPS
        .iter()
        .enumerate()
        .map(|(i, step)| TimelineStep {
            status: *step,
            state: match i.cmp(&reached) {
                std::cmp::Ordering::Less => StepState::Complete,
                std::cmp::Ordering::Equal => StepState::Current,
                std::cmp::Ordering::Greater => StepState::Upcoming,
            },
        })
        .collect()
}
