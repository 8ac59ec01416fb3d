//! Order console commands.

use vitrina_admin::console::{
    OrderFilter, OrderRow, list_orders, order_timeline, set_order_status, status_counts,
};
use vitrina_core::{OrderId, OrderStatus};
use vitrina_storefront::config::StorefrontConfig;
use vitrina_storefront::orders::StepState;

use super::{CommandResult, emit, open_state};

/// List orders, newest first, with a per-status tally.
///
/// # Errors
///
/// Returns an error if the data directory cannot be opened.
pub fn list(
    config: StorefrontConfig,
    status: Option<OrderStatus>,
    query: Option<String>,
) -> CommandResult {
    let state = open_state(config)?;
    let orders = state.orders().orders();
    let filter = OrderFilter { status, query };

    for order in list_orders(orders, &filter) {
        let row = OrderRow::from(order);
        emit(format_args!(
            "{:<24} {:<16} {:<24} {:>10} {:<11} {:>3} items",
            row.id, row.created_at, row.customer_name, row.total, row.status, row.item_count
        ));
    }
    let tally: Vec<String> = status_counts(orders)
        .into_iter()
        .map(|(status, count)| format!("{status}: {count}"))
        .collect();
    emit(tally.join("  "));
    Ok(())
}

/// Set an order's status. Any status may follow any other.
///
/// # Errors
///
/// Returns an error if no order has this id.
pub fn set_status(config: StorefrontConfig, id: &str, status: OrderStatus) -> CommandResult {
    let mut state = open_state(config)?;
    let id = OrderId::new(id);
    set_order_status(state.orders_mut(), &id, status)?;
    emit(format_args!("Order {id} is now {status}"));
    Ok(())
}

/// Print an order's fulfillment timeline.
///
/// # Errors
///
/// Returns an error if no order has this id.
pub fn timeline(config: StorefrontConfig, id: &str) -> CommandResult {
    let state = open_state(config)?;
    for step in order_timeline(state.orders(), &OrderId::new(id))? {
        let marker = match step.state {
            StepState::Complete => "[x]",
            StepState::Current => "[>]",
            StepState::Upcoming => "[ ]",
        };
        emit(format_args!("{marker} {}", step.status));
    }
    Ok(())
}
