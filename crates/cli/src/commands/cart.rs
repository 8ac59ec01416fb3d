//! Shopping cart commands.

use chrono::Utc;
use vitrina_core::{ProductId, format_price};
use vitrina_storefront::config::StorefrontConfig;
use vitrina_storefront::state::AppState;

use super::{CommandResult, emit, flush_toasts, open_state};

fn print_cart(state: &AppState) {
    let cart = state.cart();
    let catalog = state.catalog();
    if cart.is_empty() {
        emit("Cart is empty");
        return;
    }
    for line in cart.lines() {
        emit(format_args!(
            "{:<8} {:<40} {:>3} x {:>10} = {:>10}",
            line.product.id,
            line.product.name,
            line.quantity,
            format_price(line.unit_price(catalog)),
            format_price(line.line_total(catalog)),
        ));
    }
    emit(format_args!(
        "{} items, total {}",
        cart.cart_count(),
        format_price(cart.total_price(catalog))
    ));
}

/// Add `quantity` units of a catalog product.
///
/// # Errors
///
/// Returns an error if no product has this id.
pub fn add(config: StorefrontConfig, id: &str, quantity: u32) -> CommandResult {
    let mut state = open_state(config)?;
    state.add_to_cart(&ProductId::new(id), quantity, Utc::now())?;
    flush_toasts(&mut state);
    print_cart(&state);
    Ok(())
}

/// Change a line's quantity by `delta`.
///
/// # Errors
///
/// Returns an error if the data directory cannot be opened.
pub fn update(config: StorefrontConfig, id: &str, delta: i64) -> CommandResult {
    let mut state = open_state(config)?;
    state.cart_mut().update_quantity(&ProductId::new(id), delta);
    print_cart(&state);
    Ok(())
}

/// Remove a line.
///
/// # Errors
///
/// Returns an error if the data directory cannot be opened.
pub fn remove(config: StorefrontConfig, id: &str) -> CommandResult {
    let mut state = open_state(config)?;
    state.cart_mut().remove_from_cart(&ProductId::new(id));
    print_cart(&state);
    Ok(())
}

/// Print the cart.
///
/// # Errors
///
/// Returns an error if the data directory cannot be opened.
pub fn show(config: StorefrontConfig) -> CommandResult {
    let state = open_state(config)?;
    print_cart(&state);
    Ok(())
}

/// Empty the cart.
///
/// # Errors
///
/// Returns an error if the data directory cannot be opened.
pub fn clear(config: StorefrontConfig) -> CommandResult {
    let mut state = open_state(config)?;
    state.cart_mut().clear_cart();
    emit("Cart cleared");
    Ok(())
}
