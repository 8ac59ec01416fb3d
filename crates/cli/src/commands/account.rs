//! Customer account commands. These talk to the configured backend.

use chrono::Utc;
use secrecy::SecretString;
use vitrina_core::{Email, format_price};
use vitrina_storefront::config::StorefrontConfig;
use vitrina_storefront::error::AppError;

use super::{CommandResult, emit, flush_toasts, open_state};

/// Sign in and remember the session.
///
/// # Errors
///
/// Returns an error if the email is malformed, no backend is configured or
/// the backend rejects the credentials.
pub async fn login(config: StorefrontConfig, email: &str, password: String) -> CommandResult {
    let email = Email::parse(email).map_err(|e| AppError::BadRequest(e.to_string()))?;
    let password = SecretString::from(password);
    let mut state = open_state(config)?;
    let user = state.login(&email, &password).await?;
    emit(format_args!("Signed in as {} <{}>", user.name, user.email));
    Ok(())
}

/// Sign out locally and at the backend.
///
/// # Errors
///
/// Returns an error if the data directory cannot be opened.
pub async fn logout(config: StorefrontConfig) -> CommandResult {
    let mut state = open_state(config)?;
    state.logout(Utc::now()).await;
    flush_toasts(&mut state);
    emit("Signed out");
    Ok(())
}

/// The signed-in customer's order history.
///
/// # Errors
///
/// Returns an error if nobody is signed in.
pub fn orders(config: StorefrontConfig) -> CommandResult {
    let state = open_state(config)?;
    if state.session().current().is_none() {
        return Err(AppError::BadRequest("not signed in".to_string()).into());
    }
    let orders = state.my_orders();
    if orders.is_empty() {
        emit("No orders yet");
    }
    for order in orders {
        emit(format_args!(
            "{:<24} {} {:>10} {}",
            order.id,
            order.created_at.format("%Y-%m-%d"),
            format_price(order.total()),
            order.status
        ));
    }
    Ok(())
}
