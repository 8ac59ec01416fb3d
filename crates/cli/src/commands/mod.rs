//! Command implementations.
//!
//! Every command opens the configured state, does one thing, and prints its
//! result to stdout. Logs go to stderr.

pub mod account;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod dashboard;
pub mod events;
pub mod orders;
pub mod seed;

use chrono::Utc;
use vitrina_storefront::config::StorefrontConfig;
use vitrina_storefront::error::AppError;
use vitrina_storefront::state::AppState;

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Load every store from the configured data directory.
pub fn open_state(config: StorefrontConfig) -> Result<AppState, AppError> {
    AppState::new(config).inspect_err(AppError::report)
}

/// Print one line of command output.
#[allow(clippy::print_stdout)]
pub fn emit(line: impl std::fmt::Display) {
    println!("{line}");
}

/// Print the toasts raised while the command ran.
pub fn flush_toasts(state: &mut AppState) {
    let now = Utc::now();
    for toast in state.toasts().active(now) {
        emit(toast);
    }
    state.toasts_mut().clear();
}
