//! Back-office dashboard.

use chrono::Utc;
use vitrina_admin::analytics::{Dashboard, DashboardInputs};
use vitrina_storefront::config::StorefrontConfig;

use super::{CommandResult, emit, open_state};

/// Compute every KPI and print the dashboard as JSON.
///
/// # Errors
///
/// Returns an error if the data directory cannot be opened.
pub fn run(config: StorefrontConfig, unique_visitors: u64) -> CommandResult {
    let state = open_state(config)?;
    let catalog = state.catalog();
    let dashboard = Dashboard::compute(
        state.orders().orders(),
        DashboardInputs {
            products: catalog.products(),
            settings: catalog.settings(),
            unique_visitors,
            now: Utc::now(),
        },
    );
    emit(serde_json::to_string_pretty(&dashboard)?);
    Ok(())
}
