//! Reload the catalog from the seed directory.

use tracing::info;
use vitrina_storefront::catalog::DirectorySeed;
use vitrina_storefront::config::StorefrontConfig;

use super::{CommandResult, emit, open_state};

/// Replace every catalog collection with the seed documents.
///
/// # Errors
///
/// Returns an error if the data directory cannot be opened or any seed
/// document is unreadable or invalid. The stored catalog is untouched then.
pub fn run(config: StorefrontConfig) -> CommandResult {
    let seed = DirectorySeed::new(config.seed_dir.clone());
    info!(dir = %config.seed_dir.display(), "Seeding catalog");
    let mut state = open_state(config)?;
    state.reseed(&seed)?;

    let catalog = state.catalog();
    emit(format_args!(
        "Seeded {} products, {} categories, {} banners, {} coupons",
        catalog.products().len(),
        catalog.categories().len(),
        catalog.banners().len(),
        catalog.coupons().len(),
    ));
    Ok(())
}
