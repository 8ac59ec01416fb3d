//! Quick product search.

use vitrina_core::Product;

use crate::catalog::Catalog;

/// Queries shorter than this many characters return nothing.
pub const MIN_QUERY_LEN: usize = 2;

/// Maximum number of results returned.
pub const MAX_RESULTS: usize = 7;

/// Products whose name, category or tags contain `query`, ignoring case.
///
/// Results keep collection order and are capped at [`MAX_RESULTS`].
#[must_use]
pub fn search_products<'a>(catalog: &'a Catalog, query: &str) -> Vec<&'a Product> {
    let query = query.trim();
    if query.chars().count() < MIN_QUERY_LEN {
        return Vec::new();
    }
    let needle = query.to_lowercase();
    catalog
        .products()
        .iter()
        .filter(|p| {
            p.name.to_lowercase().contains(&needle)
                || p.category.to_lowercase().contains(&needle)
                || p.tags.iter().any(|tag| tag.to_lowercase().contains(&needle))
        })
        .take(MAX_RESULTS)
        .collect()
}
