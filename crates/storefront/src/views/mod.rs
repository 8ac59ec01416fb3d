//! Derived views over the catalog.
//!
//! Every view is a pure function of the [`Catalog`] (and, for listings, the
//! shopper's filter state). Views are recomputed on every read and borrow
//! from the catalog, so they always reflect the latest committed write.

mod compare;
mod filters;
mod search;

use vitrina_core::{Banner, Category, Product, QuickCategory};

pub use compare::{
    CellValue, ComparisonCell, ComparisonRow, ComparisonSelection, ComparisonTable,
    MAX_COMPARED, PRICE_ROW, ToggleOutcome, comparison_table,
};
pub use filters::{CatalogFilters, SortOrder, attribute_facets, filtered_products};
pub use search::{MAX_RESULTS, MIN_QUERY_LEN, search_products};

use crate::catalog::Catalog;

/// A category with its derived product count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryCount<'a> {
    pub category: &'a Category,
    pub product_count: usize,
}

/// Active banners, ordered by position. Ties keep collection order.
#[must_use]
pub fn active_banners(catalog: &Catalog) -> Vec<&Banner> {
    let mut banners: Vec<&Banner> = catalog.banners().iter().filter(|b| b.is_active).collect();
    banners.sort_by_key(|b| b.position);
    banners
}

/// Active quick-category tiles, ordered by position.
#[must_use]
pub fn active_quick_categories(catalog: &Catalog) -> Vec<&QuickCategory> {
    let mut tiles: Vec<&QuickCategory> = catalog
        .quick_categories()
        .iter()
        .filter(|q| q.is_active)
        .collect();
    tiles.sort_by_key(|q| q.position);
    tiles
}

/// Every category with the number of products that reference its slug.
///
/// Counts include drafts; the count reflects the catalog, not the listing.
#[must_use]
pub fn categories_with_counts(catalog: &Catalog) -> Vec<CategoryCount<'_>> {
    catalog
        .categories()
        .iter()
        .map(|category| CategoryCount {
            category,
            product_count: catalog
                .products()
                .iter()
                .filter(|p| p.category == category.slug)
                .count(),
        })
        .collect()
}

/// The product flagged as deal of the day, if any.
#[must_use]
pub fn deal_of_the_day(catalog: &Catalog) -> Option<&Product> {
    catalog.products().iter().find(|p| p.is_deal_of_the_day)
}

/// Products featured in the home page stage, in the configured order.
///
/// Ids that no longer resolve to a published product are skipped.
#[must_use]
pub fn stage_products(catalog: &Catalog) -> Vec<&Product> {
    catalog
        .site_content()
        .map(|content| {
            content
                .product_stage
                .product_ids
                .iter()
                .filter_map(|id| catalog.product(id))
                .filter(|p| p.is_published())
                .collect()
        })
        .unwrap_or_default()
}
