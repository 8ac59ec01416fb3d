//! Shopper filter state and the filtered product listing.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use vitrina_core::Product;

use crate::catalog::Catalog;

/// Listing sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Collection order.
    #[default]
    Featured,
    PriceAscending,
    PriceDescending,
    Name,
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "featured" => Ok(Self::Featured),
            "price-asc" => Ok(Self::PriceAscending),
            "price-desc" => Ok(Self::PriceDescending),
            "name" => Ok(Self::Name),
            _ => Err(format!("invalid sort order: {s}")),
        }
    }
}

/// The shopper's active listing filters.
///
/// Attribute filters belong to a category: changing the category drops them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFilters {
    category: Option<String>,
    max_price: Option<Decimal>,
    on_sale: bool,
    attributes: BTreeMap<String, BTreeSet<String>>,
    sort: SortOrder,
}

impl CatalogFilters {
    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    #[must_use]
    pub const fn max_price(&self) -> Option<Decimal> {
        self.max_price
    }

    #[must_use]
    pub const fn on_sale(&self) -> bool {
        self.on_sale
    }

    #[must_use]
    pub const fn sort(&self) -> SortOrder {
        self.sort
    }

    /// Active attribute filters: attribute name to allowed values.
    #[must_use]
    pub const fn attributes(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.attributes
    }

    /// Select a category slug (`None` for all). A different category clears
    /// every attribute filter.
    pub fn set_category(&mut self, category: Option<String>) {
        if self.category != category {
            self.attributes.clear();
            self.category = category;
        }
    }

    pub const fn set_max_price(&mut self, max_price: Option<Decimal>) {
        self.max_price = max_price;
    }

    pub const fn set_on_sale(&mut self, on_sale: bool) {
        self.on_sale = on_sale;
    }

    pub const fn set_sort(&mut self, sort: SortOrder) {
        self.sort = sort;
    }

    /// Toggle one allowed value for an attribute.
    pub fn toggle_attribute(&mut self, name: &str, value: &str) {
        let values = self.attributes.entry(name.to_string()).or_default();
        if !values.remove(value) {
            values.insert(value.to_string());
        }
        if values.is_empty() {
            self.attributes.remove(name);
        }
    }

    /// Drop the filter on one attribute.
    pub fn clear_attribute(&mut self, name: &str) {
        self.attributes.remove(name);
    }

    /// Back to defaults.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Whether `product` passes every active filter. Drafts never pass.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        product.is_published()
            && self
                .category
                .as_deref()
                .is_none_or(|slug| product.category == slug)
            && self.max_price.is_none_or(|max| product.price <= max)
            && (!self.on_sale || product.is_on_sale())
            && self.attributes.iter().all(|(name, allowed)| {
                allowed
                    .iter()
                    .any(|value| product.has_attribute(name, value))
            })
    }
}

/// Published products passing `filters`, in the requested sort order.
#[must_use]
pub fn filtered_products<'a>(catalog: &'a Catalog, filters: &CatalogFilters) -> Vec<&'a Product> {
    let mut products: Vec<&Product> = catalog
        .products()
        .iter()
        .filter(|p| filters.matches(p))
        .collect();
    match filters.sort {
        SortOrder::Featured => {}
        SortOrder::PriceAscending => products.sort_by_key(|p| p.price),
        SortOrder::PriceDescending => products.sort_by(|a, b| b.price.cmp(&a.price)),
        SortOrder::Name => products.sort_by_cached_key(|p| p.name.to_lowercase()),
    }
    products
}

/// Attribute name to the distinct values offered by published products in
/// the active category.
#[must_use]
pub fn attribute_facets(
    catalog: &Catalog,
    filters: &CatalogFilters,
) -> BTreeMap<String, BTreeSet<String>> {
    let mut facets: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    let in_scope = catalog.products().iter().filter(|p| {
        p.is_published()
            && filters
                .category
                .as_deref()
                .is_none_or(|slug| p.category == slug)
    });
    for product in in_scope {
        for attr in &product.filterable_attributes {
            facets
                .entry(attr.name.clone())
                .or_default()
                .insert(attr.value.clone());
        }
    }
    facets
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use vitrina_core::{ProductAttribute, ProductStatus};

    use super::*;
    use crate::catalog::tests::product;
    use crate::persistence::Persistence;

    fn listing_ids(catalog: &Catalog, filters: &CatalogFilters) -> Vec<String> {
        filtered_products(catalog, filters)
            .iter()
            .map(|p| p.id.to_string())
            .collect()
    }

    fn sample_catalog() -> Catalog {
        let mut catalog = Catalog::empty(Persistence::in_memory());

        let mut black = product("black", 100);
        black.filterable_attributes = vec![ProductAttribute::new("Color", "Negro")];
        black.old_price = Some(Decimal::from(120));
        catalog.add_product(black).unwrap();

        let mut white = product("white", 80);
        white.filterable_attributes = vec![ProductAttribute::new("Color", "Blanco")];
        catalog.add_product(white).unwrap();

        let mut draft = product("draft", 10);
        draft.status = ProductStatus::Draft;
        catalog.add_product(draft).unwrap();

        let mut video = product("tv", 300);
        video.category = "video".to_string();
        video.filterable_attributes = vec![ProductAttribute::new("Size", "55")];
        catalog.add_product(video).unwrap();

        catalog
    }

    #[test]
    fn test_drafts_never_listed() {
        let catalog = sample_catalog();
        let ids = listing_ids(&catalog, &CatalogFilters::default());
        assert_eq!(ids, vec!["black", "white", "tv"]);
    }

    #[test]
    fn test_combined_filters_intersect() {
        let catalog = sample_catalog();
        let mut filters = CatalogFilters::default();
        filters.set_category(Some("audio".to_string()));
        filters.set_max_price(Some(Decimal::from(100)));
        assert_eq!(listing_ids(&catalog, &filters), vec!["black", "white"]);

        filters.set_on_sale(true);
        assert_eq!(listing_ids(&catalog, &filters), vec!["black"]);
    }

    #[test]
    fn test_attribute_filter_allows_any_listed_value() {
        let catalog = sample_catalog();
        let mut filters = CatalogFilters::default();
        filters.toggle_attribute("Color", "Blanco");
        assert_eq!(listing_ids(&catalog, &filters), vec!["white"]);
        filters.toggle_attribute("Color", "Negro");
        assert_eq!(listing_ids(&catalog, &filters), vec!["black", "white"]);
        filters.toggle_attribute("Color", "Negro");
        filters.toggle_attribute("Color", "Blanco");
        assert!(filters.attributes().is_empty());
    }

    #[test]
    fn test_changing_category_resets_attributes() {
        let mut filters = CatalogFilters::default();
        filters.set_category(Some("audio".to_string()));
        filters.toggle_attribute("Color", "Negro");
        filters.set_category(Some("audio".to_string()));
        assert_eq!(filters.attributes().len(), 1);
        filters.set_category(Some("video".to_string()));
        assert!(filters.attributes().is_empty());
    }

    #[test]
    fn test_sort_orders() {
        let catalog = sample_catalog();
        let mut filters = CatalogFilters::default();
        filters.set_sort(SortOrder::PriceAscending);
        assert_eq!(listing_ids(&catalog, &filters), vec!["white", "black", "tv"]);
        filters.set_sort(SortOrder::PriceDescending);
        assert_eq!(listing_ids(&catalog, &filters), vec!["tv", "black", "white"]);
        assert_eq!("price-asc".parse::<SortOrder>().unwrap(), SortOrder::PriceAscending);
    }

    #[test]
    fn test_facets_scoped_to_category() {
        let catalog = sample_catalog();
        let mut filters = CatalogFilters::default();
        filters.set_category(Some("audio".to_string()));
        let facets = attribute_facets(&catalog, &filters);
        assert_eq!(facets.len(), 1);
        assert_eq!(facets["Color"].len(), 2);
    }
}
