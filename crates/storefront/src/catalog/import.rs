//! Bulk product import from an uploaded sheet.
//!
//! Rows are screened one by one. A row is rejected when it lacks a SKU or a
//! name, when its SKU already exists (exact match), or when its name already
//! exists (case-insensitive). Earlier rows of the same upload count as
//! existing. Accepted rows are committed in a single write.

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;
use vitrina_core::{Product, ProductId, ProductStatus, slugify};

use super::Catalog;

/// Category assigned to uploaded rows that name none.
const UNCATEGORIZED: &str = "uncategorized";

/// One uploaded row. Every column is optional in the sheet.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpload {
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub cost: Option<Decimal>,
    #[serde(default)]
    pub old_price: Option<Decimal>,
    #[serde(default)]
    pub stock: Option<u32>,
    #[serde(default)]
    pub status: Option<ProductStatus>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Outcome of a bulk import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub success_count: usize,
    pub error_count: usize,
    /// One message per rejected row, naming its 1-based row number.
    pub errors: Vec<String>,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn unique_slug(base: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(base) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{base}-{n}"))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| base.to_string())
}

impl Catalog {
    /// Import uploaded rows, rejecting duplicates and incomplete rows.
    ///
    /// Accepted rows become draft products unless the row sets a status.
    #[instrument(skip_all, fields(rows = rows.len()))]
    pub fn add_products_from_upload(&mut self, rows: Vec<ProductUpload>) -> ImportReport {
        let mut skus: HashSet<String> = self.products.iter().map(|p| p.sku.clone()).collect();
        let mut names: HashSet<String> = self
            .products
            .iter()
            .map(|p| p.name.trim().to_lowercase())
            .collect();
        let mut slugs: HashSet<String> = self.products.iter().map(|p| p.slug.clone()).collect();

        let mut report = ImportReport::default();
        let mut accepted = Vec::new();

        for (i, row) in rows.into_iter().enumerate() {
            let row_number = i + 1;
            let Some(sku) = non_blank(row.sku.as_deref()).map(str::to_string) else {
                report.errors.push(format!("Row {row_number}: missing SKU"));
                continue;
            };
            let Some(name) = non_blank(row.name.as_deref()).map(str::to_string) else {
                report.errors.push(format!("Row {row_number}: missing name"));
                continue;
            };
            if skus.contains(&sku) {
                report
                    .errors
                    .push(format!("Row {row_number}: SKU '{sku}' already exists"));
                continue;
            }
            let name_key = name.to_lowercase();
            if names.contains(&name_key) {
                report.errors.push(format!(
                    "Row {row_number}: a product named '{name}' already exists"
                ));
                continue;
            }
            if row.price.is_some_and(|p| p < Decimal::ZERO) {
                report
                    .errors
                    .push(format!("Row {row_number}: price must not be negative"));
                continue;
            }

            let mut base = slugify(&name);
            if base.is_empty() {
                base = slugify(&sku);
            }
            if base.is_empty() {
                base = "product".to_string();
            }
            let slug = unique_slug(&base, &slugs);

            skus.insert(sku.clone());
            names.insert(name_key);
            slugs.insert(slug.clone());
            accepted.push(Product {
                id: ProductId::new(Uuid::new_v4().to_string()),
                sku,
                slug,
                name,
                description: non_blank(row.description.as_deref()).map(str::to_string),
                category: non_blank(row.category.as_deref())
                    .map(slugify)
                    .filter(|slug| !slug.is_empty())
                    .unwrap_or_else(|| UNCATEGORIZED.to_string()),
                price: row.price.unwrap_or_default(),
                cost: row.cost,
                old_price: row.old_price,
                stock: row.stock.unwrap_or_default(),
                status: row.status.unwrap_or_default(),
                is_deal_of_the_day: false,
                filterable_attributes: Vec::new(),
                specs: Vec::new(),
                tags: row.tags,
                images: Vec::new(),
            });
        }

        report.success_count = accepted.len();
        report.error_count = report.errors.len();
        if !accepted.is_empty() {
            let mut next = self.products.as_ref().clone();
            next.extend(accepted);
            self.commit_products(next);
        }
        info!(
            accepted = report.success_count,
            rejected = report.error_count,
            "Bulk import finished"
        );
        report
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::tests::product;
    use crate::persistence::Persistence;

    fn row(sku: &str, name: &str) -> ProductUpload {
        ProductUpload {
            sku: Some(sku.to_string()),
            name: Some(name.to_string()),
            price: Some(Decimal::from(10)),
            ..ProductUpload::default()
        }
    }

    #[test]
    fn test_duplicate_sku_within_upload() {
        let mut catalog = Catalog::empty(Persistence::in_memory());
        let report = catalog.add_products_from_upload(vec![
            row("A1", "Alpha"),
            row("A1", "Alpha Two"),
            row("B2", "Beta"),
        ]);
        assert_eq!(report.success_count, 2);
        assert_eq!(report.error_count, 1);
        assert!(report.errors[0].starts_with("Row 2:"));
        assert_eq!(catalog.products().len(), 2);
        assert_eq!(catalog.revision(), 1);
    }

    #[test]
    fn test_existing_name_is_case_insensitive() {
        let mut catalog = Catalog::empty(Persistence::in_memory());
        catalog.add_product(product("a", 5)).unwrap();
        let report = catalog.add_products_from_upload(vec![row("NEW", "PRODUCT A")]);
        assert_eq!(report.success_count, 0);
        assert_eq!(
            report.errors,
            vec!["Row 1: a product named 'PRODUCT A' already exists".to_string()]
        );
    }

    #[test]
    fn test_missing_columns_rejected() {
        let mut catalog = Catalog::empty(Persistence::in_memory());
        let report = catalog.add_products_from_upload(vec![
            ProductUpload {
                name: Some("No Sku".to_string()),
                ..ProductUpload::default()
            },
            ProductUpload {
                sku: Some("X".to_string()),
                name: Some("   ".to_string()),
                ..ProductUpload::default()
            },
        ]);
        assert_eq!(report.error_count, 2);
        assert_eq!(report.errors[0], "Row 1: missing SKU");
        assert_eq!(report.errors[1], "Row 2: missing name");
        assert_eq!(catalog.revision(), 0);
    }

    #[test]
    fn test_imported_products_are_drafts_with_unique_slugs() {
        let mut catalog = Catalog::empty(Persistence::in_memory());
        let mut existing = product("a", 5);
        existing.slug = "audifonos".to_string();
        existing.name = "Audífonos Pro".to_string();
        catalog.add_product(existing).unwrap();

        let report = catalog.add_products_from_upload(vec![row("AUD-2", "Audífonos")]);
        assert_eq!(report.success_count, 1);
        let imported = catalog.product_by_slug("audifonos-2").unwrap();
        assert_eq!(imported.status, ProductStatus::Draft);
        assert_eq!(imported.category, UNCATEGORIZED);
        assert!(!imported.is_deal_of_the_day);
    }

    #[test]
    fn test_upload_rows_from_json() {
        let rows: Vec<ProductUpload> = serde_json::from_str(
            r#"[{"sku": "K-1", "name": "Teclado", "price": "45.50", "stock": 3, "category": "Periféricos"}]"#,
        )
        .unwrap();
        let mut catalog = Catalog::empty(Persistence::in_memory());
        let report = catalog.add_products_from_upload(rows);
        assert_eq!(report.success_count, 1);
        let imported = catalog.product_by_slug("teclado").unwrap();
        assert_eq!(imported.price, Decimal::new(4550, 2));
        assert_eq!(imported.category, "perifericos");
    }
}
