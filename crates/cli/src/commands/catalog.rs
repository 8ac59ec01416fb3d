//! Catalog browsing and editing.

use std::path::Path;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{info, warn};
use vitrina_core::{Product, ProductId, ProductStatus, format_price};
use vitrina_storefront::catalog::ProductUpload;
use vitrina_storefront::config::StorefrontConfig;
use vitrina_storefront::error::AppError;
use vitrina_storefront::views::{
    ComparisonTable, SortOrder, attribute_facets, categories_with_counts, deal_of_the_day,
    filtered_products, search_products,
};

use super::{CommandResult, emit, flush_toasts, open_state};

/// Listing options from the command line.
pub struct ListArgs {
    pub category: Option<String>,
    pub max_price: Option<Decimal>,
    pub on_sale: bool,
    /// `name=value` pairs.
    pub attributes: Vec<String>,
    pub sort: String,
}

fn product_line(product: &Product) -> String {
    let mut line = format!(
        "{:<8} {:<12} {:<40} {:>10}",
        product.id,
        product.sku,
        product.name,
        format_price(product.price)
    );
    if let Some(old) = product.old_price {
        line.push_str(&format!(" (was {})", format_price(old)));
    }
    line.push_str(&format!("  stock {}", product.stock));
    if product.status == ProductStatus::Draft {
        line.push_str("  [draft]");
    }
    line
}

/// List published products through the shopper filters.
///
/// # Errors
///
/// Returns an error for a malformed sort order or attribute filter.
pub fn list(config: StorefrontConfig, args: &ListArgs) -> CommandResult {
    let mut state = open_state(config)?;
    let sort: SortOrder = args.sort.parse()?;

    let filters = state.filters_mut();
    filters.set_category(args.category.clone());
    filters.set_max_price(args.max_price);
    filters.set_on_sale(args.on_sale);
    filters.set_sort(sort);
    for pair in &args.attributes {
        let (name, value) = pair
            .split_once('=')
            .ok_or_else(|| AppError::BadRequest(format!("expected name=value, got '{pair}'")))?;
        filters.toggle_attribute(name.trim(), value.trim());
    }

    let products = filtered_products(state.catalog(), state.filters());
    for product in &products {
        emit(product_line(product));
    }
    emit(format_args!("{} products", products.len()));

    if state.filters().category().is_some() {
        for (name, values) in attribute_facets(state.catalog(), state.filters()) {
            let values: Vec<&str> = values.iter().map(String::as_str).collect();
            emit(format_args!("  {name}: {}", values.join(", ")));
        }
    }
    Ok(())
}

/// List categories with their published product counts.
///
/// # Errors
///
/// Returns an error if the data directory cannot be opened.
pub fn categories(config: StorefrontConfig) -> CommandResult {
    let state = open_state(config)?;
    for entry in categories_with_counts(state.catalog()) {
        emit(format_args!(
            "{:<16} {:<30} {}",
            entry.category.slug, entry.category.name, entry.product_count
        ));
    }
    Ok(())
}

/// Quick search over the catalog.
///
/// # Errors
///
/// Returns an error if the data directory cannot be opened.
pub fn search(config: StorefrontConfig, query: &str) -> CommandResult {
    let state = open_state(config)?;
    let results = search_products(state.catalog(), query);
    if results.is_empty() {
        emit(format_args!("No products match '{query}'"));
    }
    for product in results {
        emit(product_line(product));
    }
    Ok(())
}

fn print_table(table: &ComparisonTable) {
    let header: Vec<String> = table.products.iter().map(|id| format!("{id:>14}")).collect();
    emit(format_args!("{:<20}{}", "", header.concat()));
    for row in &table.rows {
        let cells: Vec<String> = row
            .cells
            .iter()
            .map(|cell| {
                let mark = if cell.is_winner { "*" } else { "" };
                format!("{:>14}", format!("{}{mark}", cell.value))
            })
            .collect();
        emit(format_args!("{:<20}{}", row.name, cells.concat()));
    }
}

/// Compare products side by side. Winning values are starred.
///
/// # Errors
///
/// Returns an error if a product id is unknown.
pub fn compare(config: StorefrontConfig, ids: &[String]) -> CommandResult {
    let mut state = open_state(config)?;
    let now = Utc::now();
    for id in ids {
        state.toggle_compare(&ProductId::new(id.as_str()), now)?;
    }
    flush_toasts(&mut state);

    match state.comparison().table(state.catalog()) {
        Some(table) => print_table(&table),
        None => emit("Pick two or three products to compare"),
    }
    Ok(())
}

/// Import products from a JSON array of upload rows.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a JSON array of
/// rows. Rejected rows are reported, not returned as errors.
pub fn import(config: StorefrontConfig, path: &Path, status: ProductStatus) -> CommandResult {
    let raw = std::fs::read_to_string(path)?;
    let mut rows: Vec<ProductUpload> = serde_json::from_str(&raw)?;
    for row in &mut rows {
        row.status.get_or_insert(status);
    }
    info!(path = %path.display(), rows = rows.len(), "Importing products");

    let mut state = open_state(config)?;
    let report = state.catalog_mut().add_products_from_upload(rows);
    emit(format_args!(
        "Imported {} products, {} rejected",
        report.success_count, report.error_count
    ));
    for error in &report.errors {
        warn!("{error}");
        emit(format_args!("  {error}"));
    }
    Ok(())
}

/// Show the deal of the day, or promote `id` to it.
///
/// # Errors
///
/// Returns an error if `id` names no product.
pub fn deal(config: StorefrontConfig, id: Option<&str>) -> CommandResult {
    let mut state = open_state(config)?;
    if let Some(id) = id {
        let id = ProductId::new(id);
        if !state.catalog_mut().set_deal_of_the_day(&id)? {
            return Err(AppError::NotFound(format!("product {id}")).into());
        }
    }
    match deal_of_the_day(state.catalog()) {
        Some(product) => emit(product_line(product)),
        None => emit("No deal of the day"),
    }
    Ok(())
}
