//! Catalog product model.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{ProductId, ProductStatus, discount_percentage};
use crate::validation::{FieldError, Validate, require_non_negative, require_slug, require_text};

/// A filterable `(name, value)` pair, e.g. `("Color", "Negro")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductAttribute {
    pub name: String,
    pub value: String,
}

impl ProductAttribute {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Raw value of a technical spec as it appears in catalog data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpecValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

/// A technical spec row, e.g. `("RAM", "16 GB")`. The value may be absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSpec {
    pub name: String,
    #[serde(default)]
    pub value: Option<SpecValue>,
}

impl ProductSpec {
    #[must_use]
    pub fn new(name: impl Into<String>, value: Option<SpecValue>) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// A catalog product.
///
/// `category` references a [`Category`](crate::Category) by slug. At most
/// one product in the catalog carries `is_deal_of_the_day`; the catalog store
/// enforces this on every write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub sku: String,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: String,
    pub price: Decimal,
    #[serde(default)]
    pub cost: Option<Decimal>,
    #[serde(default)]
    pub old_price: Option<Decimal>,
    pub stock: u32,
    pub status: ProductStatus,
    #[serde(default)]
    pub is_deal_of_the_day: bool,
    #[serde(default)]
    pub filterable_attributes: Vec<ProductAttribute>,
    #[serde(default)]
    pub specs: Vec<ProductSpec>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

impl Product {
    /// Whether the product is visible in storefront listings.
    #[must_use]
    pub fn is_published(&self) -> bool {
        self.status == ProductStatus::Published
    }

    /// On sale means an old price exists and is above the current price.
    #[must_use]
    pub fn is_on_sale(&self) -> bool {
        self.old_price.is_some_and(|old| old > self.price)
    }

    /// Percentage off the old price, 0 when not on sale.
    #[must_use]
    pub fn discount_percentage(&self) -> f64 {
        discount_percentage(self.price, self.old_price)
    }

    /// Whether the product carries the given filterable attribute value.
    #[must_use]
    pub fn has_attribute(&self, name: &str, value: &str) -> bool {
        self.filterable_attributes
            .iter()
            .any(|attr| attr.name == name && attr.value == value)
    }

    /// Look up a spec value by name.
    #[must_use]
    pub fn spec(&self, name: &str) -> Option<&SpecValue> {
        self.specs
            .iter()
            .find(|spec| spec.name == name)
            .and_then(|spec| spec.value.as_ref())
    }

    /// Inventory value at cost (`cost * stock`), zero when cost is unknown.
    #[must_use]
    pub fn inventory_cost(&self) -> Decimal {
        self.cost.unwrap_or_default() * Decimal::from(self.stock)
    }
}

impl Validate for Product {
    fn validate_into(&self, path: &str, errors: &mut Vec<FieldError>) {
        if self.id.is_blank() {
            errors.push(FieldError::new(format!("{path}.id"), "must not be empty"));
        }
        require_text(errors, path, "sku", &self.sku);
        require_text(errors, path, "name", &self.name);
        require_text(errors, path, "category", &self.category);
        require_slug(errors, path, "slug", &self.slug);
        require_non_negative(errors, path, "price", self.price);
        if let Some(cost) = self.cost {
            require_non_negative(errors, path, "cost", cost);
        }
        if let Some(old_price) = self.old_price {
            require_non_negative(errors, path, "oldPrice", old_price);
        }
        for (i, attr) in self.filterable_attributes.iter().enumerate() {
            require_text(
                errors,
                &format!("{path}.filterableAttributes[{i}]"),
                "name",
                &attr.name,
            );
        }
        for (i, spec) in self.specs.iter().enumerate() {
            require_text(errors, &format!("{path}.specs[{i}]"), "name", &spec.name);
        }
    }

    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        vec![
            ("id", self.id.to_string()),
            ("sku", self.sku.clone()),
            ("slug", self.slug.clone()),
        ]
    }
}

/// Partial update for a product. `None` leaves a field unchanged.
///
/// `cost` and `old_price` are doubly optional so an update can clear them.
#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
    pub sku: Option<String>,
    pub slug: Option<String>,
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub category: Option<String>,
    pub price: Option<Decimal>,
    pub cost: Option<Option<Decimal>>,
    pub old_price: Option<Option<Decimal>>,
    pub stock: Option<u32>,
    pub status: Option<ProductStatus>,
    pub is_deal_of_the_day: Option<bool>,
    pub filterable_attributes: Option<Vec<ProductAttribute>>,
    pub specs: Option<Vec<ProductSpec>>,
    pub tags: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
}

impl ProductUpdate {
    /// Apply the set fields onto `product`.
    pub fn apply(self, product: &mut Product) {
        if let Some(sku) = self.sku {
            product.sku = sku;
        }
        if let Some(slug) = self.slug {
            product.slug = slug;
        }
        if let Some(name) = self.name {
            product.name = name;
        }
        if let Some(description) = self.description {
            product.description = description;
        }
        if let Some(category) = self.category {
            product.category = category;
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(cost) = self.cost {
            product.cost = cost;
        }
        if let Some(old_price) = self.old_price {
            product.old_price = old_price;
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        if let Some(status) = self.status {
            product.status = status;
        }
        if let Some(flag) = self.is_deal_of_the_day {
            product.is_deal_of_the_day = flag;
        }
        if let Some(attrs) = self.filterable_attributes {
            product.filterable_attributes = attrs;
        }
        if let Some(specs) = self.specs {
            product.specs = specs;
        }
        if let Some(tags) = self.tags {
            product.tags = tags;
        }
        if let Some(images) = self.images {
            product.images = images;
        }
    }
}
