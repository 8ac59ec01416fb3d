//! Editable site content blocks.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::ProductId;
use crate::validation::{FieldError, Validate, require_non_negative, require_text};

/// Home page content: the featured product stage and the bundle offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteContent {
    pub product_stage: ProductStage,
    pub bundle: Bundle,
}

/// A featured strip of products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductStage {
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub product_ids: Vec<ProductId>,
}

/// A group of products sold together at a single price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub product_ids: Vec<ProductId>,
    pub price: Decimal,
}

impl Validate for SiteContent {
    fn validate_into(&self, path: &str, errors: &mut Vec<FieldError>) {
        require_text(errors, &format!("{path}.productStage"), "title", &self.product_stage.title);
        require_text(errors, &format!("{path}.bundle"), "title", &self.bundle.title);
        require_non_negative(errors, &format!("{path}.bundle"), "price", self.bundle.price);
        if self.bundle.product_ids.iter().any(ProductId::is_blank) {
            errors.push(FieldError::new(
                format!("{path}.bundle.productIds"),
                "must not contain empty ids",
            ));
        }
    }
}
