//! Catalog category model.
//!
//! A category never stores its product count; counts are derived from the
//! product collection at read time.

use serde::{Deserialize, Serialize};

use crate::types::CategoryId;
use crate::validation::{FieldError, Validate, require_slug, require_text};

/// A product category, referenced from products by `slug`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    pub icon: String,
}

impl Validate for Category {
    fn validate_into(&self, path: &str, errors: &mut Vec<FieldError>) {
        if self.id.is_blank() {
            errors.push(FieldError::new(format!("{path}.id"), "must not be empty"));
        }
        require_text(errors, path, "name", &self.name);
        require_slug(errors, path, "slug", &self.slug);
    }

    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        vec![("id", self.id.to_string()), ("slug", self.slug.clone())]
    }
}

/// Partial update for a category.
#[derive(Debug, Clone, Default)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub icon: Option<String>,
}

impl CategoryUpdate {
    /// Apply the set fields onto `category`.
    pub fn apply(self, category: &mut Category) {
        if let Some(name) = self.name {
            category.name = name;
        }
        if let Some(slug) = self.slug {
            category.slug = slug;
        }
        if let Some(icon) = self.icon {
            category.icon = icon;
        }
    }
}
