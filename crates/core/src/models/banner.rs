//! Home page banners and quick-category shortcuts.

use serde::{Deserialize, Serialize};

use crate::types::{BannerId, QuickCategoryId};
use crate::validation::{FieldError, Validate, require_text};

/// A promotional banner. Only active banners are displayed, by `position`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Banner {
    pub id: BannerId,
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    pub image: String,
    #[serde(default)]
    pub link: Option<String>,
    pub is_active: bool,
    #[serde(default)]
    pub position: u32,
}

impl Validate for Banner {
    fn validate_into(&self, path: &str, errors: &mut Vec<FieldError>) {
        if self.id.is_blank() {
            errors.push(FieldError::new(format!("{path}.id"), "must not be empty"));
        }
        require_text(errors, path, "title", &self.title);
        require_text(errors, path, "image", &self.image);
    }

    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        vec![("id", self.id.to_string())]
    }
}

/// Partial update for a banner.
#[derive(Debug, Clone, Default)]
pub struct BannerUpdate {
    pub title: Option<String>,
    pub subtitle: Option<Option<String>>,
    pub image: Option<String>,
    pub link: Option<Option<String>>,
    pub is_active: Option<bool>,
    pub position: Option<u32>,
}

impl BannerUpdate {
    /// Apply the set fields onto `banner`.
    pub fn apply(self, banner: &mut Banner) {
        if let Some(title) = self.title {
            banner.title = title;
        }
        if let Some(subtitle) = self.subtitle {
            banner.subtitle = subtitle;
        }
        if let Some(image) = self.image {
            banner.image = image;
        }
        if let Some(link) = self.link {
            banner.link = link;
        }
        if let Some(is_active) = self.is_active {
            banner.is_active = is_active;
        }
        if let Some(position) = self.position {
            banner.position = position;
        }
    }
}

/// A shortcut tile linking to a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickCategory {
    pub id: QuickCategoryId,
    pub name: String,
    pub icon: String,
    /// Slug of the linked category.
    pub link: String,
    #[serde(default)]
    pub position: u32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

const fn default_true() -> bool {
    true
}

impl Validate for QuickCategory {
    fn validate_into(&self, path: &str, errors: &mut Vec<FieldError>) {
        if self.id.is_blank() {
            errors.push(FieldError::new(format!("{path}.id"), "must not be empty"));
        }
        require_text(errors, path, "name", &self.name);
        require_text(errors, path, "link", &self.link);
    }

    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        vec![("id", self.id.to_string())]
    }
}

/// Partial update for a quick category.
#[derive(Debug, Clone, Default)]
pub struct QuickCategoryUpdate {
    pub name: Option<String>,
    pub icon: Option<String>,
    pub link: Option<String>,
    pub position: Option<u32>,
    pub is_active: Option<bool>,
}

impl QuickCategoryUpdate {
    /// Apply the set fields onto `quick`.
    pub fn apply(self, quick: &mut QuickCategory) {
        if let Some(name) = self.name {
            quick.name = name;
        }
        if let Some(icon) = self.icon {
            quick.icon = icon;
        }
        if let Some(link) = self.link {
            quick.link = link;
        }
        if let Some(position) = self.position {
            quick.position = position;
        }
        if let Some(is_active) = self.is_active {
            quick.is_active = is_active;
        }
    }
}
