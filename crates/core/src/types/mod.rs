//! Core types for Vitrina.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod price;
pub mod slug;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use price::{discount_percentage, format_price, percent_of};
pub use slug::{is_url_safe_slug, slugify};
pub use status::*;
