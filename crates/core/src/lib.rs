//! Vitrina Core - Shared domain types.
//!
//! This crate provides the types used across all Vitrina components:
//! - `storefront` - Catalog, cart, checkout and order store
//! - `admin` - Operator console and analytics
//! - `cli` - Command-line driver
//!
//! # Architecture
//!
//! The core crate contains only types and pure validation - no I/O, no
//! storage access, no HTTP clients. This keeps it lightweight and allows it
//! to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, emails, slugs, prices and statuses
//! - [`models`] - Catalog entities, orders, settings and sessions
//! - [`validation`] - Structural validation of seed and stored documents

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::{
    FieldError, Validate, ValidationErrors, from_value_validated, parse_validated,
};
