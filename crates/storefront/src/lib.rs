//! Vitrina Storefront library.
//!
//! The data layer behind the storefront and the back-office: the catalog
//! store and its derived views, the cart, the checkout form and the order
//! book, all persisted through a key/value storage adapter.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod notifications;
pub mod orders;
pub mod persistence;
pub mod session;
pub mod state;
pub mod views;
