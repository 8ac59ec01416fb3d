//! Back-office for the Vitrina store.
//!
//! Dashboard analytics, the order console, operator alerts and the operator
//! session. Everything reads the same stores the storefront writes.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod analytics;
pub mod console;
pub mod error;
pub mod events;
pub mod session;
