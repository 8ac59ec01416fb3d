//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type for the application layer. Callers
//! that give up on an error call [`AppError::report`], which captures
//! storage, backend and seed failures to Sentry before logging them.

use thiserror::Error;

use crate::backend::BackendError;
use crate::catalog::{CatalogError, SeedError};
use crate::checkout::CheckoutError;
use crate::config::ConfigError;
use crate::orders::OrderError;
use crate::persistence::StorageError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Durable storage could not be opened or written.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// A catalog mutation was rejected.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// The order could not be placed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// The order book rejected a write.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// A backend call failed.
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Configuration is missing or invalid.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Seed data could not be read or failed validation.
    #[error("Seed error: {0}")]
    Seed(#[from] SeedError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad input from the user.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether the failure is the system's fault rather than the user's.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Storage(_) | Self::Backend(_) | Self::Seed(_) | Self::Internal(_)
        )
    }

    /// Capture server errors to Sentry and log them. User errors are only
    /// logged at debug level.
    pub fn report(&self) {
        if self.is_server_error() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Operation failed"
            );
        } else {
            tracing::debug!(error = %self, "Operation rejected");
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context for the signed-in customer.
///
/// Call this after sign-in to associate errors with the customer.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on sign-out to stop associating errors with the customer.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "p-1")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    for (key, value) in data.unwrap_or_default() {
        breadcrumb.data.insert(
            (*key).to_string(),
            serde_json::Value::String((*value).to_string()),
        );
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product-123".to_string());
        assert_eq!(err.to_string(), "Not found: product-123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");

        let err = AppError::from(CheckoutError::EmptyCart);
        assert_eq!(err.to_string(), "Checkout error: Cart is empty");
    }

    #[test]
    fn test_server_errors() {
        assert!(AppError::Internal("boom".to_string()).is_server_error());
        assert!(
            AppError::from(BackendError::Header("bad".to_string())).is_server_error()
        );
        assert!(!AppError::NotFound("x".to_string()).is_server_error());
        assert!(!AppError::from(CheckoutError::EmptyCart).is_server_error());
    }

    #[test]
    fn test_report_without_sentry_client() {
        // No client is bound, so capture is a no-op.
        AppError::Internal("boom".to_string()).report();
        AppError::BadRequest("nope".to_string()).report();
        add_breadcrumb("test", "breadcrumb", Some(&[("key", "value")]));
        set_sentry_user(&"user-1", Some("user@example.com"));
        clear_sentry_user();
    }
}
