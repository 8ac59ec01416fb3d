//! Back-office error type.

use thiserror::Error;
use vitrina_core::OrderId;

#[derive(Debug, Error)]
pub enum AdminError {
    /// An operator event could not be decoded.
    #[error("Invalid event: {0}")]
    InvalidEvent(#[from] serde_json::Error),

    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// The console requires a signed-in operator.
    #[error("Not signed in")]
    NotSignedIn,
}

/// Result type alias for `AdminError`.
pub type Result<T> = std::result::Result<T, AdminError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = AdminError::OrderNotFound(OrderId::new("ORD-9"));
        assert_eq!(err.to_string(), "Order not found: ORD-9");
        assert_eq!(AdminError::NotSignedIn.to_string(), "Not signed in");
    }
}
