//! Status enums for catalog products and orders.

use serde::{Deserialize, Serialize};

/// Catalog visibility of a product.
///
/// Only published products are visible in storefront listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ProductStatus {
    Published,
    #[default]
    Draft,
}

impl std::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Published => write!(f, "Published"),
            Self::Draft => write!(f, "Draft"),
        }
    }
}

impl std::str::FromStr for ProductStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "published" => Ok(Self::Published),
            "draft" => Ok(Self::Draft),
            _ => Err(format!("invalid product status: {s}")),
        }
    }
}

/// Order fulfillment status.
///
/// The variants are declared in lifecycle order. The order store accepts any
/// status after any other; only the timeline display treats `Cancelled` as
/// terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub enum OrderStatus {
    #[default]
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [Self; 4] = [
        Self::Processing,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// The fulfillment steps shown on a timeline, excluding `Cancelled`.
    pub const FULFILLMENT_STEPS: [Self; 3] = [Self::Processing, Self::Shipped, Self::Delivered];

    /// Whether no further fulfillment happens after this status.
    #[must_use]
    pub const fn is_final(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Processing => write!(f, "Processing"),
            Self::Shipped => write!(f, "Shipped"),
            Self::Delivered => write!(f, "Delivered"),
            Self::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "processing" => Ok(Self::Processing),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_ordering() {
        assert!(OrderStatus::Processing < OrderStatus::Shipped);
        assert!(OrderStatus::Shipped < OrderStatus::Delivered);
        assert!(OrderStatus::Delivered < OrderStatus::Cancelled);
    }

    #[test]
    fn test_order_status_from_str() {
        assert_eq!("shipped".parse::<OrderStatus>().unwrap(), OrderStatus::Shipped);
        assert_eq!("Canceled".parse::<OrderStatus>().unwrap(), OrderStatus::Cancelled);
        assert!("lost".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_status_display_roundtrip() {
        for status in OrderStatus::ALL {
            assert_eq!(status.to_string().parse::<OrderStatus>().unwrap(), status);
        }
        for status in [ProductStatus::Published, ProductStatus::Draft] {
            assert_eq!(status.to_string().parse::<ProductStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(
            serde_json::to_string(&ProductStatus::Published).unwrap(),
            "\"Published\""
        );
        assert_eq!(
            serde_json::to_string(&OrderStatus::Cancelled).unwrap(),
            "\"Cancelled\""
        );
    }
}
