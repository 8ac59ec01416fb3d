//! Placed orders and the delivery/payment vocabulary they record.
//!
//! An order is an immutable snapshot taken at checkout. After creation only
//! its `status` changes.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Email, OrderId, OrderStatus, ProductId};
use crate::validation::{FieldError, Validate, require_non_negative, require_text};

/// How the customer receives the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMethod {
    /// Customer collects at a pickup point.
    Pickup,
    /// Local courier delivery, priced by vehicle and zone.
    Delivery,
    /// National shipping through a carrier agency, flat fee.
    Shipping,
}

/// Courier vehicle for local delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryVehicle {
    Moto,
    Carro,
}

/// Local delivery zones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryZone {
    ValenciaNorte,
    ValenciaSur,
    Naguanagua,
    SanDiego,
    Guacara,
}

impl DeliveryZone {
    /// Every zone the courier serves.
    pub const ALL: [Self; 5] = [
        Self::ValenciaNorte,
        Self::ValenciaSur,
        Self::Naguanagua,
        Self::SanDiego,
        Self::Guacara,
    ];
}

/// Payment method chosen at checkout. No payment is processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash on pickup or delivery.
    Cash,
    PagoMovil,
    Binance,
    Zelle,
    Transfer,
}

impl PaymentMethod {
    /// Electronic methods, offered for every delivery method.
    pub const ELECTRONIC: [Self; 4] = [Self::PagoMovil, Self::Binance, Self::Zelle, Self::Transfer];

    /// Whether the customer must enter a payment reference.
    #[must_use]
    pub const fn requires_reference(self) -> bool {
        matches!(self, Self::PagoMovil | Self::Binance)
    }
}

macro_rules! snake_case_str {
    ($ty:ident { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            /// Stable snake_case name, matching the serialized form.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $name),+
                }
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok(Self::$variant),)+
                    _ => Err(format!(concat!("invalid ", stringify!($ty), ": {}"), s)),
                }
            }
        }
    };
}

snake_case_str!(DeliveryMethod {
    Pickup => "pickup",
    Delivery => "delivery",
    Shipping => "shipping",
});

snake_case_str!(DeliveryVehicle {
    Moto => "moto",
    Carro => "carro",
});

snake_case_str!(DeliveryZone {
    ValenciaNorte => "valencia_norte",
    ValenciaSur => "valencia_sur",
    Naguanagua => "naguanagua",
    SanDiego => "san_diego",
    Guacara => "guacara",
});

snake_case_str!(PaymentMethod {
    Cash => "cash",
    PagoMovil => "pago_movil",
    Binance => "binance",
    Zelle => "zelle",
    Transfer => "transfer",
});

/// Destination for carrier shipping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub recipient: String,
    pub id_number: String,
    pub phone: String,
    pub state: String,
    pub city: String,
    pub address_line: String,
    /// Carrier branch where the parcel is collected.
    pub agency: String,
}

/// One line of a placed order, with prices frozen at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    #[serde(default)]
    pub unit_cost: Option<Decimal>,
}

impl OrderItem {
    /// `unit_price * quantity`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }

    /// `unit_cost * quantity`, zero when the cost is unknown.
    #[must_use]
    pub fn line_cost(&self) -> Decimal {
        self.unit_cost.unwrap_or_default() * Decimal::from(self.quantity)
    }
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub items: Vec<OrderItem>,
    pub status: OrderStatus,
    pub customer_name: String,
    /// Join key to the customer's order history.
    pub customer_email: Email,
    pub customer_phone: String,
    pub delivery_method: DeliveryMethod,
    #[serde(default)]
    pub delivery_zone: Option<DeliveryZone>,
    #[serde(default)]
    pub delivery_vehicle: Option<DeliveryVehicle>,
    #[serde(default)]
    pub pickup_point: Option<String>,
    #[serde(default)]
    pub shipping_address: Option<ShippingAddress>,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub payment_reference: Option<String>,
    pub shipping_cost: Decimal,
    #[serde(default)]
    pub coupon_code: Option<String>,
    #[serde(default)]
    pub discount: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Sum of line totals, before shipping and discount.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.items.iter().map(OrderItem::line_total).sum()
    }

    /// `subtotal + shipping - discount`, never negative.
    #[must_use]
    pub fn total(&self) -> Decimal {
        (self.subtotal() + self.shipping_cost - self.discount).max(Decimal::ZERO)
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Cost of goods sold for this order.
    #[must_use]
    pub fn cost_of_goods(&self) -> Decimal {
        self.items.iter().map(OrderItem::line_cost).sum()
    }
}

impl Validate for Order {
    fn validate_into(&self, path: &str, errors: &mut Vec<FieldError>) {
        if self.id.is_blank() {
            errors.push(FieldError::new(format!("{path}.id"), "must not be empty"));
        }
        if self.items.is_empty() {
            errors.push(FieldError::new(format!("{path}.items"), "must not be empty"));
        }
        for (i, item) in self.items.iter().enumerate() {
            let item_path = format!("{path}.items[{i}]");
            require_text(errors, &item_path, "name", &item.name);
            if item.quantity == 0 {
                errors.push(FieldError::new(
                    format!("{item_path}.quantity"),
                    "must be positive",
                ));
            }
            require_non_negative(errors, &item_path, "unitPrice", item.unit_price);
        }
        require_non_negative(errors, path, "shippingCost", self.shipping_cost);
        require_non_negative(errors, path, "discount", self.discount);
    }

    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        vec![("id", self.id.to_string())]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(qty: u32, price: i64, cost: Option<i64>) -> OrderItem {
        OrderItem {
            product_id: ProductId::new("p"),
            name: "Item".to_string(),
            quantity: qty,
            unit_price: Decimal::from(price),
            unit_cost: cost.map(Decimal::from),
        }
    }

    fn order(items: Vec<OrderItem>, shipping: i64, discount: i64) -> Order {
        Order {
            id: OrderId::new("ORD-1"),
            items,
            status: OrderStatus::Processing,
            customer_name: "Ana".to_string(),
            customer_email: Email::parse("ana@example.com").unwrap(),
            customer_phone: "0414".to_string(),
            delivery_method: DeliveryMethod::Pickup,
            delivery_zone: None,
            delivery_vehicle: None,
            pickup_point: Some("Centro".to_string()),
            shipping_address: None,
            payment_method: PaymentMethod::Cash,
            payment_reference: None,
            shipping_cost: Decimal::from(shipping),
            coupon_code: None,
            discount: Decimal::from(discount),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_totals() {
        let o = order(vec![item(2, 10, Some(6)), item(1, 5, None)], 3, 4);
        assert_eq!(o.subtotal(), Decimal::from(25));
        assert_eq!(o.total(), Decimal::from(24));
        assert_eq!(o.item_count(), 3);
        assert_eq!(o.cost_of_goods(), Decimal::from(12));
    }

    #[test]
    fn test_total_never_negative() {
        let o = order(vec![item(1, 5, None)], 0, 50);
        assert_eq!(o.total(), Decimal::ZERO);
    }

    #[test]
    fn test_enum_names() {
        assert_eq!("valencia_norte".parse::<DeliveryZone>().unwrap(), DeliveryZone::ValenciaNorte);
        assert_eq!(PaymentMethod::PagoMovil.as_str(), "pago_movil");
        assert_eq!(
            serde_json::to_string(&DeliveryVehicle::Carro).unwrap(),
            "\"carro\""
        );
        assert!("bike".parse::<DeliveryVehicle>().is_err());
    }

    #[test]
    fn test_reference_requirement() {
        assert!(PaymentMethod::PagoMovil.requires_reference());
        assert!(PaymentMethod::Binance.requires_reference());
        assert!(!PaymentMethod::Zelle.requires_reference());
        assert!(!PaymentMethod::Cash.requires_reference());
    }

    #[test]
    fn test_validation_rejects_empty_items() {
        let o = order(Vec::new(), 0, 0);
        assert!(o.validate().is_err());
    }

    #[test]
    fn test_serde_roundtrip_preserves_order() {
        let o = order(vec![item(2, 10, Some(6))], 3, 0);
        let json = serde_json::to_string(&o).unwrap();
        let back: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(back, o);
    }
}
