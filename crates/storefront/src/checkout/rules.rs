//! Which checkout fields are required, and which payment methods are offered.
//!
//! Requirements are a table of rules keyed by the value of a triggering
//! field. The required set is recomputed from the table on every read.

use std::fmt;

use vitrina_core::{DeliveryMethod, DeliveryVehicle, PaymentMethod};

/// A checkout form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CheckoutField {
    CustomerName,
    CustomerEmail,
    CustomerPhone,
    DeliveryMethod,
    PickupPoint,
    DeliveryVehicle,
    DeliveryZone,
    Recipient,
    IdNumber,
    ShippingPhone,
    State,
    City,
    AddressLine,
    Agency,
    PaymentMethod,
    PaymentReference,
}

/// Minimum length of a payment reference.
pub const MIN_REFERENCE_LEN: usize = 4;

impl CheckoutField {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CustomerName => "customerName",
            Self::CustomerEmail => "customerEmail",
            Self::CustomerPhone => "customerPhone",
            Self::DeliveryMethod => "deliveryMethod",
            Self::PickupPoint => "pickupPoint",
            Self::DeliveryVehicle => "deliveryVehicle",
            Self::DeliveryZone => "deliveryZone",
            Self::Recipient => "shippingAddress.recipient",
            Self::IdNumber => "shippingAddress.idNumber",
            Self::ShippingPhone => "shippingAddress.phone",
            Self::State => "shippingAddress.state",
            Self::City => "shippingAddress.city",
            Self::AddressLine => "shippingAddress.addressLine",
            Self::Agency => "shippingAddress.agency",
            Self::PaymentMethod => "paymentMethod",
            Self::PaymentReference => "paymentReference",
        }
    }
}

impl fmt::Display for CheckoutField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What activates a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Always,
    Delivery(DeliveryMethod),
    Payment(PaymentMethod),
}

/// Fields required while the trigger holds.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub when: Trigger,
    pub require: &'static [CheckoutField],
}

const SHIPPING_ADDRESS: &[CheckoutField] = &[
    CheckoutField::Recipient,
    CheckoutField::IdNumber,
    CheckoutField::ShippingPhone,
    CheckoutField::State,
    CheckoutField::City,
    CheckoutField::AddressLine,
    CheckoutField::Agency,
];

/// The checkout requirement table.
pub const RULES: &[Rule] = &[
    Rule {
        when: Trigger::Always,
        require: &[
            CheckoutField::CustomerName,
            CheckoutField::CustomerEmail,
            CheckoutField::CustomerPhone,
            CheckoutField::DeliveryMethod,
            CheckoutField::PaymentMethod,
        ],
    },
    Rule {
        when: Trigger::Delivery(DeliveryMethod::Pickup),
        require: &[CheckoutField::PickupPoint],
    },
    Rule {
        when: Trigger::Delivery(DeliveryMethod::Delivery),
        require: &[CheckoutField::DeliveryVehicle, CheckoutField::DeliveryZone],
    },
    Rule {
        when: Trigger::Delivery(DeliveryMethod::Shipping),
        require: SHIPPING_ADDRESS,
    },
    Rule {
        when: Trigger::Payment(PaymentMethod::PagoMovil),
        require: &[CheckoutField::PaymentReference],
    },
    Rule {
        when: Trigger::Payment(PaymentMethod::Binance),
        require: &[CheckoutField::PaymentReference],
    },
];

impl Trigger {
    fn holds(self, method: Option<DeliveryMethod>, payment: Option<PaymentMethod>) -> bool {
        match self {
            Self::Always => true,
            Self::Delivery(m) => method == Some(m),
            Self::Payment(p) => payment == Some(p),
        }
    }
}

/// Fields required for the given selections, in table order.
#[must_use]
pub fn required_fields(
    method: Option<DeliveryMethod>,
    payment: Option<PaymentMethod>,
) -> Vec<CheckoutField> {
    let mut fields = Vec::new();
    for rule in RULES.iter().filter(|r| r.when.holds(method, payment)) {
        for field in rule.require {
            if !fields.contains(field) {
                fields.push(*field);
            }
        }
    }
    fields
}

/// Payment methods offered for the delivery selection.
///
/// Cash is offered for pickup and for delivery by car. Electronic methods
/// are always offered.
#[must_use]
pub fn available_payment_methods(
    method: Option<DeliveryMethod>,
    vehicle: Option<DeliveryVehicle>,
) -> Vec<PaymentMethod> {
    let cash = matches!(
        (method, vehicle),
        (Some(DeliveryMethod::Pickup), _)
            | (Some(DeliveryMethod::Delivery), Some(DeliveryVehicle::Carro))
    );
    let mut methods = Vec::with_capacity(5);
    if cash {
        methods.push(PaymentMethod::Cash);
    }
    methods.extend(PaymentMethod::ELECTRONIC);
    methods
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pickup_requires_point() {
        let fields = required_fields(Some(DeliveryMethod::Pickup), Some(PaymentMethod::Cash));
        assert!(fields.contains(&CheckoutField::PickupPoint));
        assert!(!fields.contains(&CheckoutField::DeliveryZone));
        assert!(!fields.contains(&CheckoutField::PaymentReference));
    }

    #[test]
    fn test_shipping_requires_full_address() {
        let fields = required_fields(Some(DeliveryMethod::Shipping), None);
        for field in SHIPPING_ADDRESS {
            assert!(fields.contains(field));
        }
    }

    #[test]
    fn test_reference_rules_match_payment_methods() {
        for payment in PaymentMethod::ELECTRONIC {
            let fields = required_fields(None, Some(payment));
            assert_eq!(
                fields.contains(&CheckoutField::PaymentReference),
                payment.requires_reference(),
                "{payment}"
            );
        }
    }

    #[test]
    fn test_cash_availability() {
        let has_cash = |m, v| available_payment_methods(m, v).contains(&PaymentMethod::Cash);
        assert!(has_cash(Some(DeliveryMethod::Pickup), None));
        assert!(has_cash(
            Some(DeliveryMethod::Delivery),
            Some(DeliveryVehicle::Carro)
        ));
        assert!(!has_cash(
            Some(DeliveryMethod::Delivery),
            Some(DeliveryVehicle::Moto)
        ));
        assert!(!has_cash(Some(DeliveryMethod::Shipping), None));
        assert!(!has_cash(None, None));
        assert_eq!(available_payment_methods(None, None).len(), 4);
    }
}
