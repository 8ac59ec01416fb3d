//! The checkout form and order placement.
//!
//! The form is a small state machine. Choosing a delivery method resets the
//! options that belong to the previous method; choosing a vehicle resets the
//! zone; choosing moto drops a cash payment. Shipping cost, offered payment
//! methods and required fields are all derived from the current selections.

mod rules;
mod shipping;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{info, instrument};
use vitrina_core::{
    Coupon, DeliveryMethod, DeliveryVehicle, DeliveryZone, Email, Order, OrderId, OrderItem,
    OrderStatus, PaymentMethod, ShippingAddress,
};

pub use rules::{
    CheckoutField, MIN_REFERENCE_LEN, RULES, Rule, Trigger, available_payment_methods,
    required_fields,
};
pub use shipping::{DELIVERY_FEES, SHIPPING_FEE, delivery_fee, shipping_cost};

use crate::cart::CartLedger;
use crate::catalog::Catalog;
use crate::orders::{OrderError, OrderStore};

/// Reasons an order cannot be placed.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Cart is empty")]
    EmptyCart,

    #[error("Missing or invalid fields: {}", join_fields(.0))]
    Incomplete(Vec<CheckoutField>),

    #[error("Payment method '{0}' is not offered for this delivery option")]
    PaymentUnavailable(PaymentMethod),

    #[error("Coupon '{0}' is not valid")]
    InvalidCoupon(String),

    #[error("Order could not be recorded: {0}")]
    Order(#[from] OrderError),
}

fn join_fields(fields: &[CheckoutField]) -> String {
    fields
        .iter()
        .copied()
        .map(CheckoutField::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Money breakdown for the current cart and selections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutSummary {
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
}

/// The checkout form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutForm {
    customer_name: String,
    customer_email: String,
    customer_phone: String,
    delivery_method: Option<DeliveryMethod>,
    delivery_vehicle: Option<DeliveryVehicle>,
    delivery_zone: Option<DeliveryZone>,
    pickup_point: Option<String>,
    shipping_address: ShippingAddress,
    payment_method: Option<PaymentMethod>,
    payment_reference: Option<String>,
    coupon: Option<Coupon>,
}

impl CheckoutForm {
    // =========================================================================
    // Selections
    // =========================================================================

    pub fn set_customer_name(&mut self, name: impl Into<String>) {
        self.customer_name = name.into();
    }

    pub fn set_customer_email(&mut self, email: impl Into<String>) {
        self.customer_email = email.into();
    }

    pub fn set_customer_phone(&mut self, phone: impl Into<String>) {
        self.customer_phone = phone.into();
    }

    /// Choose how the order is received.
    ///
    /// A different method clears the pickup point, vehicle, zone and
    /// shipping address, and drops a payment method the new method does not
    /// offer.
    pub fn set_delivery_method(&mut self, method: Option<DeliveryMethod>) {
        if self.delivery_method == method {
            return;
        }
        self.delivery_method = method;
        self.pickup_point = None;
        self.delivery_vehicle = None;
        self.delivery_zone = None;
        self.shipping_address = ShippingAddress::default();
        self.drop_unavailable_payment();
    }

    /// Choose the courier vehicle. While delivery is selected this clears the
    /// zone, and moto drops a cash payment.
    pub fn set_delivery_vehicle(&mut self, vehicle: Option<DeliveryVehicle>) {
        if self.delivery_method == Some(DeliveryMethod::Delivery) {
            self.delivery_zone = None;
        }
        self.delivery_vehicle = vehicle;
        if vehicle == Some(DeliveryVehicle::Moto) && self.payment_method == Some(PaymentMethod::Cash)
        {
            self.set_payment_method_unchecked(None);
        }
        self.drop_unavailable_payment();
    }

    pub const fn set_delivery_zone(&mut self, zone: Option<DeliveryZone>) {
        self.delivery_zone = zone;
    }

    pub fn set_pickup_point(&mut self, point: Option<String>) {
        self.pickup_point = point;
    }

    pub fn set_shipping_address(&mut self, address: ShippingAddress) {
        self.shipping_address = address;
    }

    /// Choose a payment method.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::PaymentUnavailable` if the current delivery
    /// selection does not offer `method`. The form is left unchanged.
    pub fn set_payment_method(&mut self, method: Option<PaymentMethod>) -> Result<(), CheckoutError> {
        let offered = self.available_payment_methods();
        if let Some(m) = method.filter(|m| !offered.contains(m)) {
            return Err(CheckoutError::PaymentUnavailable(m));
        }
        self.set_payment_method_unchecked(method);
        Ok(())
    }

    fn set_payment_method_unchecked(&mut self, method: Option<PaymentMethod>) {
        self.payment_method = method;
        if !method.is_some_and(PaymentMethod::requires_reference) {
            self.payment_reference = None;
        }
    }

    fn drop_unavailable_payment(&mut self) {
        let offered = self.available_payment_methods();
        if self.payment_method.is_some_and(|m| !offered.contains(&m)) {
            self.set_payment_method_unchecked(None);
        }
    }

    pub fn set_payment_reference(&mut self, reference: Option<String>) {
        self.payment_reference = reference;
    }

    /// Apply a coupon code checked against the catalog.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::InvalidCoupon` if no active, unexpired coupon
    /// has that code. A previously applied coupon is kept.
    pub fn apply_coupon(
        &mut self,
        code: &str,
        catalog: &Catalog,
        now: DateTime<Utc>,
    ) -> Result<(), CheckoutError> {
        let coupon = catalog
            .find_coupon(code, now)
            .ok_or_else(|| CheckoutError::InvalidCoupon(code.trim().to_string()))?;
        self.coupon = Some(coupon.clone());
        Ok(())
    }

    pub fn clear_coupon(&mut self) {
        self.coupon = None;
    }

    /// Back to an empty form.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    // =========================================================================
    // Derived state
    // =========================================================================

    #[must_use]
    pub const fn delivery_method(&self) -> Option<DeliveryMethod> {
        self.delivery_method
    }

    #[must_use]
    pub const fn delivery_vehicle(&self) -> Option<DeliveryVehicle> {
        self.delivery_vehicle
    }

    #[must_use]
    pub const fn delivery_zone(&self) -> Option<DeliveryZone> {
        self.delivery_zone
    }

    #[must_use]
    pub const fn payment_method(&self) -> Option<PaymentMethod> {
        self.payment_method
    }

    #[must_use]
    pub fn payment_reference(&self) -> Option<&str> {
        self.payment_reference.as_deref()
    }

    #[must_use]
    pub const fn coupon(&self) -> Option<&Coupon> {
        self.coupon.as_ref()
    }

    #[must_use]
    pub fn shipping_cost(&self) -> Decimal {
        shipping_cost(self.delivery_method, self.delivery_vehicle, self.delivery_zone)
    }

    #[must_use]
    pub fn available_payment_methods(&self) -> Vec<PaymentMethod> {
        available_payment_methods(self.delivery_method, self.delivery_vehicle)
    }

    /// Fields the current selections require.
    #[must_use]
    pub fn required_fields(&self) -> Vec<CheckoutField> {
        required_fields(self.delivery_method, self.payment_method)
    }

    /// Required fields that are unset or invalid.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<CheckoutField> {
        self.required_fields()
            .into_iter()
            .filter(|field| !self.is_filled(*field))
            .collect()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    fn is_filled(&self, field: CheckoutField) -> bool {
        let text = |value: &str| !value.trim().is_empty();
        let address = &self.shipping_address;
        match field {
            CheckoutField::CustomerName => text(&self.customer_name),
            CheckoutField::CustomerEmail => Email::parse(&self.customer_email).is_ok(),
            CheckoutField::CustomerPhone => text(&self.customer_phone),
            CheckoutField::DeliveryMethod => self.delivery_method.is_some(),
            CheckoutField::PickupPoint => self.pickup_point.as_deref().is_some_and(text),
            CheckoutField::DeliveryVehicle => self.delivery_vehicle.is_some(),
            CheckoutField::DeliveryZone => self.delivery_zone.is_some(),
            CheckoutField::Recipient => text(&address.recipient),
            CheckoutField::IdNumber => text(&address.id_number),
            CheckoutField::ShippingPhone => text(&address.phone),
            CheckoutField::State => text(&address.state),
            CheckoutField::City => text(&address.city),
            CheckoutField::AddressLine => text(&address.address_line),
            CheckoutField::Agency => text(&address.agency),
            CheckoutField::PaymentMethod => self.payment_method.is_some(),
            CheckoutField::PaymentReference => self
                .payment_reference
                .as_deref()
                .is_some_and(|r| r.trim().chars().count() >= MIN_REFERENCE_LEN),
        }
    }

    /// Money breakdown for `cart` at current catalog prices.
    #[must_use]
    pub fn summary(&self, cart: &CartLedger, catalog: &Catalog) -> CheckoutSummary {
        let subtotal = cart.total_price(catalog);
        let shipping = self.shipping_cost();
        let discount = self
            .coupon
            .as_ref()
            .map_or(Decimal::ZERO, |c| c.discount_for(subtotal));
        CheckoutSummary {
            subtotal,
            shipping,
            discount,
            total: (subtotal + shipping - discount).max(Decimal::ZERO),
        }
    }

    // =========================================================================
    // Placement
    // =========================================================================

    /// Build the order snapshot for the current cart without recording it.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError` if the cart is empty, a required field is
    /// missing, the payment method is not offered, or the coupon is no longer
    /// redeemable.
    pub fn build_order(
        &self,
        cart: &CartLedger,
        catalog: &Catalog,
        order_prefix: &str,
        now: DateTime<Utc>,
    ) -> Result<Order, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(CheckoutError::Incomplete(missing));
        }
        let incomplete = |field| CheckoutError::Incomplete(vec![field]);
        let delivery_method = self
            .delivery_method
            .ok_or_else(|| incomplete(CheckoutField::DeliveryMethod))?;
        let payment_method = self
            .payment_method
            .ok_or_else(|| incomplete(CheckoutField::PaymentMethod))?;
        if !self.available_payment_methods().contains(&payment_method) {
            return Err(CheckoutError::PaymentUnavailable(payment_method));
        }
        let customer_email = Email::parse(&self.customer_email)
            .map_err(|_| incomplete(CheckoutField::CustomerEmail))?;

        let items: Vec<OrderItem> = cart
            .lines()
            .iter()
            .map(|line| {
                let current = catalog.product(&line.product.id).unwrap_or(&line.product);
                OrderItem {
                    product_id: line.product.id.clone(),
                    name: current.name.clone(),
                    quantity: line.quantity,
                    unit_price: current.price,
                    unit_cost: current.cost,
                }
            })
            .collect();
        let subtotal: Decimal = items.iter().map(OrderItem::line_total).sum();

        let (coupon_code, discount) = match &self.coupon {
            Some(applied) => {
                let coupon = catalog
                    .find_coupon(&applied.code, now)
                    .ok_or_else(|| CheckoutError::InvalidCoupon(applied.code.clone()))?;
                (Some(coupon.code.clone()), coupon.discount_for(subtotal))
            }
            None => (None, Decimal::ZERO),
        };

        let is = |m: DeliveryMethod| delivery_method == m;
        Ok(Order {
            id: OrderId::generate(order_prefix, now),
            items,
            status: OrderStatus::Processing,
            customer_name: self.customer_name.trim().to_string(),
            customer_email,
            customer_phone: self.customer_phone.trim().to_string(),
            delivery_method,
            delivery_zone: self.delivery_zone.filter(|_| is(DeliveryMethod::Delivery)),
            delivery_vehicle: self
                .delivery_vehicle
                .filter(|_| is(DeliveryMethod::Delivery)),
            pickup_point: self
                .pickup_point
                .clone()
                .filter(|_| is(DeliveryMethod::Pickup)),
            shipping_address: is(DeliveryMethod::Shipping).then(|| self.shipping_address.clone()),
            payment_method,
            payment_reference: self
                .payment_reference
                .as_deref()
                .map(str::trim)
                .filter(|_| payment_method.requires_reference())
                .map(str::to_string),
            shipping_cost: self.shipping_cost(),
            coupon_code,
            discount,
            created_at: now,
        })
    }

    /// Place the order: record it in `orders` and empty the cart.
    ///
    /// Nothing is recorded and the cart is untouched when this fails.
    ///
    /// # Errors
    ///
    /// Same as [`CheckoutForm::build_order`], plus `CheckoutError::Order` if
    /// the order book rejects the snapshot.
    #[instrument(skip_all, fields(lines = cart.lines().len()))]
    pub fn submit(
        &self,
        cart: &mut CartLedger,
        orders: &mut OrderStore,
        catalog: &Catalog,
        order_prefix: &str,
        now: DateTime<Utc>,
    ) -> Result<Order, CheckoutError> {
        let order = self.build_order(cart, catalog, order_prefix, now)?;
        orders.create(order.clone())?;
        cart.clear_cart();
        info!(
            order_id = %order.id,
            total = %order.total(),
            items = order.item_count(),
            "Order placed"
        );
        Ok(order)
    }
}
