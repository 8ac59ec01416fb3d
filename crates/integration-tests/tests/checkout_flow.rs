//! Cart to placed order against the seed catalog on disk.

#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;
use vitrina_admin::events::AdminEvent;
use vitrina_core::{
    DeliveryMethod, DeliveryVehicle, DeliveryZone, OrderStatus, PaymentMethod, ProductId,
};
use vitrina_integration_tests::{TestContext, fill_pickup_form, fixed_now};
use vitrina_storefront::checkout::{CheckoutError, CheckoutField};
use vitrina_storefront::error::AppError;

#[test]
fn test_place_order_end_to_end() {
    let ctx = TestContext::new().unwrap();
    let mut state = ctx.open().unwrap();
    assert_eq!(state.catalog().products().len(), 9);

    state
        .add_to_cart(&ProductId::new("p-003"), 2, fixed_now())
        .unwrap();
    state
        .add_to_cart(&ProductId::new("p-001"), 1, fixed_now())
        .unwrap();
    assert_eq!(state.cart().cart_count(), 3);
    assert_eq!(state.cart().total_price(state.catalog()), Decimal::new(8200, 2));

    fill_pickup_form(&mut state, "Ana Pérez", "ana@example.com");
    state.apply_coupon("BIENVENIDA10", fixed_now()).unwrap();

    let placed = state.place_order(fixed_now()).unwrap();
    assert_eq!(placed.order.status, OrderStatus::Processing);
    assert_eq!(placed.order.discount, Decimal::new(820, 2));
    assert_eq!(placed.order.total(), Decimal::new(7380, 2));
    assert!(placed.order.id.as_str().starts_with("ORD-"));

    // p-003 drops from 4 to 2, under the default threshold of 5
    assert_eq!(placed.low_stock.len(), 1);
    assert_eq!(placed.low_stock[0].product_id, ProductId::new("p-003"));
    assert_eq!(placed.low_stock[0].stock, 2);

    let events = AdminEvent::from_placed_order(&placed);
    assert_eq!(events.len(), 2);
    assert!(matches!(events[0], AdminEvent::NewOrder { .. }));

    assert!(state.cart().is_empty());
    assert!(state.checkout().delivery_method().is_none());

    // Everything is on disk for the next session
    let reopened = ctx.open().unwrap();
    assert_eq!(reopened.orders().orders().len(), 1);
    assert!(reopened.cart().is_empty());
    let speaker = reopened.catalog().product(&ProductId::new("p-003")).unwrap();
    assert_eq!(speaker.stock, 2);
}

#[test]
fn test_incomplete_form_changes_nothing() {
    let ctx = TestContext::new().unwrap();
    let mut state = ctx.open().unwrap();
    state
        .add_to_cart(&ProductId::new("p-005"), 1, fixed_now())
        .unwrap();

    let form = state.checkout_mut();
    form.set_customer_name("Luis");
    form.set_delivery_method(Some(DeliveryMethod::Delivery));

    let err = state.place_order(fixed_now()).unwrap_err();
    let AppError::Checkout(CheckoutError::Incomplete(fields)) = err else {
        panic!("expected incomplete form, got {err:?}");
    };
    assert!(fields.contains(&CheckoutField::CustomerEmail));
    assert!(fields.contains(&CheckoutField::DeliveryVehicle));
    assert!(fields.contains(&CheckoutField::DeliveryZone));
    assert!(fields.contains(&CheckoutField::PaymentMethod));

    assert_eq!(state.cart().cart_count(), 1);
    assert!(state.orders().orders().is_empty());
    let mouse = state.catalog().product(&ProductId::new("p-005")).unwrap();
    assert_eq!(mouse.stock, 30);
}

#[test]
fn test_moto_delivery_fee_and_cash_cleared() {
    let ctx = TestContext::new().unwrap();
    let mut state = ctx.open().unwrap();
    state
        .add_to_cart(&ProductId::new("p-006"), 1, fixed_now())
        .unwrap();

    let form = state.checkout_mut();
    form.set_customer_name("Luis Díaz");
    form.set_customer_email("luis@example.com");
    form.set_customer_phone("04241234567");
    form.set_delivery_method(Some(DeliveryMethod::Delivery));
    form.set_delivery_vehicle(Some(DeliveryVehicle::Carro));
    form.set_payment_method(Some(PaymentMethod::Cash)).unwrap();
    form.set_delivery_vehicle(Some(DeliveryVehicle::Moto));
    assert!(form.payment_method().is_none());
    form.set_delivery_zone(Some(DeliveryZone::ValenciaNorte));
    form.set_payment_method(Some(PaymentMethod::PagoMovil)).unwrap();
    form.set_payment_reference(Some("123456".to_string()));

    let placed = state.place_order(fixed_now()).unwrap();
    assert_eq!(placed.order.shipping_cost, Decimal::new(200, 2));
    assert_eq!(placed.order.total(), Decimal::new(1400, 2));
    assert_eq!(placed.order.payment_reference.as_deref(), Some("123456"));
    assert!(placed.low_stock.is_empty());
}

#[test]
fn test_unknown_product_not_added() {
    let ctx = TestContext::new().unwrap();
    let mut state = ctx.open().unwrap();
    let err = state
        .add_to_cart(&ProductId::new("p-404"), 1, fixed_now())
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    assert!(state.cart().is_empty());
}
