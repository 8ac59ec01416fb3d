//! Two sessions sharing one data directory.

#![allow(clippy::unwrap_used)]

use vitrina_admin::console::{order_timeline, set_order_status};
use vitrina_core::{Email, OrderStatus, ProductId};
use vitrina_integration_tests::{TestContext, fill_pickup_form, fixed_now};
use vitrina_storefront::orders::StepState;

#[test]
fn test_status_change_reaches_customer_session() {
    let ctx = TestContext::new().unwrap();
    let storage = ctx.storage().unwrap();
    let mut shop = ctx.open_session(&storage).unwrap();
    let mut console = ctx.open_session(&storage).unwrap();

    shop.add_to_cart(&ProductId::new("p-002"), 1, fixed_now())
        .unwrap();
    fill_pickup_form(&mut shop, "Ana Pérez", "ana@example.com");
    let order = shop.place_order(fixed_now()).unwrap().order;

    assert!(console.orders().get(&order.id).is_none());
    assert!(console.sync_orders());
    assert!(console.orders().get(&order.id).is_some());

    set_order_status(console.orders_mut(), &order.id, OrderStatus::Shipped).unwrap();
    assert!(shop.sync_orders());

    let ana = Email::parse("ana@example.com").unwrap();
    let history = shop.orders().history_for(&ana);
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, OrderStatus::Shipped);

    let steps = order_timeline(shop.orders(), &order.id).unwrap();
    assert_eq!(steps[0].state, StepState::Complete);
    assert_eq!(steps[1].state, StepState::Current);
    assert_eq!(steps[2].state, StepState::Upcoming);
}

#[test]
fn test_nothing_pending_is_a_no_op() {
    let ctx = TestContext::new().unwrap();
    let storage = ctx.storage().unwrap();
    let mut shop = ctx.open_session(&storage).unwrap();
    assert!(!shop.sync_orders());
}

#[test]
fn test_last_write_wins() {
    let ctx = TestContext::new().unwrap();
    let storage = ctx.storage().unwrap();
    let mut first = ctx.open_session(&storage).unwrap();
    let mut second = ctx.open_session(&storage).unwrap();

    first
        .add_to_cart(&ProductId::new("p-005"), 1, fixed_now())
        .unwrap();
    fill_pickup_form(&mut first, "Ana Pérez", "ana@example.com");
    let order = first.place_order(fixed_now()).unwrap().order;

    // The second session never synced, so its write drops the first order
    let later = fixed_now() + chrono::Duration::minutes(5);
    second
        .add_to_cart(&ProductId::new("p-006"), 1, later)
        .unwrap();
    fill_pickup_form(&mut second, "Luis Díaz", "luis@example.com");
    second.place_order(later).unwrap();

    assert!(first.sync_orders());
    assert_eq!(first.orders().orders().len(), 1);
    assert!(first.orders().get(&order.id).is_none());
}
