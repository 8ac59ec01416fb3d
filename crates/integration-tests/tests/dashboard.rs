//! Back-office KPIs over orders placed through the storefront.

#![allow(clippy::unwrap_used)]

use chrono::Duration;
use rust_decimal::Decimal;
use vitrina_admin::analytics::{Dashboard, DashboardInputs, customer_summaries};
use vitrina_admin::console::set_order_status;
use vitrina_core::{OrderStatus, ProductId};
use vitrina_integration_tests::{TestContext, fill_pickup_form, fixed_now};
use vitrina_storefront::state::AppState;

fn place(state: &mut AppState, product: &str, quantity: u32, name: &str, email: &str, minutes: i64) {
    let at = fixed_now() - Duration::minutes(minutes);
    state
        .add_to_cart(&ProductId::new(product), quantity, at)
        .unwrap();
    fill_pickup_form(state, name, email);
    state.place_order(at).unwrap();
}

fn dashboard(state: &AppState, visitors: u64) -> Dashboard {
    Dashboard::compute(
        state.orders().orders(),
        DashboardInputs {
            products: state.catalog().products(),
            settings: state.catalog().settings(),
            unique_visitors: visitors,
            now: fixed_now(),
        },
    )
}

#[test]
fn test_dashboard_over_placed_orders() {
    let ctx = TestContext::new().unwrap();
    let mut state = ctx.open().unwrap();
    place(&mut state, "p-001", 1, "Ana Pérez", "ana@example.com", 30);
    place(&mut state, "p-005", 2, "Luis Díaz", "luis@example.com", 10);

    let kpis = dashboard(&state, 100);
    assert_eq!(kpis.total_orders, 2);
    assert_eq!(kpis.sales_today, Decimal::new(8900, 2));
    // Wednesday quota from the seed settings
    assert_eq!(kpis.daily_goal, Decimal::new(15000, 2));
    assert!(kpis.daily_goal_progress > 59.0 && kpis.daily_goal_progress < 60.0);
    assert_eq!(kpis.new_orders_count, 2);
    assert_eq!(kpis.new_customers_count, 2);
    assert!((kpis.conversion_rate - 0.02).abs() < f64::EPSILON);
    assert_eq!(kpis.customer_acquisition_cost, Decimal::new(20000, 2));
    assert_eq!(kpis.average_order_value, Decimal::new(4450, 2));
    assert!(kpis.inventory_turnover_days > 0.0);

    let hot: Vec<&str> = kpis
        .hot_products
        .iter()
        .map(|p| p.product_id.as_str())
        .collect();
    assert_eq!(hot, vec!["p-005", "p-001"]);
    assert_eq!(kpis.cold_products.len(), 7);

    assert_eq!(kpis.cohorts.len(), 1);
    assert_eq!(kpis.cohorts[0].month, "2026-06");
    assert_eq!(kpis.cohorts[0].size, 2);
    assert_eq!(kpis.cohorts[0].retention[0], Some(100.0));

    let json = serde_json::to_value(&kpis).unwrap();
    assert_eq!(json["salesToday"], "89.00");
}

#[test]
fn test_fulfilled_orders_leave_new_orders() {
    let ctx = TestContext::new().unwrap();
    let mut state = ctx.open().unwrap();
    place(&mut state, "p-002", 1, "Ana Pérez", "ana@example.com", 20);
    place(&mut state, "p-002", 1, "Ana Pérez", "ana@example.com", 5);

    let first = state.orders().orders()[0].id.clone();
    set_order_status(state.orders_mut(), &first, OrderStatus::Delivered).unwrap();

    let kpis = dashboard(&state, 0);
    assert_eq!(kpis.new_orders_count, 1);
    assert!(kpis.conversion_rate.abs() < f64::EPSILON);
    assert_eq!(kpis.new_customers_count, 1);

    let customers = customer_summaries(state.orders().orders());
    assert_eq!(customers.len(), 1);
    assert_eq!(customers[0].order_count, 2);
    assert_eq!(customers[0].total_spent, Decimal::new(5800, 2));
}

#[test]
fn test_empty_store_has_zero_ratios() {
    let ctx = TestContext::new().unwrap();
    let state = ctx.open().unwrap();
    let kpis = dashboard(&state, 0);
    assert_eq!(kpis.sales_today, Decimal::ZERO);
    assert!(kpis.inventory_turnover_days.abs() < f64::EPSILON);
    assert_eq!(kpis.customer_acquisition_cost, Decimal::ZERO);
    assert_eq!(kpis.cold_products.len(), 9);
    assert!(kpis.hot_products.is_empty());
}
