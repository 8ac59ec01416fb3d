//! Dashboard KPIs computed from the order book and the catalog.
//!
//! Every function is pure and takes `now` explicitly. Ratios with a zero
//! denominator are 0, never NaN or infinity.

mod cohorts;
mod customers;
mod products;

use chrono::{DateTime, Datelike, Duration, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use vitrina_core::{Order, OrderStatus, Product, Settings, percent_of};

pub use cohorts::{COHORT_MONTHS, Cohort, cohort_analysis};
pub use customers::{CustomerSummary, customer_summaries};
pub use products::{COLD_WINDOW_DAYS, HOT_PRODUCT_LIMIT, ProductSales, cold_products, hot_products};

/// Window summed by [`sales_today`].
pub const SALES_WINDOW_DAYS: i64 = 3;

/// Window of cost of goods used by [`inventory_turnover_days`].
pub const TURNOVER_WINDOW_DAYS: i64 = 30;

fn within_days(order: &Order, now: DateTime<Utc>, days: i64) -> bool {
    order.created_at <= now && order.created_at >= now - Duration::days(days)
}

/// Total of orders placed in the last three days.
#[must_use]
pub fn sales_today(orders: &[Order], now: DateTime<Utc>) -> Decimal {
    orders
        .iter()
        .filter(|o| within_days(o, now, SALES_WINDOW_DAYS))
        .map(Order::total)
        .sum()
}

/// Orders still waiting to be fulfilled.
#[must_use]
pub fn new_orders_count(orders: &[Order]) -> usize {
    orders
        .iter()
        .filter(|o| o.status == OrderStatus::Processing)
        .count()
}

/// Customers whose first order falls in the calendar month of `now`.
#[must_use]
pub fn new_customers_count(orders: &[Order], now: DateTime<Utc>) -> usize {
    customer_summaries(orders)
        .iter()
        .filter(|c| {
            c.first_order.year() == now.year() && c.first_order.month() == now.month()
        })
        .count()
}

/// New orders per unique visitor.
#[must_use]
#[allow(clippy::cast_precision_loss)] // Counts never approach 2^52
pub fn conversion_rate(new_orders: usize, unique_visitors: u64) -> f64 {
    if unique_visitors == 0 {
        return 0.0;
    }
    new_orders as f64 / unique_visitors as f64
}

/// Marketing spend per new customer.
#[must_use]
pub fn customer_acquisition_cost(monthly_marketing_spend: Decimal, new_customers: usize) -> Decimal {
    if new_customers == 0 {
        return Decimal::ZERO;
    }
    (monthly_marketing_spend / Decimal::from(new_customers))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Cost of goods sold over the last thirty days.
#[must_use]
pub fn cost_of_goods_sold(orders: &[Order], now: DateTime<Utc>) -> Decimal {
    orders
        .iter()
        .filter(|o| within_days(o, now, TURNOVER_WINDOW_DAYS))
        .map(Order::cost_of_goods)
        .sum()
}

/// Days the current inventory lasts at the last thirty days' rate of sale.
#[must_use]
pub fn inventory_turnover_days(products: &[Product], orders: &[Order], now: DateTime<Utc>) -> f64 {
    let inventory: Decimal = products.iter().map(Product::inventory_cost).sum();
    let cogs = cost_of_goods_sold(orders, now);
    inventory
        .checked_div(cogs)
        .and_then(|ratio| (ratio * Decimal::from(TURNOVER_WINDOW_DAYS)).to_f64())
        .unwrap_or(0.0)
}

/// Sales so far as a percentage of today's weekday quota.
#[must_use]
pub fn daily_goal_progress(sales: Decimal, settings: &Settings, now: DateTime<Utc>) -> f64 {
    percent_of(sales, settings.goal_for(now.weekday()))
}

/// Mean order total over every order.
#[must_use]
pub fn average_order_value(orders: &[Order]) -> Decimal {
    if orders.is_empty() {
        return Decimal::ZERO;
    }
    let total: Decimal = orders.iter().map(Order::total).sum();
    (total / Decimal::from(orders.len()))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

// =============================================================================
// Dashboard
// =============================================================================

/// Inputs the dashboard needs besides the order book.
#[derive(Debug, Clone, Copy)]
pub struct DashboardInputs<'a> {
    pub products: &'a [Product],
    pub settings: &'a Settings,
    pub unique_visitors: u64,
    pub now: DateTime<Utc>,
}

/// Every KPI shown on the back-office dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub sales_today: Decimal,
    pub daily_goal: Decimal,
    pub daily_goal_progress: f64,
    pub new_orders_count: usize,
    pub new_customers_count: usize,
    pub conversion_rate: f64,
    pub customer_acquisition_cost: Decimal,
    pub inventory_turnover_days: f64,
    pub average_order_value: Decimal,
    pub total_orders: usize,
    pub hot_products: Vec<ProductSales>,
    pub cold_products: Vec<ProductSales>,
    pub cohorts: Vec<Cohort>,
}

impl Dashboard {
    #[must_use]
    pub fn compute(orders: &[Order], inputs: DashboardInputs<'_>) -> Self {
        let DashboardInputs {
            products,
            settings,
            unique_visitors,
            now,
        } = inputs;
        let sales = sales_today(orders, now);
        let new_orders = new_orders_count(orders);
        let new_customers = new_customers_count(orders, now);

        Self {
            sales_today: sales,
            daily_goal: settings.goal_for(now.weekday()),
            daily_goal_progress: daily_goal_progress(sales, settings, now),
            new_orders_count: new_orders,
            new_customers_count: new_customers,
            conversion_rate: conversion_rate(new_orders, unique_visitors),
            customer_acquisition_cost: customer_acquisition_cost(
                settings.monthly_marketing_spend,
                new_customers,
            ),
            inventory_turnover_days: inventory_turnover_days(products, orders, now),
            average_order_value: average_order_value(orders),
            total_orders: orders.len(),
            hot_products: hot_products(orders),
            cold_products: cold_products(products, orders, now),
            cohorts: cohort_analysis(orders, now),
        }
    }
}
