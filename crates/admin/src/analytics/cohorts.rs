//! Monthly retention cohorts.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use vitrina_core::{Email, Order};

/// Months tracked per cohort, starting with the acquisition month.
pub const COHORT_MONTHS: usize = 6;

/// Customers acquired in the same calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cohort {
    /// Acquisition month as `YYYY-MM`.
    pub month: String,
    pub size: usize,
    /// Percent of the cohort ordering in each month after acquisition.
    /// Month zero is always 100. Later months are `None` until they have
    /// started.
    pub retention: [Option<f64>; COHORT_MONTHS],
}

fn month_index(at: DateTime<Utc>) -> i64 {
    i64::from(at.year()) * 12 + i64::from(at.month0())
}

fn month_label(index: i64) -> String {
    format!("{:04}-{:02}", index.div_euclid(12), index.rem_euclid(12) + 1)
}

/// Group customers by the month of their first order and measure how many
/// order again in each of the following months. Oldest cohort first.
#[must_use]
pub fn cohort_analysis(orders: &[Order], now: DateTime<Utc>) -> Vec<Cohort> {
    let mut active_months: HashMap<&Email, BTreeSet<i64>> = HashMap::new();
    for order in orders {
        active_months
            .entry(&order.customer_email)
            .or_default()
            .insert(month_index(order.created_at));
    }

    // cohort month -> each member's active months
    let mut cohorts: BTreeMap<i64, Vec<&BTreeSet<i64>>> = BTreeMap::new();
    for months in active_months.values() {
        if let Some(first) = months.first() {
            cohorts.entry(*first).or_default().push(months);
        }
    }

    let current = month_index(now);
    cohorts
        .into_iter()
        .map(|(start, members)| {
            let size = members.len();
            let mut retention = [None; COHORT_MONTHS];
            for (offset, slot) in (0_i64..).zip(retention.iter_mut()) {
                let month = start + offset;
                // Month zero is always reported, even for a cohort dated
                // after `now`.
                if offset > 0 && month > current {
                    break;
                }
                let returning = members.iter().filter(|m| m.contains(&month)).count();
                *slot = Some(percent(returning, size));
            }
            Cohort {
                month: month_label(start),
                size,
                retention,
            }
        })
        .collect()
}

#[allow(clippy::cast_precision_loss)] // Customer counts never approach 2^52
fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::analytics::tests::{at, order};

    #[test]
    fn test_cohort_retention() {
        let orders = vec![
            order("1", "a@x.com", "p", 1, at(1, 5)),
            order("2", "b@x.com", "p", 1, at(1, 20)),
            order("3", "a@x.com", "p", 1, at(2, 3)),
            order("4", "a@x.com", "p", 1, at(3, 3)),
            order("5", "b@x.com", "p", 1, at(3, 9)),
            order("6", "c@x.com", "p", 1, at(2, 14)),
        ];

        let cohorts = cohort_analysis(&orders, at(3, 15));
        assert_eq!(cohorts.len(), 2);

        let january = &cohorts[0];
        assert_eq!(january.month, "2026-01");
        assert_eq!(january.size, 2);
        assert_eq!(january.retention[0], Some(100.0));
        assert_eq!(january.retention[1], Some(50.0));
        assert_eq!(january.retention[2], Some(100.0));
        assert_eq!(january.retention[3], None);

        let february = &cohorts[1];
        assert_eq!(february.month, "2026-02");
        assert_eq!(february.retention[0], Some(100.0));
        assert_eq!(february.retention[1], Some(0.0));
        assert_eq!(february.retention[2], None);
    }

    #[test]
    fn test_future_cohort_reports_month_zero() {
        let orders = vec![order("1", "a@x.com", "p", 1, at(4, 2))];
        let cohorts = cohort_analysis(&orders, at(3, 15));
        assert_eq!(cohorts[0].month, "2026-04");
        assert_eq!(cohorts[0].retention[0], Some(100.0));
        assert_eq!(cohorts[0].retention[1], None);
    }

    #[test]
    fn test_no_orders_no_cohorts() {
        assert!(cohort_analysis(&[], at(3, 1)).is_empty());
    }

    #[test]
    fn test_month_label_wraps_years() {
        assert_eq!(month_label(2025 * 12 + 11), "2025-12");
        assert_eq!(month_label(2026 * 12), "2026-01");
    }
}
