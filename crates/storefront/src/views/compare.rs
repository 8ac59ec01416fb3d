//! Side-by-side product comparison.
//!
//! The table has a price row followed by one row per distinct spec name, in
//! order of first appearance. Values are normalized: numbers (including the
//! leading number of text such as `"16 GB"`) compare numerically, everything
//! else is shown as-is.
//!
//! A cell wins its row when at least two products have a value, the values
//! differ, the row has a positive numeric maximum, and the cell holds it.

use rust_decimal::prelude::ToPrimitive;
use vitrina_core::{Product, ProductId, SpecValue};

use crate::catalog::Catalog;

/// Most products that can be compared at once.
pub const MAX_COMPARED: usize = 3;

/// Label of the leading price row.
pub const PRICE_ROW: &str = "Price";

/// A normalized comparison value.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Bool(bool),
    Missing,
}

impl CellValue {
    fn from_spec(value: Option<&SpecValue>) -> Self {
        match value {
            None => Self::Missing,
            Some(SpecValue::Bool(b)) => Self::Bool(*b),
            Some(SpecValue::Number(n)) => Self::Number(*n),
            Some(SpecValue::Text(text)) => {
                let text = text.trim();
                if text.is_empty() {
                    Self::Missing
                } else {
                    leading_number(text).map_or_else(|| Self::Text(text.to_string()), Self::Number)
                }
            }
        }
    }

    const fn number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    const fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(text) => f.write_str(text),
            Self::Bool(true) => f.write_str("yes"),
            Self::Bool(false) => f.write_str("no"),
            Self::Missing => f.write_str("missing"),
        }
    }
}

/// Parse the number at the start of `text`, e.g. `"16 GB"` -> 16.
fn leading_number(text: &str) -> Option<f64> {
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;
    for (i, c) in text.char_indices() {
        match c {
            '-' | '+' if i == 0 => {}
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end = i + c.len_utf8();
    }
    if !seen_digit {
        return None;
    }
    text.get(..end)?.trim_end_matches('.').parse().ok()
}

/// One product's value in a row.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonCell {
    pub product_id: ProductId,
    pub value: CellValue,
    pub is_winner: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRow {
    pub name: String,
    pub cells: Vec<ComparisonCell>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonTable {
    /// Compared products, in selection order.
    pub products: Vec<ProductId>,
    pub rows: Vec<ComparisonRow>,
}

fn build_row(name: String, products: &[&Product], values: Vec<CellValue>) -> ComparisonRow {
    let present: Vec<&CellValue> = values.iter().filter(|v| !v.is_missing()).collect();
    let differs = present
        .first()
        .is_some_and(|first| present.iter().any(|v| v != first));
    let max = values
        .iter()
        .filter_map(CellValue::number)
        .fold(None, |acc: Option<f64>, n| Some(acc.map_or(n, |m| m.max(n))));
    let winning = max.filter(|m| present.len() >= 2 && differs && *m > 0.0);

    let cells = products
        .iter()
        .zip(values)
        .map(|(product, value)| ComparisonCell {
            product_id: product.id.clone(),
            is_winner: winning.is_some_and(|m| value.number() == Some(m)),
            value,
        })
        .collect();
    ComparisonRow { name, cells }
}

/// Build the comparison table for 2 or 3 products, `None` otherwise.
#[must_use]
pub fn comparison_table(products: &[&Product]) -> Option<ComparisonTable> {
    if !(2..=MAX_COMPARED).contains(&products.len()) {
        return None;
    }

    let mut rows = Vec::new();
    let prices = products
        .iter()
        .map(|p| p.price.to_f64().map_or(CellValue::Missing, CellValue::Number))
        .collect();
    rows.push(build_row(PRICE_ROW.to_string(), products, prices));

    let mut names: Vec<&str> = Vec::new();
    for product in products {
        for spec in &product.specs {
            if !names.contains(&spec.name.as_str()) {
                names.push(&spec.name);
            }
        }
    }
    for name in names {
        let values = products
            .iter()
            .map(|p| CellValue::from_spec(p.spec(name)))
            .collect();
        rows.push(build_row(name.to_string(), products, values));
    }

    Some(ComparisonTable {
        products: products.iter().map(|p| p.id.clone()).collect(),
        rows,
    })
}

/// Result of toggling a product in the comparison selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added,
    Removed,
    /// The selection already holds [`MAX_COMPARED`] products.
    Full,
}

/// The shopper's comparison picks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComparisonSelection {
    ids: Vec<ProductId>,
}

impl ComparisonSelection {
    #[must_use]
    pub fn ids(&self) -> &[ProductId] {
        &self.ids
    }

    /// Add `id` if absent, remove it if present.
    pub fn toggle(&mut self, id: ProductId) -> ToggleOutcome {
        if let Some(index) = self.ids.iter().position(|selected| selected == &id) {
            self.ids.remove(index);
            ToggleOutcome::Removed
        } else if self.ids.len() >= MAX_COMPARED {
            ToggleOutcome::Full
        } else {
            self.ids.push(id);
            ToggleOutcome::Added
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// The table for the selected products that still exist.
    #[must_use]
    pub fn table(&self, catalog: &Catalog) -> Option<ComparisonTable> {
        let products: Vec<&Product> = self.ids.iter().filter_map(|id| catalog.product(id)).collect();
        comparison_table(&products)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use vitrina_core::ProductSpec;

    use super::*;
    use crate::catalog::tests::product;

    fn winners(row: &ComparisonRow) -> Vec<&str> {
        row.cells
            .iter()
            .filter(|c| c.is_winner)
            .map(|c| c.product_id.as_str())
            .collect()
    }

    #[test]
    fn test_leading_number() {
        assert_eq!(leading_number("16 GB"), Some(16.0));
        assert_eq!(leading_number("2.5GHz"), Some(2.5));
        assert_eq!(leading_number("-3"), Some(-3.0));
        assert_eq!(leading_number("OLED"), None);
        assert_eq!(leading_number("-"), None);
    }

    #[test]
    fn test_price_winner_only_when_prices_differ() {
        let cheap = product("a", 500);
        let mut pricey = product("b", 600);
        pricey.old_price = Some(Decimal::from(600));

        let table = comparison_table(&[&cheap, &pricey]).unwrap();
        assert_eq!(table.rows[0].name, PRICE_ROW);
        assert_eq!(winners(&table.rows[0]), vec!["b"]);

        let same = product("c", 500);
        let table = comparison_table(&[&cheap, &same]).unwrap();
        assert!(winners(&table.rows[0]).is_empty());
    }

    #[test]
    fn test_spec_rows_and_missing_values() {
        let mut a = product("a", 1);
        a.specs = vec![
            ProductSpec::new("RAM", Some(SpecValue::Text("8 GB".to_string()))),
            ProductSpec::new("Panel", Some(SpecValue::Text("OLED".to_string()))),
        ];
        let mut b = product("b", 1);
        b.specs = vec![ProductSpec::new(
            "RAM",
            Some(SpecValue::Text("16 GB".to_string())),
        )];

        let table = comparison_table(&[&a, &b]).unwrap();
        let names: Vec<&str> = table.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec![PRICE_ROW, "RAM", "Panel"]);

        assert_eq!(winners(&table.rows[1]), vec!["b"]);
        assert_eq!(table.rows[2].cells[1].value, CellValue::Missing);
        assert!(winners(&table.rows[2]).is_empty());
    }

    #[test]
    fn test_zero_max_has_no_winner() {
        let mut a = product("a", 1);
        a.specs = vec![ProductSpec::new("Ports", Some(SpecValue::Number(0.0)))];
        let mut b = product("b", 2);
        b.specs = vec![ProductSpec::new("Ports", Some(SpecValue::Number(-1.0)))];
        let table = comparison_table(&[&a, &b]).unwrap();
        assert!(winners(&table.rows[1]).is_empty());
    }

    #[test]
    fn test_needs_two_or_three_products() {
        let a = product("a", 1);
        assert!(comparison_table(&[&a]).is_none());
        let (b, c, d) = (product("b", 1), product("c", 1), product("d", 1));
        assert!(comparison_table(&[&a, &b, &c, &d]).is_none());
    }

    #[test]
    fn test_selection_holds_three() {
        let mut selection = ComparisonSelection::default();
        for id in ["a", "b", "c"] {
            assert_eq!(selection.toggle(ProductId::new(id)), ToggleOutcome::Added);
        }
        assert_eq!(selection.toggle(ProductId::new("d")), ToggleOutcome::Full);
        assert_eq!(selection.toggle(ProductId::new("b")), ToggleOutcome::Removed);
        assert_eq!(selection.ids().len(), 2);
    }
}
