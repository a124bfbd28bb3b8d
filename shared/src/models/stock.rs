//! Stock (current inventory position) dataset records

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::sku::SkuAttributes;

/// One stock position after normalization and enrichment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockRecord {
    pub sku: String,
    pub item_name: String,
    pub location: Option<String>,
    pub qty_total: Decimal,
    pub qty_reserved: Decimal,
    pub qty_available: Decimal,
    pub sell_price: Decimal,
    pub unit_cost: Decimal,
    pub inventory_value: Decimal,
    pub is_bundle: bool,
    pub attributes: SkuAttributes,
}

impl StockRecord {
    pub fn expected_inventory_value(&self) -> Decimal {
        self.qty_total * self.unit_cost
    }

    /// True when the stated inventory value disagrees with qty x unit cost
    /// beyond the given absolute tolerance. Flagged, never corrected.
    pub fn has_value_mismatch(&self, tolerance: Decimal) -> bool {
        let diff = self.inventory_value - self.expected_inventory_value();
        diff.abs() > tolerance
    }

    /// Available stock can never exceed the total on hand.
    pub fn available_exceeds_total(&self) -> bool {
        self.qty_available > self.qty_total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn record() -> StockRecord {
        StockRecord {
            sku: "TSH124SSA BAS-BLK32".to_string(),
            item_name: "Basic Tee".to_string(),
            location: Some("Gudang A".to_string()),
            qty_total: dec("10"),
            qty_reserved: dec("2"),
            qty_available: dec("8"),
            sell_price: dec("50"),
            unit_cost: dec("30"),
            inventory_value: dec("300"),
            is_bundle: false,
            attributes: SkuAttributes::default(),
        }
    }

    #[test]
    fn test_value_mismatch() {
        let mut rec = record();
        assert!(!rec.has_value_mismatch(dec("0.01")));
        rec.inventory_value = dec("250");
        assert!(rec.has_value_mismatch(dec("0.01")));
    }

    #[test]
    fn test_available_exceeds_total() {
        let mut rec = record();
        assert!(!rec.available_exceeds_total());
        rec.qty_available = dec("11");
        assert!(rec.available_exceeds_total());
    }
}
