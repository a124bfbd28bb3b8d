//! Sales dataset records

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::sku::SkuAttributes;

/// One sales line after normalization and enrichment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesRecord {
    pub timestamp: NaiveDateTime,
    pub transaction_id: String,
    pub sku: String,
    pub product_name: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
    pub net_sales: Decimal,
    pub cost_of_goods: Decimal,
    pub gross_profit: Decimal,
    pub channel: Option<String>,
    pub customer_id: Option<String>,
    pub location: Option<String>,
    pub attributes: SkuAttributes,
}

impl SalesRecord {
    /// Enforce `gross_profit = net_sales - cost_of_goods`. Source files
    /// sometimes carry a stale or blank profit column.
    pub fn recompute_gross_profit(&mut self) {
        self.gross_profit = self.net_sales - self.cost_of_goods;
    }

    pub fn gross_profit_is_consistent(&self) -> bool {
        self.gross_profit == self.net_sales - self.cost_of_goods
    }

    /// Cost per unit at current quantities, zero when nothing was sold.
    pub fn unit_cost(&self) -> Decimal {
        if self.quantity <= Decimal::ZERO {
            Decimal::ZERO
        } else {
            self.cost_of_goods / self.quantity
        }
    }
}
