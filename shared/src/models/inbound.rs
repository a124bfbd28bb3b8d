//! Inbound (purchase/receiving) dataset records

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::sku::SkuAttributes;

/// One inbound line after normalization and enrichment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundRecord {
    pub date: NaiveDate,
    pub sku: String,
    pub item_name: String,
    pub qty_ordered: Decimal,
    pub qty_received: Decimal,
    pub unit_cost: Decimal,
    pub amount: Decimal,
    pub discount: Decimal,
    pub tax_total: Decimal,
    pub grand_total: Decimal,
    pub supplier_name: String,
    pub po_number: Option<String>,
    pub bill_number: Option<String>,
    pub notes: Option<String>,
    pub attributes: SkuAttributes,
}

impl InboundRecord {
    /// Shortfall between ordered and received quantities, floored at zero.
    pub fn qty_outstanding(&self) -> Decimal {
        let diff = self.qty_ordered - self.qty_received;
        if diff > Decimal::ZERO {
            diff
        } else {
            Decimal::ZERO
        }
    }
}
