//! What-if scenario simulation
//!
//! Applies multiplicative price and quantity deltas to the in-scope slice
//! of the filtered sales and recomputes the derived fields. Out-of-scope
//! rows pass through untouched; zero deltas reproduce the original KPIs
//! exactly.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::SalesRecord;

/// Which rows a scenario touches
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ScenarioScope {
    All,
    Category(String),
    Product(String),
}

impl ScenarioScope {
    fn includes(&self, record: &SalesRecord) -> bool {
        match self {
            ScenarioScope::All => true,
            ScenarioScope::Category(category) => &record.attributes.category == category,
            ScenarioScope::Product(product) => &record.product_name == product,
        }
    }
}

/// KPI triple the simulation reports on
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioKpis {
    pub net_sales: Decimal,
    pub gross_profit: Decimal,
    pub quantity: Decimal,
    pub margin_pct: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioOutcome {
    pub original: ScenarioKpis,
    pub simulated: ScenarioKpis,
    pub delta: ScenarioKpis,
}

fn kpis(sales: &[SalesRecord]) -> ScenarioKpis {
    let net_sales: Decimal = sales.iter().map(|r| r.net_sales).sum();
    let gross_profit: Decimal = sales.iter().map(|r| r.gross_profit).sum();
    let quantity: Decimal = sales.iter().map(|r| r.quantity).sum();
    let margin_pct = if net_sales.is_zero() {
        Decimal::ZERO
    } else {
        gross_profit / net_sales * Decimal::from(100)
    };
    ScenarioKpis {
        net_sales,
        gross_profit,
        quantity,
        margin_pct,
    }
}

/// Run a price/quantity scenario. Revenue scales with both factors, cost
/// of goods scales with quantity only (the per-unit cost is held fixed),
/// and gross profit is recomputed from the scaled parts.
pub fn simulate(
    sales: &[SalesRecord],
    price_delta_pct: Decimal,
    qty_delta_pct: Decimal,
    scope: &ScenarioScope,
) -> ScenarioOutcome {
    let hundred = Decimal::from(100);
    let price_factor = Decimal::ONE + price_delta_pct / hundred;
    let qty_factor = Decimal::ONE + qty_delta_pct / hundred;

    let simulated: Vec<SalesRecord> = sales
        .iter()
        .map(|record| {
            if !scope.includes(record) {
                return record.clone();
            }
            let mut row = record.clone();
            row.unit_price = record.unit_price * price_factor;
            row.quantity = record.quantity * qty_factor;
            row.subtotal = record.subtotal * price_factor * qty_factor;
            row.net_sales = record.net_sales * price_factor * qty_factor;
            row.cost_of_goods = record.cost_of_goods * qty_factor;
            row.recompute_gross_profit();
            row
        })
        .collect();

    let original = kpis(sales);
    let after = kpis(&simulated);
    let delta = ScenarioKpis {
        net_sales: after.net_sales - original.net_sales,
        gross_profit: after.gross_profit - original.gross_profit,
        quantity: after.quantity - original.quantity,
        margin_pct: after.margin_pct - original.margin_pct,
    };

    ScenarioOutcome {
        original,
        simulated: after,
        delta,
    }
}
