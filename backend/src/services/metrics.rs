//! Metric and aggregation library
//!
//! Stateless functions over filtered datasets. Every function accepts a
//! slice and returns plain data; empty input yields zeroed KPIs or empty
//! vectors, never an error. Ordering is deterministic throughout: totals
//! descending, then key ascending.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{Datelike, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Dimension, InboundRecord, SalesRecord, StockRecord, UNKNOWN};

// ============================================================================
// KPI Summary
// ============================================================================

/// Headline dashboard numbers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiSummary {
    pub total_net_sales: Decimal,
    pub total_gross_profit: Decimal,
    pub total_quantity_sold: Decimal,
    pub total_qty_received: Decimal,
    pub total_stock_available: Decimal,
    pub total_inventory_value: Decimal,
    pub distinct_transactions: u64,
    /// Gross profit as a percentage of net sales, 0 when there are no sales
    pub gross_margin_pct: Decimal,
    /// Cost of goods sold over average inventory value, 0 when the average
    /// inventory value is 0
    pub stock_turnover: Decimal,
}

pub fn kpi_summary(
    sales: &[SalesRecord],
    inbound: &[InboundRecord],
    stock: &[StockRecord],
) -> KpiSummary {
    let total_net_sales: Decimal = sales.iter().map(|r| r.net_sales).sum();
    let total_gross_profit: Decimal = sales.iter().map(|r| r.gross_profit).sum();
    let total_quantity_sold: Decimal = sales.iter().map(|r| r.quantity).sum();
    let total_cogs: Decimal = sales.iter().map(|r| r.cost_of_goods).sum();
    let total_qty_received: Decimal = inbound.iter().map(|r| r.qty_received).sum();
    let total_stock_available: Decimal = stock.iter().map(|r| r.qty_available).sum();
    let total_inventory_value: Decimal = stock.iter().map(|r| r.inventory_value).sum();

    let distinct_transactions = sales
        .iter()
        .map(|r| r.transaction_id.as_str())
        .collect::<HashSet<_>>()
        .len() as u64;

    let gross_margin_pct = if total_net_sales.is_zero() {
        Decimal::ZERO
    } else {
        total_gross_profit / total_net_sales * Decimal::from(100)
    };

    let avg_inventory_value = if stock.is_empty() {
        Decimal::ZERO
    } else {
        total_inventory_value / Decimal::from(stock.len() as u64)
    };
    let stock_turnover = if avg_inventory_value.is_zero() {
        Decimal::ZERO
    } else {
        total_cogs / avg_inventory_value
    };

    KpiSummary {
        total_net_sales,
        total_gross_profit,
        total_quantity_sold,
        total_qty_received,
        total_stock_available,
        total_inventory_value,
        distinct_transactions,
        gross_margin_pct,
        stock_turnover,
    }
}

// ============================================================================
// Breakdowns
// ============================================================================

/// One row of a grouped aggregate
#[derive(Debug, Clone, Serialize)]
pub struct BreakdownRow {
    pub key: String,
    pub total_net_sales: Decimal,
    pub total_gross_profit: Decimal,
    pub avg_net_sales: Decimal,
    pub avg_gross_profit: Decimal,
    pub total_quantity: Decimal,
    pub row_count: u64,
}

fn dimension_key(record: &SalesRecord, dimension: Dimension) -> String {
    match dimension {
        Dimension::Channel => record
            .channel
            .clone()
            .unwrap_or_else(|| UNKNOWN.to_string()),
        Dimension::Location => record
            .location
            .clone()
            .unwrap_or_else(|| UNKNOWN.to_string()),
        other => record
            .attributes
            .value_for(other)
            .unwrap_or(UNKNOWN)
            .to_string(),
    }
}

/// Sum and mean of net sales and gross profit grouped by one dimension.
/// "Unknown" participates as an ordinary key. Rows come back sorted by
/// total net sales descending, key ascending on ties.
pub fn breakdown(sales: &[SalesRecord], dimension: Dimension) -> Vec<BreakdownRow> {
    let mut groups: BTreeMap<String, (Decimal, Decimal, Decimal, u64)> = BTreeMap::new();
    for record in sales {
        let entry = groups.entry(dimension_key(record, dimension)).or_default();
        entry.0 += record.net_sales;
        entry.1 += record.gross_profit;
        entry.2 += record.quantity;
        entry.3 += 1;
    }

    let mut rows: Vec<BreakdownRow> = groups
        .into_iter()
        .map(|(key, (net, profit, qty, count))| {
            let n = Decimal::from(count);
            BreakdownRow {
                key,
                total_net_sales: net,
                total_gross_profit: profit,
                avg_net_sales: net / n,
                avg_gross_profit: profit / n,
                total_quantity: qty,
                row_count: count,
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.total_net_sales
            .cmp(&a.total_net_sales)
            .then_with(|| a.key.cmp(&b.key))
    });
    rows
}

// ============================================================================
// Top Products
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TopBy {
    Quantity,
    NetSales,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopProduct {
    pub product_name: String,
    pub total_quantity: Decimal,
    pub total_net_sales: Decimal,
}

/// Top-N products by quantity or net sales. Ties break by product name
/// ascending, so the ranking is stable across runs.
pub fn top_products(sales: &[SalesRecord], by: TopBy, limit: usize) -> Vec<TopProduct> {
    let mut groups: BTreeMap<String, (Decimal, Decimal)> = BTreeMap::new();
    for record in sales {
        let entry = groups.entry(record.product_name.clone()).or_default();
        entry.0 += record.quantity;
        entry.1 += record.net_sales;
    }

    let mut products: Vec<TopProduct> = groups
        .into_iter()
        .map(|(product_name, (qty, net))| TopProduct {
            product_name,
            total_quantity: qty,
            total_net_sales: net,
        })
        .collect();

    products.sort_by(|a, b| {
        let metric = match by {
            TopBy::Quantity => b.total_quantity.cmp(&a.total_quantity),
            TopBy::NetSales => b.total_net_sales.cmp(&a.total_net_sales),
        };
        metric.then_with(|| a.product_name.cmp(&b.product_name))
    });
    products.truncate(limit);
    products
}

// ============================================================================
// Time Series
// ============================================================================

/// One calendar month of sales activity
#[derive(Debug, Clone, Serialize)]
pub struct MonthlyPoint {
    /// First day of the month
    pub month: NaiveDate,
    pub net_sales: Decimal,
    pub quantity: Decimal,
    pub gross_profit: Decimal,
}

pub(crate) fn month_floor(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

pub(crate) fn next_month(month: NaiveDate) -> NaiveDate {
    let (year, next) = if month.month() == 12 {
        (month.year() + 1, 1)
    } else {
        (month.year(), month.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, next, 1).unwrap_or(month)
}

/// Monthly net sales, quantity, and gross profit. Months with no activity
/// between the first and last observed month appear with zeros.
pub fn monthly_trend(sales: &[SalesRecord]) -> Vec<MonthlyPoint> {
    let mut groups: BTreeMap<NaiveDate, (Decimal, Decimal, Decimal)> = BTreeMap::new();
    for record in sales {
        let entry = groups.entry(month_floor(record.timestamp.date())).or_default();
        entry.0 += record.net_sales;
        entry.1 += record.quantity;
        entry.2 += record.gross_profit;
    }

    let (Some(&first), Some(&last)) = (
        groups.keys().next(),
        groups.keys().next_back(),
    ) else {
        return Vec::new();
    };

    let mut points = Vec::new();
    let mut month = first;
    while month <= last {
        let (net, qty, profit) = groups.get(&month).copied().unwrap_or_default();
        points.push(MonthlyPoint {
            month,
            net_sales: net,
            quantity: qty,
            gross_profit: profit,
        });
        month = next_month(month);
    }
    points
}

/// Month-over-month movement on the monthly series
#[derive(Debug, Clone, Serialize)]
pub struct PeriodComparison {
    pub month: NaiveDate,
    pub net_sales: Decimal,
    pub previous_net_sales: Option<Decimal>,
    pub delta: Option<Decimal>,
    /// Growth over the previous month, None when the previous month is zero
    pub growth_pct: Option<Decimal>,
}

pub fn month_over_month(trend: &[MonthlyPoint]) -> Vec<PeriodComparison> {
    trend
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let previous = i.checked_sub(1).map(|p| trend[p].net_sales);
            let delta = previous.map(|p| point.net_sales - p);
            let growth_pct = previous.and_then(|p| {
                if p.is_zero() {
                    None
                } else {
                    Some((point.net_sales - p) / p * Decimal::from(100))
                }
            });
            PeriodComparison {
                month: point.month,
                net_sales: point.net_sales,
                previous_net_sales: previous,
                delta,
                growth_pct,
            }
        })
        .collect()
}

// ============================================================================
// Defect Sales
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct DefectSummary {
    pub total_net_sales: Decimal,
    pub total_quantity: Decimal,
    /// Defect share of total net sales, 0 when there are no sales
    pub share_of_net_sales_pct: Decimal,
    pub monthly: Vec<MonthlyPoint>,
}

pub fn defect_summary(sales: &[SalesRecord]) -> DefectSummary {
    let defect_rows: Vec<SalesRecord> = sales
        .iter()
        .filter(|r| r.attributes.is_defect)
        .cloned()
        .collect();

    let total_net_sales: Decimal = defect_rows.iter().map(|r| r.net_sales).sum();
    let total_quantity: Decimal = defect_rows.iter().map(|r| r.quantity).sum();
    let all_net: Decimal = sales.iter().map(|r| r.net_sales).sum();
    let share = if all_net.is_zero() {
        Decimal::ZERO
    } else {
        total_net_sales / all_net * Decimal::from(100)
    };

    DefectSummary {
        total_net_sales,
        total_quantity,
        share_of_net_sales_pct: share,
        monthly: monthly_trend(&defect_rows),
    }
}

// ============================================================================
// Price Trend
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub avg_unit_price: Decimal,
}

/// Daily mean unit price for one product.
pub fn price_trend(sales: &[SalesRecord], product_name: &str) -> Vec<PricePoint> {
    let mut groups: BTreeMap<NaiveDate, (Decimal, u64)> = BTreeMap::new();
    for record in sales.iter().filter(|r| r.product_name == product_name) {
        let entry = groups.entry(record.timestamp.date()).or_default();
        entry.0 += record.unit_price;
        entry.1 += 1;
    }

    groups
        .into_iter()
        .map(|(date, (sum, count))| PricePoint {
            date,
            avg_unit_price: sum / Decimal::from(count),
        })
        .collect()
}

// ============================================================================
// Supplier Performance
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct SupplierPerformance {
    pub supplier_name: String,
    pub total_qty_received: Decimal,
    pub total_amount: Decimal,
    pub distinct_bills: u64,
}

pub fn supplier_performance(inbound: &[InboundRecord]) -> Vec<SupplierPerformance> {
    let mut groups: BTreeMap<String, (Decimal, Decimal, HashSet<String>)> = BTreeMap::new();
    for record in inbound {
        let entry = groups.entry(record.supplier_name.clone()).or_default();
        entry.0 += record.qty_received;
        entry.1 += record.amount;
        if let Some(bill) = &record.bill_number {
            entry.2.insert(bill.clone());
        }
    }

    let mut rows: Vec<SupplierPerformance> = groups
        .into_iter()
        .map(|(supplier_name, (qty, amount, bills))| SupplierPerformance {
            supplier_name,
            total_qty_received: qty,
            total_amount: amount,
            distinct_bills: bills.len() as u64,
        })
        .collect();

    rows.sort_by(|a, b| {
        b.total_qty_received
            .cmp(&a.total_qty_received)
            .then_with(|| a.supplier_name.cmp(&b.supplier_name))
    });
    rows
}

// ============================================================================
// Correlation
// ============================================================================

/// Aggregation level a correlation is computed at. Correlating raw rows
/// mixes transaction sizes, so the caller must pick the unit explicitly.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    PerTransaction,
    PerProduct,
    PerCategory,
    PerSubCategory,
    Daily,
}

fn correlation_key(record: &SalesRecord, granularity: Granularity) -> String {
    match granularity {
        Granularity::PerTransaction => record.transaction_id.clone(),
        Granularity::PerProduct => record.product_name.clone(),
        Granularity::PerCategory => record.attributes.category.clone(),
        Granularity::PerSubCategory => record.attributes.sub_category.clone(),
        Granularity::Daily => record.timestamp.date().to_string(),
    }
}

/// Pearson correlation between net sales and gross profit, aggregated at
/// the requested granularity. None for fewer than two groups or when either
/// side has zero variance.
pub fn sales_profit_correlation(sales: &[SalesRecord], granularity: Granularity) -> Option<f64> {
    let mut groups: HashMap<String, (Decimal, Decimal)> = HashMap::new();
    for record in sales {
        let entry = groups.entry(correlation_key(record, granularity)).or_default();
        entry.0 += record.net_sales;
        entry.1 += record.gross_profit;
    }

    let pairs: Vec<(f64, f64)> = groups
        .values()
        .filter_map(|(net, profit)| Some((net.to_f64()?, profit.to_f64()?)))
        .collect();
    pearson(&pairs)
}

fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
    let n = pairs.len();
    if n < 2 {
        return None;
    }
    let nf = n as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / nf;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / nf;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some(cov / (var_x.sqrt() * var_y.sqrt()))
}
