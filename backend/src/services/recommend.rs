//! Recommendation and alert engine
//!
//! Cross-references current stock positions with recent sales velocity to
//! surface restock and overstock candidates, watches minimum stock on the
//! best sellers, and evaluates user-defined KPI threshold rules. All scans
//! return empty vectors on empty input.

use std::collections::HashMap;

use chrono::Duration;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{SalesRecord, StockRecord};
use crate::services::metrics::KpiSummary;

/// Tunables for the stock scans, defaulted from configuration
#[derive(Debug, Clone)]
pub struct RecommendParams {
    pub low_stock_threshold: Decimal,
    /// Floor below which an item is never considered overstocked
    pub overstock_threshold: Decimal,
    /// Units per day above which demand counts as high
    pub velocity_threshold: Decimal,
    /// Days of velocity cover beyond which stock counts as excess
    pub overstock_multiplier: Decimal,
    pub velocity_window_days: i64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    Restock,
    Overstock,
}

/// One flagged stock position, aggregated across locations
#[derive(Debug, Clone, Serialize)]
pub struct StockRecommendation {
    pub sku: String,
    pub item_name: String,
    pub kind: RecommendationKind,
    pub qty_available: Decimal,
    /// Units sold inside the trailing velocity window
    pub qty_sold: Decimal,
    /// Units per day over the velocity window
    pub daily_velocity: Decimal,
}

fn sold_by_sku(sales: &[SalesRecord]) -> HashMap<String, Decimal> {
    let mut totals: HashMap<String, Decimal> = HashMap::new();
    for record in sales {
        *totals.entry(record.sku.clone()).or_default() += record.quantity;
    }
    totals
}

/// Quantities sold per SKU inside the trailing window, anchored at the
/// latest sale in the slice.
fn windowed_sold_by_sku(sales: &[SalesRecord], window_days: i64) -> HashMap<String, Decimal> {
    let mut totals: HashMap<String, Decimal> = HashMap::new();
    let Some(latest) = sales.iter().map(|r| r.timestamp.date()).max() else {
        return totals;
    };
    let window_start = latest - Duration::days(window_days - 1);
    for record in sales {
        if record.timestamp.date() >= window_start {
            *totals.entry(record.sku.clone()).or_default() += record.quantity;
        }
    }
    totals
}

/// Total availability per SKU across locations, keeping the first item
/// name seen for display.
fn available_by_sku(stock: &[StockRecord]) -> HashMap<String, (String, Decimal)> {
    let mut totals: HashMap<String, (String, Decimal)> = HashMap::new();
    for position in stock {
        totals
            .entry(position.sku.clone())
            .and_modify(|(_, available)| *available += position.qty_available)
            .or_insert_with(|| (position.item_name.clone(), position.qty_available));
    }
    totals
}

/// Restock: total availability below the low-stock floor while recent
/// velocity exceeds the high-demand threshold. Overstock: availability
/// above the floor and beyond `overstock_multiplier` days of cover at the
/// recent velocity.
pub fn stock_recommendations(
    sales: &[SalesRecord],
    stock: &[StockRecord],
    params: &RecommendParams,
) -> Vec<StockRecommendation> {
    let window_days = params.velocity_window_days.max(1);
    let sold = windowed_sold_by_sku(sales, window_days);
    let window = Decimal::from(window_days);

    let mut recommendations: Vec<StockRecommendation> = available_by_sku(stock)
        .into_iter()
        .filter_map(|(sku, (item_name, qty_available))| {
            let qty_sold = sold.get(&sku).copied().unwrap_or_default();
            let daily_velocity = qty_sold / window;
            let kind = if qty_available < params.low_stock_threshold
                && daily_velocity > params.velocity_threshold
            {
                RecommendationKind::Restock
            } else if qty_available > params.overstock_threshold
                && qty_available > params.overstock_multiplier * daily_velocity
            {
                RecommendationKind::Overstock
            } else {
                return None;
            };
            Some(StockRecommendation {
                sku,
                item_name,
                kind,
                qty_available,
                qty_sold,
                daily_velocity,
            })
        })
        .collect();

    recommendations.sort_by(|a, b| {
        b.qty_sold
            .cmp(&a.qty_sold)
            .then_with(|| a.sku.cmp(&b.sku))
    });
    recommendations
}

/// One best seller running low
#[derive(Debug, Clone, Serialize)]
pub struct MinStockWatch {
    pub sku: String,
    pub item_name: String,
    pub total_sold: Decimal,
    pub qty_available: Decimal,
}

/// Watch the top `limit` best-selling SKUs and flag the ones whose total
/// available stock across locations sits below the low-stock floor.
pub fn min_stock_watch(
    sales: &[SalesRecord],
    stock: &[StockRecord],
    limit: usize,
    low_stock_threshold: Decimal,
) -> Vec<MinStockWatch> {
    let sold = sold_by_sku(sales);
    let mut ranked: Vec<(String, Decimal)> = sold.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(limit);

    let positions = available_by_sku(stock);

    ranked
        .into_iter()
        .filter_map(|(sku, total_sold)| {
            let (item_name, qty_available) = positions.get(&sku)?;
            if *qty_available < low_stock_threshold {
                Some(MinStockWatch {
                    sku,
                    item_name: item_name.clone(),
                    total_sold,
                    qty_available: *qty_available,
                })
            } else {
                None
            }
        })
        .collect()
}

// ============================================================================
// Threshold Alerts
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    NetSales,
    GrossProfit,
    MarginPct,
}

impl MetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::NetSales => "net_sales",
            MetricKind::GrossProfit => "gross_profit",
            MetricKind::MarginPct => "margin_pct",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Comparator {
    Below,
    Above,
}

/// User-supplied alert rule on a headline KPI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdRule {
    pub metric: MetricKind,
    pub comparator: Comparator,
    pub target: Decimal,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Serialize)]
pub struct Alert {
    pub metric: MetricKind,
    pub comparator: Comparator,
    pub observed: Decimal,
    pub target: Decimal,
    pub severity: AlertSeverity,
    pub message: String,
}

fn observed_value(kpis: &KpiSummary, metric: MetricKind) -> Decimal {
    match metric {
        MetricKind::NetSales => kpis.total_net_sales,
        MetricKind::GrossProfit => kpis.total_gross_profit,
        MetricKind::MarginPct => kpis.gross_margin_pct,
    }
}

fn severity_for(observed: Decimal, target: Decimal) -> AlertSeverity {
    if target.is_zero() {
        return AlertSeverity::Warning;
    }
    let breach = ((observed - target) / target).abs();
    if breach >= Decimal::new(25, 2) {
        AlertSeverity::Critical
    } else if breach >= Decimal::new(10, 2) {
        AlertSeverity::Warning
    } else {
        AlertSeverity::Info
    }
}

/// Evaluate threshold rules against the current KPI summary. Severity grows
/// with the relative size of the breach.
pub fn evaluate_thresholds(kpis: &KpiSummary, rules: &[ThresholdRule]) -> Vec<Alert> {
    rules
        .iter()
        .filter_map(|rule| {
            let observed = observed_value(kpis, rule.metric);
            let breached = match rule.comparator {
                Comparator::Below => observed < rule.target,
                Comparator::Above => observed > rule.target,
            };
            if !breached {
                return None;
            }
            let direction = match rule.comparator {
                Comparator::Below => "below",
                Comparator::Above => "above",
            };
            Some(Alert {
                metric: rule.metric,
                comparator: rule.comparator,
                observed,
                target: rule.target,
                severity: severity_for(observed, rule.target),
                message: format!(
                    "{} is {} target: observed {}, target {}",
                    rule.metric.as_str(),
                    direction,
                    observed,
                    rule.target
                ),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SkuAttributes;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn params() -> RecommendParams {
        RecommendParams {
            low_stock_threshold: dec("5"),
            overstock_threshold: dec("100"),
            velocity_threshold: dec("1"),
            overstock_multiplier: dec("30"),
            velocity_window_days: 30,
        }
    }

    fn sale_on(date: NaiveDate, sku: &str, qty: &str) -> SalesRecord {
        SalesRecord {
            timestamp: date.and_hms_opt(9, 0, 0).unwrap(),
            transaction_id: format!("TRX-{sku}"),
            sku: sku.to_string(),
            product_name: sku.to_string(),
            quantity: dec(qty),
            unit_price: Decimal::TEN,
            subtotal: Decimal::TEN,
            net_sales: Decimal::TEN,
            cost_of_goods: Decimal::ONE,
            gross_profit: Decimal::from(9),
            channel: None,
            customer_id: None,
            location: None,
            attributes: SkuAttributes::default(),
        }
    }

    fn sale(sku: &str, qty: &str) -> SalesRecord {
        sale_on(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(), sku, qty)
    }

    fn position(sku: &str, available: &str) -> StockRecord {
        StockRecord {
            sku: sku.to_string(),
            item_name: sku.to_string(),
            location: None,
            qty_total: dec(available),
            qty_reserved: Decimal::ZERO,
            qty_available: dec(available),
            sell_price: Decimal::TEN,
            unit_cost: Decimal::ONE,
            inventory_value: dec(available),
            is_bundle: false,
            attributes: SkuAttributes::default(),
        }
    }

    #[test]
    fn test_fast_seller_low_stock_flags_restock() {
        // S1 moves well above one unit a day and is nearly out
        let sales = vec![sale("S1", "50"), sale("S2", "2")];
        let stock = vec![position("S1", "2"), position("S2", "50")];
        let recs = stock_recommendations(&sales, &stock, &params());
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].sku, "S1");
        assert_eq!(recs[0].kind, RecommendationKind::Restock);
    }

    #[test]
    fn test_slow_seller_high_stock_flags_overstock() {
        // S2 holds 500 units against a fraction of a unit a day
        let sales = vec![sale("S1", "50"), sale("S2", "2")];
        let stock = vec![position("S2", "500")];
        let recs = stock_recommendations(&sales, &stock, &params());
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].kind, RecommendationKind::Overstock);
    }

    #[test]
    fn test_stale_sales_outside_window_do_not_count() {
        // S1 sold heavily months before the trailing window anchored at
        // the latest sale, nothing inside it
        let old = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let recent = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let sales = vec![sale_on(old, "S1", "50"), sale_on(recent, "S2", "1")];
        let stock = vec![position("S1", "2")];
        let recs = stock_recommendations(&sales, &stock, &params());
        assert!(recs.is_empty());
    }

    #[test]
    fn test_velocity_reflects_window_only() {
        let old = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let recent = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let sales = vec![sale_on(old, "S1", "900"), sale_on(recent, "S1", "60")];
        let stock = vec![position("S1", "2")];
        let recs = stock_recommendations(&sales, &stock, &params());
        assert_eq!(recs.len(), 1);
        // 60 units over the 30-day window, not 960
        assert_eq!(recs[0].qty_sold, dec("60"));
        assert_eq!(recs[0].daily_velocity, dec("2"));
    }

    #[test]
    fn test_locations_aggregate_before_classification() {
        let sales = vec![sale("S1", "50")];
        // 3 + 3 across two locations clears the floor of 5
        let stock = vec![position("S1", "3"), position("S1", "3")];
        assert!(stock_recommendations(&sales, &stock, &params()).is_empty());

        // 2 + 2 stays below the floor and flags exactly once
        let stock = vec![position("S1", "2"), position("S1", "2")];
        let recs = stock_recommendations(&sales, &stock, &params());
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].qty_available, dec("4"));
    }

    #[test]
    fn test_empty_inputs_no_recommendations() {
        assert!(stock_recommendations(&[], &[], &params()).is_empty());
        assert!(min_stock_watch(&[], &[], 20, dec("5")).is_empty());
    }

    #[test]
    fn test_min_stock_watch_only_top_sellers() {
        let sales = vec![sale("S1", "50"), sale("S2", "40"), sale("S3", "1")];
        let stock = vec![
            position("S1", "1"),
            position("S2", "50"),
            position("S3", "1"),
        ];
        // Watch only the top two sellers: S3 is low but not watched
        let watch = min_stock_watch(&sales, &stock, 2, dec("5"));
        assert_eq!(watch.len(), 1);
        assert_eq!(watch[0].sku, "S1");
    }

    #[test]
    fn test_min_stock_watch_sums_locations() {
        let sales = vec![sale("S1", "50")];
        let stock = vec![position("S1", "3"), position("S1", "3")];
        assert!(min_stock_watch(&sales, &stock, 20, dec("5")).is_empty());
    }

    #[test]
    fn test_threshold_rule_below() {
        let kpis = KpiSummary {
            total_net_sales: dec("70"),
            total_gross_profit: dec("40"),
            total_quantity_sold: dec("10"),
            total_qty_received: Decimal::ZERO,
            total_stock_available: Decimal::ZERO,
            total_inventory_value: Decimal::ZERO,
            distinct_transactions: 3,
            gross_margin_pct: dec("57"),
            stock_turnover: Decimal::ZERO,
        };
        let rules = vec![
            ThresholdRule {
                metric: MetricKind::NetSales,
                comparator: Comparator::Below,
                target: dec("100"),
            },
            ThresholdRule {
                metric: MetricKind::GrossProfit,
                comparator: Comparator::Below,
                target: dec("10"),
            },
        ];
        let alerts = evaluate_thresholds(&kpis, &rules);
        // Net sales 70 < 100 fires with a 30% breach; profit 40 > 10 does not
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].metric, MetricKind::NetSales);
        assert_eq!(alerts[0].severity, AlertSeverity::Critical);
    }

    #[test]
    fn test_no_rules_no_alerts() {
        let kpis = super::super::metrics::kpi_summary(&[], &[], &[]);
        assert!(evaluate_thresholds(&kpis, &[]).is_empty());
    }
}
