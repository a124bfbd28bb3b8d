//! Dashboard analytics handlers
//!
//! Every endpoint takes the common filter query, slices the stored sales
//! through the filter engine, and runs the pure aggregation functions over
//! the slice.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::models::Dimension;
use crate::services::filter::{filter_inbound, filter_sales, filter_stock};
use crate::services::metrics::{
    self, BreakdownRow, DefectSummary, Granularity, KpiSummary, MonthlyPoint, PeriodComparison,
    PricePoint, TopBy, TopProduct,
};
use crate::AppState;

use super::FilterQuery;

/// Headline KPI cards
pub async fn get_kpis(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> AppResult<Json<KpiSummary>> {
    let store = state.store.read().await;
    store.require_sales()?;
    let spec = query.to_spec();
    let sales = filter_sales(&store.sales, &spec);
    let inbound = filter_inbound(&store.inbound, &spec);
    let stock = filter_stock(&store.stock, &spec);
    Ok(Json(metrics::kpi_summary(&sales, &inbound, &stock)))
}

/// Sales breakdown along one product dimension
pub async fn get_breakdown(
    State(state): State<AppState>,
    Path(dimension): Path<Dimension>,
    Query(query): Query<FilterQuery>,
) -> AppResult<Json<Vec<BreakdownRow>>> {
    let store = state.store.read().await;
    store.require_sales()?;
    let sales = filter_sales(&store.sales, &query.to_spec());
    Ok(Json(metrics::breakdown(&sales, dimension)))
}

#[derive(Deserialize)]
pub struct TopQuery {
    pub by: Option<TopBy>,
    pub limit: Option<usize>,
}

/// Best-selling products, by quantity or by net sales
pub async fn get_top_products(
    State(state): State<AppState>,
    Query(top): Query<TopQuery>,
    Query(query): Query<FilterQuery>,
) -> AppResult<Json<Vec<TopProduct>>> {
    let store = state.store.read().await;
    store.require_sales()?;
    let sales = filter_sales(&store.sales, &query.to_spec());
    let by = top.by.unwrap_or(TopBy::Quantity);
    let limit = top.limit.unwrap_or(10);
    Ok(Json(metrics::top_products(&sales, by, limit)))
}

/// Monthly sales trend, gap months zero-filled
pub async fn get_monthly_trend(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> AppResult<Json<Vec<MonthlyPoint>>> {
    let store = state.store.read().await;
    store.require_sales()?;
    let sales = filter_sales(&store.sales, &query.to_spec());
    Ok(Json(metrics::monthly_trend(&sales)))
}

/// Month-over-month comparison of the trend
pub async fn get_month_over_month(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> AppResult<Json<Vec<PeriodComparison>>> {
    let store = state.store.read().await;
    store.require_sales()?;
    let sales = filter_sales(&store.sales, &query.to_spec());
    let trend = metrics::monthly_trend(&sales);
    Ok(Json(metrics::month_over_month(&trend)))
}

/// Defect item summary
pub async fn get_defect_summary(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> AppResult<Json<DefectSummary>> {
    let store = state.store.read().await;
    store.require_sales()?;
    let sales = filter_sales(&store.sales, &query.to_spec());
    Ok(Json(metrics::defect_summary(&sales)))
}

#[derive(Deserialize)]
pub struct PriceTrendQuery {
    pub product_name: String,
}

/// Daily average selling price of one product
pub async fn get_price_trend(
    State(state): State<AppState>,
    Query(query): Query<PriceTrendQuery>,
    Query(filter): Query<FilterQuery>,
) -> AppResult<Json<Vec<PricePoint>>> {
    if query.product_name.trim().is_empty() {
        return Err(AppError::Validation {
            field: "product_name".to_string(),
            message: "Product name must not be empty".to_string(),
            message_id: "Nama produk tidak boleh kosong".to_string(),
        });
    }
    let store = state.store.read().await;
    store.require_sales()?;
    let sales = filter_sales(&store.sales, &filter.to_spec());
    Ok(Json(metrics::price_trend(&sales, &query.product_name)))
}

#[derive(Deserialize)]
pub struct CorrelationQuery {
    pub granularity: Option<Granularity>,
}

#[derive(serde::Serialize)]
pub struct CorrelationResponse {
    pub granularity: Granularity,
    /// Pearson r, absent when the slice has no variance or fewer than
    /// two groups
    pub coefficient: Option<f64>,
}

/// Correlation between net sales and gross profit at a chosen granularity
pub async fn get_sales_profit_correlation(
    State(state): State<AppState>,
    Query(query): Query<CorrelationQuery>,
    Query(filter): Query<FilterQuery>,
) -> AppResult<Json<CorrelationResponse>> {
    let store = state.store.read().await;
    store.require_sales()?;
    let sales = filter_sales(&store.sales, &filter.to_spec());
    let granularity = query.granularity.unwrap_or(Granularity::PerTransaction);
    Ok(Json(CorrelationResponse {
        granularity,
        coefficient: metrics::sales_profit_correlation(&sales, granularity),
    }))
}
