//! Recommendation and alert handlers

use axum::{
    extract::{Query, State},
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::AppResult;
use crate::services::filter::{filter_inbound, filter_sales, filter_stock};
use crate::services::metrics;
use crate::services::recommend::{
    self, Alert, MinStockWatch, RecommendParams, StockRecommendation, ThresholdRule,
};
use crate::AppState;

use super::FilterQuery;

fn params_from_config(config: &crate::Config) -> RecommendParams {
    RecommendParams {
        low_stock_threshold: Decimal::from(config.analytics.low_stock_threshold),
        overstock_threshold: Decimal::from(config.analytics.overstock_threshold),
        velocity_threshold: Decimal::from(config.analytics.velocity_threshold),
        overstock_multiplier: Decimal::from(config.analytics.overstock_multiplier),
        velocity_window_days: config.analytics.velocity_window_days,
    }
}

/// Restock and overstock recommendations
pub async fn get_stock_recommendations(
    State(state): State<AppState>,
    Query(filter): Query<FilterQuery>,
) -> AppResult<Json<Vec<StockRecommendation>>> {
    let store = state.store.read().await;
    store.require_sales()?;
    let spec = filter.to_spec();
    let sales = filter_sales(&store.sales, &spec);
    let stock = filter_stock(&store.stock, &spec);
    let params = params_from_config(&state.config);
    Ok(Json(recommend::stock_recommendations(
        &sales, &stock, &params,
    )))
}

#[derive(Deserialize)]
pub struct WatchQuery {
    pub limit: Option<usize>,
}

/// Best sellers running below the minimum stock floor
pub async fn get_min_stock_watch(
    State(state): State<AppState>,
    Query(query): Query<WatchQuery>,
    Query(filter): Query<FilterQuery>,
) -> AppResult<Json<Vec<MinStockWatch>>> {
    let store = state.store.read().await;
    store.require_sales()?;
    let spec = filter.to_spec();
    let sales = filter_sales(&store.sales, &spec);
    let stock = filter_stock(&store.stock, &spec);
    let limit = query.limit.unwrap_or(20);
    let floor = Decimal::from(state.config.analytics.low_stock_threshold);
    Ok(Json(recommend::min_stock_watch(
        &sales, &stock, limit, floor,
    )))
}

#[derive(Deserialize)]
pub struct ThresholdRequest {
    pub rules: Vec<ThresholdRule>,
    #[serde(default)]
    pub filter: crate::models::FilterSpec,
}

/// Evaluate KPI threshold rules against the filtered slice
pub async fn check_thresholds(
    State(state): State<AppState>,
    Json(request): Json<ThresholdRequest>,
) -> AppResult<Json<Vec<Alert>>> {
    let store = state.store.read().await;
    store.require_sales()?;
    let sales = filter_sales(&store.sales, &request.filter);
    let inbound = filter_inbound(&store.inbound, &request.filter);
    let stock = filter_stock(&store.stock, &request.filter);
    let kpis = metrics::kpi_summary(&sales, &inbound, &stock);
    Ok(Json(recommend::evaluate_thresholds(&kpis, &request.rules)))
}
