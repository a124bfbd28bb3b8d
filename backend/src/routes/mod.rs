//! Route definitions for the Ziel Analytics dashboard

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Protected routes - dataset upload and diagnostics
        .nest("/datasets", dataset_routes())
        // Protected routes - dashboard analytics
        .nest("/dashboard", dashboard_routes())
        // Protected routes - customer segmentation
        .nest("/customers", customer_routes())
        // Protected routes - supplier performance
        .nest("/suppliers", supplier_routes())
        // Protected routes - forecasting
        .nest("/forecast", forecast_routes())
        // Protected routes - scenario simulation
        .nest("/scenario", scenario_routes())
        // Protected routes - recommendations and alerts
        .nest("/alerts", alert_routes())
        // Protected routes - CSV export
        .nest("/export", export_routes())
}

/// Dataset management routes (protected)
fn dataset_routes() -> Router<AppState> {
    Router::new()
        .route("/upload", post(handlers::upload_datasets))
        .route("/reports", get(handlers::list_dataset_reports))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Dashboard analytics routes (protected)
fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/kpis", get(handlers::get_kpis))
        .route("/breakdown/:dimension", get(handlers::get_breakdown))
        .route("/top-products", get(handlers::get_top_products))
        .route("/trend", get(handlers::get_monthly_trend))
        .route("/trend/comparison", get(handlers::get_month_over_month))
        .route("/defects", get(handlers::get_defect_summary))
        .route("/price-trend", get(handlers::get_price_trend))
        .route("/correlation", get(handlers::get_sales_profit_correlation))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Customer segmentation routes (protected)
fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/rfm", get(handlers::get_rfm_segments))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Supplier performance routes (protected)
fn supplier_routes() -> Router<AppState> {
    Router::new()
        .route("/performance", get(handlers::get_supplier_performance))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Forecasting routes (protected)
fn forecast_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::get_forecast))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Scenario simulation routes (protected)
fn scenario_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::run_scenario))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Recommendation and alert routes (protected)
fn alert_routes() -> Router<AppState> {
    Router::new()
        .route("/recommendations", get(handlers::get_stock_recommendations))
        .route("/min-stock", get(handlers::get_min_stock_watch))
        .route("/thresholds", post(handlers::check_thresholds))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// CSV export routes (protected)
fn export_routes() -> Router<AppState> {
    Router::new()
        .route("/:dataset", get(handlers::export_dataset))
        .route_layer(middleware::from_fn(auth_middleware))
}
