//! Ziel Analytics - Backend Library
//!
//! A business intelligence pipeline for a fashion retailer: delimited-text
//! ingestion with header synonyms, SKU attribute enrichment through a code
//! dictionary, filtered KPI aggregation, RFM segmentation, forecasting,
//! scenario simulation, and stock recommendations.

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

pub use config::Config;

use services::store::DatasetStore;

/// The in-memory dataset store shared across handlers
pub type SharedStore = Arc<tokio::sync::RwLock<DatasetStore>>;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub config: Arc<Config>,
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Ziel Analytics API v1.0"
}
