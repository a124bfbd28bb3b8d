//! Health check handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub sales_rows: usize,
    pub inbound_rows: usize,
    pub stock_rows: usize,
    pub dictionary_entries: usize,
}

/// Health check endpoint handler
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let store = state.store.read().await;

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        sales_rows: store.sales.len(),
        inbound_rows: store.inbound.len(),
        stock_rows: store.stock.len(),
        dictionary_entries: store.dictionary.len(),
    })
}
