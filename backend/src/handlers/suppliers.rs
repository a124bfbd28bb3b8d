//! Supplier performance handlers

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};

use crate::error::AppResult;
use crate::services::export::export_to_csv;
use crate::services::filter::filter_inbound;
use crate::services::metrics;
use crate::AppState;

use super::FilterQuery;

/// Supplier delivery performance over the filtered inbound slice.
/// Supports `format=csv`.
pub async fn get_supplier_performance(
    State(state): State<AppState>,
    Query(filter): Query<FilterQuery>,
) -> AppResult<impl IntoResponse> {
    let store = state.store.read().await;
    let inbound = filter_inbound(&store.inbound, &filter.to_spec());
    let performance = metrics::supplier_performance(&inbound);

    if filter.format.as_deref() == Some("csv") {
        let csv = export_to_csv(&performance)?;
        Ok((
            [
                (header::CONTENT_TYPE, "text/csv"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"supplier_performance.csv\"",
                ),
            ],
            csv,
        )
            .into_response())
    } else {
        Ok(Json(performance).into_response())
    }
}
