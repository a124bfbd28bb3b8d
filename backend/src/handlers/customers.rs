//! Customer segmentation handlers

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::error::AppResult;
use crate::services::export::export_to_csv;
use crate::services::filter::filter_sales;
use crate::services::rfm;
use crate::AppState;

use super::FilterQuery;

#[derive(Deserialize)]
pub struct RfmQuery {
    pub buckets: Option<u32>,
}

/// RFM segmentation of the filtered sales slice. Supports `format=csv`.
pub async fn get_rfm_segments(
    State(state): State<AppState>,
    Query(query): Query<RfmQuery>,
    Query(filter): Query<FilterQuery>,
) -> AppResult<impl IntoResponse> {
    let store = state.store.read().await;
    store.require_sales()?;
    let sales = filter_sales(&store.sales, &filter.to_spec());
    let buckets = query
        .buckets
        .unwrap_or(state.config.analytics.rfm_buckets);
    let scores = rfm::rfm_segmentation(&sales, buckets);

    if filter.format.as_deref() == Some("csv") {
        let csv = export_to_csv(&scores)?;
        Ok((
            [
                (header::CONTENT_TYPE, "text/csv"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"rfm_segments.csv\"",
                ),
            ],
            csv,
        )
            .into_response())
    } else {
        Ok(Json(scores).into_response())
    }
}
