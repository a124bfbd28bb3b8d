//! Forecasting handlers
//!
//! Model fitting is CPU-bound, so it runs on the blocking pool rather than
//! on the async runtime threads.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::services::filter::filter_sales;
use crate::services::forecast::{
    self, ForecastModel, ForecastPoint, SeriesKind, SeriesPoint,
};
use crate::AppState;

use super::FilterQuery;

#[derive(Deserialize)]
pub struct ForecastQuery {
    pub model: Option<ForecastModel>,
    pub series: Option<SeriesKind>,
    pub horizon: Option<usize>,
}

#[derive(Serialize)]
pub struct ForecastResponse {
    pub model: ForecastModel,
    pub series: SeriesKind,
    pub history: Vec<SeriesPoint>,
    pub forecast: Vec<ForecastPoint>,
}

const MAX_HORIZON: usize = 24;

/// Forecast a monthly series a few months ahead
pub async fn get_forecast(
    State(state): State<AppState>,
    Query(query): Query<ForecastQuery>,
    Query(filter): Query<FilterQuery>,
) -> AppResult<Json<ForecastResponse>> {
    let model = query.model.unwrap_or(ForecastModel::MovingAverage);
    let series_kind = query.series.unwrap_or(SeriesKind::Quantity);
    let horizon = query.horizon.unwrap_or(3);
    if horizon == 0 || horizon > MAX_HORIZON {
        return Err(AppError::Validation {
            field: "horizon".to_string(),
            message: format!("Horizon must be between 1 and {} months", MAX_HORIZON),
            message_id: format!("Horizon harus antara 1 dan {} bulan", MAX_HORIZON),
        });
    }

    let history = {
        let store = state.store.read().await;
        store.require_sales()?;
        let sales = filter_sales(&store.sales, &filter.to_spec());
        forecast::monthly_series(&sales, series_kind)
    };

    let ma_window = state.config.analytics.moving_average_window;
    let fit_history = history.clone();
    let points = tokio::task::spawn_blocking(move || {
        forecast::forecast(&fit_history, horizon, model, ma_window)
    })
    .await
    .map_err(|e| AppError::Internal(format!("Forecast task failed: {}", e)))??;

    Ok(Json(ForecastResponse {
        model,
        series: series_kind,
        history,
        forecast: points,
    }))
}
