//! What-if scenario handlers

use axum::{extract::State, Json};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::models::FilterSpec;
use crate::services::filter::filter_sales;
use crate::services::scenario::{self, ScenarioOutcome, ScenarioScope};
use crate::AppState;

#[derive(Deserialize)]
pub struct ScenarioRequest {
    /// Price change in percent, e.g. `10` for +10%
    #[serde(default)]
    pub price_delta_pct: Decimal,
    /// Quantity change in percent
    #[serde(default)]
    pub qty_delta_pct: Decimal,
    #[serde(default = "default_scope")]
    pub scope: ScenarioScope,
    #[serde(default)]
    pub filter: FilterSpec,
}

fn default_scope() -> ScenarioScope {
    ScenarioScope::All
}

/// Simulate a price/quantity scenario over the filtered sales slice
pub async fn run_scenario(
    State(state): State<AppState>,
    Json(request): Json<ScenarioRequest>,
) -> AppResult<Json<ScenarioOutcome>> {
    let min_delta = Decimal::from(-100);
    if request.price_delta_pct < min_delta || request.qty_delta_pct < min_delta {
        return Err(AppError::Validation {
            field: "delta_pct".to_string(),
            message: "Deltas cannot go below -100%".to_string(),
            message_id: "Perubahan tidak boleh di bawah -100%".to_string(),
        });
    }

    let store = state.store.read().await;
    store.require_sales()?;
    let sales = filter_sales(&store.sales, &request.filter);
    let outcome = scenario::simulate(
        &sales,
        request.price_delta_pct,
        request.qty_delta_pct,
        &request.scope,
    );
    Ok(Json(outcome))
}
