//! Dataset export handlers

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
};

use crate::error::{AppError, AppResult};
use crate::services::export::{
    export_to_csv, InboundExportRow, SalesExportRow, StockExportRow,
};
use crate::services::filter::{filter_inbound, filter_sales, filter_stock};
use crate::AppState;

use super::FilterQuery;

/// Download one dataset as CSV, after filtering
pub async fn export_dataset(
    State(state): State<AppState>,
    Path(dataset): Path<String>,
    Query(filter): Query<FilterQuery>,
) -> AppResult<impl IntoResponse> {
    let store = state.store.read().await;
    let spec = filter.to_spec();

    let (csv, filename) = match dataset.as_str() {
        "sales" => {
            let rows: Vec<SalesExportRow> = filter_sales(&store.sales, &spec)
                .iter()
                .map(SalesExportRow::from)
                .collect();
            (export_to_csv(&rows)?, "sales.csv")
        }
        "inbound" => {
            let rows: Vec<InboundExportRow> = filter_inbound(&store.inbound, &spec)
                .iter()
                .map(InboundExportRow::from)
                .collect();
            (export_to_csv(&rows)?, "inbound.csv")
        }
        "stock" => {
            let rows: Vec<StockExportRow> = filter_stock(&store.stock, &spec)
                .iter()
                .map(StockExportRow::from)
                .collect();
            (export_to_csv(&rows)?, "stock.csv")
        }
        other => {
            return Err(AppError::NotFound(format!("Dataset '{}'", other)));
        }
    };

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        csv,
    ))
}
