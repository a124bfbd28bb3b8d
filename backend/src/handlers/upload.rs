//! Dataset upload handlers
//!
//! Accepts multipart uploads of the four delimited-text datasets. Each part
//! is named after its dataset (`master_codes`, `sales`, `inbound`, `stock`).
//! Uploads replace the stored dataset wholesale, and every upload re-runs
//! SKU enrichment across all datasets so a fresh code dictionary reaches
//! previously loaded rows.

use axum::{extract::Multipart, extract::State, Json};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::{require_admin, CurrentUser};
use crate::services::{enrich, ingest};
use crate::services::ingest::{DatasetKind, LoadReport};
use crate::AppState;

#[derive(Serialize)]
pub struct UploadResponse {
    pub reports: Vec<LoadReport>,
    pub unknown_attribute_rows: u64,
}

fn dataset_for_field(name: &str) -> Option<DatasetKind> {
    match name {
        "master_codes" | "master" | "codes" => Some(DatasetKind::MasterCodes),
        "sales" => Some(DatasetKind::Sales),
        "inbound" => Some(DatasetKind::Inbound),
        "stock" => Some(DatasetKind::Stock),
        _ => None,
    }
}

/// Upload one or more datasets in a single multipart request
pub async fn upload_datasets(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    mut multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    require_admin(&user)?;

    let mut parts: Vec<(DatasetKind, Vec<u8>)> = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Upload(format!("Malformed multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let Some(kind) = dataset_for_field(&name) else {
            return Err(AppError::Upload(format!(
                "Unknown dataset field '{}'",
                name
            )));
        };
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Upload(format!("Failed to read upload: {}", e)))?;
        parts.push((kind, bytes.to_vec()));
    }

    if parts.is_empty() {
        return Err(AppError::Upload("No dataset files in request".to_string()));
    }

    // The code dictionary must land before the transactional datasets so
    // their rows are enriched against the fresh codes.
    parts.sort_by_key(|(kind, _)| match kind {
        DatasetKind::MasterCodes => 0,
        _ => 1,
    });

    let mut store = state.store.write().await;
    let mut reports = Vec::with_capacity(parts.len());

    for (kind, bytes) in parts {
        let table = ingest::read_csv(&bytes)?;
        match kind {
            DatasetKind::MasterCodes => {
                let (dictionary, report) = ingest::load_master(&table)?;
                store.replace_dictionary(dictionary, report.clone());
                reports.push(report);
            }
            DatasetKind::Sales => {
                let (records, report) = ingest::load_sales(&table)?;
                store.replace_sales(records, report.clone());
                reports.push(report);
            }
            DatasetKind::Inbound => {
                let (records, report) = ingest::load_inbound(&table)?;
                store.replace_inbound(records, report.clone());
                reports.push(report);
            }
            DatasetKind::Stock => {
                let (records, report) = ingest::load_stock(&table)?;
                store.replace_stock(records, report.clone());
                reports.push(report);
            }
        }
        tracing::info!("Dataset uploaded by {}: {}", user.user_id, kind.as_str());
    }

    let unknown_attribute_rows = enrich::enrich_store(&mut store);
    store.save(std::path::Path::new(&state.config.storage.data_dir))?;

    Ok(Json(UploadResponse {
        reports,
        unknown_attribute_rows,
    }))
}

/// List the load reports of the datasets currently in the store
pub async fn list_dataset_reports(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<LoadReport>>> {
    let store = state.store.read().await;
    let mut reports: Vec<LoadReport> = store.reports.values().cloned().collect();
    reports.sort_by_key(|r| r.dataset.as_str());
    Ok(Json(reports))
}
