//! In-memory dataset store with JSON snapshot persistence
//!
//! Datasets are replaced wholesale on upload and survive restarts through a
//! single snapshot file under the configured data directory. Last write
//! wins; there is no merge.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::models::{CodeDictionary, InboundRecord, SalesRecord, StockRecord};
use crate::services::ingest::{DatasetKind, LoadReport};

const SNAPSHOT_FILE: &str = "datasets.json";

/// All loaded datasets plus the diagnostics from their last load
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasetStore {
    pub dictionary: CodeDictionary,
    pub sales: Vec<SalesRecord>,
    pub inbound: Vec<InboundRecord>,
    pub stock: Vec<StockRecord>,
    pub reports: HashMap<DatasetKind, LoadReport>,
}

impl DatasetStore {
    pub fn replace_dictionary(&mut self, dictionary: CodeDictionary, report: LoadReport) {
        self.dictionary = dictionary;
        self.reports.insert(DatasetKind::MasterCodes, report);
    }

    pub fn replace_sales(&mut self, records: Vec<SalesRecord>, report: LoadReport) {
        self.sales = records;
        self.reports.insert(DatasetKind::Sales, report);
    }

    pub fn replace_inbound(&mut self, records: Vec<InboundRecord>, report: LoadReport) {
        self.inbound = records;
        self.reports.insert(DatasetKind::Inbound, report);
    }

    pub fn replace_stock(&mut self, records: Vec<StockRecord>, report: LoadReport) {
        self.stock = records;
        self.reports.insert(DatasetKind::Stock, report);
    }

    pub fn require_sales(&self) -> AppResult<&[SalesRecord]> {
        if self.sales.is_empty() && !self.reports.contains_key(&DatasetKind::Sales) {
            return Err(AppError::DatasetNotLoaded("sales".to_string()));
        }
        Ok(&self.sales)
    }

    fn snapshot_path(data_dir: &Path) -> PathBuf {
        data_dir.join(SNAPSHOT_FILE)
    }

    /// Persist the whole store as one JSON snapshot.
    pub fn save(&self, data_dir: &Path) -> AppResult<()> {
        std::fs::create_dir_all(data_dir)
            .map_err(|e| AppError::StorageError(format!("cannot create data dir: {}", e)))?;
        let json = serde_json::to_vec(self)
            .map_err(|e| AppError::StorageError(format!("snapshot serialization: {}", e)))?;
        let path = Self::snapshot_path(data_dir);
        std::fs::write(&path, json)
            .map_err(|e| AppError::StorageError(format!("cannot write snapshot: {}", e)))?;
        tracing::info!(path = %path.display(), "dataset snapshot saved");
        Ok(())
    }

    /// Load the snapshot from disk, or start empty when none exists.
    pub fn load(data_dir: &Path) -> AppResult<Self> {
        let path = Self::snapshot_path(data_dir);
        if !path.exists() {
            tracing::info!(path = %path.display(), "no dataset snapshot found, starting empty");
            return Ok(Self::default());
        }
        let bytes = std::fs::read(&path)
            .map_err(|e| AppError::StorageError(format!("cannot read snapshot: {}", e)))?;
        let store: Self = serde_json::from_slice(&bytes)
            .map_err(|e| AppError::StorageError(format!("snapshot deserialization: {}", e)))?;
        tracing::info!(
            path = %path.display(),
            sales = store.sales.len(),
            inbound = store.inbound.len(),
            stock = store.stock.len(),
            codes = store.dictionary.len(),
            "dataset snapshot loaded"
        );
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ingest::{load_sales, read_csv};

    fn sample_store() -> DatasetStore {
        let csv = "Tanggal,SKU,QTY,Harga,Nett Sales,HPP\n\
                   01/03/2024 10:00,SKU1,1,10,10,5\n";
        let table = read_csv(csv.as_bytes()).unwrap();
        let (records, report) = load_sales(&table).unwrap();
        let mut store = DatasetStore::default();
        store.replace_sales(records, report);
        store
    }

    #[test]
    fn test_save_and_reload_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = sample_store();
        store.save(dir.path()).unwrap();

        let reloaded = DatasetStore::load(dir.path()).unwrap();
        assert_eq!(reloaded.sales.len(), 1);
        assert!(reloaded.reports.contains_key(&DatasetKind::Sales));
    }

    #[test]
    fn test_load_missing_snapshot_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = DatasetStore::load(dir.path()).unwrap();
        assert!(store.sales.is_empty());
        assert!(store.dictionary.is_empty());
    }

    #[test]
    fn test_replace_is_wholesale() {
        let mut store = sample_store();
        assert_eq!(store.sales.len(), 1);
        store.replace_sales(Vec::new(), LoadReport::new(DatasetKind::Sales));
        assert!(store.sales.is_empty());
    }

    #[test]
    fn test_require_sales_before_upload() {
        let store = DatasetStore::default();
        assert!(store.require_sales().is_err());
    }
}
