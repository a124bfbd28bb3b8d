//! Dataset enrichment
//!
//! Joins every record to the code dictionary through its SKU and enforces
//! the derived-field invariants. Enrichment is tolerant: an SKU that does
//! not decompose keeps all attributes "Unknown" and the row is retained.

use crate::models::{resolve_sku, CodeDictionary, SkuAttributes, UNKNOWN};
use crate::services::store::DatasetStore;

fn count_unknown(attributes: &SkuAttributes) -> bool {
    attributes.category == UNKNOWN
        || attributes.sub_category == UNKNOWN
        || attributes.season == UNKNOWN
        || attributes.color == UNKNOWN
        || attributes.size == UNKNOWN
}

/// Re-resolve every dataset in the store against the current dictionary.
/// Returns the number of rows with at least one unresolved attribute.
/// Safe to run repeatedly: resolution is idempotent.
pub fn enrich_store(store: &mut DatasetStore) -> u64 {
    let dictionary = store.dictionary.clone();
    let mut unknown_rows = 0;

    unknown_rows += enrich_sales(&mut store.sales, &dictionary);
    unknown_rows += enrich_inbound(&mut store.inbound, &dictionary);
    unknown_rows += enrich_stock(&mut store.stock, &dictionary);

    if unknown_rows > 0 {
        tracing::info!(unknown_rows, "enrichment left rows with unresolved codes");
    }
    unknown_rows
}

pub fn enrich_sales(
    records: &mut [crate::models::SalesRecord],
    dictionary: &CodeDictionary,
) -> u64 {
    let mut unknown = 0;
    for record in records.iter_mut() {
        record.attributes = resolve_sku(&record.sku, dictionary);
        record.recompute_gross_profit();
        if count_unknown(&record.attributes) {
            unknown += 1;
        }
    }
    unknown
}

pub fn enrich_inbound(
    records: &mut [crate::models::InboundRecord],
    dictionary: &CodeDictionary,
) -> u64 {
    let mut unknown = 0;
    for record in records.iter_mut() {
        record.attributes = resolve_sku(&record.sku, dictionary);
        if count_unknown(&record.attributes) {
            unknown += 1;
        }
    }
    unknown
}

pub fn enrich_stock(
    records: &mut [crate::models::StockRecord],
    dictionary: &CodeDictionary,
) -> u64 {
    let mut unknown = 0;
    for record in records.iter_mut() {
        record.attributes = resolve_sku(&record.sku, dictionary);
        if count_unknown(&record.attributes) {
            unknown += 1;
        }
    }
    unknown
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CodeEntry, CodeKind};
    use crate::services::ingest::{load_sales, read_csv};

    fn dictionary() -> CodeDictionary {
        CodeDictionary::from_entries([
            CodeEntry {
                kind: CodeKind::Category,
                code: "TSH".to_string(),
                meaning: "T-Shirt".to_string(),
            },
            CodeEntry {
                kind: CodeKind::SubCategory,
                code: "TSH1".to_string(),
                meaning: "T-Shirt Basic".to_string(),
            },
            CodeEntry {
                kind: CodeKind::Season,
                code: "SSA".to_string(),
                meaning: "Spring/Summer A".to_string(),
            },
            CodeEntry {
                kind: CodeKind::Color,
                code: "BLK".to_string(),
                meaning: "Black".to_string(),
            },
            CodeEntry {
                kind: CodeKind::Size,
                code: "32".to_string(),
                meaning: "M".to_string(),
            },
        ])
    }

    #[test]
    fn test_enrich_sets_attributes_and_profit() {
        let csv = "Tanggal,SKU,QTY,Harga,Nett Sales,HPP,Gross Profit\n\
                   01/03/2024 10:00,TSH124SSA BAS-BLK32,2,50,100,60,0\n";
        let table = read_csv(csv.as_bytes()).unwrap();
        let (mut records, _) = load_sales(&table).unwrap();

        let unknown = enrich_sales(&mut records, &dictionary());
        assert_eq!(unknown, 0);
        assert_eq!(records[0].attributes.category, "T-Shirt");
        assert_eq!(records[0].attributes.color, "Black");
        // Stale profit column was recomputed
        assert_eq!(records[0].gross_profit, rust_decimal::Decimal::from(40));
    }

    #[test]
    fn test_undecomposable_sku_is_retained() {
        let csv = "Tanggal,SKU,QTY,Harga,Nett Sales,HPP\n\
                   01/03/2024 10:00,???,1,10,10,5\n";
        let table = read_csv(csv.as_bytes()).unwrap();
        let (mut records, _) = load_sales(&table).unwrap();

        let unknown = enrich_sales(&mut records, &dictionary());
        assert_eq!(unknown, 1);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].attributes.category, UNKNOWN);
    }

    #[test]
    fn test_enrichment_is_idempotent() {
        let csv = "Tanggal,SKU,QTY,Harga,Nett Sales,HPP\n\
                   01/03/2024 10:00,TSH124SSA BAS-BLK32,2,50,100,60\n";
        let table = read_csv(csv.as_bytes()).unwrap();
        let (mut records, _) = load_sales(&table).unwrap();
        let dict = dictionary();

        enrich_sales(&mut records, &dict);
        let first = records[0].clone();
        enrich_sales(&mut records, &dict);
        assert_eq!(records[0].attributes, first.attributes);
        assert_eq!(records[0].gross_profit, first.gross_profit);
    }
}
