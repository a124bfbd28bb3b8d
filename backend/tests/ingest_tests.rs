//! Dataset ingestion tests
//!
//! Tests for delimited-text loading including:
//! - Header synonym resolution
//! - Flexible financial parsing and zero-fill coercion
//! - Row drops, synthetic ids, and report accounting

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use ziel_backend::error::AppError;
use ziel_backend::services::ingest::{self, DatasetKind};

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn sales_csv(rows: &[&str]) -> Vec<u8> {
    let mut csv = String::from("Tanggal,No Transaksi,SKU,Nama Produk,Qty,Harga,Nett Sales,HPP\n");
    for row in rows {
        csv.push_str(row);
        csv.push('\n');
    }
    csv.into_bytes()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Indonesian headers resolve through the synonym table
    #[test]
    fn test_indonesian_headers_resolve() {
        let table = ingest::read_csv(&sales_csv(&[
            "05/03/2024 14:30,TRX-1,TSH124SSA BAS-BLK32,Basic Tee,2,50000,100000,60000",
        ]))
        .unwrap();
        let (records, report) = ingest::load_sales(&table).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(report.rows_loaded, 1);
        assert_eq!(records[0].transaction_id, "TRX-1");
        assert_eq!(records[0].quantity, dec("2"));
        assert_eq!(records[0].net_sales, dec("100000"));
    }

    /// English headers land on the same canonical columns
    #[test]
    fn test_english_headers_resolve() {
        let csv = b"Date,Transaction Id,SKU,Product Name,Quantity,Price,Net Sales,COGS\n\
            05/03/2024 14:30,TRX-1,SKU-1,Tee,1,10,10,6\n";
        let table = ingest::read_csv(csv).unwrap();
        let (records, _) = ingest::load_sales(&table).unwrap();
        assert_eq!(records.len(), 1);
    }

    /// A missing required column is a schema error naming the column
    #[test]
    fn test_missing_required_column_is_schema_error() {
        let csv = b"Tanggal,SKU,Qty,Harga,HPP\n05/03/2024 14:30,SKU-1,1,10,6\n";
        let table = ingest::read_csv(csv).unwrap();
        let err = ingest::load_sales(&table).unwrap_err();
        match err {
            AppError::Schema { dataset, column } => {
                assert_eq!(dataset, "sales");
                assert_eq!(column, "net_sales");
            }
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    /// Unparseable dates drop the row and are counted
    #[test]
    fn test_bad_date_drops_row() {
        let table = ingest::read_csv(&sales_csv(&[
            "not a date,TRX-1,SKU-1,Tee,1,10,10,6",
            "05/03/2024 14:30,TRX-2,SKU-2,Tee,1,10,10,6",
        ]))
        .unwrap();
        let (records, report) = ingest::load_sales(&table).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(report.rows_total, 2);
        assert_eq!(report.rows_dropped, 1);
        assert_eq!(report.rows_loaded, 1);
    }

    /// Unparseable numerics zero-fill and are counted as coercions
    #[test]
    fn test_bad_numeric_zero_fills() {
        let table = ingest::read_csv(&sales_csv(&[
            "05/03/2024 14:30,TRX-1,SKU-1,Tee,garbage,10,10,6",
        ]))
        .unwrap();
        let (records, report) = ingest::load_sales(&table).unwrap();

        assert_eq!(records[0].quantity, Decimal::ZERO);
        assert!(report.values_coerced >= 1);
    }

    /// Rupiah and Indonesian separators parse into exact decimals
    #[test]
    fn test_rupiah_values_parse() {
        let table = ingest::read_csv(&sales_csv(&[
            "05/03/2024 14:30,TRX-1,SKU-1,Tee,2,\"Rp 30.000\",\"Rp 60.000\",\"Rp 36.000\"",
        ]))
        .unwrap();
        let (records, report) = ingest::load_sales(&table).unwrap();

        assert_eq!(records[0].unit_price, dec("30000"));
        assert_eq!(records[0].net_sales, dec("60000"));
        assert_eq!(report.values_coerced, 0);
    }

    /// Empty transaction ids are synthesized deterministically
    #[test]
    fn test_empty_transaction_id_synthesized() {
        let table = ingest::read_csv(&sales_csv(&[
            "05/03/2024 14:30,,SKU-1,Tee,1,10,10,6",
        ]))
        .unwrap();
        let (records, report) = ingest::load_sales(&table).unwrap();

        assert_eq!(records[0].transaction_id, "ROW-1");
        assert_eq!(report.synthesized_ids, 1);
    }

    /// Master code sheet with Indonesian column names and mixed kinds
    #[test]
    fn test_master_codes_load() {
        let csv = b"Jenis,Kode,Keterangan\n\
            KATEGORI,TSH,T-Shirt\n\
            WARNA,BLK,Black\n\
            MUSIM,SS,Spring/Summer\n\
            NOT A KIND,XX,ignored\n";
        let table = ingest::read_csv(csv).unwrap();
        let (dictionary, report) = ingest::load_master(&table).unwrap();

        assert_eq!(report.rows_loaded, 3);
        assert_eq!(report.rows_dropped, 1);
        assert!(dictionary.len() >= 3);
    }

    /// Stock rows violating the quantity identity are kept but counted
    #[test]
    fn test_stock_invariant_mismatch_counted() {
        let csv = b"SKU,Nama Barang,Qty,Dipesan,Tersedia,HPP,Nilai Persediaan\n\
            SKU-1,Tee,10,2,8,5000,50000\n\
            SKU-2,Tee,10,2,99,5000,50000\n";
        let table = ingest::read_csv(csv).unwrap();
        let (records, report) = ingest::load_stock(&table).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(report.invariant_mismatches, 1);
    }

    /// Inbound rows load with supplier and quantities intact
    #[test]
    fn test_inbound_load() {
        let csv = b"Tanggal,SKU,Nama Barang,Qty Dipesan Unit,Qty Diterima,Harga,Amount,Nama Supplier\n\
            05/03/2024,SKU-1,Tee,100,90,5000,450000,PT Garmen Jaya\n";
        let table = ingest::read_csv(csv).unwrap();
        let (records, report) = ingest::load_inbound(&table).unwrap();

        assert_eq!(report.rows_loaded, 1);
        assert_eq!(records[0].supplier_name, "PT Garmen Jaya");
        assert_eq!(records[0].qty_outstanding(), dec("10"));
    }

    /// Dataset kind serializes as snake_case
    #[test]
    fn test_dataset_kind_labels() {
        assert_eq!(DatasetKind::MasterCodes.as_str(), "master_codes");
        assert_eq!(DatasetKind::Sales.as_str(), "sales");
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;
    use shared::validation::parse_flexible_decimal;

    /// Strategy for plain positive amounts
    fn amount_strategy() -> impl Strategy<Value = i64> {
        1i64..=100_000_000i64
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Plain integers always parse to themselves
        #[test]
        fn prop_plain_integer_parses(n in amount_strategy()) {
            let parsed = parse_flexible_decimal(&n.to_string());
            prop_assert_eq!(parsed, Some(Decimal::from(n)));
        }

        /// An Rp prefix never changes the parsed value
        #[test]
        fn prop_rp_prefix_is_ignored(n in amount_strategy()) {
            let bare = parse_flexible_decimal(&n.to_string());
            let prefixed = parse_flexible_decimal(&format!("Rp {}", n));
            prop_assert_eq!(bare, prefixed);
        }

        /// Loaded plus dropped rows always account for every input row
        #[test]
        fn prop_report_accounts_for_every_row(valid in 0usize..20, invalid in 0usize..20) {
            let mut rows = Vec::new();
            for i in 0..valid {
                rows.push(format!("05/03/2024 14:30,TRX-{},SKU-1,Tee,1,10,10,6", i));
            }
            for _ in 0..invalid {
                rows.push("not a date,TRX-X,SKU-1,Tee,1,10,10,6".to_string());
            }
            let refs: Vec<&str> = rows.iter().map(String::as_str).collect();
            let table = ingest::read_csv(&sales_csv(&refs)).unwrap();
            let (records, report) = ingest::load_sales(&table).unwrap();

            prop_assert_eq!(records.len(), valid);
            prop_assert_eq!(report.rows_total, (valid + invalid) as u64);
            prop_assert_eq!(report.rows_loaded + report.rows_dropped, report.rows_total);
        }
    }
}
