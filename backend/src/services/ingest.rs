//! Dataset normalization
//!
//! Turns uploaded delimited files into canonical records. Column headers
//! vary between export sources, so each dataset carries a declarative
//! synonym table; values go through the shared cleaning utilities. Row-level
//! problems are counted in the [`LoadReport`], never fatal. A missing
//! required column is fatal for the file.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::models::{
    CodeDictionary, CodeEntry, CodeKind, InboundRecord, SalesRecord, SkuAttributes, StockRecord,
};
use shared::validation::{normalize_header, parse_date, parse_flexible_decimal, parse_timestamp};

/// Datasets the pipeline understands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DatasetKind {
    MasterCodes,
    Sales,
    Inbound,
    Stock,
}

impl DatasetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetKind::MasterCodes => "master_codes",
            DatasetKind::Sales => "sales",
            DatasetKind::Inbound => "inbound",
            DatasetKind::Stock => "stock",
        }
    }
}

/// Per-file ingestion diagnostics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadReport {
    pub dataset: DatasetKind,
    pub rows_total: u64,
    pub rows_loaded: u64,
    /// Rows removed entirely (unparseable date, unmapped code kind)
    pub rows_dropped: u64,
    /// Numeric cells that could not be parsed and were zero-filled
    pub values_coerced: u64,
    /// Rows whose SKU did not fully resolve through the dictionary
    pub unknown_codes: u64,
    /// Stock rows violating the quantity or value invariants
    pub invariant_mismatches: u64,
    /// Sales rows that received a synthetic transaction id
    pub synthesized_ids: u64,
}

impl LoadReport {
    pub fn new(dataset: DatasetKind) -> Self {
        Self {
            dataset,
            rows_total: 0,
            rows_loaded: 0,
            rows_dropped: 0,
            values_coerced: 0,
            unknown_codes: 0,
            invariant_mismatches: 0,
            synthesized_ids: 0,
        }
    }
}

/// A parsed delimited file: headers plus string cells
#[derive(Debug, Clone)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Parse CSV bytes into a [`RawTable`]. Ragged rows are tolerated; missing
/// cells read as empty.
pub fn read_csv(bytes: &[u8]) -> AppResult<RawTable> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(bytes);
    let headers = reader
        .headers()
        .map_err(|e| AppError::Upload(format!("unreadable CSV header: {}", e)))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| AppError::Upload(format!("unreadable CSV row: {}", e)))?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(RawTable { headers, rows })
}

// ============================================================================
// Column Synonym Tables
// ============================================================================

struct ColumnSpec {
    canonical: &'static str,
    /// Accepted headers, pre-normalized (uppercase, collapsed whitespace)
    aliases: &'static [&'static str],
    required: bool,
}

const SALES_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec {
        canonical: "timestamp",
        aliases: &["TANGGAL", "TANGGAL TRANSAKSI", "DATE"],
        required: true,
    },
    ColumnSpec {
        canonical: "transaction_id",
        aliases: &[
            "NO TRANSAKSI",
            "NO. TRANSAKSI",
            "ID TRANSAKSI",
            "NOMOR TRANSAKSI",
            "ORDER ID",
            "TRANSACTION ID",
        ],
        required: false,
    },
    ColumnSpec {
        canonical: "sku",
        aliases: &["SKU", "SK U", "KODE SKU"],
        required: true,
    },
    ColumnSpec {
        canonical: "product_name",
        aliases: &["NAMA PRODUK", "PRODUK", "PRODUCT NAME", "ITEM NAME"],
        required: false,
    },
    ColumnSpec {
        canonical: "quantity",
        aliases: &["QTY", "JUMLAH", "QUANTITY"],
        required: true,
    },
    ColumnSpec {
        canonical: "unit_price",
        aliases: &["HARGA", "HARGA SATUAN", "PRICE"],
        required: true,
    },
    ColumnSpec {
        canonical: "subtotal",
        aliases: &["SUB TOTAL", "SUBTOTAL"],
        required: false,
    },
    ColumnSpec {
        canonical: "net_sales",
        aliases: &["NETT SALES", "NET SALES"],
        required: true,
    },
    ColumnSpec {
        canonical: "cost_of_goods",
        aliases: &["HPP", "COGS"],
        required: true,
    },
    ColumnSpec {
        canonical: "gross_profit",
        aliases: &["GROSS PROFIT", "LABA KOTOR"],
        required: false,
    },
    ColumnSpec {
        canonical: "channel",
        aliases: &["CHANNEL", "SALES CHANNEL"],
        required: false,
    },
    ColumnSpec {
        canonical: "customer_id",
        aliases: &["PELANGGAN", "CUSTOMER ID", "CUSTOMER", "ID PELANGGAN"],
        required: false,
    },
    ColumnSpec {
        canonical: "location",
        aliases: &["LOKASI", "LOCATION", "OUTLET", "GUDANG"],
        required: false,
    },
];

const INBOUND_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec {
        canonical: "date",
        aliases: &["TANGGAL", "DATE"],
        required: true,
    },
    ColumnSpec {
        canonical: "sku",
        aliases: &["SKU", "KODE SKU"],
        required: true,
    },
    ColumnSpec {
        canonical: "item_name",
        aliases: &["NAMA BARANG", "NAMA PRODUK", "ITEM NAME"],
        required: false,
    },
    ColumnSpec {
        canonical: "qty_ordered",
        aliases: &["QTY DIPESAN UNIT", "QTY DIPESAN", "QTY ORDERED"],
        required: true,
    },
    ColumnSpec {
        canonical: "qty_received",
        aliases: &["QTY DITERIMA", "QTY RECEIVED"],
        required: true,
    },
    ColumnSpec {
        canonical: "unit_cost",
        aliases: &["HARGA", "UNIT COST"],
        required: true,
    },
    ColumnSpec {
        canonical: "amount",
        aliases: &["AMOUNT", "SUB TOTAL"],
        required: true,
    },
    ColumnSpec {
        canonical: "discount",
        aliases: &["DISKON", "DISCOUNT"],
        required: false,
    },
    ColumnSpec {
        canonical: "tax_total",
        aliases: &["PAJAK TOTAL", "TAX TOTAL"],
        required: false,
    },
    ColumnSpec {
        canonical: "grand_total",
        aliases: &["GRAND TOTAL"],
        required: false,
    },
    ColumnSpec {
        canonical: "supplier_name",
        aliases: &["NAMA SUPPLIER", "SUPPLIER", "SUPPLIER NAME"],
        required: true,
    },
    ColumnSpec {
        canonical: "po_number",
        aliases: &["NO PO", "NO. PO", "PO NUMBER"],
        required: false,
    },
    ColumnSpec {
        canonical: "bill_number",
        aliases: &["NO BILL", "NO. BILL", "BILL NUMBER"],
        required: false,
    },
    ColumnSpec {
        canonical: "notes",
        aliases: &["KETERANGAN", "CATATAN", "NOTES"],
        required: false,
    },
];

const STOCK_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec {
        canonical: "sku",
        aliases: &["SKU", "KODE SKU"],
        required: true,
    },
    ColumnSpec {
        canonical: "item_name",
        aliases: &["NAMA BARANG", "NAMA PRODUK", "ITEM NAME"],
        required: false,
    },
    ColumnSpec {
        canonical: "location",
        aliases: &["LOKASI", "GUDANG", "LOCATION"],
        required: false,
    },
    ColumnSpec {
        canonical: "qty_total",
        aliases: &["QTY", "JUMLAH", "QUANTITY"],
        required: true,
    },
    ColumnSpec {
        canonical: "qty_reserved",
        aliases: &["DIPESAN", "RESERVED"],
        required: false,
    },
    ColumnSpec {
        canonical: "qty_available",
        aliases: &["TERSEDIA", "AVAILABLE"],
        required: true,
    },
    ColumnSpec {
        canonical: "sell_price",
        aliases: &["HARGA JUAL", "SELL PRICE"],
        required: false,
    },
    ColumnSpec {
        canonical: "unit_cost",
        aliases: &["HPP", "UNIT COST"],
        required: true,
    },
    ColumnSpec {
        canonical: "inventory_value",
        aliases: &["NILAI PERSEDIAAN", "INVENTORY VALUE"],
        required: false,
    },
    ColumnSpec {
        canonical: "is_bundle",
        aliases: &["BUNDLE", "IS BUNDLE", "PAKET"],
        required: false,
    },
];

const MASTER_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec {
        canonical: "kind",
        aliases: &["JENIS", "KIND", "TYPE"],
        required: true,
    },
    ColumnSpec {
        canonical: "code",
        aliases: &["KODE", "CODE", "SINGKATAN"],
        required: true,
    },
    ColumnSpec {
        canonical: "meaning",
        aliases: &["KETERANGAN", "ARTI", "MEANING", "DESKRIPSI"],
        required: true,
    },
];

/// Resolved canonical-name-to-column-index mapping for one file
struct ColumnMap {
    indices: HashMap<&'static str, usize>,
}

impl ColumnMap {
    fn cell<'a>(&self, row: &'a [String], canonical: &str) -> &'a str {
        self.indices
            .get(canonical)
            .and_then(|&idx| row.get(idx))
            .map(String::as_str)
            .unwrap_or("")
    }
}

fn resolve_columns(
    dataset: DatasetKind,
    headers: &[String],
    specs: &[ColumnSpec],
) -> AppResult<ColumnMap> {
    let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();
    let mut indices = HashMap::new();

    for spec in specs {
        let found = normalized
            .iter()
            .position(|header| spec.aliases.contains(&header.as_str()));
        match found {
            Some(idx) => {
                indices.insert(spec.canonical, idx);
            }
            None if spec.required => {
                return Err(AppError::Schema {
                    dataset: dataset.as_str().to_string(),
                    column: spec.canonical.to_string(),
                });
            }
            None => {}
        }
    }

    Ok(ColumnMap { indices })
}

// ============================================================================
// Loaders
// ============================================================================

fn coerce_decimal(raw: &str, report: &mut LoadReport) -> Decimal {
    match parse_flexible_decimal(raw) {
        Some(value) => value,
        None => {
            report.values_coerced += 1;
            Decimal::ZERO
        }
    }
}

fn optional(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_bool_cell(raw: &str) -> bool {
    matches!(
        raw.trim().to_lowercase().as_str(),
        "ya" | "yes" | "true" | "1" | "bundle"
    )
}

/// Build the code dictionary from a master file. Rows with an unmapped kind
/// label are skipped and counted.
pub fn load_master(table: &RawTable) -> AppResult<(CodeDictionary, LoadReport)> {
    let cols = resolve_columns(DatasetKind::MasterCodes, &table.headers, MASTER_COLUMNS)?;
    let mut report = LoadReport::new(DatasetKind::MasterCodes);
    report.rows_total = table.rows.len() as u64;

    let mut dictionary = CodeDictionary::new();
    for (index, row) in table.rows.iter().enumerate() {
        let label = cols.cell(row, "kind");
        let Some(kind) = CodeKind::from_label(label) else {
            report.rows_dropped += 1;
            tracing::debug!(row = index, label, "skipping master row with unmapped kind");
            continue;
        };
        let code = cols.cell(row, "code").trim().to_string();
        if code.is_empty() {
            report.rows_dropped += 1;
            continue;
        }
        dictionary.insert(CodeEntry {
            kind,
            code,
            meaning: cols.cell(row, "meaning").trim().to_string(),
        });
        report.rows_loaded += 1;
    }

    Ok((dictionary, report))
}

/// Normalize a sales file. Rows without a parseable timestamp are dropped;
/// missing transaction ids are synthesized from the row number.
pub fn load_sales(table: &RawTable) -> AppResult<(Vec<SalesRecord>, LoadReport)> {
    let cols = resolve_columns(DatasetKind::Sales, &table.headers, SALES_COLUMNS)?;
    let mut report = LoadReport::new(DatasetKind::Sales);
    report.rows_total = table.rows.len() as u64;

    let mut records = Vec::with_capacity(table.rows.len());
    for (index, row) in table.rows.iter().enumerate() {
        let raw_timestamp = cols.cell(row, "timestamp");
        let Some(timestamp) = parse_timestamp(raw_timestamp) else {
            report.rows_dropped += 1;
            tracing::debug!(
                row = index,
                value = raw_timestamp,
                "dropping sales row with unparseable date"
            );
            continue;
        };

        let transaction_id = match optional(cols.cell(row, "transaction_id")) {
            Some(id) => id,
            None => {
                report.synthesized_ids += 1;
                format!("ROW-{}", index + 1)
            }
        };

        let sku = cols.cell(row, "sku").trim().to_string();
        let product_name =
            optional(cols.cell(row, "product_name")).unwrap_or_else(|| sku.clone());

        records.push(SalesRecord {
            timestamp,
            transaction_id,
            sku,
            product_name,
            quantity: coerce_decimal(cols.cell(row, "quantity"), &mut report),
            unit_price: coerce_decimal(cols.cell(row, "unit_price"), &mut report),
            subtotal: coerce_decimal(cols.cell(row, "subtotal"), &mut report),
            net_sales: coerce_decimal(cols.cell(row, "net_sales"), &mut report),
            cost_of_goods: coerce_decimal(cols.cell(row, "cost_of_goods"), &mut report),
            gross_profit: coerce_decimal(cols.cell(row, "gross_profit"), &mut report),
            channel: optional(cols.cell(row, "channel")),
            customer_id: optional(cols.cell(row, "customer_id")),
            location: optional(cols.cell(row, "location")),
            attributes: SkuAttributes::default(),
        });
    }

    report.rows_loaded = records.len() as u64;
    Ok((records, report))
}

/// Normalize an inbound (receiving) file.
pub fn load_inbound(table: &RawTable) -> AppResult<(Vec<InboundRecord>, LoadReport)> {
    let cols = resolve_columns(DatasetKind::Inbound, &table.headers, INBOUND_COLUMNS)?;
    let mut report = LoadReport::new(DatasetKind::Inbound);
    report.rows_total = table.rows.len() as u64;

    let mut records = Vec::with_capacity(table.rows.len());
    for (index, row) in table.rows.iter().enumerate() {
        let raw_date = cols.cell(row, "date");
        let Some(date) = parse_date(raw_date) else {
            report.rows_dropped += 1;
            tracing::debug!(
                row = index,
                value = raw_date,
                "dropping inbound row with unparseable date"
            );
            continue;
        };

        let sku = cols.cell(row, "sku").trim().to_string();
        let item_name = optional(cols.cell(row, "item_name")).unwrap_or_else(|| sku.clone());

        records.push(InboundRecord {
            date,
            sku,
            item_name,
            qty_ordered: coerce_decimal(cols.cell(row, "qty_ordered"), &mut report),
            qty_received: coerce_decimal(cols.cell(row, "qty_received"), &mut report),
            unit_cost: coerce_decimal(cols.cell(row, "unit_cost"), &mut report),
            amount: coerce_decimal(cols.cell(row, "amount"), &mut report),
            discount: coerce_decimal(cols.cell(row, "discount"), &mut report),
            tax_total: coerce_decimal(cols.cell(row, "tax_total"), &mut report),
            grand_total: coerce_decimal(cols.cell(row, "grand_total"), &mut report),
            supplier_name: cols.cell(row, "supplier_name").trim().to_string(),
            po_number: optional(cols.cell(row, "po_number")),
            bill_number: optional(cols.cell(row, "bill_number")),
            notes: optional(cols.cell(row, "notes")),
            attributes: SkuAttributes::default(),
        });
    }

    report.rows_loaded = records.len() as u64;
    Ok((records, report))
}

/// Absolute slack allowed between stated and computed inventory value,
/// covering rounding in the source files.
const VALUE_TOLERANCE: Decimal = Decimal::ONE;

/// Normalize a stock file. Invariant violations (available above total,
/// stated value disagreeing with qty x cost) are counted, not corrected.
pub fn load_stock(table: &RawTable) -> AppResult<(Vec<StockRecord>, LoadReport)> {
    let cols = resolve_columns(DatasetKind::Stock, &table.headers, STOCK_COLUMNS)?;
    let mut report = LoadReport::new(DatasetKind::Stock);
    report.rows_total = table.rows.len() as u64;

    let mut records = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        let sku = cols.cell(row, "sku").trim().to_string();
        if sku.is_empty() {
            report.rows_dropped += 1;
            continue;
        }
        let item_name = optional(cols.cell(row, "item_name")).unwrap_or_else(|| sku.clone());

        let record = StockRecord {
            sku,
            item_name,
            location: optional(cols.cell(row, "location")),
            qty_total: coerce_decimal(cols.cell(row, "qty_total"), &mut report),
            qty_reserved: coerce_decimal(cols.cell(row, "qty_reserved"), &mut report),
            qty_available: coerce_decimal(cols.cell(row, "qty_available"), &mut report),
            sell_price: coerce_decimal(cols.cell(row, "sell_price"), &mut report),
            unit_cost: coerce_decimal(cols.cell(row, "unit_cost"), &mut report),
            inventory_value: coerce_decimal(cols.cell(row, "inventory_value"), &mut report),
            is_bundle: parse_bool_cell(cols.cell(row, "is_bundle")),
            attributes: SkuAttributes::default(),
        };

        if record.available_exceeds_total() || record.has_value_mismatch(VALUE_TOLERANCE) {
            report.invariant_mismatches += 1;
            tracing::warn!(sku = %record.sku, "stock row violates inventory invariants");
        }

        records.push(record);
    }

    report.rows_loaded = records.len() as u64;
    Ok((records, report))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(csv: &str) -> RawTable {
        read_csv(csv.as_bytes()).unwrap()
    }

    #[test]
    fn test_sales_synonym_headers() {
        let csv = "No. Transaksi,Tanggal,SK U,Nama Produk,QTY,Harga,Sub Total,Nett Sales,HPP\n\
                   TRX-1,01/03/2024 10:00,TSH124SSA BAS-BLK32,Basic Tee,2,50,100,100,60\n";
        let (records, report) = load_sales(&table(csv)).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].transaction_id, "TRX-1");
        assert_eq!(records[0].sku, "TSH124SSA BAS-BLK32");
        assert_eq!(report.rows_loaded, 1);
        assert_eq!(report.rows_dropped, 0);
    }

    #[test]
    fn test_sales_missing_required_column() {
        let csv = "Tanggal,QTY,Harga,Nett Sales,HPP\n01/03/2024 10:00,2,50,100,60\n";
        let err = load_sales(&table(csv)).unwrap_err();
        match err {
            AppError::Schema { dataset, column } => {
                assert_eq!(dataset, "sales");
                assert_eq!(column, "sku");
            }
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_sales_bad_date_drops_row() {
        let csv = "Tanggal,SKU,QTY,Harga,Nett Sales,HPP\n\
                   not-a-date,SKU1,1,10,10,5\n\
                   01/03/2024 10:00,SKU1,1,10,10,5\n";
        let (records, report) = load_sales(&table(csv)).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(report.rows_total, 2);
        assert_eq!(report.rows_dropped, 1);
    }

    #[test]
    fn test_sales_numeric_coercion_counted() {
        let csv = "Tanggal,SKU,QTY,Harga,Nett Sales,HPP\n\
                   01/03/2024 10:00,SKU1,abc,10,10,5\n";
        let (records, report) = load_sales(&table(csv)).unwrap();
        assert_eq!(records[0].quantity, Decimal::ZERO);
        assert_eq!(report.values_coerced, 1);
    }

    #[test]
    fn test_sales_synthesized_transaction_id() {
        let csv = "Tanggal,SKU,QTY,Harga,Nett Sales,HPP\n\
                   01/03/2024 10:00,SKU1,1,10,10,5\n";
        let (records, report) = load_sales(&table(csv)).unwrap();
        assert_eq!(records[0].transaction_id, "ROW-1");
        assert_eq!(report.synthesized_ids, 1);
    }

    #[test]
    fn test_master_unknown_kind_skipped() {
        let csv = "JENIS,KODE,KETERANGAN\n\
                   WARNA,BLK,Black\n\
                   HARGA,X,ignored\n";
        let (dictionary, report) = load_master(&table(csv)).unwrap();
        assert_eq!(dictionary.len(), 1);
        assert_eq!(report.rows_loaded, 1);
        assert_eq!(report.rows_dropped, 1);
    }

    #[test]
    fn test_master_kind_alias() {
        let csv = "JENIS,KODE,KETERANGAN\nTAHUN LAUNCHING,24,2024\n";
        let (dictionary, _) = load_master(&table(csv)).unwrap();
        assert_eq!(dictionary.resolve(CodeKind::ProductionYear, "24"), "2024");
    }

    #[test]
    fn test_stock_invariant_mismatch_counted() {
        let csv = "SKU,QTY,Tersedia,HPP,Nilai Persediaan\n\
                   SKU1,10,12,30,300\n\
                   SKU2,10,8,30,300\n";
        let (records, report) = load_stock(&table(csv)).unwrap();
        assert_eq!(records.len(), 2);
        // First row: available above total and stated value matching
        assert_eq!(report.invariant_mismatches, 1);
    }

    #[test]
    fn test_inbound_indonesian_amounts() {
        let csv = "Tanggal,SKU,Qty Dipesan Unit,Qty Diterima,Harga,Amount,Nama Supplier\n\
                   01/03/2024,SKU1,10,10,\"Rp 30.000\",\"Rp 300.000\",PT Sumber\n";
        let (records, report) = load_inbound(&table(csv)).unwrap();
        assert_eq!(records[0].unit_cost, Decimal::from(30_000));
        assert_eq!(records[0].amount, Decimal::from(300_000));
        assert_eq!(report.values_coerced, 0);
    }
}
