//! Delimited-text export
//!
//! Flattens the stored records into serializable rows (the csv crate does
//! not handle nested structs) and writes them out with headers.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::models::{InboundRecord, SalesRecord, StockRecord};

/// Serialize a slice of flat rows to CSV text with a header row.
pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
    let mut writer = csv::Writer::from_writer(vec![]);

    for row in data {
        writer
            .serialize(row)
            .map_err(|e| AppError::Internal(format!("CSV serialization failed: {}", e)))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?;
    String::from_utf8(bytes)
        .map_err(|e| AppError::Internal(format!("CSV encoding error: {}", e)))
}

#[derive(Debug, Serialize)]
pub struct SalesExportRow {
    pub timestamp: String,
    pub transaction_id: String,
    pub sku: String,
    pub product_name: String,
    pub category: String,
    pub sub_category: String,
    pub season: String,
    pub color: String,
    pub size: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub net_sales: Decimal,
    pub cost_of_goods: Decimal,
    pub gross_profit: Decimal,
    pub channel: String,
    pub customer_id: String,
    pub location: String,
}

impl From<&SalesRecord> for SalesExportRow {
    fn from(record: &SalesRecord) -> Self {
        Self {
            timestamp: record.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            transaction_id: record.transaction_id.clone(),
            sku: record.sku.clone(),
            product_name: record.product_name.clone(),
            category: record.attributes.category.clone(),
            sub_category: record.attributes.sub_category.clone(),
            season: record.attributes.season.clone(),
            color: record.attributes.color.clone(),
            size: record.attributes.size.clone(),
            quantity: record.quantity,
            unit_price: record.unit_price,
            net_sales: record.net_sales,
            cost_of_goods: record.cost_of_goods,
            gross_profit: record.gross_profit,
            channel: record.channel.clone().unwrap_or_default(),
            customer_id: record.customer_id.clone().unwrap_or_default(),
            location: record.location.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InboundExportRow {
    pub date: String,
    pub sku: String,
    pub item_name: String,
    pub category: String,
    pub qty_ordered: Decimal,
    pub qty_received: Decimal,
    pub unit_cost: Decimal,
    pub amount: Decimal,
    pub grand_total: Decimal,
    pub supplier_name: String,
    pub po_number: String,
    pub bill_number: String,
}

impl From<&InboundRecord> for InboundExportRow {
    fn from(record: &InboundRecord) -> Self {
        Self {
            date: record.date.format("%Y-%m-%d").to_string(),
            sku: record.sku.clone(),
            item_name: record.item_name.clone(),
            category: record.attributes.category.clone(),
            qty_ordered: record.qty_ordered,
            qty_received: record.qty_received,
            unit_cost: record.unit_cost,
            amount: record.amount,
            grand_total: record.grand_total,
            supplier_name: record.supplier_name.clone(),
            po_number: record.po_number.clone().unwrap_or_default(),
            bill_number: record.bill_number.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StockExportRow {
    pub sku: String,
    pub item_name: String,
    pub category: String,
    pub location: String,
    pub qty_total: Decimal,
    pub qty_reserved: Decimal,
    pub qty_available: Decimal,
    pub sell_price: Decimal,
    pub unit_cost: Decimal,
    pub inventory_value: Decimal,
    pub is_bundle: bool,
}

impl From<&StockRecord> for StockExportRow {
    fn from(record: &StockRecord) -> Self {
        Self {
            sku: record.sku.clone(),
            item_name: record.item_name.clone(),
            category: record.attributes.category.clone(),
            location: record.location.clone().unwrap_or_default(),
            qty_total: record.qty_total,
            qty_reserved: record.qty_reserved,
            qty_available: record.qty_available,
            sell_price: record.sell_price,
            unit_cost: record.unit_cost,
            inventory_value: record.inventory_value,
            is_bundle: record.is_bundle,
        }
    }
}
