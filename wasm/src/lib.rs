//! WebAssembly module for the Ziel Analytics dashboard
//!
//! Provides client-side computation for:
//! - SKU decomposition against a code dictionary
//! - Financial string cleaning (Rp prefixes, mixed separators)
//! - Offline validation of upload cells before they hit the server

use rust_decimal::prelude::ToPrimitive;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages in browser console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Decompose a SKU against a code dictionary and return its attributes
/// as JSON. The dictionary is the JSON snapshot served by the backend.
#[wasm_bindgen]
pub fn decompose_sku_json(sku: &str, dictionary_json: &str) -> Result<String, JsValue> {
    let dictionary: CodeDictionary = serde_json::from_str(dictionary_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid dictionary JSON: {}", e)))?;

    let attributes = resolve_sku(sku, &dictionary);
    serde_json::to_string(&attributes)
        .map_err(|e| JsValue::from_str(&format!("Serialization failed: {}", e)))
}

/// Clean a financial cell ("Rp 1.234,56", "2,500.00") into a plain number.
/// Returns NaN when the cell is not numeric at all.
#[wasm_bindgen]
pub fn clean_financial_value(raw: &str) -> f64 {
    match parse_flexible_decimal(raw) {
        Some(value) => value.to_f64().unwrap_or(f64::NAN),
        None => f64::NAN,
    }
}

/// Check whether a cell would survive numeric ingestion unchanged
#[wasm_bindgen]
pub fn is_valid_financial_value(raw: &str) -> bool {
    parse_flexible_decimal(raw).is_some()
}

/// Check whether a timestamp cell parses under any accepted day-first format
#[wasm_bindgen]
pub fn is_valid_timestamp(raw: &str) -> bool {
    parse_timestamp(raw).is_some()
}

/// Whether a SKU carries the defect marker in its year code
#[wasm_bindgen]
pub fn is_defect_sku(sku: &str) -> bool {
    decompose_sku(sku).is_defect
}
