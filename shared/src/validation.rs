//! Value-cleaning utilities for spreadsheet ingestion
//!
//! Includes Indonesia-specific number handling: exports commonly carry
//! "Rp" prefixes and use dots for thousands with a decimal comma
//! (e.g. "Rp 1.234.567,89").

use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

// ============================================================================
// Numeric Cleaning
// ============================================================================

/// Parse a financial cell into a `Decimal`, tolerating currency prefixes and
/// both Indonesian ("1.234,56") and anglo ("1,234.56") separator styles.
///
/// Blank cells and a lone "-" are zero. Returns `None` when the cell is
/// genuinely unparseable so callers can count the coercion.
pub fn parse_flexible_decimal(raw: &str) -> Option<Decimal> {
    let mut cleaned: String = raw
        .trim()
        .trim_start_matches("Rp")
        .trim_start_matches("rp")
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{a0}')
        .collect();

    if cleaned.is_empty() || cleaned == "-" {
        return Some(Decimal::ZERO);
    }

    let last_dot = cleaned.rfind('.');
    let last_comma = cleaned.rfind(',');

    cleaned = match (last_dot, last_comma) {
        // Both present: the later one is the decimal separator
        (Some(dot), Some(comma)) if comma > dot => {
            cleaned.replace('.', "").replace(',', ".")
        }
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        // Comma only: decimal comma when it looks like one, thousands otherwise
        (None, Some(comma)) => {
            let fraction_len = cleaned.len() - comma - 1;
            if cleaned.matches(',').count() == 1 && (1..=2).contains(&fraction_len) {
                cleaned.replace(',', ".")
            } else {
                cleaned.replace(',', "")
            }
        }
        // Dot only: repeated dots can only be thousands separators
        (Some(_), None) if cleaned.matches('.').count() > 1 => cleaned.replace('.', ""),
        _ => cleaned,
    };

    Decimal::from_str(&cleaned).ok()
}

// ============================================================================
// Header Normalization
// ============================================================================

/// Canonical form for column-header comparison: uppercase, underscores to
/// spaces, internal whitespace collapsed.
pub fn normalize_header(header: &str) -> String {
    header
        .trim()
        .replace('_', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

// ============================================================================
// Date Parsing
// ============================================================================

const DATETIME_FORMATS: &[&str] = &[
    "%d/%m/%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%d/%m/%Y", "%Y-%m-%d", "%d-%m-%Y"];

/// Parse a sales timestamp. The canonical export format is day-first
/// "%d/%m/%Y %H:%M"; date-only cells resolve to midnight.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt);
        }
    }
    parse_date(trimmed).and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Parse a date cell, accepting day-first and ISO forms plus full timestamps.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    for format in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(d);
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt.date());
        }
    }
    None
}
