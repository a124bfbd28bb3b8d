//! Positional SKU decomposition
//!
//! SKUs encode product attributes positionally, e.g. `TSH124SS BAS-BLK32`:
//! the first three characters are the category code, the first four the
//! sub-category, and the tail carries production year (or defect marker),
//! season, product abbreviation, color, and size.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::codes::{CodeDictionary, CodeKind, UNKNOWN};

/// Tail pattern: year-or-defect, season, product abbreviation, color, size.
/// A `D` in the year slot marks a defect item.
static SKU_TAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:[A-Z0-9]+?)?([0-9]{2}|D[0-9])([A-Z]{3})[ -]([A-Z]+)-([A-Z]{3})([0-9]{2})$")
        .expect("SKU tail pattern is valid")
});

/// Raw code segments sliced out of a SKU. Segments the pattern cannot
/// account for stay `None`; decomposition itself never fails.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkuParts {
    pub category_code: Option<String>,
    pub sub_category_code: Option<String>,
    pub year_code: Option<String>,
    pub season_code: Option<String>,
    pub product_code: Option<String>,
    pub color_code: Option<String>,
    pub size_code: Option<String>,
    pub is_defect: bool,
}

/// Dictionary-resolved product attributes. Defaults to all-[`UNKNOWN`],
/// which is also what undecomposable SKUs carry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SkuAttributes {
    pub category: String,
    pub sub_category: String,
    pub season: String,
    pub color: String,
    pub size: String,
    pub production_year: String,
    pub product_abbreviation: String,
    pub is_defect: bool,
}

impl Default for SkuAttributes {
    fn default() -> Self {
        Self {
            category: UNKNOWN.to_string(),
            sub_category: UNKNOWN.to_string(),
            season: UNKNOWN.to_string(),
            color: UNKNOWN.to_string(),
            size: UNKNOWN.to_string(),
            production_year: UNKNOWN.to_string(),
            product_abbreviation: UNKNOWN.to_string(),
            is_defect: false,
        }
    }
}

impl SkuAttributes {
    pub fn value_for(&self, dimension: crate::types::Dimension) -> Option<&str> {
        use crate::types::Dimension;
        match dimension {
            Dimension::Category => Some(&self.category),
            Dimension::SubCategory => Some(&self.sub_category),
            Dimension::Season => Some(&self.season),
            Dimension::Color => Some(&self.color),
            Dimension::Size => Some(&self.size),
            Dimension::ProductionYear => Some(&self.production_year),
            Dimension::Channel | Dimension::Location => None,
        }
    }
}

/// Slice a SKU into its positional code segments.
pub fn decompose_sku(sku: &str) -> SkuParts {
    let sku = sku.trim().to_uppercase();
    let mut parts = SkuParts::default();
    if sku.is_empty() {
        return parts;
    }

    let chars: Vec<char> = sku.chars().collect();
    if chars.len() >= 3 {
        parts.category_code = Some(chars[..3].iter().collect());
    }
    if chars.len() >= 4 {
        parts.sub_category_code = Some(chars[..4].iter().collect());
    }
    // Size fallback from the trailing two characters, refined below when
    // the tail pattern matches.
    if chars.len() >= 2 && chars[chars.len() - 2..].iter().all(|c| c.is_ascii_digit()) {
        parts.size_code = Some(chars[chars.len() - 2..].iter().collect());
    }

    if let Some(caps) = SKU_TAIL.captures(&sku) {
        let year_slot = &caps[1];
        parts.is_defect = year_slot.starts_with('D');
        parts.year_code = Some(year_slot.to_string());
        parts.season_code = Some(caps[2].to_string());
        parts.product_code = Some(caps[3].to_string());
        parts.color_code = Some(caps[4].to_string());
        parts.size_code = Some(caps[5].to_string());
    }

    parts
}

/// Resolve decomposed segments through the dictionary. Misses degrade to
/// [`UNKNOWN`] per attribute; the whole operation is pure and idempotent.
pub fn resolve_sku(sku: &str, dictionary: &CodeDictionary) -> SkuAttributes {
    let parts = decompose_sku(sku);
    let mut attrs = SkuAttributes {
        is_defect: parts.is_defect,
        ..Default::default()
    };

    if let Some(code) = &parts.category_code {
        attrs.category = dictionary.resolve(CodeKind::Category, code);
    }
    if let Some(code) = &parts.sub_category_code {
        attrs.sub_category = dictionary.resolve(CodeKind::SubCategory, code);
    }
    if let Some(code) = &parts.season_code {
        attrs.season = dictionary.resolve(CodeKind::Season, code);
    }
    if let Some(code) = &parts.color_code {
        attrs.color = dictionary.resolve(CodeKind::Color, code);
    }
    if let Some(code) = &parts.size_code {
        attrs.size = dictionary.resolve(CodeKind::Size, code);
    }
    if let Some(code) = &parts.product_code {
        attrs.product_abbreviation = dictionary.resolve(CodeKind::ProductAbbreviation, code);
    }
    if let Some(code) = &parts.year_code {
        attrs.production_year = resolve_year(code, parts.is_defect, dictionary);
    }

    attrs
}

/// Defect years resolve through the defect table, falling back to
/// `2020 + digit` when unmapped. Plain year codes have no fallback: an
/// unmapped year stays [`UNKNOWN`] rather than being guessed.
fn resolve_year(code: &str, is_defect: bool, dictionary: &CodeDictionary) -> String {
    if is_defect {
        let resolved = dictionary.resolve(CodeKind::Defect, code);
        if resolved != UNKNOWN {
            return resolved;
        }
        return match code[1..].parse::<u32>() {
            Ok(digit) => (2020 + digit).to_string(),
            Err(_) => UNKNOWN.to_string(),
        };
    }
    dictionary.resolve(CodeKind::ProductionYear, code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::codes::CodeEntry;

    fn dictionary() -> CodeDictionary {
        let entries = [
            (CodeKind::Category, "TSH", "T-Shirt"),
            (CodeKind::SubCategory, "TSH1", "T-Shirt Basic"),
            (CodeKind::Season, "SSA", "Spring/Summer A"),
            (CodeKind::Color, "BLK", "Black"),
            (CodeKind::Size, "32", "M"),
            (CodeKind::ProductionYear, "24", "2024"),
            (CodeKind::ProductAbbreviation, "BAS", "Basic Tee"),
            (CodeKind::Defect, "D4", "Defect 2024"),
        ];
        CodeDictionary::from_entries(entries.into_iter().map(|(kind, code, meaning)| CodeEntry {
            kind,
            code: code.to_string(),
            meaning: meaning.to_string(),
        }))
    }

    #[test]
    fn test_decompose_full_sku() {
        let parts = decompose_sku("TSH124SSA BAS-BLK32");
        assert_eq!(parts.category_code.as_deref(), Some("TSH"));
        assert_eq!(parts.sub_category_code.as_deref(), Some("TSH1"));
        assert_eq!(parts.year_code.as_deref(), Some("24"));
        assert_eq!(parts.season_code.as_deref(), Some("SSA"));
        assert_eq!(parts.product_code.as_deref(), Some("BAS"));
        assert_eq!(parts.color_code.as_deref(), Some("BLK"));
        assert_eq!(parts.size_code.as_deref(), Some("32"));
        assert!(!parts.is_defect);
    }

    #[test]
    fn test_decompose_defect_sku() {
        let parts = decompose_sku("TSH1D4SSA BAS-BLK32");
        assert!(parts.is_defect);
        assert_eq!(parts.year_code.as_deref(), Some("D4"));
    }

    #[test]
    fn test_resolve_full_sku() {
        let attrs = resolve_sku("TSH124SSA BAS-BLK32", &dictionary());
        assert_eq!(attrs.category, "T-Shirt");
        assert_eq!(attrs.sub_category, "T-Shirt Basic");
        assert_eq!(attrs.season, "Spring/Summer A");
        assert_eq!(attrs.color, "Black");
        assert_eq!(attrs.size, "M");
        assert_eq!(attrs.production_year, "2024");
        assert_eq!(attrs.product_abbreviation, "Basic Tee");
        assert!(!attrs.is_defect);
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let dict = dictionary();
        let first = resolve_sku("TSH124SSA BAS-BLK32", &dict);
        let second = resolve_sku("TSH124SSA BAS-BLK32", &dict);
        assert_eq!(first, second);
    }

    #[test]
    fn test_unmapped_segments_stay_unknown() {
        let attrs = resolve_sku("ZZZ999", &dictionary());
        assert_eq!(attrs.category, UNKNOWN);
        assert_eq!(attrs.season, UNKNOWN);
        assert_eq!(attrs.color, UNKNOWN);
    }

    #[test]
    fn test_defect_year_fallback() {
        // D7 is not in the defect table: falls back to 2020 + 7
        let attrs = resolve_sku("TSH1D7SSA BAS-BLK32", &dictionary());
        assert!(attrs.is_defect);
        assert_eq!(attrs.production_year, "2027");
    }

    #[test]
    fn test_unmapped_year_stays_unknown() {
        // 25 has no dictionary entry: never guessed as a literal year
        let attrs = resolve_sku("TSH125SSA BAS-BLK32", &dictionary());
        assert_eq!(attrs.production_year, UNKNOWN);
    }

    #[test]
    fn test_empty_dictionary_resolves_nothing() {
        let attrs = resolve_sku("TSH125SSA BAS-BLK32", &CodeDictionary::new());
        assert_eq!(attrs.production_year, UNKNOWN);
        assert_eq!(attrs.category, UNKNOWN);
    }

    #[test]
    fn test_empty_sku() {
        let attrs = resolve_sku("", &dictionary());
        assert_eq!(attrs, SkuAttributes::default());
    }
}
