//! Master code dictionary
//!
//! The master SKU workbook carries one row per (kind, code) pair, e.g.
//! kind "WARNA", code "BLK", meaning "Black". Kind labels vary between
//! exports, so lookup goes through an alias table.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::validation::normalize_header;

/// Sentinel meaning for any code the dictionary cannot resolve
pub const UNKNOWN: &str = "Unknown";

/// Attribute families a dictionary code can belong to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CodeKind {
    Category,
    SubCategory,
    Season,
    Color,
    Size,
    ProductionYear,
    ProductAbbreviation,
    Defect,
}

impl CodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CodeKind::Category => "category",
            CodeKind::SubCategory => "sub_category",
            CodeKind::Season => "season",
            CodeKind::Color => "color",
            CodeKind::Size => "size",
            CodeKind::ProductionYear => "production_year",
            CodeKind::ProductAbbreviation => "product_abbreviation",
            CodeKind::Defect => "defect",
        }
    }

    /// Map a kind label from the master file to its `CodeKind`. Labels are
    /// compared case- and whitespace-insensitively; known aliases from
    /// historical exports are accepted.
    pub fn from_label(label: &str) -> Option<CodeKind> {
        match normalize_header(label).as_str() {
            "CATEGORY" | "KATEGORI" => Some(CodeKind::Category),
            "SUB CATEGORY" | "SUBCATEGORY" | "SUB KATEGORI" => Some(CodeKind::SubCategory),
            "SEASON" | "MUSIM" => Some(CodeKind::Season),
            "WARNA" | "COLOR" | "COLOUR" => Some(CodeKind::Color),
            "UKURAN" | "SIZE" => Some(CodeKind::Size),
            "TAHUN PRODUKSI" | "TAHUN LAUNCHING" | "TAHUN" => Some(CodeKind::ProductionYear),
            "SINGKATAN NAMA PRODUK" | "NAMA PRODUK" => Some(CodeKind::ProductAbbreviation),
            "DEFFECT" | "DEFECT" => Some(CodeKind::Defect),
            _ => None,
        }
    }
}

/// One master-file row: a code and its human-readable meaning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeEntry {
    pub kind: CodeKind,
    pub code: String,
    pub meaning: String,
}

/// Lookup table from (kind, code) to meaning. Resolution never fails:
/// unknown codes degrade to [`UNKNOWN`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CodeDictionary {
    entries: HashMap<CodeKind, HashMap<String, String>>,
}

impl CodeDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = CodeEntry>) -> Self {
        let mut dict = Self::new();
        for entry in entries {
            dict.insert(entry);
        }
        dict
    }

    /// Last insert wins for a duplicated (kind, code) pair.
    pub fn insert(&mut self, entry: CodeEntry) {
        self.entries
            .entry(entry.kind)
            .or_default()
            .insert(entry.code.trim().to_uppercase(), entry.meaning);
    }

    /// Resolve a code to its meaning, or [`UNKNOWN`] when the code is
    /// missing, blank, or not in the dictionary.
    pub fn resolve(&self, kind: CodeKind, code: &str) -> String {
        let key = code.trim().to_uppercase();
        if key.is_empty() {
            return UNKNOWN.to_string();
        }
        self.entries
            .get(&kind)
            .and_then(|codes| codes.get(&key))
            .cloned()
            .unwrap_or_else(|| UNKNOWN.to_string())
    }

    pub fn contains(&self, kind: CodeKind, code: &str) -> bool {
        self.entries
            .get(&kind)
            .is_some_and(|codes| codes.contains_key(&code.trim().to_uppercase()))
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(kind: CodeKind, code: &str, meaning: &str) -> CodeEntry {
        CodeEntry {
            kind,
            code: code.to_string(),
            meaning: meaning.to_string(),
        }
    }

    #[test]
    fn test_resolve_known_code() {
        let dict = CodeDictionary::from_entries([entry(CodeKind::Color, "BLK", "Black")]);
        assert_eq!(dict.resolve(CodeKind::Color, "BLK"), "Black");
        // Case and whitespace insensitive
        assert_eq!(dict.resolve(CodeKind::Color, " blk "), "Black");
    }

    #[test]
    fn test_resolve_unknown_code() {
        let dict = CodeDictionary::new();
        assert_eq!(dict.resolve(CodeKind::Color, "XYZ"), UNKNOWN);
        assert_eq!(dict.resolve(CodeKind::Color, ""), UNKNOWN);
    }

    #[test]
    fn test_kinds_do_not_collide() {
        let dict = CodeDictionary::from_entries([
            entry(CodeKind::Color, "SS", "Sunset"),
            entry(CodeKind::Season, "SS", "Spring/Summer"),
        ]);
        assert_eq!(dict.resolve(CodeKind::Color, "SS"), "Sunset");
        assert_eq!(dict.resolve(CodeKind::Season, "SS"), "Spring/Summer");
    }

    #[test]
    fn test_duplicate_code_last_wins() {
        let dict = CodeDictionary::from_entries([
            entry(CodeKind::Size, "01", "Small"),
            entry(CodeKind::Size, "01", "Extra Small"),
        ]);
        assert_eq!(dict.resolve(CodeKind::Size, "01"), "Extra Small");
        assert_eq!(dict.len(), 1);
    }

    #[test]
    fn test_kind_label_aliases() {
        assert_eq!(CodeKind::from_label("TAHUN LAUNCHING"), Some(CodeKind::ProductionYear));
        assert_eq!(CodeKind::from_label("tahun"), Some(CodeKind::ProductionYear));
        assert_eq!(CodeKind::from_label("Sub_Category"), Some(CodeKind::SubCategory));
        assert_eq!(CodeKind::from_label("DEFFECT"), Some(CodeKind::Defect));
        assert_eq!(CodeKind::from_label("HARGA"), None);
    }
}
