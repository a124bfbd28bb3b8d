//! Common types used across the platform

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Date range for queries (inclusive on both ends)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Declarative dataset filter. Each axis restricts independently; an empty
/// axis leaves that dimension unrestricted, so axes can be applied in any
/// order with the same result.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSpec {
    pub date_range: Option<DateRange>,
    pub categories: Vec<String>,
    pub locations: Vec<String>,
    pub product_names: Vec<String>,
}

impl FilterSpec {
    pub fn is_unrestricted(&self) -> bool {
        self.date_range.is_none()
            && self.categories.is_empty()
            && self.locations.is_empty()
            && self.product_names.is_empty()
    }

    pub fn matches_date(&self, date: NaiveDate) -> bool {
        match &self.date_range {
            Some(range) => range.contains(date),
            None => true,
        }
    }

    pub fn matches_category(&self, category: &str) -> bool {
        self.categories.is_empty() || self.categories.iter().any(|c| c == category)
    }

    pub fn matches_location(&self, location: &str) -> bool {
        self.locations.is_empty() || self.locations.iter().any(|l| l == location)
    }

    pub fn matches_product_name(&self, name: &str) -> bool {
        self.product_names.is_empty() || self.product_names.iter().any(|p| p == name)
    }
}

/// Grouping dimensions for breakdowns
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Category,
    SubCategory,
    Season,
    Color,
    Size,
    ProductionYear,
    Channel,
    Location,
}

impl Dimension {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Category => "category",
            Dimension::SubCategory => "sub_category",
            Dimension::Season => "season",
            Dimension::Color => "color",
            Dimension::Size => "size",
            Dimension::ProductionYear => "production_year",
            Dimension::Channel => "channel",
            Dimension::Location => "location",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_date_range_inclusive() {
        let range = DateRange::new(date(2024, 1, 1), date(2024, 1, 31));
        assert!(range.contains(date(2024, 1, 1)));
        assert!(range.contains(date(2024, 1, 31)));
        assert!(!range.contains(date(2024, 2, 1)));
        assert!(!range.contains(date(2023, 12, 31)));
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = FilterSpec::default();
        assert!(filter.is_unrestricted());
        assert!(filter.matches_date(date(1999, 1, 1)));
        assert!(filter.matches_category("Unknown"));
        assert!(filter.matches_location("Gudang A"));
        assert!(filter.matches_product_name("anything"));
    }

    #[test]
    fn test_filter_axes_are_independent() {
        let filter = FilterSpec {
            categories: vec!["TSH".to_string()],
            ..Default::default()
        };
        assert!(filter.matches_category("TSH"));
        assert!(!filter.matches_category("JKT"));
        // Other axes stay open
        assert!(filter.matches_location("anywhere"));
    }
}
