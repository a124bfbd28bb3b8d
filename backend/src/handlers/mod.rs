//! HTTP request handlers for the Ziel Analytics dashboard

pub mod alerts;
pub mod customers;
pub mod dashboard;
pub mod export;
pub mod forecast;
pub mod health;
pub mod scenario;
pub mod suppliers;
pub mod upload;

pub use alerts::*;
pub use customers::*;
pub use dashboard::*;
pub use export::*;
pub use forecast::*;
pub use health::*;
pub use scenario::*;
pub use suppliers::*;
pub use upload::*;

use chrono::NaiveDate;
use serde::Deserialize;

use shared::types::{DateRange, FilterSpec};

/// Common filter query string shared by the analytics endpoints.
/// List parameters are comma-separated, e.g. `categories=T-Shirt,Pants`.
#[derive(Debug, Default, Deserialize)]
pub struct FilterQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub categories: Option<String>,
    pub locations: Option<String>,
    pub product_names: Option<String>,
    /// "json" (default) or "csv", where the endpoint supports export
    pub format: Option<String>,
}

fn split_list(raw: &Option<String>) -> Vec<String> {
    raw.as_deref()
        .map(|s| {
            s.split(',')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

impl FilterQuery {
    pub fn to_spec(&self) -> FilterSpec {
        let date_range = match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => Some(DateRange { start, end }),
            (Some(start), None) => Some(DateRange {
                start,
                end: NaiveDate::MAX,
            }),
            (None, Some(end)) => Some(DateRange {
                start: NaiveDate::MIN,
                end,
            }),
            (None, None) => None,
        };
        FilterSpec {
            date_range,
            categories: split_list(&self.categories),
            locations: split_list(&self.locations),
            product_names: split_list(&self.product_names),
        }
    }
}
