//! Pure filter application
//!
//! Every analysis runs on the output of these functions. Filters never
//! mutate the store; axes intersect independently, so application order
//! does not matter, and an empty result is a valid pipeline input.

use crate::models::{FilterSpec, InboundRecord, SalesRecord, StockRecord, UNKNOWN};

pub fn filter_sales(records: &[SalesRecord], spec: &FilterSpec) -> Vec<SalesRecord> {
    records
        .iter()
        .filter(|r| {
            spec.matches_date(r.timestamp.date())
                && spec.matches_category(&r.attributes.category)
                && spec.matches_location(r.location.as_deref().unwrap_or(UNKNOWN))
                && spec.matches_product_name(&r.product_name)
        })
        .cloned()
        .collect()
}

pub fn filter_inbound(records: &[InboundRecord], spec: &FilterSpec) -> Vec<InboundRecord> {
    records
        .iter()
        .filter(|r| {
            spec.matches_date(r.date)
                && spec.matches_category(&r.attributes.category)
                && spec.matches_product_name(&r.item_name)
        })
        .cloned()
        .collect()
}

/// Stock is a point-in-time position, so the date axis does not apply.
pub fn filter_stock(records: &[StockRecord], spec: &FilterSpec) -> Vec<StockRecord> {
    records
        .iter()
        .filter(|r| {
            spec.matches_category(&r.attributes.category)
                && spec.matches_location(r.location.as_deref().unwrap_or(UNKNOWN))
                && spec.matches_product_name(&r.item_name)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DateRange, SkuAttributes};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn sale(day: u32, category: &str, location: &str, name: &str) -> SalesRecord {
        SalesRecord {
            timestamp: NaiveDate::from_ymd_opt(2024, 3, day)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            transaction_id: format!("TRX-{day}"),
            sku: "SKU".to_string(),
            product_name: name.to_string(),
            quantity: Decimal::ONE,
            unit_price: Decimal::TEN,
            subtotal: Decimal::TEN,
            net_sales: Decimal::TEN,
            cost_of_goods: Decimal::ONE,
            gross_profit: Decimal::from(9),
            channel: None,
            customer_id: None,
            location: Some(location.to_string()),
            attributes: SkuAttributes {
                category: category.to_string(),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_axes_compose_in_any_order() {
        let records = vec![
            sale(1, "T-Shirt", "Gudang A", "Tee"),
            sale(2, "Pants", "Gudang A", "Chino"),
            sale(3, "T-Shirt", "Gudang B", "Tee"),
        ];

        let by_category = FilterSpec {
            categories: vec!["T-Shirt".to_string()],
            ..Default::default()
        };
        let by_location = FilterSpec {
            locations: vec!["Gudang A".to_string()],
            ..Default::default()
        };
        let combined = FilterSpec {
            categories: vec!["T-Shirt".to_string()],
            locations: vec!["Gudang A".to_string()],
            ..Default::default()
        };

        let one_then_other = filter_sales(&filter_sales(&records, &by_category), &by_location);
        let other_then_one = filter_sales(&filter_sales(&records, &by_location), &by_category);
        let at_once = filter_sales(&records, &combined);

        let ids = |rs: &[SalesRecord]| {
            rs.iter().map(|r| r.transaction_id.clone()).collect::<Vec<_>>()
        };
        assert_eq!(ids(&one_then_other), ids(&other_then_one));
        assert_eq!(ids(&one_then_other), ids(&at_once));
        assert_eq!(at_once.len(), 1);
    }

    #[test]
    fn test_date_range_filter() {
        let records = vec![sale(1, "T-Shirt", "A", "Tee"), sale(20, "T-Shirt", "A", "Tee")];
        let spec = FilterSpec {
            date_range: Some(DateRange::new(
                NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
            )),
            ..Default::default()
        };
        assert_eq!(filter_sales(&records, &spec).len(), 1);
    }

    #[test]
    fn test_no_match_yields_empty_not_error() {
        let records = vec![sale(1, "T-Shirt", "A", "Tee")];
        let spec = FilterSpec {
            categories: vec!["Shoes".to_string()],
            ..Default::default()
        };
        assert!(filter_sales(&records, &spec).is_empty());
    }
}
