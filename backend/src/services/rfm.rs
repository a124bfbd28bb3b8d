//! RFM customer segmentation
//!
//! Recency / Frequency / Monetary scoring over the filtered sales slice.
//! The reference date is the day after the latest transaction in the slice,
//! so a customer who bought on the last day has recency 1. Scores are
//! quantile buckets 1..=q; when there are fewer distinct values than
//! buckets, a scaled dense rank keeps the scoring total and deterministic.

use std::collections::{BTreeMap, HashSet};

use chrono::{Days, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::SalesRecord;

/// Scored customer
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RfmScore {
    pub customer_id: String,
    pub recency_days: i64,
    pub frequency: u64,
    pub monetary: Decimal,
    pub r_score: u32,
    pub f_score: u32,
    pub m_score: u32,
    pub segment: String,
}

struct CustomerAggregate {
    last_purchase: NaiveDate,
    transactions: HashSet<String>,
    monetary: Decimal,
}

/// Segment customers into `buckets` quantile scores per axis. Rows without
/// a customer id are ignored. Output is sorted by customer id, so repeated
/// runs over the same slice produce identical results.
pub fn rfm_segmentation(sales: &[SalesRecord], buckets: u32) -> Vec<RfmScore> {
    let buckets = buckets.max(2);

    let mut customers: BTreeMap<String, CustomerAggregate> = BTreeMap::new();
    let mut latest: Option<NaiveDate> = None;

    for record in sales {
        let Some(customer_id) = record.customer_id.as_deref().filter(|c| !c.is_empty()) else {
            continue;
        };
        let date = record.timestamp.date();
        latest = Some(latest.map_or(date, |l| l.max(date)));

        let entry = customers
            .entry(customer_id.to_string())
            .or_insert_with(|| CustomerAggregate {
                last_purchase: date,
                transactions: HashSet::new(),
                monetary: Decimal::ZERO,
            });
        entry.last_purchase = entry.last_purchase.max(date);
        entry.transactions.insert(record.transaction_id.clone());
        entry.monetary += record.net_sales;
    }

    let Some(latest) = latest else {
        return Vec::new();
    };
    let reference = latest.checked_add_days(Days::new(1)).unwrap_or(latest);

    let ids: Vec<String> = customers.keys().cloned().collect();
    let recency: Vec<f64> = ids
        .iter()
        .map(|id| (reference - customers[id].last_purchase).num_days() as f64)
        .collect();
    let frequency: Vec<f64> = ids
        .iter()
        .map(|id| customers[id].transactions.len() as f64)
        .collect();
    let monetary: Vec<f64> = ids
        .iter()
        .map(|id| customers[id].monetary.to_f64().unwrap_or(0.0))
        .collect();

    // Low recency is good, so its scores invert
    let r_scores: Vec<u32> = quantile_scores(&recency, buckets)
        .into_iter()
        .map(|s| buckets + 1 - s)
        .collect();
    let f_scores = quantile_scores(&frequency, buckets);
    let m_scores = quantile_scores(&monetary, buckets);

    ids.into_iter()
        .enumerate()
        .map(|(i, customer_id)| {
            let aggregate = &customers[&customer_id];
            let (r, f, m) = (r_scores[i], f_scores[i], m_scores[i]);
            RfmScore {
                customer_id,
                recency_days: recency[i] as i64,
                frequency: aggregate.transactions.len() as u64,
                monetary: aggregate.monetary,
                r_score: r,
                f_score: f,
                m_score: m,
                segment: segment_label(r, f, m).to_string(),
            }
        })
        .collect()
}

/// Quantile bucket 1..=q per value, ascending (higher value, higher score).
/// With fewer distinct values than buckets, falls back to a dense rank
/// scaled onto 1..=q.
fn quantile_scores(values: &[f64], q: u32) -> Vec<u32> {
    let n = values.len();
    if n == 0 {
        return Vec::new();
    }

    let mut distinct: Vec<f64> = values.to_vec();
    distinct.sort_by(|a, b| a.total_cmp(b));
    distinct.dedup();
    let d = distinct.len();

    if d < q as usize {
        // Scaled dense rank: rank r of d maps onto ceil(r * q / d)
        return values
            .iter()
            .map(|v| {
                let rank = distinct.partition_point(|x| x < v) + 1;
                ((rank * q as usize).div_ceil(d)) as u32
            })
            .collect();
    }

    // Midrank-based quantile bucket
    values
        .iter()
        .map(|v| {
            let below = values.iter().filter(|x| *x < v).count() as f64;
            let equal = values.iter().filter(|x| *x == v).count() as f64;
            let midrank = below + (equal + 1.0) / 2.0;
            let pct = midrank / n as f64;
            ((pct * q as f64).ceil() as u32).clamp(1, q)
        })
        .collect()
}

/// Fixed rule table over (R, F, M), evaluated top to bottom.
fn segment_label(r: u32, f: u32, m: u32) -> &'static str {
    if r >= 4 && f >= 4 && m >= 4 {
        "Champions"
    } else if f >= 3 && m >= 3 && r >= 2 {
        "Loyal Customers"
    } else if f >= 3 && m >= 3 {
        "At Risk"
    } else if r >= 3 && f <= 2 && m <= 2 {
        "New Customers"
    } else {
        "Others"
    }
}
