//! Monthly sales forecasting
//!
//! All models sit behind one entry point taking the series, the horizon,
//! and a [`ForecastModel`]. Series come from the filtered sales slice
//! resampled to calendar months; quantity and revenue gaps are zero-filled
//! (a month without sales is a real zero), price gaps carry the last
//! observation forward. Model fits are plain least squares over f64, small
//! enough to stay dependency-free.

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{AppError, AppResult};
use crate::models::SalesRecord;
use crate::services::metrics::{month_floor, next_month};

/// Available forecasting models
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ForecastModel {
    MovingAverage,
    Ets,
    Arima,
    Seasonal,
}

impl ForecastModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ForecastModel::MovingAverage => "moving_average",
            ForecastModel::Ets => "ets",
            ForecastModel::Arima => "arima",
            ForecastModel::Seasonal => "seasonal",
        }
    }
}

/// What a series measures, which decides how resampling fills gaps
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SeriesKind {
    Quantity,
    NetSales,
    UnitPrice,
}

/// One observed month
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SeriesPoint {
    pub month: NaiveDate,
    pub value: f64,
}

/// One forecast month with an optional confidence band
#[derive(Debug, Clone, Serialize)]
pub struct ForecastPoint {
    pub month: NaiveDate,
    pub value: f64,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

const Z_95: f64 = 1.96;

/// Resample sales to a monthly series of the requested kind. Interior gap
/// months are zero-filled for quantity and revenue, forward-filled for
/// prices.
pub fn monthly_series(sales: &[SalesRecord], kind: SeriesKind) -> Vec<SeriesPoint> {
    let mut groups: BTreeMap<NaiveDate, (f64, u64)> = BTreeMap::new();
    for record in sales {
        let month = month_floor(record.timestamp.date());
        let value = match kind {
            SeriesKind::Quantity => record.quantity.to_f64().unwrap_or(0.0),
            SeriesKind::NetSales => record.net_sales.to_f64().unwrap_or(0.0),
            SeriesKind::UnitPrice => record.unit_price.to_f64().unwrap_or(0.0),
        };
        let entry = groups.entry(month).or_default();
        entry.0 += value;
        entry.1 += 1;
    }

    let (Some(&first), Some(&last)) = (groups.keys().next(), groups.keys().next_back()) else {
        return Vec::new();
    };

    let mut points = Vec::new();
    let mut month = first;
    let mut last_price = 0.0;
    while month <= last {
        let value = match (groups.get(&month), kind) {
            (Some(&(sum, count)), SeriesKind::UnitPrice) => {
                last_price = sum / count.max(1) as f64;
                last_price
            }
            (Some(&(sum, _)), _) => sum,
            (None, SeriesKind::UnitPrice) => last_price,
            (None, _) => 0.0,
        };
        points.push(SeriesPoint { month, value });
        month = next_month(month);
    }
    points
}

/// Minimum observed months each model needs before it will fit.
pub fn minimum_points(model: ForecastModel, ma_window: usize) -> usize {
    match model {
        ForecastModel::MovingAverage => ma_window.max(1),
        ForecastModel::Ets => 2,
        ForecastModel::Arima => 4,
        ForecastModel::Seasonal => 2,
    }
}

/// Forecast `horizon` months past the end of the series.
pub fn forecast(
    series: &[SeriesPoint],
    horizon: usize,
    model: ForecastModel,
    ma_window: usize,
) -> AppResult<Vec<ForecastPoint>> {
    let required = minimum_points(model, ma_window);
    if series.len() < required {
        return Err(AppError::InsufficientData {
            model: model.as_str().to_string(),
            required,
            available: series.len(),
        });
    }

    let values: Vec<f64> = series.iter().map(|p| p.value).collect();
    let start = series
        .last()
        .map(|p| next_month(p.month))
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default());

    let points = match model {
        ForecastModel::MovingAverage => moving_average(&values, horizon, ma_window),
        ForecastModel::Ets => holt_linear(&values, horizon),
        ForecastModel::Arima => differenced_ar(&values, horizon),
        ForecastModel::Seasonal => trend_and_season(series, &values, horizon),
    };

    let mut month = start;
    Ok(points
        .into_iter()
        .map(|(value, sigma)| {
            let point = ForecastPoint {
                month,
                value,
                lower: sigma.map(|s| value - Z_95 * s),
                upper: sigma.map(|s| value + Z_95 * s),
            };
            month = next_month(month);
            point
        })
        .collect())
}

/// Trailing-window mean projected flat. A flat series forecasts its own
/// value exactly; no confidence band.
fn moving_average(values: &[f64], horizon: usize, window: usize) -> Vec<(f64, Option<f64>)> {
    let window = window.max(1).min(values.len());
    let tail = &values[values.len() - window..];
    let mean = tail.iter().sum::<f64>() / window as f64;
    (0..horizon).map(|_| (mean, None)).collect()
}

/// Holt's linear additive smoothing.
fn holt_linear(values: &[f64], horizon: usize) -> Vec<(f64, Option<f64>)> {
    const ALPHA: f64 = 0.5;
    const BETA: f64 = 0.3;

    let mut level = values[0];
    let mut trend = values[1] - values[0];
    let mut residuals = Vec::with_capacity(values.len());

    for &observed in &values[1..] {
        let predicted = level + trend;
        residuals.push(observed - predicted);
        let previous_level = level;
        level = ALPHA * observed + (1.0 - ALPHA) * (level + trend);
        trend = BETA * (level - previous_level) + (1.0 - BETA) * trend;
    }

    let sigma = std_dev(&residuals);
    (1..=horizon)
        .map(|h| {
            (
                level + h as f64 * trend,
                sigma.map(|s| s * (h as f64).sqrt()),
            )
        })
        .collect()
}

/// AR(1) with drift on the differenced series, fit by least squares, then
/// integrated back onto the last observation.
fn differenced_ar(values: &[f64], horizon: usize) -> Vec<(f64, Option<f64>)> {
    let diffs: Vec<f64> = values.windows(2).map(|w| w[1] - w[0]).collect();

    // Regress d_t on d_{t-1}
    let xs: Vec<f64> = diffs[..diffs.len() - 1].to_vec();
    let ys: Vec<f64> = diffs[1..].to_vec();
    let (intercept, slope) = linear_fit(&xs, &ys);

    let residuals: Vec<f64> = xs
        .iter()
        .zip(&ys)
        .map(|(x, y)| y - (intercept + slope * x))
        .collect();
    let sigma = std_dev(&residuals);

    let mut last_value = values[values.len() - 1];
    let mut last_diff = diffs[diffs.len() - 1];
    (1..=horizon)
        .map(|h| {
            last_diff = intercept + slope * last_diff;
            last_value += last_diff;
            (last_value, sigma.map(|s| s * (h as f64).sqrt()))
        })
        .collect()
}

/// Additive trend plus monthly seasonal components. Seasonality only kicks
/// in with two full years of history; below that it degrades to the plain
/// trend line.
fn trend_and_season(
    series: &[SeriesPoint],
    values: &[f64],
    horizon: usize,
) -> Vec<(f64, Option<f64>)> {
    use chrono::Datelike;

    let xs: Vec<f64> = (0..values.len()).map(|i| i as f64).collect();
    let (intercept, slope) = linear_fit(&xs, values);

    let mut seasonal = [0.0f64; 12];
    if values.len() >= 24 {
        let mut sums = [0.0f64; 12];
        let mut counts = [0u32; 12];
        for (i, point) in series.iter().enumerate() {
            let month_index = (point.month.month0()) as usize;
            sums[month_index] += values[i] - (intercept + slope * i as f64);
            counts[month_index] += 1;
        }
        for i in 0..12 {
            if counts[i] > 0 {
                seasonal[i] = sums[i] / counts[i] as f64;
            }
        }
    }

    let residuals: Vec<f64> = series
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let month_index = point.month.month0() as usize;
            values[i] - (intercept + slope * i as f64 + seasonal[month_index])
        })
        .collect();
    let sigma = std_dev(&residuals);

    let last_month = series[series.len() - 1].month;
    let mut month = last_month;
    (1..=horizon)
        .map(|h| {
            month = next_month(month);
            let t = (values.len() - 1 + h) as f64;
            let month_index = month.month0() as usize;
            (intercept + slope * t + seasonal[month_index], sigma)
        })
        .collect()
}

fn linear_fit(xs: &[f64], ys: &[f64]) -> (f64, f64) {
    let n = xs.len() as f64;
    if xs.is_empty() {
        return (0.0, 0.0);
    }
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;
    let mut cov = 0.0;
    let mut var = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        cov += (x - mean_x) * (y - mean_y);
        var += (x - mean_x) * (x - mean_x);
    }
    if var == 0.0 {
        (mean_y, 0.0)
    } else {
        let slope = cov / var;
        (mean_y - slope * mean_x, slope)
    }
}

fn std_dev(residuals: &[f64]) -> Option<f64> {
    if residuals.len() < 2 {
        return None;
    }
    let n = residuals.len() as f64;
    let mean = residuals.iter().sum::<f64>() / n;
    let var = residuals.iter().map(|r| (r - mean) * (r - mean)).sum::<f64>() / (n - 1.0);
    Some(var.sqrt())
}
