//! KPI and advanced-metric aggregation over a typed orders table.
//!
//! Every function here is a pure summary of whatever table it is handed;
//! filtering is the caller's business. Empty or degenerate input never
//! panics: each KPI has a defined zero value and the forecast degrades to
//! empty series.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Duration, NaiveDate};
use itertools::Itertools;
use log::{info, warn};
use serde::Serialize;

use crate::{
    forecast::{self, DailyPoint, ForecastSeries},
    holidays::{HolidayCalendar, business_days_between},
    orders::OrdersTable,
};

/// Days without an order after which a customer counts as inactive,
/// relative to the table's most recent entry date.
const INACTIVITY_WINDOW_DAYS: i64 = 30;

/// Rolling window width for the smoothing diagnostic, in grouped periods.
const ROLLING_WINDOW: usize = 7;

/// Top-level dashboard card values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpis {
    #[serde(rename = "Total Nett Sales")]
    pub total_nett_sales: f64,
    #[serde(rename = "Total Orders")]
    pub total_orders: usize,
    #[serde(rename = "Total Units Sold")]
    pub total_units: f64,
    #[serde(rename = "Average Order Value")]
    pub avg_order_value: f64,
    #[serde(rename = "Average Margin %")]
    pub avg_margin_pct: f64,
    #[serde(rename = "Average Turnaround")]
    pub avg_turnaround_days: f64,
}

/// One point of the rolling-mean diagnostic. `value` is `None` until the
/// window has filled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RollingPoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

/// Moving averages, inactivity, anomaly flags, and the delegated forecast.
#[derive(Debug, Clone, Serialize)]
pub struct AdvancedMetrics {
    #[serde(rename = "7d_ma")]
    pub ma7: Vec<RollingPoint>,
    pub inactive_customers: Vec<String>,
    pub low_days: Vec<NaiveDate>,
    pub forecast: ForecastSeries,
    pub forecast_orders: ForecastSeries,
}

/// Compute the six dashboard KPIs. The holiday calendar feeds the
/// business-day turnaround metric.
pub fn compute_kpis(table: &OrdersTable, holidays: &HolidayCalendar) -> Kpis {
    let rows = table.rows();

    let total_nett_sales: f64 = rows.iter().filter_map(|r| r.nett).sum();
    let total_orders = rows
        .iter()
        .map(|r| r.order.as_str())
        .filter(|order| !order.is_empty())
        .unique()
        .count();
    let total_units: f64 = rows.iter().filter_map(|r| r.qty).sum();
    let avg_order_value = if total_orders > 0 {
        total_nett_sales / total_orders as f64
    } else {
        0.0
    };
    let avg_margin_pct =
        mean(rows.iter().filter_map(|r| r.margin_pct)).unwrap_or(0.0);

    let mut inverted = 0usize;
    let turnarounds = rows.iter().filter_map(|row| {
        let (entered, sent) = (row.entered?, row.sent?);
        if sent < entered {
            inverted += 1;
            return None;
        }
        let days = business_days_between(entered, sent, holidays);
        // Inclusive range minus one: same-day dispatch is zero turnaround.
        Some(days.saturating_sub(1) as f64)
    });
    let avg_turnaround_days = mean(turnarounds).unwrap_or(0.0);
    if inverted > 0 {
        warn!("{inverted} row(s) dispatched before entry were excluded from turnaround");
    }

    Kpis {
        total_nett_sales,
        total_orders,
        total_units,
        avg_order_value,
        avg_margin_pct,
        avg_turnaround_days,
    }
}

/// Compute the advanced metric set, delegating the two-series forecast.
pub fn compute_advanced_metrics(table: &OrdersTable, forecast_days: usize) -> AdvancedMetrics {
    let daily_nett = daily_nett_totals(table);
    let daily_orders = daily_order_counts(table);

    let ma7 = rolling_mean(&daily_nett, ROLLING_WINDOW);
    let inactive_customers = inactive_customers(table);
    let low_days = low_days(&daily_nett);
    let (forecast, forecast_orders) =
        forecast::forecast_pair(&daily_nett, &daily_orders, forecast_days);

    info!(
        "Advanced metrics over {} observed day(s): {} inactive customer(s), {} low day(s), forecast {}",
        daily_nett.len(),
        inactive_customers.len(),
        low_days.len(),
        if forecast.is_empty() { "skipped" } else { "fitted" },
    );

    AdvancedMetrics {
        ma7,
        inactive_customers,
        low_days,
        forecast,
        forecast_orders,
    }
}

/// Daily summed Nett keyed on `Entered`. A dated row with no Nett still
/// registers the day (contributing zero), matching row-summing semantics.
pub fn daily_nett_totals(table: &OrdersTable) -> Vec<DailyPoint> {
    let mut totals: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for row in table.rows() {
        if let Some(date) = row.entered {
            *totals.entry(date).or_insert(0.0) += row.nett.unwrap_or(0.0);
        }
    }
    totals
        .into_iter()
        .map(|(date, value)| DailyPoint { date, value })
        .collect()
}

/// Daily distinct order counts keyed on `Entered`.
pub fn daily_order_counts(table: &OrdersTable) -> Vec<DailyPoint> {
    let mut per_day: BTreeMap<NaiveDate, BTreeSet<&str>> = BTreeMap::new();
    for row in table.rows() {
        if let Some(date) = row.entered
            && !row.order.is_empty()
        {
            per_day.entry(date).or_default().insert(row.order.as_str());
        }
    }
    per_day
        .into_iter()
        .map(|(date, orders)| DailyPoint {
            date,
            value: orders.len() as f64,
        })
        .collect()
}

/// Positional rolling mean over the date-sorted daily series. The first
/// `window - 1` points carry `None`.
fn rolling_mean(daily: &[DailyPoint], window: usize) -> Vec<RollingPoint> {
    daily
        .iter()
        .enumerate()
        .map(|(idx, point)| {
            let value = if idx + 1 >= window {
                let slice = &daily[idx + 1 - window..=idx];
                mean(slice.iter().map(|p| p.value))
            } else {
                None
            };
            RollingPoint {
                date: point.date,
                value,
            }
        })
        .collect()
}

/// Customers present in the table with no order dated within the last 30
/// days of the table's own timeline. Sorted for deterministic output.
fn inactive_customers(table: &OrdersTable) -> Vec<String> {
    let Some(max_entered) = table.max_entered() else {
        return Vec::new();
    };
    let cutoff = max_entered - Duration::days(INACTIVITY_WINDOW_DAYS);
    let recent: BTreeSet<&str> = table
        .rows()
        .iter()
        .filter(|row| row.entered.is_some_and(|date| date > cutoff))
        .map(|row| row.name.as_str())
        .collect();
    table
        .rows()
        .iter()
        .map(|row| row.name.as_str())
        .filter(|name| !name.is_empty() && !recent.contains(name))
        .unique()
        .sorted()
        .map(str::to_string)
        .collect()
}

/// Dates whose total is more than two sample standard deviations below the
/// mean daily total. Needs at least two observed days.
fn low_days(daily: &[DailyPoint]) -> Vec<NaiveDate> {
    if daily.len() < 2 {
        return Vec::new();
    }
    let values: Vec<f64> = daily.iter().map(|p| p.value).collect();
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let variance = values
        .iter()
        .map(|v| (v - mean) * (v - mean))
        .sum::<f64>()
        / (values.len() as f64 - 1.0);
    let std_dev = variance.max(0.0).sqrt();
    let threshold = mean - 2.0 * std_dev;
    daily
        .iter()
        .filter(|p| p.value < threshold)
        .map(|p| p.date)
        .collect()
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let mut sum = 0.0;
    let mut count = 0usize;
    for value in values {
        sum += value;
        count += 1;
    }
    (count > 0).then(|| sum / count as f64)
}
