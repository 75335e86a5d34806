//! Order tables: the raw string snapshot loaded from disk and the typed
//! table the rest of the pipeline operates on.
//!
//! A [`RawTable`] is created once per file. After validation and
//! normalization the [`OrdersTable`] is an immutable snapshot; every filter
//! produces an independent derived table, so repeated KPI or forecast runs
//! over the same filter state see identical input.

use std::ops::RangeInclusive;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};

use crate::io_utils;

/// Loosely-typed table exactly as read from the file: a header row plus
/// string cells. Column validation and typing happen downstream.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Read a CSV/TSV export. Structural read errors propagate; cell
    /// contents are not interpreted here.
    pub fn load(path: &Path, delimiter: Option<u8>) -> Result<Self> {
        let delimiter = io_utils::resolve_input_delimiter(path, delimiter);
        let text = io_utils::read_input_text(path)?;
        let mut reader = io_utils::csv_reader_from_text(&text, delimiter);
        let headers = reader
            .headers()
            .with_context(|| format!("Reading header row from {path:?}"))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        let mut rows = Vec::new();
        for (idx, record) in reader.records().enumerate() {
            let record = record.with_context(|| format!("Reading row {}", idx + 2))?;
            rows.push(record.iter().map(|cell| cell.to_string()).collect());
        }
        Ok(Self { headers, rows })
    }
}

/// One typed order line. The same order id may appear on several lines;
/// nothing here deduplicates.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    pub order: String,
    pub account: String,
    pub name: String,
    pub address: String,
    pub description: String,
    pub line_type: String,
    pub entered: Option<NaiveDate>,
    pub sent: Option<NaiveDate>,
    pub qty: Option<f64>,
    pub list: Option<f64>,
    pub nett: Option<f64>,
    pub cost: Option<f64>,
    pub route: String,
    pub reference: String,
    pub price_list: String,
    pub foc: String,
    pub order_type: String,
    pub promo: String,
    pub gross_margin: Option<f64>,
    pub margin_pct: Option<f64>,
}

/// Typed, normalized table. Filters return new tables and leave the
/// original untouched.
#[derive(Debug, Clone, Default)]
pub struct OrdersTable {
    rows: Vec<OrderRecord>,
}

impl OrdersTable {
    pub fn new(rows: Vec<OrderRecord>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[OrderRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Keep rows whose `Entered` date falls inside the inclusive range.
    /// Rows without an entry date drop out as soon as either bound is set.
    pub fn filter_entered(&self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        if from.is_none() && to.is_none() {
            return self.clone();
        }
        let rows = self
            .rows
            .iter()
            .filter(|row| match row.entered {
                Some(date) => {
                    from.is_none_or(|f| date >= f) && to.is_none_or(|t| date <= t)
                }
                None => false,
            })
            .cloned()
            .collect();
        Self { rows }
    }

    pub fn filter_customer(&self, name: &str) -> Self {
        let rows = self
            .rows
            .iter()
            .filter(|row| row.name == name)
            .cloned()
            .collect();
        Self { rows }
    }

    pub fn filter_order_type(&self, order_type: &str) -> Self {
        let rows = self
            .rows
            .iter()
            .filter(|row| row.order_type == order_type)
            .cloned()
            .collect();
        Self { rows }
    }

    pub fn max_entered(&self) -> Option<NaiveDate> {
        self.rows.iter().filter_map(|row| row.entered).max()
    }

    /// Years spanned by any date in the table, used to size the holiday
    /// calendar. `None` when no row carries a date.
    pub fn year_span(&self) -> Option<RangeInclusive<i32>> {
        let years: Vec<i32> = self
            .rows
            .iter()
            .flat_map(|row| [row.entered, row.sent])
            .flatten()
            .map(|date| date.year())
            .collect();
        let min = years.iter().min()?;
        let max = years.iter().max()?;
        Some(*min..=*max)
    }
}
