//! The normalizer: validated raw table in, typed table out.
//!
//! Pure transform. Row count is preserved, no column is removed, and the
//! only additions are the derived margin fields. Per-cell parse failures
//! degrade to `None` and are counted, never raised; structural problems are
//! the schema validator's job and cannot reach this far.

use log::{debug, info};

use crate::{
    data::{self, STRICT_DATE_FORMATS},
    orders::{OrderRecord, OrdersTable, RawTable},
    schema,
};

/// How a date column ends up parsed: one strict format for the whole
/// column, or per-cell lenient coercion when no strict format fits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DateMode {
    Strict(&'static str),
    Lenient,
}

/// Normalize a schema-validated raw table into typed order records.
pub fn normalize(raw: &RawTable) -> OrdersTable {
    let positions = schema::column_positions(&raw.headers);
    let cell = |row: &[String], col: usize| -> String {
        row.get(positions[col]).map_or(String::new(), |s| s.trim().to_string())
    };

    // Column indices follow schema::REQUIRED_COLUMNS order.
    const ENTERED: usize = 6;
    const SENT: usize = 7;

    let entered_mode = select_date_mode(raw, positions[ENTERED]);
    let sent_mode = select_date_mode(raw, positions[SENT]);
    debug!("Date parse modes: Entered {entered_mode:?}, Sent {sent_mode:?}");

    let mut degraded = 0usize;
    let mut coerce_date = |value: &str, mode: DateMode| {
        if value.is_empty() {
            return None;
        }
        let parsed = match mode {
            DateMode::Strict(fmt) => data::parse_date_strict(value, fmt),
            DateMode::Lenient => data::parse_date_lenient(value),
        };
        if parsed.is_none() {
            degraded += 1;
        }
        parsed
    };

    let mut rows = Vec::with_capacity(raw.rows.len());
    for row in &raw.rows {
        let entered = coerce_date(&cell(row, ENTERED), entered_mode);
        let sent = coerce_date(&cell(row, SENT), sent_mode);
        let qty = data::parse_numeric(&cell(row, 8));
        let list = data::parse_numeric(&cell(row, 9));
        let nett = data::parse_numeric(&cell(row, 10));
        let cost = data::parse_numeric(&cell(row, 11));
        let (gross_margin, margin_pct) = derive_margins(nett, cost);

        rows.push(OrderRecord {
            order: cell(row, 0),
            account: cell(row, 1),
            name: cell(row, 2),
            address: cell(row, 3),
            description: cell(row, 4),
            line_type: cell(row, 5),
            entered,
            sent,
            qty,
            list,
            nett,
            cost,
            route: cell(row, 12),
            reference: cell(row, 13),
            price_list: cell(row, 14),
            foc: cell(row, 15),
            order_type: cell(row, 16),
            promo: cell(row, 17),
            gross_margin,
            margin_pct,
        });
    }

    if degraded > 0 {
        debug!("{degraded} date cell(s) failed to parse and were nulled");
    }
    info!("Normalized {} row(s)", rows.len());
    OrdersTable::new(rows)
}

/// Pick the first strict format that parses every non-empty cell of the
/// column; fall back to lenient when none does.
fn select_date_mode(raw: &RawTable, position: usize) -> DateMode {
    let cells = || {
        raw.rows
            .iter()
            .filter_map(|row| row.get(position))
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    };
    if cells().next().is_none() {
        // Column is entirely empty; strict default keeps behavior stable.
        return DateMode::Strict(STRICT_DATE_FORMATS[0]);
    }
    for &fmt in STRICT_DATE_FORMATS {
        if cells().all(|value| data::parse_date_strict(value, fmt).is_some()) {
            return DateMode::Strict(fmt);
        }
    }
    DateMode::Lenient
}

/// `Gross_Margin = Nett - Cost`; `Margin_% = round(margin / nett * 100, 1)`
/// defined only where `Nett` is present and non-zero.
fn derive_margins(nett: Option<f64>, cost: Option<f64>) -> (Option<f64>, Option<f64>) {
    let gross_margin = match (nett, cost) {
        (Some(n), Some(c)) => Some(n - c),
        _ => None,
    };
    let margin_pct = match (gross_margin, nett) {
        (Some(margin), Some(n)) if n != 0.0 => Some(data::round1(margin / n * 100.0)),
        _ => None,
    };
    (gross_margin, margin_pct)
}
