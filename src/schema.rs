//! Fixed column schema for ERP order exports and structural validation.
//!
//! The export layout is not negotiable: every file must carry the same 18
//! columns, each with a declared semantic kind that drives normalization.
//! Validation runs once at load time; downstream code works with typed
//! records and never looks up columns by name again.

use log::error;
use thiserror::Error;

/// Semantic kind of a source column, used by the normalizer to decide how a
/// raw cell is coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Day-first calendar date, possibly with a time component.
    Date,
    /// Nullable floating-point quantity or monetary amount.
    Numeric,
    /// Small fixed domain of values used for filtering and breakdowns.
    Category,
    /// Free text carried through untouched.
    Text,
}

/// A required source column and its semantic kind.
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub kind: ColumnKind,
}

/// Required columns in canonical order. Missing-column errors report names
/// in this order regardless of the order they appear in the file.
pub const REQUIRED_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec { name: "Order", kind: ColumnKind::Text },
    ColumnSpec { name: "Account", kind: ColumnKind::Text },
    ColumnSpec { name: "Name", kind: ColumnKind::Text },
    ColumnSpec { name: "Address", kind: ColumnKind::Text },
    ColumnSpec { name: "Description", kind: ColumnKind::Text },
    ColumnSpec { name: "Type", kind: ColumnKind::Category },
    ColumnSpec { name: "Entered", kind: ColumnKind::Date },
    ColumnSpec { name: "Sent", kind: ColumnKind::Date },
    ColumnSpec { name: "Qty", kind: ColumnKind::Numeric },
    ColumnSpec { name: "List", kind: ColumnKind::Numeric },
    ColumnSpec { name: "Nett", kind: ColumnKind::Numeric },
    ColumnSpec { name: "Cost", kind: ColumnKind::Numeric },
    ColumnSpec { name: "Route", kind: ColumnKind::Category },
    ColumnSpec { name: "Reference", kind: ColumnKind::Text },
    ColumnSpec { name: "P'list", kind: ColumnKind::Text },
    ColumnSpec { name: "FOC", kind: ColumnKind::Category },
    ColumnSpec { name: "O/T", kind: ColumnKind::Category },
    ColumnSpec { name: "Promo", kind: ColumnKind::Category },
];

/// Fatal structural error: one or more required columns are absent.
///
/// Carries the missing names in canonical order so callers can render the
/// exact set, comma-joined, the way the dashboard surfaces it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Missing required columns: {}", .missing.join(", "))]
pub struct SchemaError {
    pub missing: Vec<String>,
}

/// Verify that `headers` contains every required column. Extra columns are
/// ignored. Normalization must never run on a table that fails this check.
pub fn validate_columns(headers: &[String]) -> Result<(), SchemaError> {
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|spec| !headers.iter().any(|h| h == spec.name))
        .map(|spec| spec.name.to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        let err = SchemaError { missing };
        error!("{err}");
        Err(err)
    }
}

/// Position of each required column within the file's actual header row.
/// Only valid after [`validate_columns`] has passed.
pub fn column_positions(headers: &[String]) -> Vec<usize> {
    REQUIRED_COLUMNS
        .iter()
        .map(|spec| {
            headers
                .iter()
                .position(|h| h == spec.name)
                .expect("validated header set")
        })
        .collect()
}

pub fn required_names() -> Vec<String> {
    REQUIRED_COLUMNS
        .iter()
        .map(|spec| spec.name.to_string())
        .collect()
}
