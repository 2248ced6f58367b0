//! Typed result tables.
//!
//! Maps the engine's driver-reported column schema onto a typed in-memory
//! table. Temporal-tagged columns are parsed into chrono values; every
//! other column passes through in its driver-native representation.

use crate::error::{QuarryError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A value as the engine's JSON protocol delivers it.
pub type RawValue = serde_json::Value;

/// Metadata about a column in a result set.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColumnInfo {
    /// Column name.
    pub name: String,

    /// Column type tag as the engine reports it (e.g. "varchar", "date").
    pub type_tag: String,
}

impl ColumnInfo {
    /// Creates a new column info with the given name and type tag.
    pub fn new(name: impl Into<String>, type_tag: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_tag: type_tag.into(),
        }
    }

    /// Returns true if this column's tag marks it as temporal.
    ///
    /// Parameterized and zoned forms ("timestamp(3)", "timestamp with time
    /// zone") coerce like their base tag.
    pub fn is_temporal(&self) -> bool {
        matches!(base_type_tag(&self.type_tag), "timestamp" | "date")
    }
}

/// Strips parameters and qualifiers from a type tag.
fn base_type_tag(tag: &str) -> &str {
    let end = tag
        .find(|c: char| c == '(' || c.is_whitespace())
        .unwrap_or(tag.len());
    &tag[..end]
}

/// A single cell in a typed table.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub enum CellValue {
    /// NULL value.
    #[default]
    Null,

    /// Boolean value.
    Bool(bool),

    /// Signed integer (up to i64).
    Int(i64),

    /// Floating point number.
    Float(f64),

    /// Text/string value.
    Str(String),

    /// Parsed calendar date.
    Date(NaiveDate),

    /// Parsed timestamp (naive; zoned inputs are normalized to UTC).
    Timestamp(NaiveDateTime),

    /// Structural or otherwise opaque value, kept as the driver sent it.
    Other(RawValue),
}

impl CellValue {
    /// Returns true if this value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// String representation for display.
    pub fn to_display_string(&self) -> String {
        match self {
            CellValue::Null => "NULL".to_string(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Int(i) => i.to_string(),
            CellValue::Float(f) => f.to_string(),
            CellValue::Str(s) => s.clone(),
            CellValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            CellValue::Timestamp(ts) => ts.format("%Y-%m-%d %H:%M:%S%.f").to_string(),
            CellValue::Other(v) => v.to_string(),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_display_string())
    }
}

impl From<bool> for CellValue {
    fn from(v: bool) -> Self {
        CellValue::Bool(v)
    }
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        CellValue::Int(v)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Float(v)
    }
}

impl From<&str> for CellValue {
    fn from(v: &str) -> Self {
        CellValue::Str(v.to_string())
    }
}

impl From<NaiveDate> for CellValue {
    fn from(v: NaiveDate) -> Self {
        CellValue::Date(v)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(v: NaiveDateTime) -> Self {
        CellValue::Timestamp(v)
    }
}

/// A row of typed cells.
pub type TypedRow = Vec<CellValue>;

/// The final output of a query run: columns plus per-column-coerced rows.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TypedTable {
    /// Column metadata, in result order.
    pub columns: Vec<ColumnInfo>,

    /// Rows of typed cells, positionally aligned with `columns`.
    pub rows: Vec<TypedRow>,
}

impl TypedTable {
    /// Builds a typed table from driver-reported columns and raw rows.
    ///
    /// Temporal-tagged columns are parsed cell by cell; an unparseable
    /// non-null value fails the whole build with a coercion error rather
    /// than silently producing nulls. All other columns pass through.
    pub fn from_raw(columns: Vec<ColumnInfo>, raw_rows: Vec<Vec<RawValue>>) -> Result<Self> {
        let mut rows = Vec::with_capacity(raw_rows.len());

        for (row_index, raw_row) in raw_rows.into_iter().enumerate() {
            if raw_row.len() != columns.len() {
                return Err(QuarryError::internal(format!(
                    "row {row_index} has {} value(s) for {} column(s)",
                    raw_row.len(),
                    columns.len()
                )));
            }
            let mut row = Vec::with_capacity(columns.len());
            for (column, raw) in columns.iter().zip(raw_row) {
                let cell = if column.is_temporal() {
                    coerce_temporal(column, &raw)?
                } else {
                    passthrough(raw)
                };
                row.push(cell);
            }
            rows.push(row);
        }

        Ok(Self { columns, rows })
    }

    /// Returns true if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Column names in result order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

/// Detects the driver's non-row-returning acknowledgment.
///
/// After a statement that produces no result set (CREATE TABLE, INSERT,
/// ...) the driver reports a single row `[true]` under a lone column named
/// "results". That shape means "no table", not a one-cell boolean table.
/// Known driver quirk; keep the detection exact.
pub fn is_ack(columns: &[ColumnInfo], rows: &[Vec<RawValue>]) -> bool {
    rows.len() == 1
        && rows[0].len() == 1
        && rows[0][0] == RawValue::Bool(true)
        && columns.len() == 1
        && columns[0].name == "results"
}

/// Parses a temporal-tagged cell into a Date or Timestamp value.
fn coerce_temporal(column: &ColumnInfo, raw: &RawValue) -> Result<CellValue> {
    if raw.is_null() {
        return Ok(CellValue::Null);
    }

    let text = raw.as_str().ok_or_else(|| {
        QuarryError::coercion(format!(
            "column '{}' ({}): expected a string value, got {raw}",
            column.name, column.type_tag
        ))
    })?;

    match base_type_tag(&column.type_tag) {
        "date" => parse_date(text).map(CellValue::Date),
        _ => parse_timestamp(text).map(CellValue::Timestamp),
    }
    .ok_or_else(|| {
        QuarryError::coercion(format!(
            "column '{}' ({}): '{text}' is not a valid {}",
            column.name,
            column.type_tag,
            base_type_tag(&column.type_tag)
        ))
    })
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
}

fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    // Space-separated first (the engine's usual form), then ISO 8601,
    // then offset-bearing zoned forms normalized to UTC.
    if let Ok(ts) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(ts);
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(ts);
    }
    if let Ok(ts) = DateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f %z") {
        return Some(ts.naive_utc());
    }
    if let Ok(ts) = DateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(ts.naive_utc());
    }
    None
}

/// Maps a driver-native JSON value onto a cell without transformation.
fn passthrough(raw: RawValue) -> CellValue {
    match raw {
        RawValue::Null => CellValue::Null,
        RawValue::Bool(b) => CellValue::Bool(b),
        RawValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Int(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::Other(RawValue::Number(n))
            }
        }
        RawValue::String(s) => CellValue::Str(s),
        // Arrays, maps and rows stay in their wire shape.
        other => CellValue::Other(other),
    }
}
