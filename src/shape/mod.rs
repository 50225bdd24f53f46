// src/shape/mod.rs
//! Turns whatever the execution endpoint sent back into a [`Table`].
//!
//! The wire contract is not fixed, so a payload is matched against a fixed,
//! ordered list of shapes and the first match wins:
//!
//! 1. `{columns: [..], rows: [..]}`
//! 2. `{rows: [..]}` without usable columns
//! 3. `[{..}, {..}]` record objects
//! 4. `[columns, rows]` / `[rows, columns]` tuples
//! 5. `[[..], [..]]` plain matrices
//! 6. anything else → one `data` column
//!
//! String payloads go through [`recover`] first.

pub mod build;
pub mod recover;

use serde_json::Value;
use std::collections::HashSet;
use tracing::debug;

use crate::table::{synthetic_columns, unique_columns, Table};

pub use build::build;
pub use recover::{recover, RecoverError};

/// Column names plus the row values they label, borrowed from the payload.
///
/// Each row is read on its own: arrays positionally, objects by key, and a
/// bare scalar as a one-value row. `keys[i]` is the object key read into
/// `columns[i]`; the two differ only where a declared header was renamed.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<'a> {
    pub columns: Vec<String>,
    pub keys: Vec<String>,
    pub rows: &'a [Value],
}

impl<'a> Grid<'a> {
    /// Columns read from objects under their own names.
    pub fn new(columns: Vec<String>, rows: &'a [Value]) -> Self {
        Grid {
            keys: columns.clone(),
            columns,
            rows,
        }
    }

    /// Declared headers made unique, still read from objects under the
    /// header as declared.
    pub fn declared(headers: Vec<String>, rows: &'a [Value]) -> Self {
        Grid {
            columns: unique_columns(headers.clone()),
            keys: headers,
            rows,
        }
    }
}

/// Which wire shape a payload matched.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape<'a> {
    Canonical(Grid<'a>),
    RowOnly(Grid<'a>),
    RecordArray(Grid<'a>),
    Tuple(Grid<'a>),
    Matrix(Grid<'a>),
    Unrecognized(&'a Value),
}

impl Shape<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            Shape::Canonical(_) => "canonical",
            Shape::RowOnly(_) => "row_only",
            Shape::RecordArray(_) => "record_array",
            Shape::Tuple(_) => "tuple",
            Shape::Matrix(_) => "matrix",
            Shape::Unrecognized(_) => "unrecognized",
        }
    }
}

type Matcher = for<'a> fn(&'a Value) -> Option<Shape<'a>>;

/// Priority order; do not reorder without revisiting the tuple tests.
const MATCHERS: &[Matcher] = &[canonical, row_only, record_array, tuple, matrix];

/// Classify a decoded payload. Never fails: unmatched input is `Unrecognized`.
pub fn classify(value: &Value) -> Shape<'_> {
    MATCHERS
        .iter()
        .find_map(|matcher| matcher(value))
        .unwrap_or(Shape::Unrecognized(value))
}

/// Normalize a decoded payload into a table. Total over all JSON values.
#[tracing::instrument(level = "debug", skip_all)]
pub fn normalize(value: &Value) -> Table {
    match value {
        Value::String(text) => recover::normalize_text(text),
        _ => {
            let shape = classify(value);
            debug!(shape = shape.name(), "classified payload");
            build(shape)
        }
    }
}

/// Decode a response body, keeping non-JSON bodies as a string payload.
pub fn decode_body(body: &str) -> Value {
    serde_json::from_str(body).unwrap_or_else(|e| {
        debug!("body is not JSON ({}), treating it as text", e);
        Value::String(body.to_string())
    })
}

pub fn normalize_body(body: &str) -> Table {
    normalize(&decode_body(body))
}

// ─── matchers ────────────────────────────────────────────────────────

fn canonical(value: &Value) -> Option<Shape<'_>> {
    let obj = value.as_object()?;
    let columns = string_list(obj.get("columns")?)?;
    let rows = obj.get("rows")?.as_array()?;
    Some(Shape::Canonical(Grid::declared(columns, rows)))
}

fn row_only(value: &Value) -> Option<Shape<'_>> {
    let rows = value.as_object()?.get("rows")?.as_array()?;
    let columns = match rows.first() {
        Some(Value::Array(first)) => synthetic_columns(first.len()),
        Some(Value::Object(_)) | None => key_union(rows),
        Some(_) => synthetic_columns(1),
    };
    Some(Shape::RowOnly(Grid::new(columns, rows)))
}

fn record_array(value: &Value) -> Option<Shape<'_>> {
    let items = value.as_array()?;
    if !items.first()?.is_object() {
        return None;
    }
    Some(Shape::RecordArray(Grid::new(key_union(items), items)))
}

fn tuple(value: &Value) -> Option<Shape<'_>> {
    let items = value.as_array()?;
    let [a, b] = items.as_slice() else {
        return None;
    };

    // first side wins when both are string lists
    if let (Some(columns), true) = (string_list(a), b.is_array()) {
        return Some(Shape::Tuple(Grid::declared(columns, tuple_rows(b))));
    }
    if let (Some(columns), true) = (string_list(b), a.is_array()) {
        return Some(Shape::Tuple(Grid::declared(columns, tuple_rows(a))));
    }

    let rows = a.as_array()?;
    let width = matrix_width(rows)?;
    Some(Shape::Tuple(Grid::new(synthetic_columns(width), rows)))
}

fn matrix(value: &Value) -> Option<Shape<'_>> {
    let rows = value.as_array()?;
    let width = matrix_width(rows)?;
    Some(Shape::Matrix(Grid::new(synthetic_columns(width), rows)))
}

// ─── helpers ─────────────────────────────────────────────────────────

/// A non-empty array made only of strings.
fn string_list(value: &Value) -> Option<Vec<String>> {
    let items = value.as_array()?;
    if items.is_empty() {
        return None;
    }
    items
        .iter()
        .map(|v| v.as_str().map(str::to_string))
        .collect()
}

/// Width of the first row when it is a non-empty array.
fn matrix_width(rows: &[Value]) -> Option<usize> {
    match rows.first()? {
        Value::Array(first) if !first.is_empty() => Some(first.len()),
        _ => None,
    }
}

/// The row side of a tuple. A flat list of scalars is one row, not many.
fn tuple_rows(side: &Value) -> &[Value] {
    match side {
        Value::Array(items) if !items.is_empty() && items.iter().all(is_scalar) => {
            std::slice::from_ref(side)
        }
        Value::Array(items) => items,
        _ => &[],
    }
}

fn is_scalar(v: &Value) -> bool {
    !matches!(v, Value::Array(_) | Value::Object(_))
}

/// Union of object keys across rows, in first-seen order. Empty keys are skipped.
fn key_union(rows: &[Value]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut columns = Vec::new();
    for key in rows
        .iter()
        .filter_map(Value::as_object)
        .flat_map(|obj| obj.keys())
    {
        if !key.is_empty() && seen.insert(key.as_str()) {
            columns.push(key.clone());
        }
    }
    columns
}
