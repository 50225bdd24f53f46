// src/table/mod.rs
//! Canonical tabular form shared by the query-result and ask/chart paths.

pub mod cell;

pub use cell::Cell;

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};

/// Column name used when a payload cannot be read as a table at all.
pub const FALLBACK_COLUMN: &str = "data";

/// Prefix for names synthesized from a matrix width (`col_1`, `col_2`, …).
pub const SYNTHETIC_PREFIX: &str = "col_";

static ABSENT: Cell = Cell::Absent;

/// A single row, keyed by column name.
///
/// Built by the table builder with one cell per table column, so a lookup of
/// any table column never misses. Unknown names read as `Absent`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    cells: BTreeMap<String, Cell>,
}

impl Record {
    pub fn get(&self, column: &str) -> &Cell {
        self.cells.get(column).unwrap_or(&ABSENT)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Cell)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub(crate) fn insert(&mut self, column: impl Into<String>, cell: Cell) {
        self.cells.insert(column.into(), cell);
    }
}

impl FromIterator<(String, Cell)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Cell)>>(iter: I) -> Self {
        Record {
            cells: iter.into_iter().collect(),
        }
    }
}

/// Absent cells are left out of the serialized object, so the wire form of a
/// table normalizes back to the same table.
impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let present: Vec<(&str, &Value)> = self
            .iter()
            .filter_map(|(k, c)| c.value().map(|v| (k, v)))
            .collect();
        let mut map = serializer.serialize_map(Some(present.len()))?;
        for (k, v) in present {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Ordered columns plus ordered row records.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Record>,
}

impl Table {
    pub(crate) fn new(columns: Vec<String>, rows: Vec<Record>) -> Self {
        Table { columns, rows }
    }

    /// Single `data` column holding `value` as its only row.
    pub fn fallback(value: Value) -> Self {
        let mut row = Record::default();
        row.insert(FALLBACK_COLUMN, Cell::Value(value));
        Table::new(vec![FALLBACK_COLUMN.to_string()], vec![row])
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// At least one row holds a JSON number in `column`.
    pub fn is_numeric_column(&self, column: &str) -> bool {
        self.rows.iter().any(|r| r.get(column).is_numeric())
    }

    pub fn display_cell(&self, row: usize, column: &str) -> String {
        self.rows
            .get(row)
            .map(|r| r.get(column).display())
            .unwrap_or_default()
    }
}

/// `col_1..col_N`.
pub fn synthetic_columns(width: usize) -> Vec<String> {
    (1..=width)
        .map(|i| format!("{}{}", SYNTHETIC_PREFIX, i))
        .collect()
}

/// Make header names usable as keys: empty names take their positional
/// `col_<n>` name, repeats get `_2`, `_3`, … appended.
pub fn unique_columns(names: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(names.len());
    let mut out = Vec::with_capacity(names.len());

    for (idx, name) in names.into_iter().enumerate() {
        let base = if name.is_empty() {
            format!("{}{}", SYNTHETIC_PREFIX, idx + 1)
        } else {
            name
        };
        let mut candidate = base.clone();
        let mut n = 2;
        while seen.contains(&candidate) {
            candidate = format!("{}_{}", base, n);
            n += 1;
        }
        seen.insert(candidate.clone());
        out.push(candidate);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn synthetic_names_are_one_based() {
        assert_eq!(synthetic_columns(3), vec!["col_1", "col_2", "col_3"]);
        assert!(synthetic_columns(0).is_empty());
    }

    #[test]
    fn unique_columns_keeps_clean_headers_untouched() {
        let cols = vec!["Name".to_string(), "Count".to_string()];
        assert_eq!(unique_columns(cols.clone()), cols);
    }

    #[test]
    fn unique_columns_fills_blanks_and_suffixes_repeats() {
        let cols = vec![
            "id".to_string(),
            String::new(),
            "id".to_string(),
            "id".to_string(),
        ];
        assert_eq!(unique_columns(cols), vec!["id", "col_2", "id_2", "id_3"]);
    }

    #[test]
    fn record_lookup_of_unknown_column_is_absent() {
        let rec: Record = vec![("a".to_string(), Cell::from(json!(1)))]
            .into_iter()
            .collect();
        assert!(rec.get("missing").is_absent());
        assert_eq!(rec.get("a").value(), Some(&json!(1)));
    }

    #[test]
    fn serialization_omits_absent_cells() -> anyhow::Result<()> {
        let rec: Record = vec![
            ("a".to_string(), Cell::from(json!(1))),
            ("b".to_string(), Cell::Absent),
            ("c".to_string(), Cell::from(Value::Null)),
        ]
        .into_iter()
        .collect();
        let table = Table::new(
            vec!["a".to_string(), "b".to_string(), "c".to_string()],
            vec![rec],
        );

        let wire = serde_json::to_value(&table)?;
        assert_eq!(
            wire,
            json!({"columns": ["a", "b", "c"], "rows": [{"a": 1, "c": null}]})
        );
        Ok(())
    }

    #[test]
    fn fallback_wraps_value_in_data_column() {
        let t = Table::fallback(json!(7));
        assert_eq!(t.columns(), &["data".to_string()]);
        assert_eq!(t.len(), 1);
        assert_eq!(t.display_cell(0, "data"), "7");
        assert_eq!(t.display_cell(5, "data"), "");
    }
}
