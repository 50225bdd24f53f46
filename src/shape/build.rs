// src/shape/build.rs

use serde_json::{Map, Value};
use tracing::debug;

use super::{Grid, Shape};
use crate::table::{Cell, Record, Table};

/// Build the canonical table for a classified payload.
pub fn build(shape: Shape<'_>) -> Table {
    match shape {
        Shape::Canonical(grid)
        | Shape::RowOnly(grid)
        | Shape::RecordArray(grid)
        | Shape::Tuple(grid)
        | Shape::Matrix(grid) => build_grid(grid),
        Shape::Unrecognized(value) => Table::fallback(value.clone()),
    }
}

fn build_grid(grid: Grid<'_>) -> Table {
    let rows = grid
        .rows
        .iter()
        .enumerate()
        .map(|(idx, row)| match row {
            Value::Array(values) => positional(&grid.columns, values, idx),
            Value::Object(fields) => keyed(&grid.columns, &grid.keys, fields),
            scalar => positional(&grid.columns, std::slice::from_ref(scalar), idx),
        })
        .collect();
    Table::new(grid.columns, rows)
}

/// Zip names to values; missing trailing values are `Absent`, extras dropped.
fn positional(columns: &[String], values: &[Value], idx: usize) -> Record {
    if values.len() > columns.len() {
        debug!(
            row = idx,
            width = values.len(),
            columns = columns.len(),
            "dropping values past the last column"
        );
    }
    columns
        .iter()
        .enumerate()
        .map(|(i, c)| (c.clone(), Cell::from(values.get(i).cloned())))
        .collect()
}

/// Copy the listed fields; anything else in the object is ignored.
fn keyed(columns: &[String], keys: &[String], fields: &Map<String, Value>) -> Record {
    columns
        .iter()
        .zip(keys)
        .map(|(c, key)| (c.clone(), Cell::from(fields.get(key).cloned())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn every_record_holds_every_column() {
        let rows = vec![json!([1]), json!({"b": 2}), json!("s")];
        let t = build(Shape::Matrix(Grid::new(vec!["a".into(), "b".into()], &rows)));

        for row in t.rows() {
            assert_eq!(row.len(), 2);
        }
        assert_eq!(*t.rows()[0].get("b"), Cell::Absent);
        assert_eq!(*t.rows()[1].get("a"), Cell::Absent);
        assert_eq!(t.rows()[2].get("a").value(), Some(&json!("s")));
    }

    #[test]
    fn present_null_is_not_absent() {
        let rows = vec![json!([null])];
        let t = build(Shape::Matrix(Grid::new(vec!["a".into()], &rows)));
        assert_eq!(*t.rows()[0].get("a"), Cell::Value(Value::Null));
    }

    #[test]
    fn object_rows_are_read_under_the_declared_key() {
        let rows = vec![json!({"": 9, "n": 1})];
        let t = build(Shape::Canonical(Grid::declared(vec!["".into(), "n".into()], &rows)));
        assert_eq!(t.columns(), &["col_1".to_string(), "n".to_string()]);
        assert_eq!(t.rows()[0].get("col_1").value(), Some(&json!(9)));
        assert_eq!(t.rows()[0].get("n").value(), Some(&json!(1)));
    }

    #[test]
    fn unrecognized_is_cloned_into_data_column() {
        let v = json!({"status": "ok"});
        let t = build(Shape::Unrecognized(&v));
        assert_eq!(t.columns(), &["data".to_string()]);
        assert_eq!(t.rows()[0].get("data").value(), Some(&v));
    }
}
