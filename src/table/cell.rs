// src/table/cell.rs

use serde_json::Value;

/// One field of a row record.
///
/// `Absent` marks a column the source row never supplied (short matrix row,
/// record without that key). It is kept distinct from a present JSON `null`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Absent,
    Value(Value),
}

impl Cell {
    pub fn value(&self) -> Option<&Value> {
        match self {
            Cell::Absent => None,
            Cell::Value(v) => Some(v),
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Cell::Absent)
    }

    /// True only for JSON numbers; numeric-looking strings do not count.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Cell::Value(Value::Number(_)))
    }

    /// Text used for display and CSV:
    ///  - absent / null → empty
    ///  - strings as-is
    ///  - other scalars and nested values → compact JSON
    pub fn display(&self) -> String {
        match self {
            Cell::Absent | Cell::Value(Value::Null) => String::new(),
            Cell::Value(Value::String(s)) => s.clone(),
            Cell::Value(other) => other.to_string(),
        }
    }
}

impl From<Value> for Cell {
    fn from(v: Value) -> Self {
        Cell::Value(v)
    }
}

impl From<Option<Value>> for Cell {
    fn from(v: Option<Value>) -> Self {
        v.map_or(Cell::Absent, Cell::Value)
    }
}
