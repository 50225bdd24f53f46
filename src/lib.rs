//! Normalizes loosely shaped query results into a canonical table, picks a
//! chart for them, and exports them as CSV.

pub mod answer;
pub mod chart;
pub mod config;
pub mod export;
pub mod shape;
pub mod table;

pub use answer::AskAnswer;
pub use chart::{plan_chart, select_chart, ChartDataset, ChartError, ChartKind, ChartPlan, ChartSpec};
pub use export::{to_csv, write_csv_file};
pub use shape::{classify, decode_body, normalize, normalize_body, Shape};
pub use table::{Cell, Record, Table};
