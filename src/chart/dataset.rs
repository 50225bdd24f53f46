// src/chart/dataset.rs

use serde::Serialize;

use super::{ChartKind, ChartSpec};
use crate::table::{Record, Table};

/// Rows cut down to the chart's x and y fields, in table order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct ChartDataset {
    points: Vec<Record>,
}

impl ChartDataset {
    /// Empty for a `none` spec or one that names no fields.
    pub fn project(table: &Table, spec: &ChartSpec) -> Self {
        if spec.kind == ChartKind::None {
            return ChartDataset::default();
        }

        let mut fields: Vec<&str> = Vec::with_capacity(2);
        for f in [&spec.x_field, &spec.y_field].into_iter().flatten() {
            if !fields.contains(&f.as_str()) {
                fields.push(f);
            }
        }
        if fields.is_empty() {
            return ChartDataset::default();
        }

        let points = table
            .rows()
            .iter()
            .map(|row| {
                fields
                    .iter()
                    .map(|f| (f.to_string(), row.get(f).clone()))
                    .collect()
            })
            .collect();

        ChartDataset { points }
    }

    pub fn points(&self) -> &[Record] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
