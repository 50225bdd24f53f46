// src/chart/mod.rs
//! Chart selection for the ask path: trust the LLM's chart hint only when it
//! names real columns, otherwise guess one from the table.

pub mod dataset;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::table::Table;

pub use dataset::ChartDataset;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
    Scatter,
    #[default]
    None,
}

impl ChartKind {
    pub fn as_str(&self) -> &str {
        match self {
            ChartKind::Bar => "bar",
            ChartKind::Line => "line",
            ChartKind::Scatter => "scatter",
            ChartKind::None => "none",
        }
    }

    /// Case-insensitive; anything unknown is `None`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "bar" => ChartKind::Bar,
            "line" => ChartKind::Line,
            "scatter" => ChartKind::Scatter,
            _ => ChartKind::None,
        }
    }
}

/// Chart description in the wire form the LLM answers with:
/// `{type, x, y, legend}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ChartSpec {
    #[serde(rename = "type")]
    pub kind: ChartKind,
    #[serde(rename = "x")]
    pub x_field: Option<String>,
    #[serde(rename = "y")]
    pub y_field: Option<String>,
    #[serde(rename = "legend")]
    pub legend_label: Option<String>,
}

impl ChartSpec {
    pub fn none() -> Self {
        ChartSpec::default()
    }

    /// Read an untrusted hint. Never fails: an unknown `type` is `none`,
    /// non-string fields are dropped.
    pub fn from_hint(value: &Value) -> Self {
        let field = |name: &str| {
            value
                .get(name)
                .and_then(Value::as_str)
                .map(str::to_string)
        };
        ChartSpec {
            kind: value
                .get("type")
                .and_then(Value::as_str)
                .map(ChartKind::parse)
                .unwrap_or_default(),
            x_field: field("x"),
            y_field: field("y"),
            legend_label: field("legend"),
        }
    }

    /// A drawable kind whose x and y both name columns of `table`.
    pub fn fits(&self, table: &Table) -> bool {
        let named = |f: &Option<String>| {
            f.as_deref()
                .map_or(false, |name| !name.is_empty() && table.has_column(name))
        };
        self.kind != ChartKind::None && named(&self.x_field) && named(&self.y_field)
    }
}

impl<'de> Deserialize<'de> for ChartSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(|v| ChartSpec::from_hint(&v))
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChartError {
    #[error("could not infer a chart: the result has no columns")]
    NoColumns,

    #[error("could not infer a chart: no numeric column found")]
    NoNumericColumn,
}

/// A selected spec together with the rows it will draw.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPlan {
    pub spec: ChartSpec,
    pub dataset: ChartDataset,
}

/// Accept `requested` verbatim when it fits the table, else infer one.
#[tracing::instrument(level = "debug", skip_all, fields(columns = table.columns().len()))]
pub fn select_chart(table: &Table, requested: Option<&ChartSpec>) -> Result<ChartSpec, ChartError> {
    if let Some(spec) = requested {
        if spec.fits(table) {
            return Ok(spec.clone());
        }
        debug!(?spec, "chart hint does not match the result, inferring one");
    }
    infer_chart(table)
}

/// X is the first column; Y is the first column holding a number, which may
/// be X itself. Always a bar chart labelled by Y.
pub fn infer_chart(table: &Table) -> Result<ChartSpec, ChartError> {
    let x = table.columns().first().ok_or(ChartError::NoColumns)?;
    let y = table
        .columns()
        .iter()
        .find(|c| table.is_numeric_column(c))
        .ok_or(ChartError::NoNumericColumn)?;

    Ok(ChartSpec {
        kind: ChartKind::Bar,
        x_field: Some(x.clone()),
        y_field: Some(y.clone()),
        legend_label: Some(y.clone()),
    })
}

pub fn plan_chart(table: &Table, requested: Option<&ChartSpec>) -> Result<ChartPlan, ChartError> {
    let spec = select_chart(table, requested)?;
    let dataset = ChartDataset::project(table, &spec);
    Ok(ChartPlan { spec, dataset })
}
