// src/answer.rs
//! The part of the LLM "ask" answer the engine consumes.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;

use crate::chart::{plan_chart, ChartError, ChartPlan, ChartSpec};
use crate::table::Table;

/// `{reasoning, sql, chart}`; every field optional.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AskAnswer {
    pub reasoning: Option<String>,
    pub sql: Option<String>,
    pub chart: Option<ChartSpec>,
}

impl AskAnswer {
    /// Accepts either the `{"answer": {...}}` envelope or the bare answer.
    pub fn from_value(value: &Value) -> Self {
        let answer = match value.get("answer") {
            Some(inner) if inner.is_object() => inner,
            _ => value,
        };
        let text = |name: &str| answer.get(name).and_then(Value::as_str).map(str::to_string);

        AskAnswer {
            reasoning: text("reasoning"),
            sql: text("sql"),
            chart: answer
                .get("chart")
                .filter(|c| !c.is_null())
                .map(ChartSpec::from_hint),
        }
    }

    pub fn parse(body: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(body).context("parsing ask answer")?;
        Ok(AskAnswer::from_value(&value))
    }

    /// The generated SQL, if there is any worth running.
    pub fn sql_to_execute(&self) -> Option<&str> {
        self.sql.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// `Ok(None)` when the answer asked for no chart at all; otherwise the
    /// selected chart, which may still fail for want of a numeric column.
    pub fn chart_plan(&self, table: &Table) -> Result<Option<ChartPlan>, ChartError> {
        match &self.chart {
            None => Ok(None),
            Some(hint) => plan_chart(table, Some(hint)).map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::ChartKind;
    use crate::shape::normalize;
    use serde_json::json;

    #[test]
    fn reads_envelope_and_bare_answers() -> Result<()> {
        let bare = json!({
            "sql": "SELECT 1",
            "reasoning": "because",
            "chart": {"type": "bar", "x": "artist", "y": "total_albums", "legend": null}
        });
        let wrapped = json!({ "answer": bare.clone() });

        let a = AskAnswer::from_value(&bare);
        assert_eq!(a, AskAnswer::from_value(&wrapped));
        assert_eq!(a.sql.as_deref(), Some("SELECT 1"));
        assert_eq!(a.chart.as_ref().map(|c| c.kind), Some(ChartKind::Bar));

        assert_eq!(AskAnswer::parse(&wrapped.to_string())?, a);
        Ok(())
    }

    #[test]
    fn blank_sql_is_not_executable() {
        let a = AskAnswer::from_value(&json!({"sql": "   "}));
        assert_eq!(a.sql_to_execute(), None);
        let a = AskAnswer::from_value(&json!({"sql": " SELECT 2;\n"}));
        assert_eq!(a.sql_to_execute(), Some("SELECT 2;"));
    }

    #[test]
    fn missing_chart_means_no_chart_requested() -> Result<()> {
        let table = normalize(&json!([{"Name": "a"}]));
        for answer in [json!({"sql": "x"}), json!({"sql": "x", "chart": null})] {
            assert_eq!(AskAnswer::from_value(&answer).chart_plan(&table)?, None);
        }
        Ok(())
    }

    #[test]
    fn requested_chart_without_numbers_fails_loudly() {
        let table = normalize(&json!([{"Name": "a"}]));
        let answer = AskAnswer::from_value(&json!({"chart": {"type": "bar", "x": "Name", "y": "Name"}}));
        // a fitting hint is trusted as-is, even without numbers
        assert!(answer.chart_plan(&table).is_ok());

        let answer = AskAnswer::from_value(&json!({"chart": {"type": "line", "x": "Missing", "y": "Count"}}));
        assert_eq!(answer.chart_plan(&table), Err(ChartError::NoNumericColumn));
    }

    #[test]
    fn invalid_json_body_is_an_error() {
        assert!(AskAnswer::parse("not json").is_err());
    }
}
