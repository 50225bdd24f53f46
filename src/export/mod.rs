// src/export/mod.rs
//! CSV text for a normalized table, and the file written from it.

use anyhow::{bail, Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::{
    borrow::Cow,
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;
use tracing::info;

use crate::table::{Record, Table};

static NEEDS_QUOTING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[",\r\n]"#).expect("static CSV quoting pattern"));

/// Quote a field when it holds a comma, quote or line break, doubling inner quotes.
pub fn escape_field(text: &str) -> Cow<'_, str> {
    if NEEDS_QUOTING.is_match(text) {
        Cow::Owned(format!("\"{}\"", text.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(text)
    }
}

/// Header line, then one line per row in column order. Lines are joined with
/// `\n`; there is no trailing newline.
pub fn to_csv(table: &Table) -> String {
    let mut lines = Vec::with_capacity(table.len() + 1);
    lines.push(
        table
            .columns()
            .iter()
            .map(|c| escape_field(c))
            .collect::<Vec<_>>()
            .join(","),
    );
    lines.extend(table.rows().iter().map(|row| csv_line(table.columns(), row)));
    lines.join("\n")
}

fn csv_line(columns: &[String], row: &Record) -> String {
    columns
        .iter()
        .map(|c| escape_field(&row.get(c).display()).into_owned())
        .collect::<Vec<_>>()
        .join(",")
}

/// Write `table` as `<dir>/<filename>`. The text goes to a temp file in `dir`
/// first and is renamed into place, so a failed write leaves nothing behind.
#[tracing::instrument(level = "info", skip(table, dir), fields(dir = %dir.display()))]
pub fn write_csv_file(table: &Table, dir: &Path, filename: &str) -> Result<PathBuf> {
    if filename.is_empty() || filename.contains(|c: char| c == '/' || c == '\\') {
        bail!("export filename `{}` must be a bare file name", filename);
    }
    fs::create_dir_all(dir).with_context(|| format!("creating export dir {:?}", dir))?;

    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("creating temp file in {:?}", dir))?;
    tmp.write_all(to_csv(table).as_bytes())
        .context("writing CSV text")?;
    tmp.flush().context("flushing CSV text")?;

    let target = dir.join(filename);
    tmp.persist(&target)
        .with_context(|| format!("moving CSV into {:?}", target))?;

    info!(rows = table.len(), path = %target.display(), "wrote csv");
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::normalize;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn escapes_quotes_and_commas() {
        assert_eq!(
            escape_field(r#"He said "hi", twice"#),
            r#""He said ""hi"", twice""#
        );
        assert_eq!(escape_field("line\nbreak"), "\"line\nbreak\"");
        assert_eq!(escape_field("a\rb"), "\"a\rb\"");
        assert_eq!(escape_field("plain"), "plain");
        assert!(matches!(escape_field("plain"), Cow::Borrowed(_)));
    }

    #[test]
    fn renders_absent_null_and_nested_cells() {
        let table = normalize(&json!({
            "columns": ["id", "tags", "note"],
            "rows": [[1, ["a", "b"]], [2, {"k": 1}, null]]
        }));
        assert_eq!(
            to_csv(&table),
            "id,tags,note\n1,\"[\"\"a\"\",\"\"b\"\"]\",\n2,\"{\"\"k\"\":1}\","
        );
    }

    #[test]
    fn header_only_for_empty_table() {
        let table = normalize(&json!({"columns": ["a", "b,c"], "rows": []}));
        assert_eq!(to_csv(&table), "a,\"b,c\"");
    }

    #[test]
    fn record_array_round_trips_through_a_csv_reader() -> Result<()> {
        let payload = json!([
            {"Name": "AC/DC", "Albums": 2, "Active": true},
            {"Name": "Accept", "Albums": 2, "Active": false},
            {"Name": "Aerosmith", "Albums": 1, "Active": true}
        ]);
        let table = normalize(&payload);
        let text = to_csv(&table);

        let mut rdr = csv::ReaderBuilder::new().from_reader(text.as_bytes());
        let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
        assert_eq!(headers, table.columns());

        let mut n = 0;
        for (idx, record) in rdr.records().enumerate() {
            let record = record?;
            for (col, field) in table.columns().iter().zip(record.iter()) {
                assert_eq!(field, table.display_cell(idx, col));
            }
            n += 1;
        }
        assert_eq!(n, table.len());
        Ok(())
    }

    #[test]
    fn special_characters_survive_a_csv_reader() -> Result<()> {
        let table = normalize(&json!([{"q": "He said \"hi\", twice", "nl": "a\nb"}]));
        let text = to_csv(&table);

        let mut rdr = csv::ReaderBuilder::new().from_reader(text.as_bytes());
        let record = rdr.records().next().context("one record")??;
        assert_eq!(&record[0], "He said \"hi\", twice");
        assert_eq!(&record[1], "a\nb");
        Ok(())
    }

    #[test]
    fn writes_file_atomically() -> Result<()> {
        let dir = tempdir()?;
        let table = normalize(&json!([["Name", "Count"], [["a", 1]]]));

        let path = write_csv_file(&table, dir.path(), "query-results.csv")?;
        assert_eq!(path, dir.path().join("query-results.csv"));
        assert_eq!(fs::read_to_string(&path)?, "Name,Count\na,1");

        let leftovers = fs::read_dir(dir.path())?.count();
        assert_eq!(leftovers, 1);
        Ok(())
    }

    #[test]
    fn rejects_paths_as_filenames() -> Result<()> {
        let dir = tempdir()?;
        let table = normalize(&json!([[1]]));
        assert!(write_csv_file(&table, dir.path(), "../escape.csv").is_err());
        assert!(write_csv_file(&table, dir.path(), "").is_err());
        Ok(())
    }
}
