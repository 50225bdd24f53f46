// src/shape/recover.rs
//! Best-effort recovery of results that arrive as log text, e.g.
//!
//! ```text
//! Returned columns and rows:  ['Name', 'AlbumCount'] [('AC/DC', 2), ('Accept', 2)]
//! ```
//!
//! The last two top-level `[...]` segments are taken as the result, their
//! Python-style literals rewritten into JSON, and the pair classified as a
//! `[columns, rows]` tuple.

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use super::{build, classify, Shape};
use crate::table::Table;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecoverError {
    #[error("found {found} bracketed segment(s), need at least two")]
    TooFewSegments { found: usize },

    #[error("segment {index} is not JSON after repair: {message}")]
    Parse { index: usize, message: String },
}

/// Extract and parse the last two bracketed segments of `text` as `[a, b]`.
pub fn recover(text: &str) -> Result<Value, RecoverError> {
    let segments = bracket_segments(text);
    if segments.len() < 2 {
        return Err(RecoverError::TooFewSegments {
            found: segments.len(),
        });
    }

    let tail = &segments[segments.len() - 2..];
    let parts = tail
        .iter()
        .enumerate()
        .map(|(index, segment)| {
            serde_json::from_str(&repair_literals(segment)).map_err(|e| RecoverError::Parse {
                index,
                message: e.to_string(),
            })
        })
        .collect::<Result<Vec<Value>, _>>()?;

    Ok(Value::Array(parts))
}

/// String payload → table. Anything unrecoverable keeps the raw text in `data`.
pub(crate) fn normalize_text(text: &str) -> Table {
    let fallback = || Table::fallback(Value::String(text.to_string()));

    match recover(text) {
        Ok(pair) => match classify(&pair) {
            Shape::Unrecognized(_) => {
                debug!("recovered segments do not form a table");
                fallback()
            }
            shape => {
                debug!(shape = shape.name(), "recovered table from text payload");
                build(shape)
            }
        },
        Err(RecoverError::TooFewSegments { found }) => {
            debug!(found, "text payload has no embedded result");
            fallback()
        }
        Err(e) => {
            warn!("could not recover text payload: {}", e);
            fallback()
        }
    }
}

/// Top-level balanced `[...]` slices, in order of appearance.
///
/// Quotes only count inside a segment, so apostrophes in surrounding prose do
/// not swallow the result. An unterminated trailing segment is dropped.
fn bracket_segments(text: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (i, ch) in text.char_indices() {
        if depth == 0 {
            if ch == '[' {
                start = i;
                depth = 1;
            }
            continue;
        }

        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }

        match ch {
            '\'' | '"' => quote = Some(ch),
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    segments.push(&text[start..=i]);
                }
            }
            _ => {}
        }
    }

    segments
}

/// Rewrite a Python-literal segment into JSON text:
///  - `'...'` strings become `"..."` (inner `"` escaped, `\'` unescaped)
///  - `None` / `True` / `False` become `null` / `true` / `false`
///  - tuple parentheses become brackets
///  - trailing commas before a closer are dropped (`('a',)`)
fn repair_literals(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    let mut word = String::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for ch in segment.chars() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
                if ch == '\'' {
                    out.pop();
                }
                out.push(ch);
                continue;
            }
            match ch {
                '\\' => {
                    escaped = true;
                    out.push(ch);
                }
                c if c == q => {
                    quote = None;
                    out.push('"');
                }
                '"' => out.push_str("\\\""),
                c => out.push(c),
            }
            continue;
        }

        if ch.is_alphanumeric() || ch == '_' {
            word.push(ch);
            continue;
        }
        flush_word(&mut out, &mut word);

        match ch {
            '\'' | '"' => {
                quote = Some(ch);
                out.push('"');
            }
            '(' => out.push('['),
            ')' | ']' => {
                trim_trailing_comma(&mut out);
                out.push(']');
            }
            '}' => {
                trim_trailing_comma(&mut out);
                out.push('}');
            }
            c => out.push(c),
        }
    }
    flush_word(&mut out, &mut word);

    out
}

fn flush_word(out: &mut String, word: &mut String) {
    match word.as_str() {
        "" => return,
        "None" => out.push_str("null"),
        "True" => out.push_str("true"),
        "False" => out.push_str("false"),
        other => out.push_str(other),
    }
    word.clear();
}

fn trim_trailing_comma(out: &mut String) {
    let kept = out.trim_end().len();
    if out[..kept].ends_with(',') {
        out.truncate(kept - 1);
    }
}
