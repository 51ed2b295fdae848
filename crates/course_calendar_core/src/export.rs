//! crates/course_calendar_core/src/export.rs
//!
//! CSV rendering for tabular exports (exam results, content listings).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ExportError {
    #[error("No data to export")]
    NoRows,
}

/// A single primitive cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CsvValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Empty,
}

impl fmt::Display for CsvValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CsvValue::Bool(b) => write!(f, "{b}"),
            CsvValue::Integer(n) => write!(f, "{n}"),
            CsvValue::Float(x) => write!(f, "{x}"),
            CsvValue::Text(s) => f.write_str(s),
            CsvValue::Empty => Ok(()),
        }
    }
}

impl From<&str> for CsvValue {
    fn from(value: &str) -> Self {
        CsvValue::Text(value.to_string())
    }
}

impl From<String> for CsvValue {
    fn from(value: String) -> Self {
        CsvValue::Text(value)
    }
}

impl From<i64> for CsvValue {
    fn from(value: i64) -> Self {
        CsvValue::Integer(value)
    }
}

impl From<f64> for CsvValue {
    fn from(value: f64) -> Self {
        CsvValue::Float(value)
    }
}

impl From<bool> for CsvValue {
    fn from(value: bool) -> Self {
        CsvValue::Bool(value)
    }
}

impl<T: Into<CsvValue>> From<Option<T>> for CsvValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CsvValue::Empty)
    }
}

/// Always quotes; embedded quotes are doubled.
fn csv_quote(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Renders a header line plus one line per row, every field quoted, lines joined by `\n`.
///
/// Refuses to render when there are no data rows.
pub fn render_csv<H>(header: H, rows: &[Vec<CsvValue>]) -> Result<String, ExportError>
where
    H: IntoIterator,
    H::Item: AsRef<str>,
{
    if rows.is_empty() {
        return Err(ExportError::NoRows);
    }

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(
        header
            .into_iter()
            .map(|h| csv_quote(h.as_ref()))
            .collect::<Vec<_>>()
            .join(","),
    );
    for row in rows {
        lines.push(
            row.iter()
                .map(|v| csv_quote(&v.to_string()))
                .collect::<Vec<_>>()
                .join(","),
        );
    }
    Ok(lines.join("\n"))
}

/// `<subject>_<YYYY-MM-DD>.csv`, with the subject made safe for a file name.
pub fn export_filename(subject: &str, date: NaiveDate) -> String {
    let slug: String = subject
        .trim()
        .chars()
        .filter_map(|c| match c {
            c if c.is_whitespace() => Some('_'),
            '/' | '\\' | ':' | '"' | '*' | '?' | '<' | '>' | '|' => None,
            c if c.is_control() => None,
            c => Some(c),
        })
        .collect();
    let slug = if slug.is_empty() { "export".to_string() } else { slug };
    format!("{}_{}.csv", slug, date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refuses_empty_exports() {
        assert_eq!(render_csv(&["Name", "Score"], &[]), Err(ExportError::NoRows));
    }

    #[test]
    fn quotes_every_field() {
        let rows = vec![
            vec![CsvValue::from("Ada"), CsvValue::from(92_i64), CsvValue::from(true)],
            vec![CsvValue::from("Alan"), CsvValue::from(87.5), CsvValue::Empty],
        ];
        let csv = render_csv(&["Name", "Score", "Passed"], &rows).unwrap();
        assert_eq!(
            csv,
            "\"Name\",\"Score\",\"Passed\"\n\"Ada\",\"92\",\"true\"\n\"Alan\",\"87.5\",\"\""
        );
        assert_eq!(csv.lines().count(), 3);
    }

    #[test]
    fn embedded_quotes_are_doubled() {
        let rows = vec![vec![CsvValue::from("The \"Big\" Test, part 1")]];
        let csv = render_csv(&["Title"], &rows).unwrap();
        assert_eq!(csv, "\"Title\"\n\"The \"\"Big\"\" Test, part 1\"");
    }

    #[test]
    fn filename_carries_subject_and_date() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 9).unwrap();
        assert_eq!(export_filename("Exam Results", date), "Exam_Results_2024-05-09.csv");
        assert_eq!(export_filename("math/physics", date), "mathphysics_2024-05-09.csv");
        assert_eq!(export_filename("  ", date), "export_2024-05-09.csv");
    }

    #[test]
    fn values_deserialise_from_json_primitives() {
        let row: Vec<CsvValue> = serde_json::from_str(r#"["a", 3, 2.5, false, null]"#).unwrap();
        assert_eq!(
            row,
            vec![
                CsvValue::Text("a".into()),
                CsvValue::Integer(3),
                CsvValue::Float(2.5),
                CsvValue::Bool(false),
                CsvValue::Empty,
            ]
        );
    }
}
