//! Data file loading
//!
//! Accepted layouts:
//! - JSON: a top-level array of rows, or an object with a `rows` array
//! - TOML: an array of tables under `[[rows]]`
//!
//! A row is usually a record (`{"label": "a", "value": 3}`); plain scalars are
//! accepted too and are labelled by their position.

use std::path::Path;

use serde::Deserialize;
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::Datum;
use crate::util::path::PathExt;

/// Serialization format of a data file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    Json,
    Toml,
}

impl DataFormat {
    /// Format from the file extension.
    pub fn from_path(path: &Path) -> ApplicationResult<Self> {
        if path.has_extension("json") {
            Ok(Self::Json)
        } else if path.has_extension("toml") {
            Ok(Self::Toml)
        } else {
            Err(ApplicationError::DataFormat {
                path: path.to_path_buf(),
                message: "unsupported extension, expected .json or .toml".to_string(),
            })
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonRows {
    Bare(Vec<Datum>),
    Wrapped { rows: Vec<Datum> },
}

#[derive(Deserialize)]
struct TomlRows {
    #[serde(default)]
    rows: Vec<Datum>,
}

/// Parses `content` into rows; `path` only labels errors.
#[instrument(level = "debug", skip(content))]
pub fn parse_rows(content: &str, format: DataFormat, path: &Path) -> ApplicationResult<Vec<Datum>> {
    let data_error = |message: String| ApplicationError::DataFormat {
        path: path.to_path_buf(),
        message,
    };
    let rows = match format {
        DataFormat::Json => match serde_json::from_str::<JsonRows>(content) {
            Ok(JsonRows::Bare(rows)) | Ok(JsonRows::Wrapped { rows }) => rows,
            Err(e) => {
                return Err(data_error(format!(
                    "expected an array of rows or an object with 'rows': {}",
                    e
                )))
            }
        },
        DataFormat::Toml => {
            toml::from_str::<TomlRows>(content)
                .map_err(|e| data_error(e.to_string()))?
                .rows
        }
    };
    debug!("parse_rows: {} rows", rows.len());
    Ok(rows)
}

/// Category label of a row: the `key` field of a record, else the position.
pub fn row_label(row: &Datum, index: usize, key: &str) -> String {
    match row {
        Datum::Record(_) => row
            .get(key)
            .filter(|d| !d.is_null())
            .map(Datum::to_string)
            .unwrap_or_else(|| index.to_string()),
        _ => index.to_string(),
    }
}

/// Numeric value of a row: the `key` field of a record, else the row itself.
pub fn row_value(row: &Datum, key: &str) -> Option<f64> {
    match row {
        Datum::Record(_) => row.get(key).and_then(Datum::as_f64),
        other => other.as_f64(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_bare_json_array_when_parsing_then_returns_rows() {
        let rows = parse_rows("[4, 8, 15]", DataFormat::Json, Path::new("x.json")).unwrap();
        assert_eq!(rows, vec![Datum::from(4), Datum::from(8), Datum::from(15)]);
    }

    #[test]
    fn given_wrapped_json_when_parsing_then_returns_rows() {
        let content = r#"{"rows": [{"label": "a", "value": 1}]}"#;
        let rows = parse_rows(content, DataFormat::Json, Path::new("x.json")).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(row_label(&rows[0], 0, "label"), "a");
        assert_eq!(row_value(&rows[0], "value"), Some(1.0));
    }

    #[test]
    fn given_toml_rows_when_parsing_then_integers_become_numbers() {
        let content = "[[rows]]\nlabel = \"q1\"\nvalue = 12\n\n[[rows]]\nlabel = \"q2\"\nvalue = 7.5\n";
        let rows = parse_rows(content, DataFormat::Toml, Path::new("x.toml")).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(row_value(&rows[0], "value"), Some(12.0));
        assert_eq!(row_value(&rows[1], "value"), Some(7.5));
    }

    #[test]
    fn given_json_scalar_when_parsing_then_reports_path() {
        let err = parse_rows("42", DataFormat::Json, Path::new("bad.json")).unwrap_err();
        assert!(err.to_string().contains("bad.json"));
    }

    #[test]
    fn given_unknown_extension_when_detecting_format_then_fails() {
        assert_eq!(DataFormat::from_path(Path::new("a.JSON")).unwrap(), DataFormat::Json);
        assert!(DataFormat::from_path(Path::new("a.csv")).is_err());
    }

    #[test]
    fn given_record_without_label_when_labelling_then_uses_position() {
        let row = Datum::record([("value", Datum::from(3))]);
        assert_eq!(row_label(&row, 2, "label"), "2");
        assert_eq!(row_value(&Datum::from("n/a"), "value"), None);
    }
}
