//! Values bound to scene nodes by a data join.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Dynamically typed value carried in a node's datum slot.
///
/// Deserializes untagged from JSON or TOML, so a data file row such as
/// `{"label": "a", "value": 3}` becomes a [`Datum::Record`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Datum {
    /// No value; also what an unbound node reports.
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<Datum>),
    Record(BTreeMap<String, Datum>),
}

impl Datum {
    pub fn is_null(&self) -> bool {
        matches!(self, Datum::Null)
    }

    /// Numeric view: numbers as-is, booleans as 0/1, numeric text parsed.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Datum::Number(n) => Some(*n),
            Datum::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Datum::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Datum::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Field lookup on a record; `None` for every other variant.
    pub fn get(&self, key: &str) -> Option<&Datum> {
        match self {
            Datum::Record(fields) => fields.get(key),
            _ => None,
        }
    }

    /// Builds a record from key/value pairs.
    pub fn record<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Datum>,
    {
        Datum::Record(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Datum::Null => write!(f, "null"),
            Datum::Bool(b) => write!(f, "{}", b),
            Datum::Number(n) => write!(f, "{}", n),
            Datum::Text(s) => write!(f, "{}", s),
            Datum::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
            Datum::Record(_) => {
                let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
                write!(f, "{}", json)
            }
        }
    }
}

/// Numbers, strings and booleans order among themselves; mixed or
/// structured values are incomparable.
impl PartialOrd for Datum {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Datum::Number(a), Datum::Number(b)) => a.partial_cmp(b),
            (Datum::Text(a), Datum::Text(b)) => a.partial_cmp(b),
            (Datum::Bool(a), Datum::Bool(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl From<f64> for Datum {
    fn from(value: f64) -> Self {
        Datum::Number(value)
    }
}

impl From<f32> for Datum {
    fn from(value: f32) -> Self {
        Datum::Number(f64::from(value))
    }
}

impl From<i32> for Datum {
    fn from(value: i32) -> Self {
        Datum::Number(f64::from(value))
    }
}

impl From<i64> for Datum {
    fn from(value: i64) -> Self {
        Datum::Number(value as f64)
    }
}

impl From<usize> for Datum {
    fn from(value: usize) -> Self {
        Datum::Number(value as f64)
    }
}

impl From<bool> for Datum {
    fn from(value: bool) -> Self {
        Datum::Bool(value)
    }
}

impl From<&str> for Datum {
    fn from(value: &str) -> Self {
        Datum::Text(value.to_string())
    }
}

impl From<String> for Datum {
    fn from(value: String) -> Self {
        Datum::Text(value)
    }
}

impl<T: Into<Datum>> From<Option<T>> for Datum {
    fn from(value: Option<T>) -> Self {
        value.map_or(Datum::Null, Into::into)
    }
}

impl<T: Into<Datum>> From<Vec<T>> for Datum {
    fn from(value: Vec<T>) -> Self {
        Datum::List(value.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_json_rows() {
        let rows: Vec<Datum> =
            serde_json::from_str(r#"[{"label": "a", "value": 3}, null, 2.5, "x"]"#).unwrap();
        assert_eq!(rows[0].get("value"), Some(&Datum::Number(3.0)));
        assert_eq!(rows[0].get("label").and_then(Datum::as_str), Some("a"));
        assert!(rows[1].is_null());
        assert_eq!(rows[2], Datum::Number(2.5));
        assert_eq!(rows[3], Datum::from("x"));
    }

    #[test]
    fn test_display_matches_markup_form() {
        assert_eq!(Datum::from(50.0).to_string(), "50");
        assert_eq!(Datum::from(0.5).to_string(), "0.5");
        assert_eq!(Datum::from(vec![1, 2]).to_string(), "1,2");
        assert_eq!(Datum::Null.to_string(), "null");
    }

    #[test]
    fn test_mixed_kinds_are_incomparable() {
        assert!(Datum::from(1).partial_cmp(&Datum::from("1")).is_none());
        assert!(Datum::from(f64::NAN)
            .partial_cmp(&Datum::from(f64::NAN))
            .is_none());
        assert!(Datum::from("a") < Datum::from("b"));
    }
}
