//! Scalar values carried by an extracted record.
//!
//! Header values arrive from the extraction service untyped, so they are
//! decoded into [`FieldValue`], a small tagged union. Line-item amounts use
//! [`NumericInput`], which keeps whatever the user typed until someone asks for
//! a number.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Number, Value};

/// Placeholder rendered for null values.
pub const MISSING_VALUE: &str = "N/A";

/// Date layouts the order backend is known to produce, tried in order.
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";
const NAIVE_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// A date recognised in a header value.
///
/// The original text is kept so that an untouched date is sent back exactly as
/// the backend produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderDate {
    raw: String,
    at: NaiveDateTime,
}

impl HeaderDate {
    /// Parses `raw` if it looks like one of the backend's date layouts.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let at = NaiveDateTime::parse_from_str(trimmed, HTTP_DATE_FORMAT)
            .ok()
            .or_else(|| {
                DateTime::parse_from_rfc3339(trimmed)
                    .ok()
                    .map(|dt| dt.naive_local())
            })
            .or_else(|| NaiveDateTime::parse_from_str(trimmed, NAIVE_DATETIME_FORMAT).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })?;

        Some(Self {
            raw: raw.to_string(),
            at,
        })
    }

    /// A date with no time component, encoded as `YYYY-MM-DD`.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            raw: date.format(DATE_FORMAT).to_string(),
            at: date.and_time(chrono::NaiveTime::MIN),
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn date_time(&self) -> NaiveDateTime {
        self.at
    }

    /// Short human form, e.g. `Mon Jan 15 2024`.
    pub fn display(&self) -> String {
        self.at.format("%a %b %d %Y").to_string()
    }
}

/// A dynamically typed header value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Number(Number),
    Date(HeaderDate),
    Text(String),
    /// Arrays or objects; kept verbatim.
    Json(Value),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Text as a form input would hold it. Null becomes the empty string.
    pub fn to_input_text(&self) -> String {
        match self {
            FieldValue::Null => String::new(),
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Number(n) => n.to_string(),
            FieldValue::Date(d) => d.raw().to_string(),
            FieldValue::Text(s) => s.clone(),
            FieldValue::Json(v) => v.to_string(),
        }
    }

    /// Rendering for read-only display.
    pub fn display(&self) -> String {
        match self {
            FieldValue::Null => MISSING_VALUE.to_string(),
            FieldValue::Date(d) => d.display(),
            other => other.to_input_text(),
        }
    }

    /// Non-empty identifier text, if this value can serve as one.
    pub fn as_identifier(&self) -> Option<String> {
        match self {
            FieldValue::Number(n) => Some(integral_text(n)),
            FieldValue::Text(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            _ => None,
        }
    }
}

/// `42.0` is written as `42`; the order routes only take integers.
fn integral_text(n: &Number) -> String {
    if n.is_f64() {
        if let Some(v) = n.as_f64() {
            if v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
                return (v as i64).to_string();
            }
        }
    }
    n.to_string()
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Bool(b),
            Value::Number(n) => FieldValue::Number(n),
            Value::String(s) => match HeaderDate::parse(&s) {
                Some(date) => FieldValue::Date(date),
                None => FieldValue::Text(s),
            },
            other => FieldValue::Json(other),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(Number::from(value))
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        FieldValue::Date(HeaderDate::from_date(value))
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Null => serializer.serialize_none(),
            FieldValue::Bool(b) => serializer.serialize_bool(*b),
            FieldValue::Number(n) => n.serialize(serializer),
            FieldValue::Date(d) => serializer.serialize_str(d.raw()),
            FieldValue::Text(s) => serializer.serialize_str(s),
            FieldValue::Json(v) => v.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(FieldValue::from)
    }
}

/// A line-item amount: either a number as received, or text as entered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    Number(Number),
    Text(String),
}

impl NumericInput {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            NumericInput::Number(n) => n.as_f64(),
            NumericInput::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, NumericInput::Text(_))
    }

    /// Converts entered text to a JSON number. Returns `None` when the text
    /// does not parse; numbers are returned unchanged.
    pub fn coerced(&self) -> Option<NumericInput> {
        match self {
            NumericInput::Number(_) => Some(self.clone()),
            NumericInput::Text(s) => {
                let trimmed = s.trim();
                if let Ok(int) = trimmed.parse::<i64>() {
                    return Some(NumericInput::Number(Number::from(int)));
                }
                trimmed
                    .parse::<f64>()
                    .ok()
                    .and_then(Number::from_f64)
                    .map(NumericInput::Number)
            }
        }
    }
}

impl From<FieldValue> for NumericInput {
    fn from(value: FieldValue) -> Self {
        match value {
            FieldValue::Number(n) => NumericInput::Number(n),
            other => NumericInput::Text(other.to_input_text()),
        }
    }
}

impl fmt::Display for NumericInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericInput::Number(n) => write!(f, "{}", n),
            NumericInput::Text(s) => f.write_str(s),
        }
    }
}
