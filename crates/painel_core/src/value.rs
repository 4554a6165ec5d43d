use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Database value type.
///
/// Covers the types a PostgreSQL result set round-trips through the
/// explorer; everything the driver cannot map lands in `Text`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    /// Timestamp with timezone.
    DateTime(DateTime<Utc>),
    /// Date without time component.
    Date(NaiveDate),
    /// Time without date component.
    Time(NaiveTime),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Coerce a raw form field into a typed value.
    ///
    /// A blank field is `Null`; integer, float and boolean literals are
    /// recognized so that typed parameter binding matches what the engine
    /// would have coerced server-side; anything else stays text.
    pub fn parse_input(input: &str) -> Value {
        let trimmed = input.trim();

        if trimmed.is_empty() {
            return Value::Null;
        }

        if let Ok(i) = trimmed.parse::<i64>() {
            return Value::Int(i);
        }

        if let Ok(f) = trimmed.parse::<f64>() {
            return Value::Float(f);
        }

        if trimmed.eq_ignore_ascii_case("true") {
            return Value::Bool(true);
        }

        if trimmed.eq_ignore_ascii_case("false") {
            return Value::Bool(false);
        }

        Value::Text(input.to_string())
    }

    pub fn as_display_string(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Text(s) => s.clone(),
            Value::Bytes(b) => format!("<{} bytes>", b.len()),
            Value::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            Value::Date(d) => d.format("%Y-%m-%d").to_string(),
            Value::Time(t) => t.format("%H:%M:%S").to_string(),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_display_string())
    }
}
