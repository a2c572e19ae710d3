use std::fmt;

use crate::schema::ColumnType;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
}

impl Value {
    pub fn as_display(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => {
                if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                    (*f as i64).to_string()
                } else {
                    f.to_string()
                }
            }
        }
    }

    /// Numeric view of the value; text is parsed with the same rules as typed columns.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::String(s) => parse_float(s),
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            Value::Float(f) => float_to_integer(*f),
            Value::String(s) => parse_integer(s),
        }
    }

    pub fn column_type(&self) -> ColumnType {
        match self {
            Value::String(_) => ColumnType::String,
            Value::Integer(_) => ColumnType::Integer,
            Value::Float(_) => ColumnType::Float,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

/// Renders an optional cell the way it is written to CSV: nulls become empty fields.
pub fn display_cell(cell: &Option<Value>) -> String {
    cell.as_ref().map(Value::as_display).unwrap_or_default()
}

/// Converts text into a typed cell. Numeric text may use `,` as decimal separator;
/// anything that does not parse becomes `None` instead of an error.
pub fn coerce_typed_value(value: &str, ty: &ColumnType) -> Option<Value> {
    if value.is_empty() {
        return None;
    }
    match ty {
        ColumnType::String => Some(Value::String(value.to_string())),
        ColumnType::Integer => parse_integer(value).map(Value::Integer),
        ColumnType::Float => parse_float(value).map(Value::Float),
    }
}

/// Re-types an existing cell, going through its display text.
pub fn coerce_cell(cell: Option<Value>, ty: &ColumnType) -> Option<Value> {
    match (cell, ty) {
        (None, _) => None,
        (Some(Value::String(s)), _) => coerce_typed_value(&s, ty),
        (Some(value), ColumnType::String) => Some(Value::String(value.as_display())),
        (Some(value), ColumnType::Integer) => value.as_i64().map(Value::Integer),
        (Some(value), ColumnType::Float) => value.as_f64().map(Value::Float),
    }
}

fn numeric_text(value: &str) -> String {
    value.trim().replace(',', ".")
}

fn parse_float(value: &str) -> Option<f64> {
    numeric_text(value)
        .parse::<f64>()
        .ok()
        .filter(|parsed| parsed.is_finite())
}

fn parse_integer(value: &str) -> Option<i64> {
    let text = numeric_text(value);
    text.parse::<i64>()
        .ok()
        .or_else(|| text.parse::<f64>().ok().and_then(float_to_integer))
}

fn float_to_integer(value: f64) -> Option<i64> {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Some(value as i64)
    } else {
        None
    }
}
