//! Tabular source records.
//!
//! A `SourceRecord` is one row of the news dataset: a positional index plus a
//! set of named columns. Columns may be missing entirely or hold a null/NaN
//! marker; `SourceRecord::present` is the single place where that distinction
//! is collapsed.

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// Errors raised while building a record from raw input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordError {
    /// The raw row was not a JSON object.
    #[error("Row {position} is not an object: {found}")]
    NotAnObject { position: usize, found: String },
}

/// A single cell of a source row.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<CellValue>),
}

impl CellValue {
    /// True for an explicit null and for a floating point NaN.
    pub fn is_null(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Float(f) => f.is_nan(),
            _ => false,
        }
    }

    /// Short name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            CellValue::Null => "null",
            CellValue::Bool(_) => "bool",
            CellValue::Int(_) => "int",
            CellValue::Float(_) => "float",
            CellValue::Str(_) => "string",
            CellValue::List(_) => "list",
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Bool(true) => f.write_str("True"),
            CellValue::Bool(false) => f.write_str("False"),
            CellValue::Int(i) => write!(f, "{}", i),
            // Integral floats keep their fractional digit, so `123.0` and `123`
            // never collapse into the same id.
            CellValue::Float(x) if x.is_finite() && x.fract() == 0.0 && x.abs() < 1e16 => {
                write!(f, "{:.1}", x)
            }
            CellValue::Float(x) => write!(f, "{}", x),
            CellValue::Str(s) => f.write_str(s),
            CellValue::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<&Value> for CellValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => CellValue::Null,
            Value::Bool(b) => CellValue::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => CellValue::Int(i),
                None => CellValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => CellValue::Str(s.clone()),
            Value::Array(items) => CellValue::List(items.iter().map(CellValue::from).collect()),
            // Nested objects are not part of the dataset shape; keep their text.
            Value::Object(_) => CellValue::Str(value.to_string()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Str(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Str(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Int(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Float(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

impl<T: Into<CellValue>> From<Vec<T>> for CellValue {
    fn from(values: Vec<T>) -> Self {
        CellValue::List(values.into_iter().map(Into::into).collect())
    }
}

/// One row of the source dataset.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SourceRecord {
    /// Position of the row in the dataset, used for synthetic ids.
    pub position: usize,
    columns: HashMap<String, CellValue>,
}

impl SourceRecord {
    /// Create an empty record at the given position.
    pub fn new(position: usize) -> Self {
        Self {
            position,
            columns: HashMap::new(),
        }
    }

    /// Set a column, returning the record for chaining.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.insert(column, value);
        self
    }

    /// Build a record from a JSON object.
    pub fn from_json(position: usize, value: &Value) -> Result<Self, RecordError> {
        let object = value.as_object().ok_or_else(|| RecordError::NotAnObject {
            position,
            found: value.to_string(),
        })?;

        let columns = object
            .iter()
            .map(|(name, cell)| (name.clone(), CellValue::from(cell)))
            .collect();

        Ok(Self { position, columns })
    }

    /// Set a column value.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<CellValue>) {
        self.columns.insert(column.into(), value.into());
    }

    /// Raw access to a column, including null markers.
    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.columns.get(column)
    }

    /// The column's value if it exists and is neither null nor NaN.
    pub fn present(&self, column: &str) -> Option<&CellValue> {
        self.columns.get(column).filter(|value| !value.is_null())
    }
}
