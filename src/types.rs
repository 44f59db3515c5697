//! Core data model types for normalized tables.
//!
//! Ingestion produces a [`DataSet`]: a [`Schema`] of inferred [`Field`]s plus row-major
//! [`Value`]s. Every field carries one [`DataType`], and every data type maps onto one of the
//! three [`ColumnKind`]s consumers select by.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, AnalysisResult};

/// Inferred storage type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    /// 64-bit signed integer (all coerced cells were integral).
    Int64,
    /// 64-bit floating point number.
    Float64,
    /// Naive timestamp.
    Datetime,
    /// UTF-8 text that did not coerce to anything else.
    Utf8,
}

impl DataType {
    /// Classification of this data type.
    pub fn kind(self) -> ColumnKind {
        match self {
            DataType::Int64 | DataType::Float64 => ColumnKind::Numeric,
            DataType::Datetime => ColumnKind::Datetime,
            DataType::Utf8 => ColumnKind::Other,
        }
    }
}

/// Column classification exposed to consumers (selection lists, charts, outlier detection).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnKind {
    Numeric,
    Datetime,
    Other,
}

/// A single named, typed field in a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Field/column name (whitespace-trimmed).
    pub name: String,
    /// Field data type.
    pub data_type: DataType,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }

    /// Classification of this field.
    pub fn kind(&self) -> ColumnKind {
        self.data_type.kind()
    }
}

/// Ordered list of fields describing a normalized table.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Schema {
    /// Ordered list of fields.
    pub fields: Vec<Field>,
}

impl Schema {
    /// Create a new schema from fields.
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Iterate field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Returns the index of the first field with this name, if present.
    ///
    /// Duplicate names are kept as ingested; lookups resolve to the leftmost one.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Names of all fields of the given kind, in schema order.
    pub fn columns_of_kind(&self, kind: ColumnKind) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.kind() == kind)
            .map(|f| f.name.as_str())
            .collect()
    }
}

/// A single typed cell in a [`DataSet`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing value, or a cell that failed to coerce.
    Null,
    Int64(i64),
    Float64(f64),
    Datetime(NaiveDateTime),
    Utf8(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view of the cell; integers widen to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int64(v) => Some(*v as f64),
            Value::Float64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Value::Datetime(ts) => Some(*ts),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Utf8(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// In-memory normalized table.
///
/// Rows are stored as `Vec<Vec<Value>>` in the same order as the [`Schema`] fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataSet {
    /// Schema describing row shape.
    pub schema: Schema,
    /// Row-major value storage.
    pub rows: Vec<Vec<Value>>,
}

impl DataSet {
    /// Create a dataset from schema and rows.
    pub fn new(schema: Schema, rows: Vec<Vec<Value>>) -> Self {
        Self { schema, rows }
    }

    /// Number of rows in the dataset.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns in the dataset.
    pub fn column_count(&self) -> usize {
        self.schema.fields.len()
    }

    /// Classification of a column by name.
    pub fn kind_of(&self, name: &str) -> Option<ColumnKind> {
        self.schema
            .index_of(name)
            .map(|idx| self.schema.fields[idx].kind())
    }

    /// Numeric column names, for selection lists.
    pub fn numeric_columns(&self) -> Vec<&str> {
        self.schema.columns_of_kind(ColumnKind::Numeric)
    }

    /// Datetime column names, for selection lists.
    pub fn datetime_columns(&self) -> Vec<&str> {
        self.schema.columns_of_kind(ColumnKind::Datetime)
    }

    /// Iterate the cells of one column, top to bottom.
    pub fn column(&self, idx: usize) -> impl Iterator<Item = &Value> {
        self.rows.iter().map(move |row| row.get(idx).unwrap_or(&Value::Null))
    }

    /// Values of a numeric column as floats, `None` marking missing cells.
    ///
    /// Returns `None` if the column does not exist or is not numeric.
    pub fn numeric_values(&self, name: &str) -> Option<Vec<Option<f64>>> {
        let idx = self.schema.index_of(name)?;
        if self.schema.fields[idx].kind() != ColumnKind::Numeric {
            return None;
        }
        Some(self.column(idx).map(Value::as_f64).collect())
    }

    /// Values of a datetime column, `None` marking missing cells.
    ///
    /// Returns `None` if the column does not exist or is not a datetime column.
    pub fn datetime_values(&self, name: &str) -> Option<Vec<Option<NaiveDateTime>>> {
        let idx = self.schema.index_of(name)?;
        if self.schema.fields[idx].kind() != ColumnKind::Datetime {
            return None;
        }
        Some(self.column(idx).map(Value::as_datetime).collect())
    }

    /// Create a new dataset containing only rows that match `predicate`.
    ///
    /// The returned dataset preserves the original schema.
    pub fn filter_rows<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(usize, &[Value]) -> bool,
    {
        let rows = self
            .rows
            .iter()
            .enumerate()
            .filter(|(idx, row)| predicate(*idx, row.as_slice()))
            .map(|(_, row)| row.clone())
            .collect();
        Self {
            schema: self.schema.clone(),
            rows,
        }
    }

    /// Create a new dataset with one extra trailing column.
    ///
    /// Returns [`AnalysisError::LengthMismatch`] if `values` does not have one entry per row.
    pub fn with_column(&self, field: Field, values: Vec<Value>) -> AnalysisResult<Self> {
        if values.len() != self.row_count() {
            return Err(AnalysisError::LengthMismatch {
                column: field.name,
                expected: self.row_count(),
                found: values.len(),
            });
        }
        let mut schema = self.schema.clone();
        schema.fields.push(field);
        let rows = self
            .rows
            .iter()
            .zip(values)
            .map(|(row, v)| {
                let mut out = row.clone();
                out.push(v);
                out
            })
            .collect();
        Ok(Self { schema, rows })
    }
}
