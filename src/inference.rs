//! Type inference for csvtab
//!
//! Two layers live here:
//!
//! - value inference, which turns one raw field into a typed `Value`
//! - schema inference, which scans every row of a dataset and settles one
//!   `ColumnType` per column
//!
//! Schema promotion is monotonic: a column's type is seeded by its first
//! non-null value, and any later non-null value of a different type
//! collapses it to string. String absorbs everything, so the result does not
//! depend on row order. Mixed int/float columns also collapse to string
//! rather than widening to float.

use std::collections::HashMap;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::dataset::Row;
use crate::error::{CsvTabError, CsvTabResult};
use crate::value::{ColumnType, Value};

/// Infer a typed value from one raw field
///
/// Empty or all-whitespace fields become NULL. Otherwise the trimmed text
/// is tried as an integer, then a float, then a case-insensitive
/// `true`/`false`, and finally kept as a string.
pub fn infer_value(field: &str) -> Value {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }

    if let Ok(i) = trimmed.parse::<i64>() {
        return Value::Integer(i);
    }

    if let Ok(f) = trimmed.parse::<f64>() {
        return Value::Float(f);
    }

    if trimmed.eq_ignore_ascii_case("true") {
        return Value::Boolean(true);
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return Value::Boolean(false);
    }

    Value::String(trimmed.to_string())
}

/// Store a raw field without inference: trimmed text, or NULL when blank
pub fn raw_value(field: &str) -> Value {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        Value::Null
    } else {
        Value::String(trimmed.to_string())
    }
}

/// Fold one observed type into a column's current promotion
pub fn promote(current: Option<ColumnType>, observed: ColumnType) -> ColumnType {
    match current {
        None => observed,
        Some(ty) if ty == observed => ty,
        Some(_) => ColumnType::String,
    }
}

/// Infer a schema over an entire set of rows at once
///
/// `header` defines column order; each row is positionally aligned with it.
/// Columns that never hold a non-null value default to string.
pub fn infer_schema(header: &[String], rows: &[Row]) -> Schema {
    let mut promoted: Vec<Option<ColumnType>> = vec![None; header.len()];

    for row in rows {
        for (slot, value) in promoted.iter_mut().zip(row.iter()) {
            if let Some(observed) = value.column_type() {
                *slot = Some(promote(*slot, observed));
            }
        }
    }

    let columns = header
        .iter()
        .cloned()
        .zip(promoted)
        .map(|(name, ty)| (name, ty.unwrap_or(ColumnType::String)))
        .collect();

    Schema::new(columns)
}

/// Ordered mapping from column name to inferred column type
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    columns: Vec<(String, ColumnType)>,
    column_map: HashMap<String, usize>,
}

impl Schema {
    /// Create a schema from `(name, type)` pairs in column order
    pub fn new(columns: Vec<(String, ColumnType)>) -> Self {
        let column_map = columns
            .iter()
            .enumerate()
            .map(|(i, (name, _))| (name.clone(), i))
            .collect();

        Schema {
            columns,
            column_map,
        }
    }

    /// Column names in order
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|(name, _)| name.clone()).collect()
    }

    /// `(name, type)` pairs in order
    pub fn columns(&self) -> &[(String, ColumnType)] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Get the index of a column by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.column_map.get(name).copied()
    }

    /// Get the inferred type of a column by name
    pub fn column_type(&self, name: &str) -> Option<ColumnType> {
        self.column_index(name).map(|i| self.columns[i].1)
    }

    /// Look up a column index, failing with `ColumnNotFound` when absent
    pub fn require(&self, name: &str) -> CsvTabResult<usize> {
        self.column_index(name)
            .ok_or_else(|| CsvTabError::ColumnNotFound(name.to_string()))
    }
}

impl Serialize for Schema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, ty) in &self.columns {
            map.serialize_entry(name, ty)?;
        }
        map.end()
    }
}
