//! Dataset module for csvtab
//!
//! This module provides the in-memory table produced by ingestion:
//!
//! - `Row`, a positional sequence of values aligned with the schema's columns
//! - `RowRef`, a borrowed view of one row that resolves values by column name
//! - `Dataset`, an ordered row sequence plus the schema inferred over it
//!
//! A `Dataset` is an immutable snapshot. The query methods on it delegate to
//! the free functions in `crate::query` and always return new data.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::aggregate::{AggregateFunction, Aggregation};
use crate::error::CsvTabResult;
use crate::inference::{infer_schema, Schema};
use crate::query;
use crate::value::Value;

/// Represents a row in a dataset, positionally aligned with its schema
pub type Row = Vec<Value>;

/// Borrowed view of one row together with the schema that names its values
#[derive(Debug, Clone, Copy)]
pub struct RowRef<'a> {
    schema: &'a Schema,
    values: &'a [Value],
}

impl<'a> RowRef<'a> {
    pub fn new(schema: &'a Schema, values: &'a [Value]) -> Self {
        RowRef { schema, values }
    }

    /// Value of the named column, or `None` if the row has no such column
    pub fn get(&self, column: &str) -> Option<&'a Value> {
        self.schema
            .column_index(column)
            .and_then(|i| self.values.get(i))
    }

    pub fn values(&self) -> &'a [Value] {
        self.values
    }

    pub fn schema(&self) -> &'a Schema {
        self.schema
    }
}

impl Serialize for RowRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for ((name, _), value) in self.schema.columns().iter().zip(self.values) {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Represents an ingested table: ordered rows sharing one schema
#[derive(Debug, Clone)]
pub struct Dataset {
    schema: Schema,
    rows: Vec<Row>,
    source: Option<PathBuf>,
}

/// Overview of a dataset, serializable for display
#[derive(Debug, serde::Serialize)]
pub struct DatasetSummary<'a> {
    pub source: Option<String>,
    pub rows: usize,
    pub columns: Vec<String>,
    pub schema: &'a Schema,
    pub sample_row: Option<RowRef<'a>>,
}

impl Dataset {
    /// Create a dataset from rows and an already computed schema
    pub fn new(schema: Schema, rows: Vec<Row>) -> Self {
        Dataset {
            schema,
            rows,
            source: None,
        }
    }

    /// Create a dataset from raw rows, inferring the schema over all of them
    pub fn from_rows(header: &[String], rows: Vec<Row>) -> Self {
        let schema = infer_schema(header, &rows);
        Dataset::new(schema, rows)
    }

    /// Concatenate streamed batches in order and infer the schema once at the end
    pub fn from_batches<I>(header: &[String], batches: I) -> Self
    where
        I: IntoIterator<Item = Vec<Row>>,
    {
        let rows: Vec<Row> = batches.into_iter().flatten().collect();
        Dataset::from_rows(header, rows)
    }

    /// Record the file the dataset was loaded from
    pub fn with_source(mut self, path: &Path) -> Self {
        self.source = Some(path.to_path_buf());
        self
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn columns(&self) -> Vec<String> {
        self.schema.column_names()
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn row(&self, index: usize) -> Option<RowRef<'_>> {
        self.rows
            .get(index)
            .map(|values| RowRef::new(&self.schema, values))
    }

    pub fn iter(&self) -> impl Iterator<Item = RowRef<'_>> {
        self.rows
            .iter()
            .map(move |values| RowRef::new(&self.schema, values))
    }

    /// All values of one column, in row order
    pub fn column(&self, name: &str) -> CsvTabResult<Vec<&Value>> {
        let idx = self.schema.require(name)?;
        Ok(self.rows.iter().map(|row| &row[idx]).collect())
    }

    pub fn summary(&self) -> DatasetSummary<'_> {
        DatasetSummary {
            source: self.source.as_ref().map(|p| p.display().to_string()),
            rows: self.rows.len(),
            columns: self.columns(),
            schema: &self.schema,
            sample_row: self.row(0),
        }
    }

    pub fn project(&self, columns: &[&str]) -> CsvTabResult<Dataset> {
        query::project(&self.schema, &self.rows, columns)
    }

    pub fn filter<F>(&self, predicate: F) -> Dataset
    where
        F: Fn(RowRef<'_>) -> bool,
    {
        query::filter(&self.schema, &self.rows, predicate)
    }

    pub fn sort(&self, column: &str, descending: bool) -> CsvTabResult<Dataset> {
        query::sort(&self.schema, &self.rows, column, descending)
    }

    /// Aggregate `target`, optionally grouped, with a function named by `func`
    pub fn aggregate(
        &self,
        group_by: Option<&str>,
        target: &str,
        func: &str,
    ) -> CsvTabResult<Aggregation> {
        let func: AggregateFunction = func.parse()?;
        query::aggregate(&self.schema, &self.rows, group_by, target, func)
    }

    pub fn join(&self, other: &Dataset, left_key: &str, right_key: &str) -> Dataset {
        query::join(
            &self.schema,
            &self.rows,
            &other.schema,
            &other.rows,
            left_key,
            right_key,
        )
    }

    /// Write the dataset as delimited text, header first
    ///
    /// NULL cells are written as empty fields.
    pub fn write_delimited<W: Write>(&self, writer: W, delimiter: u8) -> CsvTabResult<()> {
        let mut csv_writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(writer);

        csv_writer.write_record(self.schema.column_names())?;

        for row in &self.rows {
            let record: Vec<String> = row.iter().map(Value::to_field).collect();
            csv_writer.write_record(&record)?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}
