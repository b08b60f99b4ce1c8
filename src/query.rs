//! Query primitives for csvtab
//!
//! Every primitive takes an explicit `(schema, rows)` pair and returns new
//! data; the input rows are never modified.
//!
//! - `project` restricts rows to a list of columns
//! - `filter` keeps the rows matching a predicate
//! - `sort` orders rows by one column, stably, with NULL as the minimum
//! - `aggregate` computes sum/avg/max/min/count, optionally per group
//! - `join` performs an inner equality hash join

use std::collections::HashMap;

use log::debug;

use crate::aggregate::{AggregateFunction, Aggregation};
use crate::dataset::{Dataset, Row, RowRef};
use crate::error::CsvTabResult;
use crate::inference::Schema;
use crate::value::Value;

/// Restrict every row to the requested columns, in the requested order
///
/// # Arguments
/// * `schema` - Schema describing `rows`
/// * `rows` - Rows to project
/// * `columns` - Column names to keep
///
/// # Returns
/// * A new dataset whose schema is the projected subset of `schema`
/// * `ColumnNotFound` if any column is absent from the schema
pub fn project(schema: &Schema, rows: &[Row], columns: &[&str]) -> CsvTabResult<Dataset> {
    let indices = columns
        .iter()
        .map(|name| schema.require(name))
        .collect::<CsvTabResult<Vec<usize>>>()?;

    let projected_schema = Schema::new(
        indices
            .iter()
            .map(|&idx| schema.columns()[idx].clone())
            .collect(),
    );

    let projected_rows = rows
        .iter()
        .map(|row| indices.iter().map(|&idx| row[idx].clone()).collect())
        .collect();

    Ok(Dataset::new(projected_schema, projected_rows))
}

/// Keep the rows for which `predicate` holds, preserving their order
///
/// # Arguments
/// * `schema` - Schema describing `rows`, kept unchanged on the result
/// * `rows` - Rows to filter
/// * `predicate` - Called once per row with a named view of it
pub fn filter<F>(schema: &Schema, rows: &[Row], predicate: F) -> Dataset
where
    F: Fn(RowRef<'_>) -> bool,
{
    let kept = rows
        .iter()
        .filter(|row| predicate(RowRef::new(schema, row)))
        .cloned()
        .collect();

    Dataset::new(schema.clone(), kept)
}

/// Order rows by one column
///
/// NULL is the minimum value in either direction, so it leads an ascending
/// sort and trails a descending one. Ties keep their original order.
///
/// # Arguments
/// * `column` - Column to order by
/// * `descending` - Largest values first when true
///
/// # Returns
/// * The sorted rows with the source schema
/// * `ColumnNotFound` if the column is absent
pub fn sort(schema: &Schema, rows: &[Row], column: &str, descending: bool) -> CsvTabResult<Dataset> {
    let idx = schema.require(column)?;

    let mut sorted = rows.to_vec();
    // slice::sort_by is stable
    if descending {
        sorted.sort_by(|a, b| b[idx].cmp(&a[idx]));
    } else {
        sorted.sort_by(|a, b| a[idx].cmp(&b[idx]));
    }

    Ok(Dataset::new(schema.clone(), sorted))
}

/// Aggregate the `target` column, either over all rows or per `group_by` value
///
/// NULL is a valid group key. Groups appear in the order their key was
/// first seen.
///
/// # Arguments
/// * `group_by` - Optional column whose distinct values form the groups
/// * `target` - Column the function is applied to
/// * `func` - Aggregate function to apply
///
/// # Returns
/// * `Aggregation::Scalar` without `group_by`, `Aggregation::Grouped` with it
/// * `ColumnNotFound`, or `UnsupportedOperand` for non-numeric sum/avg input
pub fn aggregate(
    schema: &Schema,
    rows: &[Row],
    group_by: Option<&str>,
    target: &str,
    func: AggregateFunction,
) -> CsvTabResult<Aggregation> {
    let target_idx = schema.require(target)?;

    let group_idx = match group_by {
        Some(column) => schema.require(column)?,
        None => {
            let values: Vec<&Value> = rows.iter().map(|row| &row[target_idx]).collect();
            return func.execute(&values).map(Aggregation::Scalar);
        }
    };

    let mut positions: HashMap<&Value, usize> = HashMap::new();
    let mut groups: Vec<(&Value, Vec<&Value>)> = Vec::new();

    for row in rows {
        let key = &row[group_idx];
        let slot = *positions.entry(key).or_insert_with(|| {
            groups.push((key, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(&row[target_idx]);
    }

    debug!("aggregating {} over {} groups", func, groups.len());

    let results = groups
        .into_iter()
        .map(|(key, values)| Ok((key.clone(), func.execute(&values)?)))
        .collect::<CsvTabResult<Vec<(Value, Value)>>>()?;

    Ok(Aggregation::Grouped(results))
}

/// Where a merged join column takes its value from
#[derive(Clone, Copy)]
enum Side {
    Left(usize),
    Right(usize),
}

/// Inner equality hash join
///
/// The right rows are indexed by `right_key`; each left row then probes the
/// index with its `left_key` value and emits one merged row per match. A
/// merged row carries the left columns followed by any right columns not
/// already present, and right values win on a name collision.
///
/// A key column missing from its side, or a NULL key, never matches, so such
/// rows are simply absent from the result. The merged schema is inferred
/// afresh over the output rows.
///
/// # Arguments
/// * `left_schema`, `left_rows` - Probe side; output follows its row order
/// * `right_schema`, `right_rows` - Indexed side
/// * `left_key`, `right_key` - Key column on each side
///
/// # Returns
/// * The merged rows; empty, never an error, when nothing matches
pub fn join(
    left_schema: &Schema,
    left_rows: &[Row],
    right_schema: &Schema,
    right_rows: &[Row],
    left_key: &str,
    right_key: &str,
) -> Dataset {
    let mut header = Vec::with_capacity(left_schema.len() + right_schema.len());
    let mut sides = Vec::with_capacity(header.capacity());

    for (i, (name, _)) in left_schema.columns().iter().enumerate() {
        header.push(name.clone());
        sides.push(match right_schema.column_index(name) {
            Some(j) => Side::Right(j),
            None => Side::Left(i),
        });
    }
    for (j, (name, _)) in right_schema.columns().iter().enumerate() {
        if left_schema.column_index(name).is_none() {
            header.push(name.clone());
            sides.push(Side::Right(j));
        }
    }

    let mut merged: Vec<Row> = Vec::new();

    if let (Some(left_idx), Some(right_idx)) = (
        left_schema.column_index(left_key),
        right_schema.column_index(right_key),
    ) {
        let mut index: HashMap<&Value, Vec<&Row>> = HashMap::new();
        for row in right_rows {
            let key = &row[right_idx];
            if !key.is_null() {
                index.entry(key).or_default().push(row);
            }
        }

        for left in left_rows {
            let key = &left[left_idx];
            if key.is_null() {
                continue;
            }
            if let Some(matches) = index.get(key) {
                for right in matches {
                    merged.push(
                        sides
                            .iter()
                            .map(|side| match *side {
                                Side::Left(i) => left[i].clone(),
                                Side::Right(j) => right[j].clone(),
                            })
                            .collect(),
                    );
                }
            }
        }
    }

    debug!(
        "joined {} left rows with {} right rows into {} rows",
        left_rows.len(),
        right_rows.len(),
        merged.len()
    );

    Dataset::from_rows(&header, merged)
}
