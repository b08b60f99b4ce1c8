//! Aggregate function module for csvtab
//!
//! This module contains the five supported aggregate functions and the
//! result type returned by grouped and ungrouped aggregation.

use std::fmt;
use std::str::FromStr;

use crate::error::{CsvTabError, CsvTabResult};
use crate::value::Value;

/// Supported aggregate functions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFunction {
    /// COUNT function - counts the non-null values
    Count,
    /// SUM function - sums numeric values in a column
    Sum,
    /// AVG function - calculates the average of numeric values in a column
    Avg,
    /// MIN function - finds the minimum value in a column
    Min,
    /// MAX function - finds the maximum value in a column
    Max,
}

impl FromStr for AggregateFunction {
    type Err = CsvTabError;

    /// Function names are matched case-insensitively
    fn from_str(name: &str) -> CsvTabResult<Self> {
        match name.to_lowercase().as_str() {
            "count" => Ok(AggregateFunction::Count),
            "sum" => Ok(AggregateFunction::Sum),
            "avg" => Ok(AggregateFunction::Avg),
            "min" => Ok(AggregateFunction::Min),
            "max" => Ok(AggregateFunction::Max),
            _ => Err(CsvTabError::UnsupportedAggregation(name.to_string())),
        }
    }
}

impl fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AggregateFunction::Count => "count",
            AggregateFunction::Sum => "sum",
            AggregateFunction::Avg => "avg",
            AggregateFunction::Min => "min",
            AggregateFunction::Max => "max",
        };
        f.write_str(name)
    }
}

impl AggregateFunction {
    /// Execute the aggregate function on the values of one group
    ///
    /// NULL values never contribute. Any other non-numeric value reaching
    /// `sum` or `avg` is an `UnsupportedOperand` error.
    pub fn execute(&self, values: &[&Value]) -> CsvTabResult<Value> {
        match self {
            AggregateFunction::Count => Ok(self.count(values)),
            AggregateFunction::Sum => self.sum(values).map(|(sum, _)| sum),
            AggregateFunction::Avg => self.avg(values),
            AggregateFunction::Min => Ok(self.min(values)),
            AggregateFunction::Max => Ok(self.max(values)),
        }
    }

    fn count(&self, values: &[&Value]) -> Value {
        let count = values.iter().filter(|v| !v.is_null()).count();
        Value::Integer(count as i64)
    }

    /// Returns the sum together with the number of values summed
    ///
    /// The sum stays an integer until a float is seen or the integer sum overflows.
    fn sum(&self, values: &[&Value]) -> CsvTabResult<(Value, usize)> {
        let mut int_sum: Option<i64> = Some(0);
        let mut float_sum: f64 = 0.0;
        let mut count = 0;

        for value in values {
            match value {
                Value::Null => continue,
                Value::Integer(i) => {
                    int_sum = int_sum.and_then(|sum| sum.checked_add(*i));
                    float_sum += *i as f64;
                }
                Value::Float(f) => {
                    int_sum = None;
                    float_sum += *f;
                }
                other => {
                    return Err(CsvTabError::UnsupportedOperand(format!(
                        "cannot {} non-numeric value '{}'",
                        self, other
                    )));
                }
            }
            count += 1;
        }

        let sum = match int_sum {
            Some(i) => Value::Integer(i),
            None => Value::Float(float_sum),
        };
        Ok((sum, count))
    }

    fn avg(&self, values: &[&Value]) -> CsvTabResult<Value> {
        let (sum, count) = self.sum(values)?;
        if count == 0 {
            return Ok(Value::Null);
        }

        match sum.as_f64() {
            Some(total) => Ok(Value::Float(total / count as f64)),
            None => Ok(Value::Null),
        }
    }

    fn min(&self, values: &[&Value]) -> Value {
        values
            .iter()
            .filter(|v| !v.is_null())
            .min()
            .map(|v| (*v).clone())
            .unwrap_or(Value::Null)
    }

    fn max(&self, values: &[&Value]) -> Value {
        values
            .iter()
            .filter(|v| !v.is_null())
            .max()
            .map(|v| (*v).clone())
            .unwrap_or(Value::Null)
    }
}

/// Result of an aggregation
#[derive(Debug, Clone, PartialEq)]
pub enum Aggregation {
    /// One value computed over the whole dataset
    Scalar(Value),
    /// One value per distinct group key, in order of first appearance
    Grouped(Vec<(Value, Value)>),
}

impl Aggregation {
    /// Look up the result for a group key; a scalar result has no groups
    pub fn group(&self, key: &Value) -> Option<&Value> {
        match self {
            Aggregation::Scalar(_) => None,
            Aggregation::Grouped(groups) => groups
                .iter()
                .find(|(group_key, _)| group_key == key)
                .map(|(_, value)| value),
        }
    }
}
