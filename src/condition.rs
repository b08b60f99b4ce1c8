//! Filter conditions for csvtab
//!
//! A `Condition` is a (column, operator, value) triple such as `PTS >= 30`.
//! It is the form in which callers usually build filter predicates, and it
//! can be parsed from text for command-line use.
//!
//! Ordering operators only match when the cell and the literal are
//! comparable: both numeric, both strings, or both booleans. A NULL cell
//! never satisfies an ordering operator.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

use crate::dataset::{Dataset, Row, RowRef};
use crate::error::{CsvTabError, CsvTabResult};
use crate::inference::Schema;
use crate::query;
use crate::value::Value;

const CONDITION_PATTERN: &str = r"^\s*(.+?)\s*(>=|<=|==|!=|>|<)\s*(.*?)\s*$";

static CONDITION_REGEX: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();

/// The compiled condition pattern, built on first use
fn condition_regex() -> CsvTabResult<&'static Regex> {
    CONDITION_REGEX
        .get_or_init(|| Regex::new(CONDITION_PATTERN))
        .as_ref()
        .map_err(|e| CsvTabError::InvalidCondition(e.to_string()))
}

/// Comparison operator of a condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Gt,
    Ge,
    Lt,
    Le,
    Eq,
    Ne,
}

impl FromStr for CompareOp {
    type Err = CsvTabError;

    fn from_str(op: &str) -> CsvTabResult<Self> {
        match op {
            ">" => Ok(CompareOp::Gt),
            ">=" => Ok(CompareOp::Ge),
            "<" => Ok(CompareOp::Lt),
            "<=" => Ok(CompareOp::Le),
            "==" => Ok(CompareOp::Eq),
            "!=" => Ok(CompareOp::Ne),
            _ => Err(CsvTabError::InvalidCondition(format!(
                "unknown operator '{}'",
                op
            ))),
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
        };
        f.write_str(symbol)
    }
}

/// One column/operator/value filter
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    column: String,
    op: CompareOp,
    value: Value,
}

impl Condition {
    /// Build a condition from its three parts
    ///
    /// The literal is read as an integer, then a float, and otherwise kept
    /// as a string.
    pub fn new(column: &str, op: &str, value: &str) -> CsvTabResult<Self> {
        if column.trim().is_empty() {
            return Err(CsvTabError::InvalidCondition("missing column".to_string()));
        }
        if value.trim().is_empty() {
            return Err(CsvTabError::InvalidCondition(format!(
                "missing value for column '{}'",
                column
            )));
        }

        Ok(Condition {
            column: column.to_string(),
            op: op.parse()?,
            value: parse_literal(value),
        })
    }

    /// Parse the textual form `column OP value`, e.g. `PTS >= 30`
    pub fn parse(text: &str) -> CsvTabResult<Self> {
        let caps = condition_regex()?.captures(text).ok_or_else(|| {
            CsvTabError::InvalidCondition(format!("expected 'column OP value', got '{}'", text))
        })?;

        Condition::new(&caps[1], &caps[2], &caps[3])
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn op(&self) -> CompareOp {
        self.op
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Whether a row satisfies this condition
    pub fn matches(&self, row: RowRef<'_>) -> bool {
        let cell = match row.get(&self.column) {
            Some(cell) => cell,
            None => return false,
        };

        match self.op {
            CompareOp::Eq => cell == &self.value,
            CompareOp::Ne => cell != &self.value,
            op => {
                if !comparable(cell, &self.value) {
                    return false;
                }
                let ordering = cell.cmp(&self.value);
                match op {
                    CompareOp::Gt => ordering.is_gt(),
                    CompareOp::Ge => ordering.is_ge(),
                    CompareOp::Lt => ordering.is_lt(),
                    CompareOp::Le => ordering.is_le(),
                    CompareOp::Eq | CompareOp::Ne => false,
                }
            }
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.column, self.op, self.value)
    }
}

/// Apply every condition in turn; a row must satisfy all of them
///
/// Fails with `ColumnNotFound` if a condition names a column the schema lacks.
pub fn apply_conditions(
    schema: &Schema,
    rows: &[Row],
    conditions: &[Condition],
) -> CsvTabResult<Dataset> {
    for condition in conditions {
        schema.require(&condition.column)?;
    }

    Ok(query::filter(schema, rows, |row| {
        conditions.iter().all(|condition| condition.matches(row))
    }))
}

fn parse_literal(text: &str) -> Value {
    let trimmed = text.trim();
    if let Ok(i) = trimmed.parse::<i64>() {
        Value::Integer(i)
    } else if let Ok(f) = trimmed.parse::<f64>() {
        Value::Float(f)
    } else {
        Value::String(text.to_string())
    }
}

fn comparable(a: &Value, b: &Value) -> bool {
    matches!(
        (a, b),
        (Value::Integer(_) | Value::Float(_), Value::Integer(_) | Value::Float(_))
            | (Value::String(_), Value::String(_))
            | (Value::Boolean(_), Value::Boolean(_))
    )
}
