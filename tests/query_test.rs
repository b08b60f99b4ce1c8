//! Query tests for csvtab
//!
//! Runs the query primitives over datasets loaded from the fixture files,
//! chaining them the way a caller would.

mod support;

use csvtab::condition::apply_conditions;
use csvtab::query;
use csvtab::{
    AggregateFunction, Aggregation, ColumnType, Condition, CsvTabError, Dataset, Ingestor, Value,
};
use support::{coaches_file, players_file};

fn players() -> Dataset {
    Ingestor::default()
        .load(&players_file())
        .expect("players fixture loads")
}

fn coaches() -> Dataset {
    Ingestor::default()
        .load(&coaches_file())
        .expect("coaches fixture loads")
}

fn names(data: &Dataset) -> Vec<String> {
    data.column("Player")
        .expect("Player column")
        .into_iter()
        .map(|v| v.to_string())
        .collect()
}

#[test]
fn test_filter_project_sort_pipeline() {
    let data = players();

    let conditions = vec![Condition::parse("PTS >= 20").unwrap()];
    let filtered = apply_conditions(data.schema(), data.rows(), &conditions).unwrap();
    let projected = filtered.project(&["Player", "PTS"]).unwrap();
    let sorted = projected.sort("PTS", true).unwrap();

    assert_eq!(sorted.columns(), vec!["Player", "PTS"]);
    assert_eq!(names(&sorted), vec!["LeBron James", "Jayson Tatum", "Stephen Curry"]);

    // The source dataset is untouched
    assert_eq!(data.row_count(), 5);
    assert_eq!(data.columns().len(), 5);
}

#[test]
fn test_primitives_on_explicit_rows_and_schema() {
    let data = players();
    let starters = query::filter(data.schema(), data.rows(), |row| {
        row.get("Starter") == Some(&Value::Boolean(true))
    });
    assert_eq!(starters.row_count(), 4);

    let total = query::aggregate(
        starters.schema(),
        starters.rows(),
        None,
        "TRB",
        AggregateFunction::Sum,
    )
    .unwrap();
    assert_eq!(total, Aggregation::Scalar(Value::Integer(34)));
}

#[test]
fn test_sort_puts_nulls_first_ascending() {
    let sorted = players().sort("PTS", false).unwrap();
    assert_eq!(
        names(&sorted),
        vec![
            "Anthony Davis",
            "Green, Draymond",
            "Stephen Curry",
            "Jayson Tatum",
            "LeBron James"
        ]
    );
}

#[test]
fn test_grouped_aggregates() {
    let data = players();

    let counts = data.aggregate(Some("Tm"), "PTS", "count").unwrap();
    assert_eq!(
        counts,
        Aggregation::Grouped(vec![
            (Value::from("LAL"), Value::Integer(1)),
            (Value::from("GSW"), Value::Integer(2)),
            (Value::from("BOS"), Value::Integer(1)),
        ])
    );

    let rebounds = data.aggregate(Some("Tm"), "TRB", "sum").unwrap();
    assert_eq!(rebounds.group(&Value::from("LAL")), Some(&Value::Integer(20)));

    let best = data.aggregate(Some("Tm"), "PTS", "MAX").unwrap();
    assert_eq!(best.group(&Value::from("GSW")), Some(&Value::Integer(25)));
}

#[test]
fn test_aggregate_failures() {
    let data = players();
    assert!(matches!(
        data.aggregate(None, "PTS", "stddev"),
        Err(CsvTabError::UnsupportedAggregation(_))
    ));
    assert!(matches!(
        data.aggregate(None, "Tm", "sum"),
        Err(CsvTabError::UnsupportedOperand(_))
    ));
    assert!(matches!(
        data.aggregate(None, "AST", "sum"),
        Err(CsvTabError::ColumnNotFound(_))
    ));
}

#[test]
fn test_avg_over_all_nulls() {
    let data = players();
    let davis = data.filter(|row| row.get("Player") == Some(&Value::from("Anthony Davis")));
    assert_eq!(
        davis.aggregate(None, "PTS", "avg").unwrap(),
        Aggregation::Scalar(Value::Null)
    );
}

#[test]
fn test_join_players_with_coaches() {
    let joined = players().join(&coaches(), "Tm", "Tm");

    assert_eq!(
        joined.columns(),
        vec!["Player", "Tm", "PTS", "TRB", "Starter", "Coach"]
    );
    // Tatum's team has no coach row and BKN has no players
    assert_eq!(joined.row_count(), 4);
    let coaches: Vec<String> = joined
        .column("Coach")
        .unwrap()
        .into_iter()
        .map(|v| v.to_string())
        .collect();
    assert_eq!(
        coaches,
        vec!["Darvin Ham", "Steve Kerr", "Darvin Ham", "Steve Kerr"]
    );
    assert_eq!(joined.schema().column_type("Coach"), Some(ColumnType::String));
    assert_eq!(joined.schema().column_type("PTS"), Some(ColumnType::Int));
}

#[test]
fn test_join_on_absent_key_is_empty() {
    let joined = players().join(&coaches(), "Tm", "Team");
    assert_eq!(joined.row_count(), 0);
}
