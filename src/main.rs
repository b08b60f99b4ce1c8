//! csvtab - query delimited text files as typed in-memory tables
//!
//! # Program Flow
//!
//! 1. Parse command-line arguments and build the configuration
//! 2. Load the input file (and an optional join file) into a dataset store
//! 3. Join, filter, project and sort, or aggregate
//! 4. Print the result to stdout as delimited text

use std::io;

use anyhow::{Context, Result};
use log::debug;

use csvtab::cli::{self, CsvTabArgs};
use csvtab::condition::{apply_conditions, Condition};
use csvtab::config::{parse_delimiter, AppConfig, IngestConfig};
use csvtab::dataset::DatasetSummary;
use csvtab::{Aggregation, Dataset, DatasetStore, LoadStats};
use serde::Serialize;

/// JSON document printed by `--summary`
#[derive(Serialize)]
struct SummaryReport<'a> {
    dataset: &'a str,
    summary: DatasetSummary<'a>,
    load: Option<&'a LoadStats>,
}

fn main() -> Result<()> {
    let args = cli::parse_args()?;

    let config = build_config(&args)?;

    let default_level = if config.verbose() { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
    debug!("Arguments: {args:?}");

    // Datasets live in an explicit store for the lifetime of the process
    let mut store = DatasetStore::new();

    let name = store
        .load_spec(&args.file, config.ingest())
        .with_context(|| format!("Failed to load file: {}", args.file))?;

    if args.summary {
        let report = SummaryReport {
            dataset: &name,
            summary: store.get(&name)?.summary(),
            load: store.stats(&name),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let mut working = store.get(&name)?.clone();

    let join_name = match &args.join {
        Some(join_spec) => Some(
            store
                .load_spec(join_spec, config.ingest())
                .with_context(|| format!("Failed to load join file: {join_spec}"))?,
        ),
        None => None,
    };

    if let (Some(join_name), Some(left_on), Some(right_on)) =
        (&join_name, &args.left_on, &args.right_on)
    {
        working = working.join(store.get(join_name)?, left_on, right_on);
        debug!("Join with {join_name} produced {} rows", working.row_count());
    }

    if !args.conditions.is_empty() {
        let conditions = args
            .conditions
            .iter()
            .map(|text| Condition::parse(text))
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to parse filter condition")?;
        working = apply_conditions(working.schema(), working.rows(), &conditions)
            .context("Failed to apply filters")?;
    }

    if let (Some(func), Some(target)) = (&args.aggregate, &args.target) {
        let result = working
            .aggregate(args.group_by.as_deref(), target, func)
            .with_context(|| format!("Failed to aggregate {func}({target})"))?;
        let label = format!("{}({})", func.to_lowercase(), target);
        print_aggregation(&result, args.group_by.as_deref(), &label, config.output_delimiter())?;
        return Ok(());
    }

    if !args.columns.is_empty() {
        let columns: Vec<&str> = args.columns.iter().map(String::as_str).collect();
        working = working
            .project(&columns)
            .context("Failed to select columns")?;
    }

    if let Some(column) = &args.sort {
        working = working
            .sort(column, args.desc)
            .with_context(|| format!("Failed to sort by {column}"))?;
    }

    debug!("Query returned {} rows", working.row_count());
    print_dataset(&working, config.output_delimiter())
}

fn build_config(args: &CsvTabArgs) -> Result<AppConfig> {
    let delimiter = parse_delimiter(&args.delimiter)?;
    let mut ingest = IngestConfig::new()
        .with_delimiter(delimiter)
        .with_type_inference(!args.no_infer);
    if let Some(size) = args.chunk_size {
        ingest = ingest.with_chunk_size(size)?;
    }
    Ok(AppConfig::new(args.verbose, ingest))
}

fn print_dataset(dataset: &Dataset, delimiter: u8) -> Result<()> {
    let stdout = io::stdout();
    dataset.write_delimited(stdout.lock(), delimiter)?;
    Ok(())
}

fn print_aggregation(
    result: &Aggregation,
    group_by: Option<&str>,
    label: &str,
    delimiter: u8,
) -> Result<()> {
    let stdout = io::stdout();
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(stdout.lock());

    match result {
        Aggregation::Scalar(value) => {
            writer.write_record([label])?;
            writer.write_record([value.to_field()])?;
        }
        Aggregation::Grouped(groups) => {
            writer.write_record([group_by.unwrap_or("group"), label])?;
            for (key, value) in groups {
                writer.write_record([key.to_field(), value.to_field()])?;
            }
        }
    }

    writer.flush()?;
    Ok(())
}
