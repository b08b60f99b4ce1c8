//! CLI argument parsing module for csvtab
//!
//! This module defines the command-line interface using the clap crate.
//! One input file is loaded, optionally joined with a second file, and then
//! filtered, projected and sorted, or aggregated instead.

use anyhow::Result;
use clap::Parser;

/// Command-line arguments for csvtab
#[derive(Parser, Debug)]
#[clap(
    author,
    version,
    about = "Query delimited text files as typed tables"
)]
pub struct CsvTabArgs {
    /// Input file to query - format: [name=]file_path
    #[clap(help = "Input file to query as [name=]file_path")]
    pub file: String,

    /// Field separator character; `\t` selects tab
    #[clap(short = 'F', long, default_value = ",", help = "Field separator character")]
    pub delimiter: String,

    /// Keep every field as trimmed text instead of inferring types
    #[clap(long, help = "Disable type inference")]
    pub no_infer: bool,

    /// Read the input in batches of this many rows
    ///
    /// Without this option small files are read whole and larger files in
    /// batches sized by the file size.
    #[clap(long, help = "Batch size for chunked loading")]
    pub chunk_size: Option<usize>,

    /// Filter conditions, all of which must hold
    ///
    /// Example: -w "PTS >= 30" -w "Tm == LAL"
    #[clap(short = 'w', long = "where", help = "Filter condition as 'column OP value'")]
    pub conditions: Vec<String>,

    /// Columns to keep, comma separated
    #[clap(short, long, value_delimiter = ',', help = "Columns to output")]
    pub columns: Vec<String>,

    /// Column to sort by
    #[clap(long, help = "Column to sort by")]
    pub sort: Option<String>,

    /// Sort in descending order
    #[clap(long, requires = "sort", help = "Sort in descending order")]
    pub desc: bool,

    /// Second file to inner-join with - format: [name=]file_path
    #[clap(long, requires_all = ["left_on", "right_on"], help = "File to join with")]
    pub join: Option<String>,

    /// Join key column in the input file
    #[clap(long, requires = "join", help = "Join key in the input file")]
    pub left_on: Option<String>,

    /// Join key column in the joined file
    #[clap(long, requires = "join", help = "Join key in the joined file")]
    pub right_on: Option<String>,

    /// Aggregate function: sum, avg, max, min or count
    #[clap(long, requires = "target", help = "Aggregate function")]
    pub aggregate: Option<String>,

    /// Column to aggregate
    #[clap(long, requires = "aggregate", help = "Column to aggregate")]
    pub target: Option<String>,

    /// Column to group the aggregate by
    #[clap(long, requires = "aggregate", help = "Column to group by")]
    pub group_by: Option<String>,

    /// Print a JSON summary of the loaded file instead of rows
    #[clap(long, help = "Print dataset summary as JSON")]
    pub summary: bool,

    /// Enable verbose diagnostic output
    #[clap(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

/// Parse command-line arguments into the CsvTabArgs structure
pub fn parse_args() -> Result<CsvTabArgs> {
    Ok(CsvTabArgs::parse())
}
