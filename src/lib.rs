//! csvtab library crate
//!
//! csvtab loads delimited text files into typed in-memory tables and answers
//! ad-hoc queries against them. The library provides:
//!
//! - A quote-aware line tokenizer with a configurable delimiter
//! - Per-field type inference and order-independent schema promotion
//! - Full and chunked (batch-streaming) ingestion
//! - Query primitives: projection, filter, stable null-aware sort,
//!   grouped aggregation (sum, avg, max, min, count) and inner hash join
//! - Filter conditions built from column/operator/value triples
//! - An explicit dataset store that records how each dataset was loaded
//!
//! Datasets are immutable snapshots; every query returns new data, so the
//! same dataset can be read from several places without coordination.

pub mod aggregate;
pub mod cli;
pub mod condition;
pub mod config;
pub mod dataset;
pub mod error;
pub mod inference;
pub mod ingest;
pub mod query;
pub mod store;
pub mod tokenizer;
pub mod value;

pub use aggregate::{AggregateFunction, Aggregation};
pub use condition::{CompareOp, Condition};
pub use config::{IngestConfig, LoadStrategy};
pub use dataset::{Dataset, Row, RowRef};
pub use error::{CsvTabError, CsvTabResult};
pub use inference::Schema;
pub use ingest::{ChunkReader, Ingestor};
pub use store::{DatasetStore, LoadStats};
pub use value::{ColumnType, Value};
