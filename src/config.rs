//! Configuration module for csvtab
//!
//! This module provides the configuration structures for ingestion and for
//! the command-line application. Settings are created up front and passed
//! explicitly to the components that need them.

use serde::Serialize;

use crate::error::{CsvTabError, CsvTabResult};

const MIB: u64 = 1024 * 1024;

/// Settings that control how a delimited source is ingested
#[derive(Debug, Clone, PartialEq)]
pub struct IngestConfig {
    /// Field delimiter (default `,`)
    delimiter: char,

    /// Whether to infer typed values; when off every field is kept as trimmed text
    type_inference: bool,

    /// Fixed batch size for chunked ingestion; `None` lets the loader decide
    chunk_size: Option<usize>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            type_inference: true,
            chunk_size: None,
        }
    }
}

impl IngestConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_type_inference(mut self, enabled: bool) -> Self {
        self.type_inference = enabled;
        self
    }

    /// Fix the batch size used for chunked ingestion
    ///
    /// Fails with `InvalidChunkSize` for zero.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> CsvTabResult<Self> {
        if chunk_size == 0 {
            return Err(CsvTabError::InvalidChunkSize(chunk_size));
        }
        self.chunk_size = Some(chunk_size);
        Ok(self)
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    pub fn type_inference(&self) -> bool {
        self.type_inference
    }

    pub fn chunk_size(&self) -> Option<usize> {
        self.chunk_size
    }
}

/// Parse a delimiter argument
///
/// Accepts any single character, plus the two-character escape `\t` for tab.
pub fn parse_delimiter(delimiter: &str) -> CsvTabResult<char> {
    if delimiter == "\\t" {
        return Ok('\t');
    }

    let mut chars = delimiter.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(CsvTabError::InvalidDelimiter(delimiter.to_string())),
    }
}

/// How a file is read: all at once, or in batches of a fixed size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadStrategy {
    Full,
    Chunked(usize),
}

impl LoadStrategy {
    /// Pick a strategy from the file size: small files load whole, larger
    /// files use progressively smaller batches
    pub fn for_file_size(bytes: u64) -> Self {
        if bytes < MIB {
            LoadStrategy::Full
        } else if bytes < 10 * MIB {
            LoadStrategy::Chunked(1000)
        } else if bytes < 50 * MIB {
            LoadStrategy::Chunked(500)
        } else if bytes < 100 * MIB {
            LoadStrategy::Chunked(200)
        } else {
            LoadStrategy::Chunked(100)
        }
    }

    /// Strategy for a load: a configured chunk size wins over the size policy
    pub fn resolve(config: &IngestConfig, bytes: u64) -> Self {
        match config.chunk_size() {
            Some(size) => LoadStrategy::Chunked(size),
            None => LoadStrategy::for_file_size(bytes),
        }
    }
}

/// Application configuration
///
/// Created at startup from the command line and passed to the components
/// that need it.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Whether to show verbose output
    verbose: bool,

    /// Ingestion settings shared by every loaded file
    ingest: IngestConfig,
}

impl AppConfig {
    pub fn new(verbose: bool, ingest: IngestConfig) -> Self {
        Self { verbose, ingest }
    }

    /// Get the verbose flag
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// Get the ingestion settings
    pub fn ingest(&self) -> &IngestConfig {
        &self.ingest
    }

    /// Output delimiter as a byte; results are written with the input delimiter
    /// when it is ASCII, and with a comma otherwise
    pub fn output_delimiter(&self) -> u8 {
        let delimiter = self.ingest.delimiter();
        if delimiter.is_ascii() {
            delimiter as u8
        } else {
            b','
        }
    }
}
