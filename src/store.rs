//! Dataset store for csvtab
//!
//! `DatasetStore` is the explicit home for loaded datasets and their load
//! statistics. A caller creates one at startup and passes it to whatever
//! needs it. Entries are added on load and stay until the store is dropped;
//! nothing expires implicitly.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use log::info;
use serde::Serialize;

use crate::config::{IngestConfig, LoadStrategy};
use crate::dataset::Dataset;
use crate::error::{CsvTabError, CsvTabResult};
use crate::ingest::Ingestor;

/// How a dataset was loaded
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadStats {
    pub strategy: LoadStrategy,
    pub batches: usize,
    pub rows: usize,
    pub file_size_bytes: u64,
    pub load_time_secs: f64,
}

/// Named datasets plus the statistics of how each was loaded
#[derive(Debug, Default)]
pub struct DatasetStore {
    datasets: HashMap<String, Dataset>,
    stats: HashMap<String, LoadStats>,
}

impl DatasetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a file under `name`, replacing any dataset already stored there
    ///
    /// The strategy comes from the configured chunk size if one is set, and
    /// from the file size otherwise. Chunked loads concatenate every batch
    /// and infer the schema once after the last one.
    ///
    /// # Arguments
    /// * `name` - Name to store the dataset under
    /// * `path` - Path to the delimited file
    /// * `config` - Ingestion settings
    ///
    /// # Returns
    /// * The statistics recorded for this load
    /// * `SourceNotFound` if the path doesn't exist, or any ingestion error
    pub fn load(&mut self, name: &str, path: &Path, config: &IngestConfig) -> CsvTabResult<&LoadStats> {
        let file_size_bytes = match fs::metadata(path) {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(CsvTabError::SourceNotFound(path.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };

        let start = Instant::now();
        let ingestor = Ingestor::new(config.clone());
        let strategy = LoadStrategy::resolve(config, file_size_bytes);

        let (dataset, batches) = match strategy {
            LoadStrategy::Full => (ingestor.load(path)?, 1),
            LoadStrategy::Chunked(size) => {
                let mut chunks = ingestor.chunks(path, size)?;
                let header = chunks.header().to_vec();
                let mut rows = Vec::new();
                for batch in chunks.by_ref() {
                    rows.extend(batch?);
                }
                let batches = chunks.batches_yielded();
                (Dataset::from_rows(&header, rows).with_source(path), batches)
            }
        };

        let stats = LoadStats {
            strategy,
            batches,
            rows: dataset.row_count(),
            file_size_bytes,
            load_time_secs: start.elapsed().as_secs_f64(),
        };
        info!(
            "[{}] loaded {} rows in {:.2}s",
            name, stats.rows, stats.load_time_secs
        );

        self.datasets.insert(name.to_string(), dataset);
        self.stats.insert(name.to_string(), stats);
        self.stats
            .get(name)
            .ok_or_else(|| CsvTabError::DatasetNotFound(name.to_string()))
    }

    /// Load a file given as `[name=]path` without replacing stored datasets
    ///
    /// The name defaults to the file stem. A stem that is already taken gets
    /// a numeric suffix (`data_2`, `data_3`, ...); an explicit name that is
    /// already taken is a `DatasetExists` error.
    ///
    /// # Returns
    /// * The name the dataset was stored under
    pub fn load_spec(&mut self, file_spec: &str, config: &IngestConfig) -> CsvTabResult<String> {
        let (name, path) = parse_file_spec(file_spec)?;
        let name = if !self.contains(&name) {
            name
        } else if file_spec.contains('=') {
            return Err(CsvTabError::DatasetExists(name));
        } else {
            self.unused_name(&name)
        };

        self.load(&name, &path, config)?;
        Ok(name)
    }

    fn unused_name(&self, base: &str) -> String {
        (2_usize..)
            .map(|n| format!("{}_{}", base, n))
            .find(|candidate| !self.contains(candidate))
            .unwrap_or_else(|| base.to_string())
    }

    /// Store a dataset that was built elsewhere
    pub fn insert(&mut self, name: &str, dataset: Dataset) {
        self.stats.remove(name);
        self.datasets.insert(name.to_string(), dataset);
    }

    /// Get a reference to a dataset by name
    pub fn get(&self, name: &str) -> CsvTabResult<&Dataset> {
        self.datasets
            .get(name)
            .ok_or_else(|| CsvTabError::DatasetNotFound(name.to_string()))
    }

    /// Load statistics, for datasets loaded through the store
    pub fn stats(&self, name: &str) -> Option<&LoadStats> {
        self.stats.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.datasets.contains_key(name)
    }

    /// Names of all stored datasets, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.datasets.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}

/// Parse a file specification into dataset name and file path
///
/// Handles two formats:
/// 1. `name=file_path` - explicit name and file path
/// 2. `file_path` - name derived from the file stem
pub fn parse_file_spec(file_spec: &str) -> CsvTabResult<(String, PathBuf)> {
    if let Some((name, file_path)) = file_spec.split_once('=') {
        return Ok((name.to_string(), PathBuf::from(file_path)));
    }

    let path = PathBuf::from(file_spec);
    let stem = path
        .file_stem()
        .ok_or_else(|| CsvTabError::SourceNotFound(path.clone()))?
        .to_string_lossy()
        .to_string();

    Ok((stem, path))
}
