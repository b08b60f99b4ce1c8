//! Ingestion for csvtab
//!
//! This module turns a delimited text source into rows. Both modes read the
//! first non-blank line as the header and then parse each remaining
//! non-blank line the same way:
//!
//! - split it with the tokenizer
//! - pad short rows with empty fields, truncate long ones, to the header width
//! - infer a typed value per field (or keep trimmed text when inference is off)
//!
//! Full mode collects every row and infers the schema once at the end.
//! Chunked mode hands out rows in batches through `ChunkReader` and leaves
//! schema inference to the caller, since promotion needs every row.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::config::IngestConfig;
use crate::dataset::{Dataset, Row};
use crate::error::{CsvTabError, CsvTabResult};
use crate::inference::{infer_value, raw_value};
use crate::tokenizer::split_line;

/// Loads delimited sources according to an `IngestConfig`
#[derive(Debug, Clone, Default)]
pub struct Ingestor {
    config: IngestConfig,
}

impl Ingestor {
    pub fn new(config: IngestConfig) -> Self {
        Ingestor { config }
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Load a whole file into a `Dataset`
    ///
    /// # Arguments
    /// * `path` - Path to the delimited file
    ///
    /// # Returns
    /// * The dataset with its schema inferred over every row
    /// * `SourceNotFound` if the path doesn't exist
    /// * `EmptyInput` if the file has no header line
    pub fn load(&self, path: &Path) -> CsvTabResult<Dataset> {
        let reader = open_source(path)?;
        let dataset = self.load_reader(reader)?.with_source(path);

        info!(
            "parsed {} rows from {}",
            dataset.row_count(),
            path.display()
        );
        Ok(dataset)
    }

    /// Load everything readable from `reader` into a `Dataset`
    pub fn load_reader<R: BufRead>(&self, reader: R) -> CsvTabResult<Dataset> {
        let mut lines = reader.lines();
        let header = read_header(&mut lines, self.config.delimiter())?;
        let parser = RowParser::new(&self.config, header.len());

        let mut rows = Vec::new();
        for line in lines {
            let line = line?;
            if let Some(row) = parser.parse(&line) {
                rows.push(row);
            }
        }

        Ok(Dataset::from_rows(&header, rows))
    }

    /// Open a file for chunked ingestion in batches of `chunk_size` rows
    ///
    /// The header is read immediately, so `SourceNotFound` and `EmptyInput`
    /// surface here rather than on the first batch.
    ///
    /// # Arguments
    /// * `path` - Path to the delimited file
    /// * `chunk_size` - Rows per batch; must be positive
    ///
    /// # Returns
    /// * A `ChunkReader` positioned after the header
    /// * `InvalidChunkSize` for a zero chunk size
    pub fn chunks(
        &self,
        path: &Path,
        chunk_size: usize,
    ) -> CsvTabResult<ChunkReader<BufReader<File>>> {
        let reader = open_source(path)?;
        let mut chunks = self.chunks_from_reader(reader, chunk_size)?;
        chunks.source = Some(path.to_path_buf());
        Ok(chunks)
    }

    /// Chunked ingestion over any buffered reader
    pub fn chunks_from_reader<R: BufRead>(
        &self,
        reader: R,
        chunk_size: usize,
    ) -> CsvTabResult<ChunkReader<R>> {
        if chunk_size == 0 {
            return Err(CsvTabError::InvalidChunkSize(chunk_size));
        }

        let mut lines = reader.lines();
        let header = read_header(&mut lines, self.config.delimiter())?;

        Ok(ChunkReader {
            width: header.len(),
            header,
            lines,
            config: self.config.clone(),
            chunk_size,
            finished: false,
            batches: 0,
            rows: 0,
            source: None,
        })
    }
}

/// Forward-only sequence of row batches
///
/// Each call to `next` reads lines until a batch of `chunk_size` rows is
/// full or the input ends; a trailing partial batch is yielded once. The
/// underlying reader is held only as long as the `ChunkReader` itself, so
/// dropping it early releases the source.
pub struct ChunkReader<R> {
    header: Vec<String>,
    width: usize,
    lines: Lines<R>,
    config: IngestConfig,
    chunk_size: usize,
    finished: bool,
    batches: usize,
    rows: usize,
    source: Option<PathBuf>,
}

impl<R: BufRead> ChunkReader<R> {
    /// Column names from the header line
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Number of batches handed out so far
    pub fn batches_yielded(&self) -> usize {
        self.batches
    }

    /// Number of rows handed out so far
    pub fn rows_yielded(&self) -> usize {
        self.rows
    }

    /// Drain the remaining batches and infer the schema over them
    ///
    /// Only rows not yet handed out are included; batches the caller has
    /// already pulled through `next` are not part of the result.
    pub fn into_dataset(mut self) -> CsvTabResult<Dataset> {
        let mut rows = Vec::new();
        for batch in self.by_ref() {
            rows.extend(batch?);
        }

        let dataset = Dataset::from_rows(&self.header, rows);
        Ok(match &self.source {
            Some(path) => dataset.with_source(path),
            None => dataset,
        })
    }

    fn finish(&mut self) {
        if !self.finished {
            self.finished = true;
            info!(
                "parsed {} rows in {} batches{}",
                self.rows,
                self.batches,
                self.source
                    .as_ref()
                    .map(|p| format!(" from {}", p.display()))
                    .unwrap_or_default()
            );
        }
    }
}

impl<R: BufRead> Iterator for ChunkReader<R> {
    type Item = CsvTabResult<Vec<Row>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let parser = RowParser::new(&self.config, self.width);
        let mut batch = Vec::with_capacity(self.chunk_size);

        while batch.len() < self.chunk_size {
            match self.lines.next() {
                Some(Ok(line)) => {
                    if let Some(row) = parser.parse(&line) {
                        batch.push(row);
                    }
                }
                Some(Err(e)) => {
                    self.finished = true;
                    return Some(Err(e.into()));
                }
                None => {
                    self.finish();
                    break;
                }
            }
        }

        if batch.is_empty() {
            return None;
        }

        self.batches += 1;
        self.rows += batch.len();
        debug!("yielding batch {} with {} rows", self.batches, batch.len());
        Some(Ok(batch))
    }
}

/// Turns one data line into a row of the header's width
struct RowParser {
    width: usize,
    delimiter: char,
    type_inference: bool,
}

impl RowParser {
    fn new(config: &IngestConfig, width: usize) -> Self {
        RowParser {
            width,
            delimiter: config.delimiter(),
            type_inference: config.type_inference(),
        }
    }

    /// Parse a line, or `None` for a blank line
    fn parse(&self, line: &str) -> Option<Row> {
        if line.trim().is_empty() {
            return None;
        }

        let mut fields = split_line(line, self.delimiter);
        fields.resize(self.width, String::new());

        let row = fields
            .iter()
            .map(|field| {
                if self.type_inference {
                    infer_value(field)
                } else {
                    raw_value(field)
                }
            })
            .collect();
        Some(row)
    }
}

fn open_source(path: &Path) -> CsvTabResult<BufReader<File>> {
    match File::open(path) {
        Ok(file) => Ok(BufReader::new(file)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(CsvTabError::SourceNotFound(path.to_path_buf()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Read the first non-blank line and split it into column names
fn read_header<R: BufRead>(lines: &mut Lines<R>, delimiter: char) -> CsvTabResult<Vec<String>> {
    for line in lines {
        let line = line?;
        if !line.trim().is_empty() {
            return Ok(split_line(&line, delimiter));
        }
    }
    Err(CsvTabError::EmptyInput)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{ColumnType, Value};
    use std::io::Cursor;

    const PLAYERS: &str = "Player,Tm,PTS\nA,LAL,30\nB,GSW,25\nC,LAL,\n";

    #[test]
    fn test_full_load_from_reader() {
        let data = Ingestor::default()
            .load_reader(Cursor::new(PLAYERS))
            .unwrap();

        assert_eq!(data.row_count(), 3);
        assert_eq!(data.schema().column_type("Player"), Some(ColumnType::String));
        assert_eq!(data.schema().column_type("Tm"), Some(ColumnType::String));
        assert_eq!(data.schema().column_type("PTS"), Some(ColumnType::Int));
        assert_eq!(data.rows()[2][2], Value::Null);
    }

    #[test]
    fn test_pad_and_truncate() {
        let input = "a,b,c\n1\n1,2,3,4,5\n\n  \n7,8,9\n";
        let data = Ingestor::default().load_reader(Cursor::new(input)).unwrap();

        assert_eq!(data.row_count(), 3);
        assert!(data.rows().iter().all(|row| row.len() == 3));
        assert_eq!(data.rows()[0], vec![Value::Integer(1), Value::Null, Value::Null]);
        assert_eq!(
            data.rows()[1],
            vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)]
        );
    }

    #[test]
    fn test_crlf_and_quoted_fields() {
        let input = "name,quote\r\n\"Doe, J\",\"say \"\"hi\"\"\"\r\n";
        let data = Ingestor::default().load_reader(Cursor::new(input)).unwrap();
        assert_eq!(data.columns(), vec!["name", "quote"]);
        assert_eq!(data.rows()[0][0], Value::from("Doe, J"));
        assert_eq!(data.rows()[0][1], Value::from("say \"hi\""));
    }

    #[test]
    fn test_inference_disabled() {
        let config = IngestConfig::new().with_type_inference(false);
        let data = Ingestor::new(config)
            .load_reader(Cursor::new(PLAYERS))
            .unwrap();
        assert_eq!(data.rows()[0][2], Value::from("30"));
        assert_eq!(data.rows()[2][2], Value::Null);
        assert_eq!(data.schema().column_type("PTS"), Some(ColumnType::String));
    }

    #[test]
    fn test_empty_input() {
        let err = Ingestor::default().load_reader(Cursor::new("")).unwrap_err();
        assert!(matches!(err, CsvTabError::EmptyInput));

        let err = Ingestor::default()
            .load_reader(Cursor::new("\n  \n"))
            .unwrap_err();
        assert!(matches!(err, CsvTabError::EmptyInput));
    }

    #[test]
    fn test_header_only() {
        let data = Ingestor::default()
            .load_reader(Cursor::new("a,b\n"))
            .unwrap();
        assert_eq!(data.row_count(), 0);
        assert_eq!(data.schema().column_type("a"), Some(ColumnType::String));
    }

    #[test]
    fn test_missing_source() {
        let err = Ingestor::default()
            .load(Path::new("definitely/not/here.csv"))
            .unwrap_err();
        assert!(matches!(err, CsvTabError::SourceNotFound(_)));
    }

    #[test]
    fn test_chunk_sizes() {
        let mut input = String::from("n\n");
        for i in 0..7 {
            input.push_str(&format!("{}\n", i));
        }

        let chunks = Ingestor::default()
            .chunks_from_reader(Cursor::new(input.clone()), 3)
            .unwrap();
        let batches: Vec<Vec<Row>> = chunks.map(|b| b.unwrap()).collect();
        let sizes: Vec<usize> = batches.iter().map(|b| b.len()).collect();
        assert_eq!(sizes, vec![3, 3, 1]);

        let full = Ingestor::default().load_reader(Cursor::new(input)).unwrap();
        let concatenated: Vec<Row> = batches.into_iter().flatten().collect();
        assert_eq!(concatenated, full.rows());
    }

    #[test]
    fn test_chunks_exact_multiple() {
        let input = "n\n1\n2\n3\n4\n";
        let mut chunks = Ingestor::default()
            .chunks_from_reader(Cursor::new(input), 2)
            .unwrap();
        assert_eq!(chunks.header(), ["n".to_string()]);
        assert_eq!(chunks.next().unwrap().unwrap().len(), 2);
        assert_eq!(chunks.next().unwrap().unwrap().len(), 2);
        assert!(chunks.next().is_none());
        assert!(chunks.next().is_none());
        assert_eq!(chunks.batches_yielded(), 2);
        assert_eq!(chunks.rows_yielded(), 4);
    }

    #[test]
    fn test_chunks_into_dataset() {
        let data = Ingestor::default()
            .chunks_from_reader(Cursor::new(PLAYERS), 2)
            .unwrap()
            .into_dataset()
            .unwrap();
        assert_eq!(data.row_count(), 3);
        assert_eq!(data.schema().column_type("PTS"), Some(ColumnType::Int));
    }

    #[test]
    fn test_into_dataset_after_partial_read() {
        let mut chunks = Ingestor::default()
            .chunks_from_reader(Cursor::new(PLAYERS), 2)
            .unwrap();
        let first = chunks.next().unwrap().unwrap();
        assert_eq!(first.len(), 2);

        let rest = chunks.into_dataset().unwrap();
        assert_eq!(rest.row_count(), 1);
        assert_eq!(rest.rows()[0][0], Value::from("C"));
    }

    #[test]
    fn test_zero_chunk_size() {
        let result = Ingestor::default().chunks_from_reader(Cursor::new(PLAYERS), 0);
        assert!(matches!(result, Err(CsvTabError::InvalidChunkSize(0))));
    }
}
