//! CSV/TSV parser producing a typed schema over raw rows.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::debug;

use super::source::{Dataset, SourceMetadata};
use crate::error::{IngotError, Result, SourceFormatError};
use crate::inference::TypeInferrer;
use crate::sanitize::{dedupe_column_names, sanitize_column_name};
use crate::schema::ColumnDescriptor;

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// Parser configuration.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Delimiter to use (None = auto-detect).
    pub delimiter: Option<u8>,
    /// Quote character.
    pub quote: u8,
    /// Make sanitized header names unique before building the schema.
    pub dedupe_headers: bool,
    /// Maximum data rows to read (None = all).
    pub max_rows: Option<usize>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            delimiter: Some(b','),
            quote: b'"',
            dedupe_headers: true,
            max_rows: None,
        }
    }
}

/// Parses delimited text into a [`Dataset`].
#[derive(Debug, Clone, Default)]
pub struct Parser {
    config: ParserConfig,
    inferrer: TypeInferrer,
}

impl Parser {
    /// Create a new parser with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser with custom configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self {
            config,
            inferrer: TypeInferrer::new(),
        }
    }

    /// Use a specific type inferrer.
    pub fn with_inferrer(mut self, inferrer: TypeInferrer) -> Self {
        self.inferrer = inferrer;
        self
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse a local file and return the dataset and source metadata.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<(Dataset, SourceMetadata)> {
        let path = path.as_ref();

        let mut file = File::open(path).map_err(|e| IngotError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut contents = Vec::new();
        file.read_to_end(&mut contents).map_err(|e| IngotError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let name = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        self.parse_source(&name, &contents)
    }

    /// Parse uploaded bytes and compute their source metadata.
    pub fn parse_source(&self, name: &str, bytes: &[u8]) -> Result<(Dataset, SourceMetadata)> {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        let hash = format!("sha256:{:x}", hasher.finalize());

        let delimiter = match self.config.delimiter {
            Some(d) => d,
            None => detect_delimiter(bytes)?,
        };

        let dataset = self.parse_bytes(bytes, delimiter)?;

        let format = match dataset.delimiter {
            b'\t' => "tsv",
            b',' => "csv",
            b';' => "csv-semicolon",
            b'|' => "psv",
            _ => "delimited",
        }
        .to_string();

        let metadata = SourceMetadata::new(
            name,
            hash,
            bytes.len() as u64,
            format,
            dataset.row_count(),
            dataset.column_count(),
        );

        Ok((dataset, metadata))
    }

    /// Parse delimited text with the configured (or default) delimiter.
    pub fn parse(&self, text: &str) -> Result<Dataset> {
        let delimiter = match self.config.delimiter {
            Some(d) => d,
            None => detect_delimiter(text.as_bytes())?,
        };
        self.parse_bytes(text.as_bytes(), delimiter)
    }

    /// Parse bytes directly.
    fn parse_bytes(&self, bytes: &[u8], delimiter: u8) -> Result<Dataset> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .quote(self.config.quote)
            .flexible(true)
            .from_reader(bytes);

        let mut records = reader.records();

        let header = match records.next() {
            Some(record) => record?,
            None => return Err(SourceFormatError::EmptySource.into()),
        };
        if header.is_empty() {
            return Err(SourceFormatError::MissingHeaders.into());
        }

        let mut rows = Vec::new();
        for (row_idx, result) in records.enumerate() {
            if let Some(max) = self.config.max_rows {
                if row_idx >= max {
                    break;
                }
            }
            let record = result?;
            rows.push(record.iter().map(|s| s.to_string()).collect::<Vec<String>>());
        }

        if rows.is_empty() {
            return Err(SourceFormatError::NoDataRows.into());
        }

        let names = self.column_names(header.iter());
        let columns = names
            .into_iter()
            .enumerate()
            .map(|(index, name)| {
                let inferred_type = self.inferrer.infer_column(&rows, index);
                let sample = rows[0].get(index).cloned().unwrap_or_default();
                debug!(column = %name, index, inferred_type = %inferred_type, "inferred column type");
                ColumnDescriptor::new(name, inferred_type, sample)
            })
            .collect();

        Ok(Dataset::new(columns, rows, delimiter))
    }

    /// Sanitize raw header fields positionally.
    fn column_names<'a>(&self, headers: impl Iterator<Item = &'a str>) -> Vec<String> {
        let sanitized: Vec<String> = headers
            .enumerate()
            .map(|(i, raw)| {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    sanitize_column_name(&format!("column_{}", i + 1))
                } else {
                    sanitize_column_name(trimmed)
                }
            })
            .collect();

        if self.config.dedupe_headers {
            dedupe_column_names(&sanitized)
        } else {
            sanitized
        }
    }
}

/// Detect the delimiter by analyzing the first few lines.
fn detect_delimiter(bytes: &[u8]) -> Result<u8> {
    let reader = BufReader::new(bytes);
    let lines: Vec<String> = reader
        .lines()
        .take(10)
        .filter_map(|l| l.ok())
        .filter(|l| !l.trim().is_empty())
        .collect();

    if lines.is_empty() {
        return Err(SourceFormatError::EmptySource.into());
    }

    let mut best_delimiter = b',';
    let mut best_score = 0;

    for &delim in DELIMITERS {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| count_delimiter_in_line(line, delim))
            .collect();

        let first_count = counts[0];
        if first_count == 0 {
            continue;
        }

        let consistent = counts.iter().all(|&c| c == first_count);
        let variance: f64 = if counts.len() > 1 {
            let mean = counts.iter().sum::<usize>() as f64 / counts.len() as f64;
            counts.iter().map(|&c| (c as f64 - mean).powi(2)).sum::<f64>() / counts.len() as f64
        } else {
            0.0
        };

        // Higher count with lower variance wins; tab gets a small bonus.
        let score = if consistent {
            first_count * 1000 + (if delim == b'\t' { 100 } else { 0 })
        } else if variance < 1.0 {
            first_count * 100
        } else {
            first_count
        };

        if score > best_score {
            best_score = score;
            best_delimiter = delim;
        }
    }

    Ok(best_delimiter)
}

/// Count delimiter occurrences in a line, respecting quotes.
fn count_delimiter_in_line(line: &str, delimiter: u8) -> usize {
    let delim_char = delimiter as char;
    let mut count = 0;
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c == delim_char && !in_quotes => count += 1,
            _ => {}
        }
    }

    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnType;

    #[test]
    fn test_detect_delimiter_csv() {
        let data = b"a,b,c\n1,2,3\n4,5,6";
        assert_eq!(detect_delimiter(data).unwrap(), b',');
    }

    #[test]
    fn test_detect_delimiter_tsv() {
        let data = b"a\tb\tc\n1\t2\t3\n4\t5\t6";
        assert_eq!(detect_delimiter(data).unwrap(), b'\t');
    }

    #[test]
    fn test_parse_csv() {
        let parser = Parser::new();
        let data = parser
            .parse("Name,Age,Joined\nAlice,30,2023-01-05\nBob,25,2023-02-11")
            .unwrap();

        assert_eq!(data.column_names(), vec!["name", "age", "joined"]);
        assert_eq!(data.row_count(), 2);
        assert_eq!(data.get(0, 0), Some("Alice"));
        assert_eq!(data.get(1, 1), Some("25"));
        assert_eq!(data.columns[0].inferred_type, ColumnType::Text);
        assert_eq!(data.columns[1].inferred_type, ColumnType::Integer);
        assert_eq!(data.columns[2].inferred_type, ColumnType::Date);
        assert_eq!(data.columns[1].sample_value, "30");
    }

    #[test]
    fn test_empty_source() {
        let err = Parser::new().parse("").unwrap_err();
        assert!(matches!(
            err,
            IngotError::SourceFormat(SourceFormatError::EmptySource)
        ));
    }

    #[test]
    fn test_header_only() {
        let err = Parser::new().parse("a,b,c").unwrap_err();
        assert!(matches!(
            err,
            IngotError::SourceFormat(SourceFormatError::NoDataRows)
        ));
        let err = Parser::new().parse("a,b,c\n").unwrap_err();
        assert!(matches!(
            err,
            IngotError::SourceFormat(SourceFormatError::NoDataRows)
        ));
    }

    #[test]
    fn test_short_and_long_rows_kept_raw() {
        let data = Parser::new().parse("a,b,c\n1,2\n3,4,5,6").unwrap();
        assert_eq!(data.rows[0], vec!["1", "2"]);
        assert_eq!(data.rows[1], vec!["3", "4", "5", "6"]);
        assert_eq!(data.column_count(), 3);
        // Sample comes from the first row, empty when it is short.
        assert_eq!(data.columns[2].sample_value, "");
        assert_eq!(data.get(0, 2), None);
    }

    #[test]
    fn test_blank_headers_named_by_position() {
        let data = Parser::new().parse("id_code,,  \nx,1,2").unwrap();
        assert_eq!(data.column_names(), vec!["id_code", "column_2", "column_3"]);
    }

    #[test]
    fn test_duplicate_headers_deduped() {
        let data = Parser::new().parse("Name,name,NAME!,id\na,b,c,1").unwrap();
        assert_eq!(data.column_names(), vec!["name", "name_2", "name_3", "id_2"]);
    }

    #[test]
    fn test_duplicate_headers_kept_without_dedupe() {
        let parser = Parser::with_config(ParserConfig {
            dedupe_headers: false,
            ..Default::default()
        });
        let data = parser.parse("Name,name\na,b").unwrap();
        assert_eq!(data.column_names(), vec!["name", "name"]);
    }

    #[test]
    fn test_quoted_fields() {
        let data = Parser::new()
            .parse("city,note\n\"Portland, OR\",\"said \"\"hi\"\"\"\n")
            .unwrap();
        assert_eq!(data.get(0, 0), Some("Portland, OR"));
        assert_eq!(data.get(0, 1), Some("said \"hi\""));
    }

    #[test]
    fn test_auto_detect_semicolon() {
        let parser = Parser::with_config(ParserConfig {
            delimiter: None,
            ..Default::default()
        });
        let (data, meta) = parser
            .parse_source("prices.csv", b"item;price\napple;1.25\npear;0.80\n")
            .unwrap();
        assert_eq!(meta.format, "csv-semicolon");
        assert_eq!(meta.row_count, 2);
        assert!(meta.hash.starts_with("sha256:"));
        assert_eq!(data.columns[1].inferred_type, ColumnType::Numeric);
    }

    #[test]
    fn test_max_rows() {
        let parser = Parser::with_config(ParserConfig {
            max_rows: Some(1),
            ..Default::default()
        });
        let data = parser.parse("a\n1\n2\n3").unwrap();
        assert_eq!(data.row_count(), 1);
    }
}
