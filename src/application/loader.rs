//! Row loader: reads delimited text into non-blank rows.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::Row;
use crate::infrastructure::traits::FileSystem;

/// How raw input is cut into rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoaderOptions {
    pub delimiter: u8,
    /// Raw lines dropped before parsing, counted before blank filtering
    pub skip_header: usize,
    /// Leading cells dropped from every record
    pub skip_columns: usize,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            skip_header: 1,
            skip_columns: 0,
        }
    }
}

impl LoaderOptions {
    /// Validate a user-supplied delimiter: exactly one ASCII character.
    pub fn delimiter_byte(delimiter: &str) -> ApplicationResult<u8> {
        let mut chars = delimiter.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii() => Ok(c as u8),
            _ => Err(ApplicationError::InvalidDelimiter(delimiter.to_string())),
        }
    }
}

pub struct RowLoader {
    fs: Arc<dyn FileSystem>,
}

impl RowLoader {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Load all rows from `path`.
    ///
    /// A missing file is reported as `ApplicationError::FileNotFound`.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, path: &Path, options: &LoaderOptions) -> ApplicationResult<Vec<Row>> {
        if !self.fs.exists(path) {
            return Err(ApplicationError::FileNotFound(path.to_path_buf()));
        }
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read input", path)?;
        parse_rows(&content, options)
    }
}

/// Split `content` into rows according to `options`.
pub fn parse_rows(content: &str, options: &LoaderOptions) -> ApplicationResult<Vec<Row>> {
    let body = skip_lines(content, options.skip_header);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(options.delimiter)
        .from_reader(body.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ApplicationError::OperationFailed {
            context: "parse delimited input".to_string(),
            source: Box::new(e),
        })?;

        let row: Row = record
            .iter()
            .skip(options.skip_columns)
            .map(String::from)
            .collect();
        if row.iter().all(String::is_empty) {
            continue;
        }
        rows.push(row);
    }

    debug!("parsed {} rows", rows.len());
    Ok(rows)
}

/// Remainder of `content` after its first `count` lines.
fn skip_lines(content: &str, count: usize) -> &str {
    let offset: usize = content
        .split_inclusive('\n')
        .take(count)
        .map(str::len)
        .sum();
    &content[offset..]
}
