//! CSV file reading into a Polars `DataFrame`.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use polars::prelude::{CsvReadOptions, DataFrame, SerReader};

use crate::error::{IngestError, Result};

const BOM: char = '\u{feff}';

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IngestError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IngestError::FileRead {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })
}

/// Returns true if the first line holds at least one non-empty header.
fn has_header_line(path: &Path) -> Result<bool> {
    let mut reader = BufReader::new(open(path)?);
    let mut line = String::new();
    reader
        .read_line(&mut line)
        .map_err(|e| IngestError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
    let line = line.trim_start_matches(BOM);
    Ok(line.split(',').any(|cell| !cell.trim().is_empty()))
}

/// Reads a CSV file with a single header row.
///
/// Column types are inferred over the whole file so that a late non-numeric
/// cell leaves its column as text instead of failing the load. A UTF-8 BOM
/// on the first header is dropped.
pub fn read_table(path: &Path) -> Result<DataFrame> {
    if !path.exists() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    if !has_header_line(path)? {
        return Err(IngestError::EmptyCsv {
            path: path.to_path_buf(),
        });
    }

    let parse_error = |e: polars::prelude::PolarsError| IngestError::CsvParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    };
    let mut df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(parse_error)?
        .finish()
        .map_err(parse_error)?;

    let first = df
        .get_column_names()
        .first()
        .map(|name| name.to_string())
        .filter(|name| name.starts_with(BOM));
    if let Some(first) = first {
        let cleaned = first.trim_start_matches(BOM).to_string();
        df.rename(&first, cleaned.into()).map_err(parse_error)?;
    }

    tracing::debug!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "read csv table"
    );
    Ok(df)
}
