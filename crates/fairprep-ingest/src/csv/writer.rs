//! CSV file writing.

use std::fs::File;
use std::path::Path;

use polars::prelude::{CsvWriter, DataFrame, SerWriter};

use crate::error::{IngestError, Result};

/// Writes a table as CSV with a header row and no index column.
///
/// Missing parent directories are created. Null cells are written empty.
pub fn write_table(df: &mut DataFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| IngestError::FileCreate {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    let mut file = File::create(path).map_err(|e| IngestError::FileCreate {
        path: path.to_path_buf(),
        source: e,
    })?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(df)
        .map_err(|e| IngestError::CsvWrite {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    tracing::debug!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "wrote csv table"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv::read_table;
    use polars::prelude::{Column, NamedFrom, Series};

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.csv");
        let mut df = DataFrame::new(vec![
            Column::from(Series::new("sex".into(), vec![1i64, 0, 1])),
            Column::from(Series::new("age".into(), vec![Some(30.5), None, Some(41.0)])),
        ])
        .unwrap();

        write_table(&mut df, &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("sex,age\n"));

        let round = read_table(&path).unwrap();
        assert_eq!(round.height(), 3);
        assert_eq!(round.column("age").unwrap().null_count(), 1);
    }

    #[test]
    fn test_write_to_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut df = DataFrame::new(vec![Column::from(Series::new("a".into(), vec![1i64]))])
            .unwrap();
        let result = write_table(&mut df, dir.path());
        assert!(matches!(result, Err(IngestError::FileCreate { .. })));
    }
}
