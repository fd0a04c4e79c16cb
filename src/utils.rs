use polars::prelude::*;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Field delimiter of every file this crate writes.
pub const CSV_SEPARATOR: u8 = b';';

pub(crate) enum WriteFailure {
    Io(io::Error),
    Polars(PolarsError),
}

/// Writes `frame` as `;`-delimited CSV with a header into a temporary file in `dir`,
/// then renames it onto `path`. Readers never observe a partially written file.
pub(crate) fn write_csv_atomically(
    frame: &mut DataFrame,
    dir: &Path,
    path: &Path,
) -> Result<(), WriteFailure> {
    let mut temp_file = NamedTempFile::new_in(dir).map_err(WriteFailure::Io)?;
    CsvWriter::new(&mut temp_file)
        .include_header(true)
        .with_separator(CSV_SEPARATOR)
        .finish(frame)
        .map_err(WriteFailure::Polars)?;
    temp_file
        .persist(path)
        .map_err(|e| WriteFailure::Io(e.error))?;
    Ok(())
}

/// Reads a file written by [`write_csv_atomically`], every column as a string.
pub fn read_string_csv(path: &Path) -> PolarsResult<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .map_parse_options(|opts| opts.with_separator(CSV_SEPARATOR))
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_then_read_keeps_strings() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let mut frame = DataFrame::new(vec![
            Column::new("date".into(), vec![Some("2024-01-01 00:00:00")]),
            Column::new("Consommation".into(), vec![Some("00120")]),
        ])
        .unwrap();

        assert!(write_csv_atomically(&mut frame, dir.path(), &path).is_ok());
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "date;Consommation\n2024-01-01 00:00:00;00120\n");

        let read = read_string_csv(&path).unwrap();
        // Leading zeros survive since nothing is inferred.
        let values: Vec<_> = read
            .column("Consommation")
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(values, vec![Some("00120")]);
    }

    #[test]
    fn test_missing_directory_fails_without_leftovers() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        let mut frame = DataFrame::new(vec![Column::new("date".into(), vec!["x"])]).unwrap();
        let result = write_csv_atomically(&mut frame, &missing, &missing.join("out.csv"));
        assert!(matches!(result, Err(WriteFailure::Io(_))));
        assert!(!missing.exists());
    }
}
