//! Diary CSV reader.
//!
//! The input is a headered CSV; every column is kept as text. Rows are split
//! into fixed-size batches in file order.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use coach_models::{Batch, DiaryRecord};
use tracing::{debug, info};

use crate::error::{PersistenceError, Result};

/// Read a diary CSV and split it into batches of `chunk_size` rows.
///
/// Batch `i` starts at row `i * chunk_size`; the final batch may be shorter.
/// Every batch carries the total record count of the file. A file with a
/// header but no rows yields no batches.
///
/// # Errors
/// - [`PersistenceError::InvalidChunkSize`] if `chunk_size` is zero
/// - [`PersistenceError::ReadError`] if the file cannot be opened
/// - [`PersistenceError::EmptyInput`] if the file has no header row
/// - [`PersistenceError::TooManyFields`] if a row is longer than the header
/// - [`PersistenceError::Csv`] for malformed CSV
///
/// Rows shorter than the header are padded with empty cells. Repeated
/// header names are renamed `name.1`, `name.2`, ... so every column keeps
/// its own key.
pub fn read_batches(path: &Path, chunk_size: usize) -> Result<Vec<Batch>> {
    if chunk_size == 0 {
        return Err(PersistenceError::InvalidChunkSize);
    }

    let file = File::open(path).map_err(|source| PersistenceError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let headers = reader.headers()?.clone();
    if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
        return Err(PersistenceError::EmptyInput(path.to_path_buf()));
    }
    let columns = dedupe_columns(headers.iter());

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        if row.len() > columns.len() {
            return Err(PersistenceError::TooManyFields {
                path: path.to_path_buf(),
                line: row.position().map_or(0, |p| p.line()),
                expected: columns.len(),
                found: row.len(),
            });
        }
        records.push(DiaryRecord::from_row(columns.iter().cloned(), row.iter()));
    }

    let total_records = records.len();
    let batches = split_into_batches(records, chunk_size, total_records);

    info!(
        path = %path.display(),
        total_records,
        batches = batches.len(),
        chunk_size,
        "Loaded diary entries"
    );

    Ok(batches)
}

// Same renaming scheme as pandas: the second `note` becomes `note.1`,
// skipping names already taken.
fn dedupe_columns<'a>(headers: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    headers
        .map(|header| {
            let mut name = header.to_string();
            let mut count = counts.get(&name).copied().unwrap_or(0);
            while count > 0 {
                counts.insert(name.clone(), count + 1);
                name = format!("{}.{}", name, count);
                count = counts.get(&name).copied().unwrap_or(0);
            }
            counts.insert(name.clone(), 1);
            name
        })
        .collect()
}

fn split_into_batches(
    records: Vec<DiaryRecord>,
    chunk_size: usize,
    total_records: usize,
) -> Vec<Batch> {
    let mut batches = Vec::with_capacity(total_records.div_ceil(chunk_size));
    let mut iter = records.into_iter().peekable();
    let mut index = 0;

    while iter.peek().is_some() {
        let chunk: Vec<DiaryRecord> = iter.by_ref().take(chunk_size).collect();
        let start = index * chunk_size;
        debug!(index, start, len = chunk.len(), "Built batch");
        batches.push(Batch::new(index, start, chunk, total_records));
        index += 1;
    }

    batches
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_diary(dir: &Path, rows: usize) -> std::path::PathBuf {
        let path = dir.join("user_diary.csv");
        let mut content = String::from("date,mood,entry\n");
        for i in 0..rows {
            content.push_str(&format!("2024-01-{:02},ok,\"Day {}, fine\"\n", i % 28 + 1, i));
        }
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_read_batches_splits_by_chunk_size() {
        let dir = tempdir().unwrap();
        let path = write_diary(dir.path(), 7);

        let batches = read_batches(&path, 3).unwrap();

        assert_eq!(batches.len(), 3);
        assert_eq!(
            batches.iter().map(|b| (b.start, b.end())).collect::<Vec<_>>(),
            vec![(0, 2), (3, 5), (6, 6)]
        );
        assert!(batches.iter().all(|b| b.total_records == 7));
        assert_eq!(batches[2].index, 2);
    }

    #[test]
    fn test_read_batches_keeps_quoted_fields() {
        let dir = tempdir().unwrap();
        let path = write_diary(dir.path(), 2);

        let batches = read_batches(&path, 500).unwrap();

        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].records[1].get("entry"), Some("Day 1, fine"));
        assert_eq!(batches[0].records[0].get("mood"), Some("ok"));
    }

    #[test]
    fn test_exact_multiple_has_no_trailing_batch() {
        let dir = tempdir().unwrap();
        let path = write_diary(dir.path(), 6);

        let batches = read_batches(&path, 3).unwrap();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[1].end(), 5);
    }

    #[test]
    fn test_header_only_yields_no_batches() {
        let dir = tempdir().unwrap();
        let path = write_diary(dir.path(), 0);

        let batches = read_batches(&path, 500).unwrap();
        assert!(batches.is_empty());
    }

    #[test]
    fn test_empty_file_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        fs::write(&path, "").unwrap();

        let result = read_batches(&path, 500);
        assert!(matches!(result, Err(PersistenceError::EmptyInput(_))));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let dir = tempdir().unwrap();
        let result = read_batches(&dir.path().join("nope.csv"), 500);
        assert!(matches!(result, Err(PersistenceError::ReadError { .. })));
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let dir = tempdir().unwrap();
        let path = write_diary(dir.path(), 1);
        assert!(matches!(
            read_batches(&path, 0),
            Err(PersistenceError::InvalidChunkSize)
        ));
    }

    #[test]
    fn test_long_row_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ragged.csv");
        fs::write(&path, "date,entry\n2024-01-01,hello\n2024-01-02,hello,extra\n").unwrap();

        match read_batches(&path, 10) {
            Err(PersistenceError::TooManyFields {
                line,
                expected,
                found,
                ..
            }) => {
                assert_eq!(line, 3);
                assert_eq!(expected, 2);
                assert_eq!(found, 3);
            }
            other => panic!("expected TooManyFields, got {:?}", other),
        }
    }

    #[test]
    fn test_short_row_is_padded() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("short.csv");
        fs::write(&path, "date,mood,entry\n2024-01-01,ok,fine\n2024-01-02,low\n").unwrap();

        let batches = read_batches(&path, 10).unwrap();
        let short = &batches[0].records[1];
        assert_eq!(short.len(), 3);
        assert_eq!(short.get("mood"), Some("low"));
        assert_eq!(short.get("entry"), None);
    }

    #[test]
    fn test_duplicate_headers_are_renamed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dupes.csv");
        fs::write(&path, "note,note,note.1,note\nfirst,second,third,fourth\n").unwrap();

        let batches = read_batches(&path, 10).unwrap();
        let record = &batches[0].records[0];
        let columns: Vec<_> = record.columns().collect();
        assert_eq!(columns, vec!["note", "note.1", "note.1.1", "note.2"]);
        assert_eq!(record.get("note"), Some("first"));
        assert_eq!(record.get("note.1"), Some("second"));
        assert_eq!(record.get("note.1.1"), Some("third"));
        assert_eq!(record.get("note.2"), Some("fourth"));
    }

    #[test]
    fn test_headers_and_cells_keep_whitespace() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("spaces.csv");
        fs::write(&path, "date, entry\n2024-01-01, \n").unwrap();

        let batches = read_batches(&path, 10).unwrap();
        let record = &batches[0].records[0];
        assert_eq!(record.columns().collect::<Vec<_>>(), vec!["date", " entry"]);
        assert_eq!(record.get(" entry"), Some(" "));
    }

    #[test]
    fn test_blank_cell_becomes_none() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("blank.csv");
        fs::write(&path, "date,entry\n2024-01-01,\n").unwrap();

        let batches = read_batches(&path, 10).unwrap();
        assert_eq!(batches[0].records[0].get("entry"), None);
    }
}
