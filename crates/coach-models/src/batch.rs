//! Batches of diary records.

use crate::record::DiaryRecord;

/// A contiguous slice of diary rows sent to one agent team.
///
/// Row numbers are 0-based positions in the input file (header excluded);
/// `end()` is inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    /// Position of this batch in the run.
    pub index: usize,
    /// Row number of the first record.
    pub start: usize,
    /// Records in file order.
    pub records: Vec<DiaryRecord>,
    /// Number of records in the whole input file.
    pub total_records: usize,
}

impl Batch {
    /// Creates a batch.
    pub fn new(index: usize, start: usize, records: Vec<DiaryRecord>, total_records: usize) -> Self {
        Self {
            index,
            start,
            records,
            total_records,
        }
    }

    /// Row number of the last record (inclusive).
    ///
    /// For an empty batch this is `start - 1`, saturating at zero.
    pub fn end(&self) -> usize {
        (self.start + self.records.len()).saturating_sub(1)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the batch holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Human-readable row range, e.g. `"500-999"`.
    pub fn label(&self) -> String {
        format!("{}-{}", self.start, self.end())
    }
}
