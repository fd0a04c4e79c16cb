//! A table of untyped string cells, as decoded from a downloaded payload.

/// Column labels plus rows of string cells, before any column has a meaning.
///
/// Every row has exactly `labels.len()` cells; [`RawTable::push_row`] pads short
/// rows and refuses rows that carry extra non-empty cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    labels: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Creates an empty table. Trailing empty labels (left by a trailing delimiter
    /// on the header line) are dropped.
    pub fn new(mut labels: Vec<String>) -> Self {
        while labels.last().is_some_and(|l| l.trim().is_empty()) {
            labels.pop();
        }
        Self {
            labels,
            rows: Vec::new(),
        }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn width(&self) -> usize {
        self.labels.len()
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Adds a row, fitting it to the header width.
    ///
    /// Returns `false` (and leaves the table untouched) when the row is malformed,
    /// i.e. has more non-empty cells than there are labels.
    pub fn push_row(&mut self, mut cells: Vec<String>) -> bool {
        let width = self.labels.len();
        if cells.len() > width {
            if cells[width..].iter().any(|c| !c.trim().is_empty()) {
                return false;
            }
            cells.truncate(width);
        }
        cells.resize(width, String::new());
        self.rows.push(cells);
        true
    }

    /// Index of the column carrying exactly this label.
    pub fn column_index(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    /// Iterates the cells of one column.
    pub fn column(&self, index: usize) -> impl Iterator<Item = &str> + '_ {
        self.rows.iter().map(move |row| row[index].as_str())
    }

    /// Removes trailing note rows: the footer disclaimer and the sentinel line of
    /// national exports, whose only content sits in the first cell.
    pub fn drop_trailing_notes(&mut self) -> usize {
        let mut dropped = 0;
        while self
            .rows
            .last()
            .is_some_and(|row| row.iter().skip(1).all(|c| c.trim().is_empty()))
        {
            self.rows.pop();
            dropped += 1;
        }
        dropped
    }
}
