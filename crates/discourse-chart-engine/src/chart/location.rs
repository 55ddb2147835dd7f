use super::RowId;

/// A cell address: a row plus a logical column index.
///
/// Locations are never stored in the chart. The row handle may go stale after any removal,
/// so check it with [`Chart::contains_row`](super::Chart::contains_row) before trusting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChartLocation {
    pub row: RowId,
    pub column: usize,
}

impl ChartLocation {
    pub fn new(row: RowId, column: usize) -> Self {
        Self { row, column }
    }

    pub fn is_same_location(&self, other: &ChartLocation) -> bool {
        self == other
    }

    pub fn is_same_row(&self, other: &ChartLocation) -> bool {
        self.row == other.row
    }

    pub fn with_column(&self, column: usize) -> Self {
        Self {
            row: self.row,
            column,
        }
    }
}
