use crate::chart::{PartId, RowId};
use crate::text::Occurrence;

/// Errors raised by chart queries and commands.
///
/// Most variants are contract violations from the caller. `NoWordformsSelected` and
/// `ChooseDifferentColumn` are meant for the user; their `Display` text is the message to show.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChartError {
    #[error("Occurrence {0:?} is not a wordform of the charted text")]
    NotAWordform(Occurrence),
    #[error("Row {0:?} is not in the chart")]
    RowNotFound(RowId),
    #[error("Cell part {0:?} is not in the chart")]
    PartNotFound(PartId),
    #[error("Column {column} is out of range for a template with {count} columns")]
    ColumnOutOfRange { column: usize, count: usize },
    #[error("Index {index} is out of range for a row with {len} cell parts")]
    PartIndexOutOfRange { index: usize, len: usize },
    #[error("The cell has no content")]
    EmptyCell,
    #[error("A clause marker needs at least one dependent row")]
    NoDependentRows,
    #[error("There are no words selected to put in the chart.")]
    NoWordformsSelected,
    #[error("The selected words cannot go in that column. Choose a different column.")]
    ChooseDifferentColumn,
}

impl ChartError {
    /// True for failures the user can fix by choosing differently, rather than programming errors.
    pub fn is_user_actionable(&self) -> bool {
        matches!(
            self,
            ChartError::NoWordformsSelected | ChartError::ChooseDifferentColumn
        )
    }
}
