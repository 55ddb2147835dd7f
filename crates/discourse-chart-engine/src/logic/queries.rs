//! Read-only answers a charting UI needs to build menus and style cells.

use super::ChartLogic;
use crate::chart::{CellPartKind, ChartLocation, ClauseType, PartId, RowId};

/// Whether a cell's "missing" menu entry applies, and if so whether it is ticked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingState {
    /// The cell holds real content, or its column is routinely left empty.
    DoesNotApply,
    /// The cell holds a missing marker.
    Checked,
    /// The cell is empty apart from possibility tags.
    Unchecked,
}

impl ChartLogic {
    pub fn row_label(&self, row: RowId) -> Option<&str> {
        self.chart.row_label(row)
    }

    pub fn column_label(&self, column: usize) -> Option<&str> {
        self.columns.get(column).map(|c| c.name.as_str())
    }

    pub fn is_dependent_clause(&self, row: RowId) -> bool {
        self.chart
            .row(row)
            .is_some_and(|r| r.clause_type != ClauseType::Normal)
    }

    /// Columns that are often empty on purpose never offer a missing marker.
    pub fn column_has_auto_missing_markers(&self, column: usize) -> bool {
        self.column_label(column).is_some_and(|name| {
            self.settings
                .auto_missing_columns
                .iter()
                .any(|auto| auto == name)
        })
    }

    pub fn missing_state(&self, cell: &ChartLocation) -> MissingState {
        if self.column_has_auto_missing_markers(cell.column) {
            return MissingState::DoesNotApply;
        }
        let Some(part) = self.find_cell_part_in_column(cell, false) else {
            return MissingState::Unchecked;
        };
        match self.chart.part(part).map(|p| p.kind()) {
            Some(CellPartKind::Tag(None)) => MissingState::Checked,
            Some(CellPartKind::Tag(Some(_))) => MissingState::Unchecked,
            _ => MissingState::DoesNotApply,
        }
    }

    /// `row` and its neighbours in the same sentence, in chart order, looking forward or back.
    ///
    /// Going forward includes the row that ends the sentence; going back stops short of the
    /// previous sentence's last row. Never looks further than the configured row limit.
    pub fn collect_rows_in_sentence(&self, row: RowId, forward: bool) -> Vec<RowId> {
        let Some(index) = self.chart.row_index(row) else {
            return Vec::new();
        };
        let mut result = vec![row];
        if forward && self.chart.row(row).is_some_and(|r| r.end_sentence) {
            return result;
        }
        let limit = self.settings.rows_in_sentence_limit;
        let max = (self.chart.row_count() - 1).min(index + limit);
        let min = index.saturating_sub(limit);
        let mut test = index;
        loop {
            if forward {
                if test >= max {
                    break;
                }
                test += 1;
            } else {
                if test <= min {
                    break;
                }
                test -= 1;
            }
            let Some(candidate) = self.chart.row_at(test) else {
                break;
            };
            if self.chart.row(candidate).is_some_and(|r| r.end_sentence) {
                if forward {
                    result.push(candidate);
                }
                break;
            }
            result.push(candidate);
        }
        if !forward {
            result.reverse();
        }
        result
    }

    /// Rows that moved text in `cell` could have been moved from.
    ///
    /// Preposing out of the last column cannot land in the same row, nor postposing out of the
    /// first column.
    pub fn collect_eligible_rows(&self, cell: &ChartLocation, preposed: bool) -> Vec<RowId> {
        let mut result = self.collect_rows_in_sentence(cell.row, preposed);
        if result.is_empty() {
            return result;
        }
        if preposed {
            if cell.column + 1 == self.column_count() {
                result.remove(0);
            }
        } else if cell.column == 0 {
            result.pop();
        }
        result
    }

    pub fn is_another_clause_possible(&self, row: RowId, preposed: bool) -> bool {
        self.collect_rows_in_sentence(row, preposed).len() > 1
    }

    /// Display style for moved text: the second and later moved items of a row get an
    /// alternative style so neighbours can be told apart.
    pub fn moved_text_style(&self, part: PartId) -> &'static str {
        let Some(row) = self.chart.part(part).map(|p| p.row()) else {
            return "movedText";
        };
        let earlier_moved = self
            .chart
            .parts_in_row(row)
            .iter()
            .take_while(|p| **p != part)
            .any(|p| self.is_moved_text(*p));
        if earlier_moved { "movedText2" } else { "movedText" }
    }

    /// Maps a display column to its logical index; they differ for right-to-left charts.
    pub fn logical_column_index(&self, display: usize) -> usize {
        if !self.settings.right_to_left {
            return display;
        }
        self.column_count()
            .checked_sub(1)
            .and_then(|last| last.checked_sub(display))
            .unwrap_or(display)
    }

    /// `actual` holds a word group that a marker in column `from_column` of the same row
    /// points at.
    pub fn is_marked_as_moved_from(&self, actual: &ChartLocation, from_column: usize) -> bool {
        self.parts_in_cell(&actual.with_column(from_column))
            .into_iter()
            .any(|p| self.is_marker_of_moved_from(p, actual))
    }
}
