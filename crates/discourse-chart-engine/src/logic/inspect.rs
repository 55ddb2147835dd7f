//! Query primitives over the parts of a cell or row. Every other module scans through these.

use super::ChartLogic;
use crate::chart::{ChartLocation, PartId, RowId, index_of_column};
use crate::text::Occurrence;

impl ChartLogic {
    pub fn column_index_of_part(&self, part: PartId) -> Option<usize> {
        let part = self.chart.part(part)?;
        index_of_column(&self.columns, part.column())
    }

    pub fn is_word_group(&self, part: PartId) -> bool {
        self.chart.part(part).is_some_and(|p| p.is_word_group())
    }

    /// Wordforms covered by a word group; empty for anything else.
    pub fn occurrences(&self, part: PartId) -> Vec<Occurrence> {
        self.chart
            .word_group(part)
            .map(|span| span.occurrences(&self.text))
            .unwrap_or_default()
    }

    pub fn moved_text_marker_of(&self, word_group: PartId) -> Option<PartId> {
        self.chart
            .moved_text_markers_for(word_group)
            .into_iter()
            .next()
    }

    /// A word group that some moved-text marker points at.
    pub fn is_moved_text(&self, part: PartId) -> bool {
        self.is_word_group(part) && self.moved_text_marker_of(part).is_some()
    }

    pub fn is_moved_text_marker(&self, part: PartId) -> bool {
        self.chart
            .part(part)
            .is_some_and(|p| p.moved_text_target().is_some())
    }

    pub fn is_preposed_marker(&self, part: PartId) -> bool {
        self.chart.part(part).is_some_and(|p| p.is_preposed_marker())
    }

    pub fn is_missing_marker(&self, part: PartId) -> bool {
        self.chart.part(part).is_some_and(|p| p.is_missing_marker())
    }

    /// Parts of the row that sit in the cell's column, in row order.
    pub fn parts_in_cell(&self, cell: &ChartLocation) -> Vec<PartId> {
        self.cell_parts_in_cell(cell).0
    }

    /// Parts in the cell, plus the row index of the first of them (the insertion point when
    /// the cell is empty).
    pub(crate) fn cell_parts_in_cell(&self, cell: &ChartLocation) -> (Vec<PartId>, usize) {
        let mut parts = Vec::new();
        let mut index = 0;
        for part in self.chart.parts_in_row(cell.row) {
            let column = self.column_index_of_part(*part);
            if column == Some(cell.column) {
                parts.push(*part);
                continue;
            }
            if column.is_some_and(|c| c > cell.column) {
                break;
            }
            index += 1;
        }
        (parts, index)
    }

    pub fn is_cell_empty(&self, cell: &ChartLocation) -> bool {
        self.parts_in_cell(cell).is_empty()
    }

    pub fn word_groups_in(&self, parts: &[PartId]) -> Vec<PartId> {
        parts
            .iter()
            .copied()
            .filter(|p| self.is_word_group(*p))
            .collect()
    }

    pub fn find_first_word_group(&self, parts: &[PartId]) -> Option<PartId> {
        parts.iter().copied().find(|p| self.is_word_group(*p))
    }

    pub fn find_last_word_group(&self, parts: &[PartId]) -> Option<PartId> {
        parts.iter().rev().copied().find(|p| self.is_word_group(*p))
    }

    /// First word group at or after `start`, with its index in `parts`.
    pub fn find_next_word_group(&self, parts: &[PartId], start: usize) -> Option<(PartId, usize)> {
        parts
            .iter()
            .enumerate()
            .skip(start)
            .find(|(_, p)| self.is_word_group(**p))
            .map(|(i, p)| (*p, i))
    }

    /// Last word group before `end`, with its index in `parts`.
    pub fn find_previous_word_group(
        &self,
        parts: &[PartId],
        end: usize,
    ) -> Option<(PartId, usize)> {
        parts
            .iter()
            .enumerate()
            .take(end)
            .rev()
            .find(|(_, p)| self.is_word_group(**p))
            .map(|(i, p)| (*p, i))
    }

    /// First part in the cell, or its first word group when `word_groups_only`.
    pub fn find_cell_part_in_column(
        &self,
        cell: &ChartLocation,
        word_groups_only: bool,
    ) -> Option<PartId> {
        let parts = self.parts_in_cell(cell);
        if word_groups_only {
            self.find_first_word_group(&parts)
        } else {
            parts.first().copied()
        }
    }

    /// Row index of the first part in a column after `column`, or the part count.
    pub fn index_of_cell_part_in_later_column(&self, row: RowId, column: usize) -> usize {
        let parts = self.chart.parts_in_row(row);
        parts
            .iter()
            .position(|p| self.column_index_of_part(*p).is_none_or(|c| c > column))
            .unwrap_or(parts.len())
    }

    /// Row index of the first part in the cell's column or any later one, or the part count.
    pub fn index_of_first_part_in_or_after_column(&self, cell: &ChartLocation) -> usize {
        let parts = self.chart.parts_in_row(cell.row);
        parts
            .iter()
            .position(|p| {
                self.column_index_of_part(*p)
                    .is_none_or(|c| c >= cell.column)
            })
            .unwrap_or(parts.len())
    }

    pub fn first_word_group_in_row(&self, row: RowId) -> Option<PartId> {
        self.find_first_word_group(self.chart.parts_in_row(row))
    }

    pub fn last_word_group_in_row(&self, row: RowId) -> Option<PartId> {
        self.find_last_word_group(self.chart.parts_in_row(row))
    }

    /// Cell currently holding a part.
    pub fn location_of_part(&self, part: PartId) -> Option<ChartLocation> {
        let row = self.chart.part(part)?.row();
        Some(ChartLocation::new(row, self.column_index_of_part(part)?))
    }
}

#[cfg(test)]
mod tests {
    use crate::logic::test_support::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parts_in_cell_and_insertion_index() {
        let mut logic = logic_with("a b c d e", 4);
        let row = logic.chart.append_row("1");
        let first = add_group(&mut logic, row, 0, 0, 0);
        let second = add_group(&mut logic, row, 2, 1, 1);
        let third = add_group(&mut logic, row, 2, 2, 3);
        add_group(&mut logic, row, 3, 4, 4);

        let (parts, index) = logic.cell_parts_in_cell(&cell(row, 2));
        assert_eq!(parts, vec![second, third]);
        assert_eq!(index, 1);

        let (empty, insert_at) = logic.cell_parts_in_cell(&cell(row, 1));
        assert!(empty.is_empty());
        assert_eq!(insert_at, 1);
        assert!(logic.is_cell_empty(&cell(row, 1)));
        assert_eq!(logic.find_cell_part_in_column(&cell(row, 0), true), Some(first));
    }

    #[test]
    fn test_word_group_scans_skip_markers() {
        let mut logic = logic_with("a b c", 3);
        let row = logic.chart.append_row("1");
        let missing = add_missing(&mut logic, row, 0);
        let group = add_group(&mut logic, row, 1, 0, 1);
        let parts = logic.chart.parts_in_row(row).to_vec();

        assert_eq!(parts, vec![missing, group]);
        assert_eq!(logic.find_first_word_group(&parts), Some(group));
        assert_eq!(logic.find_last_word_group(&parts), Some(group));
        assert_eq!(logic.find_next_word_group(&parts, 0), Some((group, 1)));
        assert_eq!(logic.find_next_word_group(&parts, 2), None);
        assert_eq!(logic.find_previous_word_group(&parts, 1), None);
        assert_eq!(logic.find_previous_word_group(&parts, 2), Some((group, 1)));
    }

    #[test]
    fn test_later_column_indices() {
        let mut logic = logic_with("a b c", 4);
        let row = logic.chart.append_row("1");
        add_group(&mut logic, row, 1, 0, 0);
        add_group(&mut logic, row, 3, 1, 1);

        assert_eq!(logic.index_of_cell_part_in_later_column(row, 0), 0);
        assert_eq!(logic.index_of_cell_part_in_later_column(row, 1), 1);
        assert_eq!(logic.index_of_cell_part_in_later_column(row, 3), 2);
        assert_eq!(logic.index_of_first_part_in_or_after_column(&cell(row, 1)), 0);
        assert_eq!(logic.index_of_first_part_in_or_after_column(&cell(row, 2)), 1);
    }
}
