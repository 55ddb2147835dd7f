//! Deciding where newly charted words go.
//!
//! The `find_*` functions only plan. Callers apply the plan, which keeps every decision testable
//! against a chart without touching it.

use super::{BorderingCells, ChartLogic};
use crate::chart::{CellPartKind, ChartLocation, PartId, Row, RowId, WordGroupSpan};
use crate::error::ChartError;
use crate::text::{Occurrence, TextPosition};

/// Where words appended at the end of the chart should go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhereToAdd {
    /// Extend this word group (the last one in the last row) forward.
    AppendToExisting(PartId),
    /// New word group at `index` of the last row. `replacing` is a missing marker occupying the
    /// slot, to be removed once the group is in place.
    InsertInRow {
        index: usize,
        replacing: Option<PartId>,
    },
    /// New word group at the start of a new row.
    MakeNewRow,
}

/// Where a chart orphan should go inside a chosen cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhereToAddChOrph {
    /// New word group at this index of the row's parts.
    InsertInRow(usize),
    /// The orphan falls before or inside `group`; `index` is its slot among the group's words.
    InsertWithinWordGroup { group: PartId, index: usize },
    /// The orphan follows `group` directly.
    AppendToExisting { group: PartId, index: usize },
}

impl WhereToAddChOrph {
    /// The group to grow, and whether to grow it forward.
    pub fn growth(&self) -> Option<(PartId, bool)> {
        match *self {
            Self::InsertInRow(_) => None,
            Self::InsertWithinWordGroup { group, index }
            | Self::AppendToExisting { group, index } => Some((group, index > 0)),
        }
    }
}

impl ChartLogic {
    /// Plans appending words to column `column` at the end of the chart.
    pub fn find_where_to_add_words(&self, column: usize) -> WhereToAdd {
        let Some(last_row) = self.chart.last_row() else {
            return WhereToAdd::MakeNewRow;
        };
        let parts = self.chart.parts_in_row(last_row);
        if parts.is_empty() {
            return WhereToAdd::InsertInRow {
                index: 0,
                replacing: None,
            };
        }

        let mut i = parts.len() - 1;
        let group = loop {
            let part = parts[i];
            if self.is_word_group(part) {
                break part;
            }
            let part_column = self.column_index_of_part(part);
            if part_column == Some(column) {
                if self.is_missing_marker(part) {
                    return WhereToAdd::InsertInRow {
                        index: i,
                        replacing: Some(part),
                    };
                }
                return WhereToAdd::MakeNewRow;
            }
            if part_column.is_some_and(|c| c < column) {
                return WhereToAdd::InsertInRow {
                    index: i + 1,
                    replacing: None,
                };
            }
            if i == 0 {
                return WhereToAdd::InsertInRow {
                    index: 0,
                    replacing: None,
                };
            }
            i -= 1;
        };

        match self.column_index_of_part(group) {
            Some(c) if c == column => WhereToAdd::AppendToExisting(group),
            Some(c) if c > column => WhereToAdd::MakeNewRow,
            _ => WhereToAdd::InsertInRow {
                index: i + 1,
                replacing: None,
            },
        }
    }

    /// Plans placing a chart orphan at `position` into `cell`.
    pub fn find_where_to_add_chorph(
        &self,
        cell: &ChartLocation,
        position: TextPosition,
    ) -> WhereToAddChOrph {
        if self.chart.parts_in_row(cell.row).is_empty() {
            return WhereToAddChOrph::InsertInRow(0);
        }
        let parts = self.parts_in_cell(cell);
        let (Some((first, first_index)), Some(location)) = (
            self.find_next_word_group(&parts, 0),
            self.text.occurrence_at(position),
        ) else {
            return WhereToAddChOrph::InsertInRow(self.find_where_to_insert_in_row(cell));
        };

        let mut previous = first;
        let (mut current, mut current_index) = (first, first_index);
        loop {
            let words = self.occurrences(current);
            let (Some(begin), Some(end)) = (words.first(), words.last()) else {
                return WhereToAddChOrph::InsertInRow(self.find_where_to_insert_in_row(cell));
            };
            if begin.is_after(&location) {
                if current == first {
                    return WhereToAddChOrph::InsertWithinWordGroup {
                        group: current,
                        index: 0,
                    };
                }
                // Sits between two groups of the cell: grow the earlier one forward.
                let len = self.occurrences(previous).len();
                return WhereToAddChOrph::AppendToExisting {
                    group: previous,
                    index: len,
                };
            }
            if end.is_after(&location) {
                return WhereToAddChOrph::InsertWithinWordGroup {
                    group: current,
                    index: words.len() - 1,
                };
            }
            previous = current;
            match self.find_next_word_group(&parts, current_index + 1) {
                Some((next, next_index)) => (current, current_index) = (next, next_index),
                None => {
                    return WhereToAddChOrph::AppendToExisting {
                        group: current,
                        index: words.len(),
                    };
                }
            }
        }
    }

    /// Row index for a new word group in `cell`: after earlier columns and any preposed markers
    /// of the cell, before everything else.
    pub fn find_where_to_insert_in_row(&self, cell: &ChartLocation) -> usize {
        let parts = self.chart.parts_in_row(cell.row);
        for (index, part) in parts.iter().enumerate() {
            match self.column_index_of_part(*part) {
                Some(c) if c < cell.column => continue,
                Some(c) if c == cell.column && self.is_preposed_marker(*part) => continue,
                _ => return index,
            }
        }
        parts.len()
    }

    /// True when no charted word group starts before `position`.
    pub(crate) fn precedes_all_charted(&self, position: TextPosition) -> bool {
        self.chart
            .rows()
            .iter()
            .find_map(|row| self.first_word_group_in_row(*row))
            .is_none_or(|group| !self.word_group_starts_before(position, group))
    }

    /// The row a chart orphan goes into when dropped in column `column`, or `None` when the
    /// column cannot hold it without putting the text out of order.
    ///
    /// An orphan preceding every charted word that is dropped after the first row's first word
    /// group gets a new first row.
    pub(crate) fn get_valid_row_for_chorph(
        &mut self,
        position: TextPosition,
        bordering: &BorderingCells,
        column: usize,
    ) -> Option<RowId> {
        let prec = bordering.preceding;
        let foll = bordering.following;
        let first_row = self.chart.rows().first().copied()?;
        if self.precedes_all_charted(position) {
            if foll.row == first_row && column > foll.column {
                let row = self.chart.insert_row(0, Row::new(""));
                self.renumber_rows(0, false);
                return Some(row);
            }
            return Some(first_row);
        }
        if prec.row == foll.row {
            if column < prec.column || column > foll.column {
                return None;
            }
            return Some(prec.row);
        }
        if column < prec.column {
            let next = self.chart.next_row(prec.row)?;
            if next == foll.row && column > foll.column {
                return None;
            }
            return Some(next);
        }
        Some(prec.row)
    }

    /// Inserts a new word group spanning `begin..=end` at `index` of the cell's row.
    pub fn make_word_group(
        &mut self,
        cell: ChartLocation,
        index: usize,
        begin: Occurrence,
        end: Occurrence,
    ) -> Result<PartId, ChartError> {
        if !self.text.has_wordform(begin) {
            return Err(ChartError::NotAWordform(begin));
        }
        if !self.text.has_wordform(end) {
            return Err(ChartError::NotAWordform(end));
        }
        let column = self.column_id(cell.column)?;
        let span = WordGroupSpan::new(&self.text, begin, end);
        self.chart
            .insert_part(cell.row, index, column, CellPartKind::WordGroup(span))
    }

    /// Adds a word group after the last one already in `cell`, or where a new one belongs.
    pub fn append_word_group(
        &mut self,
        cell: ChartLocation,
        begin: Occurrence,
        end: Occurrence,
    ) -> Result<PartId, ChartError> {
        let parts = self.parts_in_cell(&cell);
        let index = match self.find_last_word_group(&parts) {
            Some(last) => self
                .chart
                .index_in_row(last)
                .map_or_else(|| self.find_where_to_insert_in_row(&cell), |i| i + 1),
            None => self.find_where_to_insert_in_row(&cell),
        };
        self.make_word_group(cell, index, begin, end)
    }

    /// Grows `group` one word at a time until it reaches the last (forward) or first (backward)
    /// selected word. Does nothing if the group already covers it.
    pub(crate) fn expand_word_group_to_include(
        &mut self,
        group: PartId,
        words: &[Occurrence],
        forward: bool,
    ) {
        let target = if forward { words.last() } else { words.first() };
        let Some(&target) = target else {
            return;
        };
        let text = &self.text;
        let Some(span) = self.chart.part_mut(group).and_then(|p| p.word_group_mut()) else {
            return;
        };
        if forward {
            while span.end < target && span.grow_from_end(text) {}
        } else {
            while span.begin > target && span.grow_from_beginning(text) {}
        }
    }

    /// Moves the end of `group` forward to `end`.
    pub(crate) fn extend_word_group_forward_to(&mut self, group: PartId, end: Occurrence) {
        if let Some(span) = self.chart.part_mut(group).and_then(|p| p.word_group_mut())
            && end > span.end
        {
            span.end = end;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::test_support::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_chart_makes_new_row() {
        let logic = logic_with("a b c", 3);
        assert_eq!(logic.find_where_to_add_words(1), WhereToAdd::MakeNewRow);
    }

    #[test]
    fn test_same_column_appends_to_last_group() {
        let mut logic = logic_with("a b c", 3);
        let row = logic.chart.append_row("1");
        let group = add_group(&mut logic, row, 1, 0, 0);

        assert_eq!(
            logic.find_where_to_add_words(1),
            WhereToAdd::AppendToExisting(group)
        );
        assert_eq!(
            logic.find_where_to_add_words(2),
            WhereToAdd::InsertInRow {
                index: 1,
                replacing: None
            }
        );
        assert_eq!(logic.find_where_to_add_words(0), WhereToAdd::MakeNewRow);
    }

    #[test]
    fn test_missing_marker_in_target_column_is_replaced() {
        let mut logic = logic_with("a b c", 3);
        let row = logic.chart.append_row("1");
        add_group(&mut logic, row, 0, 0, 0);
        let missing = add_missing(&mut logic, row, 1);

        assert_eq!(
            logic.find_where_to_add_words(1),
            WhereToAdd::InsertInRow {
                index: 1,
                replacing: Some(missing)
            }
        );
    }

    #[test]
    fn test_other_marker_in_target_column_forces_new_row() {
        let mut logic = logic_with("a b c", 3);
        let row = logic.chart.append_row("1");
        let id = logic.column_id(1).unwrap();
        logic
            .chart
            .insert_part(
                row,
                0,
                id,
                CellPartKind::ClauseMarker {
                    dependent_rows: vec![],
                },
            )
            .unwrap();

        assert_eq!(logic.find_where_to_add_words(1), WhereToAdd::MakeNewRow);
    }

    #[test]
    fn test_marker_in_later_column_only_inserts_before_it() {
        let mut logic = logic_with("a b c", 3);
        let row = logic.chart.append_row("1");
        add_missing(&mut logic, row, 2);

        assert_eq!(
            logic.find_where_to_add_words(0),
            WhereToAdd::InsertInRow {
                index: 0,
                replacing: None
            }
        );
    }

    #[test]
    fn test_insert_in_row_skips_preposed_markers() {
        let mut logic = logic_with("a b c d", 3);
        let row = logic.chart.append_row("1");
        let target = add_group(&mut logic, row, 2, 3, 3);
        let id = logic.column_id(1).unwrap();
        logic
            .chart
            .insert_part(
                row,
                0,
                id,
                CellPartKind::MovedTextMarker {
                    word_group: target,
                    preposed: true,
                },
            )
            .unwrap();

        assert_eq!(logic.find_where_to_insert_in_row(&cell(row, 1)), 1);
        assert_eq!(logic.find_where_to_insert_in_row(&cell(row, 0)), 0);
        assert_eq!(logic.find_where_to_insert_in_row(&cell(row, 2)), 1);
    }

    #[test]
    fn test_chorph_before_first_group_grows_it_backward() {
        let mut logic = logic_with("w0 w1 w2 w3 w4", 3);
        let row = logic.chart.append_row("1");
        let group = add_group(&mut logic, row, 1, 2, 3);
        let position = logic.text.position(occ(1)).unwrap();

        let plan = logic.find_where_to_add_chorph(&cell(row, 1), position);

        assert_eq!(
            plan,
            WhereToAddChOrph::InsertWithinWordGroup { group, index: 0 }
        );
        assert_eq!(plan.growth(), Some((group, false)));
    }

    #[test]
    fn test_chorph_between_groups_grows_earlier_one_forward() {
        let mut logic = logic_with("w0 w1 w2 w3 w4 w5", 3);
        let row = logic.chart.append_row("1");
        let earlier = add_group(&mut logic, row, 1, 0, 1);
        add_group(&mut logic, row, 1, 4, 5);
        let position = logic.text.position(occ(2)).unwrap();

        let plan = logic.find_where_to_add_chorph(&cell(row, 1), position);

        assert_eq!(plan.growth(), Some((earlier, true)));
        logic.expand_word_group_to_include(earlier, &[occ(2), occ(3)], true);
        assert_eq!(words_of(&logic, earlier), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_chorph_into_empty_cell_inserts_group() {
        let mut logic = logic_with("w0 w1 w2 w3", 3);
        let row = logic.chart.append_row("1");
        add_group(&mut logic, row, 0, 0, 0);
        add_group(&mut logic, row, 2, 3, 3);
        let position = logic.text.position(occ(1)).unwrap();

        assert_eq!(
            logic.find_where_to_add_chorph(&cell(row, 1), position),
            WhereToAddChOrph::InsertInRow(1)
        );
    }

    #[test]
    fn test_expand_stops_when_already_covered() {
        let mut logic = logic_with("w0 w1 w2 w3", 2);
        let row = logic.chart.append_row("1");
        let group = add_group(&mut logic, row, 0, 0, 3);

        logic.expand_word_group_to_include(group, &[occ(1)], true);

        assert_eq!(words_of(&logic, group), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_valid_row_for_chorph_in_same_row() {
        let mut logic = logic_with("w0 w1 w2 w3", 4);
        let row = logic.chart.append_row("1");
        add_group(&mut logic, row, 0, 0, 0);
        add_group(&mut logic, row, 2, 2, 3);
        let position = logic.text.position(occ(1)).unwrap();
        let bordering = logic.bordering_cells(position).unwrap();

        assert_eq!(logic.get_valid_row_for_chorph(position, &bordering, 1), Some(row));
        assert_eq!(logic.get_valid_row_for_chorph(position, &bordering, 3), None);
    }

    #[test]
    fn test_orphan_before_everything_gets_new_first_row() {
        let mut logic = logic_with("w0 w1 w2", 3);
        let row = logic.chart.append_row("1");
        add_group(&mut logic, row, 0, 1, 2);
        let position = logic.text.position(occ(0)).unwrap();
        let bordering = logic.bordering_cells(position).unwrap();

        let chosen = logic
            .get_valid_row_for_chorph(position, &bordering, 2)
            .unwrap();

        assert_eq!(logic.chart.rows(), &[chosen, row]);
        assert_eq!(logic.chart.row_label(chosen), Some("1a"));
        assert_eq!(logic.chart.row_label(row), Some("1b"));
    }
}
