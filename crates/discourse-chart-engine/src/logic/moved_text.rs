//! Moved-text markers: a marker in one cell says the word group it points at was preposed or
//! postposed out of that cell.
//!
//! Marking part of a word group splits the group so exactly one piece covers the marked words.

use super::ChartLogic;
use crate::chart::{CellPartKind, ChartLocation, PartId};
use crate::error::ChartError;
use crate::text::Occurrence;

/// Identifies the marker to remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovedFromMarker {
    /// This exact marker.
    Part(PartId),
    /// Every marker in this cell that points into the moved text's cell.
    Cell(ChartLocation),
}

impl ChartLogic {
    /// Whether the moved text in `actual` comes before its home in `marker_cell`.
    pub fn is_preposed(&self, actual: &ChartLocation, marker_cell: &ChartLocation) -> bool {
        if actual.is_same_row(marker_cell) {
            return actual.column < marker_cell.column;
        }
        match (
            self.chart.row_index(actual.row),
            self.chart.row_index(marker_cell.row),
        ) {
            (Some(a), Some(m)) => a < m,
            _ => false,
        }
    }

    /// A moved-text marker pointing at a word group in `actual`.
    pub fn is_marker_of_moved_from(&self, part: PartId, actual: &ChartLocation) -> bool {
        let Some((target, _)) = self.chart.part(part).and_then(|p| p.moved_text_target()) else {
            return false;
        };
        self.parts_in_cell(actual).contains(&target)
    }

    /// Marks the first word group of `actual` as moved from `marker_cell`, or only the words
    /// `span` of it when given.
    ///
    /// Returns the new marker, or `None` when there is nothing to mark or `span` is not a
    /// contiguous run inside that word group.
    pub fn make_moved_from(
        &mut self,
        actual: ChartLocation,
        marker_cell: ChartLocation,
        span: Option<(Occurrence, Occurrence)>,
    ) -> Result<Option<PartId>, ChartError> {
        let preposed = self.is_preposed(&actual, &marker_cell);
        let Some(group) = self.find_cell_part_in_column(&actual, true) else {
            log::warn!("No word group to mark as moved");
            return Ok(None);
        };
        let split = match span {
            None => None,
            Some((begin, end)) => {
                let words = self.text.wordforms_between(begin, end);
                let Some(run) = self.check_word_group_contains(group, &words) else {
                    log::warn!("Moved text selection is not a contiguous part of one word group");
                    return Ok(None);
                };
                Some(run)
            }
        };

        let mut marker_cell = marker_cell;
        marker_cell.row = self.clear_missing_marker(&marker_cell);
        let target = match split {
            None => group,
            Some((first, last)) => self.mark_partial(group, first, last)?,
        };

        let at = if preposed {
            self.index_of_first_part_in_or_after_column(&marker_cell)
        } else {
            self.index_of_cell_part_in_later_column(marker_cell.row, marker_cell.column)
        };
        let column = self.column_id(marker_cell.column)?;
        let marker = self.chart.insert_part(
            marker_cell.row,
            at,
            column,
            CellPartKind::MovedTextMarker {
                word_group: target,
                preposed,
            },
        )?;
        Ok(Some(marker))
    }

    /// Splits `group` so one piece covers exactly its words `first..=last`, and returns that
    /// piece.
    fn mark_partial(
        &mut self,
        group: PartId,
        first: usize,
        last: usize,
    ) -> Result<PartId, ChartError> {
        let count = self.occurrences(group).len();
        if last + 1 < count {
            self.pull_out_remainder(group, last + 1)?;
        }
        if first == 0 {
            return Ok(group);
        }
        self.pull_out_remainder(group, first)?
            .ok_or(ChartError::PartNotFound(group))
    }

    /// Positions in `group` of the first and last of `words`, provided they appear there as one
    /// contiguous, ordered run.
    pub fn check_word_group_contains(
        &self,
        group: PartId,
        words: &[Occurrence],
    ) -> Option<(usize, usize)> {
        let first_word = words.first()?;
        let covered = self.occurrences(group);
        let first = covered.iter().position(|w| w == first_word)?;
        let last = first + words.len() - 1;
        (covered.get(first..=last)? == words).then_some((first, last))
    }

    /// Cuts `group` short before its word at `from`, moving that word and the rest into a new
    /// word group right after it.
    fn pull_out_remainder(
        &mut self,
        group: PartId,
        from: usize,
    ) -> Result<Option<PartId>, ChartError> {
        let words = self.occurrences(group);
        let (Some(&begin), Some(&end), Some(&new_end)) = (
            words.get(from),
            words.last(),
            from.checked_sub(1).and_then(|i| words.get(i)),
        ) else {
            return Ok(None);
        };
        let (Some(cell), Some(index)) = (self.location_of_part(group), self.chart.index_in_row(group))
        else {
            return Err(ChartError::PartNotFound(group));
        };
        if let Some(span) = self.chart.part_mut(group).and_then(|p| p.word_group_mut()) {
            span.end = new_end;
        }
        self.make_word_group(cell, index + 1, begin, end).map(Some)
    }

    /// Deletes a moved-text marker and merges the word groups of `actual` it was keeping apart.
    pub fn remove_moved_from(&mut self, actual: ChartLocation, marker: MovedFromMarker) {
        let markers = match marker {
            MovedFromMarker::Part(part) if self.is_moved_text_marker(part) => vec![part],
            MovedFromMarker::Part(part) => {
                log::warn!("Cell part {part:?} is not a moved-text marker; nothing removed");
                return;
            }
            MovedFromMarker::Cell(cell) => self
                .parts_in_cell(&cell)
                .into_iter()
                .filter(|p| self.is_marker_of_moved_from(*p, &actual))
                .collect(),
        };
        let mut first_deleted = None;
        for part in markers {
            if let Some(index) = self.chart.remove_part(part).first_deleted_index {
                first_deleted = Some(first_deleted.map_or(index, |i: usize| i.min(index)));
            }
        }
        self.collapse_redundant_word_groups(&actual);
        if let Some(index) = first_deleted {
            self.renumber_rows(index.saturating_sub(1), false);
        }
    }

    /// Merges each run of adjacent word groups in `cell` that are not moved text.
    pub(crate) fn collapse_redundant_word_groups(&mut self, cell: &ChartLocation) {
        let mut current: Option<PartId> = None;
        for part in self.parts_in_cell(cell) {
            if !self.is_word_group(part) || self.is_moved_text(part) {
                current = None;
                continue;
            }
            match current {
                Some(into) => {
                    self.absorb_word_group(part, into);
                    self.chart.remove_part(part);
                }
                None => current = Some(part),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::test_support::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_mark_entire_cell_preposed_within_row() {
        let mut logic = logic_with("w0 w1 w2", 4);
        let row = logic.chart.append_row("1");
        let group = add_group(&mut logic, row, 0, 0, 1);
        add_group(&mut logic, row, 3, 2, 2);

        let marker = logic
            .make_moved_from(cell(row, 0), cell(row, 2), None)
            .unwrap()
            .unwrap();

        assert_eq!(
            logic.chart.part(marker).unwrap().moved_text_target(),
            Some((group, true))
        );
        assert_eq!(logic.location_of_part(marker), Some(cell(row, 2)));
        assert_eq!(logic.chart.index_in_row(marker), Some(1));
        assert!(logic.is_moved_text(group));
    }

    #[test]
    fn test_postposed_marker_goes_after_cell_contents() {
        let mut logic = logic_with("w0 w1 w2", 3);
        let row = logic.chart.append_row("1");
        add_group(&mut logic, row, 0, 0, 0);
        let group = add_group(&mut logic, row, 2, 1, 2);

        let marker = logic
            .make_moved_from(cell(row, 2), cell(row, 0), None)
            .unwrap()
            .unwrap();

        assert_eq!(logic.chart.index_in_row(marker), Some(1));
        assert!(!logic.is_preposed_marker(marker));
        assert!(logic.is_marker_of_moved_from(marker, &cell(row, 2)));
        assert!(logic.is_moved_text(group));
    }

    #[test]
    fn test_partial_mark_in_middle_splits_into_three() {
        let mut logic = logic_with("w0 w1 w2 w3 w4", 3);
        let row = logic.chart.append_row("1");
        add_group(&mut logic, row, 0, 0, 4);

        let marker = logic
            .make_moved_from(cell(row, 0), cell(row, 2), Some((occ(2), occ(3))))
            .unwrap()
            .unwrap();

        assert_eq!(
            cell_words(&logic, row, 0),
            vec![vec![0, 1], vec![2, 3], vec![4]]
        );
        let (target, _) = logic.chart.part(marker).unwrap().moved_text_target().unwrap();
        assert_eq!(words_of(&logic, target), vec![2, 3]);
    }

    #[test]
    fn test_partial_mark_at_start_keeps_original_for_marked_words() {
        let mut logic = logic_with("w0 w1 w2", 3);
        let row = logic.chart.append_row("1");
        let group = add_group(&mut logic, row, 1, 0, 2);

        let marker = logic
            .make_moved_from(cell(row, 1), cell(row, 2), Some((occ(0), occ(0))))
            .unwrap()
            .unwrap();

        assert_eq!(cell_words(&logic, row, 1), vec![vec![0], vec![1, 2]]);
        assert_eq!(
            logic.chart.part(marker).unwrap().moved_text_target(),
            Some((group, true))
        );
    }

    #[test]
    fn test_selection_outside_group_is_rejected() {
        let mut logic = logic_with("w0 w1 w2 w3", 3);
        let row = logic.chart.append_row("1");
        add_group(&mut logic, row, 0, 0, 1);
        add_group(&mut logic, row, 1, 2, 3);

        let result = logic
            .make_moved_from(cell(row, 0), cell(row, 2), Some((occ(1), occ(2))))
            .unwrap();

        assert_eq!(result, None);
        assert_eq!(cell_words(&logic, row, 0), vec![vec![0, 1]]);
    }

    #[test]
    fn test_rejected_selection_keeps_missing_marker() {
        let mut logic = logic_with("w0 w1 w2 w3", 3);
        let row = logic.chart.append_row("1");
        add_group(&mut logic, row, 0, 0, 1);
        add_group(&mut logic, row, 1, 2, 3);
        let missing = add_missing(&mut logic, row, 2);

        let result = logic
            .make_moved_from(cell(row, 0), cell(row, 2), Some((occ(1), occ(2))))
            .unwrap();

        assert_eq!(result, None);
        assert_eq!(logic.parts_in_cell(&cell(row, 2)), vec![missing]);
        assert!(logic.is_missing_marker(missing));
        assert_eq!(cell_words(&logic, row, 0), vec![vec![0, 1]]);
    }

    #[test]
    fn test_mark_replaces_missing_marker_in_marker_cell() {
        let mut logic = logic_with("w0 w1 w2", 3);
        let row = logic.chart.append_row("1");
        add_group(&mut logic, row, 0, 0, 1);
        add_missing(&mut logic, row, 2);

        let marker = logic
            .make_moved_from(cell(row, 0), cell(row, 2), Some((occ(1), occ(1))))
            .unwrap()
            .unwrap();

        assert_eq!(logic.parts_in_cell(&cell(row, 2)), vec![marker]);
        assert_eq!(cell_words(&logic, row, 0), vec![vec![0], vec![1]]);
    }

    #[test]
    fn test_remove_moved_from_ignores_word_group() {
        let mut logic = logic_with("w0 w1 w2", 3);
        let row = logic.chart.append_row("1");
        let group = add_group(&mut logic, row, 0, 0, 1);
        add_group(&mut logic, row, 1, 2, 2);

        logic.remove_moved_from(cell(row, 0), MovedFromMarker::Part(group));

        assert_eq!(cell_words(&logic, row, 0), vec![vec![0, 1]]);
        assert!(logic.chart.contains_part(group));
    }

    #[test]
    fn test_remove_moved_from_recombines_split_group() {
        let mut logic = logic_with("w0 w1 w2 w3 w4", 3);
        let row = logic.chart.append_row("1");
        add_group(&mut logic, row, 0, 0, 4);
        logic
            .make_moved_from(cell(row, 0), cell(row, 2), Some((occ(2), occ(3))))
            .unwrap();

        logic.remove_moved_from(cell(row, 0), MovedFromMarker::Cell(cell(row, 2)));

        assert_eq!(cell_words(&logic, row, 0), vec![vec![0, 1, 2, 3, 4]]);
        assert!(logic.is_cell_empty(&cell(row, 2)));
    }

    #[test]
    fn test_collapse_does_not_swallow_into_moved_text() {
        let mut logic = logic_with("w0 w1 w2 w3", 3);
        let row = logic.chart.append_row("1");
        add_group(&mut logic, row, 0, 0, 0);
        let moved = add_group(&mut logic, row, 0, 1, 1);
        add_group(&mut logic, row, 0, 2, 2);
        add_group(&mut logic, row, 0, 3, 3);
        let at = logic.index_of_cell_part_in_later_column(row, 1);
        let column = logic.column_id(1).unwrap();
        logic
            .chart
            .insert_part(
                row,
                at,
                column,
                CellPartKind::MovedTextMarker {
                    word_group: moved,
                    preposed: false,
                },
            )
            .unwrap();

        logic.collapse_redundant_word_groups(&cell(row, 0));

        assert_eq!(
            cell_words(&logic, row, 0),
            vec![vec![0], vec![1], vec![2, 3]]
        );
    }
}
