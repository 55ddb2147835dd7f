//! User-level commands. Each one runs in a single unit of work and reports the rows it touched.

use super::{ChartLogic, MovedFromMarker, UndoLabels, WhereToAdd, WhereToAddChOrph};
use crate::chart::{CellPartKind, ChartLocation, ClauseType, PartId, PossibilityId, Row, RowId};
use crate::error::ChartError;
use crate::text::{Occurrence, TextPosition};

impl ChartLogic {
    /// Charts the selected ribbon words in column `column`.
    ///
    /// Words past the chart's frontier are appended; a chart orphan goes into the row the
    /// highlighted range allows for that column. Returns the row that received the words.
    pub fn move_to_column(&mut self, column: usize) -> Result<RowId, ChartError> {
        let row = self.in_unit_of_work(UndoLabels::MOVE_TO_COLUMN, |logic| {
            logic.place_selected_words(column)
        })?;
        self.fire_row_modified(Some(row));
        Ok(row)
    }

    /// Starts a new row and charts the selected words in `column` of it.
    pub fn move_to_here_in_new_clause(&mut self, column: usize) -> Result<RowId, ChartError> {
        if self.ribbon.selected().is_empty() {
            return Err(ChartError::NoWordformsSelected);
        }
        let row = self.in_unit_of_work(UndoLabels::NEW_CLAUSE, |logic| {
            let fresh = logic.make_new_row();
            let placed = logic.place_selected_words(column);
            if placed.is_err() && logic.chart.parts_in_row(fresh).is_empty() {
                let removal = logic.chart.remove_row(fresh);
                if let Some(index) = removal.first_deleted_index {
                    logic.renumber_rows(index.saturating_sub(1), false);
                }
            }
            placed
        })?;
        self.fire_row_modified(Some(row));
        Ok(row)
    }

    /// Charts the selected words in `actual_column` and marks them as moved from
    /// `from_column` of the same row.
    pub fn make_moved_text(
        &mut self,
        actual_column: usize,
        from_column: usize,
    ) -> Result<RowId, ChartError> {
        self.column_id(from_column)?;
        let row = self.in_unit_of_work(UndoLabels::MAKE_MOVED, |logic| {
            let row = logic.place_selected_words(actual_column)?;
            logic.make_moved_from(
                ChartLocation::new(row, actual_column),
                ChartLocation::new(row, from_column),
                None,
            )?;
            Ok::<_, ChartError>(row)
        })?;
        self.fire_row_modified(Some(row));
        Ok(row)
    }

    fn place_selected_words(&mut self, column: usize) -> Result<RowId, ChartError> {
        let selected = self.ribbon.selected().to_vec();
        let (Some(&first), Some(&last)) = (selected.first(), selected.last()) else {
            return Err(ChartError::NoWordformsSelected);
        };
        self.column_id(column)?;
        let row = match self.is_chorph(first)? {
            Some(position) => self.place_chorph(position, &selected, column)?,
            None => self.place_at_end(column, first, last)?,
        };
        self.note_ribbon_changed();
        Ok(row)
    }

    fn place_chorph(
        &mut self,
        position: TextPosition,
        selected: &[Occurrence],
        column: usize,
    ) -> Result<RowId, ChartError> {
        let (Some(&first), Some(&last)) = (selected.first(), selected.last()) else {
            return Err(ChartError::NoWordformsSelected);
        };
        let bordering = self
            .bordering_cells(position)
            .ok_or(ChartError::ChooseDifferentColumn)?;
        let row = self
            .get_valid_row_for_chorph(position, &bordering, column)
            .ok_or(ChartError::ChooseDifferentColumn)?;
        let cell = ChartLocation::new(row, column);
        match self.find_where_to_add_chorph(&cell, position) {
            WhereToAddChOrph::InsertInRow(index) => {
                self.make_word_group(cell, index, first, last)?;
            }
            plan => {
                if let Some((group, forward)) = plan.growth() {
                    self.expand_word_group_to_include(group, selected, forward);
                }
            }
        }
        Ok(row)
    }

    fn place_at_end(
        &mut self,
        column: usize,
        first: Occurrence,
        last: Occurrence,
    ) -> Result<RowId, ChartError> {
        match self.find_where_to_add_words(column) {
            WhereToAdd::AppendToExisting(group) => {
                self.extend_word_group_forward_to(group, last);
                self.chart
                    .part(group)
                    .map(|p| p.row())
                    .ok_or(ChartError::PartNotFound(group))
            }
            WhereToAdd::InsertInRow { index, replacing } => {
                let row = match self.chart.last_row() {
                    Some(row) => row,
                    None => self.make_new_row(),
                };
                self.make_word_group(ChartLocation::new(row, column), index, first, last)?;
                if let Some(marker) = replacing {
                    self.chart.remove_part(marker);
                }
                Ok(row)
            }
            WhereToAdd::MakeNewRow => {
                let row = self.make_new_row();
                self.make_word_group(ChartLocation::new(row, column), 0, first, last)?;
                Ok(row)
            }
        }
    }

    /// Removes `part`, recreating its row in place when `part` was all that kept it alive.
    ///
    /// The recreated row keeps the label, flags, clause type and its place in clause markers'
    /// dependent rows. Meant for markers; returns the surviving row.
    pub(crate) fn remove_part_keeping_row(&mut self, part: PartId) -> Option<RowId> {
        let row = self.chart.part(part)?.row();
        let sole_part = self.chart.parts_in_row(row).len() == 1
            && self.chart.row(row).is_some_and(|r| r.notes.is_none());
        if !sole_part {
            self.chart.remove_part(part);
            return Some(row);
        }

        let properties = self.chart.row(row)?.properties();
        let index = self.chart.row_index(row)?;
        let referrers: Vec<(PartId, usize)> = self
            .chart
            .clause_markers_referencing(row)
            .into_iter()
            .filter_map(|marker| {
                let slot = self
                    .chart
                    .part(marker)?
                    .dependent_rows()?
                    .iter()
                    .position(|r| *r == row)?;
                Some((marker, slot))
            })
            .collect();

        self.chart.remove_part(part);
        let recreated = self.chart.insert_row(index, properties);
        for (marker, slot) in referrers {
            if let Some(CellPartKind::ClauseMarker { dependent_rows }) =
                self.chart.part_mut(marker).map(|p| p.kind_mut())
            {
                dependent_rows.insert(slot.min(dependent_rows.len()), recreated);
            }
        }
        log::debug!("Recreated row {index} after removing its only cell part");
        Some(recreated)
    }

    /// Drops a missing marker from `cell`, if it has one, before something goes there.
    /// Returns the cell's row, which is a new handle if the row had to be recreated.
    pub(crate) fn clear_missing_marker(&mut self, cell: &ChartLocation) -> RowId {
        let marker = self
            .parts_in_cell(cell)
            .into_iter()
            .find(|p| self.is_missing_marker(*p));
        match marker {
            Some(marker) => self.remove_part_keeping_row(marker).unwrap_or(cell.row),
            None => cell.row,
        }
    }

    pub fn remove_missing_marker(&mut self, cell: ChartLocation) -> RowId {
        let row = self.in_unit_of_work(UndoLabels::MISSING_MARKER, |logic| {
            logic.clear_missing_marker(&cell)
        });
        self.fire_row_modified(Some(row));
        row
    }

    /// Inserts an empty row next to `row`.
    ///
    /// Inserting below takes over `row`'s sentence end, and its paragraph end with it.
    pub fn insert_row(&mut self, row: RowId, above: bool) -> Result<RowId, ChartError> {
        let index = self.chart.row_index(row).ok_or(ChartError::RowNotFound(row))?;
        let inserted = self.in_unit_of_work(UndoLabels::INSERT_ROW, |logic| {
            let at = if above { index } else { index + 1 };
            let inserted = logic.chart.insert_row(at, Row::new(""));
            if !above {
                logic.transfer_sentence_end(row, inserted);
            }
            logic.renumber_rows(index, true);
            inserted
        });
        self.fire_row_modified(Some(inserted));
        Ok(inserted)
    }

    fn transfer_sentence_end(&mut self, from: RowId, to: RowId) {
        let Some(previous) = self.chart.row_mut(from) else {
            return;
        };
        if !previous.end_sentence {
            return;
        }
        let end_paragraph = previous.end_paragraph;
        previous.end_sentence = false;
        previous.end_paragraph = false;
        if let Some(row) = self.chart.row_mut(to) {
            row.end_sentence = true;
            row.end_paragraph = end_paragraph;
        }
    }

    /// Deletes everything from `cell` to the end of the chart, returning those words to the
    /// ribbon.
    pub fn clear_chart_from_here_on(&mut self, cell: ChartLocation) -> Result<(), ChartError> {
        let row_index = self
            .chart
            .row_index(cell.row)
            .ok_or(ChartError::RowNotFound(cell.row))?;
        let first_part = self.first_part_to_clear(&cell);
        let later_rows = self.chart.rows()[row_index + 1..].to_vec();
        let parts_to_clear = self.chart.parts_in_row(cell.row).len().saturating_sub(first_part);
        if later_rows.is_empty() && parts_to_clear == 0 {
            return Ok(());
        }

        self.in_unit_of_work(UndoLabels::CLEAR_FROM_HERE, |logic| {
            for row in later_rows.into_iter().rev() {
                logic.chart.remove_row(row);
            }
            let first_part = logic.first_part_to_clear(&cell);
            let doomed = logic
                .chart
                .parts_in_row(cell.row)
                .get(first_part..)
                .map(<[PartId]>::to_vec)
                .unwrap_or_default();
            for part in doomed.into_iter().rev() {
                logic.chart.remove_part(part);
            }
            logic.repair_rows_no_longer_referenced();
            logic.note_ribbon_changed();
            logic.renumber_rows(row_index.saturating_sub(1), false);
        });
        log::debug!("Cleared chart from row {row_index}, column {}", cell.column);
        Ok(())
    }

    fn first_part_to_clear(&self, cell: &ChartLocation) -> usize {
        if cell.column == 0 {
            0
        } else {
            self.index_of_first_part_in_or_after_column(cell)
        }
    }

    /// Resets rows marked as embedded clauses that no clause marker points at any more.
    fn repair_rows_no_longer_referenced(&mut self) {
        let orphaned: Vec<RowId> = self
            .chart
            .rows()
            .iter()
            .copied()
            .filter(|row| {
                self.chart
                    .row(*row)
                    .is_some_and(|r| r.clause_type != ClauseType::Normal)
            })
            .filter(|row| self.chart.clause_markers_referencing(*row).is_empty())
            .collect();
        for row in orphaned {
            if let Some(row) = self.chart.row_mut(row) {
                row.reset_clause_properties();
            }
        }
    }

    /// Flips the "merges into the following/preceding cell" display flag on the cell's first
    /// part, switching the opposite flag off.
    pub fn toggle_merged_cell_flag(
        &mut self,
        cell: ChartLocation,
        following: bool,
    ) -> Result<(), ChartError> {
        let part = self
            .find_cell_part_in_column(&cell, false)
            .ok_or(ChartError::EmptyCell)?;
        self.in_unit_of_work(UndoLabels::MERGE_CELL, |logic| {
            if let Some(part) = logic.chart.part_mut(part) {
                if following {
                    part.merges_after = !part.merges_after;
                    if part.merges_after {
                        part.merges_before = false;
                    }
                } else {
                    part.merges_before = !part.merges_before;
                    if part.merges_before {
                        part.merges_after = false;
                    }
                }
            }
        });
        self.fire_row_modified(Some(cell.row));
        Ok(())
    }

    /// Adds a missing marker to `cell`, or takes away the one it has.
    pub fn toggle_missing_marker(&mut self, cell: ChartLocation) -> Result<(), ChartError> {
        let column = self.column_id(cell.column)?;
        if !self.chart.contains_row(cell.row) {
            return Err(ChartError::RowNotFound(cell.row));
        }
        let existing = self
            .parts_in_cell(&cell)
            .into_iter()
            .find(|p| self.is_missing_marker(*p));
        self.in_unit_of_work(UndoLabels::MISSING_MARKER, |logic| match existing {
            Some(marker) => {
                logic.remove_tag(marker);
                Ok(())
            }
            None => {
                let at = logic.index_of_first_part_in_or_after_column(&cell);
                logic
                    .chart
                    .insert_part(cell.row, at, column, CellPartKind::Tag(None))
                    .map(|_| ())
            }
        })?;
        self.fire_row_modified(Some(cell.row));
        Ok(())
    }

    /// Adds or removes the possibility tag `tag` in `cell`.
    pub fn toggle_possibility_tag(
        &mut self,
        cell: ChartLocation,
        tag: PossibilityId,
    ) -> Result<(), ChartError> {
        let column = self.column_id(cell.column)?;
        if !self.chart.contains_row(cell.row) {
            return Err(ChartError::RowNotFound(cell.row));
        }
        let existing = self.parts_in_cell(&cell).into_iter().find(|p| {
            self.chart
                .part(*p)
                .is_some_and(|part| part.kind() == &CellPartKind::Tag(Some(tag)))
        });
        self.in_unit_of_work(UndoLabels::POSSIBILITY_TAG, |logic| match existing {
            Some(part) => {
                logic.remove_tag(part);
                Ok(())
            }
            None => {
                let at = logic.index_of_cell_part_in_later_column(cell.row, cell.column);
                logic
                    .chart
                    .insert_part(cell.row, at, column, CellPartKind::Tag(Some(tag)))
                    .map(|_| ())
            }
        })?;
        self.fire_row_modified(Some(cell.row));
        Ok(())
    }

    fn remove_tag(&mut self, part: PartId) {
        let removal = self.chart.remove_part(part);
        if let Some(index) = removal.first_deleted_index {
            self.renumber_rows(index.saturating_sub(1), false);
        }
    }

    /// Marks `rows` as one embedded clause of `clause_type` and puts a clause marker pointing
    /// at them in `cell`.
    ///
    /// Any earlier clause membership of those rows is reset first; the most recent marker wins.
    pub fn make_dependent_clause_marker(
        &mut self,
        cell: ChartLocation,
        rows: &[RowId],
        clause_type: ClauseType,
    ) -> Result<PartId, ChartError> {
        let column = self.column_id(cell.column)?;
        if rows.is_empty() {
            return Err(ChartError::NoDependentRows);
        }
        if !self.chart.contains_row(cell.row) {
            return Err(ChartError::RowNotFound(cell.row));
        }
        let marker = self.in_unit_of_work(UndoLabels::DEPENDENT_CLAUSE, |logic| {
            let row = logic.clear_missing_marker(&cell);
            let rows: Vec<RowId> = rows
                .iter()
                .map(|r| if *r == cell.row { row } else { *r })
                .collect();
            for dependent in &rows {
                if let Some(r) = logic.chart.row_mut(*dependent) {
                    r.reset_clause_properties();
                    r.clause_type = clause_type;
                }
            }
            if let Some(r) = rows.first().and_then(|r| logic.chart.row_mut(*r)) {
                r.start_dependent_group = true;
            }
            if let Some(r) = rows.last().and_then(|r| logic.chart.row_mut(*r)) {
                r.end_dependent_group = true;
            }
            let at = logic.index_of_cell_part_in_later_column(row, cell.column);
            logic.chart.insert_part(
                row,
                at,
                column,
                CellPartKind::ClauseMarker {
                    dependent_rows: rows,
                },
            )
        })?;
        self.fire_row_modified(self.chart.part(marker).map(|p| p.row()));
        Ok(marker)
    }

    /// Removes the first clause marker in `cell` and returns its rows to normal clauses.
    /// Returns false when the cell has no clause marker.
    pub fn remove_dependent_clause(&mut self, cell: ChartLocation) -> bool {
        let Some(marker) = self.parts_in_cell(&cell).into_iter().find(|p| {
            self.chart.part(*p).is_some_and(|part| part.is_clause_marker())
        }) else {
            return false;
        };
        self.in_unit_of_work(UndoLabels::REMOVE_DEPENDENT_CLAUSE, |logic| {
            let rows = logic
                .chart
                .part(marker)
                .and_then(|p| p.dependent_rows())
                .map(<[RowId]>::to_vec)
                .unwrap_or_default();
            for row in rows {
                if let Some(row) = logic.chart.row_mut(row) {
                    row.reset_clause_properties();
                }
            }
            logic.remove_tag(marker);
        });
        self.fire_row_modified(Some(cell.row));
        true
    }

    /// Switches the sentence end on `row`. Turning it off also ends the paragraph flag.
    pub fn toggle_row_ends_sentence(&mut self, row: RowId) -> Result<(), ChartError> {
        let index = self.chart.row_index(row).ok_or(ChartError::RowNotFound(row))?;
        let is_last = index + 1 == self.chart.row_count();
        self.in_unit_of_work(UndoLabels::END_SENTENCE, |logic| {
            if let Some(r) = logic.chart.row_mut(row) {
                if r.end_sentence {
                    r.end_sentence = false;
                    r.end_paragraph = false;
                } else {
                    r.end_sentence = true;
                }
            }
            if !is_last {
                logic.renumber_rows(index, false);
            }
        });
        self.fire_row_modified(Some(row));
        Ok(())
    }

    /// Switches the paragraph end on `row`. Ending a paragraph also ends the sentence.
    pub fn toggle_row_ends_paragraph(&mut self, row: RowId) -> Result<(), ChartError> {
        let index = self.chart.row_index(row).ok_or(ChartError::RowNotFound(row))?;
        self.in_unit_of_work(UndoLabels::END_PARAGRAPH, |logic| {
            let Some(r) = logic.chart.row_mut(row) else {
                return;
            };
            if r.end_paragraph {
                r.end_paragraph = false;
                return;
            }
            let sentence_was_on = r.end_sentence;
            r.end_paragraph = true;
            r.end_sentence = true;
            if !sentence_was_on {
                logic.renumber_rows(index, false);
            }
        });
        self.fire_row_modified(Some(row));
        Ok(())
    }

    /// Merges the contents of `cell` into the next cell. Does nothing in the chart's last cell.
    pub fn move_cell_forward(&mut self, cell: ChartLocation) -> Result<(), ChartError> {
        let Some(dst) = self.next_cell(&cell) else {
            return Ok(());
        };
        self.in_unit_of_work(UndoLabels::MOVE_CELL_FORWARD, |logic| {
            logic.merge_cell_contents(cell, dst, true)
        })?;
        self.fire_row_modified(self.last_move_cell.map(|c| c.row));
        Ok(())
    }

    /// Merges the contents of `cell` into the previous cell. Does nothing in the chart's first cell.
    pub fn move_cell_back(&mut self, cell: ChartLocation) -> Result<(), ChartError> {
        let Some(dst) = self.previous_cell(&cell) else {
            return Ok(());
        };
        self.in_unit_of_work(UndoLabels::MOVE_CELL_BACK, |logic| {
            logic.merge_cell_contents(cell, dst, false)
        })?;
        self.fire_row_modified(self.last_move_cell.map(|c| c.row));
        Ok(())
    }

    /// Moves the last word of `cell` into the next cell.
    pub fn move_word_forward(&mut self, cell: ChartLocation) -> Result<(), ChartError> {
        if self.word_move_source(&cell, true).is_none() {
            return Ok(());
        }
        self.in_unit_of_work(UndoLabels::MOVE_WORD_FORWARD, |logic| {
            logic.move_one_word(cell, true)
        })?;
        self.fire_row_modified(self.last_move_cell.map(|c| c.row));
        Ok(())
    }

    /// Moves the first word of `cell` into the previous cell.
    pub fn move_word_back(&mut self, cell: ChartLocation) -> Result<(), ChartError> {
        if self.word_move_source(&cell, false).is_none() {
            return Ok(());
        }
        self.in_unit_of_work(UndoLabels::MOVE_WORD_BACK, |logic| {
            logic.move_one_word(cell, false)
        })?;
        self.fire_row_modified(self.last_move_cell.map(|c| c.row));
        Ok(())
    }

    pub fn can_repeat_last_move(&self) -> bool {
        self.last_move_cell
            .is_some_and(|cell| self.is_valid_location(&cell))
    }

    /// Moves the cell the last cell move landed in forward again.
    pub fn repeat_last_move_forward(&mut self) -> Result<(), ChartError> {
        match self.last_move_cell {
            Some(cell) if self.is_valid_location(&cell) => self.move_cell_forward(cell),
            _ => Ok(()),
        }
    }

    pub fn repeat_last_move_back(&mut self) -> Result<(), ChartError> {
        match self.last_move_cell {
            Some(cell) if self.is_valid_location(&cell) => self.move_cell_back(cell),
            _ => Ok(()),
        }
    }

    /// Marks the first word group of `actual` as moved from `marker_cell`, or only the words
    /// `begin..=end` of it. Returns the marker, or `None` when nothing could be marked.
    pub fn mark_as_moved_from(
        &mut self,
        actual: ChartLocation,
        marker_cell: ChartLocation,
        span: Option<(Occurrence, Occurrence)>,
    ) -> Result<Option<PartId>, ChartError> {
        let marker = self.in_unit_of_work(UndoLabels::MARK_MOVED, |logic| {
            logic.make_moved_from(actual, marker_cell, span)
        })?;
        self.fire_row_modified(Some(actual.row));
        Ok(marker)
    }

    /// Removes moved-text markers for `actual` found in `marker_cell`.
    pub fn unmark_moved_from(&mut self, actual: ChartLocation, marker_cell: ChartLocation) {
        self.in_unit_of_work(UndoLabels::REMOVE_MOVED, |logic| {
            logic.remove_moved_from(actual, MovedFromMarker::Cell(marker_cell))
        });
        self.fire_row_modified(Some(actual.row));
    }

    /// Toggles "moved from column `marker_column`" for the contents of `actual`, within its row.
    ///
    /// Marking replaces any marker the cell's word group already has elsewhere.
    pub fn toggle_moved_from(
        &mut self,
        actual: ChartLocation,
        marker_column: usize,
    ) -> Result<(), ChartError> {
        self.column_id(marker_column)?;
        let marker_cell = actual.with_column(marker_column);
        if self.is_marked_as_moved_from(&actual, marker_column) {
            self.unmark_moved_from(actual, marker_cell);
            return Ok(());
        }
        self.in_unit_of_work(UndoLabels::MARK_MOVED, |logic| {
            if let Some(old) = logic
                .find_cell_part_in_column(&actual, true)
                .and_then(|group| logic.moved_text_marker_of(group))
            {
                logic.remove_moved_from(actual, MovedFromMarker::Part(old));
            }
            logic.make_moved_from(actual, marker_cell, None)
        })?;
        self.fire_row_modified(Some(actual.row));
        Ok(())
    }
}
