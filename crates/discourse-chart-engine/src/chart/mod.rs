/*!
# Chart store

An in-memory arena of rows and cell parts, addressed by generational handles.

A [`Chart`] keeps the rows in reading order and each row keeps its cell parts in column
order. Handles ([`RowId`], [`PartId`]) stay cheap to copy and become stale once the object is
deleted; every lookup on a stale handle answers `None`.

Removals cascade the way the charting tool expects:

- a row whose last part goes away (and which has no notes) is deleted;
- deleting a word group deletes every moved-text marker that targets it;
- deleting a row drops it from every clause marker's dependent rows.

Every removal reports what it deleted in a [`Removal`], so callers can renumber rows and
re-derive any index they computed before the call.
*/

mod cell_part;
mod location;
mod row;
mod template;

pub use cell_part::{CellPart, CellPartKind, PossibilityId, WordGroupSpan};
pub use location::ChartLocation;
pub use row::{ClauseType, Row};
pub use template::{Column, ColumnId, TemplateNode, collect_columns, index_of_column};

use slotmap::{SlotMap, new_key_type};

use crate::error::ChartError;

new_key_type! {
    /// Handle to a chart row.
    pub struct RowId;
    /// Handle to a cell part.
    pub struct PartId;
}

/// What a removal or move deleted as a side effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Removal {
    /// The row that owned the removed part no longer exists.
    pub row_deleted: bool,
    /// Smallest row index, at the time of deletion, among all rows deleted by the call.
    pub first_deleted_index: Option<usize>,
}

impl Removal {
    fn note_deleted_row(&mut self, index: usize) {
        self.first_deleted_index = Some(self.first_deleted_index.map_or(index, |i| i.min(index)));
    }

    pub fn any_row_deleted(&self) -> bool {
        self.first_deleted_index.is_some()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Chart {
    rows: SlotMap<RowId, Row>,
    parts: SlotMap<PartId, CellPart>,
    order: Vec<RowId>,
}

impl Chart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows in reading order.
    pub fn rows(&self) -> &[RowId] {
        &self.order
    }

    pub fn row_count(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn row(&self, id: RowId) -> Option<&Row> {
        self.rows.get(id)
    }

    pub fn row_mut(&mut self, id: RowId) -> Option<&mut Row> {
        self.rows.get_mut(id)
    }

    pub fn contains_row(&self, id: RowId) -> bool {
        self.rows.contains_key(id)
    }

    pub fn row_index(&self, id: RowId) -> Option<usize> {
        self.order.iter().position(|r| *r == id)
    }

    pub fn row_at(&self, index: usize) -> Option<RowId> {
        self.order.get(index).copied()
    }

    pub fn last_row(&self) -> Option<RowId> {
        self.order.last().copied()
    }

    pub fn next_row(&self, id: RowId) -> Option<RowId> {
        self.row_index(id).and_then(|i| self.row_at(i + 1))
    }

    pub fn previous_row(&self, id: RowId) -> Option<RowId> {
        self.row_index(id)
            .and_then(|i| i.checked_sub(1))
            .and_then(|i| self.row_at(i))
    }

    pub fn row_label(&self, id: RowId) -> Option<&str> {
        self.row(id).map(Row::label)
    }

    pub fn append_row(&mut self, label: impl Into<String>) -> RowId {
        let id = self.rows.insert(Row::new(label));
        self.order.push(id);
        id
    }

    /// Inserts a row built from `properties` (its parts are ignored) at `index`, clamped to the end.
    pub fn insert_row(&mut self, index: usize, properties: Row) -> RowId {
        let id = self.rows.insert(properties.properties());
        self.order.insert(index.min(self.order.len()), id);
        id
    }

    pub fn remove_row(&mut self, id: RowId) -> Removal {
        let mut removal = Removal::default();
        self.delete_row(id, &mut removal);
        removal.row_deleted = !self.contains_row(id);
        removal
    }

    pub fn clear_rows(&mut self) {
        self.order.clear();
        self.rows.clear();
        self.parts.clear();
    }

    pub fn part(&self, id: PartId) -> Option<&CellPart> {
        self.parts.get(id)
    }

    pub fn part_mut(&mut self, id: PartId) -> Option<&mut CellPart> {
        self.parts.get_mut(id)
    }

    pub fn contains_part(&self, id: PartId) -> bool {
        self.parts.contains_key(id)
    }

    pub fn word_group(&self, id: PartId) -> Option<&WordGroupSpan> {
        self.part(id).and_then(CellPart::word_group)
    }

    /// Parts of a row in order; empty for a stale row.
    pub fn parts_in_row(&self, row: RowId) -> &[PartId] {
        self.rows.get(row).map_or(&[], |r| r.parts.as_slice())
    }

    pub fn index_in_row(&self, part: PartId) -> Option<usize> {
        let row = self.part(part)?.row;
        self.parts_in_row(row).iter().position(|p| *p == part)
    }

    pub fn insert_part(
        &mut self,
        row: RowId,
        index: usize,
        column: ColumnId,
        kind: CellPartKind,
    ) -> Result<PartId, ChartError> {
        let len = self
            .rows
            .get(row)
            .map(|r| r.parts.len())
            .ok_or(ChartError::RowNotFound(row))?;
        if index > len {
            return Err(ChartError::PartIndexOutOfRange { index, len });
        }
        let id = self.parts.insert(CellPart {
            row,
            column,
            merges_before: false,
            merges_after: false,
            kind,
        });
        if let Some(r) = self.rows.get_mut(row) {
            r.parts.insert(index, id);
        }
        Ok(id)
    }

    /// Removes a part with all cascading deletes. Removing a stale handle does nothing.
    pub fn remove_part(&mut self, id: PartId) -> Removal {
        let owner = self.part(id).map(|p| p.row);
        let mut removal = Removal::default();
        self.delete_part(id, &mut removal);
        removal.row_deleted = owner.is_some_and(|row| !self.contains_row(row));
        removal
    }

    pub fn set_column(&mut self, part: PartId, column: ColumnId) -> Result<(), ChartError> {
        let part_ref = self
            .parts
            .get_mut(part)
            .ok_or(ChartError::PartNotFound(part))?;
        part_ref.column = column;
        Ok(())
    }

    /// Moves `parts[first..=last]` of `src_row` so they land before the part that was at
    /// `dst_index` of `dst_row` before the move.
    ///
    /// Within one row, `dst_index` refers to the list as it was before the parts were taken out.
    /// The source row is deleted if the move leaves it empty and it has no notes.
    pub fn move_parts(
        &mut self,
        src_row: RowId,
        first: usize,
        last: usize,
        dst_row: RowId,
        dst_index: usize,
    ) -> Result<Removal, ChartError> {
        let src_len = self.parts_in_row(src_row).len();
        if !self.contains_row(src_row) {
            return Err(ChartError::RowNotFound(src_row));
        }
        if !self.contains_row(dst_row) {
            return Err(ChartError::RowNotFound(dst_row));
        }
        if first > last || last >= src_len {
            return Err(ChartError::PartIndexOutOfRange {
                index: last,
                len: src_len,
            });
        }

        let moved: Vec<PartId> = match self.rows.get_mut(src_row) {
            Some(row) => row.parts.drain(first..=last).collect(),
            None => return Err(ChartError::RowNotFound(src_row)),
        };
        let count = moved.len();
        let at = if src_row == dst_row {
            if dst_index > last {
                dst_index - count
            } else if dst_index >= first {
                first
            } else {
                dst_index
            }
        } else {
            dst_index
        };
        for part in &moved {
            if let Some(p) = self.parts.get_mut(*part) {
                p.row = dst_row;
            }
        }
        if let Some(row) = self.rows.get_mut(dst_row) {
            let at = at.min(row.parts.len());
            row.parts.splice(at..at, moved);
        }

        let mut removal = Removal::default();
        if src_row != dst_row {
            self.delete_row_if_empty(src_row, &mut removal);
        }
        removal.row_deleted = !self.contains_row(src_row);
        Ok(removal)
    }

    /// Moved-text markers anywhere in the chart that target `word_group`.
    pub fn moved_text_markers_for(&self, word_group: PartId) -> Vec<PartId> {
        self.order
            .iter()
            .flat_map(|row| self.parts_in_row(*row))
            .copied()
            .filter(|p| {
                self.part(*p)
                    .and_then(CellPart::moved_text_target)
                    .is_some_and(|(target, _)| target == word_group)
            })
            .collect()
    }

    /// Clause markers whose dependent rows include `row`.
    pub fn clause_markers_referencing(&self, row: RowId) -> Vec<PartId> {
        self.order
            .iter()
            .flat_map(|r| self.parts_in_row(*r))
            .copied()
            .filter(|p| {
                self.part(*p)
                    .and_then(CellPart::dependent_rows)
                    .is_some_and(|rows| rows.contains(&row))
            })
            .collect()
    }

    pub fn word_group_count(&self) -> usize {
        self.parts.values().filter(|p| p.is_word_group()).count()
    }

    fn delete_part(&mut self, id: PartId, removal: &mut Removal) {
        let Some(part) = self.parts.remove(id) else {
            return;
        };
        if let Some(row) = self.rows.get_mut(part.row) {
            row.parts.retain(|p| *p != id);
        }
        if part.is_word_group() {
            for marker in self.moved_text_markers_for(id) {
                self.delete_part(marker, removal);
            }
        }
        self.delete_row_if_empty(part.row, removal);
    }

    fn delete_row_if_empty(&mut self, id: RowId, removal: &mut Removal) {
        let empty = self
            .rows
            .get(id)
            .is_some_and(|r| r.parts.is_empty() && r.notes.is_none());
        if empty {
            self.delete_row(id, removal);
        }
    }

    fn delete_row(&mut self, id: RowId, removal: &mut Removal) {
        let Some(index) = self.row_index(id) else {
            return;
        };
        self.order.remove(index);
        removal.note_deleted_row(index);
        let Some(row) = self.rows.remove(id) else {
            return;
        };
        for part in row.parts {
            self.delete_part(part, removal);
        }
        for part in self.parts.values_mut() {
            if let CellPartKind::ClauseMarker { dependent_rows } = &mut part.kind {
                dependent_rows.retain(|r| *r != id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::{Occurrence, Text};
    use pretty_assertions::assert_eq;

    fn word_group(text: &Text, begin: usize, end: usize) -> CellPartKind {
        CellPartKind::WordGroup(WordGroupSpan::new(
            text,
            Occurrence::new(0, begin),
            Occurrence::new(0, end),
        ))
    }

    #[test]
    fn test_removing_last_part_deletes_row_and_stales_handle() {
        let text = Text::parse("one two three");
        let mut chart = Chart::new();
        let row = chart.append_row("1");
        let part = chart
            .insert_part(row, 0, ColumnId(0), word_group(&text, 0, 1))
            .unwrap();

        let removal = chart.remove_part(part);

        assert!(removal.row_deleted);
        assert_eq!(removal.first_deleted_index, Some(0));
        assert!(!chart.contains_row(row));
        assert!(chart.row(row).is_none());
        assert!(chart.is_empty());
    }

    #[test]
    fn test_row_with_notes_survives_losing_its_parts() {
        let text = Text::parse("one two three");
        let mut chart = Chart::new();
        let row = chart.append_row("1");
        chart.row_mut(row).unwrap().notes = Some("keep me".into());
        let part = chart
            .insert_part(row, 0, ColumnId(0), word_group(&text, 0, 0))
            .unwrap();

        let removal = chart.remove_part(part);

        assert!(!removal.row_deleted);
        assert!(chart.contains_row(row));
    }

    #[test]
    fn test_removing_word_group_cascades_to_its_moved_text_marker() {
        let text = Text::parse("one two three");
        let mut chart = Chart::new();
        let first = chart.append_row("1a");
        let second = chart.append_row("1b");
        let group = chart
            .insert_part(first, 0, ColumnId(1), word_group(&text, 0, 0))
            .unwrap();
        chart
            .insert_part(first, 1, ColumnId(2), word_group(&text, 1, 1))
            .unwrap();
        let marker = chart
            .insert_part(
                second,
                0,
                ColumnId(0),
                CellPartKind::MovedTextMarker {
                    word_group: group,
                    preposed: false,
                },
            )
            .unwrap();

        let removal = chart.remove_part(group);

        assert!(!removal.row_deleted);
        assert!(!chart.contains_part(marker));
        assert!(!chart.contains_row(second));
        assert_eq!(removal.first_deleted_index, Some(1));
    }

    #[test]
    fn test_deleting_row_drops_it_from_clause_markers() {
        let text = Text::parse("one two three");
        let mut chart = Chart::new();
        let main = chart.append_row("1a");
        let dependent = chart.append_row("1b");
        let marker = chart
            .insert_part(
                main,
                0,
                ColumnId(0),
                CellPartKind::ClauseMarker {
                    dependent_rows: vec![dependent],
                },
            )
            .unwrap();
        chart
            .insert_part(dependent, 0, ColumnId(0), word_group(&text, 0, 0))
            .unwrap();

        chart.remove_row(dependent);

        assert_eq!(chart.part(marker).unwrap().dependent_rows(), Some(&[][..]));
        assert_eq!(chart.rows(), &[main]);
    }

    #[test]
    fn test_move_parts_within_row_uses_original_indices() {
        let text = Text::parse("a b c d");
        let mut chart = Chart::new();
        let row = chart.append_row("1");
        let parts: Vec<_> = (0..4)
            .map(|i| {
                chart
                    .insert_part(row, i, ColumnId(0), word_group(&text, i, i))
                    .unwrap()
            })
            .collect();

        chart.move_parts(row, 0, 1, row, 3).unwrap();

        assert_eq!(
            chart.parts_in_row(row),
            &[parts[2], parts[0], parts[1], parts[3]]
        );
    }

    #[test]
    fn test_move_parts_between_rows_deletes_emptied_source() {
        let text = Text::parse("a b c");
        let mut chart = Chart::new();
        let first = chart.append_row("1a");
        let second = chart.append_row("1b");
        let moving = chart
            .insert_part(second, 0, ColumnId(2), word_group(&text, 2, 2))
            .unwrap();
        let staying = chart
            .insert_part(first, 0, ColumnId(0), word_group(&text, 0, 1))
            .unwrap();

        let removal = chart.move_parts(second, 0, 0, first, 1).unwrap();

        assert!(removal.row_deleted);
        assert_eq!(chart.parts_in_row(first), &[staying, moving]);
        assert_eq!(chart.part(moving).unwrap().row(), first);
    }

    #[test]
    fn test_insert_part_rejects_stale_row() {
        let mut chart = Chart::new();
        let row = chart.append_row("1");
        chart.remove_row(row);

        let result = chart.insert_part(row, 0, ColumnId(0), CellPartKind::Tag(None));
        assert_eq!(result, Err(ChartError::RowNotFound(row)));
    }
}
