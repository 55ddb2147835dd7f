//! Moving cell contents, or a single word, into a neighbouring cell.
//!
//! Row indices are looked up again after every store mutation: removing or moving a part can
//! delete its row, which shifts everything after it.

use super::ChartLogic;
use crate::chart::{ChartLocation, PartId, Removal};
use crate::error::ChartError;

/// Where the next source word group lands in the destination row.
#[derive(Debug, Clone, Copy)]
enum Slot {
    /// Where the (empty) destination cell begins.
    CellStart,
    Before(PartId),
    After(PartId),
}

impl ChartLogic {
    /// The cell after `cell`, wrapping to the first column of the next row.
    pub fn next_cell(&self, cell: &ChartLocation) -> Option<ChartLocation> {
        if cell.column + 1 < self.column_count() {
            return Some(cell.with_column(cell.column + 1));
        }
        Some(ChartLocation::new(self.chart.next_row(cell.row)?, 0))
    }

    /// The cell before `cell`, wrapping to the last column of the previous row.
    pub fn previous_cell(&self, cell: &ChartLocation) -> Option<ChartLocation> {
        if cell.column > 0 {
            return Some(cell.with_column(cell.column - 1));
        }
        let last_column = self.column_count().checked_sub(1)?;
        Some(ChartLocation::new(
            self.chart.previous_row(cell.row)?,
            last_column,
        ))
    }

    /// Moves every word group of `src` into `dst`, merging the two groups that meet at the
    /// boundary when neither is moved text.
    ///
    /// `forward` means `dst` follows `src`. Markers stay where they are, except a missing marker
    /// in `dst` and moved-text markers in `dst` that point back into `src`, which are deleted.
    /// Does nothing when `src` holds no word group. Runs inside the caller's unit of work.
    pub fn merge_cell_contents(
        &mut self,
        src: ChartLocation,
        dst: ChartLocation,
        forward: bool,
    ) -> Result<(), ChartError> {
        let src_groups = self.word_groups_in(&self.parts_in_cell(&src));
        if src_groups.is_empty() {
            return Ok(());
        }
        let dst_column = self.column_id(dst.column)?;
        let mut dst = dst;
        dst.row = self.clear_missing_marker(&dst);
        let mut removed = Removal::default();

        let redundant: Vec<PartId> = self
            .parts_in_cell(&dst)
            .into_iter()
            .filter(|part| self.is_marker_for_cell(*part, &src))
            .collect();
        if !redundant.is_empty() {
            for marker in redundant {
                if let Some(row) = self.remove_part_keeping_row(marker) {
                    dst.row = row;
                }
            }
            self.pre_merge(&src);
        }

        let src_groups = self.word_groups_in(&self.parts_in_cell(&src));
        let dst_parts = self.parts_in_cell(&dst);
        let mut movers = src_groups.clone();
        let mut slot = Slot::CellStart;
        if let Some(&first_dst) = dst_parts.first() {
            let leading_preposed = Some(first_dst).filter(|p| self.is_preposed_marker(*p));
            let dst_groups = self.word_groups_in(&dst_parts);
            let (merge_with, to_merge) = if forward {
                (dst_groups.first(), src_groups.last())
            } else {
                (dst_groups.last(), src_groups.first())
            };
            let merge_with = merge_with.copied().filter(|g| !self.is_moved_text(*g));
            let to_merge = to_merge.copied().filter(|g| !self.is_moved_text(*g));
            if let (Some(from), Some(into)) = (to_merge, merge_with) {
                self.absorb_word_group(from, into);
                movers.retain(|g| *g != from);
                let removal = self.chart.remove_part(from);
                note_removal(&mut removed, removal);
            }
            slot = if forward {
                match leading_preposed {
                    Some(marker) => dst_parts
                        .get(1)
                        .map_or(Slot::After(marker), |p| Slot::Before(*p)),
                    None => Slot::Before(first_dst),
                }
            } else {
                match dst_groups.last().copied().or(leading_preposed) {
                    Some(anchor) => Slot::After(anchor),
                    None => Slot::Before(first_dst),
                }
            };
        }

        for group in movers {
            let (Some(from), Some(src_row)) = (
                self.chart.index_in_row(group),
                self.chart.part(group).map(|p| p.row()),
            ) else {
                continue;
            };
            let to = match slot {
                Slot::CellStart => Some(self.cell_parts_in_cell(&dst).1),
                Slot::Before(anchor) => self.chart.index_in_row(anchor),
                Slot::After(anchor) => self.chart.index_in_row(anchor).map(|i| i + 1),
            };
            let Some(to) = to else {
                log::warn!("Lost track of the destination cell while merging");
                break;
            };
            let removal = self.chart.move_parts(src_row, from, from, dst.row, to)?;
            note_removal(&mut removed, removal);
            self.chart.set_column(group, dst_column)?;
            slot = Slot::After(group);
        }

        if let Some(index) = removed.first_deleted_index {
            self.renumber_rows(index.saturating_sub(1), false);
        }
        self.last_move_cell = Some(dst);
        Ok(())
    }

    /// A moved-text marker whose target currently sits in `cell`.
    fn is_marker_for_cell(&self, part: PartId, cell: &ChartLocation) -> bool {
        self.chart
            .part(part)
            .and_then(|p| p.moved_text_target())
            .and_then(|(target, _)| self.location_of_part(target))
            .is_some_and(|loc| loc.is_same_location(cell))
    }

    /// Coalesces each run of adjacent non-moved word groups in `cell` into its first group.
    fn pre_merge(&mut self, cell: &ChartLocation) {
        let mut previous: Option<PartId> = None;
        for group in self.word_groups_in(&self.parts_in_cell(cell)) {
            if self.is_moved_text(group) {
                previous = None;
                continue;
            }
            match previous {
                Some(into) => {
                    self.absorb_word_group(group, into);
                    self.chart.remove_part(group);
                }
                None => previous = Some(group),
            }
        }
    }

    /// Widens `into` to take in the words of `from`, on whichever side `from` lies.
    pub(crate) fn absorb_word_group(&mut self, from: PartId, into: PartId) {
        let Some(from_span) = self.chart.word_group(from).copied() else {
            return;
        };
        if let Some(span) = self.chart.part_mut(into).and_then(|p| p.word_group_mut()) {
            if from_span.begin > span.begin {
                span.end = from_span.end;
            } else {
                span.begin = from_span.begin;
            }
        }
    }

    /// The word group whose edge word a word move would take, and the cell it would go to.
    pub(crate) fn word_move_source(
        &self,
        src: &ChartLocation,
        forward: bool,
    ) -> Option<(PartId, usize, ChartLocation)> {
        let parts = self.parts_in_cell(src);
        let (group, index) = if forward {
            self.find_previous_word_group(&parts, parts.len())?
        } else {
            self.find_next_word_group(&parts, 0)?
        };
        let dst = if forward {
            self.next_cell(src)?
        } else {
            self.previous_cell(src)?
        };
        Some((group, index, dst))
    }

    /// Moves the last (forward) or first (back) word of `src` into the neighbouring cell.
    ///
    /// When that word is all the cell holds, the whole cell is merged instead.
    pub(crate) fn move_one_word(
        &mut self,
        src: ChartLocation,
        forward: bool,
    ) -> Result<(), ChartError> {
        let Some((group, index, dst)) = self.word_move_source(&src, forward) else {
            return Ok(());
        };
        let parts = self.parts_in_cell(&src);
        let words = self.occurrences(group);
        let others = if forward {
            &parts[..index]
        } else {
            &parts[index + 1..]
        };
        if words.len() == 1 && self.find_first_word_group(others).is_none() {
            return self.merge_cell_contents(src, dst, forward);
        }
        let (Some(&first_word), Some(&last_word)) = (words.first(), words.last()) else {
            return Ok(());
        };

        let mut dst = dst;
        dst.row = self.clear_missing_marker(&dst);
        let dst_parts = self.parts_in_cell(&dst);
        let kept = if forward {
            match self.find_first_word_group(&dst_parts) {
                Some(target) => {
                    if let Some(span) = self.chart.part_mut(target).and_then(|p| p.word_group_mut()) {
                        span.begin = last_word;
                    }
                }
                None => {
                    let mut at = self.index_of_first_part_in_or_after_column(&dst);
                    if dst_parts.first().is_some_and(|p| self.is_preposed_marker(*p)) {
                        at += 1;
                    }
                    self.make_word_group(dst, at, last_word, last_word)?;
                }
            }
            let text = &self.text;
            self.chart
                .part_mut(group)
                .and_then(|p| p.word_group_mut())
                .is_some_and(|span| span.shrink_from_end(text))
        } else {
            match self.find_last_word_group(&dst_parts) {
                Some(target) => {
                    if let Some(span) = self.chart.part_mut(target).and_then(|p| p.word_group_mut()) {
                        span.end = first_word;
                    }
                }
                None => {
                    let at = self.index_of_cell_part_in_later_column(dst.row, dst.column);
                    self.make_word_group(dst, at, first_word, first_word)?;
                }
            }
            let text = &self.text;
            self.chart
                .part_mut(group)
                .and_then(|p| p.word_group_mut())
                .is_some_and(|span| span.shrink_from_beginning(text))
        };
        if !kept {
            let removal = self.chart.remove_part(group);
            if let Some(index) = removal.first_deleted_index {
                self.renumber_rows(index.saturating_sub(1), false);
            }
        }
        self.last_move_cell = Some(dst);
        Ok(())
    }
}

fn note_removal(total: &mut Removal, removal: Removal) {
    if let Some(index) = removal.first_deleted_index {
        total.first_deleted_index = Some(total.first_deleted_index.map_or(index, |i| i.min(index)));
    }
    total.row_deleted |= removal.row_deleted;
}
