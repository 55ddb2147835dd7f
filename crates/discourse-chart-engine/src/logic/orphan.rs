//! Chart orphans ("ChOrphs"): uncharted words that belong earlier in the text than the chart's
//! last charted word, typically because the baseline was edited after charting.
//!
//! Positions are compared paragraph-first, then by offset within the paragraph.

use std::collections::HashSet;

use super::{ChartLogic, HighlightRange, RibbonLimit};
use crate::chart::{ChartLocation, PartId, RowId};
use crate::error::ChartError;
use crate::text::{Occurrence, TextPosition};

/// The tightest cells around where a chart orphan belongs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderingCells {
    pub preceding: ChartLocation,
    pub following: ChartLocation,
}

impl ChartLogic {
    /// Uncharted wordforms in text order, at most `max`.
    pub fn next_uncharted_input(&self, max: usize) -> Vec<Occurrence> {
        let charted: HashSet<Occurrence> = self
            .chart
            .rows()
            .iter()
            .flat_map(|row| self.chart.parts_in_row(*row))
            .flat_map(|part| self.occurrences(*part))
            .collect();
        self.text
            .wordforms()
            .filter(|occ| !charted.contains(occ))
            .take(max)
            .collect()
    }

    pub fn is_chart_complete(&self) -> bool {
        self.next_uncharted_input(1).is_empty()
    }

    /// The last wordform of the last word group in the last row that has one.
    pub fn last_charted_wordform(&self) -> Option<Occurrence> {
        let group = self
            .chart
            .rows()
            .iter()
            .rev()
            .find_map(|row| self.last_word_group_in_row(*row))?;
        let span = self.chart.word_group(group)?;
        self.text.wordform_at_or_before(span.end)
    }

    /// `Some(position)` when `word` is not after the last charted wordform.
    ///
    /// An empty chart, or one with no word groups, has no orphans.
    pub fn is_chorph(&self, word: Occurrence) -> Result<Option<TextPosition>, ChartError> {
        if !self.text.has_wordform(word) {
            return Err(ChartError::NotAWordform(word));
        }
        if self.chart.is_empty() {
            return Ok(None);
        }
        let Some(last) = self.last_charted_wordform() else {
            return Ok(None);
        };
        if word.is_after(&last) {
            return Ok(None);
        }
        Ok(self.text.position(word))
    }

    fn first_position(&self, group: PartId) -> Option<TextPosition> {
        self.occurrences(group)
            .first()
            .and_then(|occ| self.text.position(*occ))
    }

    pub(crate) fn word_group_starts_before(&self, position: TextPosition, group: PartId) -> bool {
        self.first_position(group).is_some_and(|first| first < position)
    }

    /// Strictly between the first and last words of a multi-word group (same paragraph assumed
    /// for the lower bound).
    pub(crate) fn is_chorph_within_word_group(&self, position: TextPosition, group: PartId) -> bool {
        let words = self.occurrences(group);
        if words.len() < 2 {
            return false;
        }
        let (Some(first), Some(last)) = (
            self.text.position(words[0]),
            words.last().and_then(|w| self.text.position(*w)),
        ) else {
            return false;
        };
        if position.offset < first.offset {
            return false;
        }
        last.paragraph != position.paragraph || position.offset < last.offset
    }

    fn cell_of(&self, row: RowId, group: PartId) -> Option<(RowId, usize)> {
        Some((row, self.column_index_of_part(group)?))
    }

    /// Finds the cells bounding a chart orphan at `position`.
    ///
    /// `None` only when the chart has no word groups at all.
    pub fn bordering_cells(&self, position: TextPosition) -> Option<BorderingCells> {
        let mut prec: Option<(RowId, usize)> = None;
        let mut foll: Option<(RowId, usize)> = None;
        for row in self.chart.rows() {
            let Some(group) = self.first_word_group_in_row(*row) else {
                continue;
            };
            let Some(found) = self.cell_of(*row, group) else {
                continue;
            };
            if !self.word_group_starts_before(position, group) {
                foll = Some(found);
                break;
            }
            prec = Some(found);
        }

        let (mut foll_row, mut foll_col) = match foll {
            Some(found) => found,
            None => {
                // Belongs at the tail: bounded by the last group of the last row with words.
                let (prec_row, _) = prec?;
                let last = self.last_word_group_in_row(prec_row)?;
                let following = self.cell_of(prec_row, last)?;
                if self.is_chorph_within_word_group(position, last) {
                    let cell = ChartLocation::new(following.0, following.1);
                    return Some(BorderingCells {
                        preceding: cell,
                        following: cell,
                    });
                }
                following
            }
        };

        let (prec_row, prec_col) = match prec {
            None => (*self.chart.rows().first()?, 0),
            Some((prec_row, prec_col)) => {
                let prec_col = self.narrow_search_forward(position, prec_row, prec_col);
                if prec_row != foll_row {
                    (foll_row, foll_col) =
                        self.check_following_row_position(position, foll_row, foll_col);
                }
                if prec_row == foll_row {
                    foll_col = self.narrow_search_backward(position, prec_row, prec_col, foll_col);
                }
                (prec_row, prec_col)
            }
        };

        Some(BorderingCells {
            preceding: ChartLocation::new(prec_row, prec_col),
            following: ChartLocation::new(foll_row, foll_col),
        })
    }

    /// Last column in the row whose first word group still starts before the orphan.
    fn narrow_search_forward(&self, position: TextPosition, row: RowId, column: usize) -> usize {
        let mut result = column;
        for icol in column + 1..self.column_count() {
            let parts = self.parts_in_cell(&ChartLocation::new(row, icol));
            let Some(group) = self.find_first_word_group(&parts) else {
                continue;
            };
            if !self.word_group_starts_before(position, group) {
                break;
            }
            result = icol;
        }
        result
    }

    /// Walks up from the following row to the nearest row with words, moving the following
    /// cell there when that row's last group starts after the orphan or contains it.
    fn check_following_row_position(
        &self,
        position: TextPosition,
        row: RowId,
        column: usize,
    ) -> (RowId, usize) {
        let mut current = self.chart.previous_row(row);
        while let Some(candidate) = current {
            let Some(group) = self.last_word_group_in_row(candidate) else {
                current = self.chart.previous_row(candidate);
                continue;
            };
            let Some(found) = self.cell_of(candidate, group) else {
                current = self.chart.previous_row(candidate);
                continue;
            };
            if self.word_group_starts_before(position, group) {
                if self.is_chorph_within_word_group(position, group) {
                    return found;
                }
                return (row, column);
            }
            return found;
        }
        (row, column)
    }

    /// Earliest column, scanning back from the following column, whose last word group starts
    /// after the orphan (or contains it).
    fn narrow_search_backward(
        &self,
        position: TextPosition,
        row: RowId,
        prec_col: usize,
        foll_col: usize,
    ) -> usize {
        let mut result = foll_col;
        for icol in (prec_col..foll_col).rev() {
            let parts = self.parts_in_cell(&ChartLocation::new(row, icol));
            let Some(group) = self.find_last_word_group(&parts) else {
                continue;
            };
            if !self.word_group_starts_before(position, group) {
                result = icol;
                continue;
            }
            if self.is_chorph_within_word_group(position, group) {
                result = icol;
            }
            break;
        }
        result
    }

    /// Marks the columns an orphan may be dropped into and records the highlighted range.
    ///
    /// Walks cell by cell from the preceding to the following cell, wrapping rows, but never
    /// spans more than one full row: past that, the range ends just before the preceding column.
    pub fn highlight_chorph_possibles(&mut self, bordering: &BorderingCells) -> Vec<bool> {
        let ccols = self.column_count();
        let mut good = vec![false; ccols];
        if ccols == 0 {
            self.highlight = None;
            return good;
        }
        let (prec_row, prec_col) = match self.chart.row_index(bordering.preceding.row) {
            Some(index) => (index, bordering.preceding.column.min(ccols - 1)),
            None => (0, 0),
        };
        let foll_row = self
            .chart
            .row_index(bordering.following.row)
            .unwrap_or(prec_row);
        let mut foll_col = bordering.following.column;

        let mut row = prec_row;
        let mut col = prec_col;
        loop {
            good[col] = true;
            col += 1;
            if row == foll_row && col > foll_col {
                break;
            }
            if col == ccols {
                col = 0;
                row += 1;
            }
            if row > prec_row && col >= prec_col {
                if prec_col == 0 {
                    foll_col = ccols - 1;
                    row -= 1;
                } else {
                    foll_col = prec_col - 1;
                }
                break;
            }
        }
        self.highlight = Some(HighlightRange {
            first_row: prec_row,
            first_column: prec_col,
            last_row: row,
            last_column: foll_col,
        });
        good
    }

    pub fn is_highlighted_cell(&self, row: usize, column: usize) -> bool {
        let Some(h) = self.highlight else {
            return false;
        };
        if row < h.first_row || row > h.last_row {
            return false;
        }
        if h.first_row == h.last_row {
            return h.first_column <= column && column <= h.last_column;
        }
        if row == h.first_row && column >= h.first_column {
            return true;
        }
        row == h.last_row && column <= h.last_column
    }

    /// Limits the ribbon to the run of uncharted words that share the first one's following cell.
    pub fn set_ribbon_limits(&mut self, following: ChartLocation) {
        let items = self.next_uncharted_input(self.settings.max_ribbon_context);
        if items.is_empty() {
            self.ribbon.limit = None;
            return;
        }
        let mut index = 1;
        while index < items.len() {
            let Ok(Some(position)) = self.is_chorph(items[index]) else {
                break;
            };
            let same_group = self
                .bordering_cells(position)
                .is_some_and(|b| b.following == following);
            if !same_group {
                break;
            }
            index += 1;
        }
        let end_index = index - 1;
        self.ribbon.limit = Some(RibbonLimit {
            end_index,
            occurrence: items[end_index],
        });
        self.ribbon.select(1);
    }

    /// Highlights drop targets for the orphan at `position` and limits the ribbon to its group.
    /// Returns the eligible columns.
    pub fn prepare_for_chorph_insert(&mut self, position: TextPosition) -> Vec<bool> {
        let Some(bordering) = self.bordering_cells(position) else {
            return vec![false; self.column_count()];
        };
        let good = self.highlight_chorph_possibles(&bordering);
        self.set_ribbon_limits(bordering.following);
        good
    }

    /// Cell holding `point`, or for an orphan or punctuation the cell just before where it belongs.
    pub fn find_chart_loc_of_wordform(&self, point: Occurrence) -> Option<ChartLocation> {
        if self.chart.is_empty() || !self.text.is_valid(point) {
            return None;
        }
        let charted = self
            .chart
            .rows()
            .iter()
            .flat_map(|row| self.chart.parts_in_row(*row))
            .copied()
            .find(|part| {
                self.chart
                    .word_group(*part)
                    .is_some_and(|span| span.contains(point))
            });
        if let Some(part) = charted {
            return self.location_of_part(part);
        }
        let orphan_like = !self.text.has_wordform(point) || matches!(self.is_chorph(point), Ok(Some(_)));
        if !orphan_like {
            return None;
        }
        let position = self.text.position(point)?;
        self.bordering_cells(position)
            .map(|b| b.preceding)
            .filter(|cell| self.is_valid_location(cell))
    }
}
