//! Consistency sweep run after the charted text may have been edited underneath the chart.

use super::{ChartLogic, UndoLabels};
use crate::chart::{CellPartKind, PartId, WordGroupSpan};

/// What [`ChartLogic::cleanup_invalid_chart_cells`] changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Cell parts removed for pointing at something that no longer exists.
    pub removed_parts: usize,
    /// No word group was left, so every row was deleted.
    pub cleared_chart: bool,
    /// Row notes handed to the caller before their rows were deleted.
    pub archived_notes: Vec<String>,
}

impl CleanupReport {
    pub fn is_clean(&self) -> bool {
        self.removed_parts == 0 && !self.cleared_chart
    }
}

impl ChartLogic {
    /// Removes cell parts whose references went stale and repairs what that leaves behind.
    ///
    /// Warns once per sweep, however many parts go. When no word group survives, the notes of
    /// all rows are passed to `on_rows_cleared` (only if there are any) and every row is
    /// deleted.
    pub fn cleanup_invalid_chart_cells(
        &mut self,
        on_rows_cleared: impl FnOnce(&[String]),
    ) -> CleanupReport {
        let mut report = CleanupReport::default();
        if self.chart.is_empty() {
            return report;
        }
        self.in_unit_of_work(UndoLabels::CLEANUP, |logic| {
            // Removals cascade, so rescan from the top after each one.
            while let Some(part) = logic.first_invalid_part() {
                if report.removed_parts == 0 {
                    log::warn!(
                        "The text has been edited since it was charted; removing chart entries that no longer match it"
                    );
                }
                logic.chart.remove_part(part);
                report.removed_parts += 1;
            }

            if !logic.chart.is_empty() && logic.chart.word_group_count() == 0 {
                let notes: Vec<String> = logic
                    .chart
                    .rows()
                    .iter()
                    .filter_map(|row| logic.chart.row(*row)?.notes.clone())
                    .collect();
                if !notes.is_empty() {
                    on_rows_cleared(&notes);
                }
                log::info!("No charted words left; clearing {} rows", logic.chart.row_count());
                logic.chart.clear_rows();
                report.archived_notes = notes;
                report.cleared_chart = true;
            }

            if report.removed_parts > 0 {
                logic.renumber_rows(0, false);
            }
        });
        if !report.is_clean() {
            self.note_ribbon_changed();
        }
        report
    }

    fn first_invalid_part(&self) -> Option<PartId> {
        self.chart
            .rows()
            .iter()
            .flat_map(|row| self.chart.parts_in_row(*row))
            .copied()
            .find(|part| !self.is_part_valid(*part))
    }

    fn is_part_valid(&self, part: PartId) -> bool {
        let Some(cell_part) = self.chart.part(part) else {
            return false;
        };
        match cell_part.kind() {
            CellPartKind::Tag(_) => true,
            CellPartKind::ClauseMarker { dependent_rows } => {
                !dependent_rows.is_empty()
                    && dependent_rows.iter().all(|r| self.chart.contains_row(*r))
            }
            CellPartKind::MovedTextMarker { word_group, .. } => self.is_word_group(*word_group),
            CellPartKind::WordGroup(span) => self.is_span_valid(span),
        }
    }

    fn is_span_valid(&self, span: &WordGroupSpan) -> bool {
        span.text == self.text.id()
            && self.text.has_wordform(span.begin)
            && self.text.has_wordform(span.end)
            && span.begin <= span.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{CellPartKind, WordGroupSpan};
    use crate::logic::test_support::*;
    use crate::text::{Occurrence, Text};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_valid_chart_is_left_alone() {
        let mut logic = logic_with("a b c", 3);
        let row = logic.chart.append_row("1");
        add_group(&mut logic, row, 0, 0, 1);
        let mut called = false;

        let report = logic.cleanup_invalid_chart_cells(|_| called = true);

        assert!(report.is_clean());
        assert!(!called);
        assert_eq!(charted_word_count(&logic), 2);
    }

    #[test]
    fn test_marker_for_deleted_group_is_removed() {
        let mut logic = logic_with("a b c", 3);
        let row = logic.chart.append_row("1");
        let gone = add_group(&mut logic, row, 0, 0, 0);
        add_group(&mut logic, row, 1, 1, 1);
        logic.chart.remove_part(gone);
        let column = logic.column_id(2).unwrap();
        logic
            .chart
            .insert_part(
                row,
                1,
                column,
                CellPartKind::MovedTextMarker {
                    word_group: gone,
                    preposed: true,
                },
            )
            .unwrap();

        let report = logic.cleanup_invalid_chart_cells(|_| {});

        assert_eq!(report.removed_parts, 1);
        assert!(!report.cleared_chart);
        assert!(logic.is_cell_empty(&cell(row, 2)));
        assert_eq!(cell_words(&logic, row, 1), vec![vec![1]]);
    }

    #[test]
    fn test_out_of_range_group_and_stale_clause_marker_are_removed() {
        let mut logic = logic_with("a b c", 3);
        let row = logic.chart.append_row("1a");
        add_group(&mut logic, row, 0, 0, 0);
        let gone_row = logic.chart.append_row("1b");
        logic.chart.remove_row(gone_row);
        let text_id = logic.text().id();
        let column = logic.column_id(1).unwrap();
        logic
            .chart
            .insert_part(
                row,
                1,
                column,
                CellPartKind::WordGroup(WordGroupSpan {
                    text: text_id,
                    begin: Occurrence::new(0, 7),
                    end: Occurrence::new(0, 9),
                }),
            )
            .unwrap();
        let column = logic.column_id(2).unwrap();
        logic
            .chart
            .insert_part(
                row,
                2,
                column,
                CellPartKind::ClauseMarker {
                    dependent_rows: vec![gone_row],
                },
            )
            .unwrap();

        let report = logic.cleanup_invalid_chart_cells(|_| {});

        assert_eq!(report.removed_parts, 2);
        assert_eq!(logic.chart.parts_in_row(row).len(), 1);
        assert_eq!(logic.chart.row_label(row), Some("1"));
    }

    #[test]
    fn test_replaced_text_clears_chart_and_archives_notes() {
        let mut logic = logic_with("a b c", 3);
        let first = logic.chart.append_row("1a");
        add_group(&mut logic, first, 0, 0, 0);
        let second = logic.chart.append_row("1b");
        add_group(&mut logic, second, 1, 1, 2);
        logic.chart.row_mut(second).unwrap().notes = Some("check this clause".into());
        logic.set_text(Text::parse("a b c"));
        let mut archived = Vec::new();

        let report = logic.cleanup_invalid_chart_cells(|notes| archived = notes.to_vec());

        assert_eq!(report.removed_parts, 2);
        assert!(report.cleared_chart);
        assert_eq!(archived, vec!["check this clause".to_string()]);
        assert_eq!(report.archived_notes, archived);
        assert!(logic.chart.is_empty());
        assert_eq!(logic.ribbon().selected(), &[occ(0)]);
    }

    #[test]
    fn test_lone_empty_row_is_dropped() {
        let mut logic = logic_with("a b c", 3);
        logic.chart.append_row("1");

        let report = logic.cleanup_invalid_chart_cells(|_| {});

        assert_eq!(report.removed_parts, 0);
        assert!(report.cleared_chart);
        assert!(logic.chart.is_empty());
    }
}
